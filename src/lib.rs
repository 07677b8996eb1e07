extern crate self as minimerge;

#[macro_use]
mod macros;
mod api;
mod engine;
pub mod error;
mod export;
pub mod lexicon;

/// Position of a word part in the sentence, starting at 1.
///
/// Every activated word part gets the next signal, so signals double as a
/// left-to-right order over word parts.
pub type Signal = usize;

pub use api::{
    DEFAULT_LEXICON_TEXT, NeighborPolicyKind, Options, Parse, ParseDetails, ParseResult, ParseResultVerbose,
    StepSummary, TreeStyle, best_routes, default_lexicon, is_complete, load_lexicon, parse, parse_verbose,
    parse_verbose_with, parse_with, render_tree, start_sentence, step,
};
pub use engine::{
    CategoryId, CategoryNode, EntryFlags, EntryId, FeatureGraph, FeatureId, FeatureNode, Licence, LexicalEntry,
    MergeTarget, MoverAware, MovementLicensed, NeighborPolicy, Network, ParseSession, PartState, RankedRoute,
    Relation, Route, RouteArena, RouteId, RouteSignal, RunMetrics, Sequencer, SequencerState, StepMetrics,
    StepResult, Strict, WordPart, relation_cost,
};
pub use error::{Error, LexiconError, SessionError};
pub use export::TreeExporter;
pub use lexicon::{FeatureSpec, Lexicon, LexiconEntry, PartSpec, Sign};
