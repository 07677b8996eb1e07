//! Incremental route-construction engine.
//!
//! This module is the *public entry point* for the merge engine. It is split
//! into focused submodules under `src/engine/` while keeping public paths
//! stable (for example `crate::engine::ParseSession` and
//! `crate::engine::RouteSignal`).
//!
//! ## How the parts work together
//!
//! Parsing a sentence is a loop over its word parts:
//!
//! ```text
//! lexicon ─── FeatureGraph::build                 (graph.rs)
//!                   │
//! tokens ──── Sequencer::pick_first / pick_next   (sequencer.rs)
//!                   │  one WordPart per step
//!                   v
//!             Network::activate                   (network.rs)
//!               - propagate the signal through features
//!               - license (head, arg) / (host, adjunct) pairs
//!                   │
//!                   v
//!             merge / adjunction edges            (walker.rs, SearchState)
//!                   │
//!                   v
//!             Walker::seed + Walker::revisit      (walker.rs)
//!               - walk routes up through edges
//!               - overlap / neighbor checks       (route_signal.rs)
//!               - dedup via RouteKey              (dedup.rs)
//!               - iterate to fixpoint
//!                   │
//!                   v
//!             ParseSession::best_routes           (session.rs, route.rs)
//!               - complete routes only
//!               - ranked by cost, size, weight
//! ```
//!
//! The route search leans on **revisiting**: after each activation every
//! stored route is walked again until a pass produces no new route. A walk
//! only ever looks upwards, so this is what lets a head that appears after
//! its argument still pick the argument up.
//!
//! ## Responsibilities by module
//!
//! - `graph.rs`: lexical entries, interned feature nodes, their wiring.
//! - `sequencer.rs`: expands tokens into signaled word parts.
//! - `network.rs`: activation sets and merge licensing.
//! - `route_signal.rs`: span/mover summaries and neighbor policies.
//! - `route.rs`: the route arena, tree rendering and cost.
//! - `dedup.rs`: structural route keys and scope profiles.
//! - `walker.rs`: route combination.
//! - `session.rs`: the per-sentence context tying it all together.
//! - `metrics.rs`: per-step timings and counters.
//!
//! ## Debugging
//!
//! The engine logs through `tracing`: `debug` for activations and new edges,
//! `trace` for every combination attempt. The CLI wires this to
//! `MINIMERGE_LOG` (for example `MINIMERGE_LOG=minimerge=trace`).

#[path = "engine/dedup.rs"]
mod dedup;
#[path = "engine/graph.rs"]
mod graph;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/network.rs"]
mod network;
#[path = "engine/route.rs"]
mod route;
#[path = "engine/route_signal.rs"]
mod route_signal;
#[path = "engine/sequencer.rs"]
mod sequencer;
#[path = "engine/session.rs"]
mod session;
#[path = "engine/walker.rs"]
mod walker;


#[allow(unused_imports)]
pub use graph::{CategoryId, CategoryNode, EntryFlags, EntryId, FeatureGraph, FeatureId, FeatureNode, LexicalEntry, MergeTarget};
#[allow(unused_imports)]
pub use metrics::{RunMetrics, StepMetrics, StepResult};
#[allow(unused_imports)]
pub use network::{Licence, Network};
#[allow(unused_imports)]
pub use route::{Relation, Route, RouteArena, RouteId, relation_cost};
#[allow(unused_imports)]
pub use route_signal::{MoverAware, MovementLicensed, NeighborPolicy, RouteSignal, Strict};
#[allow(unused_imports)]
pub use sequencer::{Sequencer, SequencerState, WordPart};
#[allow(unused_imports)]
pub use session::{ParseSession, RankedRoute};
#[allow(unused_imports)]
pub use walker::PartState;
