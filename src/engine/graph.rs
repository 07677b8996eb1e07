//! Lexical feature graph.
//!
//! The graph is the *static* side of a parse: lexical entries (one per word
//! part), the feature nodes they carry, their category tags, and the fixed
//! wiring between features and the two shared merge nodes.
//!
//! ```text
//!  LexicalEntry ──▶ PositiveFeature ──▶ NegativeFeature ──▶ Merge / PairMerge
//!        └────────────────────────────▶ NegativeFeature (own requirement)
//! ```
//!
//! Feature nodes are interned by their feature string: two entries carrying
//! `N:nom3sg` share one node, so a single positive feature can announce any
//! number of word parts to its compatible negative features.
//!
//! The graph is immutable once built. Everything that changes while a
//! sentence is parsed (activations, merge edges, routes) lives in
//! `ParseSession`, which makes resetting a parse a matter of dropping that
//! state.
//!
//! ## Invariants
//!
//! - `EntryId`, `FeatureId` and `CategoryId` index `entries`, `features` and
//!   `categories` respectively.
//! - A lexeme's parts are consecutive in `entries`, and every part lists the
//!   same `lex_parts` vector.
//! - Only `=` features feed `Merge` and only `-` features feed `PairMerge`;
//!   `<`/`>` features are inert.

use crate::error::SessionError;
use crate::lexicon::{FeatureSpec, Lexicon, LexiconEntry, Sign};
use std::collections::HashMap;
use std::fmt;

/// Index of a [`LexicalEntry`] in a [`FeatureGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub(crate) usize);

/// Index of a [`FeatureNode`] in a [`FeatureGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureId(pub(crate) usize);

/// Index of a [`CategoryNode`] in a [`FeatureGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CategoryId(pub(crate) usize);

bitflags::bitflags! {
    /// Static properties of a lexical entry, derived when the graph is built.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryFlags: u8 {
        /// First part of its lexeme (simple words are always first).
        const FIRST_PART   = 1 << 0;
        /// Last part of its lexeme (simple words are always last).
        const LAST_PART    = 1 << 1;
        /// Carries a `moves` feature.
        const FREE_TO_MOVE = 1 << 2;
        /// Carries at least one `=` feature.
        const SELECTS      = 1 << 3;
        /// Carries at least one `-` feature.
        const LICENSES     = 1 << 4;
    }
}

/// Which shared merge node a negative feature reports to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MergeTarget {
    /// Head-argument merge, fed by `=` features.
    Merge,
    /// Host-adjunct pair merge, fed by `-` features.
    PairMerge,
}

/// One word part of the lexicon.
#[derive(Debug, Clone)]
pub struct LexicalEntry {
    /// Display id; non-initial parts are primed (`admires'`).
    pub id: String,
    /// The word this part belongs to.
    pub word: String,
    pub categories: Vec<CategoryId>,
    /// Negative features first, then positive ones.
    pub features: Vec<FeatureId>,
    /// All parts of the lexeme in order, this one included.
    pub lex_parts: Vec<EntryId>,
    /// Position of this entry within `lex_parts`.
    pub part_index: usize,
    pub flags: EntryFlags,
}

impl LexicalEntry {
    pub fn is_first_part(&self) -> bool {
        self.flags.contains(EntryFlags::FIRST_PART)
    }

    pub fn is_last_part(&self) -> bool {
        self.flags.contains(EntryFlags::LAST_PART)
    }

    pub fn is_free_to_move(&self) -> bool {
        self.flags.contains(EntryFlags::FREE_TO_MOVE)
    }

    /// The lexeme part following this one, if any.
    pub fn next_part(&self) -> Option<EntryId> {
        self.lex_parts.get(self.part_index + 1).copied()
    }
}

/// A feature token, shared by every entry that carries the same string.
#[derive(Debug, Clone)]
pub struct FeatureNode {
    pub fstring: String,
    pub name: String,
    pub values: Vec<String>,
    /// `None` for positive features.
    pub sign: Option<Sign>,
    /// For positive features: the compatible negative features it announces to.
    pub(crate) partners: Vec<FeatureId>,
    /// For `=` and `-` features: the merge node pairs are sent to.
    pub(crate) target: Option<MergeTarget>,
}

impl FeatureNode {
    fn from_spec(spec: &FeatureSpec) -> Self {
        FeatureNode {
            fstring: spec.to_string(),
            name: spec.name.clone(),
            values: spec.values.clone(),
            sign: spec.sign,
            partners: Vec::new(),
            target: None,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.sign.is_none()
    }

    /// Value sets match when either side is a wildcard or they share a value.
    pub fn values_match(&self, other: &FeatureNode) -> bool {
        if self.values.is_empty() || other.values.is_empty() {
            return true;
        }
        self.values.iter().any(|v| other.values.contains(v))
    }

    /// Whether this (positive) feature satisfies the negative feature `neg`.
    pub fn satisfies(&self, neg: &FeatureNode) -> bool {
        self.is_positive() && !neg.is_positive() && self.name == neg.name && self.values_match(neg)
    }

    pub fn partners(&self) -> &[FeatureId] {
        &self.partners
    }

    pub fn target(&self) -> Option<MergeTarget> {
        self.target
    }
}

impl fmt::Display for FeatureNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fstring)
    }
}

/// A category tag such as `cat:NP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub name: String,
}

/// The lexical feature graph for one lexicon (or one sentence's slice of it).
#[derive(Debug, Clone, Default)]
pub struct FeatureGraph {
    entries: Vec<LexicalEntry>,
    features: Vec<FeatureNode>,
    categories: Vec<CategoryNode>,
    feature_index: HashMap<String, FeatureId>,
    category_index: HashMap<String, CategoryId>,
    /// Word -> entry of its first part.
    words: HashMap<String, EntryId>,
}

impl FeatureGraph {
    /// Build the graph for every entry of `lexicon`.
    pub fn build(lexicon: &Lexicon) -> Self {
        let mut graph = FeatureGraph::default();
        for entry in lexicon.entries() {
            graph.add_lexeme(entry);
        }
        graph.wire();
        graph
    }

    /// Build a graph holding only the words that occur in `tokens`.
    ///
    /// Filtering is an optimization: the resulting parse is the same as with
    /// the full graph, because features of absent words never activate.
    pub fn for_sentence(lexicon: &Lexicon, tokens: &[&str]) -> Result<Self, SessionError> {
        let mut graph = FeatureGraph::default();
        for token in tokens {
            if graph.words.contains_key(*token) {
                continue;
            }
            let entry = lexicon.get(token).ok_or_else(|| SessionError::UnknownWord(token.to_string()))?;
            graph.add_lexeme(entry);
        }
        graph.wire();
        Ok(graph)
    }

    fn add_lexeme(&mut self, lexeme: &LexiconEntry) {
        let first = self.entries.len();
        let lex_parts: Vec<EntryId> = (first..first + lexeme.parts.len()).map(EntryId).collect();

        for (i, part) in lexeme.parts.iter().enumerate() {
            let categories = part.categories.iter().map(|c| self.intern_category(c)).collect();
            let features: Vec<FeatureId> = part.features().map(|f| self.intern_feature(f)).collect();

            let mut flags = EntryFlags::empty();
            if i == 0 {
                flags |= EntryFlags::FIRST_PART;
            }
            if i + 1 == lexeme.parts.len() {
                flags |= EntryFlags::LAST_PART;
            }
            for spec in part.features() {
                match spec.sign {
                    None if spec.name == "moves" => flags |= EntryFlags::FREE_TO_MOVE,
                    Some(Sign::Select) => flags |= EntryFlags::SELECTS,
                    Some(Sign::Adjoin) => flags |= EntryFlags::LICENSES,
                    _ => {}
                }
            }

            self.entries.push(LexicalEntry {
                id: lexeme.part_id(i),
                word: lexeme.word.clone(),
                categories,
                features,
                lex_parts: lex_parts.clone(),
                part_index: i,
                flags,
            });
        }
        self.words.insert(lexeme.word.clone(), EntryId(first));
    }

    fn intern_feature(&mut self, spec: &FeatureSpec) -> FeatureId {
        let fstring = spec.to_string();
        if let Some(&id) = self.feature_index.get(&fstring) {
            return id;
        }
        let id = FeatureId(self.features.len());
        self.features.push(FeatureNode::from_spec(spec));
        self.feature_index.insert(fstring, id);
        id
    }

    fn intern_category(&mut self, name: &str) -> CategoryId {
        if let Some(&id) = self.category_index.get(name) {
            return id;
        }
        let id = CategoryId(self.categories.len());
        self.categories.push(CategoryNode { name: name.to_string() });
        self.category_index.insert(name.to_string(), id);
        id
    }

    /// Connect `=`/`-` features to their merge node and every compatible
    /// positive feature to them.
    fn wire(&mut self) {
        for neg in 0..self.features.len() {
            let target = match self.features[neg].sign {
                Some(Sign::Select) => MergeTarget::Merge,
                Some(Sign::Adjoin) => MergeTarget::PairMerge,
                _ => continue,
            };
            self.features[neg].target = Some(target);

            for pos in 0..self.features.len() {
                if pos != neg && self.features[pos].satisfies(&self.features[neg]) {
                    self.features[pos].partners.push(FeatureId(neg));
                }
            }
        }
    }

    pub fn entry(&self, id: EntryId) -> &LexicalEntry {
        &self.entries[id.0]
    }

    pub fn feature(&self, id: FeatureId) -> &FeatureNode {
        &self.features[id.0]
    }

    pub fn category(&self, id: CategoryId) -> &CategoryNode {
        &self.categories[id.0]
    }

    /// Entry of the first part of `word`.
    pub fn lookup(&self, word: &str) -> Option<EntryId> {
        self.words.get(word).copied()
    }

    pub fn entries(&self) -> impl Iterator<Item = (EntryId, &LexicalEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (EntryId(i), e))
    }

    pub fn features(&self) -> impl Iterator<Item = (FeatureId, &FeatureNode)> {
        self.features.iter().enumerate().map(|(i, f)| (FeatureId(i), f))
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn graph(text: &str) -> FeatureGraph {
        FeatureGraph::build(&Lexicon::parse(text).unwrap())
    }

    #[test]
    fn multi_part_words_get_one_entry_per_part() {
        let g = graph("admires :: =N:nom3sg T:pst, =N:acc");
        assert_eq!(g.entry_count(), 2);

        let first = g.entry(g.lookup("admires").unwrap());
        let second = g.entry(first.next_part().unwrap());
        assert_eq!(first.id, "admires");
        assert_eq!(second.id, "admires'");
        assert_eq!(first.lex_parts, second.lex_parts);
        assert!(first.is_first_part() && !first.is_last_part());
        assert!(!second.is_first_part() && second.is_last_part());
        assert!(first.flags.contains(EntryFlags::SELECTS));

        // Negative features come first.
        let names: Vec<&str> = first.features.iter().map(|&f| g.feature(f).fstring.as_str()).collect();
        assert_eq!(names, vec!["=N:nom3sg", "T:pst"]);
    }

    #[test]
    fn shared_feature_strings_share_a_node() {
        let g = graph("Pekka :: N:nom3sg\nJussi :: N:nom3sg moves");
        assert_eq!(g.feature_count(), 2);
        let pekka = g.entry(g.lookup("Pekka").unwrap());
        let jussi = g.entry(g.lookup("Jussi").unwrap());
        assert_eq!(pekka.features[0], jussi.features[0]);
        assert!(jussi.is_free_to_move());
        assert!(!pekka.is_free_to_move());
    }

    #[test]
    fn positives_connect_to_compatible_negatives() {
        let g = graph(
            "Pekka :: N:nom3sg\n\
             Merjaa :: N:acc\n\
             any :: N\n\
             sees :: =N:nom3sg|prt\n\
             hyvä :: adjL:a\n\
             talo :: -adjL <N:gen",
        );
        let id = |s: &str| g.features().find(|(_, f)| f.fstring == s).map(|(id, _)| id).unwrap();

        assert_eq!(g.feature(id("N:nom3sg")).partners(), &[id("=N:nom3sg|prt")]);
        assert!(g.feature(id("N:acc")).partners().is_empty());
        assert_eq!(g.feature(id("N")).partners(), &[id("=N:nom3sg|prt")]);
        assert_eq!(g.feature(id("adjL:a")).partners(), &[id("-adjL")]);

        assert_eq!(g.feature(id("=N:nom3sg|prt")).target(), Some(MergeTarget::Merge));
        assert_eq!(g.feature(id("-adjL")).target(), Some(MergeTarget::PairMerge));
        assert_eq!(g.feature(id("<N:gen")).target(), None);
    }

    #[test]
    fn sentence_graph_keeps_only_needed_words() {
        let lexicon = Lexicon::parse("Pekka :: N:nom3sg\nMerjaa :: N:acc\nsleeps :: =N:nom3sg").unwrap();
        let g = FeatureGraph::for_sentence(&lexicon, &["Pekka", "sleeps", "Pekka"]).unwrap();
        assert_eq!(g.entry_count(), 2);
        assert!(g.lookup("Merjaa").is_none());

        let err = FeatureGraph::for_sentence(&lexicon, &["Pekka", "runs"]).unwrap_err();
        assert_eq!(err, SessionError::UnknownWord("runs".into()));
    }
}
