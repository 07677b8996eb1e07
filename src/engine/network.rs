//! Signal propagation and merge licensing.
//!
//! Activating a word part pushes its signal through the feature graph:
//!
//! ```text
//! entry(s) ─┬─▶ own negative feature  : lex ∪= {s}   ─▶ pairs (s, a) for a in feat
//!           └─▶ own positive feature  : once per s   ─▶ each partner negative:
//!                                                        feat ∪= {s} ─▶ pairs (h, s) for h in lex
//! pairs ─▶ Merge / PairMerge : accepted iff one side is the current signal
//! ```
//!
//! Activation sets are monotonic for the lifetime of a sentence. The network
//! never builds structure itself: it reports [`Licence`]s and the session
//! turns them into merge and adjunction edges.

use super::graph::{CategoryId, FeatureGraph, FeatureId, MergeTarget};
use super::sequencer::WordPart;
use crate::Signal;
use std::collections::BTreeSet;

/// A combination the network has licensed at the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Licence {
    /// `head` selects `arg` (a `=` feature met its positive partner).
    Merge { head: Signal, arg: Signal },
    /// `host` licenses `adjunct` (a `-` feature met its positive partner).
    Adjunction { host: Signal, adjunct: Signal },
}

#[derive(Debug, Clone, Default)]
struct FeatureActivation {
    /// Positive features: every signal seen.
    positive: BTreeSet<Signal>,
    /// Negative features: signals of the feature's own host.
    lex: BTreeSet<Signal>,
    /// Negative features: signals announced by compatible positives.
    feat: BTreeSet<Signal>,
}

#[derive(Debug, Clone)]
pub struct Network {
    entries: Vec<BTreeSet<Signal>>,
    categories: Vec<BTreeSet<Signal>>,
    features: Vec<FeatureActivation>,
    /// Pairs already accepted by `Merge` / `PairMerge`.
    merged: BTreeSet<(Signal, Signal)>,
    pair_merged: BTreeSet<(Signal, Signal)>,
}

impl Network {
    pub fn new(graph: &FeatureGraph) -> Self {
        Network {
            entries: vec![BTreeSet::new(); graph.entry_count()],
            categories: vec![BTreeSet::new(); graph.category_count()],
            features: vec![FeatureActivation::default(); graph.feature_count()],
            merged: BTreeSet::new(),
            pair_merged: BTreeSet::new(),
        }
    }

    /// Clear every activation set.
    pub fn reset(&mut self) {
        self.entries.iter_mut().for_each(BTreeSet::clear);
        self.categories.iter_mut().for_each(BTreeSet::clear);
        self.features.iter_mut().for_each(|f| *f = FeatureActivation::default());
        self.merged.clear();
        self.pair_merged.clear();
    }

    /// Activate `wp` and return the combinations licensed by it, in emission
    /// order. Re-activating the same word part licenses nothing.
    pub fn activate(&mut self, graph: &FeatureGraph, wp: WordPart) -> Vec<Licence> {
        if !self.entries[wp.entry.0].insert(wp.signal) {
            return Vec::new();
        }
        let entry = graph.entry(wp.entry);
        let mut pairs: Vec<(FeatureId, Signal, Signal)> = Vec::new();

        for &fid in &entry.features {
            let feature = graph.feature(fid);
            if feature.is_positive() {
                if self.features[fid.0].positive.insert(wp.signal) {
                    for &partner in feature.partners() {
                        self.announce(partner, wp.signal, &mut pairs);
                    }
                }
            } else {
                self.host(fid, wp.signal, &mut pairs);
            }
        }
        for &cid in &entry.categories {
            self.categories[cid.0].insert(wp.signal);
        }

        let mut licences = Vec::new();
        for (fid, head, arg) in pairs {
            if head != wp.signal && arg != wp.signal {
                continue;
            }
            let licence = match graph.feature(fid).target() {
                Some(MergeTarget::Merge) if self.merged.insert((head, arg)) => Licence::Merge { head, arg },
                Some(MergeTarget::PairMerge) if self.pair_merged.insert((head, arg)) => {
                    Licence::Adjunction { host: head, adjunct: arg }
                }
                _ => continue,
            };
            tracing::debug!(feature = %graph.feature(fid), ?licence, "licensed");
            licences.push(licence);
        }
        licences
    }

    /// The feature's own host became active at `signal`.
    fn host(&mut self, fid: FeatureId, signal: Signal, pairs: &mut Vec<(FeatureId, Signal, Signal)>) {
        let state = &mut self.features[fid.0];
        if state.lex.insert(signal) {
            pairs.extend(state.feat.iter().filter(|&&a| a != signal).map(|&a| (fid, signal, a)));
        }
    }

    /// A compatible positive feature became active at `signal`.
    fn announce(&mut self, fid: FeatureId, signal: Signal, pairs: &mut Vec<(FeatureId, Signal, Signal)>) {
        let state = &mut self.features[fid.0];
        // A word part never licenses itself.
        if state.lex.contains(&signal) {
            return;
        }
        if state.feat.insert(signal) {
            pairs.extend(state.lex.iter().map(|&h| (fid, h, signal)));
        }
    }

    /// Categories activated so far with the signals that activated them.
    pub fn active_categories(&self) -> impl Iterator<Item = (CategoryId, &BTreeSet<Signal>)> {
        self.categories
            .iter()
            .enumerate()
            .filter(|(_, signals)| !signals.is_empty())
            .map(|(i, signals)| (CategoryId(i), signals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use pretty_assertions::assert_eq;

    fn activate_all(text: &str, words: &[&str]) -> Vec<Vec<Licence>> {
        let graph = FeatureGraph::build(&Lexicon::parse(text).unwrap());
        let mut net = Network::new(&graph);
        words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let wp = WordPart { signal: i + 1, entry: graph.lookup(w).unwrap(), word_index: i + 1 };
                net.activate(&graph, wp)
            })
            .collect()
    }

    #[test]
    fn merge_is_licensed_in_either_order() {
        let lexicon = "Pekka :: N:nom3sg\nsleeps :: =N:nom3sg";
        assert_eq!(activate_all(lexicon, &["Pekka", "sleeps"]), vec![vec![], vec![Licence::Merge { head: 2, arg: 1 }]]);
        assert_eq!(activate_all(lexicon, &["sleeps", "Pekka"]), vec![vec![], vec![Licence::Merge { head: 1, arg: 2 }]]);
    }

    #[test]
    fn every_known_partner_is_paired() {
        let out = activate_all("Pekka :: N\nMerjaa :: N\nsees :: =N", &["Pekka", "Merjaa", "sees"]);
        assert_eq!(out[2], vec![Licence::Merge { head: 3, arg: 1 }, Licence::Merge { head: 3, arg: 2 }]);
    }

    #[test]
    fn adjunction_goes_through_pair_merge() {
        let out = activate_all("hyvä :: adjL:a\nPekka :: N:nom3sg -adjL:a", &["hyvä", "Pekka"]);
        assert_eq!(out[1], vec![Licence::Adjunction { host: 2, adjunct: 1 }]);
    }

    #[test]
    fn no_self_licensing_and_inert_directional_features() {
        let out = activate_all("echo :: =N N\nleft :: <N", &["echo", "left"]);
        assert_eq!(out, vec![vec![], vec![]]);
    }

    #[test]
    fn reset_forgets_activations() {
        let graph = FeatureGraph::build(&Lexicon::parse("Pekka :: N\nsleeps :: =N").unwrap());
        let mut net = Network::new(&graph);
        let pekka = WordPart { signal: 1, entry: graph.lookup("Pekka").unwrap(), word_index: 1 };
        let sleeps = WordPart { signal: 2, entry: graph.lookup("sleeps").unwrap(), word_index: 2 };

        net.activate(&graph, pekka);
        assert_eq!(net.activate(&graph, sleeps).len(), 1);
        assert!(net.activate(&graph, sleeps).is_empty());

        net.reset();
        net.activate(&graph, pekka);
        assert_eq!(net.activate(&graph, sleeps), vec![Licence::Merge { head: 2, arg: 1 }]);
    }

    #[test]
    fn categories_collect_their_signals() {
        let graph = FeatureGraph::build(&Lexicon::parse("talo :: N cat:NP
hyvä :: adjL:a").unwrap());
        let mut net = Network::new(&graph);
        for (i, w) in ["talo", "hyvä", "talo"].iter().enumerate() {
            net.activate(&graph, WordPart { signal: i + 1, entry: graph.lookup(w).unwrap(), word_index: i + 1 });
        }

        let active: Vec<(&str, Vec<Signal>)> = net
            .active_categories()
            .map(|(cid, signals)| (graph.category(cid).name.as_str(), signals.iter().copied().collect()))
            .collect();
        assert_eq!(active, vec![("cat:NP", vec![1, 3])]);

        net.reset();
        assert_eq!(net.active_categories().count(), 0);
    }
}
