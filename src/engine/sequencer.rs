//! Word-part sequencer.
//!
//! Turns the token list of a sentence into a stream of signaled word parts.
//! A multi-part lexeme expands into consecutive signals:
//!
//! ```text
//! tokens:   Pekka      admires            Merjaa
//! parts:    Pekka-1    admires-2 admires'-3  Merjaa-4
//! words:    1          2         2           3
//! ```
//!
//! States: `Idle` until the first part is picked, `Advancing` while tokens or
//! lexeme parts remain, `Complete` once the last part of the last token is
//! current (or the sequence has been exhausted).

use super::graph::{EntryId, FeatureGraph};
use crate::Signal;

/// One signaled occurrence of a lexical entry in the sentence.
///
/// Signals are unique within a parse, so equality is by value of all fields
/// and, in practice, by signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WordPart {
    /// 1-based position in the expanded sentence.
    pub signal: Signal,
    pub entry: EntryId,
    /// 1-based index of the token this part belongs to.
    pub word_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Advancing,
    Complete,
}

#[derive(Debug, Clone)]
pub struct Sequencer {
    /// First-part entry of each token.
    tokens: Vec<EntryId>,
    /// Index into `tokens` of the next token to pop.
    next_token: usize,
    word_parts: Vec<WordPart>,
    exhausted: bool,
}

impl Sequencer {
    pub fn new(tokens: Vec<EntryId>) -> Self {
        Sequencer { tokens, next_token: 0, word_parts: Vec::new(), exhausted: false }
    }

    /// Activate the first token as signal 1.
    pub fn pick_first(&mut self) -> Option<WordPart> {
        self.reset();
        let entry = *self.tokens.first()?;
        self.next_token = 1;
        let wp = WordPart { signal: 1, entry, word_index: 1 };
        self.word_parts.push(wp);
        Some(wp)
    }

    /// Advance to the next lexeme part, or the next token.
    ///
    /// Returns `None` (and marks the sequence exhausted) when nothing is left.
    /// Without a current item this is a no-op.
    pub fn pick_next(&mut self, graph: &FeatureGraph) -> Option<WordPart> {
        let current = self.current_item()?;

        let next = if let Some(entry) = graph.entry(current.entry).next_part() {
            WordPart { signal: current.signal + 1, entry, word_index: current.word_index }
        } else if let Some(&entry) = self.tokens.get(self.next_token) {
            self.next_token += 1;
            WordPart { signal: current.signal + 1, entry, word_index: current.word_index + 1 }
        } else {
            self.exhausted = true;
            return None;
        };

        self.word_parts.push(next);
        Some(next)
    }

    /// The most recently activated word part.
    pub fn current_item(&self) -> Option<WordPart> {
        if self.exhausted { None } else { self.word_parts.last().copied() }
    }

    /// The word part activated just before the current one.
    pub fn closest_item(&self) -> Option<WordPart> {
        self.current_item()?;
        self.word_parts.iter().rev().nth(1).copied()
    }

    /// All word parts before the current one.
    pub fn prev_items(&self) -> &[WordPart] {
        match self.current_item() {
            Some(_) => &self.word_parts[..self.word_parts.len() - 1],
            None => &[],
        }
    }

    /// True when no tokens remain and the current part ends its lexeme.
    pub fn is_last(&self, graph: &FeatureGraph) -> bool {
        match self.current_item() {
            Some(wp) => self.next_token >= self.tokens.len() && graph.entry(wp.entry).is_last_part(),
            None => false,
        }
    }

    pub fn state(&self, graph: &FeatureGraph) -> SequencerState {
        if self.word_parts.is_empty() {
            SequencerState::Idle
        } else if self.exhausted || self.is_last(graph) {
            SequencerState::Complete
        } else {
            SequencerState::Advancing
        }
    }

    pub fn reset(&mut self) {
        self.next_token = 0;
        self.word_parts.clear();
        self.exhausted = false;
    }

    pub fn word_parts(&self) -> &[WordPart] {
        &self.word_parts
    }

    /// Number of word parts the whole sentence expands to.
    pub fn signal_count(&self, graph: &FeatureGraph) -> usize {
        self.tokens.iter().map(|&e| graph.entry(e).lex_parts.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::Lexicon;
    use pretty_assertions::assert_eq;

    fn setup(words: &[&str]) -> (FeatureGraph, Sequencer) {
        let lexicon =
            Lexicon::parse("Pekka :: N:nom3sg\nadmires :: =N:nom3sg T:pst, =N:acc\nMerjaa :: N:acc").unwrap();
        let graph = FeatureGraph::for_sentence(&lexicon, words).unwrap();
        let tokens = words.iter().map(|w| graph.lookup(w).unwrap()).collect();
        (graph, Sequencer::new(tokens))
    }

    #[test]
    fn expands_multi_part_words() {
        let (graph, mut seq) = setup(&["Pekka", "admires", "Merjaa"]);
        assert_eq!(seq.state(&graph), SequencerState::Idle);
        assert_eq!(seq.signal_count(&graph), 4);

        let mut seen = vec![seq.pick_first().unwrap()];
        while let Some(wp) = seq.pick_next(&graph) {
            seen.push(wp);
            if seq.is_last(&graph) {
                break;
            }
        }

        let ids: Vec<(Signal, &str, usize)> =
            seen.iter().map(|wp| (wp.signal, graph.entry(wp.entry).id.as_str(), wp.word_index)).collect();
        assert_eq!(ids, vec![(1, "Pekka", 1), (2, "admires", 2), (3, "admires'", 2), (4, "Merjaa", 3)]);
        assert_eq!(seq.state(&graph), SequencerState::Complete);
        assert_eq!(seq.prev_items().len(), 3);
        assert_eq!(seq.closest_item().map(|wp| wp.signal), Some(3));

        assert_eq!(seq.pick_next(&graph), None);
        assert_eq!(seq.current_item(), None);
        assert_eq!(seq.pick_next(&graph), None);
        assert_eq!(seq.state(&graph), SequencerState::Complete);
    }

    #[test]
    fn pick_next_without_current_is_a_no_op() {
        let (graph, mut seq) = setup(&["Pekka"]);
        assert_eq!(seq.pick_next(&graph), None);
        assert!(seq.word_parts().is_empty());
    }

    #[test]
    fn reset_restores_the_initial_state() {
        let (graph, mut seq) = setup(&["admires", "Pekka"]);
        seq.pick_first();
        seq.pick_next(&graph);
        seq.reset();
        assert_eq!(seq.state(&graph), SequencerState::Idle);
        assert_eq!(seq.pick_first().map(|wp| wp.signal), Some(1));
        assert_eq!(seq.word_parts().len(), 1);
    }
}
