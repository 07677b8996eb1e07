//! Parse run metrics.
//!
//! This module defines a small set of structs used to observe and debug the
//! route search.
//!
//! The intended usage is:
//!
//! - `ParseSession::step` returns a [`StepResult`] for every activated word
//!   part.
//! - `ParseSession::metrics` accumulates those into a [`RunMetrics`] for
//!   profiling and for the CLI report.
//!
//! ## Design notes
//!
//! - `capped` counts routes dropped by a resource cap. A non-zero value means
//!   the search was truncated; whatever complete routes exist are still
//!   returned.

use super::route::RouteId;
use super::sequencer::WordPart;
use crate::Signal;
use std::time::Duration;

/// Outcome of one `step`.
#[derive(Debug, Clone, Default)]
pub struct StepResult {
    /// The word part activated by this step.
    pub word_part: Option<WordPart>,
    /// `(head, arg)` signal pairs that received a merge edge.
    pub new_merge_edges: Vec<(Signal, Signal)>,
    /// `(host, adjunct)` signal pairs that received an adjunction edge.
    pub new_adjunction_edges: Vec<(Signal, Signal)>,
    /// Routes created during this step.
    pub routes_touched: Vec<RouteId>,
    /// Routes dropped by the profile or global cap during this step.
    pub capped: usize,
    pub metrics: StepMetrics,
}

/// Timing and counters for a single step.
#[derive(Debug, Default, Clone)]
pub struct StepMetrics {
    pub signal: Signal,
    /// Elapsed time for the whole step.
    pub duration: Duration,
    /// Time spent propagating activation through the network.
    pub activation: Duration,
    /// Revisit passes until no new route appeared.
    pub passes: usize,
    pub merges: usize,
    pub adjunctions: usize,
    pub routes_added: usize,
    pub capped: usize,
    /// Combination attempts, accepted or not.
    pub attempts: usize,
}

/// Accumulated metrics for a sentence.
#[derive(Debug, Default, Clone)]
pub struct RunMetrics {
    pub total: Duration,
    pub steps: Vec<StepMetrics>,
    pub routes: usize,
    pub capped: usize,
}

impl RunMetrics {
    pub(crate) fn record(&mut self, step: &StepMetrics) {
        self.total += step.duration;
        self.routes += step.routes_added;
        self.capped += step.capped;
        self.steps.push(step.clone());
    }
}
