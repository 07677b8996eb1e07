//! Parse sessions.
//!
//! A [`ParseSession`] is the explicit context of one sentence parse. It
//! borrows the (immutable) [`FeatureGraph`] and owns everything that changes
//! while stepping:
//!
//! ```text
//! ParseSession<'g>
//!   ├─ graph: &'g FeatureGraph     static lexical graph
//!   ├─ sequencer                   which word part is current
//!   ├─ network                     feature activation sets
//!   └─ search                      merge/adjunction edges, routes, dedup keys
//! ```
//!
//! `step` activates exactly one word part and runs the route search to a
//! fixpoint before returning, so a partial parse can be inspected after every
//! word. `reset` drops all per-sentence state, after which the same sentence
//! parses to an identical route set.

use super::graph::{EntryId, FeatureGraph};
use super::metrics::{RunMetrics, StepMetrics, StepResult};
use super::network::{Licence, Network};
use super::route::{Route, RouteId};
use super::route_signal::NeighborPolicy;
use super::sequencer::{Sequencer, SequencerState, WordPart};
use super::walker::{PartState, SearchState, Walker};
use crate::error::SessionError;
use crate::{Options, Signal, TreeStyle};
use std::time::Instant;

/// A complete route together with its ranking keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRoute {
    pub id: RouteId,
    pub cost: f64,
    pub size: usize,
    pub weight: usize,
}

#[derive(Debug)]
pub struct ParseSession<'g> {
    graph: &'g FeatureGraph,
    options: Options,
    policy: Box<dyn NeighborPolicy>,
    sequencer: Sequencer,
    network: Network,
    search: SearchState,
    metrics: RunMetrics,
}

impl<'g> ParseSession<'g> {
    /// Prepare `tokens` for stepping. Nothing is activated yet.
    pub fn start(graph: &'g FeatureGraph, tokens: &[&str], options: Options) -> Result<Self, SessionError> {
        if tokens.is_empty() {
            return Err(SessionError::EmptySentence);
        }
        let entries = tokens
            .iter()
            .map(|t| graph.lookup(t).ok_or_else(|| SessionError::UnknownWord(t.to_string())))
            .collect::<Result<Vec<EntryId>, _>>()?;

        let policy = options.neighbor_policy.policy();
        tracing::debug!(tokens = tokens.len(), policy = policy.name(), "starting sentence");

        Ok(ParseSession {
            graph,
            options,
            policy,
            sequencer: Sequencer::new(entries),
            network: Network::new(graph),
            search: SearchState::default(),
            metrics: RunMetrics::default(),
        })
    }

    /// Activate the next word part and extend the route set with it.
    pub fn step(&mut self) -> Result<StepResult, SessionError> {
        let started = Instant::now();
        let next = if self.sequencer.word_parts().is_empty() {
            self.sequencer.pick_first()
        } else {
            self.sequencer.pick_next(self.graph)
        };
        let wp = next.ok_or(SessionError::Exhausted)?;
        self.search.open(wp.signal);

        let activation_started = Instant::now();
        let licences = self.network.activate(self.graph, wp);
        let activation = activation_started.elapsed();

        let mut result = StepResult { word_part: Some(wp), ..StepResult::default() };
        for licence in licences {
            match licence {
                Licence::Merge { head, arg } => {
                    if head != arg && self.search.add_merge(head, arg) {
                        tracing::debug!(head, arg, "merge edge");
                        result.new_merge_edges.push((head, arg));
                    }
                }
                Licence::Adjunction { host, adjunct } => {
                    if host != adjunct && self.search.add_adjunction(host, adjunct) {
                        tracing::debug!(host, adjunct, "adjunction edge");
                        result.new_adjunction_edges.push((host, adjunct));
                    }
                }
            }
        }

        let mut walker = Walker::new(
            self.graph,
            self.sequencer.word_parts(),
            self.policy.as_ref(),
            &self.options,
            &mut self.search,
        );
        walker.seed(wp);
        let passes = walker.revisit();
        let Walker { added, capped, attempts, .. } = walker;

        result.metrics = StepMetrics {
            signal: wp.signal,
            duration: started.elapsed(),
            activation,
            passes,
            merges: result.new_merge_edges.len(),
            adjunctions: result.new_adjunction_edges.len(),
            routes_added: added.len(),
            capped,
            attempts,
        };
        result.routes_touched = added;
        result.capped = capped;
        self.metrics.record(&result.metrics);

        tracing::debug!(
            signal = wp.signal,
            word = %self.graph.entry(wp.entry).id,
            previous = ?self.sequencer.closest_item().map(|p| p.signal),
            earlier = self.sequencer.prev_items().len(),
            merges = result.metrics.merges,
            adjunctions = result.metrics.adjunctions,
            routes = result.metrics.routes_added,
            passes,
            "step"
        );
        Ok(result)
    }

    /// Step until the sentence is consumed.
    pub fn run(&mut self) -> Result<Vec<StepResult>, SessionError> {
        let mut steps = Vec::new();
        while !self.is_complete() {
            steps.push(self.step()?);
        }
        Ok(steps)
    }

    pub fn is_complete(&self) -> bool {
        self.sequencer.state(self.graph) == SequencerState::Complete
    }

    pub fn state(&self) -> SequencerState {
        self.sequencer.state(self.graph)
    }

    /// Routes covering every word part so far with no mover left unattached.
    pub fn complete_routes(&self) -> Vec<RouteId> {
        let total = self.sequencer.word_parts().len();
        self.search
            .arena
            .iter()
            .filter(|(_, r)| r.size() == total && r.rs.movers.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Complete routes, cheapest first, then larger and heavier ones.
    ///
    /// An empty list means the sentence has no parse.
    pub fn best_routes(&self) -> Result<Vec<RankedRoute>, SessionError> {
        if !self.is_complete() {
            return Err(SessionError::Incomplete {
                consumed: self.sequencer.word_parts().len(),
                total: self.sequencer.signal_count(self.graph),
            });
        }
        let mut ranked: Vec<RankedRoute> = self
            .complete_routes()
            .into_iter()
            .map(|id| {
                let route = &self.search.arena[id];
                RankedRoute { id, cost: self.cost(id), size: route.size(), weight: route.weight }
            })
            .collect();
        ranked.sort_by(|a, b| {
            a.cost
                .total_cmp(&b.cost)
                .then(b.size.cmp(&a.size))
                .then(b.weight.cmp(&a.weight))
                .then(self.search.arena[a.id].wp.signal.cmp(&self.search.arena[b.id].wp.signal))
                .then(a.id.cmp(&b.id))
        });
        Ok(ranked)
    }

    /// Drop all per-sentence state; the next `step` starts over at signal 1.
    pub fn reset(&mut self) {
        self.sequencer.reset();
        self.network.reset();
        self.search.clear();
        self.metrics = RunMetrics::default();
    }

    pub fn render_tree(&self, id: RouteId) -> String {
        match self.options.tree_style {
            TreeStyle::Label => self.search.arena.label_tree(self.graph, id),
            TreeStyle::Signal => self.search.arena.signal_tree(self.graph, id),
        }
    }

    /// Arrow notation of a route.
    pub fn print_route(&self, id: RouteId) -> String {
        self.search.arena.print_route(self.graph, id)
    }

    pub fn cost(&self, id: RouteId) -> f64 {
        self.search.arena.cost(id, self.sequencer.word_parts())
    }

    pub fn route(&self, id: RouteId) -> &Route {
        &self.search.arena[id]
    }

    pub fn routes(&self) -> impl Iterator<Item = (RouteId, &Route)> {
        self.search.arena.iter()
    }

    pub fn route_count(&self) -> usize {
        self.search.arena.len()
    }

    /// Routes rooted at `signal`, in creation order.
    pub fn routes_at(&self, signal: Signal) -> &[RouteId] {
        self.part_state(signal).map(|p| p.routes_down.as_slice()).unwrap_or_default()
    }

    /// Routes rooted at any occurrence of `entry`.
    pub fn routes_down(&self, entry: EntryId) -> Vec<RouteId> {
        self.sequencer
            .word_parts()
            .iter()
            .filter(|wp| wp.entry == entry)
            .flat_map(|wp| self.routes_at(wp.signal).iter().copied())
            .collect()
    }

    pub fn part_state(&self, signal: Signal) -> Option<&PartState> {
        signal.checked_sub(1).and_then(|i| self.search.parts.get(i))
    }

    /// `(head, arg)` pairs joined by a merge edge.
    pub fn merge_edges(&self) -> Vec<(Signal, Signal)> {
        self.edges(|p| &p.arg_edges)
    }

    /// `(host, adjunct)` pairs joined by an adjunction edge.
    pub fn adjunction_edges(&self) -> Vec<(Signal, Signal)> {
        self.edges(|p| &p.adjunctions)
    }

    fn edges(&self, side: impl Fn(&PartState) -> &Vec<Signal>) -> Vec<(Signal, Signal)> {
        self.search
            .parts
            .iter()
            .enumerate()
            .flat_map(|(i, p)| side(p).iter().map(move |&other| (i + 1, other)))
            .collect()
    }

    /// Activated categories by name, with the signals that activated them.
    pub fn active_categories(&self) -> Vec<(String, Vec<Signal>)> {
        self.network
            .active_categories()
            .map(|(cid, signals)| (self.graph.category(cid).name.clone(), signals.iter().copied().collect()))
            .collect()
    }

    pub fn word_parts(&self) -> &[WordPart] {
        self.sequencer.word_parts()
    }

    pub fn current_item(&self) -> Option<WordPart> {
        self.sequencer.current_item()
    }

    pub fn graph(&self) -> &'g FeatureGraph {
        self.graph
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Routes dropped by resource caps since the sentence started.
    pub fn capped(&self) -> usize {
        self.search.capped
    }
}
