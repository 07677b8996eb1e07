//! Route construction and combination.
//!
//! Every word part seeds a one-node route which is then *walked up*: the walk
//! tries to hang the route under every route it could legally join, and each
//! accepted combination is stored and walked up in turn.
//!
//! ```text
//! walk(r)
//!   ├─ argument:   r.wp ──merge edge──▶ head h   for routes at h without arg
//!   ├─ adjunction: r.wp ──adjunct of──▶ host h   for routes at h (agreement checked)
//!   └─ part:       r.wp is a remnant           for routes at r.wp-1 without part
//!                     │
//!                     └─ add_new_route(base, r, relation)
//!                          - reject: overlap, filled slot, reused mover
//!                          - build combination, dedup by RouteKey
//!                          - enforce profile/global caps
//!                          - store, then walk(new)
//! ```
//!
//! A walk only looks upwards, so a route created at a head *after* its
//! argument was walked would be missed. `revisit` walks every stored route
//! again until a pass adds nothing (a fixpoint); the dedup keys make the
//! extra walks idempotent.

use super::dedup::{RouteKey, ScopeProfile};
use super::graph::{FeatureGraph, FeatureId};
use super::route::{Relation, Route, RouteArena, RouteId};
use super::route_signal::NeighborPolicy;
use super::sequencer::WordPart;
use crate::lexicon::Sign;
use crate::{Options, Signal};
use std::collections::{HashMap, HashSet};

/// Structural edges and stored routes of one word part.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartState {
    /// Heads this word part is an argument of.
    pub head_edges: Vec<Signal>,
    /// Arguments this word part selects.
    pub arg_edges: Vec<Signal>,
    /// Adjuncts this word part hosts.
    pub adjunctions: Vec<Signal>,
    /// Hosts this word part can adjoin to.
    pub adjunct_to: Vec<Signal>,
    /// Routes rooted here, in creation order.
    pub routes_down: Vec<RouteId>,
}

/// All mutable search state of a sentence.
#[derive(Debug, Clone, Default)]
pub(crate) struct SearchState {
    pub(crate) arena: RouteArena,
    /// Indexed by `signal - 1`.
    pub(crate) parts: Vec<PartState>,
    keys: HashSet<RouteKey>,
    /// Keys dropped by a cap; revisits skip them without counting again.
    rejected: HashSet<RouteKey>,
    profiles: HashMap<ScopeProfile, usize>,
    pub(crate) capped: usize,
    warned: bool,
}

impl SearchState {
    pub(crate) fn clear(&mut self) {
        *self = SearchState::default();
    }

    pub(crate) fn part(&self, signal: Signal) -> &PartState {
        &self.parts[signal - 1]
    }

    fn part_mut(&mut self, signal: Signal) -> &mut PartState {
        if self.parts.len() < signal {
            self.parts.resize_with(signal, PartState::default);
        }
        &mut self.parts[signal - 1]
    }

    /// Make room for a newly activated word part.
    pub(crate) fn open(&mut self, signal: Signal) {
        self.part_mut(signal);
    }

    /// Record a merge edge from `arg` to `head`. Idempotent.
    pub(crate) fn add_merge(&mut self, head: Signal, arg: Signal) -> bool {
        if self.part_mut(head).arg_edges.contains(&arg) {
            return false;
        }
        self.part_mut(head).arg_edges.push(arg);
        self.part_mut(arg).head_edges.push(head);
        true
    }

    /// Record an adjunction edge from `adjunct` to `host`. Idempotent.
    pub(crate) fn add_adjunction(&mut self, host: Signal, adjunct: Signal) -> bool {
        if self.part_mut(host).adjunctions.contains(&adjunct) {
            return false;
        }
        self.part_mut(host).adjunctions.push(adjunct);
        self.part_mut(adjunct).adjunct_to.push(host);
        true
    }
}

pub(crate) struct Walker<'a> {
    pub(crate) graph: &'a FeatureGraph,
    pub(crate) word_parts: &'a [WordPart],
    pub(crate) policy: &'a dyn NeighborPolicy,
    pub(crate) options: &'a Options,
    pub(crate) state: &'a mut SearchState,
    /// Routes stored by this walker.
    pub(crate) added: Vec<RouteId>,
    pub(crate) capped: usize,
    pub(crate) attempts: usize,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(
        graph: &'a FeatureGraph,
        word_parts: &'a [WordPart],
        policy: &'a dyn NeighborPolicy,
        options: &'a Options,
        state: &'a mut SearchState,
    ) -> Self {
        Walker { graph, word_parts, policy, options, state, added: Vec::new(), capped: 0, attempts: 0 }
    }

    /// Store the one-node route of `wp` and walk it up.
    pub(crate) fn seed(&mut self, wp: WordPart) -> Option<RouteId> {
        let free = self.graph.entry(wp.entry).is_free_to_move();
        self.store(Route::leaf(wp, free))
    }

    /// Walk every stored route until a pass adds nothing. Returns the number
    /// of passes.
    pub(crate) fn revisit(&mut self) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            let before = self.state.arena.len();
            for signal in 1..=self.word_parts.len() {
                let mut i = 0;
                while let Some(&id) = self.state.part(signal).routes_down.get(i) {
                    self.walk_all_routes_up(id);
                    i += 1;
                }
            }
            if self.state.arena.len() == before {
                return passes;
            }
        }
    }

    fn walk_all_routes_up(&mut self, id: RouteId) {
        let wp = self.state.arena[id].wp;
        tracing::trace!(signal = wp.signal, route = %self.describe(id), "walking routes up");

        let heads = self.state.part(wp.signal).head_edges.clone();
        for head in heads {
            let mut i = 0;
            while let Some(&other) = self.state.part(head).routes_down.get(i) {
                i += 1;
                if self.state.arena[other].arg.is_some() || !self.neighbors(id, other) {
                    continue;
                }
                self.add_new_route(other, id, Relation::Argument);
            }
        }

        let hosts = self.state.part(wp.signal).adjunct_to.clone();
        for host in hosts {
            if self.state.arena[id].signals.contains(&host) {
                continue;
            }
            let mut i = 0;
            while let Some(&other) = self.state.part(host).routes_down.get(i) {
                i += 1;
                if !self.neighbors(id, other) {
                    continue;
                }
                if self.options.check_adjunct_agreement && !self.adjunct_agrees(id, other) {
                    tracing::trace!(adjunct = %self.describe(id), host = %self.describe(other), "adjuncts disagree");
                    continue;
                }
                self.add_new_route(other, id, Relation::Adjunction);
            }
        }

        let graph = self.graph;
        let entry = graph.entry(wp.entry);
        if entry.is_first_part() || wp.signal < 2 {
            return;
        }
        let prev = wp.signal - 1;
        debug_assert_eq!(
            self.word_parts.get(prev - 1).map(|p| p.entry),
            entry.lex_parts.get(entry.part_index - 1).copied()
        );
        if self.state.arena[id].signals.contains(&prev) {
            return;
        }
        let mut i = 0;
        while let Some(&other) = self.state.part(prev).routes_down.get(i) {
            i += 1;
            self.add_new_route(other, id, Relation::Part);
        }
    }

    fn neighbors(&self, a: RouteId, b: RouteId) -> bool {
        self.policy.are_neighbors(&self.state.arena[a].rs, &self.state.arena[b].rs)
    }

    /// Combine `other` into `base` as `relation`.
    fn add_new_route(&mut self, base: RouteId, other: RouteId, relation: Relation) -> Option<RouteId> {
        self.attempts += 1;
        if base == other {
            return None;
        }
        let arena = &self.state.arena;
        let (b, o) = (&arena[base], &arena[other]);
        if b.rs.overlaps(&o.rs) || !b.signals.is_disjoint(&o.signals) {
            tracing::trace!(base = %b.rs, other = %o.rs, "routes overlap");
            return None;
        }
        let filled = match relation {
            Relation::Argument => b.arg.is_some() || b.rs.used_movers.contains(&o.rs.head),
            Relation::Part => b.part.is_some(),
            Relation::Adjunction => false,
        };
        if filled {
            return None;
        }
        let route = b.extend(other, o, relation);
        let id = self.store(route)?;
        tracing::trace!(%relation, base = %base, other = %other, new = %self.describe(id), "new combination");
        Some(id)
    }

    fn store(&mut self, route: Route) -> Option<RouteId> {
        let key = RouteKey::from_route(&route);
        if self.state.keys.contains(&key) || self.state.rejected.contains(&key) {
            return None;
        }
        if self.state.arena.len() >= self.options.max_routes {
            self.cap(key, "route limit reached", self.options.max_routes);
            return None;
        }
        let profile = ScopeProfile::from_route(&route);
        let count = self.state.profiles.get(&profile).copied().unwrap_or(0);
        if count >= self.options.profile_cap {
            self.cap(key, "scope profile is full", self.options.profile_cap);
            return None;
        }
        self.state.profiles.insert(profile, count + 1);
        self.state.keys.insert(key);

        let signal = route.wp.signal;
        let id = self.state.arena.push(route);
        self.state.part_mut(signal).routes_down.push(id);
        self.added.push(id);
        self.walk_all_routes_up(id);
        Some(id)
    }

    fn cap(&mut self, key: RouteKey, reason: &'static str, limit: usize) {
        self.state.rejected.insert(key);
        self.capped += 1;
        self.state.capped += 1;
        if !self.state.warned {
            self.state.warned = true;
            tracing::warn!(reason, limit, "dropping routes; results may be incomplete");
        }
    }

    fn features(&self, id: RouteId) -> &'a [FeatureId] {
        let graph = self.graph;
        &graph.entry(self.state.arena[id].wp.entry).features
    }

    /// Names of the `-` features the route's head licenses adjuncts with.
    fn licensed(&self, id: RouteId) -> Vec<&'a str> {
        let graph = self.graph;
        self.features(id)
            .iter()
            .map(|&f| graph.feature(f))
            .filter(|f| f.sign == Some(Sign::Adjoin))
            .map(|f| f.name.as_str())
            .collect()
    }

    /// An adjunct the host already carries with a positive feature the host
    /// licenses, which the newcomer lacks, blocks the adjunction (and the
    /// same from the newcomer's side).
    fn adjunct_agrees(&self, adjunct: RouteId, host: RouteId) -> bool {
        let graph = self.graph;
        let disagrees = |existing: RouteId, names: &[&str], newcomer: &[FeatureId]| {
            self.features(existing).iter().any(|&f| {
                let feature = graph.feature(f);
                feature.is_positive() && names.contains(&feature.name.as_str()) && !newcomer.contains(&f)
            })
        };

        let host_names = self.licensed(host);
        let adjunct_features = self.features(adjunct);
        if self.state.arena[host].adjuncts.iter().any(|&adj| disagrees(adj, &host_names, adjunct_features)) {
            return false;
        }
        let own_names = self.licensed(adjunct);
        let host_features = self.features(host);
        !self.state.arena[adjunct].adjuncts.iter().any(|&adj| disagrees(adj, &own_names, host_features))
    }

    fn describe(&self, id: RouteId) -> String {
        self.state.arena.print_route(self.graph, id)
    }
}
