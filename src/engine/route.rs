//! Routes and the route arena.
//!
//! A route is one candidate derivation rooted at a word part. Sub-routes are
//! referenced by [`RouteId`] into a per-session [`RouteArena`]; routes are
//! never mutated after being stored, so a combination is a new route that
//! points at its (shared) components:
//!
//! ```text
//!   #7 admires-2 ── arg ──▶ #0 Pekka-1
//!        └──────── part ──▶ #5 admires'-3 ── arg ──▶ #3 Merjaa-4
//! ```
//!
//! Rendering (`[.Label left right]` trees, arrow notation) and the cost
//! heuristic are computed from the arena on demand.

use super::graph::FeatureGraph;
use super::route_signal::RouteSignal;
use super::sequencer::WordPart;
use crate::Signal;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteId(pub(crate) usize);

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a sub-route hangs off its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Argument,
    Adjunction,
    Part,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Relation::Argument => "argument",
            Relation::Adjunction => "adjunction",
            Relation::Part => "part",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub wp: WordPart,
    /// Remnant of this word's own lexeme.
    pub part: Option<RouteId>,
    pub arg: Option<RouteId>,
    pub adjuncts: Vec<RouteId>,
    pub rs: RouteSignal,
    /// Every signal the route spans, movers included.
    pub signals: BTreeSet<Signal>,
    /// Number of combinations the route is made of.
    pub weight: usize,
}

impl Route {
    pub fn leaf(wp: WordPart, free_to_move: bool) -> Self {
        Route {
            wp,
            part: None,
            arg: None,
            adjuncts: Vec::new(),
            rs: RouteSignal::leaf(wp.signal, free_to_move),
            signals: BTreeSet::from([wp.signal]),
            weight: 0,
        }
    }

    /// A copy of this route with `sub` attached as `relation`.
    pub fn extend(&self, sub_id: RouteId, sub: &Route, relation: Relation) -> Route {
        let mut next = self.clone();
        next.signals.extend(&sub.signals);
        next.weight = self.weight + sub.weight + 1;
        match relation {
            Relation::Part => {
                debug_assert!(self.part.is_none());
                next.part = Some(sub_id);
                next.rs = self.rs.with_part(&sub.rs);
            }
            Relation::Argument => {
                debug_assert!(self.arg.is_none());
                next.arg = Some(sub_id);
                next.rs = self.rs.with_arg(&sub.rs);
            }
            Relation::Adjunction => {
                next.adjuncts.push(sub_id);
                next.rs = self.rs.with_adjunct(&sub.rs);
            }
        }
        next
    }

    /// Number of word parts covered.
    pub fn size(&self) -> usize {
        self.signals.len()
    }
}

/// Cost of attaching a sub-route headed by `sub` to `head`.
///
/// The word-index distance (to the sub-route's head or either of its edge
/// words, whichever is closest) minus one, plus a tenth of the raw signal
/// distance beyond one. Adjacent attachment costs nothing.
pub fn relation_cost(head: WordPart, sub: WordPart, sub_first: WordPart, sub_last: WordPart) -> f64 {
    let t = head.word_index as i64;
    let reach = (t - sub.word_index as i64)
        .abs()
        .min((t - sub_first.word_index as i64).abs())
        .min((t - sub_last.word_index as i64).abs());
    let raw = (head.signal as i64 - sub.signal as i64).abs();
    (reach - 1).max(0) as f64 + (raw - 1).max(0) as f64 / 10.0
}

#[derive(Debug, Clone, Default)]
pub struct RouteArena {
    routes: Vec<Route>,
}

impl Index<RouteId> for RouteArena {
    type Output = Route;

    fn index(&self, id: RouteId) -> &Route {
        &self.routes[id.0]
    }
}

impl RouteArena {
    pub fn push(&mut self, route: Route) -> RouteId {
        self.routes.push(route);
        RouteId(self.routes.len() - 1)
    }

    pub fn get(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (RouteId, &Route)> {
        self.routes.iter().enumerate().map(|(i, r)| (RouteId(i), r))
    }

    /// Whether the route carries a freely moving word anywhere along its
    /// head, argument or adjunct chain.
    pub fn can_move(&self, graph: &FeatureGraph, id: RouteId) -> bool {
        let route = &self[id];
        graph.entry(route.wp.entry).is_free_to_move()
            || route.arg.is_some_and(|arg| self.can_move(graph, arg))
            || route.adjuncts.iter().any(|&adj| self.can_move(graph, adj))
    }

    /// Cost heuristic, summed over every relation in the route. Part
    /// relations are free.
    pub fn cost(&self, id: RouteId, word_parts: &[WordPart]) -> f64 {
        let route = &self[id];
        let at = |signal: Signal| word_parts[signal - 1];

        let mut total = route.part.map_or(0.0, |part| self.cost(part, word_parts));
        for &sub_id in route.arg.iter().chain(&route.adjuncts) {
            let sub = &self[sub_id];
            let (Some(&first), Some(&last)) = (sub.signals.first(), sub.signals.last()) else {
                continue;
            };
            total += relation_cost(route.wp, sub.wp, at(first), at(last)) + self.cost(sub_id, word_parts);
        }
        total
    }

    /// `[.Label left right]` tree with lexical ids as labels. Adjunct labels
    /// join host and adjunct ids with `+`.
    pub fn label_tree(&self, graph: &FeatureGraph, id: RouteId) -> String {
        let route = &self[id];
        let entry = graph.entry(route.wp.entry);
        let name = entry.id.as_str();

        let mut label = name.to_string();
        let mut this = name.to_string();
        if let Some(part) = route.part {
            this = format!("[.{label} {name} {}]", self.label_tree(graph, part));
        }
        for &adj in &route.adjuncts {
            let adj_label = self.adjunct_label(graph, adj);
            let adj_tree = self.label_tree(graph, adj);
            if route.wp.signal < self[adj].wp.signal {
                label = format!("{label}+{adj_label}");
                this = format!("[.{label} {this} {adj_tree}]");
            } else {
                label = format!("{adj_label}+{label}");
                this = format!("[.{label} {adj_tree} {this}]");
            }
        }
        match route.arg {
            Some(arg) => {
                let arg_tree = self.label_tree(graph, arg);
                if route.wp.signal < self[arg].wp.signal && !entry.is_free_to_move() {
                    format!("[.{label} {this} {arg_tree}]")
                } else {
                    format!("[.{label} {arg_tree} {this}]")
                }
            }
            None => this,
        }
    }

    fn adjunct_label(&self, graph: &FeatureGraph, id: RouteId) -> String {
        let route = &self[id];
        let mut label = graph.entry(route.wp.entry).id.clone();
        for &other in &route.adjuncts {
            let other_label = self.adjunct_label(graph, other);
            if route.wp.signal < self[other].wp.signal {
                label = format!("{label}+{other_label}");
            } else {
                label = format!("{other_label}+{label}");
            }
        }
        label
    }

    /// Tree labelled with signal numbers; leaves are `id-signal`, a moving
    /// head is suffixed with `M`.
    pub fn signal_tree(&self, graph: &FeatureGraph, id: RouteId) -> String {
        fn joined<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
            items.into_iter().map(|s| s.to_string()).collect::<Vec<_>>().join("-")
        }

        let route = &self[id];
        let entry = graph.entry(route.wp.entry);
        let leaf = format!("{}-{}", entry.id, route.wp.signal);

        let head = route.wp.signal.to_string();
        let mut label = vec![if self.can_move(graph, id) { format!("{head}M") } else { head }];
        let mut this = leaf.clone();
        if let Some(part) = route.part {
            let part_signals = self[part].signals.iter().map(|s| s.to_string());
            this = format!(
                "[.{} {leaf} {}]",
                joined(label.iter().cloned().chain(part_signals)),
                self.signal_tree(graph, part)
            );
        }
        for &adj in &route.adjuncts {
            let adj_label: Vec<String> = self.adjunct_signals(adj).iter().map(|s| s.to_string()).collect();
            let adj_tree = self.signal_tree(graph, adj);
            if route.wp.signal < self[adj].wp.signal {
                label.extend(adj_label);
                this = format!("[.{} {this} {adj_tree}]", joined(&label));
            } else {
                label = adj_label.into_iter().chain(label).collect();
                this = format!("[.{} {adj_tree} {this}]", joined(&label));
            }
        }
        if let Some(arg) = route.arg {
            let arg_tree = self.signal_tree(graph, arg);
            let signals = joined(&route.signals);
            return if route.wp.signal < self[arg].wp.signal && !entry.is_free_to_move() {
                format!("[.{signals} {this} {arg_tree}]")
            } else {
                format!("[.{signals} {arg_tree} {this}]")
            };
        }
        this
    }

    fn adjunct_signals(&self, id: RouteId) -> Vec<Signal> {
        let route = &self[id];
        let mut signals = vec![route.wp.signal];
        for &other in &route.adjuncts {
            let inner = self.adjunct_signals(other);
            if route.wp.signal < self[other].wp.signal {
                signals.extend(inner);
            } else {
                signals = inner.into_iter().chain(signals).collect();
            }
        }
        signals
    }

    /// Compact arrow notation: `(head<-arg)`, `(arg->head)`, `(host+adj)`,
    /// `head.part`.
    pub fn print_route(&self, graph: &FeatureGraph, id: RouteId) -> String {
        let route = &self[id];
        let mut this = graph.entry(route.wp.entry).id.clone();
        for &adj in &route.adjuncts {
            let inner = self.print_route(graph, adj);
            this = if route.wp.signal < self[adj].wp.signal {
                format!("({this}+{inner})")
            } else {
                format!("({inner}+{this})")
            };
        }
        if let Some(arg) = route.arg {
            let inner = self.print_route(graph, arg);
            this = if route.wp.signal < self[arg].wp.signal {
                format!("({this}<-{inner})")
            } else {
                format!("({inner}->{this})")
            };
        }
        if let Some(part) = route.part {
            this = format!("{this}.{}", self.print_route(graph, part));
        }
        this
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::graph::EntryId;
    use crate::lexicon::Lexicon;
    use pretty_assertions::assert_eq;

    fn wp(graph: &FeatureGraph, signal: Signal, word_index: usize, id: &str) -> WordPart {
        let entry = graph.entries().find(|(_, e)| e.id == id).map(|(id, _)| id).unwrap_or(EntryId(0));
        WordPart { signal, entry, word_index }
    }

    /// Pekka admires Merjaa, assembled by hand.
    fn admires() -> (FeatureGraph, RouteArena, Vec<WordPart>, RouteId) {
        let lexicon =
            Lexicon::parse("Pekka :: N:nom3sg\nadmires :: =N:nom3sg T:pst, =N:acc\nMerjaa :: N:acc").unwrap();
        let graph = FeatureGraph::build(&lexicon);
        let parts = vec![
            wp(&graph, 1, 1, "Pekka"),
            wp(&graph, 2, 2, "admires"),
            wp(&graph, 3, 2, "admires'"),
            wp(&graph, 4, 3, "Merjaa"),
        ];
        let mut arena = RouteArena::default();
        let leaves: Vec<RouteId> = parts.iter().map(|&p| arena.push(Route::leaf(p, false))).collect();

        let remnant = arena[leaves[2]].extend(leaves[3], &arena[leaves[3]], Relation::Argument);
        let remnant = arena.push(remnant);
        let with_part = arena[leaves[1]].extend(remnant, &arena[remnant], Relation::Part);
        let with_part = arena.push(with_part);
        let root = arena[with_part].extend(leaves[0], &arena[leaves[0]], Relation::Argument);
        let root = arena.push(root);
        (graph, arena, parts, root)
    }

    #[test]
    fn renders_label_tree_and_arrows() {
        let (graph, arena, _, root) = admires();
        assert_eq!(arena.label_tree(&graph, root), "[.admires Pekka [.admires admires [.admires' admires' Merjaa]]]");
        assert_eq!(arena.print_route(&graph, root), "(Pekka->admires).(admires'<-Merjaa)");
        assert_eq!(
            arena.signal_tree(&graph, root),
            "[.1-2-3-4 Pekka-1 [.2-3-4 admires-2 [.3-4 admires'-3 Merjaa-4]]]"
        );
    }

    #[test]
    fn size_weight_and_span() {
        let (_, arena, parts, root) = admires();
        let route = &arena[root];
        assert_eq!(route.size(), 4);
        assert_eq!(route.weight, 3);
        assert_eq!((route.rs.low, route.rs.high), (1, 4));
        assert_eq!(arena.cost(root, &parts), 0.0);
    }

    #[test]
    fn distant_attachment_costs_more() {
        let head = WordPart { signal: 4, entry: EntryId(0), word_index: 4 };
        let near = WordPart { signal: 3, entry: EntryId(1), word_index: 3 };
        let far = WordPart { signal: 1, entry: EntryId(1), word_index: 1 };
        assert_eq!(relation_cost(head, near, near, near), 0.0);
        assert!((relation_cost(head, far, far, far) - 2.2).abs() < 1e-9);

        // A sub-route whose edge word is adjacent is cheap in word terms.
        let edge = WordPart { signal: 3, entry: EntryId(1), word_index: 3 };
        assert!((relation_cost(head, far, far, edge) - 0.2).abs() < 1e-9);
    }
}
