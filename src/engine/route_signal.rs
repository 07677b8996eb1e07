//! Route signals: the span and movement summary of a route.
//!
//! ```text
//!          low        head          high
//!   ...  [  3    4     5     6      7  ]  ...      movers:      {5}
//!                                                  used_movers: {1}
//! ```
//!
//! `low..=high` is the contiguous stretch the route governs directly. Movers
//! are signals of the route that are still free to land elsewhere; used
//! movers have already been consumed as an argument somewhere inside the
//! route. After every combination `movers ∩ used_movers = ∅`.
//!
//! Whether two routes may combine is decided by a [`NeighborPolicy`]. The
//! default, [`MoverAware`], accepts contiguous spans and lets an unresolved
//! mover reach across material that has not claimed the same movers.

use crate::Signal;
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteSignal {
    pub head: Signal,
    pub low: Signal,
    pub high: Signal,
    pub movers: BTreeSet<Signal>,
    pub used_movers: BTreeSet<Signal>,
}

impl RouteSignal {
    /// Summary of a single word part.
    pub fn leaf(head: Signal, free_to_move: bool) -> Self {
        let movers = if free_to_move { BTreeSet::from([head]) } else { BTreeSet::new() };
        RouteSignal { head, low: head, high: head, movers, used_movers: BTreeSet::new() }
    }

    /// Attach the remnant part of this route's lexeme.
    pub fn with_part(&self, part: &RouteSignal) -> Self {
        let mut next = self.clone();
        next.movers.extend(&part.movers);
        next.used_movers.extend(&part.used_movers);
        next.low = next.low.min(part.low);
        next.high = next.high.max(part.high);
        next.settle()
    }

    /// Attach `arg` as this route's argument.
    ///
    /// A mover argument is consumed: its head moves to `used_movers` and the
    /// span is not stretched down to it.
    pub fn with_arg(&self, arg: &RouteSignal) -> Self {
        let mut next = self.clone();
        if next.movers.remove(&self.head) {
            next.used_movers.insert(self.head);
        }
        next.movers.retain(|m| !arg.used_movers.contains(m));
        next.used_movers.extend(&arg.used_movers);

        if next.movers.remove(&arg.head) {
            next.used_movers.insert(arg.head);
        } else if arg.movers.contains(&arg.head) {
            next.used_movers.insert(arg.head);
        } else {
            next.low = next.low.min(arg.low);
        }
        // Movers pending further down the argument keep travelling up.
        next.movers.extend(arg.movers.iter().filter(|&&m| m != arg.head));
        next.high = next.high.max(arg.high);
        next.settle()
    }

    /// Attach `adjunct`. A host adjoined by something still moving becomes a
    /// mover itself.
    pub fn with_adjunct(&self, adjunct: &RouteSignal) -> Self {
        let mut next = self.clone();
        next.low = next.low.min(adjunct.low);
        next.high = next.high.max(adjunct.high);
        next.used_movers.extend(&adjunct.used_movers);
        if !adjunct.movers.is_empty() {
            next.movers.insert(self.head);
        }
        next.settle()
    }

    fn settle(mut self) -> Self {
        let used = &self.used_movers;
        self.movers.retain(|m| !used.contains(m));
        self
    }

    /// Spans cross: one starts strictly inside the other. Routes starting at
    /// the same signal share that signal and are caught by the signal sets.
    pub fn overlaps(&self, other: &RouteSignal) -> bool {
        use std::cmp::Ordering::*;
        match self.low.cmp(&other.low) {
            Less => self.high > other.low,
            Greater => self.low < other.high,
            Equal => false,
        }
    }

    pub fn same_scope(&self, other: &RouteSignal) -> bool {
        self.low == other.low
            && self.high == other.high
            && self.movers == other.movers
            && self.used_movers == other.used_movers
    }

    /// Strict adjacency: this span ends right before `other` starts.
    pub fn is_lower_neighbor_of(&self, other: &RouteSignal) -> bool {
        self.head != other.head && self.high + 1 == other.low
    }

    /// This route's head is an unused mover sitting below `other`.
    pub fn is_lower_neighbor_due_movement_for(&self, other: &RouteSignal) -> bool {
        self.head != other.head
            && self.movers.contains(&self.head)
            && self.high < other.low
            && !other.used_movers.contains(&self.head)
            && !other.movers.contains(&self.head)
    }
}

impl fmt::Display for RouteSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{}..{} head:{} movers:{:?} used:{:?}>",
            self.low, self.high, self.head, self.movers, self.used_movers
        )
    }
}

/// Decides whether two routes are close enough to combine.
pub trait NeighborPolicy: fmt::Debug {
    fn name(&self) -> &'static str;
    fn are_neighbors(&self, a: &RouteSignal, b: &RouteSignal) -> bool;
}

/// Order two summaries by head signal.
fn lower_higher<'r>(a: &'r RouteSignal, b: &'r RouteSignal) -> (&'r RouteSignal, &'r RouteSignal) {
    if a.head < b.head { (a, b) } else { (b, a) }
}

/// Contiguous spans only.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl NeighborPolicy for Strict {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn are_neighbors(&self, a: &RouteSignal, b: &RouteSignal) -> bool {
        a.is_lower_neighbor_of(b) || b.is_lower_neighbor_of(a)
    }
}

/// Contiguous spans, or a head that is a pending mover of the lower span
/// reaching over a gap towards a span with disjoint movers.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoverAware;

impl NeighborPolicy for MoverAware {
    fn name(&self) -> &'static str {
        "mover-aware"
    }

    fn are_neighbors(&self, a: &RouteSignal, b: &RouteSignal) -> bool {
        if a.head == b.head {
            return false;
        }
        let (lower, higher) = lower_higher(a, b);
        if lower.high + 1 == higher.low {
            return true;
        }
        (lower.movers.contains(&a.head) || lower.movers.contains(&b.head))
            && lower.high < higher.low
            && lower.movers.is_disjoint(&higher.movers)
    }
}

/// Contiguous spans, or a lower route whose own head is an unused mover.
#[derive(Debug, Clone, Copy, Default)]
pub struct MovementLicensed;

impl NeighborPolicy for MovementLicensed {
    fn name(&self) -> &'static str {
        "movement-licensed"
    }

    fn are_neighbors(&self, a: &RouteSignal, b: &RouteSignal) -> bool {
        Strict.are_neighbors(a, b)
            || a.is_lower_neighbor_due_movement_for(b)
            || b.is_lower_neighbor_due_movement_for(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rs(head: Signal, low: Signal, high: Signal, movers: &[Signal], used: &[Signal]) -> RouteSignal {
        RouteSignal {
            head,
            low,
            high,
            movers: movers.iter().copied().collect(),
            used_movers: used.iter().copied().collect(),
        }
    }

    #[test]
    fn gap_is_bridged_only_by_a_free_mover() {
        let higher = rs(4, 4, 5, &[], &[]);

        assert!(!MoverAware.are_neighbors(&rs(1, 1, 2, &[], &[]), &higher));
        assert!(MoverAware.are_neighbors(&rs(1, 1, 2, &[1], &[]), &higher));
        assert!(MoverAware.are_neighbors(&higher, &rs(1, 1, 2, &[1], &[])));
        // The higher side already carries the same mover.
        assert!(!MoverAware.are_neighbors(&rs(1, 1, 2, &[1], &[]), &rs(4, 4, 5, &[1], &[])));
        // A mover that is not one of the two heads does not help.
        assert!(!MoverAware.are_neighbors(&rs(2, 1, 2, &[1], &[]), &higher));

        assert!(!Strict.are_neighbors(&rs(1, 1, 2, &[1], &[]), &higher));
        assert!(Strict.are_neighbors(&rs(1, 1, 3, &[], &[]), &higher));
        assert!(!Strict.are_neighbors(&rs(4, 4, 4, &[], &[]), &rs(4, 4, 4, &[], &[])));
    }

    #[test]
    fn movement_licensed_requires_an_unused_mover() {
        let lower = rs(1, 1, 1, &[1], &[]);
        assert!(MovementLicensed.are_neighbors(&lower, &rs(4, 3, 4, &[], &[])));
        assert!(!MovementLicensed.are_neighbors(&lower, &rs(4, 3, 4, &[], &[1])));
        assert!(!MovementLicensed.are_neighbors(&rs(2, 2, 2, &[], &[]), &rs(4, 4, 4, &[], &[])));
    }

    #[test]
    fn arg_consumes_mover() {
        let head = rs(4, 4, 4, &[], &[]);
        let mover = RouteSignal::leaf(1, true);
        let combined = head.with_arg(&mover);
        assert_eq!(combined, rs(4, 4, 4, &[], &[1]));

        let plain = head.with_arg(&RouteSignal::leaf(5, false));
        assert_eq!(plain, rs(4, 4, 5, &[], &[]));

        let with_part = rs(3, 3, 3, &[], &[]).with_part(&combined);
        assert_eq!(with_part, rs(3, 3, 4, &[], &[1]));
    }

    #[test]
    fn moving_adjunct_makes_host_a_mover() {
        let host = rs(2, 2, 2, &[], &[]);
        assert_eq!(host.with_adjunct(&RouteSignal::leaf(1, true)), rs(2, 1, 2, &[2], &[]));
        assert_eq!(host.with_adjunct(&RouteSignal::leaf(3, false)), rs(2, 2, 3, &[], &[]));
    }

    #[test]
    fn overlap_is_a_crossing_of_spans() {
        assert!(rs(1, 1, 3, &[], &[]).overlaps(&rs(2, 2, 4, &[], &[])));
        assert!(rs(3, 2, 4, &[], &[]).overlaps(&rs(1, 1, 3, &[], &[])));
        assert!(!rs(1, 1, 2, &[], &[]).overlaps(&rs(3, 3, 4, &[], &[])));
        assert!(!rs(1, 1, 2, &[], &[]).overlaps(&rs(2, 2, 2, &[], &[])));
        assert!(rs(1, 1, 1, &[], &[]).same_scope(&rs(2, 1, 1, &[], &[])));
    }
}
