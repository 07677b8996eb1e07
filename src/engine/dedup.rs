//! Deduplication keys for route construction.
//!
//! Route combination is re-entrant: every step revisits all earlier routes,
//! and the same combination can be reached along different walks. Without a
//! stable key the search would:
//!
//! - Loop indefinitely (re-deriving the same route from its own parts)
//! - Grow memory unbounded
//! - Produce order-dependent results
//!
//! ## What counts as "the same route"
//!
//! [`RouteKey`] is structural: the root signal plus the *ids* of the part,
//! argument and adjunct sub-routes (adjuncts in attachment order). Since every
//! stored sub-route is itself unique, id identity is structural identity.
//!
//! [`ScopeProfile`] groups routes with the same root, span and mover state. It
//! does not identify routes; it bounds how many alternatives one scope may
//! accumulate.

use super::route::{Route, RouteId};
use crate::Signal;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct RouteKey {
    pub(crate) wp: Signal,
    pub(crate) part: Option<RouteId>,
    pub(crate) arg: Option<RouteId>,
    pub(crate) adjuncts: Vec<RouteId>,
}

impl RouteKey {
    pub(crate) fn from_route(route: &Route) -> Self {
        RouteKey { wp: route.wp.signal, part: route.part, arg: route.arg, adjuncts: route.adjuncts.clone() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ScopeProfile {
    pub(crate) wp: Signal,
    pub(crate) low: Signal,
    pub(crate) high: Signal,
    pub(crate) movers: Vec<Signal>,
    pub(crate) used_movers: Vec<Signal>,
}

impl ScopeProfile {
    pub(crate) fn from_route(route: &Route) -> Self {
        let rs = &route.rs;
        ScopeProfile {
            wp: rs.head,
            low: rs.low,
            high: rs.high,
            movers: rs.movers.iter().copied().collect(),
            used_movers: rs.used_movers.iter().copied().collect(),
        }
    }
}
