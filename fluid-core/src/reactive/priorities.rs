//! Priority Arithmetic
//!
//! Helpers for splicing a dependent into the notification order relative
//! to an existing one, without renumbering anything: `before(x)` and
//! `after(x)` return a numeric tier immediately adjacent to the anchor.
//!
//! Anchors can be a bare number, a [`Priority`], or a derivation (the
//! tier it registered with). Anchoring past a sentinel tier is
//! nonsensical; those calls log a warning and return a documented
//! fallback instead of failing:
//!
//! - `before`/`after` a bare sentinel tier returns the tier unchanged.
//! - `before` a derivation pinned at [`HIGHEST`] returns its pool's last
//!   occupied numeric tier (base when none), the boundary adjacent to the
//!   highest tier. `after` a derivation pinned at [`LOWEST`] mirrors
//!   that with the first occupied numeric tier.

use crate::graph::pool::Priority;
use crate::graph::store;

use super::derivation::Derivation;
use super::source::sealed::AsNode;

/// Default tier for new derivations and listeners.
pub const BASE: Priority = Priority::BASE;

/// Tier that fires before every numeric tier.
pub const HIGHEST: Priority = Priority::Highest;

/// Tier that fires after every numeric tier.
pub const LOWEST: Priority = Priority::Lowest;

#[doc(hidden)]
#[derive(Debug, Clone, Copy)]
pub enum AnchorPoint {
    /// A tier given directly, with no node attached.
    Bare(Priority),
    /// A derivation's own tier plus the occupied numeric bounds of its
    /// dependents pool.
    Node {
        priority: Priority,
        first_tier: Option<i64>,
        last_tier: Option<i64>,
    },
}

/// Anything [`before`] and [`after`] can anchor to.
pub trait Anchor {
    #[doc(hidden)]
    fn resolve(&self) -> AnchorPoint;
}

impl Anchor for i64 {
    fn resolve(&self) -> AnchorPoint {
        AnchorPoint::Bare(Priority::Numeric(*self))
    }
}

impl Anchor for Priority {
    fn resolve(&self) -> AnchorPoint {
        AnchorPoint::Bare(*self)
    }
}

impl<T> Anchor for Derivation<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn resolve(&self) -> AnchorPoint {
        let (priority, first_tier, last_tier) = store::priority_anchor(self.node().id());
        AnchorPoint::Node {
            priority,
            first_tier,
            last_tier,
        }
    }
}

impl<A: Anchor> Anchor for &A {
    fn resolve(&self) -> AnchorPoint {
        A::resolve(self)
    }
}

/// A tier that fires immediately before the anchor.
pub fn before<A: Anchor>(anchor: A) -> Priority {
    match anchor.resolve() {
        AnchorPoint::Bare(Priority::Numeric(tier)) => Priority::Numeric(tier - 1),
        AnchorPoint::Bare(sentinel) => {
            tracing::warn!(
                "before() needs a numeric anchor; a bare sentinel tier has no predecessor"
            );
            sentinel
        }
        AnchorPoint::Node {
            priority: Priority::Numeric(tier),
            ..
        } => Priority::Numeric(tier - 1),
        AnchorPoint::Node {
            priority: Priority::Highest,
            last_tier,
            ..
        } => Priority::Numeric(last_tier.unwrap_or(0)),
        AnchorPoint::Node {
            priority: Priority::Lowest,
            ..
        } => {
            tracing::warn!(
                "before() cannot anchor to a derivation pinned at the lowest tier"
            );
            Priority::Lowest
        }
    }
}

/// A tier that fires immediately after the anchor.
pub fn after<A: Anchor>(anchor: A) -> Priority {
    match anchor.resolve() {
        AnchorPoint::Bare(Priority::Numeric(tier)) => Priority::Numeric(tier + 1),
        AnchorPoint::Bare(sentinel) => {
            tracing::warn!(
                "after() needs a numeric anchor; a bare sentinel tier has no successor"
            );
            sentinel
        }
        AnchorPoint::Node {
            priority: Priority::Numeric(tier),
            ..
        } => Priority::Numeric(tier + 1),
        AnchorPoint::Node {
            priority: Priority::Lowest,
            first_tier,
            ..
        } => Priority::Numeric(first_tier.unwrap_or(0)),
        AnchorPoint::Node {
            priority: Priority::Highest,
            ..
        } => {
            tracing::warn!(
                "after() cannot anchor to a derivation pinned at the highest tier"
            );
            Priority::Highest
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
