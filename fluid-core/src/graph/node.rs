//! Graph Nodes
//!
//! This module defines the node types that live in the dependency graph,
//! together with the identifiers used to address nodes and listener
//! registrations.
//!
//! Values are opaque to the engine: nodes store them type-erased, and the
//! typed handles in [`crate::reactive`] recover the concrete type at the
//! boundary.

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use smallvec::SmallVec;

use super::pool::{Priority, PriorityPool};
use super::store::NodeRef;

/// Unique identifier for a node in the dependency graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Generate a new unique node ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Unique identifier for a listener registration.
///
/// Listeners are dependents, not nodes: they have no value and nothing can
/// depend on them, so they are addressed separately from [`NodeId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub(crate) fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Type-erased value slot shared between the store and the typed handles.
#[doc(hidden)]
pub type ErasedValue = Arc<dyn Any + Send + Sync>;

/// Erased compute function of a derivation. Receives the sources' current
/// values positionally and returns the derived value.
pub(crate) type ComputeFn = Arc<dyn Fn(&[ErasedValue]) -> ErasedValue + Send + Sync>;

/// Erased listener callback. Receives the sources' freshly read values.
pub(crate) type ReactFn = Arc<dyn Fn(&[ErasedValue]) + Send + Sync>;

/// Identity of one dependent registration inside a node's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum DependentKey {
    /// A derivation whose cache must be cleared when the source changes.
    Derivation(NodeId),
    /// A listener whose callback must be re-run when the source changes.
    Listener(ListenerId),
}

/// The payload of a node: every node is either a mutable cell or a
/// memoized derivation. Dispatch is by pattern match.
pub(crate) enum NodeKind {
    /// A mutable leaf. Written directly, never recomputed.
    Cell { value: ErasedValue },

    /// A memoized computation over a fixed, ordered, non-empty source
    /// list. `cache` is `Some` only while no source has changed since the
    /// value was computed.
    Derivation {
        compute: ComputeFn,
        /// Strong handles: a derivation keeps every source registered for
        /// as long as it is registered itself.
        sources: SmallVec<[NodeRef; 2]>,
        cache: Option<ErasedValue>,
        /// Tier this derivation occupies in its sources' pools.
        priority: Priority,
    },
}

/// A node in the dependency graph.
pub(crate) struct Node {
    pub(crate) kind: NodeKind,
    /// Dependent registrations, partitioned by priority tier.
    pub(crate) dependents: PriorityPool,
}

impl Node {
    /// Create a new cell node.
    pub(crate) fn cell(value: ErasedValue) -> Self {
        Self {
            kind: NodeKind::Cell { value },
            dependents: PriorityPool::new(),
        }
    }

    /// Create a new derivation node with an empty cache. The first read
    /// triggers the first computation.
    pub(crate) fn derivation(
        compute: ComputeFn,
        sources: SmallVec<[NodeRef; 2]>,
        priority: Priority,
    ) -> Self {
        Self {
            kind: NodeKind::Derivation {
                compute,
                sources,
                cache: None,
                priority,
            },
            dependents: PriorityPool::new(),
        }
    }
}
