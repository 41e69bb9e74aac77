//! Node Store and Propagation Engine
//!
//! The store is the central registry that holds every reactive node and
//! listener registration, and implements the read/write/notify algorithms
//! that keep cached values correct.
//!
//! # How It Works
//!
//! 1. Cells and derivations are registered here and addressed by stable
//!    integer ids. Typed handles in [`crate::reactive`] are thin wrappers
//!    over those ids.
//!
//! 2. A write to a cell stores the new value, then walks the cell's
//!    dependents depth-first: derivation caches are cleared eagerly and
//!    recursively, listeners re-read their sources and run.
//!
//! 3. Reads are lazy. A derivation recomputes only when its cache is
//!    empty, and caches the result for every later read until the next
//!    invalidation.
//!
//! Because invalidation is eager and recursive while recomputation is
//! lazy and memoized, a listener fired by a write never observes a stale
//! mix of values: every derivation reachable from the written cell along
//! the path that fired the listener has already dropped its cache, so the
//! listener's reads recompute from the current state of the graph.
//!
//! # Locking
//!
//! The registry sits behind a single `RwLock`, taken only for short
//! critical sections. No lock is held while a compute function or a user
//! callback runs, so reads may recurse through the graph and listeners
//! may freely write to other cells (nested, synchronous propagation). A
//! cyclic graph makes that recursion unbounded; cycles are a usage bug
//! and are not detected.

use std::collections::HashMap;
use std::mem;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::error::UsageError;

use super::node::{
    ComputeFn, DependentKey, ErasedValue, ListenerId, Node, NodeId, NodeKind, ReactFn,
};
use super::pool::Priority;

/// One listener registration. Listeners live beside the graph, not in it:
/// nothing can depend on a listener.
pub(crate) struct ListenerRecord {
    react: ReactFn,
    /// Strong handles: a listener keeps every source registered until it
    /// is disposed.
    sources: SmallVec<[NodeRef; 2]>,
    priority: Priority,
}

/// The process-wide node registry.
#[derive(Default)]
struct NodeStore {
    nodes: HashMap<NodeId, Node>,
    listeners: HashMap<ListenerId, ListenerRecord>,
}

static STORE: OnceLock<RwLock<NodeStore>> = OnceLock::new();

fn store() -> &'static RwLock<NodeStore> {
    STORE.get_or_init(|| RwLock::new(NodeStore::default()))
}

/// Strong handle to a registered node.
///
/// Clones share the registration; the node is removed from the store when
/// the last clone drops. Derivations and listeners hold clones of their
/// sources' handles, so a node stays registered for as long as a user
/// handle or a live dependent can still read it.
#[derive(Clone)]
pub(crate) struct NodeRef(Arc<NodeGuard>);

struct NodeGuard {
    id: NodeId,
}

impl NodeRef {
    fn register(id: NodeId) -> Self {
        Self(Arc::new(NodeGuard { id }))
    }

    pub(crate) fn id(&self) -> NodeId {
        self.0.id
    }
}

impl Drop for NodeGuard {
    fn drop(&mut self) {
        release(self.id);
    }
}

/// Register a new cell node.
pub(crate) fn insert_cell(value: ErasedValue) -> NodeRef {
    let id = NodeId::new();
    store().write().nodes.insert(id, Node::cell(value));
    NodeRef::register(id)
}

/// Register a new derivation node and subscribe it to every source at its
/// priority tier. The compute function is not invoked here; the first
/// read is the first computation.
pub(crate) fn insert_derivation(
    sources: SmallVec<[NodeRef; 2]>,
    compute: ComputeFn,
    priority: Priority,
) -> NodeRef {
    let id = NodeId::new();
    let mut guard = store().write();
    for source in &sources {
        let node = guard
            .nodes
            .get_mut(&source.id())
            .unwrap_or_else(|| panic!("{}", UsageError::UnknownNode(source.id())));
        node.dependents.insert(priority, DependentKey::Derivation(id));
    }
    guard
        .nodes
        .insert(id, Node::derivation(compute, sources, priority));
    drop(guard);
    NodeRef::register(id)
}

/// Register a new listener and subscribe it to every source at the given
/// priority tier.
pub(crate) fn insert_listener(
    sources: SmallVec<[NodeRef; 2]>,
    react: ReactFn,
    priority: Priority,
) -> ListenerId {
    let id = ListenerId::new();
    let mut guard = store().write();
    for source in &sources {
        let node = guard
            .nodes
            .get_mut(&source.id())
            .unwrap_or_else(|| panic!("{}", UsageError::UnknownNode(source.id())));
        node.dependents.insert(priority, DependentKey::Listener(id));
    }
    guard.listeners.insert(
        id,
        ListenerRecord {
            react,
            sources,
            priority,
        },
    );
    id
}

/// Remove a listener registration from every source pool. Removing a
/// listener that is already gone is a no-op, so disposal is idempotent.
pub(crate) fn remove_listener(id: ListenerId) {
    let record = {
        let mut guard = store().write();
        let Some(record) = guard.listeners.remove(&id) else {
            return;
        };
        for source in &record.sources {
            if let Some(node) = guard.nodes.get_mut(&source.id()) {
                node.dependents
                    .remove(record.priority, DependentKey::Listener(id));
            }
        }
        record
    };
    // The record's source handles drop here, outside the critical
    // section; releasing a last handle re-enters the store.
    drop(record);
}

/// Whether a listener registration is still present.
pub(crate) fn listener_exists(id: ListenerId) -> bool {
    store().read().listeners.contains_key(&id)
}

/// Drop a node once its last handle is gone. Derivations are also
/// unsubscribed from their sources' pools.
fn release(id: NodeId) {
    let removed = {
        let mut guard = store().write();
        let Some(node) = guard.nodes.remove(&id) else {
            return;
        };
        if let NodeKind::Derivation {
            sources, priority, ..
        } = &node.kind
        {
            for source in sources {
                if let Some(source_node) = guard.nodes.get_mut(&source.id()) {
                    source_node
                        .dependents
                        .remove(*priority, DependentKey::Derivation(id));
                }
            }
        }
        node
    };
    // Cascading source-handle drops happen outside the critical section.
    drop(removed);
}

/// Read a node's current value.
///
/// Cells return the stored value; reading is passive and creates no
/// subscription. Derivations return the cached value when present.
/// Otherwise the compute function is evaluated over the sources' current
/// values, read left to right with a single read per source, and the
/// result is cached and returned. No lock is held while compute runs, so
/// reads recurse through arbitrarily deep graphs.
pub(crate) fn read(id: NodeId) -> ErasedValue {
    let (compute, sources) = {
        let guard = store().read();
        let node = guard
            .nodes
            .get(&id)
            .unwrap_or_else(|| panic!("{}", UsageError::UnknownNode(id)));
        match &node.kind {
            NodeKind::Cell { value } => return value.clone(),
            NodeKind::Derivation {
                cache: Some(value), ..
            } => return value.clone(),
            NodeKind::Derivation {
                compute, sources, ..
            } => (compute.clone(), sources.clone()),
        }
    };

    let values: SmallVec<[ErasedValue; 2]> =
        sources.iter().map(|source| read(source.id())).collect();
    let result = compute(&values);

    let mut guard = store().write();
    if let Some(node) = guard.nodes.get_mut(&id) {
        if let NodeKind::Derivation { cache, .. } = &mut node.kind {
            *cache = Some(result.clone());
        }
    }
    drop(guard);
    result
}

/// Whether a derivation currently holds a cached value. Cells always do.
pub(crate) fn has_cached_value(id: NodeId) -> bool {
    let guard = store().read();
    let node = guard
        .nodes
        .get(&id)
        .unwrap_or_else(|| panic!("{}", UsageError::UnknownNode(id)));
    match &node.kind {
        NodeKind::Cell { .. } => true,
        NodeKind::Derivation { cache, .. } => cache.is_some(),
    }
}

/// Number of dependent registrations across all of a node's tiers.
pub(crate) fn dependent_count(id: NodeId) -> usize {
    let guard = store().read();
    guard.nodes.get(&id).map_or(0, |node| node.dependents.len())
}

/// Anchor data for priority arithmetic: the node's own tier plus the
/// occupied numeric bounds of its dependents pool.
pub(crate) fn priority_anchor(id: NodeId) -> (Priority, Option<i64>, Option<i64>) {
    let guard = store().read();
    let node = guard
        .nodes
        .get(&id)
        .unwrap_or_else(|| panic!("{}", UsageError::UnknownNode(id)));
    let priority = match &node.kind {
        NodeKind::Cell { .. } => Priority::BASE,
        NodeKind::Derivation { priority, .. } => *priority,
    };
    (
        priority,
        node.dependents.first_tier(),
        node.dependents.last_tier(),
    )
}

/// Store a new value into a cell, then notify its dependents in pool
/// order. Writing to anything that is not a cell aborts with a usage
/// error; the typed handles make that unreachable, so hitting it means a
/// raw id was forged.
pub(crate) fn write(id: NodeId, value: ErasedValue) {
    let (previous, pending) = {
        let mut guard = store().write();
        let node = guard
            .nodes
            .get_mut(&id)
            .unwrap_or_else(|| panic!("{}", UsageError::UnknownNode(id)));
        let previous = match &mut node.kind {
            NodeKind::Cell { value: slot } => mem::replace(slot, value),
            NodeKind::Derivation { .. } => panic!("{}", UsageError::NotACell(id)),
        };
        (previous, node.dependents.snapshot())
    };
    // The displaced value drops outside the critical section.
    drop(previous);

    tracing::trace!(node = id.raw(), dependents = pending.len(), "cell written");
    notify(id, pending);
}

/// Fire one node's dependents.
///
/// Walks a snapshot of the pool in firing order. Before each dispatch the
/// entry is re-checked against the live pool, so a dependent removed
/// earlier in the pass, including by itself, is skipped without
/// disturbing its siblings. Registrations added during the pass fire on
/// the next notification, not this one.
fn notify(owner: NodeId, pending: Vec<(Priority, DependentKey)>) {
    for (tier, key) in pending {
        match key {
            DependentKey::Derivation(dependent) => {
                if let Some(cascade) = invalidate(owner, tier, dependent) {
                    notify(dependent, cascade);
                }
            }
            DependentKey::Listener(listener) => {
                react(owner, tier, listener);
            }
        }
    }
}

/// Clear a derivation's cache and return its own dependents snapshot, so
/// invalidation propagates depth-first through the downstream subgraph
/// before the caller's pass resumes. Returns `None` when the
/// registration is no longer live.
fn invalidate(owner: NodeId, tier: Priority, dependent: NodeId) -> Option<Vec<(Priority, DependentKey)>> {
    let (stale, cascade) = {
        let mut guard = store().write();
        let registered = guard
            .nodes
            .get(&owner)
            .is_some_and(|node| node.dependents.contains(tier, DependentKey::Derivation(dependent)));
        if !registered {
            return None;
        }
        let node = guard.nodes.get_mut(&dependent)?;
        let stale = match &mut node.kind {
            NodeKind::Derivation { cache, .. } => cache.take(),
            NodeKind::Cell { .. } => None,
        };
        (stale, node.dependents.snapshot())
    };
    drop(stale);
    tracing::trace!(node = dependent.raw(), "cache invalidated");
    Some(cascade)
}

/// Re-run a listener during a notification pass, if it is still
/// registered with the owning node at dispatch time.
fn react(owner: NodeId, tier: Priority, listener: ListenerId) {
    let job = {
        let guard = store().read();
        let registered = guard
            .nodes
            .get(&owner)
            .is_some_and(|node| node.dependents.contains(tier, DependentKey::Listener(listener)));
        if registered {
            guard
                .listeners
                .get(&listener)
                .map(|record| (record.react.clone(), record.sources.clone()))
        } else {
            None
        }
    };
    if let Some((react, sources)) = job {
        run_react(react, &sources);
    }
}

/// Invoke a listener once, outside any notification pass. Used for
/// immediate invocation at registration time.
pub(crate) fn run_listener(id: ListenerId) {
    let job = {
        let guard = store().read();
        guard
            .listeners
            .get(&id)
            .map(|record| (record.react.clone(), record.sources.clone()))
    };
    if let Some((react, sources)) = job {
        run_react(react, &sources);
    }
}

/// Read every source fresh and hand the values to the callback. Reads
/// happen with no lock held, so any derivation invalidated by the
/// current write recomputes here, against the written state.
fn run_react(react: ReactFn, sources: &[NodeRef]) {
    let values: SmallVec<[ErasedValue; 2]> =
        sources.iter().map(|source| read(source.id())).collect();
    react(&values);
}
