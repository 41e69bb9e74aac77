//! Derivation Implementation
//!
//! A Derivation is a memoized value computed from a fixed list of source
//! nodes by a pure function.
//!
//! # How Derivations Work
//!
//! 1. `derive` registers the node with each source at the derivation's
//!    priority tier. The compute function is not run at construction.
//!
//! 2. The first read evaluates the compute function over the sources'
//!    current values, left to right, and caches the result.
//!
//! 3. When any source changes, the cache is cleared eagerly, and the
//!    clearing propagates depth-first through the derivation's own
//!    dependents before the source's notification pass resumes.
//!
//! 4. The next read recomputes from the current state of the graph and
//!    refills the cache.
//!
//! # Why This Matters
//!
//! Invalidation is cheap and recomputation is lazy. A write touches each
//! downstream cache once per path, but values are only recomputed for the
//! derivations something actually reads, and at that point every stale
//! cache upstream has already been dropped. Readers never observe a mix
//! of pre-write and post-write values.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::graph::node::{ComputeFn, ErasedValue, NodeId};
use crate::graph::pool::Priority;
use crate::graph::store::{self, NodeRef};

use super::source::{sealed, Reactive, Sources};

/// Construction options for [`derive_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeriveProps {
    /// Tier this derivation occupies in its sources' pools. Controls when
    /// its invalidation fires relative to sibling dependents of the same
    /// source, not when it recomputes.
    pub priority: Priority,
}

/// A memoized value derived from one or more source nodes.
///
/// # Example
///
/// ```rust,ignore
/// let celsius = val(21.0);
/// let fahrenheit = derive(&celsius, |c: f64| c * 9.0 / 5.0 + 32.0);
///
/// assert_eq!(fahrenheit.get(), 69.8);
/// ```
pub struct Derivation<T>
where
    T: Clone + Send + Sync + 'static,
{
    node: NodeRef,
    _value: PhantomData<fn() -> T>,
}

/// Create a derivation over the given sources at the base priority tier.
///
/// `sources` is a single node reference or a tuple of node references;
/// the compute function receives the values positionally. The function
/// must be pure: it is skipped entirely whenever the cache is warm.
pub fn derive<S, T, F>(sources: S, compute: F) -> Derivation<T>
where
    S: Sources,
    T: Clone + Send + Sync + 'static,
    F: Fn(S::Values) -> T + Send + Sync + 'static,
{
    derive_with(sources, compute, DeriveProps::default())
}

/// Like [`derive`], with an explicit priority tier.
pub fn derive_with<S, T, F>(sources: S, compute: F, props: DeriveProps) -> Derivation<T>
where
    S: Sources,
    T: Clone + Send + Sync + 'static,
    F: Fn(S::Values) -> T + Send + Sync + 'static,
{
    let node_refs = sealed::SourceSet::node_refs(&sources);
    let unpack: fn(&[ErasedValue]) -> S::Values = S::unpack;
    let erased: ComputeFn =
        Arc::new(move |values: &[ErasedValue]| -> ErasedValue { Arc::new(compute(unpack(values))) });
    Derivation {
        node: store::insert_derivation(node_refs, erased, props.priority),
        _value: PhantomData,
    }
}

impl<T> Derivation<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Get the derivation's unique node ID.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Get the current value, recomputing if the cache is stale.
    pub fn get(&self) -> T {
        sealed::downcast_value(&store::read(self.node.id()))
    }

    /// Check whether a cached value is currently held.
    pub fn has_value(&self) -> bool {
        store::has_cached_value(self.node.id())
    }

    /// Get the number of dependent registrations across all tiers.
    pub fn dependent_count(&self) -> usize {
        store::dependent_count(self.node.id())
    }
}

impl<T> sealed::AsNode for Derivation<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn node(&self) -> &NodeRef {
        &self.node
    }
}

impl<T> Reactive for Derivation<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn get(&self) -> T {
        Derivation::get(self)
    }
}

impl<T> Clone for Derivation<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            _value: PhantomData,
        }
    }
}

impl<T> Debug for Derivation<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Derivation")
            .field("id", &self.id())
            .field("has_value", &self.has_value())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
