//! Cell Implementation
//!
//! A Cell is the mutable leaf of the reactive graph. It holds a value and
//! a pool of dependents, and is the only node kind that accepts writes.
//!
//! # How Cells Work
//!
//! 1. `val` registers a fresh node with an empty dependents pool.
//!
//! 2. Reading is passive: it returns the stored value and never creates a
//!    subscription. Dependents are declared explicitly through `derive`
//!    and `listen`.
//!
//! 3. Writing stores the new value unconditionally, with no equality
//!    check, then synchronously notifies every dependent in pool order.
//!    The whole cascade, including callbacks it triggers transitively,
//!    completes before the write returns.
//!
//! # Handles
//!
//! `Cell<T>` is a cheap handle. Clones share the same node, and the node
//! stays registered while any handle or any dependent can still reach it.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::graph::node::NodeId;
use crate::graph::store::{self, NodeRef};

use super::source::{sealed, Reactive};

/// A mutable reactive cell holding a value of type `T`.
///
/// # Example
///
/// ```rust,ignore
/// let count = val(0);
///
/// // Read the value
/// let value = count.get();
///
/// // Store a new value (notifies dependents)
/// count.set(5);
/// ```
pub struct Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    node: NodeRef,
    _value: PhantomData<fn() -> T>,
}

/// Create a mutable reactive cell. Every graph starts from cells.
pub fn val<T>(value: T) -> Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    Cell::new(value)
}

/// Store a new value into a cell and synchronously notify every
/// dependent. The updater form is [`Cell::update`].
pub fn write<T>(cell: &Cell<T>, value: T)
where
    T: Clone + Send + Sync + 'static,
{
    cell.set(value);
}

impl<T> Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            node: store::insert_cell(Arc::new(value)),
            _value: PhantomData,
        }
    }

    /// Get the cell's unique node ID.
    pub fn id(&self) -> NodeId {
        self.node.id()
    }

    /// Get the current value.
    pub fn get(&self) -> T {
        sealed::downcast_value(&store::read(self.node.id()))
    }

    /// Set a new value and notify dependents.
    ///
    /// Notification order is the pool order: highest tier, numeric tiers
    /// ascending, lowest tier, registration order within a tier.
    pub fn set(&self, value: T) {
        store::write(self.node.id(), Arc::new(value));
    }

    /// Update the value using a function of the current value.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.get());
        self.set(next);
    }

    /// Get the number of dependent registrations across all tiers.
    pub fn dependent_count(&self) -> usize {
        store::dependent_count(self.node.id())
    }
}

impl<T> sealed::AsNode for Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn node(&self) -> &NodeRef {
        &self.node
    }
}

impl<T> Reactive for Cell<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Output = T;

    fn get(&self) -> T {
        Cell::get(self)
    }
}

impl<T> Clone for Cell<T>
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

impl<T> Debug for Cell<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("id", &self.id())
            .field("value", &self.get())
            .field("dependent_count", &self.dependent_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
