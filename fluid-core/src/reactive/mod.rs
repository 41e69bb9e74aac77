//! Reactive Primitives
//!
//! This module implements the public surface of the reactive system:
//! cells, derivations, and listeners.
//!
//! # Concepts
//!
//! ## Cells
//!
//! A Cell is a container for mutable state, created with [`val`]. Cells
//! are the only writable nodes; everything else in a graph is computed
//! from them.
//!
//! ## Derivations
//!
//! A Derivation is a memoized value computed from one or more sources by
//! a pure function, created with [`derive`]. It re-evaluates only when a
//! source has changed, and only when something reads it.
//!
//! ## Listeners
//!
//! A listener is a side-effecting callback registered with [`listen`].
//! It re-runs whenever any of its sources change, receiving freshly read
//! values. Listeners are how reactive state reaches the outside world.
//!
//! # Implementation Notes
//!
//! Dependencies are declared explicitly: `derive` and `listen` take the
//! exact source list, fixed for the dependent's lifetime. There is no
//! tracking context and no dynamic dependency discovery, which keeps
//! reads completely passive.
//!
//! Notification order is deterministic, governed by priority tiers and
//! registration order; the [`priorities`] helpers compute tiers relative
//! to existing dependents.

pub(crate) mod cell;
pub(crate) mod derivation;
pub(crate) mod listener;
pub mod priorities;
pub(crate) mod source;

pub use cell::{val, write, Cell};
pub use derivation::{derive, derive_with, DeriveProps, Derivation};
pub use listener::{listen, listen_with, ListenProps, Subscription};
pub use source::{read, Reactive, Sources};
