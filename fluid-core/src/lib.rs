//! Fluid Core
//!
//! This crate implements a fine-grained reactive dependency-tracking
//! engine: mutable **cells**, memoized **derivations** over them, and
//! **listeners** that re-run side effects when any transitively watched
//! cell changes.
//!
//! The engine is the incremental-computation kernel an application builds
//! on; it is domain-agnostic and fully synchronous. Its three jobs are
//! lazy memoized recomputation, glitch-free propagation through diamond
//! shaped graphs, and priority-ordered listener scheduling.
//!
//! # Architecture
//!
//! The crate is organized into two layers:
//!
//! - `reactive`: the typed public primitives (`Cell`, `Derivation`,
//!   listeners) and the priority helpers
//! - `graph`: the node store, the per-node priority pools, and the
//!   read/write/notify propagation engine
//!
//! # How Propagation Works
//!
//! Writing a cell stores the value, then walks the cell's dependents
//! depth-first in deterministic pool order. Each dependent derivation
//! drops its cache eagerly and forwards the walk to its own dependents;
//! each dependent listener re-reads its sources and runs. Because caches
//! are cleared before any listener along that path runs, and reads
//! recompute lazily from current state, no callback ever observes a
//! stale mix of values.
//!
//! # Example
//!
//! ```rust,ignore
//! use fluid_core::{derive, listen, val, write};
//!
//! // Create a cell
//! let count = val(0);
//!
//! // Create a derived value
//! let doubled = derive(&count, |n: i32| n * 2);
//!
//! // React to changes
//! let sub = listen(&doubled, |n: i32| {
//!     println!("doubled is now {n}");
//! });
//!
//! // Update the cell
//! write(&count, 5);
//! // Listener runs synchronously, prints: "doubled is now 10"
//!
//! sub.dispose();
//! ```

pub mod error;
pub mod graph;
pub mod reactive;

pub use error::UsageError;
pub use graph::node::{ListenerId, NodeId};
pub use graph::pool::Priority;
pub use reactive::priorities;
pub use reactive::{
    derive, derive_with, listen, listen_with, read, val, write, Cell, DeriveProps, Derivation,
    ListenProps, Reactive, Sources, Subscription,
};

#[doc(hidden)]
pub use graph::node::ErasedValue;
