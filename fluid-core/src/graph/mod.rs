//! Dependency Graph
//!
//! This module implements the dependency graph that connects reactive cells,
//! derivations, and listener registrations.
//!
//! # Overview
//!
//! The graph is a forward adjacency structure:
//!
//! - Nodes are cells (mutable leaves) or derivations (memoized computations)
//! - Each node owns a pool of dependent registrations, partitioned by
//!   priority tier
//! - Edges are stored only in the source-to-dependent direction; a dependent
//!   never enumerates its own sources after construction
//!
//! When a cell is written, the engine walks dependents depth-first,
//! clearing derivation caches eagerly and re-running listeners against
//! freshly read values.
//!
//! # Design Decisions
//!
//! 1. Nodes live in a centralized store addressed by stable integer
//!    handles, so dependent records are plain ids rather than callbacks
//!    keyed by identity. This keeps the graph acyclic at the ownership
//!    level: sources hold dependent ids, dependents hold source handles.
//!
//! 2. The node payload is a closed enum over cells and derivations,
//!    dispatched by pattern match.
//!
//! 3. A derivation's cache is an `Option`, where `None` means "stale,
//!    recompute on next read". No sentinel value can collide with user
//!    data.

pub mod node;
pub mod pool;
pub(crate) mod store;

pub use node::{ListenerId, NodeId};
pub use pool::Priority;
