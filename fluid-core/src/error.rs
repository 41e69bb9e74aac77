//! Error Taxonomy
//!
//! The engine distinguishes exactly one class of failure: usage errors,
//! programming mistakes at the call site such as writing to something
//! that is not a cell. They are contract violations, not recoverable
//! runtime conditions, so the engine aborts the operation immediately
//! instead of returning them.
//!
//! The typed handles ([`crate::Cell`], [`crate::Derivation`]) make these
//! violations unrepresentable in ordinary code: `write` only accepts a
//! cell, and every handle keeps its node registered. The checks remain in
//! the store layer and fire only if a raw id is forged or an internal
//! invariant breaks.
//!
//! Cyclic graphs are deliberately not part of the taxonomy. A cycle shows
//! up as unbounded recursion during notification or reads; detecting it
//! would require bookkeeping the engine does not carry.

use thiserror::Error;

use crate::graph::node::NodeId;

/// A contract violation at a public operation's call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    /// The id does not address a registered reactive node.
    #[error("node {0:?} is not registered in the reactive graph")]
    UnknownNode(NodeId),

    /// Only cells created with `val` accept writes; derivations are
    /// read-only.
    #[error("node {0:?} is a derivation and cannot be written")]
    NotACell(NodeId),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_node() {
        let id = NodeId::new();
        let message = UsageError::NotACell(id).to_string();
        assert!(message.contains(&format!("{id:?}")));
        assert!(message.contains("cannot be written"));
    }
}
