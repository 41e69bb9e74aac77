//! Source Traits
//!
//! `Reactive` is the read surface shared by cells and derivations.
//! `Sources` describes what `derive` and `listen` accept as inputs: a
//! single node reference, or a tuple of up to eight node references of
//! any mix of kinds and value types. Callbacks receive the sources'
//! values positionally, in declaration order.
//!
//! Both traits are sealed. The engine owns the only node kinds there are,
//! and dispatching over them stays a closed pattern match.

use smallvec::SmallVec;

use crate::graph::node::ErasedValue;
use crate::graph::store::NodeRef;

use self::sealed::AsNode;

pub(crate) mod sealed {
    use super::{ErasedValue, NodeRef, SmallVec};

    /// Internal access to a primitive's node handle.
    pub trait AsNode {
        fn node(&self) -> &NodeRef;
    }

    /// Internal enumeration of a source list's node handles.
    pub trait SourceSet {
        fn node_refs(&self) -> SmallVec<[NodeRef; 2]>;
    }

    /// Recover a typed value from an erased slot. The store only ever
    /// hands back the value a handle's own constructor put in, so a
    /// mismatch is an engine bug, not a caller mistake.
    pub fn downcast_value<T: Clone + Send + Sync + 'static>(value: &ErasedValue) -> T {
        value
            .downcast_ref::<T>()
            .expect("stored value type diverged from its typed handle")
            .clone()
    }
}

/// A readable reactive node: a [`Cell`](crate::Cell) or a
/// [`Derivation`](crate::Derivation).
pub trait Reactive: sealed::AsNode {
    /// The value produced by reading this node.
    type Output: Clone + Send + Sync + 'static;

    /// Current value of the node.
    ///
    /// Reading is passive: it never subscribes the caller. For
    /// derivations it recomputes only when the cache is stale.
    fn get(&self) -> Self::Output;
}

/// Read a reactive node's current value.
///
/// Equivalent to calling `get` on the handle; exists so call sites that
/// treat cells and derivations uniformly can say so.
pub fn read<R: Reactive>(node: &R) -> R::Output {
    node.get()
}

/// A source list for [`derive`](crate::derive) and
/// [`listen`](crate::listen): one node reference, or a tuple of node
/// references.
///
/// The list is fixed at construction. A change to any one source
/// invalidates or re-fires the whole dependent; there is no partial
/// re-evaluation.
pub trait Sources: sealed::SourceSet {
    /// Positional values produced by reading every source, in declaration
    /// order. A single source yields its bare value; tuples yield a tuple.
    type Values: 'static;

    #[doc(hidden)]
    fn unpack(values: &[ErasedValue]) -> Self::Values;
}

impl<'a, R: Reactive> sealed::SourceSet for &'a R {
    fn node_refs(&self) -> SmallVec<[NodeRef; 2]> {
        let mut refs = SmallVec::new();
        refs.push(self.node().clone());
        refs
    }
}

impl<'a, R: Reactive> Sources for &'a R {
    type Values = R::Output;

    fn unpack(values: &[ErasedValue]) -> Self::Values {
        sealed::downcast_value::<R::Output>(&values[0])
    }
}

macro_rules! impl_sources_for_tuple {
    ($(($source:ident, $index:tt)),+) => {
        impl<'a, $($source: Reactive),+> sealed::SourceSet for ($(&'a $source,)+) {
            fn node_refs(&self) -> SmallVec<[NodeRef; 2]> {
                let mut refs = SmallVec::new();
                $(refs.push(self.$index.node().clone());)+
                refs
            }
        }

        impl<'a, $($source: Reactive),+> Sources for ($(&'a $source,)+) {
            type Values = ($($source::Output,)+);

            fn unpack(values: &[ErasedValue]) -> Self::Values {
                ($(sealed::downcast_value::<$source::Output>(&values[$index]),)+)
            }
        }
    };
}

impl_sources_for_tuple!((S0, 0), (S1, 1));
impl_sources_for_tuple!((S0, 0), (S1, 1), (S2, 2));
impl_sources_for_tuple!((S0, 0), (S1, 1), (S2, 2), (S3, 3));
impl_sources_for_tuple!((S0, 0), (S1, 1), (S2, 2), (S3, 3), (S4, 4));
impl_sources_for_tuple!((S0, 0), (S1, 1), (S2, 2), (S3, 3), (S4, 4), (S5, 5));
impl_sources_for_tuple!((S0, 0), (S1, 1), (S2, 2), (S3, 3), (S4, 4), (S5, 5), (S6, 6));
impl_sources_for_tuple!(
    (S0, 0),
    (S1, 1),
    (S2, 2),
    (S3, 3),
    (S4, 4),
    (S5, 5),
    (S6, 6),
    (S7, 7)
);
