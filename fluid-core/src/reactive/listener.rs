//! Listener Implementation
//!
//! A listener is a side-effecting callback registered against one or more
//! source nodes. It is a dependent record, not a node: it produces no
//! value and nothing can depend on it.
//!
//! # How Listeners Work
//!
//! 1. `listen` registers the callback with each source at the listener's
//!    priority tier and returns a [`Subscription`].
//!
//! 2. When any source changes, the listener re-reads all of its sources
//!    (recomputing any derivation whose cache was just cleared) and
//!    invokes the callback with the fresh values.
//!
//! 3. Disposing the subscription removes the registration from every
//!    source. Disposal is idempotent, and disposing mid-notification only
//!    skips callbacks that have not fired yet.
//!
//! # Differences from Derivations
//!
//! - Derivations return a value; listeners do not.
//! - Derivations are lazy (compute on read); listeners run on every
//!   notification.
//! - Derivations cache results; listener callbacks are never cached.

use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::node::{ErasedValue, ListenerId, ReactFn};
use crate::graph::pool::Priority;
use crate::graph::store;

use super::source::{sealed, Sources};

/// Construction options for [`listen_with`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenProps {
    /// Tier this listener occupies in its sources' pools.
    pub priority: Priority,
    /// Invoke the callback once, synchronously, during registration,
    /// before any write.
    pub immediate: bool,
}

/// Handle to an active listener registration.
///
/// Dropping the handle does not remove the listener; call
/// [`dispose`](Subscription::dispose).
#[derive(Clone)]
pub struct Subscription {
    id: ListenerId,
}

/// Register a callback that re-runs whenever any source changes, at the
/// base priority tier.
///
/// `sources` is a single node reference or a tuple of node references;
/// the callback receives the freshly read values positionally.
pub fn listen<S, F>(sources: S, callback: F) -> Subscription
where
    S: Sources,
    F: Fn(S::Values) + Send + Sync + 'static,
{
    listen_with(sources, callback, ListenProps::default())
}

/// Like [`listen`], with an explicit priority tier and the option to run
/// the callback immediately at registration.
pub fn listen_with<S, F>(sources: S, callback: F, props: ListenProps) -> Subscription
where
    S: Sources,
    F: Fn(S::Values) + Send + Sync + 'static,
{
    let node_refs = sealed::SourceSet::node_refs(&sources);
    let unpack: fn(&[ErasedValue]) -> S::Values = S::unpack;
    let react: ReactFn = Arc::new(move |values: &[ErasedValue]| callback(unpack(values)));
    let id = store::insert_listener(node_refs, react, props.priority);

    if props.immediate {
        store::run_listener(id);
    }

    Subscription { id }
}

impl Subscription {
    /// Get the listener's unique ID.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Remove the registration from every source.
    ///
    /// Safe to call any number of times; calls after the first are
    /// no-ops. Disposing from inside a notification pass does not disturb
    /// sibling dependents of the same pass.
    pub fn dispose(&self) {
        store::remove_listener(self.id);
    }

    /// Check whether the listener has been disposed.
    pub fn is_disposed(&self) -> bool {
        !store::listener_exists(self.id)
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
