//! # Subscription Handler
//!
//! A [`SubscriptionHandler`] is the lightweight handle returned by one
//! `register` call. It remembers every subscription that call created,
//! across every publisher it touched, and can remove them all at once.

use crate::registry::AnyRegistry;
use crate::types::{SubscriberId, SubscriptionId};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Handle that bulk-unregisters the subscriptions of one `register` call.
///
/// Safe to call from any thread, and safe while a `notify` is in progress on
/// an affected registry: snapshots already taken complete unaffected, later
/// `notify` calls no longer see the removed subscriptions.
pub struct SubscriptionHandler {
    owner: SubscriberId,
    /// Drained on the first `unregister_all`; a drained handler is inert.
    entries: Mutex<Vec<(Arc<dyn AnyRegistry>, SubscriptionId)>>,
}

impl SubscriptionHandler {
    pub(crate) fn new(
        owner: SubscriberId,
        entries: Vec<(Arc<dyn AnyRegistry>, SubscriptionId)>,
    ) -> Self {
        Self {
            owner,
            entries: Mutex::new(entries),
        }
    }

    /// Identity of the subscriber this handler was created for.
    pub fn owner(&self) -> SubscriberId {
        self.owner
    }

    /// True until `unregister_all` has run.
    pub fn is_active(&self) -> bool {
        !self.entries.lock().is_empty()
    }

    /// Removes every subscription recorded by this handler from its registry.
    ///
    /// Idempotent: the second and subsequent calls are no-ops. Returns the
    /// number of subscriptions actually removed (a subscription already gone,
    /// e.g. through `clear`, is skipped silently).
    pub fn unregister_all(&self) -> usize {
        let entries = std::mem::take(&mut *self.entries.lock());
        if entries.is_empty() {
            return 0;
        }

        let mut removed = 0;
        for (registry, id) in entries {
            if registry.remove_erased(id) {
                removed += 1;
            }
        }
        info!(
            "Unregistered {} subscription(s) of subscriber {}",
            removed, self.owner
        );
        removed
    }
}

impl std::fmt::Debug for SubscriptionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionHandler")
            .field("owner", &self.owner)
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}
