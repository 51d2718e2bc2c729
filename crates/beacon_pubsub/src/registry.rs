//! # Subscriber Registry and Dispatch
//!
//! Each publisher owns exactly one [`SubscriberRegistry`]: an ordered,
//! thread-safe collection of subscriptions plus the `notify` dispatcher that
//! matches and invokes them.
//!
//! ## Ordering
//!
//! The subscription vector is kept sorted at all times: priority descending,
//! registration sequence ascending among equal priorities. Insertion uses
//! `partition_point`, so a newly added subscription lands after every
//! existing subscription of greater or equal priority.
//!
//! ## Concurrency
//!
//! `notify` clones the sorted vector under a read lock (cheap `Arc` bumps)
//! and releases the lock before matching or invoking anything. Callbacks
//! therefore run with no lock held and may freely register, unregister, or
//! recursively notify; structural changes apply to future `notify` calls,
//! never to a snapshot already taken.

use crate::message::Message;
use crate::subscription::{Callback, Subscription};
use crate::errors::NotifyError;
use crate::filter::Filter;
use crate::types::{PublisherKey, SubscriberId, SubscriptionId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::any::{Any, TypeId};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// The per-publisher ordered collection of subscriptions.
///
/// Created alongside its publisher (usually through
/// [`PubSubSystem::create_registry`](crate::PubSubSystem::create_registry))
/// and shared as `Arc<SubscriberRegistry<M>>`. All operations are direct,
/// blocking calls on the caller's thread; the engine makes no scheduling
/// decisions of its own.
pub struct SubscriberRegistry<M: Message> {
    publisher: PublisherKey,
    /// Sorted by (priority desc, seq asc); cloned as the dispatch snapshot.
    subscriptions: RwLock<Vec<Arc<Subscription<M>>>>,
    next_seq: AtomicU64,
    stats: RwLock<RegistryStats>,
}

impl<M: Message> SubscriberRegistry<M> {
    /// Creates an empty registry for the given publisher key.
    pub fn new(publisher: PublisherKey) -> Self {
        Self {
            publisher,
            subscriptions: RwLock::new(Vec::new()),
            next_seq: AtomicU64::new(0),
            stats: RwLock::new(RegistryStats::default()),
        }
    }

    /// Key of the publisher this registry belongs to.
    pub fn publisher(&self) -> &PublisherKey {
        &self.publisher
    }

    /// Inserts a subscription, maintaining the dispatch order invariant.
    pub(crate) fn add(
        &self,
        owner: SubscriberId,
        method: String,
        priority: i32,
        filters: Vec<Arc<dyn Filter<M>>>,
        callback: Callback<M>,
    ) -> SubscriptionId {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let subscription = Arc::new(Subscription::new(
            owner, method, priority, seq, filters, callback,
        ));
        let id = subscription.id();

        let mut subscriptions = self.subscriptions.write();
        let pos = subscriptions.partition_point(|s| s.priority() >= priority);
        subscriptions.insert(pos, subscription);
        debug!(
            "📝 Added subscription {} (priority {}) on publisher '{}'",
            id, priority, self.publisher
        );
        id
    }

    /// Removes one subscription by id.
    ///
    /// Removing an id that is absent (already removed, or never of this
    /// registry) is a no-op.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.write();
        match subscriptions.iter().position(|s| s.id() == id) {
            Some(pos) => {
                subscriptions.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Removes every subscription owned by the given subscriber.
    ///
    /// Returns the number of subscriptions removed.
    pub fn remove_owner(&self, owner: SubscriberId) -> usize {
        let mut subscriptions = self.subscriptions.write();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.owner() != owner);
        before - subscriptions.len()
    }

    /// Removes all subscriptions regardless of owner.
    ///
    /// Teardown of a publisher's entire audience without handler references;
    /// in-flight `notify` snapshots are unaffected.
    pub fn clear(&self) {
        let mut subscriptions = self.subscriptions.write();
        if !subscriptions.is_empty() {
            debug!(
                "Cleared {} subscription(s) from publisher '{}'",
                subscriptions.len(),
                self.publisher
            );
        }
        subscriptions.clear();
    }

    /// Number of currently registered subscriptions.
    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// True if no subscriptions are registered.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }

    /// Returns a copy of this registry's counters.
    pub fn stats(&self) -> RegistryStats {
        self.stats.read().clone()
    }

    /// Dispatches a message to every matching subscription, in order.
    ///
    /// Takes a point-in-time snapshot of the subscription list, then for each
    /// snapshotted subscription evaluates its filter conjunction and, on a
    /// match, invokes the callback with the message on the calling thread.
    /// Mutation of the message by an earlier callback is visible to later
    /// callbacks of this same call.
    ///
    /// # Returns
    ///
    /// `Ok(())` when every matching callback succeeded. If a callback fails,
    /// dispatch of the remaining snapshot is aborted and the error propagates
    /// as [`NotifyError::Callback`]; it is not caught or retried internally.
    pub fn notify(&self, message: &mut M) -> Result<(), NotifyError> {
        let snapshot: Vec<Arc<Subscription<M>>> = self.subscriptions.read().clone();
        self.stats.write().notifications += 1;

        if snapshot.is_empty() {
            warn!("⚠️ No subscriptions on publisher '{}'", self.publisher);
            return Ok(());
        }
        debug!(
            "📤 Dispatching {:?} on '{}' across {} subscription(s)",
            message,
            self.publisher,
            snapshot.len()
        );

        let mut delivered: u64 = 0;
        let mut rejected: u64 = 0;
        let mut result = Ok(());
        for subscription in &snapshot {
            if !subscription.matches(message) {
                rejected += 1;
                continue;
            }
            if let Err(source) = subscription.invoke(message) {
                result = Err(NotifyError::Callback {
                    method: subscription.method().to_string(),
                    source,
                });
                break;
            }
            delivered += 1;
        }

        let mut stats = self.stats.write();
        stats.deliveries += delivered;
        stats.rejected += rejected;
        result
    }
}

impl<M: Message> std::fmt::Debug for SubscriberRegistry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberRegistry")
            .field("publisher", &self.publisher)
            .field("subscriptions", &self.len())
            .finish()
    }
}

/// Counters tracked per registry.
///
/// Useful for monitoring dispatch volume and filter selectivity. Counter
/// updates happen outside the snapshot lock and never affect dispatch.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Total `notify` calls on this registry
    pub notifications: u64,
    /// Callbacks invoked (subscription matched and callback succeeded)
    pub deliveries: u64,
    /// Subscriptions whose filters rejected a dispatched message
    pub rejected: u64,
}

// ============================================================================
// Type-erased registry access
// ============================================================================

/// Object-safe view of a registry, independent of its message type.
///
/// Lets the system map and subscription handlers hold registries for
/// different message types uniformly; typed access goes through downcast.
pub(crate) trait AnyRegistry: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn message_type(&self) -> TypeId;
    fn message_type_name(&self) -> &'static str;
    fn remove_erased(&self, id: SubscriptionId) -> bool;
    fn subscription_count(&self) -> usize;
    fn registry_stats(&self) -> RegistryStats;
}

impl<M: Message> AnyRegistry for SubscriberRegistry<M> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn message_type(&self) -> TypeId {
        TypeId::of::<M>()
    }

    fn message_type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }

    fn remove_erased(&self, id: SubscriptionId) -> bool {
        self.remove(id)
    }

    fn subscription_count(&self) -> usize {
        self.len()
    }

    fn registry_stats(&self) -> RegistryStats {
        self.stats()
    }
}
