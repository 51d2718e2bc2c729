//! # Publish/Subscribe System
//!
//! [`PubSubSystem`] is the central hub tying publisher keys to their
//! registries and turning subscription specs into live subscriptions. It is
//! the boundary both hand-written code and code generators target:
//!
//! - `create_registry` — called once per publisher instance at construction
//! - `register` — turns a subscriber's specs into subscriptions, returning a
//!   [`SubscriptionHandler`] for bulk removal
//!
//! ## Thread Safety
//!
//! The system is fully thread-safe and shared as `Arc<PubSubSystem>`.
//! Registry resolution uses a concurrent map; per-registry state has its own
//! locking discipline (see [`registry`](crate::registry)).

use crate::errors::ConfigError;
use crate::handler::SubscriptionHandler;
use crate::message::Message;
use crate::registry::{AnyRegistry, RegistryStats, SubscriberRegistry};
use crate::subscription::SubscriptionSpec;
use crate::types::{PublisherKey, SubscriberId};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// The central registry-resolution and registration hub.
pub struct PubSubSystem {
    /// Publisher key → type-erased registry
    registries: DashMap<PublisherKey, Arc<dyn AnyRegistry>>,
}

impl PubSubSystem {
    /// Creates a system with no bound publishers.
    pub fn new() -> Self {
        Self {
            registries: DashMap::new(),
        }
    }

    /// Creates a registry for a publisher and binds it under the given key.
    ///
    /// Called once per publisher instance at construction; the returned
    /// `Arc` is what the publisher holds and calls `notify` on. Re-binding
    /// an already-bound key replaces the previous binding; subscriptions of
    /// the replaced registry are not carried over.
    pub fn create_registry<M: Message>(
        &self,
        publisher: PublisherKey,
    ) -> Arc<SubscriberRegistry<M>> {
        let registry = Arc::new(SubscriberRegistry::<M>::new(publisher.clone()));
        let erased: Arc<dyn AnyRegistry> = registry.clone();
        if self.registries.insert(publisher.clone(), erased).is_some() {
            debug!("Re-bound publisher '{}', previous registry dropped", publisher);
        }
        info!(
            "📝 Bound publisher '{}' dispatching {}",
            publisher,
            std::any::type_name::<M>()
        );
        registry
    }

    /// Looks up the registry bound under a key, typed.
    ///
    /// # Returns
    ///
    /// `Err(ConfigError::UnknownPublisher)` if nothing is bound under the
    /// key, `Err(ConfigError::MessageTypeMismatch)` if the bound registry
    /// dispatches a different message type than `M`.
    pub fn registry<M: Message>(
        &self,
        publisher: &PublisherKey,
    ) -> Result<Arc<SubscriberRegistry<M>>, ConfigError> {
        let erased = self
            .registries
            .get(publisher)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ConfigError::UnknownPublisher(publisher.clone()))?;
        let expected = erased.message_type_name();
        erased
            .as_any_arc()
            .downcast::<SubscriberRegistry<M>>()
            .map_err(|_| ConfigError::MessageTypeMismatch {
                publisher: publisher.clone(),
                expected,
                actual: std::any::type_name::<M>(),
            })
    }

    /// Registers a subscriber's subscriptions, all-or-nothing.
    ///
    /// Every spec is resolved against its target registry and type-checked
    /// before any subscription is inserted; if one spec fails, none of the
    /// call's specs take effect.
    ///
    /// # Arguments
    ///
    /// * `owner` - Identity of the subscriber; recorded on every created
    ///   subscription and passed to custom filters
    /// * `specs` - One spec per callback method, possibly targeting several
    ///   publishers
    ///
    /// # Returns
    ///
    /// A [`SubscriptionHandler`] that removes every subscription this call
    /// created, or a [`ConfigError`] naming the offending spec's problem.
    pub fn register(
        &self,
        owner: SubscriberId,
        specs: Vec<SubscriptionSpec>,
    ) -> Result<SubscriptionHandler, ConfigError> {
        // Resolve phase: every spec must name a reachable, type-compatible
        // registry before anything is inserted.
        let mut resolved: Vec<Arc<dyn AnyRegistry>> = Vec::with_capacity(specs.len());
        for spec in &specs {
            let registry = self
                .registries
                .get(spec.publisher())
                .map(|entry| entry.value().clone())
                .ok_or_else(|| ConfigError::UnknownPublisher(spec.publisher().clone()))?;
            if registry.message_type() != spec.message_type() {
                return Err(ConfigError::MessageTypeMismatch {
                    publisher: spec.publisher().clone(),
                    expected: registry.message_type_name(),
                    actual: spec.message_type_name(),
                });
            }
            resolved.push(registry);
        }

        // Attach phase: cannot fail on type grounds after the checks above.
        let mut entries = Vec::with_capacity(specs.len());
        for (spec, registry) in specs.into_iter().zip(resolved) {
            let id = spec.attach(owner, &registry)?;
            entries.push((registry, id));
        }

        info!(
            "📝 Registered {} subscription(s) for subscriber {}",
            entries.len(),
            owner
        );
        Ok(SubscriptionHandler::new(owner, entries))
    }

    /// Number of publishers currently bound.
    pub fn publisher_count(&self) -> usize {
        self.registries.len()
    }

    /// Aggregated counters across every bound registry.
    pub fn stats(&self) -> SystemStats {
        let mut stats = SystemStats {
            publishers: self.registries.len(),
            ..SystemStats::default()
        };
        for entry in self.registries.iter() {
            let registry = entry.value();
            stats.subscriptions += registry.subscription_count();
            let registry_stats: RegistryStats = registry.registry_stats();
            stats.notifications += registry_stats.notifications;
            stats.deliveries += registry_stats.deliveries;
            stats.rejected += registry_stats.rejected;
        }
        stats
    }
}

impl Default for PubSubSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PubSubSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PubSubSystem")
            .field("publishers", &self.registries.len())
            .finish()
    }
}

/// Creates a shareable publish/subscribe system.
///
/// Convenience constructor for the common `Arc`-shared setup.
pub fn create_pubsub_system() -> Arc<PubSubSystem> {
    Arc::new(PubSubSystem::new())
}

/// Aggregated statistics across the whole system.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    /// Publishers currently bound
    pub publishers: usize,
    /// Subscriptions currently registered across all publishers
    pub subscriptions: usize,
    /// Total `notify` calls
    pub notifications: u64,
    /// Total callbacks invoked
    pub deliveries: u64,
    /// Total filter rejections
    pub rejected: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BasicMessage;

    #[test]
    fn rebinding_a_key_replaces_the_registry() {
        let pubsub = PubSubSystem::new();
        let key = PublisherKey::new("orders");
        let first = pubsub.create_registry::<BasicMessage>(key.clone());
        let second = pubsub.create_registry::<BasicMessage>(key.clone());
        assert_eq!(pubsub.publisher_count(), 1);

        let resolved = pubsub.registry::<BasicMessage>(&key).unwrap();
        assert!(Arc::ptr_eq(&resolved, &second));
        assert!(!Arc::ptr_eq(&resolved, &first));
    }

    #[test]
    fn unknown_publisher_lookup_fails() {
        let pubsub = PubSubSystem::new();
        let err = pubsub
            .registry::<BasicMessage>(&PublisherKey::new("ghost"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownPublisher(_)));
    }

    #[test]
    fn mistyped_lookup_reports_both_types() {
        #[derive(Debug)]
        struct OtherMessage;
        impl crate::Message for OtherMessage {
            fn id(&self) -> i64 {
                0
            }
            fn topic(&self) -> Option<&str> {
                None
            }
        }

        let pubsub = PubSubSystem::new();
        let key = PublisherKey::new("orders");
        pubsub.create_registry::<BasicMessage>(key.clone());

        let err = pubsub.registry::<OtherMessage>(&key).unwrap_err();
        match err {
            ConfigError::MessageTypeMismatch {
                expected, actual, ..
            } => {
                assert!(expected.contains("BasicMessage"));
                assert!(actual.contains("OtherMessage"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
