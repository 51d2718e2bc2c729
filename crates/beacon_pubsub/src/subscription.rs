//! # Subscriptions and Subscription Specs
//!
//! A [`Subscription`] binds one subscriber callback to one publisher's
//! registry, carrying a priority and an ordered filter list. Subscriptions
//! are immutable after construction; only their registry membership changes.
//!
//! Callers never construct subscriptions directly. They describe them with a
//! typed [`SubscriptionBuilder`] which finalizes into a type-erased
//! [`SubscriptionSpec`], so one `register` call can span publishers that
//! dispatch different message types.

use crate::errors::{CallbackError, ConfigError};
use crate::filter::{Filter, IdsFilter, TopicsFilter};
use crate::message::Message;
use crate::registry::{AnyRegistry, SubscriberRegistry};
use crate::types::{PublisherKey, SubscriberId, SubscriptionId};
use std::any::TypeId;
use std::sync::Arc;

/// Callback invoked when a matching message is dispatched.
///
/// Receives the message mutably: an earlier-invoked subscriber may mutate it
/// before later subscribers of the same `notify` call observe it.
pub(crate) type Callback<M> = Box<dyn Fn(&mut M) -> Result<(), CallbackError> + Send + Sync>;

type AttachFn = Box<
    dyn FnOnce(SubscriberId, &Arc<dyn AnyRegistry>) -> Result<SubscriptionId, ConfigError> + Send,
>;

/// One subscriber callback registered against one publisher.
///
/// Dispatch order within a registry is priority descending, then
/// registration sequence ascending among equal priorities.
pub struct Subscription<M: Message> {
    id: SubscriptionId,
    owner: SubscriberId,
    method: String,
    priority: i32,
    seq: u64,
    filters: Vec<Arc<dyn Filter<M>>>,
    callback: Callback<M>,
}

impl<M: Message> Subscription<M> {
    pub(crate) fn new(
        owner: SubscriberId,
        method: String,
        priority: i32,
        seq: u64,
        filters: Vec<Arc<dyn Filter<M>>>,
        callback: Callback<M>,
    ) -> Self {
        Self {
            id: SubscriptionId::new(),
            owner,
            method,
            priority,
            seq,
            filters,
            callback,
        }
    }

    /// Unique identity of this subscription within its registry.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Identity of the subscriber that owns this subscription.
    pub fn owner(&self) -> SubscriberId {
        self.owner
    }

    /// Name of the subscriber callback, as given to the builder.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Dispatch priority; larger values run first.
    pub fn priority(&self) -> i32 {
        self.priority
    }

    /// Registration sequence within the registry; earlier wins ties.
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    /// Evaluates the filter conjunction for a message.
    ///
    /// Filters run in registration order and short-circuit on the first
    /// rejection. A subscription with no filters matches unconditionally.
    pub(crate) fn matches(&self, message: &M) -> bool {
        self.filters
            .iter()
            .all(|filter| filter.accepts(self.owner, &self.method, message))
    }

    pub(crate) fn invoke(&self, message: &mut M) -> Result<(), CallbackError> {
        (self.callback)(message)
    }
}

impl<M: Message> std::fmt::Debug for Subscription<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("method", &self.method)
            .field("priority", &self.priority)
            .field("seq", &self.seq)
            .field("filters", &self.filters.len())
            .finish()
    }
}

/// Typed builder describing one subscription before registration.
///
/// The id restriction, the topic restriction and the custom filters all
/// compose by conjunction. The builder attaches them in that order, so a
/// custom filter with side effects only runs for messages that already
/// passed the declarative restrictions.
pub struct SubscriptionBuilder<M: Message> {
    publisher: PublisherKey,
    method: String,
    priority: i32,
    ids: Vec<i64>,
    topics: Vec<String>,
    filters: Vec<Arc<dyn Filter<M>>>,
}

impl<M: Message> SubscriptionBuilder<M> {
    fn new(publisher: PublisherKey, method: impl Into<String>) -> Self {
        Self {
            publisher,
            method: method.into(),
            priority: 0,
            ids: Vec::new(),
            topics: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Sets the dispatch priority (default 0); larger values run first.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Restricts the subscription to messages with one of the given ids.
    pub fn ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.ids.extend(ids);
        self
    }

    /// Restricts the subscription to messages with one of the given topics
    /// (exact string equality).
    pub fn topics<I, S>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics.extend(topics.into_iter().map(Into::into));
        self
    }

    /// Appends a custom filter; custom filters are evaluated in the order
    /// they were added.
    pub fn filter(mut self, filter: impl Filter<M> + 'static) -> Self {
        self.filters.push(Arc::new(filter));
        self
    }

    /// Supplies the callback and finalizes the spec.
    ///
    /// The callback runs synchronously on the thread that calls `notify`,
    /// strictly in priority order among the matching subscriptions of that
    /// call.
    pub fn callback<F>(self, callback: F) -> SubscriptionSpec
    where
        F: Fn(&mut M) -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        let mut filters: Vec<Arc<dyn Filter<M>>> = Vec::new();
        if !self.ids.is_empty() {
            filters.push(Arc::new(IdsFilter::new(self.ids)));
        }
        if !self.topics.is_empty() {
            filters.push(Arc::new(TopicsFilter::new(self.topics)));
        }
        filters.extend(self.filters);

        let publisher = self.publisher;
        let method = self.method;
        let priority = self.priority;

        let spec_publisher = publisher.clone();
        let spec_method = method.clone();
        let attach: AttachFn = Box::new(move |owner, erased| {
            let registry = erased
                .as_any()
                .downcast_ref::<SubscriberRegistry<M>>()
                .ok_or_else(|| ConfigError::MessageTypeMismatch {
                    publisher: publisher.clone(),
                    expected: erased.message_type_name(),
                    actual: std::any::type_name::<M>(),
                })?;
            Ok(registry.add(owner, method, priority, filters, Box::new(callback)))
        });

        SubscriptionSpec {
            publisher: spec_publisher,
            method: spec_method,
            message_type: TypeId::of::<M>(),
            message_type_name: std::any::type_name::<M>(),
            attach,
        }
    }
}

/// Type-erased description of one subscription, ready for registration.
///
/// Produced by [`SubscriptionSpec::builder`]; consumed by
/// [`PubSubSystem::register`](crate::PubSubSystem::register).
pub struct SubscriptionSpec {
    publisher: PublisherKey,
    method: String,
    message_type: TypeId,
    message_type_name: &'static str,
    attach: AttachFn,
}

impl SubscriptionSpec {
    /// Starts a typed builder for a subscription to the given publisher.
    ///
    /// # Arguments
    ///
    /// * `publisher` - Key the target registry is bound under
    /// * `method` - Name of the subscriber callback, used in diagnostics and
    ///   passed to custom filters
    pub fn builder<M: Message>(
        publisher: PublisherKey,
        method: impl Into<String>,
    ) -> SubscriptionBuilder<M> {
        SubscriptionBuilder::new(publisher, method)
    }

    /// Key of the publisher this spec targets.
    pub fn publisher(&self) -> &PublisherKey {
        &self.publisher
    }

    /// Name of the subscriber callback.
    pub fn method(&self) -> &str {
        &self.method
    }

    pub(crate) fn message_type(&self) -> TypeId {
        self.message_type
    }

    pub(crate) fn message_type_name(&self) -> &'static str {
        self.message_type_name
    }

    pub(crate) fn attach(
        self,
        owner: SubscriberId,
        registry: &Arc<dyn AnyRegistry>,
    ) -> Result<SubscriptionId, ConfigError> {
        (self.attach)(owner, registry)
    }
}

impl std::fmt::Debug for SubscriptionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionSpec")
            .field("publisher", &self.publisher)
            .field("method", &self.method)
            .field("message_type", &self.message_type_name)
            .finish()
    }
}
