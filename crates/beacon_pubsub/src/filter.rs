//! # Subscription Filters
//!
//! A filter is a predicate capability deciding whether one subscription wants
//! a given message. All filters attached to a subscription compose by
//! conjunction and are evaluated in registration order with short-circuit on
//! the first rejection, so custom filters with side effects re-evaluate
//! deterministically.
//!
//! ## Built-in Variants
//!
//! - [`IdsFilter`] - accepts messages whose id is in a declared set
//! - [`TopicsFilter`] - accepts messages whose topic exactly equals a declared
//!   string (no patterns, no trimming)
//! - [`filter_fn`] - adapter turning a closure into a [`Filter`]

use crate::message::Message;
use crate::types::SubscriberId;
use std::collections::HashSet;
use std::marker::PhantomData;

/// Predicate capability tested against `(owner, method, message)`.
///
/// Implementations may be stateless or stateful. The engine imposes no
/// ownership relation between a filter and the messages or subscriptions it
/// is invoked with.
pub trait Filter<M: Message>: Send + Sync {
    /// Returns true if the subscription owning this filter should receive
    /// the message.
    ///
    /// # Arguments
    ///
    /// * `owner` - Identity of the subscriber that owns the subscription
    /// * `method` - Name of the subscriber callback, for filters that key
    ///   their decision on which method is subscribed
    /// * `message` - The message being dispatched
    fn accepts(&self, owner: SubscriberId, method: &str, message: &M) -> bool;
}

/// Accepts messages whose id is a member of a declared set.
///
/// An empty set accepts nothing; the engine never attaches an empty
/// `IdsFilter` (no id restriction means no filter at all).
#[derive(Debug, Clone)]
pub struct IdsFilter {
    ids: HashSet<i64>,
}

impl IdsFilter {
    /// Creates a filter accepting exactly the given ids.
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }
}

impl<M: Message> Filter<M> for IdsFilter {
    fn accepts(&self, _owner: SubscriberId, _method: &str, message: &M) -> bool {
        self.ids.contains(&message.id())
    }
}

/// Accepts messages whose topic exactly equals a member of a declared set.
///
/// Equality is ordinal string comparison: no pattern matching, no trimming.
/// A message without a topic never passes.
#[derive(Debug, Clone)]
pub struct TopicsFilter {
    topics: HashSet<String>,
}

impl TopicsFilter {
    /// Creates a filter accepting exactly the given topics.
    pub fn new<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            topics: topics.into_iter().map(Into::into).collect(),
        }
    }
}

impl<M: Message> Filter<M> for TopicsFilter {
    fn accepts(&self, _owner: SubscriberId, _method: &str, message: &M) -> bool {
        match message.topic() {
            Some(topic) => self.topics.contains(topic),
            None => false,
        }
    }
}

/// Adapter that lets a closure act as a [`Filter`].
///
/// Constructed through [`filter_fn`].
pub struct FnFilter<M, F> {
    predicate: F,
    _message: PhantomData<fn(&M)>,
}

/// Wraps a closure as a [`Filter`].
///
/// # Arguments
///
/// * `predicate` - Closure receiving `(owner, method, message)` and returning
///   whether the message should be accepted
pub fn filter_fn<M, F>(predicate: F) -> FnFilter<M, F>
where
    M: Message,
    F: Fn(SubscriberId, &str, &M) -> bool + Send + Sync,
{
    FnFilter {
        predicate,
        _message: PhantomData,
    }
}

impl<M, F> Filter<M> for FnFilter<M, F>
where
    M: Message,
    F: Fn(SubscriberId, &str, &M) -> bool + Send + Sync,
{
    fn accepts(&self, owner: SubscriberId, method: &str, message: &M) -> bool {
        (self.predicate)(owner, method, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::BasicMessage;

    fn accepts<F: Filter<BasicMessage>>(filter: &F, message: &BasicMessage) -> bool {
        filter.accepts(SubscriberId::new(), "on_message", message)
    }

    #[test]
    fn ids_filter_matches_declared_ids_only() {
        let filter = IdsFilter::new([2, 4]);
        assert!(!accepts(&filter, &BasicMessage::new(1, "one")));
        assert!(accepts(&filter, &BasicMessage::new(2, "two")));
        assert!(!accepts(&filter, &BasicMessage::new(3, "three")));
        assert!(accepts(&filter, &BasicMessage::new(4, "four")));
    }

    #[test]
    fn topics_filter_uses_exact_string_equality() {
        let filter = TopicsFilter::new(["two", "four"]);
        assert!(accepts(&filter, &BasicMessage::new(2, "two")));
        assert!(accepts(&filter, &BasicMessage::new(4, "four")));
        // no concatenation, trimming or pattern semantics
        assert!(!accepts(&filter, &BasicMessage::new(5, "twofour")));
        assert!(!accepts(&filter, &BasicMessage::new(6, "two ")));
        assert!(!accepts(&filter, &BasicMessage::new(7, " four")));
        assert!(!accepts(&filter, &BasicMessage::new(8, "tw.*")));
    }

    #[test]
    fn topics_filter_rejects_topicless_messages() {
        let filter = TopicsFilter::new(["one"]);
        assert!(!accepts(&filter, &BasicMessage::without_topic(1)));
    }

    #[test]
    fn fn_filter_delegates_to_the_closure() {
        let odd = filter_fn(|_, _, message: &BasicMessage| message.id % 2 != 0);
        assert!(accepts(&odd, &BasicMessage::new(1, "one")));
        assert!(!accepts(&odd, &BasicMessage::new(2, "two")));
    }
}
