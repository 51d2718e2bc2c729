//! # Message Types
//!
//! A message is the value carried from a publisher to its subscribers. The
//! engine only needs two identity fields from it: an integer id and an
//! optional topic string, both consumed by subscription filters.
//!
//! Messages are dispatched by reference. The same `&mut M` is threaded
//! through one `notify` call, so a subscriber invoked earlier in priority
//! order may mutate the message before later subscribers observe it.

use serde::{Deserialize, Serialize};

/// Core trait every dispatchable message must implement.
///
/// The two accessors feed the built-in id and topic filters. Everything else
/// about the message is opaque to the engine; subscribers downcast nothing
/// and receive the concrete type directly.
///
/// # Safety
///
/// Messages must be Send + Sync as registries are shared across threads.
/// The Debug requirement ensures messages can be logged for diagnostics.
pub trait Message: Send + Sync + std::fmt::Debug + 'static {
    /// Returns the integer identifier consumed by id filters.
    fn id(&self) -> i64;

    /// Returns the topic consumed by topic filters, if the message has one.
    fn topic(&self) -> Option<&str>;
}

/// Ready-made message type carrying just the two identity fields.
///
/// Suitable for tests and for publishers that need nothing beyond an id and
/// a topic. Richer systems implement [`Message`] on their own types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicMessage {
    /// Integer identifier, matched by id filters.
    pub id: i64,
    /// Optional topic, matched by topic filters with exact string equality.
    pub topic: Option<String>,
}

impl BasicMessage {
    /// Creates a message with an id and a topic.
    pub fn new(id: i64, topic: impl Into<String>) -> Self {
        Self {
            id,
            topic: Some(topic.into()),
        }
    }

    /// Creates a message with an id and no topic.
    pub fn without_topic(id: i64) -> Self {
        Self { id, topic: None }
    }

    /// Increments the message id in place.
    ///
    /// A high-priority subscriber may call this so that lower-priority
    /// subscribers of the same `notify` call observe the bumped id.
    pub fn inc_id(&mut self) {
        self.id += 1;
    }
}

impl Message for BasicMessage {
    fn id(&self) -> i64 {
        self.id
    }

    fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}
