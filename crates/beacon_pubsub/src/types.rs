//! # Core Type Definitions
//!
//! This module contains the fundamental identifier types used throughout the
//! Beacon publish/subscribe engine.
//!
//! ## Key Types
//!
//! - [`SubscriberId`] - Unique identifier for a subscriber instance
//! - [`SubscriptionId`] - Unique identifier for one registered subscription
//! - [`PublisherKey`] - Opaque identity under which a publisher's registry is bound
//!
//! ## Design Principles
//!
//! - **Type Safety**: Wrapper types prevent ID confusion (SubscriberId vs SubscriptionId)
//! - **Opaqueness**: `PublisherKey` carries no structure the engine interprets;
//!   callers (hand-written or generated) choose the naming scheme
//! - **Serialization**: All types support serde for export and diagnostics

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Core Types (Minimal set)
// ============================================================================

/// Unique identifier for a subscriber instance.
///
/// This is a wrapper around UUID that provides type safety and ensures
/// subscriber identities cannot be confused with other types of IDs in the
/// system. One `SubscriberId` typically owns several subscriptions created
/// by a single `register` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriberId(pub Uuid);

impl SubscriberId {
    /// Creates a new random subscriber ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a subscriber ID from a string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - A string slice containing a valid UUID
    ///
    /// # Returns
    ///
    /// Returns `Ok(SubscriberId)` if the string is a valid UUID, otherwise
    /// returns `Err(uuid::Error)` with details about the parsing failure.
    pub fn from_str(s: &str) -> Result<Self, uuid::Error> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::str::FromStr for SubscriberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str(s)
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for one registered subscription.
///
/// Assigned when a subscription is inserted into a registry and used by
/// [`SubscriptionHandler`](crate::SubscriptionHandler) to remove exactly the
/// subscriptions it created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Creates a new random subscription ID using UUID v4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque identity under which a publisher's subscriber registry is bound.
///
/// The engine never interprets the key's contents; code generators usually
/// derive it from the publisher's type name, hand-written code picks any
/// stable string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublisherKey(String);

impl PublisherKey {
    /// Creates a publisher key from any string-like value.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PublisherKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for PublisherKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl std::fmt::Display for PublisherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
