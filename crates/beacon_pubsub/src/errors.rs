//! # Error Types
//!
//! Two failure surfaces exist in the engine: registration (configuration
//! problems, all-or-nothing per `register` call) and dispatch (a subscriber
//! callback failing mid-notify). Double unregistration is deliberately not an
//! error anywhere.

use crate::types::PublisherKey;

/// Error type subscriber callbacks return.
///
/// Boxed so callbacks can surface any error without the engine prescribing a
/// taxonomy; the original error is preserved and reaches the `notify` caller
/// through [`NotifyError::Callback`].
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced at registration time.
///
/// A `register` call is all-or-nothing: if any subscription spec fails to
/// resolve, no subscription of that call is inserted.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A subscription spec references a publisher key no registry is bound under
    #[error("No publisher bound under key '{0}'")]
    UnknownPublisher(PublisherKey),
    /// A subscription spec expects a different message type than the registry dispatches
    #[error("Publisher '{publisher}' dispatches {expected}, subscription expects {actual}")]
    MessageTypeMismatch {
        /// Key of the publisher the spec targeted
        publisher: PublisherKey,
        /// Message type the bound registry dispatches
        expected: &'static str,
        /// Message type the subscription spec was built for
        actual: &'static str,
    },
    /// A declarative filter could not be compiled into a predicate
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Errors surfaced by `notify`.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// A subscriber callback failed; remaining dispatch of that call was aborted
    #[error("Subscriber callback '{method}' failed: {source}")]
    Callback {
        /// Name of the callback method that failed
        method: String,
        /// The error the callback returned, unwrapped and unmodified
        #[source]
        source: CallbackError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_error_display_names_the_method() {
        let err = NotifyError::Callback {
            method: "on_message_one".to_string(),
            source: "boom".into(),
        };
        let text = err.to_string();
        assert!(text.contains("on_message_one"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn unknown_publisher_display_names_the_key() {
        let err = ConfigError::UnknownPublisher(PublisherKey::new("ghost"));
        assert!(err.to_string().contains("ghost"));
    }
}
