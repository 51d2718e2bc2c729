//! # Beacon Publish/Subscribe Engine
//!
//! Runtime dispatch engine for publish/subscribe messaging: per-publisher
//! registries of prioritized, filtered subscriptions, synchronous in-order
//! dispatch, and bulk subscription lifecycle via handles. The engine is the
//! runtime half of a larger code-generation story — generated glue and
//! hand-written code target exactly the same boundary:
//!
//! - [`PubSubSystem::create_registry`] once per publisher instance
//! - [`PubSubSystem::register`] with one [`SubscriptionSpec`] per callback
//! - [`SubscriberRegistry::notify`] from the publisher
//! - [`SubscriptionHandler::unregister_all`] / [`SubscriberRegistry::clear`]
//!   for teardown
//!
//! ## Dispatch Model
//!
//! `notify` snapshots the registry, then for each snapshotted subscription in
//! priority order (larger first, registration order among equals) evaluates
//! its filter conjunction and invokes the callback synchronously on the
//! calling thread. Callbacks receive the message mutably; a mutation made by
//! an earlier callback is visible to later callbacks of the same call.
//! Registration changes made during a call apply to future calls only.
//!
//! ## Example
//!
//! ```rust
//! use beacon_pubsub::{
//!     create_pubsub_system, BasicMessage, PublisherKey, SubscriberId, SubscriptionSpec,
//! };
//!
//! let pubsub = create_pubsub_system();
//! let chat = PublisherKey::new("chat");
//! let registry = pubsub.create_registry::<BasicMessage>(chat.clone());
//!
//! let spec = SubscriptionSpec::builder::<BasicMessage>(chat, "on_chat")
//!     .topics(["lobby"])
//!     .callback(|message| {
//!         println!("chat message {}", message.id);
//!         Ok(())
//!     });
//! let handler = pubsub.register(SubscriberId::new(), vec![spec]).unwrap();
//!
//! let mut message = BasicMessage::new(1, "lobby");
//! registry.notify(&mut message).unwrap();
//! handler.unregister_all();
//! ```

pub mod errors;
pub mod filter;
pub mod handler;
pub mod message;
pub mod registry;
pub mod subscription;
pub mod system;
pub mod types;


pub use errors::{CallbackError, ConfigError, NotifyError};
pub use filter::{filter_fn, Filter, FnFilter, IdsFilter, TopicsFilter};
pub use handler::SubscriptionHandler;
pub use message::{BasicMessage, Message};
pub use registry::{RegistryStats, SubscriberRegistry};
pub use subscription::{Subscription, SubscriptionBuilder, SubscriptionSpec};
pub use system::{create_pubsub_system, PubSubSystem, SystemStats};
pub use types::{PublisherKey, SubscriberId, SubscriptionId};
