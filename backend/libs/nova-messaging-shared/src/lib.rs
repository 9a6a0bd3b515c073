/// Nova Messaging Shared Library
///
/// Client-side surface of the push-messaging stack used by the Nova
/// messaging test application.
///
/// It provides:
/// - Application context lifecycle with an opaque platform handle
/// - The `MessagingModule` trait (initialize, subscribe, terminate)
/// - A pollable listener buffer for registration tokens and messages
/// - An in-process loopback backend for local runs and tests

pub mod app;
pub mod errors;
pub mod listener;
pub mod loopback;
pub mod messaging;
pub mod models;

pub use app::{AppContext, PlatformContext};
pub use errors::MessagingError;
pub use listener::ListenerBuffer;
pub use loopback::{load_script, LoopbackConfig, LoopbackMessaging};
pub use messaging::{validate_topic, MessagingModule, MAX_TOPIC_LEN};
pub use models::{AppOptions, Message, Notification, RegistrationToken};
