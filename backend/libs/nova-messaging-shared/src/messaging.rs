use crate::app::AppContext;
use crate::errors::MessagingError;
use crate::listener::ListenerBuffer;
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

/// Client side of a push-messaging service
///
/// Implementations deliver tokens and messages into the [`ListenerBuffer`]
/// handed over at initialization, from whatever producer context they own.
#[async_trait]
pub trait MessagingModule: Send + Sync {
    /// Attach to the application context and start delivering into `listener`
    async fn initialize(
        &self,
        app: Arc<AppContext>,
        listener: Arc<ListenerBuffer>,
    ) -> Result<(), MessagingError>;

    /// Issue a topic subscription request
    ///
    /// The request is sent when this is called; the returned future only
    /// reports its outcome and may be dropped without cancelling it.
    fn subscribe(&self, topic: &str) -> BoxFuture<'static, Result<(), MessagingError>>;

    /// Stop delivering and release the listener
    fn terminate(&self);
}

/// Longest topic name the messaging backend accepts
pub const MAX_TOPIC_LEN: usize = 900;

/// Topic names accepted by the messaging backend: `[a-zA-Z0-9-_.~%]{1,900}`
pub fn validate_topic(topic: &str) -> Result<(), MessagingError> {
    let valid = !topic.is_empty()
        && topic.len() <= MAX_TOPIC_LEN
        && topic
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~' | '%'));

    if valid {
        Ok(())
    } else {
        Err(MessagingError::InvalidTopic(topic.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_topic() {
        assert!(validate_topic("TestTopic").is_ok());
        assert!(validate_topic("news-2024_v1.~%").is_ok());
        assert!(validate_topic("").is_err());
        assert!(validate_topic("with space").is_err());
        assert!(validate_topic("/topics/x").is_err());
    }

    #[test]
    fn test_validate_topic_length_limit() {
        assert!(validate_topic(&"a".repeat(MAX_TOPIC_LEN)).is_ok());
        assert!(matches!(
            validate_topic(&"a".repeat(MAX_TOPIC_LEN + 1)),
            Err(MessagingError::InvalidTopic(_))
        ));
    }
}
