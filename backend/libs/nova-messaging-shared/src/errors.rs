use thiserror::Error;

/// Messaging client error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessagingError {
    #[error("Failed to create application context: {0}")]
    ContextCreation(String),

    #[error("Failed to initialize messaging: {0}")]
    InitializationFailed(String),

    #[error("Messaging is already initialized")]
    AlreadyInitialized,

    #[error("Messaging is not initialized")]
    NotInitialized,

    #[error("Messaging has been terminated")]
    Terminated,

    #[error("Topic subscription failed for {topic}: {reason}")]
    SubscriptionFailed { topic: String, reason: String },

    #[error("Invalid topic name: {0}")]
    InvalidTopic(String),

    #[error("Failed to load message script: {0}")]
    ScriptLoad(String),

    #[error("Initialization task aborted: {0}")]
    TaskAborted(String),
}

impl MessagingError {
    /// Stable, non-zero error code reported alongside the message
    pub fn code(&self) -> i32 {
        match self {
            MessagingError::ContextCreation(_) => 1,
            MessagingError::InitializationFailed(_) => 2,
            MessagingError::AlreadyInitialized => 3,
            MessagingError::NotInitialized => 4,
            MessagingError::Terminated => 5,
            MessagingError::SubscriptionFailed { .. } => 6,
            MessagingError::InvalidTopic(_) => 7,
            MessagingError::ScriptLoad(_) => 8,
            MessagingError::TaskAborted(_) => 9,
        }
    }
}

impl From<MessagingError> for String {
    fn from(err: MessagingError) -> Self {
        err.to_string()
    }
}
