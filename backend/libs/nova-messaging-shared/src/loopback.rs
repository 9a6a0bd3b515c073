//! In-process messaging backend
//!
//! Stands in for the remote push service when running the test application
//! locally: issues a registration token on initialization and replays a
//! scripted list of messages from a background task at a fixed cadence.
use crate::app::AppContext;
use crate::errors::MessagingError;
use crate::listener::ListenerBuffer;
use crate::messaging::{validate_topic, MessagingModule};
use crate::models::Message;
use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct LoopbackConfig {
    /// Token issued on initialization; a random UUID when unset
    pub registration_token: Option<String>,
    /// Messages delivered in order after the token
    pub script: Vec<Message>,
    pub delivery_interval: Duration,
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self {
            registration_token: None,
            script: Vec::new(),
            delivery_interval: Duration::from_millis(500),
        }
    }
}

impl LoopbackConfig {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.registration_token = Some(token.into());
        self
    }

    pub fn with_script(mut self, script: Vec<Message>) -> Self {
        self.script = script;
        self
    }

    pub fn with_delivery_interval(mut self, interval: Duration) -> Self {
        self.delivery_interval = interval;
        self
    }
}

/// Load a JSON array of messages to replay
pub fn load_script(path: impl AsRef<Path>) -> Result<Vec<Message>, MessagingError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| MessagingError::ScriptLoad(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| MessagingError::ScriptLoad(format!("{}: {}", path.display(), e)))
}

#[derive(Default)]
struct LoopbackState {
    listener: Option<Arc<ListenerBuffer>>,
    producer: Option<JoinHandle<()>>,
    topics: Vec<String>,
    terminated: bool,
}

pub struct LoopbackMessaging {
    config: LoopbackConfig,
    state: Mutex<LoopbackState>,
}

impl LoopbackMessaging {
    pub fn new(config: LoopbackConfig) -> Self {
        Self {
            config,
            state: Mutex::new(LoopbackState::default()),
        }
    }

    /// Topics subscribed so far, in request order
    pub fn topics(&self) -> Vec<String> {
        self.state.lock().topics.clone()
    }

    pub fn is_terminated(&self) -> bool {
        self.state.lock().terminated
    }

    async fn deliver(
        listener: Arc<ListenerBuffer>,
        token: String,
        script: Vec<Message>,
        interval: Duration,
    ) {
        listener.push_token(token);
        debug!(messages = script.len(), "Loopback producer started");

        for message in script {
            tokio::time::sleep(interval).await;
            listener.push_message(message);
        }

        debug!("Loopback producer finished script");
    }
}

#[async_trait]
impl MessagingModule for LoopbackMessaging {
    async fn initialize(
        &self,
        app: Arc<AppContext>,
        listener: Arc<ListenerBuffer>,
    ) -> Result<(), MessagingError> {
        // Let the host loop run once, as a deferred component load would.
        tokio::task::yield_now().await;

        let mut state = self.state.lock();
        if state.terminated {
            return Err(MessagingError::Terminated);
        }
        if state.listener.is_some() {
            return Err(MessagingError::AlreadyInitialized);
        }

        let token = self
            .config
            .registration_token
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        state.producer = Some(tokio::spawn(Self::deliver(
            listener.clone(),
            token,
            self.config.script.clone(),
            self.config.delivery_interval,
        )));
        state.listener = Some(listener);

        info!(
            project_id = %app.options().project_id,
            scripted = self.config.script.len(),
            "Loopback messaging initialized"
        );
        Ok(())
    }

    fn subscribe(&self, topic: &str) -> BoxFuture<'static, Result<(), MessagingError>> {
        let mut state = self.state.lock();
        let result = if state.terminated {
            Err(MessagingError::Terminated)
        } else if state.listener.is_none() {
            Err(MessagingError::NotInitialized)
        } else {
            validate_topic(topic).map(|()| {
                state.topics.push(topic.to_string());
                debug!(topic = %topic, "Loopback subscription recorded");
            })
        };

        future::ready(result).boxed()
    }

    fn terminate(&self) {
        let mut state = self.state.lock();
        if state.terminated {
            warn!("Loopback messaging terminated twice");
            return;
        }
        if let Some(producer) = state.producer.take() {
            producer.abort();
        }
        state.listener = None;
        state.terminated = true;
        info!("Loopback messaging terminated");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::PlatformContext;
    use crate::models::AppOptions;

    fn app() -> Arc<AppContext> {
        Arc::new(
            AppContext::create(AppOptions::new("app", "project"), PlatformContext::none())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_initialize_issues_token() {
        let module = LoopbackMessaging::new(LoopbackConfig::default().with_token("tok-1"));
        let listener = Arc::new(ListenerBuffer::new());

        module.initialize(app(), listener.clone()).await.unwrap();

        for _ in 0..50 {
            if listener.pending_tokens() > 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(listener.poll_token().as_deref(), Some("tok-1"));
        module.terminate();
    }

    #[tokio::test]
    async fn test_double_initialize_fails() {
        let module = LoopbackMessaging::new(LoopbackConfig::default());
        let listener = Arc::new(ListenerBuffer::new());

        module.initialize(app(), listener.clone()).await.unwrap();
        let err = module.initialize(app(), listener).await.unwrap_err();
        assert_eq!(err, MessagingError::AlreadyInitialized);
    }

    #[tokio::test]
    async fn test_subscribe_before_initialize_fails() {
        let module = LoopbackMessaging::new(LoopbackConfig::default());
        let result = module.subscribe("TestTopic").await;
        assert_eq!(result, Err(MessagingError::NotInitialized));
        assert!(module.topics().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_records_topic() {
        let module = LoopbackMessaging::new(LoopbackConfig::default());
        module
            .initialize(app(), Arc::new(ListenerBuffer::new()))
            .await
            .unwrap();

        module.subscribe("TestTopic").await.unwrap();
        assert!(module.subscribe("bad topic").await.is_err());
        assert_eq!(module.topics(), vec!["TestTopic".to_string()]);
    }

    #[tokio::test]
    async fn test_terminate_stops_producer() {
        let script = vec![Message::with_id("m1"), Message::with_id("m2")];
        let module = LoopbackMessaging::new(
            LoopbackConfig::default()
                .with_script(script)
                .with_delivery_interval(Duration::from_secs(60)),
        );
        let listener = Arc::new(ListenerBuffer::new());
        module.initialize(app(), listener.clone()).await.unwrap();

        module.terminate();
        assert!(module.is_terminated());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(listener.pending_messages(), 0);
        assert_eq!(
            module.initialize(app(), listener).await,
            Err(MessagingError::Terminated)
        );
    }

    #[test]
    fn test_load_script_missing_file() {
        let err = load_script("/nonexistent/messages.json").unwrap_err();
        assert!(matches!(err, MessagingError::ScriptLoad(_)));
    }
}
