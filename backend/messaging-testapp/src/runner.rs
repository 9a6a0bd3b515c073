//! Messaging test application main loop
//!
//! INIT -> SUBSCRIBING -> RUNNING -> TERMINATED, with INIT -> FAILED when
//! initialization reports an error or shutdown is requested before it
//! completes.
use crate::event_pump::EventPump;
use crate::initializer::{InitStatus, ModuleInitializer};
use crate::report;
use crate::sink::LogSink;
use futures::future::{BoxFuture, FutureExt};
use nova_messaging_shared::{
    AppContext, AppOptions, ListenerBuffer, MessagingError, MessagingModule, PlatformContext,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub app_options: AppOptions,
    pub topic: String,
    pub init_poll: Duration,
    pub poll_interval: Duration,
    pub failure_linger: Duration,
    /// Wait for the subscription outcome before entering the main loop
    pub await_subscription: bool,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            app_options: AppOptions::new("nova-messaging-testapp", "nova-dev"),
            topic: "TestTopic".to_string(),
            init_poll: Duration::from_millis(100),
            poll_interval: Duration::from_millis(1000),
            failure_linger: Duration::from_millis(2000),
            await_subscription: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Init,
    Subscribing,
    Running,
    Terminated,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    InitFailed { code: i32, message: String },
    /// Shutdown was requested before initialization completed
    ShutdownDuringInit,
}

impl ExitOutcome {
    /// Process exit code; every failure maps to 1
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::InitFailed { .. } | ExitOutcome::ShutdownDuringInit => 1,
        }
    }
}

pub struct TestApp<P: EventPump> {
    settings: RunnerSettings,
    module: Arc<dyn MessagingModule>,
    pump: P,
    sink: Arc<dyn LogSink>,
    platform: PlatformContext,
    state: LoopState,
}

impl<P: EventPump> TestApp<P> {
    pub fn new(
        settings: RunnerSettings,
        module: Arc<dyn MessagingModule>,
        pump: P,
        sink: Arc<dyn LogSink>,
        platform: PlatformContext,
    ) -> Self {
        Self {
            settings,
            module,
            pump,
            sink,
            platform,
            state: LoopState::Init,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    fn transition(&mut self, next: LoopState) {
        debug!(from = ?self.state, to = ?next, "Main loop state change");
        self.state = next;
    }

    /// Run until shutdown or an initialization failure
    pub async fn run(&mut self) -> ExitOutcome {
        let app = match AppContext::create(
            self.settings.app_options.clone(),
            self.platform.clone(),
        ) {
            Ok(app) => Arc::new(app),
            Err(e) => return self.fail(e.code(), e.to_string()).await,
        };
        self.sink.log(format_args!("Initialized application context."));

        let listener = Arc::new(ListenerBuffer::new());

        self.sink.log(format_args!("Initialize the messaging library"));
        let mut initializer = ModuleInitializer::new();
        let module = self.module.clone();
        let sink = self.sink.clone();
        initializer.initialize(app.clone(), listener.clone(), move |app, listener| async move {
            sink.log(format_args!("Try to initialize messaging"));
            module.initialize(app, listener).await
        });

        loop {
            match initializer.last_result() {
                InitStatus::Succeeded => break,
                InitStatus::Failed { code, message } => return self.fail(code, message).await,
                InitStatus::Pending => {
                    if self.pump.process_events(self.settings.init_poll).await {
                        warn!("Shutdown requested before messaging finished initializing");
                        // A module that came up during the last pump must still be torn down
                        if initializer.cancel().await == InitStatus::Succeeded {
                            debug!("Messaging initialized during shutdown, terminating it");
                            self.module.terminate();
                        }
                        self.transition(LoopState::Failed);
                        return ExitOutcome::ShutdownDuringInit;
                    }
                }
            }
        }
        drop(initializer);
        self.sink.log(format_args!("Initialized messaging."));

        self.transition(LoopState::Subscribing);
        if self.subscribe().await {
            info!("Shutdown requested while subscribing");
        } else {
            self.transition(LoopState::Running);
            loop {
                self.drain(&listener);
                if self.pump.process_events(self.settings.poll_interval).await {
                    info!("Shutdown requested, stopping main loop");
                    break;
                }
            }
        }

        self.transition(LoopState::Terminated);
        self.module.terminate();
        drop(listener);
        match Arc::try_unwrap(app) {
            Ok(app) => app.destroy(),
            Err(_) => warn!("Application context still referenced at shutdown"),
        }

        ExitOutcome::Success
    }

    async fn fail(&mut self, code: i32, message: String) -> ExitOutcome {
        self.sink.log(format_args!(
            "Failed to initialize messaging: {message} (code {code})"
        ));
        self.transition(LoopState::Failed);
        // Keep the host alive briefly so the failure is visible
        self.pump.process_events(self.settings.failure_linger).await;
        ExitOutcome::InitFailed { code, message }
    }

    /// Issue the topic subscription; returns `true` if shutdown was requested meanwhile
    async fn subscribe(&mut self) -> bool {
        let topic = self.settings.topic.clone();
        let mut outcome = self.module.subscribe(&topic);

        if self.settings.await_subscription {
            return match self.wait_for_subscription(&mut outcome).await {
                Some(result) => {
                    self.report_subscription(&topic, result);
                    false
                }
                None => true,
            };
        }

        // Rejections the module reports right away are logged instead of the
        // success line; anything still in flight is awaited in the background.
        match (&mut outcome).now_or_never() {
            Some(result) => self.report_subscription(&topic, result),
            None => {
                self.sink.log(format_args!("Subscribed to {topic}"));
                tokio::spawn(async move {
                    match outcome.await {
                        Ok(()) => debug!(topic = %topic, "Topic subscription confirmed"),
                        Err(e) => warn!(topic = %topic, error = %e, "Topic subscription failed"),
                    }
                });
            }
        }
        false
    }

    /// Wait for the subscription outcome while keeping the event pump running
    async fn wait_for_subscription(
        &mut self,
        outcome: &mut BoxFuture<'static, Result<(), MessagingError>>,
    ) -> Option<Result<(), MessagingError>> {
        loop {
            tokio::select! {
                result = &mut *outcome => return Some(result),
                shutdown = self.pump.process_events(self.settings.init_poll) => {
                    if shutdown {
                        return None;
                    }
                }
            }
        }
    }

    fn report_subscription(&self, topic: &str, result: Result<(), MessagingError>) {
        match result {
            Ok(()) => self.sink.log(format_args!("Subscribed to {topic}")),
            Err(e) => {
                warn!(topic = %topic, error = %e, "Topic subscription failed");
                self.sink.log(format_args!("Failed to subscribe to {topic}: {e}"));
            }
        }
    }

    fn drain(&self, listener: &ListenerBuffer) {
        let mut tokens = 0usize;
        while let Some(token) = listener.poll_token() {
            self.sink.log(format_args!("{}", report::token_line(&token)));
            tokens += 1;
        }

        let mut messages = 0usize;
        while let Some(message) = listener.poll_message() {
            for line in report::message_lines(&message) {
                self.sink.log(format_args!("{line}"));
            }
            messages += 1;
        }

        if tokens > 0 || messages > 0 {
            debug!(tokens, messages, "Drained listener");
        }
    }
}
