//! Module initializer
//!
//! Runs a messaging module's asynchronous initialization on the runtime and
//! exposes its progress as a pollable status. The caller keeps pumping host
//! events while the status is [`InitStatus::Pending`].
use nova_messaging_shared::{AppContext, ListenerBuffer, MessagingError};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, error, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitStatus {
    Pending,
    Succeeded,
    Failed { code: i32, message: String },
}

impl InitStatus {
    pub fn is_complete(&self) -> bool {
        !matches!(self, InitStatus::Pending)
    }

    fn from_error(err: &MessagingError) -> Self {
        InitStatus::Failed {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

pub struct ModuleInitializer {
    status: Arc<Mutex<InitStatus>>,
    started: bool,
    attempt: Option<AbortHandle>,
    task: Option<JoinHandle<()>>,
}

impl Default for ModuleInitializer {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleInitializer {
    pub fn new() -> Self {
        Self {
            status: Arc::new(Mutex::new(InitStatus::Pending)),
            started: false,
            attempt: None,
            task: None,
        }
    }

    /// Start initialization; progress is reported through [`Self::last_result`]
    ///
    /// Initialization runs at most once per initializer. A second call leaves
    /// the first attempt running and reports an already-initialized failure.
    pub fn initialize<F, Fut>(
        &mut self,
        app: Arc<AppContext>,
        listener: Arc<ListenerBuffer>,
        init_fn: F,
    ) -> InitStatus
    where
        F: FnOnce(Arc<AppContext>, Arc<ListenerBuffer>) -> Fut,
        Fut: Future<Output = Result<(), MessagingError>> + Send + 'static,
    {
        if self.started {
            return InitStatus::from_error(&MessagingError::AlreadyInitialized);
        }
        self.started = true;

        let attempt = tokio::spawn(init_fn(app, listener));
        self.attempt = Some(attempt.abort_handle());
        let status = self.status.clone();

        self.task = Some(tokio::spawn(async move {
            let outcome = match attempt.await {
                Ok(Ok(())) => InitStatus::Succeeded,
                Ok(Err(e)) => {
                    error!(code = e.code(), error = %e, "Module initialization failed");
                    InitStatus::from_error(&e)
                }
                Err(e) => {
                    error!(error = %e, "Module initialization task did not complete");
                    InitStatus::from_error(&MessagingError::TaskAborted(e.to_string()))
                }
            };
            debug!(status = ?outcome, "Module initialization completed");
            *status.lock() = outcome;
        }));

        self.last_result()
    }

    /// Current status of the last initialization
    pub fn last_result(&self) -> InitStatus {
        self.status.lock().clone()
    }

    /// Abort a pending attempt and wait until its final status is recorded
    ///
    /// An attempt that already finished keeps its outcome, so `Succeeded`
    /// here means the module is up and must be terminated by the caller.
    pub async fn cancel(&mut self) -> InitStatus {
        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Initialization status task did not complete");
            }
        }
        self.last_result()
    }
}

impl Drop for ModuleInitializer {
    fn drop(&mut self) {
        if let Some(attempt) = self.attempt.take() {
            attempt.abort();
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
