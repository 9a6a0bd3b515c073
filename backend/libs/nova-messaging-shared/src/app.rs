use crate::errors::MessagingError;
use crate::models::AppOptions;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Opaque handle to the host execution environment
///
/// Mobile hosts hand over an activity or VM handle here; desktop hosts pass
/// [`PlatformContext::none`]. The messaging stack only forwards it.
#[derive(Clone, Default)]
pub struct PlatformContext(Option<Arc<dyn Any + Send + Sync>>);

impl PlatformContext {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn new<T: Any + Send + Sync>(handle: T) -> Self {
        Self(Some(Arc::new(handle)))
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for PlatformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PlatformContext")
            .field(&if self.is_present() { "<handle>" } else { "<none>" })
            .finish()
    }
}

/// Application context that messaging modules attach to
#[derive(Debug)]
pub struct AppContext {
    options: AppOptions,
    platform: PlatformContext,
}

impl AppContext {
    /// Create an application context
    pub fn create(options: AppOptions, platform: PlatformContext) -> Result<Self, MessagingError> {
        if options.app_id.trim().is_empty() {
            return Err(MessagingError::ContextCreation("app_id is empty".to_string()));
        }
        if options.project_id.trim().is_empty() {
            return Err(MessagingError::ContextCreation(
                "project_id is empty".to_string(),
            ));
        }

        info!(
            app_id = %options.app_id,
            project_id = %options.project_id,
            platform = platform.is_present(),
            "Application context created"
        );

        Ok(Self { options, platform })
    }

    pub fn options(&self) -> &AppOptions {
        &self.options
    }

    pub fn platform(&self) -> &PlatformContext {
        &self.platform
    }

    /// Release the context
    pub fn destroy(self) {
        drop(self);
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        debug!(app_id = %self.options.app_id, "Application context released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_with_valid_options() {
        let app = AppContext::create(AppOptions::new("app", "project"), PlatformContext::none())
            .unwrap();
        assert_eq!(app.options().project_id, "project");
        assert!(!app.platform().is_present());
    }

    #[test]
    fn test_create_rejects_empty_project() {
        let err = AppContext::create(AppOptions::new("app", " "), PlatformContext::none())
            .unwrap_err();
        assert!(matches!(err, MessagingError::ContextCreation(_)));
    }

    #[test]
    fn test_platform_handle_is_forwarded() {
        let app = AppContext::create(
            AppOptions::new("app", "project"),
            PlatformContext::new(42u32),
        )
        .unwrap();
        assert!(app.platform().is_present());
        assert_eq!(format!("{:?}", app.platform()), "PlatformContext(\"<handle>\")");
    }
}
