use parking_lot::Mutex;
use std::fmt;

/// Destination for the application's report lines
pub trait LogSink: Send + Sync {
    fn log(&self, line: fmt::Arguments<'_>);
}

/// Emits report lines as `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, line: fmt::Arguments<'_>) {
        tracing::info!(target: "messaging_testapp::report", "{}", line);
    }
}

/// Keeps report lines in memory
#[derive(Debug, Default)]
pub struct CapturingSink {
    lines: Mutex<Vec<String>>,
}

impl CapturingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn contains(&self, line: &str) -> bool {
        self.lines.lock().iter().any(|l| l == line)
    }
}

impl LogSink for CapturingSink {
    fn log(&self, line: fmt::Arguments<'_>) {
        self.lines.lock().push(line.to_string());
    }
}
