pub mod config;
pub mod event_pump;
pub mod initializer;
pub mod report;
pub mod runner;
pub mod sink;

pub use config::{Config, ConfigError};
pub use event_pump::{EventPump, ShutdownHandle, SignalEventPump};
pub use initializer::{InitStatus, ModuleInitializer};
pub use runner::{ExitOutcome, LoopState, RunnerSettings, TestApp};
pub use sink::{CapturingSink, LogSink, TracingSink};
