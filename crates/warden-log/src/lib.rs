//! Warden Log - Structured logging port for the warden supervisor
//!
//! Provides the `Logger` capability interface the monitor's callbacks are
//! shaped around, plus a level-filtered fan-out implementation with
//! thread-safe writers (a `tracing` bridge, a JSON line writer, and a
//! bounded non-blocking buffered writer).

pub mod event;
pub mod level;
pub mod logger;
pub mod writer;

pub use event::LogEvent;
pub use level::LogLevel;
pub use logger::{FanoutLogger, Logger};
pub use writer::{BufferedWriter, JsonWriter, LogWriter, TracingWriter};
