use crate::event::LogEvent;
use crate::level::LogLevel;
use crate::writer::LogWriter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The logging port used by the monitor's observability collaborators
///
/// Implementations must be thread-safe and must return promptly from every
/// method: the monitor may call them from inside its state-update critical
/// section.
pub trait Logger: Send + Sync {
    /// Deliver a fully built event
    fn log(&self, event: LogEvent);

    /// Release underlying writers; later calls are no-ops
    fn close(&self);

    fn debug(&self, service: &str, event_type: &str, message: &str, metadata: &[(&str, &str)]) {
        self.log(LogEvent::new(LogLevel::Debug, service, event_type, message).with_metadata(metadata));
    }

    fn info(&self, service: &str, event_type: &str, message: &str, metadata: &[(&str, &str)]) {
        self.log(LogEvent::new(LogLevel::Info, service, event_type, message).with_metadata(metadata));
    }

    fn warn(&self, service: &str, event_type: &str, message: &str, metadata: &[(&str, &str)]) {
        self.log(LogEvent::new(LogLevel::Warn, service, event_type, message).with_metadata(metadata));
    }

    fn error(&self, service: &str, event_type: &str, message: &str, metadata: &[(&str, &str)]) {
        self.log(LogEvent::new(LogLevel::Error, service, event_type, message).with_metadata(metadata));
    }
}

/// Fans events out to a set of writers after level filtering
pub struct FanoutLogger {
    writers: Vec<Arc<dyn LogWriter>>,
    min_level: LogLevel,
    closed: AtomicBool,
}

impl FanoutLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self {
            writers: Vec::new(),
            min_level,
            closed: AtomicBool::new(false),
        }
    }

    pub fn with_writer(mut self, writer: Arc<dyn LogWriter>) -> Self {
        self.writers.push(writer);
        self
    }
}

impl Logger for FanoutLogger {
    fn log(&self, event: LogEvent) {
        if self.closed.load(Ordering::SeqCst) || event.level < self.min_level {
            return;
        }
        for writer in &self.writers {
            writer.write(&event);
        }
    }

    fn close(&self) {
        // Writers are closed exactly once, regardless of repeated calls
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        for writer in &self.writers {
            writer.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::CollectingWriter;

    #[test]
    fn test_fanout_reaches_all_writers() {
        let first = Arc::new(CollectingWriter::new());
        let second = Arc::new(CollectingWriter::new());
        let logger = FanoutLogger::new(LogLevel::Debug)
            .with_writer(first.clone())
            .with_writer(second.clone());

        logger.info("api", "startup", "listening", &[("port", "8080")]);

        assert_eq!(first.events.lock().unwrap().len(), 1);
        assert_eq!(second.events.lock().unwrap().len(), 1);
        let event = &first.events.lock().unwrap()[0];
        assert_eq!(event.level, LogLevel::Info);
        assert_eq!(event.metadata["port"], "8080");
    }

    #[test]
    fn test_level_filter_drops_below_min() {
        let writer = Arc::new(CollectingWriter::new());
        let logger = FanoutLogger::new(LogLevel::Warn).with_writer(writer.clone());

        logger.debug("api", "noise", "ignored", &[]);
        logger.info("api", "noise", "ignored", &[]);
        logger.warn("api", "probe-failed", "kept", &[]);
        logger.error("api", "probe-failed", "kept", &[]);

        let events = writer.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.level >= LogLevel::Warn));
    }

    #[test]
    fn test_close_is_idempotent_and_closes_writers_once() {
        let writer = Arc::new(CollectingWriter::new());
        let logger = FanoutLogger::new(LogLevel::Debug).with_writer(writer.clone());

        logger.close();
        logger.close();

        assert_eq!(*writer.closed.lock().unwrap(), 1);
    }

    #[test]
    fn test_log_after_close_is_dropped() {
        let writer = Arc::new(CollectingWriter::new());
        let logger = FanoutLogger::new(LogLevel::Debug).with_writer(writer.clone());

        logger.close();
        logger.error("api", "late", "dropped", &[]);

        assert!(writer.events.lock().unwrap().is_empty());
    }
}
