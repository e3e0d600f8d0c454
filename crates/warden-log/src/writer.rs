use crate::event::LogEvent;
use crate::level::LogLevel;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sink for formatted log events
///
/// Implementations must be thread-safe; `close` is invoked exactly once by
/// the owning logger.
pub trait LogWriter: Send + Sync {
    fn write(&self, event: &LogEvent);
    fn close(&self);
}

/// Bridges log events onto the `tracing` macros
pub struct TracingWriter;

impl LogWriter for TracingWriter {
    fn write(&self, event: &LogEvent) {
        let meta = serde_json::to_string(&event.metadata).unwrap_or_default();
        match event.level {
            LogLevel::Debug => tracing::debug!(
                service = %event.service,
                event_type = %event.event_type,
                metadata = %meta,
                "{}",
                event.message
            ),
            LogLevel::Info => tracing::info!(
                service = %event.service,
                event_type = %event.event_type,
                metadata = %meta,
                "{}",
                event.message
            ),
            LogLevel::Warn => tracing::warn!(
                service = %event.service,
                event_type = %event.event_type,
                metadata = %meta,
                "{}",
                event.message
            ),
            LogLevel::Error => tracing::error!(
                service = %event.service,
                event_type = %event.event_type,
                metadata = %meta,
                "{}",
                event.message
            ),
        }
    }

    fn close(&self) {}
}

/// Writes one JSON object per line to an underlying `io::Write`
pub struct JsonWriter<W: Write + Send> {
    inner: Mutex<W>,
}

impl<W: Write + Send> JsonWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }
}

impl<W: Write + Send> LogWriter for JsonWriter<W> {
    fn write(&self, event: &LogEvent) {
        let Ok(line) = serde_json::to_string(event) else {
            return;
        };
        let mut inner = self.inner.lock().expect("json writer lock poisoned");
        let _ = writeln!(inner, "{}", line);
    }

    fn close(&self) {
        let mut inner = self.inner.lock().expect("json writer lock poisoned");
        let _ = inner.flush();
    }
}

/// Decouples callers from a slow writer through a bounded channel
///
/// Writes are non-blocking: when the channel is full the event is dropped,
/// the same policy the monitor applies to its events sink. A background
/// task drains the channel into the inner writer; `close` detaches the
/// sender so the task finishes after draining what was accepted.
pub struct BufferedWriter {
    tx: Mutex<Option<mpsc::Sender<LogEvent>>>,
    drain: Mutex<Option<JoinHandle<()>>>,
}

impl BufferedWriter {
    /// Must be called from within a tokio runtime
    pub fn new(inner: Arc<dyn LogWriter>, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<LogEvent>(capacity);
        let drain = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                inner.write(&event);
            }
            inner.close();
        });
        Self {
            tx: Mutex::new(Some(tx)),
            drain: Mutex::new(Some(drain)),
        }
    }

    /// Wait for the drain task to finish after `close`
    pub async fn drained(&self) {
        let handle = self.drain.lock().expect("drain lock poisoned").take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl LogWriter for BufferedWriter {
    fn write(&self, event: &LogEvent) {
        let tx = self.tx.lock().expect("buffered writer lock poisoned");
        if let Some(tx) = tx.as_ref() {
            // Full channel means the event is dropped, never blocked on
            let _ = tx.try_send(event.clone());
        }
    }

    fn close(&self) {
        self.tx.lock().expect("buffered writer lock poisoned").take();
    }
}

/// Test writer that records everything it sees
#[cfg(test)]
pub(crate) struct CollectingWriter {
    pub events: Mutex<Vec<LogEvent>>,
    pub closed: Mutex<u32>,
}

#[cfg(test)]
impl CollectingWriter {
    pub(crate) fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            closed: Mutex::new(0),
        }
    }
}

#[cfg(test)]
impl LogWriter for CollectingWriter {
    fn write(&self, event: &LogEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn close(&self) {
        *self.closed.lock().unwrap() += 1;
    }
}
