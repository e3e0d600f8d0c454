use crate::level::LogLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// A structured log event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// Unique event id
    pub id: Uuid,
    /// Time the event was created
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Service the event belongs to
    pub service: String,
    /// Short machine-readable event type (e.g. "listener-state-change")
    pub event_type: String,
    pub message: String,
    pub metadata: BTreeMap<String, String>,
}

impl LogEvent {
    pub fn new(
        level: LogLevel,
        service: impl Into<String>,
        event_type: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            service: service.into(),
            event_type: event_type.into(),
            message: message.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, metadata: &[(&str, &str)]) -> Self {
        for (key, value) in metadata {
            self.metadata
                .insert((*key).to_string(), (*value).to_string());
        }
        self
    }
}
