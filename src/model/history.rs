use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a history event records. Only durations carry minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EventKind {
    Completion,
    Duration { minutes: u32 },
}

/// An immutable log entry against a single activity. Can only be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub id: u64,
    pub activity_id: u64,
    #[serde(flatten)]
    pub kind: EventKind,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEvent {
    pub fn minutes(&self) -> Option<u32> {
        match self.kind {
            EventKind::Completion => None,
            EventKind::Duration { minutes } => Some(minutes),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    pub activity_id: u64,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

impl NewEvent {
    pub fn with_id(self, id: u64) -> HistoryEvent {
        HistoryEvent {
            id,
            activity_id: self.activity_id,
            kind: self.kind,
            timestamp: self.timestamp,
        }
    }
}
