use std::fmt::Display;

use thiserror::Error;

use crate::model::activity::Measurement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Activity,
    Rhythm,
    Event,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Activity => write!(f, "activity"),
            EntityKind::Rhythm => write!(f, "rhythm"),
            EntityKind::Event => write!(f, "event"),
        }
    }
}

/// Failures a user can correct by picking another id or another command. They travel inside
/// [anyhow::Error] and can be recovered with `downcast_ref`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    #[error("No {entity} with id {id}")]
    NotFound { entity: EntityKind, id: u64 },

    #[error("Activity {activity_id} is measured in {measurement}, {attempted} can't be logged for it")]
    MeasurementMismatch {
        activity_id: u64,
        measurement: Measurement,
        attempted: &'static str,
    },

    #[error("Invalid activity: {0}")]
    InvariantViolation(String),
}

impl TrackerError {
    pub fn not_found(entity: EntityKind, id: u64) -> Self {
        Self::NotFound { entity, id }
    }
}
