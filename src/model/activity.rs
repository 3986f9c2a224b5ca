use std::{fmt::Display, sync::Arc};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

use super::rhythm::Rhythm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// Something that has to be done, only ever measured in instances.
    Task,
    /// Something worth spending time on.
    Pursuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Measurement {
    Instances,
    /// Accumulated minutes.
    Duration,
}

impl Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framing::Task => write!(f, "task"),
            Framing::Pursuit => write!(f, "pursuit"),
        }
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measurement::Instances => write!(f, "instances"),
            Measurement::Duration => write!(f, "duration"),
        }
    }
}

/// A tracked activity as it is stored. History is linked through [Activity::id], so renaming
/// doesn't affect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: u64,
    pub name: Arc<str>,
    pub framing: Framing,
    pub rhythm_id: u64,
    pub target: u32,
    pub measurement: Measurement,
    pub created_at: DateTime<Utc>,
}

/// Activity that hasn't been stored yet. Always goes through [NewActivity::validate] before
/// reaching the storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub name: Arc<str>,
    pub framing: Framing,
    pub rhythm: Rhythm,
    pub target: u32,
    pub measurement: Measurement,
}

impl NewActivity {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.framing == Framing::Task && self.measurement == Measurement::Duration {
            return Err(TrackerError::InvariantViolation(
                "tasks can only be measured in instances".into(),
            ));
        }
        if self.target == 0 {
            return Err(TrackerError::InvariantViolation(
                "target must be at least 1".into(),
            ));
        }
        if self.name.trim().is_empty() {
            return Err(TrackerError::InvariantViolation(
                "name can't be empty".into(),
            ));
        }
        self.rhythm.validate()
    }
}
