//! Progress evaluation. [evaluate] answers whether an activity is on track at a given moment by
//! looking at its rhythm, target and history. Evaluation is a pure computation: it doesn't touch
//! the storage, doesn't keep state between calls, and is defined for any history including an
//! empty one.
//!
//! Every rhythm kind has its own strategy:
//!  - [recurring] is due a fixed number of days after the last event.
//!  - [trailing] checks a rolling window that ends at the evaluation time.
//!  - [calendar] checks the calendar day/week/month/year containing the evaluation time.

pub mod aggregate;
pub mod calendar;
pub mod recurring;
pub mod trailing;

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::{instrument, trace};

use crate::model::{activity::Activity, history::HistoryEvent, rhythm::Rhythm};

/// Result of an evaluation. It's recomputed for every query and never stored. `context` and
/// `period_label` are meant to be shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStatus {
    pub current: u64,
    pub target: u64,
    pub is_on_track: bool,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_remaining: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_due: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_label: Option<String>,
}

impl ProgressStatus {
    pub fn new(current: u64, target: u64, is_on_track: bool, context: impl Into<String>) -> Self {
        Self {
            current,
            target,
            is_on_track,
            context: context.into(),
            days_remaining: None,
            days_until_due: None,
            days_overdue: None,
            period_label: None,
        }
    }

    pub fn with_days_remaining(self, days: i64) -> Self {
        Self {
            days_remaining: Some(days),
            ..self
        }
    }

    pub fn with_days_until_due(self, days: i64) -> Self {
        Self {
            days_until_due: Some(days),
            ..self
        }
    }

    pub fn with_days_overdue(self, days: i64) -> Self {
        Self {
            days_overdue: Some(days),
            ..self
        }
    }

    pub fn with_period_label(self, label: impl Into<String>) -> Self {
        Self {
            period_label: Some(label.into()),
            ..self
        }
    }
}

/// Evaluates `activity` at `now`. `history` can come in any order and is expected to contain
/// only events of this activity, no filtering by activity id happens here.
#[instrument(skip(activity, history), fields(activity = activity.id, events = history.len()))]
pub fn evaluate<Tz: TimeZone>(
    activity: &Activity,
    rhythm: &Rhythm,
    history: &[HistoryEvent],
    now: &DateTime<Tz>,
) -> ProgressStatus {
    let status = match rhythm {
        Rhythm::Trailing(trailing) => trailing::evaluate(activity, trailing, history, now),
        Rhythm::Recurring(recurring) => recurring::evaluate(activity, recurring, history, now),
        Rhythm::Calendar(calendar) => calendar::evaluate(activity, calendar, history, now),
    };
    trace!("Evaluated {status:?}");
    status
}

/// "1 day", "2 days".
pub(crate) fn days_phrase(days: i64) -> String {
    if days == 1 {
        "1 day".into()
    } else {
        format!("{days} days")
    }
}
