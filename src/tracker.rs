//! Operations behind every command. The store handle and the clock are passed into each of them,
//! validation of user requests happens here, before anything reaches the storage or the
//! evaluator.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{info, instrument};

use crate::{
    error::{EntityKind, TrackerError},
    model::{
        activity::{Activity, Measurement, NewActivity},
        history::{EventKind, HistoryEvent, NewEvent},
        rhythm::RhythmRecord,
    },
    progress::{evaluate, ProgressStatus},
    storage::Storage,
    utils::clock::Clock,
};

/// Activity together with everything needed to evaluate it.
#[derive(Debug, Clone)]
pub struct ActivityReport {
    pub activity: Activity,
    pub rhythm: RhythmRecord,
    pub status: ProgressStatus,
}

#[instrument(skip(storage, clock))]
pub async fn create_activity(
    storage: &impl Storage,
    clock: &dyn Clock,
    activity: NewActivity,
) -> Result<Activity> {
    activity.validate()?;
    let activity = storage.insert_activity(activity, clock.time()).await?;
    info!("Created activity {} '{}'", activity.id, activity.name);
    Ok(activity)
}

pub async fn find_activity(storage: &impl Storage, activity_id: u64) -> Result<Activity> {
    Ok(storage
        .activity(activity_id)
        .await?
        .ok_or(TrackerError::not_found(EntityKind::Activity, activity_id))?)
}

/// Deletes an activity with its whole history.
#[instrument(skip(storage))]
pub async fn remove_activity(storage: &impl Storage, activity_id: u64) -> Result<Activity> {
    Ok(storage
        .delete_activity(activity_id)
        .await?
        .ok_or(TrackerError::not_found(EntityKind::Activity, activity_id))?)
}

/// Logs a completion. `at` defaults to the current time.
#[instrument(skip(storage, clock))]
pub async fn record_completion(
    storage: &impl Storage,
    clock: &dyn Clock,
    activity_id: u64,
    at: Option<DateTime<Utc>>,
) -> Result<HistoryEvent> {
    let activity = find_activity(storage, activity_id).await?;
    if activity.measurement != Measurement::Instances {
        return Err(TrackerError::MeasurementMismatch {
            activity_id,
            measurement: activity.measurement,
            attempted: "a completion",
        }
        .into());
    }

    storage
        .append_event(NewEvent {
            activity_id,
            kind: EventKind::Completion,
            timestamp: at.unwrap_or_else(|| clock.time()),
        })
        .await
}

/// Logs `minutes` spent on an activity. `at` defaults to the current time.
#[instrument(skip(storage, clock))]
pub async fn record_duration(
    storage: &impl Storage,
    clock: &dyn Clock,
    activity_id: u64,
    minutes: u32,
    at: Option<DateTime<Utc>>,
) -> Result<HistoryEvent> {
    let activity = find_activity(storage, activity_id).await?;
    if activity.measurement != Measurement::Duration {
        return Err(TrackerError::MeasurementMismatch {
            activity_id,
            measurement: activity.measurement,
            attempted: "a duration",
        }
        .into());
    }

    storage
        .append_event(NewEvent {
            activity_id,
            kind: EventKind::Duration { minutes },
            timestamp: at.unwrap_or_else(|| clock.time()),
        })
        .await
}

#[instrument(skip(storage))]
pub async fn delete_event(storage: &impl Storage, event_id: u64) -> Result<HistoryEvent> {
    Ok(storage
        .delete_event(event_id)
        .await?
        .ok_or(TrackerError::not_found(EntityKind::Event, event_id))?)
}

/// History of an activity, most recent first.
pub async fn activity_history(
    storage: &impl Storage,
    activity_id: u64,
) -> Result<Vec<HistoryEvent>> {
    find_activity(storage, activity_id).await?;
    let mut history = storage.history_for(activity_id).await?;
    history.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    Ok(history)
}

async fn report<Tz: TimeZone>(
    storage: &impl Storage,
    activity: Activity,
    now: &DateTime<Tz>,
) -> Result<ActivityReport> {
    let rhythm = storage
        .rhythm(activity.rhythm_id)
        .await?
        .ok_or(TrackerError::not_found(EntityKind::Rhythm, activity.rhythm_id))?;
    let history = storage.history_for(activity.id).await?;
    let status = evaluate(&activity, &rhythm.rhythm, &history, now);
    Ok(ActivityReport {
        activity,
        rhythm,
        status,
    })
}

pub async fn activity_status<Tz: TimeZone>(
    storage: &impl Storage,
    activity_id: u64,
    now: &DateTime<Tz>,
) -> Result<ActivityReport> {
    let activity = find_activity(storage, activity_id).await?;
    report(storage, activity, now).await
}

/// Reports for every activity ordered by id.
pub async fn all_statuses<Tz: TimeZone>(
    storage: &impl Storage,
    now: &DateTime<Tz>,
) -> Result<Vec<ActivityReport>> {
    let mut reports = vec![];
    for activity in storage.activities().await? {
        reports.push(report(storage, activity, now).await?);
    }
    Ok(reports)
}
