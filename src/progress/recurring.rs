use chrono::{DateTime, TimeZone};
use tracing::debug;

use crate::{
    model::{activity::Activity, history::HistoryEvent, rhythm::Recurring},
    utils::time::calendar_day_difference,
};

use super::{days_phrase, ProgressStatus};

pub const NOT_STARTED: &str = "Not started yet";

/// Recurring activities are due `every * unit` days after the most recent event. There is no
/// window, so progress is either full (on track) or zero (overdue).
pub fn evaluate<Tz: TimeZone>(
    activity: &Activity,
    rhythm: &Recurring,
    history: &[HistoryEvent],
    now: &DateTime<Tz>,
) -> ProgressStatus {
    let target = u64::from(activity.target);

    // Any of the events sharing the latest timestamp gives the same day difference.
    let Some(last) = history.iter().max_by_key(|event| event.timestamp) else {
        return ProgressStatus::new(0, target, false, NOT_STARTED).with_days_overdue(0);
    };

    let interval_days = rhythm.unit.days(rhythm.every);
    let days_since_last = calendar_day_difference(now, &last.timestamp);
    debug!(
        "Last event {} was {days_since_last} days ago, interval is {interval_days} days",
        last.id
    );

    if days_since_last <= interval_days {
        let context = if days_since_last == 0 {
            "today".to_string()
        } else {
            format!("{} ago", days_phrase(days_since_last))
        };
        ProgressStatus::new(target, target, true, context)
            .with_days_until_due(interval_days - days_since_last)
    } else {
        let days_overdue = days_since_last - interval_days;
        ProgressStatus::new(0, target, false, format!("{} overdue", days_phrase(days_overdue)))
            .with_days_overdue(days_overdue)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{
        model::{
            activity::Measurement,
            history::HistoryEvent,
            rhythm::{Recurring, TimeUnit},
        },
        progress::{
            test_utils::{activity, completion},
            ProgressStatus,
        },
    };

    use super::evaluate;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 9, 0, 0).unwrap()
    }

    fn weekly(history: &[HistoryEvent]) -> ProgressStatus {
        evaluate(
            &activity(1, Measurement::Instances),
            &Recurring {
                every: 7,
                unit: TimeUnit::Days,
            },
            history,
            &now(),
        )
    }

    #[test]
    fn test_not_started() {
        let status = weekly(&[]);
        assert!(!status.is_on_track);
        assert_eq!(status.current, 0);
        assert_eq!(status.context, "Not started yet");
        assert_eq!(status.days_overdue, Some(0));
        assert_eq!(status.days_until_due, None);
    }

    #[test]
    fn test_counts_calendar_days_not_hours() {
        // Less than 48 hours, but two midnights ago.
        let status = weekly(&[completion(
            1,
            Utc.with_ymd_and_hms(2024, 4, 8, 20, 0, 0).unwrap(),
        )]);
        assert!(status.is_on_track);
        assert_eq!(status.current, 1);
        assert_eq!(status.context, "2 days ago");
        assert_eq!(status.days_until_due, Some(5));
        assert_eq!(status.days_overdue, None);
    }

    #[test]
    fn test_overdue() {
        let status = weekly(&[completion(1, now() - Duration::days(10))]);
        assert!(!status.is_on_track);
        assert_eq!(status.current, 0);
        assert_eq!(status.context, "3 days overdue");
        assert_eq!(status.days_overdue, Some(3));
    }

    #[test]
    fn test_singular_overdue() {
        let status = weekly(&[completion(1, now() - Duration::days(8))]);
        assert_eq!(status.context, "1 day overdue");
    }

    #[test]
    fn test_exact_interval_is_on_track() {
        let status = weekly(&[completion(1, now() - Duration::days(7))]);
        assert!(status.is_on_track);
        assert_eq!(status.context, "7 days ago");
        assert_eq!(status.days_until_due, Some(0));
    }

    #[test]
    fn test_today() {
        let status = weekly(&[completion(1, now() - Duration::hours(8))]);
        assert!(status.is_on_track);
        assert_eq!(status.context, "today");
        assert_eq!(status.days_until_due, Some(7));
    }

    #[test]
    fn test_uses_most_recent_event_in_unsorted_history() {
        let status = weekly(&[
            completion(1, now() - Duration::days(20)),
            completion(2, now() - Duration::days(1)),
            completion(3, now() - Duration::days(12)),
        ]);
        assert_eq!(status.context, "1 day ago");
        assert_eq!(status.days_until_due, Some(6));
    }

    #[test]
    fn test_months_are_thirty_days() {
        let activity = activity(2, Measurement::Instances);
        let rhythm = Recurring {
            every: 1,
            unit: TimeUnit::Months,
        };
        let on_time = evaluate(
            &activity,
            &rhythm,
            &[completion(1, now() - Duration::days(30))],
            &now(),
        );
        assert!(on_time.is_on_track);
        assert_eq!(on_time.current, 2);

        let late = evaluate(
            &activity,
            &rhythm,
            &[completion(1, now() - Duration::days(31))],
            &now(),
        );
        assert_eq!(late.context, "1 day overdue");
    }
}
