use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::model::{activity::Activity, history::HistoryEvent, rhythm::Trailing};

use super::{aggregate::aggregate, ProgressStatus};

/// Trailing activities look at a rolling window of `count * unit` ending at `now`. There is no
/// deadline, only a check whether the window holds enough.
pub fn evaluate<Tz: TimeZone>(
    activity: &Activity,
    rhythm: &Trailing,
    history: &[HistoryEvent],
    now: &DateTime<Tz>,
) -> ProgressStatus {
    // A window reaching past the representable range covers the whole history.
    let window_start = rhythm
        .unit
        .as_duration(rhythm.count)
        .and_then(|length| now.to_utc().checked_sub_signed(length))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let current = aggregate(
        history
            .iter()
            .filter(|event| event.timestamp >= window_start),
        activity.measurement,
    );
    debug!("Window starts at {window_start}, collected {current}");

    let target = u64::from(activity.target);
    let label = format!("last {} {}", rhythm.count, rhythm.unit);
    ProgressStatus::new(current, target, current >= target, label.clone()).with_period_label(label)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};

    use crate::{
        model::{
            activity::Measurement,
            rhythm::{TimeUnit, Trailing},
        },
        progress::test_utils::{activity, completion, duration},
    };

    use super::evaluate;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
    }

    const WEEK: Trailing = Trailing {
        count: 7,
        unit: TimeUnit::Days,
    };

    #[test]
    fn test_events_outside_window_are_excluded() {
        let history = [
            completion(1, now() - Duration::days(9)),
            completion(2, now() - Duration::days(1)),
            completion(3, now() - Duration::days(12)),
            completion(4, now() - Duration::days(3)),
            completion(5, now() - Duration::days(6)),
        ];
        let status = evaluate(&activity(3, Measurement::Instances), &WEEK, &history, &now());
        assert_eq!(status.current, 3);
        assert_eq!(status.target, 3);
        assert!(status.is_on_track);
        assert_eq!(status.context, "last 7 days");
        assert_eq!(status.period_label.as_deref(), Some("last 7 days"));
        assert_eq!(status.days_remaining, None);
    }

    #[test]
    fn test_window_start_is_inclusive() {
        let history = [
            completion(1, now() - Duration::days(7)),
            completion(2, now() - Duration::days(7) - Duration::milliseconds(1)),
        ];
        let status = evaluate(&activity(1, Measurement::Instances), &WEEK, &history, &now());
        assert_eq!(status.current, 1);
        assert!(status.is_on_track);
    }

    #[test]
    fn test_duration_below_target() {
        let history = [
            duration(1, 60, now() - Duration::days(1)),
            duration(2, 45, now() - Duration::days(2)),
            duration(3, 30, now() - Duration::hours(2)),
            duration(4, 90, now() - Duration::days(8)),
        ];
        let status = evaluate(&activity(150, Measurement::Duration), &WEEK, &history, &now());
        assert_eq!(status.current, 135);
        assert!(!status.is_on_track);
        assert_eq!(status.context, "last 7 days");
    }

    #[test]
    fn test_label_uses_unit_name() {
        let rhythm = Trailing {
            count: 2,
            unit: TimeUnit::Months,
        };
        let history = [completion(1, now() - Duration::days(59))];
        let status = evaluate(&activity(1, Measurement::Instances), &rhythm, &history, &now());
        assert_eq!(status.context, "last 2 months");
        assert_eq!(status.current, 1);
    }

    #[test]
    fn test_window_beyond_calendar_range_counts_everything() {
        let history = [
            completion(1, Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 0).unwrap()),
            completion(2, now() - Duration::days(1)),
        ];
        for rhythm in [
            Trailing {
                count: 100_000_000,
                unit: TimeUnit::Days,
            },
            Trailing {
                count: u32::MAX,
                unit: TimeUnit::Months,
            },
        ] {
            let status = evaluate(&activity(2, Measurement::Instances), &rhythm, &history, &now());
            assert_eq!(status.current, 2);
            assert!(status.is_on_track);
        }
    }
}
