use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, TimeZone};
use tracing::debug;

use crate::{
    model::{
        activity::Activity,
        history::HistoryEvent,
        rhythm::{Calendar, CalendarPeriod},
    },
    utils::time::{day_start, days_until},
};

use super::{aggregate::aggregate, ProgressStatus};

/// First and last moment of a calendar period, millisecond precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodBounds<Tz: TimeZone> {
    pub start: DateTime<Tz>,
    pub end: DateTime<Tz>,
}

/// Returns the period of kind `period` that contains `now`, in the timezone of `now`. Weeks go
/// from Monday to Sunday.
pub fn period_bounds<Tz: TimeZone>(period: CalendarPeriod, now: &DateTime<Tz>) -> PeriodBounds<Tz> {
    let today = now.date_naive();
    let (first_day, next_first_day) = match period {
        CalendarPeriod::Daily => (today, today + Days::new(1)),
        CalendarPeriod::Weekly => {
            let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
            (monday, monday + Days::new(7))
        }
        CalendarPeriod::Monthly => {
            let first = today - Days::new(u64::from(today.day0()));
            (first, first + Months::new(1))
        }
        CalendarPeriod::Yearly => {
            let first = today - Days::new(u64::from(today.ordinal0()));
            (first, first + Months::new(12))
        }
    };
    bounds_between(&now.timezone(), first_day, next_first_day)
}

fn bounds_between<Tz: TimeZone>(tz: &Tz, first: NaiveDate, next: NaiveDate) -> PeriodBounds<Tz> {
    PeriodBounds {
        start: day_start(tz, first),
        end: day_start(tz, next) - Duration::milliseconds(1),
    }
}

/// Calendar activities count everything logged since the start of the current period. The end
/// of the period is never checked, `now` can't be past it.
pub fn evaluate<Tz: TimeZone>(
    activity: &Activity,
    rhythm: &Calendar,
    history: &[HistoryEvent],
    now: &DateTime<Tz>,
) -> ProgressStatus {
    let PeriodBounds { start, end } = period_bounds(rhythm.period, now);
    let start = start.to_utc();

    let current = aggregate(
        history.iter().filter(|event| event.timestamp >= start),
        activity.measurement,
    );
    let days_remaining = days_until(&end, now);
    debug!("Period {start} - {end:?}, collected {current}, {days_remaining} days left");

    let target = u64::from(activity.target);
    let label = format!("this {}", rhythm.period.noun());
    ProgressStatus::new(current, target, current >= target, label.clone())
        .with_period_label(label)
        .with_days_remaining(days_remaining)
}
