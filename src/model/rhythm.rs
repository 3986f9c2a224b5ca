use std::fmt::Display;

use chrono::Duration;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::{error::TrackerError, utils::time::DAY_MS};

/// Length unit of trailing windows and recurring intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Days,
    Weeks,
    Months,
}

impl TimeUnit {
    /// Converts `n` units into days. A month is always 30 days, calendar month length is
    /// deliberately ignored.
    pub fn days(self, n: u32) -> i64 {
        let n = i64::from(n);
        match self {
            TimeUnit::Days => n,
            TimeUnit::Weeks => n * 7,
            TimeUnit::Months => n * 30,
        }
    }

    /// `n` units as a duration. `None` when it doesn't fit into [Duration].
    pub fn as_duration(self, n: u32) -> Option<Duration> {
        self.days(n)
            .checked_mul(DAY_MS)
            .and_then(Duration::try_milliseconds)
    }
}

impl Display for TimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeUnit::Days => write!(f, "days"),
            TimeUnit::Weeks => write!(f, "weeks"),
            TimeUnit::Months => write!(f, "months"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CalendarPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl CalendarPeriod {
    /// Name of a single period, "weekly" -> "week".
    pub fn noun(self) -> &'static str {
        match self {
            CalendarPeriod::Daily => "day",
            CalendarPeriod::Weekly => "week",
            CalendarPeriod::Monthly => "month",
            CalendarPeriod::Yearly => "year",
        }
    }
}

impl Display for CalendarPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CalendarPeriod::Daily => write!(f, "daily"),
            CalendarPeriod::Weekly => write!(f, "weekly"),
            CalendarPeriod::Monthly => write!(f, "monthly"),
            CalendarPeriod::Yearly => write!(f, "yearly"),
        }
    }
}

/// Rolling window of `count * unit` measured back from the evaluation time. The amount to reach
/// inside it is the activity's target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trailing {
    pub count: u32,
    pub unit: TimeUnit,
}

/// Due again `every * unit` after the most recent event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recurring {
    pub every: u32,
    pub unit: TimeUnit,
}

/// Fixed calendar period containing the evaluation time. Weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub period: CalendarPeriod,
}

/// Temporal rule deciding when an activity is due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Rhythm {
    Trailing(Trailing),
    Recurring(Recurring),
    Calendar(Calendar),
}

impl Rhythm {
    pub fn validate(&self) -> Result<(), TrackerError> {
        match self {
            Rhythm::Trailing(Trailing { count: 0, .. }) => Err(TrackerError::InvariantViolation(
                "trailing window count must be at least 1".into(),
            )),
            Rhythm::Recurring(Recurring { every: 0, .. }) => Err(
                TrackerError::InvariantViolation("recurring interval must be at least 1".into()),
            ),
            Rhythm::Trailing(_) | Rhythm::Recurring(_) | Rhythm::Calendar(_) => Ok(()),
        }
    }
}

impl Display for Rhythm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rhythm::Trailing(Trailing { count, unit }) => write!(f, "last {count} {unit}"),
            Rhythm::Recurring(Recurring { every, unit }) => write!(f, "every {every} {unit}"),
            Rhythm::Calendar(Calendar { period }) => write!(f, "{period}"),
        }
    }
}

/// A stored rhythm. Activities reference it through [RhythmRecord::id].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RhythmRecord {
    pub id: u64,
    #[serde(flatten)]
    pub rhythm: Rhythm,
}

#[cfg(test)]
mod tests {
    use super::{Calendar, CalendarPeriod, Recurring, Rhythm, RhythmRecord, TimeUnit, Trailing};

    #[test]
    fn test_unit_days_uses_flat_months() {
        assert_eq!(TimeUnit::Days.days(3), 3);
        assert_eq!(TimeUnit::Weeks.days(2), 14);
        assert_eq!(TimeUnit::Months.days(2), 60);
        assert_eq!(TimeUnit::Months.as_duration(1).unwrap().num_days(), 30);
    }

    #[test]
    fn test_huge_duration_does_not_fit() {
        assert_eq!(TimeUnit::Months.days(u32::MAX), i64::from(u32::MAX) * 30);
        assert!(TimeUnit::Months.as_duration(u32::MAX).is_none());
        assert!(TimeUnit::Days.as_duration(100_000_000).is_some());
    }

    #[test]
    fn test_display() {
        let trailing = Rhythm::Trailing(Trailing {
            count: 7,
            unit: TimeUnit::Days,
        });
        let recurring = Rhythm::Recurring(Recurring {
            every: 2,
            unit: TimeUnit::Weeks,
        });
        let calendar = Rhythm::Calendar(Calendar {
            period: CalendarPeriod::Monthly,
        });
        assert_eq!(trailing.to_string(), "last 7 days");
        assert_eq!(recurring.to_string(), "every 2 weeks");
        assert_eq!(calendar.to_string(), "monthly");
    }

    #[test]
    fn test_validate_rejects_zero_lengths() {
        assert!(Rhythm::Trailing(Trailing {
            count: 0,
            unit: TimeUnit::Days
        })
        .validate()
        .is_err());
        assert!(Rhythm::Recurring(Recurring {
            every: 0,
            unit: TimeUnit::Weeks
        })
        .validate()
        .is_err());
        assert!(Rhythm::Calendar(Calendar {
            period: CalendarPeriod::Daily
        })
        .validate()
        .is_ok());
    }

    #[test]
    fn test_record_keeps_only_variant_fields() {
        let record = RhythmRecord {
            id: 4,
            rhythm: Rhythm::Recurring(Recurring {
                every: 2,
                unit: TimeUnit::Weeks,
            }),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 4, "kind": "recurring", "every": 2, "unit": "weeks"})
        );
        let parsed: RhythmRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, record);
    }
}
