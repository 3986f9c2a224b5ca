use anyhow::Result;
use chrono::{DateTime, Local};
use clap::Parser;
use now::DateTimeNow;
use serde::Serialize;

use crate::{
    model::{activity::Measurement, history::HistoryEvent},
    progress::{days_phrase, ProgressStatus},
    storage::Storage,
    tracker::{activity_history, activity_status, all_statuses, ActivityReport},
    utils::{clock::Clock, percentage::progress_percentage},
};

use super::{
    format_minutes,
    record::describe_event,
    when::{parse_moment, DateStyle},
};

#[derive(Debug, Parser)]
pub struct StatusCommand {
    #[arg(help = "Show only this activity")]
    activity_id: Option<u64>,
    #[arg(long, help = "Print statuses as json")]
    json: bool,
}

#[derive(Debug, Parser)]
pub struct HistoryCommand {
    #[arg(help = "Id of the activity")]
    activity_id: u64,
    #[arg(
        long,
        help = "Only show events since then. Examples are \"last week\", \"3 days ago\", \"15/03/2025\""
    )]
    since: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(
        long = "days",
        default_value_t = false,
        help = "Take --since as a whole day. For example \"3 days ago\" starts at midnight of that day"
    )]
    treat_as_days: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    id: u64,
    name: &'a str,
    #[serde(flatten)]
    status: &'a ProgressStatus,
}

pub async fn process_status_command(
    storage: &impl Storage,
    clock: &dyn Clock,
    command: StatusCommand,
) -> Result<()> {
    for line in status_output(storage, clock, command).await? {
        println!("{line}");
    }
    Ok(())
}

async fn status_output(
    storage: &impl Storage,
    clock: &dyn Clock,
    StatusCommand { activity_id, json }: StatusCommand,
) -> Result<Vec<String>> {
    let now = clock.time().with_timezone(&Local);
    let reports = match activity_id {
        Some(id) => vec![activity_status(storage, id, &now).await?],
        None => all_statuses(storage, &now).await?,
    };

    if json {
        let values = reports
            .iter()
            .map(|report| JsonReport {
                id: report.activity.id,
                name: &report.activity.name[..],
                status: &report.status,
            })
            .collect::<Vec<_>>();
        return Ok(vec![serde_json::to_string_pretty(&values)?]);
    }

    Ok(reports.iter().map(format_report).collect())
}

/// One tab separated line per activity: id, name, progress, state, context and the deadline.
pub fn format_report(
    ActivityReport {
        activity, status, ..
    }: &ActivityReport,
) -> String {
    let progress = match activity.measurement {
        Measurement::Instances => format!("{}/{}", status.current, status.target),
        Measurement::Duration => format!(
            "{}/{}",
            format_minutes(status.current.try_into().unwrap_or(u32::MAX)),
            format_minutes(status.target.try_into().unwrap_or(u32::MAX))
        ),
    };
    let state = if status.is_on_track {
        "on track"
    } else {
        "behind"
    };

    let mut line = format!(
        "{}\t{}\t{}\t{}\t{}\t{}",
        activity.id,
        activity.name,
        progress,
        progress_percentage(status.current, status.target),
        state,
        status.context
    );
    if let Some(deadline) = deadline(status) {
        line.push('\t');
        line.push_str(&deadline);
    }
    line
}

fn deadline(status: &ProgressStatus) -> Option<String> {
    if let Some(days) = status.days_until_due {
        return Some(match days {
            0 => "due today".into(),
            days => format!("due in {}", days_phrase(days)),
        });
    }
    status
        .days_remaining
        .map(|days| format!("{} left", days_phrase(days)))
}

pub async fn process_history_command(
    storage: &impl Storage,
    clock: &dyn Clock,
    HistoryCommand {
        activity_id,
        since,
        date_style,
        treat_as_days,
    }: HistoryCommand,
) -> Result<()> {
    let now = clock.time().with_timezone(&Local);
    let since = match since {
        Some(since) => {
            let since = parse_moment(&since, date_style, now)?.with_timezone(&Local);
            Some(if treat_as_days {
                since.beginning_of_day()
            } else {
                since
            })
        }
        None => None,
    };

    let history = activity_history(storage, activity_id).await?;
    for event in filter_since(history, since) {
        println!(
            "{}\t{}\t{}",
            event.id,
            event.timestamp.with_timezone(&Local).format("%x %H:%M"),
            describe_event(&event)
        );
    }
    Ok(())
}

fn filter_since(
    history: Vec<HistoryEvent>,
    since: Option<DateTime<Local>>,
) -> impl Iterator<Item = HistoryEvent> {
    history
        .into_iter()
        .filter(move |event| since.map_or(true, |since| event.timestamp >= since.to_utc()))
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, TimeZone, Utc};
    use clap::Parser;
    use tempfile::tempdir;

    use crate::{
        model::{
            activity::{Framing, Measurement, NewActivity},
            rhythm::{Calendar, CalendarPeriod, Recurring, Rhythm, RhythmRecord, TimeUnit},
        },
        progress::{evaluate, test_utils::activity, test_utils::duration},
        storage::file_storage::FileStorage,
        tracker::{create_activity, record_completion, ActivityReport},
        utils::clock::MockClock,
    };

    use super::{format_report, status_output, StatusCommand};

    fn report(measurement: Measurement, target: u32, rhythm: Rhythm) -> ActivityReport {
        let now = Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap();
        let activity = activity(target, measurement);
        let history = [
            duration(1, 60, Utc.with_ymd_and_hms(2024, 4, 9, 12, 0, 0).unwrap()),
            duration(2, 15, Utc.with_ymd_and_hms(2024, 4, 10, 8, 0, 0).unwrap()),
        ];
        let status = evaluate(&activity, &rhythm, &history, &now);
        ActivityReport {
            activity,
            rhythm: RhythmRecord { id: 1, rhythm },
            status,
        }
    }

    #[test]
    fn test_calendar_line() {
        let report = report(
            Measurement::Duration,
            150,
            Rhythm::Calendar(Calendar {
                period: CalendarPeriod::Weekly,
            }),
        );
        assert_eq!(
            format_report(&report),
            "1\ttest activity\t1h15m/2h30m\t50%\tbehind\tthis week\t5 days left"
        );
    }

    #[test]
    fn test_recurring_line() {
        let report = report(
            Measurement::Instances,
            1,
            Rhythm::Recurring(Recurring {
                every: 1,
                unit: TimeUnit::Days,
            }),
        );
        assert_eq!(
            format_report(&report),
            "1\ttest activity\t1/1\t100%\ton track\ttoday\tdue in 1 day"
        );
    }

    #[tokio::test]
    async fn test_status_uses_clock() -> Result<()> {
        fn pinned() -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
        }
        let mut clock = MockClock::new();
        clock.expect_time().returning(pinned);

        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().to_owned())?;
        let laundry = NewActivity {
            name: "laundry".into(),
            framing: Framing::Task,
            rhythm: Rhythm::Recurring(Recurring {
                every: 7,
                unit: TimeUnit::Days,
            }),
            target: 1,
            measurement: Measurement::Instances,
        };
        let activity = create_activity(&storage, &clock, laundry).await?;
        record_completion(&storage, &clock, activity.id, None).await?;

        let command = StatusCommand::try_parse_from(["status"])?;
        let lines = status_output(&storage, &clock, command).await?;
        assert_eq!(
            lines,
            vec!["1\tlaundry\t1/1\t100%\ton track\ttoday\tdue in 7 days".to_string()]
        );

        let json = status_output(
            &storage,
            &clock,
            StatusCommand::try_parse_from(["status", "1", "--json"])?,
        )
        .await?;
        let value: serde_json::Value = serde_json::from_str(&json[0])?;
        assert_eq!(value[0]["name"], "laundry");
        assert_eq!(value[0]["isOnTrack"], true);
        assert_eq!(value[0]["daysUntilDue"], 7);
        Ok(())
    }
}
