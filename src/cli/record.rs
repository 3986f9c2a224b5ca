use anyhow::Result;
use chrono::Local;
use clap::Parser;

use crate::{
    model::history::{EventKind, HistoryEvent},
    storage::Storage,
    tracker::{delete_event, record_completion, record_duration},
    utils::clock::Clock,
};

use super::{format_minutes, when::WhenArgs};

#[derive(Debug, Parser)]
pub struct DoneCommand {
    #[arg(help = "Id of the activity")]
    activity_id: u64,
    #[command(flatten)]
    when: WhenArgs,
}

#[derive(Debug, Parser)]
pub struct SpentCommand {
    #[arg(help = "Id of the activity")]
    activity_id: u64,
    #[arg(help = "Minutes spent")]
    minutes: u32,
    #[command(flatten)]
    when: WhenArgs,
}

pub async fn process_done_command(
    storage: &impl Storage,
    clock: &dyn Clock,
    DoneCommand { activity_id, when }: DoneCommand,
) -> Result<()> {
    let at = when.resolve(clock.time().with_timezone(&Local))?;
    let event = record_completion(storage, clock, activity_id, at).await?;
    print_event("Logged", &event);
    Ok(())
}

pub async fn process_spent_command(
    storage: &impl Storage,
    clock: &dyn Clock,
    SpentCommand {
        activity_id,
        minutes,
        when,
    }: SpentCommand,
) -> Result<()> {
    let at = when.resolve(clock.time().with_timezone(&Local))?;
    let event = record_duration(storage, clock, activity_id, minutes, at).await?;
    print_event("Logged", &event);
    Ok(())
}

pub async fn process_undo_command(storage: &impl Storage, event_id: u64) -> Result<()> {
    let event = delete_event(storage, event_id).await?;
    print_event("Deleted", &event);
    Ok(())
}

pub fn describe_event(event: &HistoryEvent) -> String {
    match event.kind {
        EventKind::Completion => "done".into(),
        EventKind::Duration { minutes } => format_minutes(minutes),
    }
}

fn print_event(action: &str, event: &HistoryEvent) {
    println!(
        "{action} {}\t{}\t{}",
        event.id,
        event.timestamp.with_timezone(&Local).format("%x %H:%M"),
        describe_event(event)
    );
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use clap::Parser;
    use tempfile::tempdir;

    use crate::{
        model::{
            activity::{Framing, Measurement, NewActivity},
            history::EventKind,
            rhythm::{Calendar, CalendarPeriod, Rhythm},
        },
        storage::{file_storage::FileStorage, Storage},
        tracker::create_activity,
        utils::clock::MockClock,
    };

    use super::{process_done_command, process_spent_command, DoneCommand, SpentCommand};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap()
    }

    fn clock() -> MockClock {
        let mut clock = MockClock::new();
        clock.expect_time().returning(now);
        clock
    }

    fn daily(measurement: Measurement) -> NewActivity {
        NewActivity {
            name: "stretch".into(),
            framing: Framing::Pursuit,
            rhythm: Rhythm::Calendar(Calendar {
                period: CalendarPeriod::Daily,
            }),
            target: 1,
            measurement,
        }
    }

    #[tokio::test]
    async fn test_done_is_relative_to_clock() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().to_owned())?;
        let activity = create_activity(&storage, &clock(), daily(Measurement::Instances)).await?;

        let now_command = DoneCommand::try_parse_from(["done", "1"])?;
        process_done_command(&storage, &clock(), now_command).await?;
        let earlier_command = DoneCommand::try_parse_from(["done", "1", "--at", "2 hours ago"])?;
        process_done_command(&storage, &clock(), earlier_command).await?;

        let timestamps = storage
            .history_for(activity.id)
            .await?
            .into_iter()
            .map(|event| event.timestamp)
            .collect::<Vec<_>>();
        assert_eq!(timestamps, vec![now(), now() - Duration::hours(2)]);
        Ok(())
    }

    #[tokio::test]
    async fn test_spent_stores_minutes() -> Result<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().to_owned())?;
        let activity = create_activity(&storage, &clock(), daily(Measurement::Duration)).await?;

        let command = SpentCommand::try_parse_from(["spent", "1", "45"])?;
        process_spent_command(&storage, &clock(), command).await?;

        let history = storage.history_for(activity.id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, EventKind::Duration { minutes: 45 });
        assert_eq!(history[0].timestamp, now());
        Ok(())
    }
}
