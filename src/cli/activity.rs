use anyhow::Result;
use clap::{ArgGroup, CommandFactory, Parser};

use crate::{
    model::{
        activity::{Framing, Measurement, NewActivity},
        rhythm::{Calendar, CalendarPeriod, Recurring, Rhythm, TimeUnit, Trailing},
    },
    storage::Storage,
    tracker::{create_activity, remove_activity},
    utils::clock::Clock,
};

use super::Args;

#[derive(Debug, Parser)]
#[command(group(ArgGroup::new("rhythm").required(true).args(["trailing", "every", "period"])))]
pub struct AddCommand {
    #[arg(help = "Name of the activity")]
    name: String,
    #[arg(long, default_value_t = Framing::Pursuit, value_enum, help = "Tasks have to be done, pursuits are worth spending time on. Tasks are always measured in instances")]
    framing: Framing,
    #[arg(long, default_value_t = 1, help = "Amount of instances or minutes to reach")]
    target: u32,
    #[arg(long = "measure", default_value_t = Measurement::Instances, value_enum, help = "What counts as progress")]
    measurement: Measurement,
    #[arg(
        long,
        requires = "unit",
        help = "Rolling window length. Combines with unit: --trailing 2 --unit weeks"
    )]
    trailing: Option<u32>,
    #[arg(
        long,
        requires = "unit",
        help = "Due again after this long since the last time. Combines with unit: --every 3 --unit days"
    )]
    every: Option<u32>,
    #[arg(long, value_enum, help = "Unit of --trailing and --every")]
    unit: Option<TimeUnit>,
    #[arg(long, value_enum, help = "Calendar period to reach the target in")]
    period: Option<CalendarPeriod>,
}

impl AddCommand {
    fn rhythm(&self) -> Result<Rhythm> {
        let rhythm = match (self.trailing, self.every, self.unit, self.period) {
            (Some(count), None, Some(unit), None) => Rhythm::Trailing(Trailing { count, unit }),
            (None, Some(every), Some(unit), None) => Rhythm::Recurring(Recurring { every, unit }),
            (None, None, None, Some(period)) => Rhythm::Calendar(Calendar { period }),
            _ => {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ArgumentConflict,
                        "Pick exactly one of --trailing N --unit U, --every N --unit U or --period P",
                    )
                    .into())
            }
        };
        Ok(rhythm)
    }

    fn into_new_activity(self) -> Result<NewActivity> {
        Ok(NewActivity {
            rhythm: self.rhythm()?,
            name: self.name.trim().into(),
            framing: self.framing,
            target: self.target,
            measurement: self.measurement,
        })
    }
}

pub async fn process_add_command(
    storage: &impl Storage,
    clock: &dyn Clock,
    command: AddCommand,
) -> Result<()> {
    let activity = create_activity(storage, clock, command.into_new_activity()?).await?;
    println!("Added {}\t{}", activity.id, activity.name);
    Ok(())
}

pub async fn process_list_command(storage: &impl Storage) -> Result<()> {
    for activity in storage.activities().await? {
        let rhythm = match storage.rhythm(activity.rhythm_id).await? {
            Some(record) => record.rhythm.to_string(),
            None => "?".into(),
        };
        println!(
            "{}\t{}\t{}\t{}\t{} {}",
            activity.id,
            activity.name,
            activity.framing,
            rhythm,
            activity.target,
            activity.measurement
        );
    }
    Ok(())
}

pub async fn process_remove_command(storage: &impl Storage, activity_id: u64) -> Result<()> {
    let activity = remove_activity(storage, activity_id).await?;
    println!("Removed {}\t{}", activity.id, activity.name);
    Ok(())
}
