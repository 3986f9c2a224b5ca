pub mod activity;
pub mod record;
pub mod status;
pub mod when;

use std::path::PathBuf;

use activity::{process_add_command, process_list_command, process_remove_command, AddCommand};
use anyhow::Result;
use clap::{Parser, Subcommand};
use record::{
    process_done_command, process_spent_command, process_undo_command, DoneCommand, SpentCommand,
};
use status::{process_history_command, process_status_command, HistoryCommand, StatusCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    storage::file_storage::FileStorage,
    utils::{
        clock::DefaultClock,
        dir::{create_application_default_path, ensure_dir},
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Habitual", version, long_about = None)]
#[command(about = "Tracks habits and recurring tasks", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, global = true, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Start tracking a new activity")]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "List tracked activities")]
    List {},
    #[command(about = "Stop tracking an activity. Deletes its whole history")]
    Remove {
        #[arg(help = "Id of the activity")]
        activity_id: u64,
    },
    #[command(about = "Log a completion of an activity measured in instances")]
    Done {
        #[command(flatten)]
        command: DoneCommand,
    },
    #[command(about = "Log minutes spent on an activity measured in duration")]
    Spent {
        #[command(flatten)]
        command: SpentCommand,
    },
    #[command(about = "Delete a single logged event")]
    Undo {
        #[arg(help = "Id of the event")]
        event_id: u64,
    },
    #[command(about = "Show whether activities are on track")]
    Status {
        #[command(flatten)]
        command: StatusCommand,
    },
    #[command(about = "Show logged events of an activity")]
    History {
        #[command(flatten)]
        command: HistoryCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = match args.dir {
        Some(dir) => ensure_dir(dir)?,
        None => create_application_default_path()?,
    };

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    let storage = FileStorage::new(app_dir.join("records"))?;
    let clock = DefaultClock;

    match args.commands {
        Commands::Add { command } => process_add_command(&storage, &clock, command).await,
        Commands::List {} => process_list_command(&storage).await,
        Commands::Remove { activity_id } => process_remove_command(&storage, activity_id).await,
        Commands::Done { command } => process_done_command(&storage, &clock, command).await,
        Commands::Spent { command } => process_spent_command(&storage, &clock, command).await,
        Commands::Undo { event_id } => process_undo_command(&storage, event_id).await,
        Commands::Status { command } => process_status_command(&storage, &clock, command).await,
        Commands::History { command } => process_history_command(&storage, &clock, command).await,
    }
}

/// Formats minutes the way they are shown in every listing, e.g. `1h15m` or `45m`.
pub fn format_minutes(minutes: u32) -> String {
    if minutes >= 60 {
        format!("{}h{}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
