use std::fmt::Display;

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};

use super::Args;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct WhenArgs {
    #[arg(
        long = "at",
        help = "When it happened. Examples are \"yesterday\", \"2 hours ago\", \"15/03/2025\", \"18:30 16/03/2025\". Defaults to now"
    )]
    pub at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    pub date_style: DateStyle,
}

impl WhenArgs {
    pub fn resolve(&self, now: DateTime<Local>) -> Result<Option<DateTime<Utc>>> {
        self.at
            .as_deref()
            .map(|at| parse_moment(at, self.date_style, now))
            .transpose()
    }
}

/// Parses human written dates relative to `now`, reporting failures as clap validation errors.
pub fn parse_moment(
    value: &str,
    date_style: DateStyle,
    now: DateTime<Local>,
) -> Result<DateTime<Utc>> {
    match parse_date_string(value, now, date_style.into()) {
        Ok(v) => Ok(v.to_utc()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date \"{value}\": {e}"),
            )
            .into()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, TimeZone};

    use super::{parse_moment, DateStyle, WhenArgs};

    #[test]
    fn test_relative_dates() {
        let now = Local.with_ymd_and_hms(2024, 4, 10, 12, 0, 0).unwrap();
        let parsed = parse_moment("2 hours ago", DateStyle::Uk, now).unwrap();
        assert_eq!(parsed, (now - Duration::hours(2)).to_utc());
    }

    #[test]
    fn test_missing_moment_is_none() {
        let args = WhenArgs {
            at: None,
            date_style: DateStyle::Uk,
        };
        assert_eq!(args.resolve(Local::now()).unwrap(), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_moment("whenever really", DateStyle::Us, Local::now()).is_err());
    }
}
