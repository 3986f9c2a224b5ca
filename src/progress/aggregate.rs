use crate::model::{activity::Measurement, history::HistoryEvent};

/// Sums up progress of `events`: their count for instances, their minutes for duration.
/// Completions logged against a duration activity add nothing.
pub fn aggregate<'a>(
    events: impl IntoIterator<Item = &'a HistoryEvent>,
    measurement: Measurement,
) -> u64 {
    match measurement {
        Measurement::Instances => events.into_iter().count() as u64,
        Measurement::Duration => events
            .into_iter()
            .map(|event| u64::from(event.minutes().unwrap_or(0)))
            .sum(),
    }
}
