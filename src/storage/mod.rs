//! Storage is organized through [file_storage::FileStorage].
//! The basic idea is:
//!   - There is a directory with one file per record kind: activities, rhythms and history.
//!   - Every line of a file is a single json record.
//!   - Appends happen under an exclusive lock, reads under a shared one.
//!
//! The store is always passed explicitly into operations, there is no global handle.

pub mod file_storage;

use std::{future::Future, ops::Deref};

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::{
    activity::{Activity, NewActivity},
    history::{HistoryEvent, NewEvent},
    rhythm::RhythmRecord,
};

/// Interface for abstracting storage of activities and their history.
pub trait Storage {
    /// All activities ordered by id.
    fn activities(&self) -> impl Future<Output = Result<Vec<Activity>>>;

    fn activity(&self, id: u64) -> impl Future<Output = Result<Option<Activity>>>;

    fn rhythm(&self, id: u64) -> impl Future<Output = Result<Option<RhythmRecord>>>;

    /// History of a single activity in the order it was recorded.
    fn history_for(&self, activity_id: u64) -> impl Future<Output = Result<Vec<HistoryEvent>>>;

    /// Stores the rhythm and the activity referencing it. Ids are assigned by the storage.
    fn insert_activity(
        &self,
        activity: NewActivity,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Activity>>;

    fn append_event(&self, event: NewEvent) -> impl Future<Output = Result<HistoryEvent>>;

    /// Returns the deleted event, or [None] if there was no such event.
    fn delete_event(&self, id: u64) -> impl Future<Output = Result<Option<HistoryEvent>>>;

    /// Deletes the activity together with its rhythm and its whole history.
    fn delete_activity(&self, id: u64) -> impl Future<Output = Result<Option<Activity>>>;
}

impl<T: Deref> Storage for T
where
    T::Target: Storage,
{
    fn activities(&self) -> impl Future<Output = Result<Vec<Activity>>> {
        self.deref().activities()
    }

    fn activity(&self, id: u64) -> impl Future<Output = Result<Option<Activity>>> {
        self.deref().activity(id)
    }

    fn rhythm(&self, id: u64) -> impl Future<Output = Result<Option<RhythmRecord>>> {
        self.deref().rhythm(id)
    }

    fn history_for(&self, activity_id: u64) -> impl Future<Output = Result<Vec<HistoryEvent>>> {
        self.deref().history_for(activity_id)
    }

    fn insert_activity(
        &self,
        activity: NewActivity,
        created_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Activity>> {
        self.deref().insert_activity(activity, created_at)
    }

    fn append_event(&self, event: NewEvent) -> impl Future<Output = Result<HistoryEvent>> {
        self.deref().append_event(event)
    }

    fn delete_event(&self, id: u64) -> impl Future<Output = Result<Option<HistoryEvent>>> {
        self.deref().delete_event(id)
    }

    fn delete_activity(&self, id: u64) -> impl Future<Output = Result<Option<Activity>>> {
        self.deref().delete_activity(id)
    }
}
