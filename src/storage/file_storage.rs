use std::{
    io::{ErrorKind, SeekFrom},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Utc};
use fs4::tokio::AsyncFileExt;
use serde::{de::DeserializeOwned, Serialize};
use tokio::{
    fs::File,
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};
use tracing::{debug, info, warn};

use crate::model::{
    activity::{Activity, NewActivity},
    history::{HistoryEvent, NewEvent},
    rhythm::RhythmRecord,
};

use super::Storage;

const ACTIVITIES_FILE: &str = "activities";
const RHYTHMS_FILE: &str = "rhythms";
const HISTORY_FILE: &str = "history";
/// Sibling file `<name>.last_id` remembers the highest id issued for `<name>`, so ids of deleted
/// records are never handed out again.
const LAST_ID_SUFFIX: &str = ".last_id";

/// Anything stored as a single line of a storage file.
trait Record: Serialize + DeserializeOwned {
    fn id(&self) -> u64;
}

impl Record for Activity {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for RhythmRecord {
    fn id(&self) -> u64 {
        self.id
    }
}

impl Record for HistoryEvent {
    fn id(&self) -> u64 {
        self.id
    }
}

/// The main realization of [Storage].
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    async fn read_all<T: Record>(&self, name: &str) -> Result<Vec<T>> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            debug!("Extracting {path:?}");
            let mut file = File::open(path).await?;
            file.lock_shared()?;
            let mut content = String::new();
            let read = file.read_to_string(&mut content).await;
            file.unlock_async().await?;
            read?;
            Ok(content)
        }

        let path = self.dir.join(name);
        match extract(&path).await {
            Ok(content) => Ok(parse_records(&path, &content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(vec![]),
            Err(e) => Err(e)?,
        }
    }

    /// Appends a record built from the next free id of file `name`.
    async fn append<T: Record>(&self, name: &str, create: impl FnOnce(u64) -> T) -> Result<T> {
        let path = self.dir.join(name);
        let mut file = File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(&path)
            .await?;

        // Id allocation and the write happen under the same lock.
        file.lock_exclusive()?;
        let result = self.append_with_file(&mut file, name, create).await;
        file.unlock_async().await?;
        result
    }

    async fn append_with_file<T: Record>(
        &self,
        file: &mut File,
        name: &str,
        create: impl FnOnce(u64) -> T,
    ) -> Result<T> {
        let path = self.dir.join(name);
        let mut content = String::new();
        file.read_to_string(&mut content).await?;

        let last_stored = parse_records::<T>(&path, &content)
            .iter()
            .map(Record::id)
            .max()
            .unwrap_or(0);
        let next_id = last_stored.max(self.last_issued_id(name).await?) + 1;
        let record = create(next_id);

        let mut buffer = Vec::<u8>::new();
        // Might happen due to shutdown cutting of the previous write.
        if !content.is_empty() && !content.ends_with('\n') {
            buffer.push(b'\n');
        }
        serde_json::to_writer(&mut buffer, &record)?;
        buffer.push(b'\n');

        file.seek(SeekFrom::End(0)).await?;
        file.write_all(&buffer).await?;
        file.flush().await?;

        tokio::fs::write(self.last_id_path(name), next_id.to_string()).await?;
        Ok(record)
    }

    fn last_id_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}{LAST_ID_SUFFIX}"))
    }

    /// Highest id ever handed out for file `name`, deleted records included. Only read while
    /// holding the lock of `name` itself.
    async fn last_issued_id(&self, name: &str) -> Result<u64> {
        let path = self.last_id_path(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(content.trim().parse().unwrap_or_else(|e| {
                warn!("Illegal id mark in {path:?}: {e}");
                0
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    /// Rewrites file `name` without the records matching `predicate` and returns them.
    async fn remove_where<T: Record>(
        &self,
        name: &str,
        predicate: impl Fn(&T) -> bool,
    ) -> Result<Vec<T>> {
        let path = self.dir.join(name);
        let mut file = match File::options().read(true).write(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        file.lock_exclusive()?;
        let result = Self::remove_with_file(&mut file, &path, predicate).await;
        file.unlock_async().await?;
        result
    }

    async fn remove_with_file<T: Record>(
        file: &mut File,
        path: &Path,
        predicate: impl Fn(&T) -> bool,
    ) -> Result<Vec<T>> {
        let mut content = String::new();
        file.read_to_string(&mut content).await?;

        let (removed, kept): (Vec<T>, Vec<T>) = parse_records::<T>(path, &content)
            .into_iter()
            .partition(|record| predicate(record));
        if removed.is_empty() {
            return Ok(removed);
        }

        let mut buffer = Vec::<u8>::new();
        for record in &kept {
            serde_json::to_writer(&mut buffer, record)?;
            buffer.push(b'\n');
        }

        file.set_len(0).await?;
        file.rewind().await?;
        file.write_all(&buffer).await?;
        file.flush().await?;
        Ok(removed)
    }
}

/// Parses every line of `content`. Illegal lines are skipped, they might be left after a crash
/// in the middle of a write.
fn parse_records<T: Record>(path: &Path, content: &str) -> Vec<T> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<T>(line) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("During parsing in path {path:?} found illegal json string {line}: {e}");
                None
            }
        })
        .collect()
}

impl Storage for FileStorage {
    async fn activities(&self) -> Result<Vec<Activity>> {
        let mut activities = self.read_all::<Activity>(ACTIVITIES_FILE).await?;
        activities.sort_by_key(|activity| activity.id);
        Ok(activities)
    }

    async fn activity(&self, id: u64) -> Result<Option<Activity>> {
        Ok(self
            .read_all::<Activity>(ACTIVITIES_FILE)
            .await?
            .into_iter()
            .find(|activity| activity.id == id))
    }

    async fn rhythm(&self, id: u64) -> Result<Option<RhythmRecord>> {
        Ok(self
            .read_all::<RhythmRecord>(RHYTHMS_FILE)
            .await?
            .into_iter()
            .find(|rhythm| rhythm.id == id))
    }

    async fn history_for(&self, activity_id: u64) -> Result<Vec<HistoryEvent>> {
        let mut history = self.read_all::<HistoryEvent>(HISTORY_FILE).await?;
        history.retain(|event| event.activity_id == activity_id);
        Ok(history)
    }

    async fn insert_activity(
        &self,
        activity: NewActivity,
        created_at: DateTime<Utc>,
    ) -> Result<Activity> {
        let rhythm = self
            .append(RHYTHMS_FILE, |id| RhythmRecord {
                id,
                rhythm: activity.rhythm,
            })
            .await?;

        let NewActivity {
            name,
            framing,
            target,
            measurement,
            ..
        } = activity;
        let activity = self
            .append(ACTIVITIES_FILE, |id| Activity {
                id,
                name,
                framing,
                rhythm_id: rhythm.id,
                target,
                measurement,
                created_at,
            })
            .await?;

        info!("Stored activity {} with rhythm {}", activity.id, rhythm.id);
        Ok(activity)
    }

    async fn append_event(&self, event: NewEvent) -> Result<HistoryEvent> {
        let event = self
            .append(HISTORY_FILE, move |id| event.with_id(id))
            .await?;
        info!("Stored event {} for activity {}", event.id, event.activity_id);
        Ok(event)
    }

    async fn delete_event(&self, id: u64) -> Result<Option<HistoryEvent>> {
        let removed = self
            .remove_where(HISTORY_FILE, |event: &HistoryEvent| event.id == id)
            .await?;
        Ok(removed.into_iter().next())
    }

    async fn delete_activity(&self, id: u64) -> Result<Option<Activity>> {
        let Some(activity) = self.activity(id).await? else {
            return Ok(None);
        };

        // History goes first, so a failure halfway leaves an activity without events rather
        // than events without an activity.
        let history = self
            .remove_where(HISTORY_FILE, |event: &HistoryEvent| event.activity_id == id)
            .await?;
        let removed = self
            .remove_where(ACTIVITIES_FILE, |activity: &Activity| activity.id == id)
            .await?;
        self.remove_where(RHYTHMS_FILE, |rhythm: &RhythmRecord| {
            rhythm.id == activity.rhythm_id
        })
        .await?;

        info!(
            "Deleted activity {id} together with {} events",
            history.len()
        );
        Ok(removed.into_iter().next())
    }
}
