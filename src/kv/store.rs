//! Track store backed by fjall.

use std::path::Path;

use fjall::{Keyspace, KeyspaceCreateOptions, PersistMode};

use crate::logging::{debug, error, info, trace};
use crate::track::{
    ActivityId, StoreError, Track, TrackQuery, TrackStore, UpsertOutcome, UserId,
};

use super::format::{
    activity_prefix, attempt_prefix, decode_key, decode_value, encode_key, encode_value,
    sco_prefix,
};

const META_CONFIG_KEY: &str = "config";
const TRACKS_KEYSPACE: &str = "tracks";

/// On-disk layout version. Stores with a different version are rejected.
const STORE_VERSION: u32 = 1;

/// A persistent [`TrackStore`] backed by fjall.
///
/// Each track is a single key in the `tracks` keyspace, so an upsert is one
/// atomic insert and concurrent writers of the same key resolve
/// last-write-wins. The [`UpsertOutcome`] comes from a read before that
/// insert and is advisory under concurrent writers. Writes are durably
/// persisted before returning.
///
/// # Example
///
/// ```ignore
/// use scorm_track::{FjallTrackStore, Track, TrackStore};
///
/// let store = FjallTrackStore::init(".scorm-tracks")?;
/// store.upsert_track(Track::new(user, activity, sco, 1, "cmi.core.score.raw", "85", now))?;
///
/// let store = FjallTrackStore::open(".scorm-tracks")?;
/// assert_eq!(store.last_attempt_number(user, activity)?, 1);
/// ```
pub struct FjallTrackStore {
    db: fjall::Database,
    tracks: Keyspace,
}

impl FjallTrackStore {
    /// Open an existing track store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening track store");

        if !path.exists() {
            error!(path = %path.display(), "store path does not exist");
            return Err(StoreError::NotInitialized(path.display().to_string()));
        }

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;

        let Some(config) = meta.get(META_CONFIG_KEY)? else {
            error!(path = %path.display(), "store not initialized - no config found");
            return Err(StoreError::NotInitialized(path.display().to_string()));
        };
        let version = u32::from_le_bytes(
            config
                .as_ref()
                .try_into()
                .map_err(|_| StoreError::InvalidFormat("Invalid config format".to_string()))?,
        );
        if version != STORE_VERSION {
            error!(
                stored_version = version,
                expected_version = STORE_VERSION,
                "store version mismatch"
            );
            return Err(StoreError::InvalidFormat(format!(
                "Store version mismatch: expected {}, got {}",
                STORE_VERSION, version
            )));
        }

        let tracks = db.keyspace(TRACKS_KEYSPACE, KeyspaceCreateOptions::default)?;
        info!(path = %path.display(), "track store opened");
        Ok(Self { db, tracks })
    }

    /// Initialize a new track store at the given path.
    pub fn init(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "initializing track store");

        let db = fjall::Database::builder(path).open()?;
        let meta = db.keyspace("_meta", KeyspaceCreateOptions::default)?;
        let tracks = db.keyspace(TRACKS_KEYSPACE, KeyspaceCreateOptions::default)?;

        meta.insert(META_CONFIG_KEY, STORE_VERSION.to_le_bytes())?;
        db.persist(PersistMode::SyncAll)?;

        info!(path = %path.display(), version = STORE_VERSION, "track store initialized");
        Ok(Self { db, tracks })
    }

    /// Key-value pairs under `prefix`, failing on the first unreadable entry.
    fn entries_with_prefix(&self, prefix: &[u8]) -> Result<Vec<fjall::KvPair>, StoreError> {
        let entries = self
            .tracks
            .prefix(prefix)
            .map(|kv| kv.into_inner())
            .collect::<Result<Vec<_>, fjall::Error>>()?;
        Ok(entries)
    }

    /// Keys under `prefix`, failing on the first unreadable key.
    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<fjall::UserKey>, StoreError> {
        let keys = self
            .tracks
            .prefix(prefix)
            .map(|kv| kv.key())
            .collect::<Result<Vec<_>, fjall::Error>>()?;
        Ok(keys)
    }
}

impl TrackStore for FjallTrackStore {
    fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>, StoreError> {
        let prefix = match (query.sco, query.attempt) {
            (Some(sco), Some(attempt)) => {
                attempt_prefix(query.user, query.activity, Some(sco), attempt)
            }
            (Some(sco), None) => sco_prefix(query.user, query.activity, Some(sco)),
            (None, _) => activity_prefix(query.user, query.activity),
        };

        let mut found = Vec::new();
        for (raw_key, raw_value) in self.entries_with_prefix(&prefix)? {
            let key = decode_key(&raw_key)?;
            if !query.matches(&key) {
                continue;
            }
            let (value, timestamp) = decode_value(&raw_value)?;
            found.push(Track::from_parts(key, value, timestamp));
        }

        trace!(
            user = %query.user,
            activity = %query.activity,
            count = found.len(),
            "fetched tracks"
        );
        Ok(found)
    }

    fn upsert_track(&self, track: Track) -> Result<UpsertOutcome, StoreError> {
        let key = encode_key(&track.key());
        let value = encode_value(&track.value, track.timestamp);

        // Read then insert: the outcome is advisory under concurrent writers.
        let outcome = if self.tracks.get(&key)?.is_some() {
            UpsertOutcome::Updated
        } else {
            UpsertOutcome::Inserted
        };
        self.tracks.insert(key.as_slice(), value.as_slice())?;
        self.db.persist(PersistMode::SyncAll)?;

        trace!(element = %track.element, attempt = track.attempt, "track upserted");
        Ok(outcome)
    }

    fn delete_attempt(
        &self,
        user: UserId,
        activity: ActivityId,
        attempt: u32,
    ) -> Result<usize, StoreError> {
        let mut removed = 0;
        for raw_key in self.keys_with_prefix(&activity_prefix(user, activity))? {
            if decode_key(&raw_key)?.attempt == attempt {
                self.tracks.remove(raw_key)?;
                removed += 1;
            }
        }
        self.db.persist(PersistMode::SyncAll)?;

        info!(user = %user, activity = %activity, attempt = attempt, removed = removed, "attempt deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::ScoId;
    use tempfile::TempDir;

    const USER: UserId = UserId(3);
    const ACTIVITY: ActivityId = ActivityId(4);

    #[test]
    fn test_unreadable_entry_fails_the_scan() {
        let temp = TempDir::new().unwrap();
        let store = FjallTrackStore::init(temp.path()).unwrap();
        store
            .upsert_track(Track::new(USER, ACTIVITY, ScoId(1), 1, "cmi.core.score.raw", "10", 1))
            .unwrap();

        // Under the activity prefix but too short to hold a sub-unit and attempt.
        let mut truncated = activity_prefix(USER, ACTIVITY);
        truncated.push(1);
        store.tracks.insert(truncated.as_slice(), encode_value("x", 1)).unwrap();

        let query = TrackQuery::new(USER, ACTIVITY);
        assert!(matches!(
            store.fetch_tracks(&query),
            Err(StoreError::InvalidFormat(_))
        ));
        assert!(matches!(
            store.delete_attempt(USER, ACTIVITY, 1),
            Err(StoreError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_values_come_from_the_scanned_entries() {
        let temp = TempDir::new().unwrap();
        let store = FjallTrackStore::init(temp.path()).unwrap();
        for (sco, value) in [(1, "10"), (2, "20")] {
            store
                .upsert_track(Track::new(USER, ACTIVITY, ScoId(sco), 1, "cmi.core.score.raw", value, 5))
                .unwrap();
        }

        let tracks = store.fetch_tracks(&TrackQuery::new(USER, ACTIVITY)).unwrap();
        let values: Vec<(Option<ScoId>, &str, u64)> = tracks
            .iter()
            .map(|t| (t.sco, t.value.as_str(), t.timestamp))
            .collect();
        assert_eq!(
            values,
            vec![(Some(ScoId(1)), "10", 5), (Some(ScoId(2)), "20", 5)]
        );
    }
}
