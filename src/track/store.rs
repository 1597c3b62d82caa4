//! Track store collaborator and its in-memory implementation.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock};

use crate::logging::{debug, trace};

use super::error::StoreError;
use super::types::{ActivityId, Track, TrackKey, TrackQuery, UpsertOutcome, UserId};

/// Read/write access to recorded tracks.
///
/// Implementations must give upserts last-write-wins semantics per
/// [`TrackKey`] and must serialize concurrent upserts of the same key.
pub trait TrackStore: Send + Sync {
    /// Tracks matching `query`, ordered by sub-unit, attempt, then element.
    fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>, StoreError>;

    /// Insert `track`, or replace value and timestamp of the track with the
    /// same key.
    ///
    /// The returned [`UpsertOutcome`] is advisory. Stores that check for an
    /// existing key before writing may report `Inserted` to two concurrent
    /// writers of the same key; the stored track is still the last write.
    fn upsert_track(&self, track: Track) -> Result<UpsertOutcome, StoreError>;

    /// Highest attempt number with any track, 0 when there are none.
    fn last_attempt_number(&self, user: UserId, activity: ActivityId) -> Result<u32, StoreError> {
        Ok(self.attempts(user, activity)?.last().copied().unwrap_or(0))
    }

    /// Distinct attempt numbers with at least one track, ascending.
    fn attempts(&self, user: UserId, activity: ActivityId) -> Result<Vec<u32>, StoreError> {
        let tracks = self.fetch_tracks(&TrackQuery::new(user, activity))?;
        let attempts: BTreeSet<u32> = tracks.iter().map(|track| track.attempt).collect();
        Ok(attempts.into_iter().collect())
    }

    /// Delete every track of one attempt. Returns the number removed.
    fn delete_attempt(
        &self,
        user: UserId,
        activity: ActivityId,
        attempt: u32,
    ) -> Result<usize, StoreError>;
}

impl<T: TrackStore + ?Sized> TrackStore for Arc<T> {
    fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>, StoreError> {
        (**self).fetch_tracks(query)
    }

    fn upsert_track(&self, track: Track) -> Result<UpsertOutcome, StoreError> {
        (**self).upsert_track(track)
    }

    fn last_attempt_number(&self, user: UserId, activity: ActivityId) -> Result<u32, StoreError> {
        (**self).last_attempt_number(user, activity)
    }

    fn attempts(&self, user: UserId, activity: ActivityId) -> Result<Vec<u32>, StoreError> {
        (**self).attempts(user, activity)
    }

    fn delete_attempt(
        &self,
        user: UserId,
        activity: ActivityId,
        attempt: u32,
    ) -> Result<usize, StoreError> {
        (**self).delete_attempt(user, activity, attempt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredTrack {
    value: String,
    timestamp: u64,
}

/// Track store held in memory.
///
/// Upserts take a write lock, so duplicate postbacks of the same element
/// resolve last-write-wins.
#[derive(Debug, Default)]
pub struct MemoryTrackStore {
    tracks: RwLock<BTreeMap<TrackKey, StoredTrack>>,
}

impl MemoryTrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored tracks.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    fn read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<TrackKey, StoredTrack>>, StoreError> {
        self.tracks
            .read()
            .map_err(|_| StoreError::Unavailable("track lock poisoned".to_string()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<TrackKey, StoredTrack>>, StoreError> {
        self.tracks
            .write()
            .map_err(|_| StoreError::Unavailable("track lock poisoned".to_string()))
    }
}

impl TrackStore for MemoryTrackStore {
    fn fetch_tracks(&self, query: &TrackQuery) -> Result<Vec<Track>, StoreError> {
        let tracks = self.read()?;
        let mut found: Vec<Track> = tracks
            .iter()
            .filter(|(key, _)| query.matches(key))
            .map(|(key, stored)| {
                Track::from_parts(key.clone(), stored.value.clone(), stored.timestamp)
            })
            .collect();
        found.sort_by(|a, b| (a.sco, a.attempt, &a.element).cmp(&(b.sco, b.attempt, &b.element)));
        trace!(user = %query.user, activity = %query.activity, count = found.len(), "fetched tracks");
        Ok(found)
    }

    fn upsert_track(&self, track: Track) -> Result<UpsertOutcome, StoreError> {
        let key = track.key();
        let stored = StoredTrack {
            value: track.value,
            timestamp: track.timestamp,
        };
        let mut tracks = self.write()?;
        let outcome = match tracks.insert(key, stored) {
            Some(_) => UpsertOutcome::Updated,
            None => UpsertOutcome::Inserted,
        };
        Ok(outcome)
    }

    fn delete_attempt(
        &self,
        user: UserId,
        activity: ActivityId,
        attempt: u32,
    ) -> Result<usize, StoreError> {
        let query = TrackQuery::new(user, activity).attempt(attempt);
        let mut tracks = self.write()?;
        let before = tracks.len();
        tracks.retain(|key, _| !query.matches(key));
        let removed = before - tracks.len();
        debug!(user = %user, activity = %activity, attempt = attempt, removed = removed, "deleted attempt");
        Ok(removed)
    }
}
