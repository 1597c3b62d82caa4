//! Track data model.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Learner identifier.
    UserId
);
id_type!(
    /// Trackable activity (SCORM package) identifier.
    ActivityId
);
id_type!(
    /// Sub-unit (SCO) identifier within an activity.
    ScoId
);

/// Identity of a track. At most one current track exists per key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrackKey {
    pub user: UserId,
    pub activity: ActivityId,
    /// Absent for activity-level elements.
    pub sco: Option<ScoId>,
    /// 1-based attempt number.
    pub attempt: u32,
    /// CMI element path, e.g. `cmi.core.score.raw`.
    pub element: String,
}

/// One recorded fact about a learner's interaction with a sub-unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub user: UserId,
    pub activity: ActivityId,
    pub sco: Option<ScoId>,
    pub attempt: u32,
    pub element: String,
    pub value: String,
    /// Modification time, unix seconds.
    pub timestamp: u64,
}

impl Track {
    /// Build a track for a sub-unit.
    pub fn new(
        user: UserId,
        activity: ActivityId,
        sco: ScoId,
        attempt: u32,
        element: impl Into<String>,
        value: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            user,
            activity,
            sco: Some(sco),
            attempt,
            element: element.into(),
            value: value.into(),
            timestamp,
        }
    }

    /// Build an activity-level track with no sub-unit.
    pub fn activity_level(
        user: UserId,
        activity: ActivityId,
        attempt: u32,
        element: impl Into<String>,
        value: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            user,
            activity,
            sco: None,
            attempt,
            element: element.into(),
            value: value.into(),
            timestamp,
        }
    }

    pub fn key(&self) -> TrackKey {
        TrackKey {
            user: self.user,
            activity: self.activity,
            sco: self.sco,
            attempt: self.attempt,
            element: self.element.clone(),
        }
    }

    pub(crate) fn from_parts(key: TrackKey, value: String, timestamp: u64) -> Self {
        Self {
            user: key.user,
            activity: key.activity,
            sco: key.sco,
            attempt: key.attempt,
            element: key.element,
            value,
            timestamp,
        }
    }
}

/// Filter for [`TrackStore::fetch_tracks`](super::TrackStore::fetch_tracks).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackQuery {
    pub user: UserId,
    pub activity: ActivityId,
    /// Restrict to one sub-unit. `None` returns every sub-unit and
    /// activity-level tracks.
    pub sco: Option<ScoId>,
    /// Restrict to one attempt. `None` returns all attempts.
    pub attempt: Option<u32>,
}

impl TrackQuery {
    /// All tracks of a user in an activity.
    pub fn new(user: UserId, activity: ActivityId) -> Self {
        Self {
            user,
            activity,
            sco: None,
            attempt: None,
        }
    }

    pub fn sco(mut self, sco: ScoId) -> Self {
        self.sco = Some(sco);
        self
    }

    pub fn attempt(mut self, attempt: u32) -> Self {
        self.attempt = Some(attempt);
        self
    }

    /// Whether `key` satisfies this query.
    pub fn matches(&self, key: &TrackKey) -> bool {
        key.user == self.user
            && key.activity == self.activity
            && self.sco.is_none_or(|sco| key.sco == Some(sco))
            && self.attempt.is_none_or(|attempt| key.attempt == attempt)
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}
