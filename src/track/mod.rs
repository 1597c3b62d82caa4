//! Tracked learner interactions.
//!
//! A [`Track`] is one `(element, value)` fact recorded for a user, activity,
//! sub-unit and attempt. Stores implement [`TrackStore`] with last-write-wins
//! upserts per [`TrackKey`].

mod error;
mod store;
mod summary;
mod types;

pub use error::StoreError;
pub use store::{MemoryTrackStore, TrackStore};
pub use summary::{ScoSummary, affects_grade};
pub use types::{ActivityId, ScoId, Track, TrackKey, TrackQuery, UpsertOutcome, UserId};
