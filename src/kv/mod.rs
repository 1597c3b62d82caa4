//! Persistent track storage.
//!
//! [`FjallTrackStore`] keeps tracks in a fjall LSM-tree database, one key per
//! [`TrackKey`](crate::track::TrackKey), laid out so prefix scans serve every
//! [`TrackQuery`](crate::track::TrackQuery).

mod format;
mod store;

pub use store::FjallTrackStore;
