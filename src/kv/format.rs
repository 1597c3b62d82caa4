//! Binary layout of tracks in the fjall keyspace.
//!
//! Keys sort in the same order [`TrackStore::fetch_tracks`] returns tracks:
//!
//! ```text
//! user(u64 BE) | activity(u64 BE) | sco flag(u8) | sco(u64 BE) | attempt(u32 BE) | element(utf8)
//! ```
//!
//! Values are `timestamp(u64 LE) | value(utf8)`.
//!
//! [`TrackStore::fetch_tracks`]: crate::track::TrackStore::fetch_tracks

use crate::track::{ActivityId, ScoId, StoreError, TrackKey, UserId};

/// Length of the fixed key header before the element path.
pub(super) const KEY_HEADER_LEN: usize = 8 + 8 + 1 + 8 + 4;

pub(super) fn activity_prefix(user: UserId, activity: ActivityId) -> Vec<u8> {
    let mut key = Vec::with_capacity(KEY_HEADER_LEN);
    key.extend_from_slice(&user.0.to_be_bytes());
    key.extend_from_slice(&activity.0.to_be_bytes());
    key
}

pub(super) fn sco_prefix(user: UserId, activity: ActivityId, sco: Option<ScoId>) -> Vec<u8> {
    let mut key = activity_prefix(user, activity);
    match sco {
        Some(sco) => {
            key.push(1);
            key.extend_from_slice(&sco.0.to_be_bytes());
        }
        None => {
            key.push(0);
            key.extend_from_slice(&0u64.to_be_bytes());
        }
    }
    key
}

pub(super) fn attempt_prefix(
    user: UserId,
    activity: ActivityId,
    sco: Option<ScoId>,
    attempt: u32,
) -> Vec<u8> {
    let mut key = sco_prefix(user, activity, sco);
    key.extend_from_slice(&attempt.to_be_bytes());
    key
}

pub(super) fn encode_key(key: &TrackKey) -> Vec<u8> {
    let mut bytes = attempt_prefix(key.user, key.activity, key.sco, key.attempt);
    bytes.extend_from_slice(key.element.as_bytes());
    bytes
}

pub(super) fn decode_key(bytes: &[u8]) -> Result<TrackKey, StoreError> {
    let truncated = || StoreError::InvalidFormat(format!("track key too short ({} bytes)", bytes.len()));

    let (user, rest) = bytes.split_first_chunk::<8>().ok_or_else(truncated)?;
    let (activity, rest) = rest.split_first_chunk::<8>().ok_or_else(truncated)?;
    let (flag, rest) = rest.split_first().ok_or_else(truncated)?;
    let (sco, rest) = rest.split_first_chunk::<8>().ok_or_else(truncated)?;
    let (attempt, element) = rest.split_first_chunk::<4>().ok_or_else(truncated)?;

    let sco = match flag {
        0 => None,
        1 => Some(ScoId(u64::from_be_bytes(*sco))),
        other => {
            return Err(StoreError::InvalidFormat(format!(
                "invalid sub-unit flag {other}"
            )));
        }
    };
    let element = std::str::from_utf8(element)
        .map_err(|e| StoreError::InvalidFormat(format!("element path is not UTF-8: {e}")))?;

    Ok(TrackKey {
        user: UserId(u64::from_be_bytes(*user)),
        activity: ActivityId(u64::from_be_bytes(*activity)),
        sco,
        attempt: u32::from_be_bytes(*attempt),
        element: element.to_string(),
    })
}

pub(super) fn encode_value(value: &str, timestamp: u64) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(8 + value.len());
    bytes.extend_from_slice(&timestamp.to_le_bytes());
    bytes.extend_from_slice(value.as_bytes());
    bytes
}

pub(super) fn decode_value(bytes: &[u8]) -> Result<(String, u64), StoreError> {
    let (timestamp, value) = bytes.split_first_chunk::<8>().ok_or_else(|| {
        StoreError::InvalidFormat(format!("track value too short ({} bytes)", bytes.len()))
    })?;
    let value = std::str::from_utf8(value)
        .map_err(|e| StoreError::InvalidFormat(format!("track value is not UTF-8: {e}")))?;
    Ok((value.to_string(), u64::from_le_bytes(*timestamp)))
}
