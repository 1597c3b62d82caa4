//! Integration tests for the fjall-backed track store.

#![cfg(feature = "kv")]

use scorm_track::grading::grade_user;
use scorm_track::prelude::*;
use scorm_track::StoreError;
use tempfile::TempDir;

const USER: UserId = UserId(5);
const ACTIVITY: ActivityId = ActivityId(8);

fn track(sco: Option<u64>, attempt: u32, element: &str, value: &str, ts: u64) -> Track {
    match sco {
        Some(sco) => Track::new(USER, ACTIVITY, ScoId(sco), attempt, element, value, ts),
        None => Track::activity_level(USER, ACTIVITY, attempt, element, value, ts),
    }
}

#[test]
fn open_requires_init() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing");
    assert!(matches!(
        FjallTrackStore::open(&missing),
        Err(StoreError::NotInitialized(_))
    ));
}

#[test]
fn tracks_survive_reopen() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("tracks");
    {
        let store = FjallTrackStore::init(&path)?;
        store.upsert_track(track(Some(1), 1, "cmi.core.score.raw", "40", 10))?;
        store.upsert_track(track(Some(1), 2, "cmi.core.score.raw", "70", 20))?;
    }

    let store = FjallTrackStore::open(&path)?;
    assert_eq!(store.last_attempt_number(USER, ACTIVITY)?, 2);
    assert_eq!(store.attempts(USER, ACTIVITY)?, vec![1, 2]);
    let tracks = store.fetch_tracks(&TrackQuery::new(USER, ACTIVITY).attempt(2))?;
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks.first().map(|t| t.value.as_str()), Some("70"));
    Ok(())
}

#[test]
fn upsert_is_last_write_wins() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = FjallTrackStore::init(temp.path())?;

    assert_eq!(
        store.upsert_track(track(Some(1), 1, "cmi.core.lesson_status", "incomplete", 1))?,
        UpsertOutcome::Inserted
    );
    assert_eq!(
        store.upsert_track(track(Some(1), 1, "cmi.core.lesson_status", "completed", 2))?,
        UpsertOutcome::Updated
    );

    let tracks = store.fetch_tracks(&TrackQuery::new(USER, ACTIVITY))?;
    assert_eq!(tracks.len(), 1);
    let only = tracks.first().unwrap();
    assert_eq!(only.value, "completed");
    assert_eq!(only.timestamp, 2);
    Ok(())
}

#[test]
fn queries_filter_by_sco_and_attempt() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = FjallTrackStore::init(temp.path())?;
    store.upsert_track(track(None, 1, "x.start_time", "0", 1))?;
    store.upsert_track(track(Some(1), 1, "cmi.core.score.raw", "10", 1))?;
    store.upsert_track(track(Some(2), 1, "cmi.core.score.raw", "20", 1))?;
    store.upsert_track(track(Some(2), 2, "cmi.core.score.raw", "30", 1))?;
    store.upsert_track(Track::new(UserId(6), ACTIVITY, ScoId(2), 1, "cmi.core.score.raw", "99", 1))?;

    assert_eq!(store.fetch_tracks(&TrackQuery::new(USER, ACTIVITY))?.len(), 4);
    assert_eq!(
        store
            .fetch_tracks(&TrackQuery::new(USER, ACTIVITY).sco(ScoId(2)))?
            .len(),
        2
    );
    assert_eq!(
        store
            .fetch_tracks(&TrackQuery::new(USER, ACTIVITY).attempt(1))?
            .len(),
        3
    );

    let tracks = store.fetch_tracks(&TrackQuery::new(USER, ACTIVITY).sco(ScoId(2)).attempt(1))?;
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks.first().map(|t| t.value.as_str()), Some("20"));
    Ok(())
}

#[test]
fn delete_attempt_removes_only_that_attempt() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = FjallTrackStore::init(temp.path())?;
    store.upsert_track(track(Some(1), 1, "cmi.core.score.raw", "10", 1))?;
    store.upsert_track(track(Some(2), 1, "cmi.core.lesson_status", "passed", 1))?;
    store.upsert_track(track(Some(1), 2, "cmi.core.score.raw", "30", 1))?;

    assert_eq!(store.delete_attempt(USER, ACTIVITY, 1)?, 2);
    assert_eq!(store.attempts(USER, ACTIVITY)?, vec![2]);
    Ok(())
}

#[test]
fn grades_from_persistent_store() -> anyhow::Result<()> {
    let temp = TempDir::new()?;
    let store = FjallTrackStore::init(temp.path())?;
    store.upsert_track(track(Some(1), 1, "cmi.core.lesson_status", "completed", 10))?;
    store.upsert_track(track(Some(2), 1, "cmi.core.score.raw", "85", 20))?;

    let declaration = ActivityDeclaration::new(ACTIVITY, [ScoId(1), ScoId(2)])
        .with_policy(GradingPolicy::new(AttemptMethod::Sum, CrossAttemptMethod::Last));
    assert_eq!(grade_user(&store, &declaration, USER)?.score(), Some(85.0));
    Ok(())
}
