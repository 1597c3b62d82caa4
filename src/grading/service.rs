//! Grading service wiring the track store, activity catalog and gradebook.

use crate::activity::ActivityCatalog;
use crate::cmi::{ElementTree, ReconstructOptions, reconstruct};
use crate::error::Result;
use crate::logging::{debug, info};
use crate::track::{
    ActivityId, ScoId, Track, TrackQuery, TrackStore, UpsertOutcome, UserId, affects_grade,
};

use super::attempt::{AttemptGrade, grade_attempt};
use super::gradebook::GradebookSink;
use super::selector::{Grade, grade_user};

/// What happened when a track was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordOutcome {
    pub upsert: UpsertOutcome,
    /// The grade pushed to the gradebook, if the element could affect it.
    pub grade: Option<Grade>,
}

/// Grades users from their tracks and keeps the gradebook current.
///
/// Every call loads the activity declaration once and works from that
/// snapshot. Nothing is cached between calls, so concurrent calls for the
/// same user only race on the final gradebook write.
///
/// # Example
///
/// ```
/// use scorm_track::prelude::*;
///
/// let catalog = MemoryCatalog::new();
/// catalog.declare(
///     ActivityDeclaration::new(ActivityId(1), [ScoId(10)])
///         .with_policy(GradingPolicy::new(AttemptMethod::Highest, CrossAttemptMethod::Last)),
/// )?;
/// let service = GradingService::new(MemoryTrackStore::new(), catalog, MemoryGradebook::new());
///
/// let outcome = service.record_track(Track::new(
///     UserId(7), ActivityId(1), ScoId(10), 1, "cmi.core.score.raw", "85", 1_700_000_000,
/// ))?;
/// assert_eq!(outcome.grade.and_then(|grade| grade.score()), Some(85.0));
/// # Ok::<(), scorm_track::Error>(())
/// ```
pub struct GradingService<S, C, G> {
    store: S,
    catalog: C,
    gradebook: G,
    reconstruct: ReconstructOptions,
}

impl<S, C, G> GradingService<S, C, G>
where
    S: TrackStore,
    C: ActivityCatalog,
    G: GradebookSink,
{
    pub fn new(store: S, catalog: C, gradebook: G) -> Self {
        Self {
            store,
            catalog,
            gradebook,
            reconstruct: ReconstructOptions::default(),
        }
    }

    /// Reconstruction options. The schema is always taken from the activity.
    pub fn with_reconstruct_options(mut self, options: ReconstructOptions) -> Self {
        self.reconstruct = options;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn gradebook(&self) -> &G {
        &self.gradebook
    }

    /// Score one attempt. `None` when there is nothing to grade.
    pub fn grade_attempt(
        &self,
        user: UserId,
        activity: ActivityId,
        attempt: u32,
    ) -> Result<Option<AttemptGrade>> {
        let declaration = self.catalog.declaration(activity)?;
        Ok(grade_attempt(&self.store, &declaration, user, attempt)?)
    }

    /// Final grade across attempts, without touching the gradebook.
    pub fn grade_user(&self, user: UserId, activity: ActivityId) -> Result<Grade> {
        let declaration = self.catalog.declaration(activity)?;
        Ok(grade_user(&self.store, &declaration, user)?)
    }

    /// Grade `user` and push the result, absent or not, to the gradebook.
    pub fn update_grade(&self, user: UserId, activity: ActivityId) -> Result<Grade> {
        let grade = self.grade_user(user, activity)?;
        self.gradebook.record(user, activity, &grade)?;
        info!(user = %user, activity = %activity, score = ?grade.score(), "grade updated");
        Ok(grade)
    }

    /// Store a track and re-grade when the element is score- or status-like.
    pub fn record_track(&self, track: Track) -> Result<RecordOutcome> {
        let user = track.user;
        let activity = track.activity;
        let regrade = affects_grade(&track.element);
        debug!(
            user = %user,
            activity = %activity,
            element = %track.element,
            attempt = track.attempt,
            "recording track"
        );

        let upsert = self.store.upsert_track(track)?;
        let grade = if regrade {
            Some(self.update_grade(user, activity)?)
        } else {
            None
        };
        Ok(RecordOutcome { upsert, grade })
    }

    /// Delete one attempt's tracks and re-grade. Returns the number removed.
    pub fn delete_attempt(&self, user: UserId, activity: ActivityId, attempt: u32) -> Result<usize> {
        let removed = self.store.delete_attempt(user, activity, attempt)?;
        self.update_grade(user, activity)?;
        Ok(removed)
    }

    /// Rebuild the data model below `root` for one sub-unit attempt, using
    /// the activity's schema version.
    pub fn reconstruct(
        &self,
        user: UserId,
        activity: ActivityId,
        sco: ScoId,
        attempt: u32,
        root: &str,
        children: &[&str],
    ) -> Result<ElementTree> {
        let schema = self.catalog.schema_version(activity)?;
        let tracks = self
            .store
            .fetch_tracks(&TrackQuery::new(user, activity).sco(sco).attempt(attempt))?;
        let options = ReconstructOptions {
            schema,
            ..self.reconstruct
        };
        let entries = tracks
            .iter()
            .map(|track| (track.element.as_str(), track.value.as_str()));
        Ok(reconstruct(entries, root, children, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityDeclaration, MemoryCatalog};
    use crate::grading::{AttemptMethod, CrossAttemptMethod, GradingPolicy, MemoryGradebook};
    use crate::track::MemoryTrackStore;

    const USER: UserId = UserId(1);
    const ACTIVITY: ActivityId = ActivityId(2);

    fn service() -> GradingService<MemoryTrackStore, MemoryCatalog, MemoryGradebook> {
        let catalog: MemoryCatalog = [ActivityDeclaration::new(ACTIVITY, [ScoId(1), ScoId(2)])
            .with_policy(GradingPolicy::new(AttemptMethod::Sum, CrossAttemptMethod::Highest))]
        .into_iter()
        .collect();
        GradingService::new(MemoryTrackStore::new(), catalog, MemoryGradebook::new())
    }

    fn track(sco: u64, attempt: u32, element: &str, value: &str) -> Track {
        Track::new(USER, ACTIVITY, ScoId(sco), attempt, element, value, 100)
    }

    #[test]
    fn test_non_grading_element_skips_regrade() {
        let service = service();
        let outcome = service
            .record_track(track(1, 1, "cmi.suspend_data", "abc"))
            .unwrap();
        assert_eq!(outcome.upsert, UpsertOutcome::Inserted);
        assert_eq!(outcome.grade, None);
        assert_eq!(service.gradebook().grade(USER, ACTIVITY).unwrap(), None);
    }

    #[test]
    fn test_score_element_pushes_grade() {
        let service = service();
        service.record_track(track(1, 1, "cmi.core.score.raw", "30")).unwrap();
        let outcome = service.record_track(track(2, 1, "cmi.core.score.raw", "12")).unwrap();

        assert_eq!(outcome.grade.and_then(|g| g.score()), Some(42.0));
        assert_eq!(
            service
                .gradebook()
                .grade(USER, ACTIVITY)
                .unwrap()
                .and_then(|g| g.score()),
            Some(42.0)
        );
    }

    #[test]
    fn test_delete_only_attempt_records_absent() {
        let service = service();
        service.record_track(track(1, 1, "cmi.core.score.raw", "30")).unwrap();
        assert_eq!(service.delete_attempt(USER, ACTIVITY, 1).unwrap(), 1);
        assert_eq!(
            service.gradebook().grade(USER, ACTIVITY).unwrap(),
            Some(Grade::Absent)
        );
    }

    #[test]
    fn test_unknown_activity_is_an_error() {
        let service = service();
        let err = service.grade_user(USER, ActivityId(99)).unwrap_err();
        assert!(err.is_catalog());
    }

    #[test]
    fn test_reconstruct_one_sco_attempt() {
        let service = service();
        service
            .record_track(track(1, 1, "cmi.interactions.0.id", "q1"))
            .unwrap();
        service
            .record_track(track(1, 2, "cmi.interactions.0.id", "other-attempt"))
            .unwrap();
        service
            .record_track(track(2, 1, "cmi.interactions.0.id", "other-sco"))
            .unwrap();

        let tree = service
            .reconstruct(USER, ACTIVITY, ScoId(1), 1, "cmi.interactions", &[])
            .unwrap();
        assert_eq!(tree.count(), 1);
        assert_eq!(tree.item(0).and_then(|item| item.value("id")), Some("q1"));
    }

    #[test]
    fn test_strict_reconstruct_rejects_unindexed() {
        let service = service().with_reconstruct_options(ReconstructOptions::default().strict(true));
        service
            .record_track(track(1, 1, "cmi.interactions.loose", "x"))
            .unwrap();

        let err = service
            .reconstruct(USER, ACTIVITY, ScoId(1), 1, "cmi.interactions", &[])
            .unwrap_err();
        assert!(err.is_reconstruct());
    }
}
