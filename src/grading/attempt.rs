//! Attempt score aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::activity::ActivityDeclaration;
use crate::logging::{debug, trace};
use crate::track::{ScoId, ScoSummary, StoreError, Track, TrackQuery, TrackStore, UserId};

use super::policy::AttemptMethod;

/// Running totals over the sub-units of one attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptScore {
    /// Sub-units whose status is completed or passed.
    pub sco_count: u32,
    /// Sub-units with a raw score.
    pub scored_count: u32,
    pub sum: f64,
    pub max: f64,
    /// Modification time carried from scored sub-units.
    pub last_modified: u64,
}

impl AttemptScore {
    /// Fold one sub-unit summary into the totals.
    pub fn add(&mut self, summary: &ScoSummary) {
        if summary.is_completed() {
            self.sco_count += 1;
        }
        let Some(score) = summary.score_raw else {
            return;
        };
        self.scored_count += 1;
        self.sum += score;
        if score > self.max {
            self.max = score;
        }
        // A scored sub-unit that is not newer than the running value resets
        // it to zero rather than keeping the maximum.
        if summary.timemodified > self.last_modified {
            self.last_modified = summary.timemodified;
        } else {
            self.last_modified = 0;
        }
    }

    /// The attempt score under `method`.
    pub fn score(&self, method: AttemptMethod) -> f64 {
        match method {
            AttemptMethod::Highest => self.max,
            AttemptMethod::Average => {
                if self.scored_count > 0 {
                    self.sum / f64::from(self.scored_count)
                } else {
                    0.0
                }
            }
            AttemptMethod::Sum => self.sum,
            AttemptMethod::Scoes => f64::from(self.sco_count),
        }
    }
}

impl<'a> FromIterator<&'a ScoSummary> for AttemptScore {
    fn from_iter<I: IntoIterator<Item = &'a ScoSummary>>(iter: I) -> Self {
        let mut score = AttemptScore::default();
        for summary in iter {
            score.add(summary);
        }
        score
    }
}

/// Score of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttemptGrade {
    pub attempt: u32,
    pub method: AttemptMethod,
    pub score: f64,
    pub last_modified: u64,
    pub totals: AttemptScore,
}

/// Score `user`'s attempt number `attempt` in the declared activity.
///
/// Returns `None` when the activity declares no sub-units or none of them has
/// a track in this attempt. Tracks of other attempts never contribute.
pub fn grade_attempt<S: TrackStore + ?Sized>(
    store: &S,
    declaration: &ActivityDeclaration,
    user: UserId,
    attempt: u32,
) -> Result<Option<AttemptGrade>, StoreError> {
    if declaration.sub_units.is_empty() {
        debug!(activity = %declaration.id, "activity declares no sub-units");
        return Ok(None);
    }

    let query = TrackQuery::new(user, declaration.id).attempt(attempt);
    let mut by_sco: BTreeMap<ScoId, Vec<Track>> = BTreeMap::new();
    for track in store.fetch_tracks(&query)? {
        if let Some(sco) = track.sco {
            by_sco.entry(sco).or_default().push(track);
        }
    }

    let summaries: Vec<ScoSummary> = declaration
        .sub_units
        .iter()
        .filter_map(|sco| by_sco.get(sco))
        .filter_map(|tracks| ScoSummary::from_tracks(tracks))
        .collect();
    if summaries.is_empty() {
        trace!(user = %user, activity = %declaration.id, attempt = attempt, "no tracks for attempt");
        return Ok(None);
    }

    let totals: AttemptScore = summaries.iter().collect();
    let method = declaration.policy.attempt;
    let score = totals.score(method);
    debug!(
        user = %user,
        activity = %declaration.id,
        attempt = attempt,
        method = %method,
        score = score,
        "attempt graded"
    );

    Ok(Some(AttemptGrade {
        attempt,
        method,
        score,
        last_modified: totals.last_modified,
        totals,
    }))
}
