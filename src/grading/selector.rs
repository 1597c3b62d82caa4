//! Cross-attempt grade selection.

use serde::{Deserialize, Serialize};

use crate::activity::ActivityDeclaration;
use crate::logging::debug;
use crate::track::{StoreError, TrackStore, UserId};

use super::attempt::{AttemptGrade, grade_attempt};
use super::policy::CrossAttemptMethod;

/// A final grade for one user in one activity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Grade {
    /// Not enough data to grade: the activity has no sub-units or the user
    /// has no tracks. Means "not yet attempted", never zero.
    Absent,
    Scored(UserGrade),
}

impl Grade {
    pub fn score(&self) -> Option<f64> {
        match self {
            Grade::Absent => None,
            Grade::Scored(grade) => Some(grade.score),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Grade::Absent)
    }
}

/// A numeric grade with the attempt and time it came from, when known.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserGrade {
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt: Option<u32>,
}

impl UserGrade {
    fn from_attempt(attempt: u32, grade: Option<AttemptGrade>) -> Self {
        match grade {
            Some(grade) => UserGrade {
                score: grade.score,
                timestamp: Some(grade.last_modified),
                attempt: Some(attempt),
            },
            None => UserGrade {
                score: 0.0,
                timestamp: None,
                attempt: Some(attempt),
            },
        }
    }
}

/// Last attempt that counts towards the grade: the user's latest attempt,
/// clamped to `max_attempts` when that is non-zero.
pub fn graded_attempt_limit(last_attempt: u32, max_attempts: u32) -> u32 {
    if max_attempts != 0 && last_attempt >= max_attempts {
        max_attempts
    } else {
        last_attempt
    }
}

/// Combine `user`'s attempts into one grade under the declared policy.
///
/// Every attempt is scored from scratch. Attempts within range that have no
/// tracks score zero.
pub fn grade_user<S: TrackStore + ?Sized>(
    store: &S,
    declaration: &ActivityDeclaration,
    user: UserId,
) -> Result<Grade, StoreError> {
    if declaration.sub_units.is_empty() {
        return Ok(Grade::Absent);
    }
    let last_attempt = store.last_attempt_number(user, declaration.id)?;
    if last_attempt == 0 {
        return Ok(Grade::Absent);
    }
    let last = graded_attempt_limit(last_attempt, declaration.max_attempts);
    let method = declaration.policy.cross_attempt;

    let grade = match method {
        CrossAttemptMethod::First => {
            UserGrade::from_attempt(1, grade_attempt(store, declaration, user, 1)?)
        }
        CrossAttemptMethod::Last => {
            UserGrade::from_attempt(last, grade_attempt(store, declaration, user, last)?)
        }
        CrossAttemptMethod::Highest => {
            let mut best = UserGrade {
                score: 0.0,
                timestamp: None,
                attempt: None,
            };
            for attempt in 1..=last {
                let Some(graded) = grade_attempt(store, declaration, user, attempt)? else {
                    continue;
                };
                if graded.score > best.score {
                    best = UserGrade::from_attempt(attempt, Some(graded));
                }
            }
            best
        }
        CrossAttemptMethod::Average => {
            let mut sum = 0.0;
            for attempt in 1..=last {
                if let Some(graded) = grade_attempt(store, declaration, user, attempt)? {
                    sum += graded.score;
                }
            }
            UserGrade {
                score: if last == 0 { 0.0 } else { sum / f64::from(last) },
                timestamp: None,
                attempt: None,
            }
        }
    };

    debug!(
        user = %user,
        activity = %declaration.id,
        method = %method,
        last_attempt = last,
        score = grade.score,
        "user graded"
    );
    Ok(Grade::Scored(grade))
}
