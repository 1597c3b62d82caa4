//! Gradebook sink collaborator.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use crate::track::{ActivityId, UserId};

use super::selector::Grade;

/// Gradebook write failure.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("gradebook unavailable: {0}")]
    Unavailable(String),
}

/// Receives final grades. [`Grade::Absent`] means "not yet attempted".
///
/// Re-grading may push the same user and activity repeatedly and from
/// concurrent callers; implementations keep the last value written.
pub trait GradebookSink: Send + Sync {
    fn record(&self, user: UserId, activity: ActivityId, grade: &Grade) -> Result<(), SinkError>;
}

impl<T: GradebookSink + ?Sized> GradebookSink for Arc<T> {
    fn record(&self, user: UserId, activity: ActivityId, grade: &Grade) -> Result<(), SinkError> {
        (**self).record(user, activity, grade)
    }
}

/// Gradebook held in memory.
#[derive(Debug, Default)]
pub struct MemoryGradebook {
    grades: RwLock<BTreeMap<(UserId, ActivityId), Grade>>,
}

impl MemoryGradebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last grade recorded for `user` in `activity`.
    pub fn grade(&self, user: UserId, activity: ActivityId) -> Result<Option<Grade>, SinkError> {
        let grades = self
            .grades
            .read()
            .map_err(|_| SinkError::Unavailable("gradebook lock poisoned".to_string()))?;
        Ok(grades.get(&(user, activity)).copied())
    }
}

impl GradebookSink for MemoryGradebook {
    fn record(&self, user: UserId, activity: ActivityId, grade: &Grade) -> Result<(), SinkError> {
        self.grades
            .write()
            .map_err(|_| SinkError::Unavailable("gradebook lock poisoned".to_string()))?
            .insert((user, activity), *grade);
        Ok(())
    }
}
