//! Grading: sub-unit results to attempt scores, attempt scores to a final grade.

mod attempt;
mod gradebook;
mod policy;
mod selector;
mod service;

pub use attempt::{AttemptGrade, AttemptScore, grade_attempt};
pub use gradebook::{GradebookSink, MemoryGradebook, SinkError};
pub use policy::{AttemptMethod, CrossAttemptMethod, GradingPolicy, ParsePolicyError};
pub use selector::{Grade, UserGrade, grade_user, graded_attempt_limit};
pub use service::{GradingService, RecordOutcome};
