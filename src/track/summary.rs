//! Per-sub-unit summaries of tracked elements.

use serde::{Deserialize, Serialize};

use super::types::Track;

/// Status elements in SCORM 1.2 and 2004.
const STATUS_ELEMENTS: [&str; 2] = ["cmi.core.lesson_status", "cmi.completion_status"];
const SUCCESS_ELEMENT: &str = "cmi.success_status";
const SCORE_ELEMENTS: [&str; 2] = ["cmi.core.score.raw", "cmi.score.raw"];
const SESSION_TIME_ELEMENTS: [&str; 2] = ["cmi.core.session_time", "cmi.session_time"];
const TOTAL_TIME_ELEMENTS: [&str; 2] = ["cmi.core.total_time", "cmi.total_time"];

/// What one sub-unit's tracks for one attempt amount to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoSummary {
    /// Lesson or completion status, `notattempted` when never set.
    pub status: String,
    /// Raw score, rounded to two decimals. `None` when absent or not numeric.
    pub score_raw: Option<f64>,
    pub session_time: Option<String>,
    pub total_time: Option<String>,
    /// Latest timestamp among the summarised tracks.
    pub timemodified: u64,
    pub element_count: usize,
}

impl ScoSummary {
    /// Summarise `tracks`, which should all belong to one sub-unit and attempt.
    ///
    /// Returns `None` for an empty slice.
    pub fn from_tracks(tracks: &[Track]) -> Option<Self> {
        if tracks.is_empty() {
            return None;
        }

        let mut summary = ScoSummary {
            status: "notattempted".to_string(),
            ..Default::default()
        };
        let mut success: Option<&str> = None;

        for track in tracks {
            let element = track.element.as_str();
            if STATUS_ELEMENTS.contains(&element) {
                summary.status = normalize_status(&track.value);
            } else if element == SUCCESS_ELEMENT {
                success = Some(track.value.as_str());
            } else if SCORE_ELEMENTS.contains(&element) {
                summary.score_raw = parse_score(&track.value);
            } else if SESSION_TIME_ELEMENTS.contains(&element) {
                summary.session_time = Some(track.value.clone());
            } else if TOTAL_TIME_ELEMENTS.contains(&element) {
                summary.total_time = Some(track.value.clone());
            }
            summary.timemodified = summary.timemodified.max(track.timestamp);
            summary.element_count += 1;
        }

        // A pass/fail verdict outranks the completion status.
        if let Some(verdict @ ("passed" | "failed")) = success {
            summary.status = verdict.to_string();
        }

        Some(summary)
    }

    /// Whether the sub-unit counts as completed.
    pub fn is_completed(&self) -> bool {
        matches!(self.status.as_str(), "completed" | "passed")
    }
}

fn normalize_status(value: &str) -> String {
    match value.trim() {
        "not attempted" => "notattempted".to_string(),
        other => other.to_string(),
    }
}

fn parse_score(value: &str) -> Option<f64> {
    let score: f64 = value.trim().parse().ok()?;
    score
        .is_finite()
        .then(|| (score * 100.0).round() / 100.0)
}

/// Whether writing `element` can change a grade.
pub fn affects_grade(element: &str) -> bool {
    element.contains(".score.")
        || element.ends_with("lesson_status")
        || element.ends_with("completion_status")
        || element.ends_with("success_status")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{ActivityId, ScoId, UserId};

    fn track(element: &str, value: &str, timestamp: u64) -> Track {
        Track::new(UserId(1), ActivityId(1), ScoId(1), 1, element, value, timestamp)
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(ScoSummary::from_tracks(&[]), None);
    }

    #[test]
    fn test_scorm_12_summary() {
        let summary = ScoSummary::from_tracks(&[
            track("cmi.core.lesson_status", "completed", 10),
            track("cmi.core.score.raw", "85.456", 30),
            track("cmi.core.session_time", "00:10:00", 20),
        ])
        .unwrap();

        assert!(summary.is_completed());
        assert_eq!(summary.score_raw, Some(85.46));
        assert_eq!(summary.session_time.as_deref(), Some("00:10:00"));
        assert_eq!(summary.timemodified, 30);
        assert_eq!(summary.element_count, 3);
    }

    #[test]
    fn test_scorm_2004_success_overrides_completion() {
        let summary = ScoSummary::from_tracks(&[
            track("cmi.completion_status", "incomplete", 1),
            track("cmi.success_status", "passed", 1),
            track("cmi.score.raw", "not a number", 1),
        ])
        .unwrap();

        assert_eq!(summary.status, "passed");
        assert!(summary.is_completed());
        assert_eq!(summary.score_raw, None);
    }

    #[test]
    fn test_status_normalization() {
        let summary =
            ScoSummary::from_tracks(&[track("cmi.core.lesson_status", "not attempted", 1)]).unwrap();
        assert_eq!(summary.status, "notattempted");
        assert!(!summary.is_completed());

        let summary = ScoSummary::from_tracks(&[track("cmi.core.score.raw", "10", 1)]).unwrap();
        assert_eq!(summary.status, "notattempted");
    }

    #[test]
    fn test_affects_grade() {
        assert!(affects_grade("cmi.core.score.raw"));
        assert!(affects_grade("cmi.score.scaled"));
        assert!(affects_grade("cmi.core.lesson_status"));
        assert!(affects_grade("cmi.success_status"));
        assert!(!affects_grade("cmi.interactions.0.id"));
        assert!(!affects_grade("cmi.suspend_data"));
    }
}
