//! Grading policies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How sub-unit results combine into one attempt score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttemptMethod {
    /// Number of completed or passed sub-units.
    Scoes,
    /// Highest sub-unit score.
    #[default]
    Highest,
    /// Mean of the scored sub-units.
    Average,
    /// Sum of sub-unit scores.
    Sum,
}

/// How attempt scores combine into the final grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrossAttemptMethod {
    /// Best attempt.
    #[default]
    Highest,
    /// Mean over all attempts up to the last one.
    Average,
    First,
    Last,
}

/// The pair of rules an activity grades by. Immutable during grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GradingPolicy {
    #[serde(default)]
    pub attempt: AttemptMethod,
    #[serde(default)]
    pub cross_attempt: CrossAttemptMethod,
}

impl GradingPolicy {
    pub fn new(attempt: AttemptMethod, cross_attempt: CrossAttemptMethod) -> Self {
        Self {
            attempt,
            cross_attempt,
        }
    }
}

/// Error returned for an unknown grading method name or code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParsePolicyError {
    kind: &'static str,
    value: String,
}

impl AttemptMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptMethod::Scoes => "scoes",
            AttemptMethod::Highest => "highest",
            AttemptMethod::Average => "average",
            AttemptMethod::Sum => "sum",
        }
    }
}

impl CrossAttemptMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            CrossAttemptMethod::Highest => "highest",
            CrossAttemptMethod::Average => "average",
            CrossAttemptMethod::First => "first",
            CrossAttemptMethod::Last => "last",
        }
    }
}

impl fmt::Display for AttemptMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CrossAttemptMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttemptMethod {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scoes" | "count" => Ok(AttemptMethod::Scoes),
            "highest" | "max" => Ok(AttemptMethod::Highest),
            "average" | "mean" => Ok(AttemptMethod::Average),
            "sum" => Ok(AttemptMethod::Sum),
            _ => Err(ParsePolicyError {
                kind: "grade method",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for CrossAttemptMethod {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "highest" => Ok(CrossAttemptMethod::Highest),
            "average" => Ok(CrossAttemptMethod::Average),
            "first" => Ok(CrossAttemptMethod::First),
            "last" => Ok(CrossAttemptMethod::Last),
            _ => Err(ParsePolicyError {
                kind: "attempt grading",
                value: s.to_string(),
            }),
        }
    }
}

/// Numeric codes stored by the LMS for the per-attempt method.
impl TryFrom<u8> for AttemptMethod {
    type Error = ParsePolicyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(AttemptMethod::Scoes),
            1 => Ok(AttemptMethod::Highest),
            2 => Ok(AttemptMethod::Average),
            3 => Ok(AttemptMethod::Sum),
            _ => Err(ParsePolicyError {
                kind: "grade method code",
                value: code.to_string(),
            }),
        }
    }
}

/// Numeric codes stored by the LMS for the cross-attempt method.
impl TryFrom<u8> for CrossAttemptMethod {
    type Error = ParsePolicyError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(CrossAttemptMethod::Highest),
            1 => Ok(CrossAttemptMethod::Average),
            2 => Ok(CrossAttemptMethod::First),
            3 => Ok(CrossAttemptMethod::Last),
            _ => Err(ParsePolicyError {
                kind: "attempt grading code",
                value: code.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!("sum".parse::<AttemptMethod>().ok(), Some(AttemptMethod::Sum));
        assert_eq!(" Highest ".parse::<AttemptMethod>().ok(), Some(AttemptMethod::Highest));
        assert_eq!("scoes".parse::<AttemptMethod>().ok(), Some(AttemptMethod::Scoes));
        assert_eq!("last".parse::<CrossAttemptMethod>().ok(), Some(CrossAttemptMethod::Last));
        assert!("median".parse::<CrossAttemptMethod>().is_err());
    }

    #[test]
    fn test_codes() {
        assert_eq!(AttemptMethod::try_from(0).ok(), Some(AttemptMethod::Scoes));
        assert_eq!(AttemptMethod::try_from(3).ok(), Some(AttemptMethod::Sum));
        assert_eq!(CrossAttemptMethod::try_from(2).ok(), Some(CrossAttemptMethod::First));
        assert!(CrossAttemptMethod::try_from(4).is_err());
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_error_message() {
        let err = "median".parse::<CrossAttemptMethod>().unwrap_err();
        assert_eq!(err.to_string(), "unknown attempt grading 'median'");
    }

    #[test]
    fn test_serde_names() {
        let policy: GradingPolicy =
            serde_json::from_str(r#"{"attempt":"average","cross_attempt":"first"}"#).unwrap();
        assert_eq!(
            policy,
            GradingPolicy::new(AttemptMethod::Average, CrossAttemptMethod::First)
        );
        assert_eq!(
            serde_json::to_string(&GradingPolicy::default()).unwrap(),
            r#"{"attempt":"highest","cross_attempt":"highest"}"#
        );
    }
}
