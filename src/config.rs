//! TOML configuration of activities and reconstruction options.
//!
//! ```toml
//! [reconstruct]
//! schema = "scorm_12"
//! strict = false
//!
//! [[activities]]
//! id = 42
//! sub_units = [1, 2, 3]
//! max_attempts = 3
//! grade_method = "sum"     # or the numeric code, 3
//! what_grade = "last"      # or the numeric code, 3
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::activity::{ActivityDeclaration, MemoryCatalog};
use crate::cmi::{ReconstructOptions, SchemaVersion};
use crate::grading::{AttemptMethod, CrossAttemptMethod, GradingPolicy, ParsePolicyError};
use crate::track::{ActivityId, ScoId};

/// Configuration loaded from a TOML file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Reconstruction defaults. Its schema also applies to activities that
    /// do not declare one.
    #[serde(default)]
    pub reconstruct: ReconstructOptions,
    #[serde(default)]
    pub activities: Vec<ActivityConfig>,
}

/// One `[[activities]]` entry.
#[derive(Debug, Deserialize)]
pub struct ActivityConfig {
    pub id: ActivityId,
    #[serde(default)]
    pub sub_units: Vec<ScoId>,
    /// 0 for unlimited.
    #[serde(default)]
    pub max_attempts: u32,
    /// Attempt scoring method.
    #[serde(default)]
    pub grade_method: Option<PolicySetting>,
    /// Cross-attempt selection method.
    #[serde(default)]
    pub what_grade: Option<PolicySetting>,
    #[serde(default)]
    pub schema: Option<SchemaVersion>,
}

/// A grading method given by name or by LMS numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PolicySetting {
    Code(u8),
    Name(String),
}

impl PolicySetting {
    fn attempt_method(&self) -> Result<AttemptMethod, ParsePolicyError> {
        match self {
            PolicySetting::Code(code) => AttemptMethod::try_from(*code),
            PolicySetting::Name(name) => name.parse(),
        }
    }

    fn cross_attempt_method(&self) -> Result<CrossAttemptMethod, ParsePolicyError> {
        match self {
            PolicySetting::Code(code) => CrossAttemptMethod::try_from(*code),
            PolicySetting::Name(name) => name.parse(),
        }
    }
}

impl ActivityConfig {
    /// Build the declaration, falling back to `default_schema`.
    pub fn declaration(
        &self,
        default_schema: SchemaVersion,
    ) -> Result<ActivityDeclaration, ConfigError> {
        let mut policy = GradingPolicy::default();
        if let Some(setting) = &self.grade_method {
            policy.attempt = setting.attempt_method()?;
        }
        if let Some(setting) = &self.what_grade {
            policy.cross_attempt = setting.cross_attempt_method()?;
        }
        Ok(ActivityDeclaration::new(self.id, self.sub_units.iter().copied())
            .with_max_attempts(self.max_attempts)
            .with_policy(policy)
            .with_schema(self.schema.unwrap_or(default_schema)))
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
                path: path.as_ref().display().to_string(),
                source,
            })?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// All activity declarations, in file order.
    pub fn declarations(&self) -> Result<Vec<ActivityDeclaration>, ConfigError> {
        self.activities
            .iter()
            .map(|activity| activity.declaration(self.reconstruct.schema))
            .collect()
    }

    /// An in-memory catalog holding every configured activity.
    pub fn catalog(&self) -> Result<MemoryCatalog, ConfigError> {
        Ok(self.declarations()?.into_iter().collect())
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid grading method: {0}")]
    Policy(#[from] ParsePolicyError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityCatalog;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[reconstruct]
schema = "scorm_12"
strict = true

[[activities]]
id = 42
sub_units = [1, 2, 3]
max_attempts = 3
grade_method = "sum"
what_grade = 3

[[activities]]
id = 43
sub_units = [9]
schema = "scorm_2004"
"#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.reconstruct.schema, SchemaVersion::Scorm12);
        assert!(config.reconstruct.strict);
        assert_eq!(config.activities.len(), 2);

        let catalog = config.catalog().unwrap();
        let first = catalog.declaration(ActivityId(42)).unwrap();
        assert_eq!(first.sub_units, vec![ScoId(1), ScoId(2), ScoId(3)]);
        assert_eq!(first.max_attempts, 3);
        assert_eq!(
            first.policy,
            GradingPolicy::new(AttemptMethod::Sum, CrossAttemptMethod::Last)
        );
        assert_eq!(first.schema, SchemaVersion::Scorm12);

        let second = catalog.declaration(ActivityId(43)).unwrap();
        assert_eq!(second.policy, GradingPolicy::default());
        assert_eq!(second.schema, SchemaVersion::Scorm2004);
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert!(config.activities.is_empty());
        assert_eq!(config.reconstruct, ReconstructOptions::default());
    }

    #[test]
    fn test_unknown_method_is_rejected() {
        let config = Config::from_str(
            r#"
[[activities]]
id = 1
grade_method = "median"
"#,
        )
        .unwrap();
        assert!(matches!(config.catalog(), Err(ConfigError::Policy(_))));
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let config = Config::from_str(
            r#"
[[activities]]
id = 1
what_grade = 9
"#,
        )
        .unwrap();
        assert!(matches!(config.declarations(), Err(ConfigError::Policy(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file("/nonexistent/scorm-track.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
