//! Activity declarations: which sub-units an activity has and how it grades.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::cmi::SchemaVersion;
use crate::grading::GradingPolicy;
use crate::track::{ActivityId, ScoId};

/// Errors from an [`ActivityCatalog`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("unknown activity {0}")]
    UnknownActivity(ActivityId),
    #[error("activity catalog unavailable: {0}")]
    Unavailable(String),
}

/// Source of per-activity configuration.
pub trait ActivityCatalog: Send + Sync {
    /// Sub-units (SCOs) belonging to the activity, in declaration order.
    fn sub_units_of(&self, activity: ActivityId) -> Result<Vec<ScoId>, CatalogError>;

    /// Maximum number of graded attempts, 0 for unlimited.
    fn max_attempts(&self, activity: ActivityId) -> Result<u32, CatalogError>;

    fn grading_policy(&self, activity: ActivityId) -> Result<GradingPolicy, CatalogError>;

    fn schema_version(&self, activity: ActivityId) -> Result<SchemaVersion, CatalogError> {
        let _ = activity;
        Ok(SchemaVersion::default())
    }

    /// Snapshot everything grading needs about `activity` in one go.
    fn declaration(&self, activity: ActivityId) -> Result<ActivityDeclaration, CatalogError> {
        Ok(ActivityDeclaration {
            id: activity,
            sub_units: self.sub_units_of(activity)?,
            max_attempts: self.max_attempts(activity)?,
            policy: self.grading_policy(activity)?,
            schema: self.schema_version(activity)?,
        })
    }
}

impl<T: ActivityCatalog + ?Sized> ActivityCatalog for Arc<T> {
    fn sub_units_of(&self, activity: ActivityId) -> Result<Vec<ScoId>, CatalogError> {
        (**self).sub_units_of(activity)
    }

    fn max_attempts(&self, activity: ActivityId) -> Result<u32, CatalogError> {
        (**self).max_attempts(activity)
    }

    fn grading_policy(&self, activity: ActivityId) -> Result<GradingPolicy, CatalogError> {
        (**self).grading_policy(activity)
    }

    fn schema_version(&self, activity: ActivityId) -> Result<SchemaVersion, CatalogError> {
        (**self).schema_version(activity)
    }

    fn declaration(&self, activity: ActivityId) -> Result<ActivityDeclaration, CatalogError> {
        (**self).declaration(activity)
    }
}

/// Everything grading needs to know about one activity.
///
/// Loaded once per grading call and passed down explicitly, so catalog
/// lookups are not repeated for every attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDeclaration {
    pub id: ActivityId,
    #[serde(default)]
    pub sub_units: Vec<ScoId>,
    #[serde(default)]
    pub max_attempts: u32,
    #[serde(default)]
    pub policy: GradingPolicy,
    #[serde(default)]
    pub schema: SchemaVersion,
}

impl ActivityDeclaration {
    pub fn new(id: ActivityId, sub_units: impl IntoIterator<Item = ScoId>) -> Self {
        Self {
            id,
            sub_units: sub_units.into_iter().collect(),
            max_attempts: 0,
            policy: GradingPolicy::default(),
            schema: SchemaVersion::default(),
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_policy(mut self, policy: GradingPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_schema(mut self, schema: SchemaVersion) -> Self {
        self.schema = schema;
        self
    }
}

/// Catalog held in memory.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    activities: RwLock<BTreeMap<ActivityId, ActivityDeclaration>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an activity declaration.
    pub fn declare(&self, declaration: ActivityDeclaration) -> Result<(), CatalogError> {
        self.activities
            .write()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))?
            .insert(declaration.id, declaration);
        Ok(())
    }

    fn lookup<T>(
        &self,
        activity: ActivityId,
        f: impl FnOnce(&ActivityDeclaration) -> T,
    ) -> Result<T, CatalogError> {
        let activities = self
            .activities
            .read()
            .map_err(|_| CatalogError::Unavailable("catalog lock poisoned".to_string()))?;
        activities
            .get(&activity)
            .map(f)
            .ok_or(CatalogError::UnknownActivity(activity))
    }
}

impl FromIterator<ActivityDeclaration> for MemoryCatalog {
    fn from_iter<I: IntoIterator<Item = ActivityDeclaration>>(iter: I) -> Self {
        let activities = iter
            .into_iter()
            .map(|declaration| (declaration.id, declaration))
            .collect();
        Self {
            activities: RwLock::new(activities),
        }
    }
}

impl ActivityCatalog for MemoryCatalog {
    fn sub_units_of(&self, activity: ActivityId) -> Result<Vec<ScoId>, CatalogError> {
        self.lookup(activity, |d| d.sub_units.clone())
    }

    fn max_attempts(&self, activity: ActivityId) -> Result<u32, CatalogError> {
        self.lookup(activity, |d| d.max_attempts)
    }

    fn grading_policy(&self, activity: ActivityId) -> Result<GradingPolicy, CatalogError> {
        self.lookup(activity, |d| d.policy)
    }

    fn schema_version(&self, activity: ActivityId) -> Result<SchemaVersion, CatalogError> {
        self.lookup(activity, |d| d.schema)
    }

    fn declaration(&self, activity: ActivityId) -> Result<ActivityDeclaration, CatalogError> {
        self.lookup(activity, ActivityDeclaration::clone)
    }
}
