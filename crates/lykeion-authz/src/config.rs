//! Policy configuration.

use serde::{Deserialize, Serialize};

/// Names of the groups that carry privilege, as strings the identity
/// provider reports.
///
/// Defaults match the production deployment. The assessment-admin tier is
/// deliberately distinct from the general admin tier: assessment deletion
/// is gated on `system_admin` rather than `admin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Groups with full access to every resource kind.
    pub admin_groups: Vec<String>,
    /// Groups allowed to delete any assessment.
    pub assessment_admin_groups: Vec<String>,
    /// The elevated-but-gated teacher group.
    pub teacher_group: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            admin_groups: vec!["admin".to_string(), "super_admin".to_string()],
            assessment_admin_groups: vec![
                "super_admin".to_string(),
                "system_admin".to_string(),
            ],
            teacher_group: "teachers".to_string(),
        }
    }
}

impl PolicyConfig {
    /// Creates a configuration with default group names.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the admin-tier group names.
    #[must_use]
    pub fn with_admin_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.admin_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the assessment-admin group names.
    #[must_use]
    pub fn with_assessment_admin_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assessment_admin_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the teacher group name.
    #[must_use]
    pub fn with_teacher_group(mut self, group: impl Into<String>) -> Self {
        self.teacher_group = group.into();
        self
    }
}
