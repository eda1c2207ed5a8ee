//! Policy evaluation.
//!
//! Every function here is a pure computation over the caller identity and
//! resource attributes; nothing is read from ambient state and nothing is
//! cached. Denials carry a human-readable reason that becomes the
//! `Unauthorized` message surfaced to the caller.

use lykeion_core::record::{bool_field, string_field, Item, CREATED_BY};
use lykeion_core::{Identity, LykeionError, LykeionResult};

use crate::config::PolicyConfig;

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The operation is allowed.
    Allow,
    /// The operation is denied.
    Deny {
        /// Human-readable denial reason.
        reason: String,
    },
}

impl Decision {
    /// Creates a denial with the given reason.
    #[must_use]
    pub fn deny(reason: impl Into<String>) -> Self {
        Self::Deny {
            reason: reason.into(),
        }
    }

    /// Returns true for [`Decision::Allow`].
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts the decision into a pipeline result, mapping a denial to an
    /// `Unauthorized` error naming the attempted operation.
    pub fn into_result(self, operation: &str) -> LykeionResult<()> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny { reason } => Err(LykeionError::unauthorized_for(reason, operation)),
        }
    }
}

/// The policy evaluator: role-model predicates plus per-resource decision
/// rules, all deny-by-default.
#[derive(Debug, Clone, Default)]
pub struct PolicyEvaluator {
    config: PolicyConfig,
}

impl PolicyEvaluator {
    /// Creates an evaluator with the given configuration.
    #[must_use]
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    /// True if the identity holds an admin-tier group.
    #[must_use]
    pub fn is_privileged(&self, identity: &Identity) -> bool {
        identity.in_any_group(self.config.admin_groups.iter().map(String::as_str))
    }

    /// True if the identity holds the teacher group or an admin tier.
    #[must_use]
    pub fn has_teacher_or_above(&self, identity: &Identity) -> bool {
        identity.in_group(&self.config.teacher_group) || self.is_privileged(identity)
    }

    /// True if the identity holds an assessment-admin tier group.
    #[must_use]
    pub fn is_assessment_admin(&self, identity: &Identity) -> bool {
        identity.in_any_group(
            self.config
                .assessment_admin_groups
                .iter()
                .map(String::as_str),
        )
    }

    /// True if the identity's owner key matches the record's `createdBy`.
    #[must_use]
    pub fn is_owner(&self, identity: &Identity, record: &Item) -> bool {
        match (identity.owner_key(), string_field(record, CREATED_BY)) {
            (Some(owner), Some(created_by)) => owner == created_by,
            _ => false,
        }
    }

    /// Course update/delete: admin tier or course owner.
    #[must_use]
    pub fn can_modify_course(&self, identity: &Identity, course: &Item) -> Decision {
        if self.is_privileged(identity) || self.is_owner(identity, course) {
            Decision::Allow
        } else {
            Decision::deny("Unauthorized to update this course")
        }
    }

    /// Knowledge-base management for a course: admin tier, course owner,
    /// or any teacher when the course is public.
    #[must_use]
    pub fn can_manage_knowledge_base(&self, identity: &Identity, course: &Item) -> Decision {
        let public = bool_field(course, lykeion_core::record::IS_PUBLIC);
        if self.is_privileged(identity)
            || self.is_owner(identity, course)
            || (public && self.has_teacher_or_above(identity))
        {
            Decision::Allow
        } else {
            Decision::deny("Unauthorized to manage knowledge base for this course")
        }
    }

    /// Course creation/upsert: teacher or above.
    #[must_use]
    pub fn can_create_course(&self, identity: &Identity) -> Decision {
        if self.has_teacher_or_above(identity) {
            Decision::Allow
        } else {
            Decision::deny("You do not have permission to create courses")
        }
    }

    /// Knowledge-base creation: teacher or above.
    #[must_use]
    pub fn can_create_knowledge_base(&self, identity: &Identity) -> Decision {
        if self.has_teacher_or_above(identity) {
            Decision::Allow
        } else {
            Decision::deny("You do not have permission to create knowledge bases")
        }
    }

    /// Assessment deletion: assessment-admin tier, or the stored record's
    /// owner subject equals the caller's subject.
    ///
    /// The check compares the *record's* owner, not the caller to itself:
    /// the previous deployment compared the caller's subject against its own
    /// derivation, which could never deny anyone.
    #[must_use]
    pub fn can_delete_assessment(
        &self,
        identity: &Identity,
        owner_subject_id: Option<&str>,
    ) -> Decision {
        if self.is_assessment_admin(identity) {
            return Decision::Allow;
        }
        if owner_subject_id == Some(identity.subject_id.as_str()) {
            Decision::Allow
        } else {
            Decision::deny("Permission denied")
        }
    }

    /// Assessment visibility: admin tier or the owning subject.
    #[must_use]
    pub fn can_view_assessment(
        &self,
        identity: &Identity,
        owner_subject_id: Option<&str>,
    ) -> Decision {
        if self.is_privileged(identity) || owner_subject_id == Some(identity.subject_id.as_str())
        {
            Decision::Allow
        } else {
            Decision::deny("Unauthorized to view this assessment")
        }
    }

    /// The per-item listing predicate: admin tier sees everything;
    /// everyone else sees records they own or records flagged public.
    ///
    /// This single predicate backs the application-side post-filter used
    /// when the store cannot express "owner OR public" natively.
    #[must_use]
    pub fn visible_in_listing(&self, identity: &Identity, record: &Item) -> bool {
        self.is_privileged(identity)
            || self.is_owner(identity, record)
            || bool_field(record, lykeion_core::record::IS_PUBLIC)
    }
}
