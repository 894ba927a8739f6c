use coopdesk_core::AppError;
use coopdesk_domain::{Role, RoleDraft, RoleId};
use serde::Serialize;

/// Input payload for creating or updating a role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleInput {
    /// Display name; surrounding whitespace is trimmed.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Catalog permission ids such as `members:view`.
    pub permission_ids: Vec<String>,
}

impl RoleInput {
    /// Builds an input from role form state.
    #[must_use]
    pub fn from_draft(draft: &RoleDraft) -> Self {
        Self {
            name: draft.name().to_owned(),
            description: draft.description().to_owned(),
            permission_ids: draft.permission_ids(),
        }
    }
}

/// Aggregate role statistics, recomputed on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleStats {
    /// Number of roles.
    pub total_roles: usize,
    /// Number of non-system roles.
    pub custom_roles: usize,
    /// Sum of member counts over all roles, not deduplicated.
    pub total_members: u64,
    /// Rounded mean permission count per role; zero without roles.
    pub avg_permissions: usize,
}

/// Actions the presentation layer should offer for a role.
///
/// Advisory only: the store enforces the same rules on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleActions {
    /// Edit is allowed.
    pub can_edit: bool,
    /// Delete is allowed.
    pub can_delete: bool,
    /// Duplicate is allowed.
    pub can_duplicate: bool,
}

impl RoleActions {
    /// Derives the available actions from role state and its live
    /// assignment count.
    #[must_use]
    pub fn for_role(role: &Role, assigned_members: u32) -> Self {
        Self {
            can_edit: role.ensure_editable().is_ok(),
            can_delete: role.ensure_deletable(assigned_members).is_ok(),
            can_duplicate: true,
        }
    }
}

/// Mutating role store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleOperation {
    /// Role creation.
    Create,
    /// Role update.
    Update,
    /// Role deletion.
    Delete,
    /// Role duplication.
    Duplicate,
}

impl RoleOperation {
    /// Returns a stable value for logs and notifications.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Duplicate => "duplicate",
        }
    }
}

/// Alerting port called once for every rejected role operation.
pub trait RoleRejectionNotifier: Send + Sync {
    /// Surfaces a rejection to the user.
    fn notify_rejected(&self, operation: RoleOperation, role_id: Option<&RoleId>, error: &AppError);
}

/// Capability exposing how many members are assigned to a role.
///
/// Implemented by the member directory so the role store never depends on it.
pub trait MemberCountProvider {
    /// Returns the number of members currently assigned the role.
    fn member_count(&self, role_id: &RoleId) -> u32;
}
