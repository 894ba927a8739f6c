use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use coopdesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permission::{Permission, PermissionCategory, group_by_category};

/// Suffix appended to the name of a duplicated role.
pub const DUPLICATE_ROLE_SUFFIX: &str = " (Copy)";

/// Unique identifier for a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(String);

impl RoleId {
    /// Creates a new random role identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "role id must not be empty".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Default for RoleId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RoleId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Complete role state used to restore roles from a seed snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSnapshot {
    /// Stable role identifier.
    pub id: RoleId,
    /// Display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Granted permissions.
    pub permissions: Vec<Permission>,
    /// Members currently assigned this role.
    pub member_count: u32,
    /// Protected system role flag.
    pub is_system_role: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Named bundle of catalog permissions assignable to members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    id: RoleId,
    name: NonEmptyString,
    description: String,
    permissions: BTreeSet<Permission>,
    member_count: u32,
    is_system_role: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Role {
    /// Creates a custom role with a fresh identifier and no members.
    pub fn new_custom(
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            name: NonEmptyString::new(name)?,
            description: normalize_description(description.into()),
            permissions: permissions.into_iter().collect(),
            member_count: 0,
            is_system_role: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Restores a role from snapshot state, validating timestamps and name.
    pub fn restore(snapshot: RoleSnapshot) -> AppResult<Self> {
        if snapshot.updated_at < snapshot.created_at {
            return Err(AppError::Validation(format!(
                "role '{}' has updated_at earlier than created_at",
                snapshot.id
            )));
        }

        Ok(Self {
            name: NonEmptyString::new(snapshot.name)?,
            description: normalize_description(snapshot.description),
            permissions: snapshot.permissions.into_iter().collect(),
            id: snapshot.id,
            member_count: snapshot.member_count,
            is_system_role: snapshot.is_system_role,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> &RoleId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns granted permissions in catalog order.
    #[must_use]
    pub fn permissions(&self) -> &BTreeSet<Permission> {
        &self.permissions
    }

    /// Returns the number of granted permissions.
    #[must_use]
    pub fn permission_count(&self) -> usize {
        self.permissions.len()
    }

    /// Returns whether the role grants a permission.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Returns the granted permissions grouped by category.
    #[must_use]
    pub fn permissions_by_category(&self) -> BTreeMap<PermissionCategory, Vec<Permission>> {
        group_by_category(self.permissions.iter().copied())
    }

    /// Returns the denormalized assigned-member count.
    #[must_use]
    pub fn member_count(&self) -> u32 {
        self.member_count
    }

    /// Returns whether this is a protected system role.
    #[must_use]
    pub fn is_system_role(&self) -> bool {
        self.is_system_role
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last modification timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Fails when the role is a system role.
    pub fn ensure_editable(&self) -> AppResult<()> {
        if self.is_system_role {
            return Err(AppError::ProtectedEntity(format!(
                "system role '{}' cannot be edited",
                self.name
            )));
        }

        Ok(())
    }

    /// Fails when the role is a system role or still has members.
    ///
    /// `assigned_members` is the live assignment count from the member
    /// directory; the larger of it and the stored count decides. The
    /// system-role check takes precedence.
    pub fn ensure_deletable(&self, assigned_members: u32) -> AppResult<()> {
        if self.is_system_role {
            return Err(AppError::ProtectedEntity(format!(
                "cannot delete system role '{}'",
                self.name
            )));
        }

        let member_count = self.member_count.max(assigned_members);
        if member_count > 0 {
            return Err(AppError::HasDependents(format!(
                "cannot delete role '{}' with {member_count} active members, reassign them first",
                self.name
            )));
        }

        Ok(())
    }

    /// Replaces name, description and grants of a custom role.
    ///
    /// Leaves the role untouched when validation fails.
    pub fn revise(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        permissions: impl IntoIterator<Item = Permission>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        self.ensure_editable()?;
        let name = NonEmptyString::new(name)?;

        self.name = name;
        self.description = normalize_description(description.into());
        self.permissions = permissions.into_iter().collect();
        self.updated_at = now.max(self.created_at);
        Ok(())
    }

    /// Builds an unassigned custom copy of this role.
    pub fn duplicate(&self, now: DateTime<Utc>) -> AppResult<Self> {
        Ok(Self {
            id: RoleId::new(),
            name: NonEmptyString::new(format!("{}{}", self.name, DUPLICATE_ROLE_SUFFIX))?,
            description: self.description.clone(),
            permissions: self.permissions.clone(),
            member_count: 0,
            is_system_role: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites the denormalized member count.
    ///
    /// Only the member directory owns this value; it does not count as an edit.
    pub fn set_member_count(&mut self, member_count: u32) {
        self.member_count = member_count;
    }
}

fn normalize_description(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.len() == value.len() {
        value
    } else {
        trimmed.to_owned()
    }
}
