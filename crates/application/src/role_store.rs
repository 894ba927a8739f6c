use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use coopdesk_core::{AppError, AppResult};
use coopdesk_domain::{Permission, PermissionCategory, Role, RoleId, group_by_category};

use crate::role_ports::{
    MemberCountProvider, RoleActions, RoleInput, RoleOperation, RoleRejectionNotifier, RoleStats,
};

#[cfg(test)]
mod tests;

/// In-memory store of roles over the static permission catalog.
///
/// List order is insertion order. Every rejected operation leaves the store
/// unchanged and is reported to the rejection notifier before returning.
pub struct RoleStore {
    roles: Vec<Role>,
    notifier: Arc<dyn RoleRejectionNotifier>,
}

impl RoleStore {
    /// Creates a store seeded with an initial snapshot.
    ///
    /// Fails with [`AppError::Conflict`] when two roles share an id.
    pub fn new(snapshot: Vec<Role>, notifier: Arc<dyn RoleRejectionNotifier>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(snapshot.len());
        for role in &snapshot {
            if !seen.insert(role.id().clone()) {
                return Err(AppError::Conflict(format!(
                    "role id '{}' appears more than once in the snapshot",
                    role.id()
                )));
            }
        }

        debug!(role_count = snapshot.len(), "role store seeded");
        Ok(Self {
            roles: snapshot,
            notifier,
        })
    }

    /// Creates a store without roles.
    #[must_use]
    pub fn empty(notifier: Arc<dyn RoleRejectionNotifier>) -> Self {
        Self {
            roles: Vec::new(),
            notifier,
        }
    }

    /// Returns roles in list order.
    #[must_use]
    pub fn list_roles(&self) -> &[Role] {
        self.roles.as_slice()
    }

    /// Returns the static permission catalog.
    #[must_use]
    pub fn list_permissions(&self) -> &'static [Permission] {
        Permission::all()
    }

    /// Returns the permission catalog grouped by category.
    #[must_use]
    pub fn permissions_by_category(&self) -> BTreeMap<PermissionCategory, Vec<Permission>> {
        group_by_category(Permission::all().iter().copied())
    }

    /// Finds a role by id.
    #[must_use]
    pub fn find_role(&self, role_id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.id() == role_id)
    }

    /// Returns the actions the presentation layer should enable for a role.
    pub fn role_actions(
        &self,
        role_id: &RoleId,
        members: &dyn MemberCountProvider,
    ) -> AppResult<RoleActions> {
        self.find_role(role_id)
            .map(|role| RoleActions::for_role(role, members.member_count(role_id)))
            .ok_or_else(|| role_not_found(role_id))
    }

    /// Creates a custom role and appends it to the list.
    pub fn create_role(&mut self, input: RoleInput) -> AppResult<Role> {
        let result = self.try_create(input);
        self.report(RoleOperation::Create, None, result)
    }

    /// Replaces name, description and grants of a custom role.
    pub fn update_role(&mut self, role_id: &RoleId, input: RoleInput) -> AppResult<Role> {
        let result = self.try_update(role_id, input);
        self.report(RoleOperation::Update, Some(role_id), result)
    }

    /// Removes a custom role without members.
    ///
    /// Members are counted live through `members` as well as through the
    /// stored count, so an assignment made after the last refresh still
    /// blocks the delete.
    pub fn delete_role(
        &mut self,
        role_id: &RoleId,
        members: &dyn MemberCountProvider,
    ) -> AppResult<()> {
        let result = self.try_delete(role_id, members);
        self.report(RoleOperation::Delete, Some(role_id), result)
    }

    /// Appends an unassigned custom copy of a role.
    pub fn duplicate_role(&mut self, role_id: &RoleId) -> AppResult<Role> {
        let result = self.try_duplicate(role_id);
        self.report(RoleOperation::Duplicate, Some(role_id), result)
    }

    /// Computes aggregate statistics over the current roles.
    #[must_use]
    pub fn role_stats(&self) -> RoleStats {
        let total_roles = self.roles.len();
        let custom_roles = self
            .roles
            .iter()
            .filter(|role| !role.is_system_role())
            .count();
        let total_members = self
            .roles
            .iter()
            .map(|role| u64::from(role.member_count()))
            .sum();
        let total_permissions: usize = self.roles.iter().map(Role::permission_count).sum();

        RoleStats {
            total_roles,
            custom_roles,
            total_members,
            avg_permissions: rounded_mean(total_permissions, total_roles),
        }
    }

    /// Overwrites every role's member count from the member directory.
    ///
    /// Does not count as an edit, so `updated_at` is left alone.
    pub fn refresh_member_counts(&mut self, provider: &dyn MemberCountProvider) {
        for role in &mut self.roles {
            let member_count = provider.member_count(role.id());
            if member_count != role.member_count() {
                debug!(
                    role_id = %role.id(),
                    previous = role.member_count(),
                    member_count,
                    "role member count refreshed"
                );
                role.set_member_count(member_count);
            }
        }
    }

    fn try_create(&mut self, input: RoleInput) -> AppResult<Role> {
        let permissions = resolve_permissions(&input.permission_ids)?;
        let role = Role::new_custom(input.name, input.description, permissions, Utc::now())?;
        self.append(role.clone())?;

        info!(
            role_id = %role.id(),
            role_name = %role.name(),
            permission_count = role.permission_count(),
            "role created"
        );
        Ok(role)
    }

    fn try_update(&mut self, role_id: &RoleId, input: RoleInput) -> AppResult<Role> {
        let role = self
            .roles
            .iter_mut()
            .find(|role| role.id() == role_id)
            .ok_or_else(|| role_not_found(role_id))?;
        role.ensure_editable()?;

        let permissions = resolve_permissions(&input.permission_ids)?;
        role.revise(input.name, input.description, permissions, Utc::now())?;

        info!(
            role_id = %role.id(),
            role_name = %role.name(),
            permission_count = role.permission_count(),
            "role updated"
        );
        Ok(role.clone())
    }

    fn try_delete(&mut self, role_id: &RoleId, members: &dyn MemberCountProvider) -> AppResult<()> {
        let index = self
            .roles
            .iter()
            .position(|role| role.id() == role_id)
            .ok_or_else(|| role_not_found(role_id))?;

        self.roles[index].ensure_deletable(members.member_count(role_id))?;
        let removed = self.roles.remove(index);

        info!(role_id = %removed.id(), role_name = %removed.name(), "role deleted");
        Ok(())
    }

    fn try_duplicate(&mut self, role_id: &RoleId) -> AppResult<Role> {
        let source = self
            .find_role(role_id)
            .ok_or_else(|| role_not_found(role_id))?;
        let copy = source.duplicate(Utc::now())?;
        self.append(copy.clone())?;

        info!(
            source_role_id = %role_id,
            role_id = %copy.id(),
            role_name = %copy.name(),
            "role duplicated"
        );
        Ok(copy)
    }

    fn append(&mut self, role: Role) -> AppResult<()> {
        if self.find_role(role.id()).is_some() {
            return Err(AppError::Conflict(format!(
                "role id '{}' is already in use",
                role.id()
            )));
        }

        self.roles.push(role);
        Ok(())
    }

    fn report<T>(
        &self,
        operation: RoleOperation,
        role_id: Option<&RoleId>,
        result: AppResult<T>,
    ) -> AppResult<T> {
        if let Err(error) = &result {
            self.notifier.notify_rejected(operation, role_id, error);
        }

        result
    }
}

/// Resolves catalog ids, rejecting the whole set on the first unknown id.
fn resolve_permissions(permission_ids: &[String]) -> AppResult<Vec<Permission>> {
    permission_ids
        .iter()
        .map(|permission_id| Permission::from_transport(permission_id))
        .collect()
}

fn role_not_found(role_id: &RoleId) -> AppError {
    AppError::NotFound(format!("role '{role_id}' does not exist"))
}

/// Integer mean rounded half up; zero for an empty population.
fn rounded_mean(total: usize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }

    (total * 2 + count) / (count * 2)
}
