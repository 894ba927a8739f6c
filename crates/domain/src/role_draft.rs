use std::collections::BTreeSet;

use serde::Serialize;

use crate::permission::{Permission, PermissionCategory};
use crate::role::Role;

/// Selected versus available permissions of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategorySelection {
    /// Number of selected permissions in the category.
    pub selected: usize,
    /// Number of catalog permissions in the category.
    pub total: usize,
}

impl CategorySelection {
    /// Returns true when every permission of the category is selected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.selected == self.total
    }
}

/// In-progress role form state.
///
/// Edits here never touch a stored role; the draft is submitted through the
/// role store as plain permission ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleDraft {
    name: String,
    description: String,
    selected: BTreeSet<Permission>,
}

impl RoleDraft {
    /// Creates an empty draft.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fills a draft from an existing role for editing.
    #[must_use]
    pub fn from_role(role: &Role) -> Self {
        Self {
            name: role.name().as_str().to_owned(),
            description: role.description().to_owned(),
            selected: role.permissions().clone(),
        }
    }

    /// Returns the draft name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Replaces the draft name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Returns the draft description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Replaces the draft description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Returns the selected permissions.
    #[must_use]
    pub fn selected(&self) -> &BTreeSet<Permission> {
        &self.selected
    }

    /// Returns whether a permission is selected.
    #[must_use]
    pub fn is_selected(&self, permission: Permission) -> bool {
        self.selected.contains(&permission)
    }

    /// Flips a single permission.
    pub fn toggle_permission(&mut self, permission: Permission) {
        if !self.selected.remove(&permission) {
            self.selected.insert(permission);
        }
    }

    /// Deselects every permission of the category when all of them are
    /// selected, otherwise selects all of them.
    pub fn toggle_all_in_category(&mut self, category: PermissionCategory) {
        if self.category_selection(category).is_complete() {
            for permission in category.permissions() {
                self.selected.remove(&permission);
            }
        } else {
            self.selected.extend(category.permissions());
        }
    }

    /// Returns how much of a category is selected.
    #[must_use]
    pub fn category_selection(&self, category: PermissionCategory) -> CategorySelection {
        let (selected, total) = category
            .permissions()
            .fold((0, 0), |(selected, total), permission| {
                (selected + usize::from(self.is_selected(permission)), total + 1)
            });

        CategorySelection { selected, total }
    }

    /// Returns the selected permission ids in catalog order.
    #[must_use]
    pub fn permission_ids(&self) -> Vec<String> {
        self.selected
            .iter()
            .map(|permission| permission.as_str().to_owned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use proptest::prelude::*;
    use proptest::sample::subsequence;

    use super::RoleDraft;
    use crate::{Permission, PermissionCategory, Role};

    fn category_strategy() -> impl Strategy<Value = PermissionCategory> {
        prop::sample::select(PermissionCategory::all().to_vec())
    }

    fn draft_with(permissions: &[Permission]) -> RoleDraft {
        let mut draft = RoleDraft::new();
        for permission in permissions {
            draft.toggle_permission(*permission);
        }
        draft
    }

    #[test]
    fn toggle_selects_whole_category_when_partially_selected() {
        let mut draft = draft_with(&[Permission::FinancialView]);

        draft.toggle_all_in_category(PermissionCategory::Financial);

        let selection = draft.category_selection(PermissionCategory::Financial);
        assert_eq!(selection.selected, 4);
        assert!(selection.is_complete());
    }

    #[test]
    fn toggle_clears_fully_selected_category() {
        let mut draft = draft_with(&[
            Permission::ReportsView,
            Permission::ReportsCreate,
            Permission::ReportsExport,
            Permission::MembersView,
        ]);

        draft.toggle_all_in_category(PermissionCategory::Reports);

        assert_eq!(draft.category_selection(PermissionCategory::Reports).selected, 0);
        assert_eq!(draft.permission_ids(), vec!["members:view".to_owned()]);
    }

    #[test]
    fn toggle_leaves_other_categories_alone() {
        let mut draft = draft_with(&[Permission::ReportsView, Permission::SystemBackup]);

        draft.toggle_all_in_category(PermissionCategory::Members);
        draft.toggle_all_in_category(PermissionCategory::Members);

        assert_eq!(
            draft.permission_ids(),
            vec!["reports:view".to_owned(), "system:backup".to_owned()]
        );
    }

    #[test]
    fn toggle_permission_flips_membership() {
        let mut draft = RoleDraft::new();
        draft.toggle_permission(Permission::SettingsEdit);
        assert!(draft.is_selected(Permission::SettingsEdit));
        draft.toggle_permission(Permission::SettingsEdit);
        assert!(!draft.is_selected(Permission::SettingsEdit));
    }

    #[test]
    fn draft_from_role_copies_form_fields() {
        let role = Role::new_custom(
            "Treasurer",
            "Financial management",
            [Permission::FinancialView, Permission::ReportsView],
            Utc::now(),
        )
        .unwrap_or_else(|_| unreachable!());

        let draft = RoleDraft::from_role(&role);

        assert_eq!(draft.name(), "Treasurer");
        assert_eq!(draft.description(), "Financial management");
        assert_eq!(
            draft.category_selection(PermissionCategory::Reports).selected,
            1
        );
    }

    proptest! {
        #[test]
        fn double_toggle_restores_settled_category(
            others in subsequence(Permission::all().to_vec(), 0..=Permission::all().len()),
            category in category_strategy(),
            start_full in any::<bool>(),
        ) {
            let mut draft = draft_with(
                &others
                    .iter()
                    .copied()
                    .filter(|permission| permission.category() != category)
                    .collect::<Vec<_>>(),
            );
            if start_full {
                draft.toggle_all_in_category(category);
            }
            let original = draft.clone();

            draft.toggle_all_in_category(category);
            draft.toggle_all_in_category(category);

            prop_assert_eq!(draft, original);
        }

        #[test]
        fn select_all_then_toggle_clears_category(
            initial in subsequence(Permission::all().to_vec(), 0..=Permission::all().len()),
            category in category_strategy(),
        ) {
            let outside: Vec<Permission> = initial
                .iter()
                .copied()
                .filter(|permission| permission.category() != category)
                .collect();
            let partial: Vec<Permission> = initial
                .iter()
                .copied()
                .filter(|permission| permission.category() == category)
                .skip(1)
                .chain(outside.iter().copied())
                .collect();
            let mut draft = draft_with(&partial);

            draft.toggle_all_in_category(category);
            prop_assert!(draft.category_selection(category).is_complete());

            draft.toggle_all_in_category(category);
            prop_assert_eq!(draft.category_selection(category).selected, 0);
            prop_assert!(outside.iter().all(|permission| draft.is_selected(*permission)));
        }

        #[test]
        fn selection_stays_within_catalog(
            initial in subsequence(Permission::all().to_vec(), 0..=Permission::all().len()),
            category in category_strategy(),
        ) {
            let mut draft = draft_with(&initial);
            draft.toggle_all_in_category(category);

            for id in draft.permission_ids() {
                prop_assert!(Permission::from_transport(&id).is_ok());
            }
        }
    }
}
