use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use coopdesk_core::AppError;
use coopdesk_domain::{Permission, PermissionCategory, Role, RoleDraft, RoleId, RoleSnapshot};

use crate::role_ports::{
    MemberCountProvider, RoleInput, RoleOperation, RoleRejectionNotifier, RoleStats,
};

use super::RoleStore;

#[derive(Default)]
struct FakeNotifier {
    rejections: Mutex<Vec<(RoleOperation, Option<RoleId>, AppError)>>,
}

impl FakeNotifier {
    fn rejections(&self) -> Vec<(RoleOperation, Option<RoleId>, AppError)> {
        self.rejections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RoleRejectionNotifier for FakeNotifier {
    fn notify_rejected(
        &self,
        operation: RoleOperation,
        role_id: Option<&RoleId>,
        error: &AppError,
    ) {
        self.rejections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((operation, role_id.cloned(), error.clone()));
    }
}

struct FakeMemberCounts {
    counts: HashMap<RoleId, u32>,
}

impl MemberCountProvider for FakeMemberCounts {
    fn member_count(&self, role_id: &RoleId) -> u32 {
        self.counts.get(role_id).copied().unwrap_or(0)
    }
}

fn no_members() -> FakeMemberCounts {
    FakeMemberCounts {
        counts: HashMap::new(),
    }
}

fn role_id(value: &str) -> RoleId {
    RoleId::parse(value).unwrap_or_else(|_| unreachable!())
}

fn seeded_role(
    id: &str,
    name: &str,
    permissions: Vec<Permission>,
    member_count: u32,
    is_system_role: bool,
) -> Role {
    let created_at = Utc
        .with_ymd_and_hms(2023, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| unreachable!());
    Role::restore(RoleSnapshot {
        id: role_id(id),
        name: name.to_owned(),
        description: format!("{name} role"),
        permissions,
        member_count,
        is_system_role,
        created_at,
        updated_at: created_at,
    })
    .unwrap_or_else(|_| unreachable!())
}

fn seeded_store() -> (RoleStore, Arc<FakeNotifier>) {
    let notifier = Arc::new(FakeNotifier::default());
    let store = RoleStore::new(
        vec![
            seeded_role("1", "Administrator", Permission::all().to_vec(), 2, true),
            seeded_role(
                "2",
                "Treasurer",
                vec![Permission::FinancialView, Permission::ReportsView],
                1,
                false,
            ),
            seeded_role("3", "Clerk", vec![Permission::MembersView], 0, false),
        ],
        notifier.clone(),
    )
    .unwrap_or_else(|_| unreachable!());
    (store, notifier)
}

fn input(name: &str, permission_ids: &[&str]) -> RoleInput {
    RoleInput {
        name: name.to_owned(),
        description: format!("{name} duties"),
        permission_ids: permission_ids.iter().map(|id| (*id).to_owned()).collect(),
    }
}

#[test]
fn snapshot_with_duplicate_ids_is_rejected() {
    let result = RoleStore::new(
        vec![
            seeded_role("1", "Administrator", Vec::new(), 0, true),
            seeded_role("1", "Shadow", Vec::new(), 0, false),
        ],
        Arc::new(FakeNotifier::default()),
    );

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[test]
fn create_role_appends_unassigned_custom_role() {
    let (mut store, notifier) = seeded_store();

    let created = store.create_role(input(
        "Loan Officer",
        &["financial:loans", "members:view", "financial:loans"],
    ));

    assert!(created.is_ok());
    let created = created.unwrap_or_else(|_| unreachable!());
    assert!(!created.is_system_role());
    assert_eq!(created.member_count(), 0);
    assert_eq!(created.permission_count(), 2);
    assert_eq!(created.created_at(), created.updated_at());
    assert_eq!(store.list_roles().last(), Some(&created));
    assert_eq!(store.list_roles().len(), 4);
    assert!(notifier.rejections().is_empty());
}

#[test]
fn create_role_generates_distinct_ids() {
    let (mut store, _) = seeded_store();

    let first = store.create_role(input("Auditor", &[]));
    let second = store.create_role(input("Auditor", &[]));

    assert!(first.is_ok() && second.is_ok());
    assert_ne!(
        first.map(|role| role.id().clone()).ok(),
        second.map(|role| role.id().clone()).ok()
    );
}

#[test]
fn create_role_with_unknown_permission_is_rejected_without_changes() {
    let (mut store, notifier) = seeded_store();
    let before = store.list_roles().to_vec();

    let result = store.create_role(input("Auditor", &["members:view", "members:archive"]));

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(store.list_roles(), before.as_slice());
    let rejections = notifier.rejections();
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].0, RoleOperation::Create);
    assert_eq!(rejections[0].1, None);
}

#[test]
fn create_role_with_blank_name_is_rejected() {
    let (mut store, _) = seeded_store();

    let result = store.create_role(input("  ", &["members:view"]));

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(store.list_roles().len(), 3);
}

#[test]
fn update_role_replaces_form_fields_only() {
    let (mut store, _) = seeded_store();
    let treasurer = role_id("2");

    let updated = store.update_role(
        &treasurer,
        input("Chief Treasurer", &["financial:view", "financial:approve"]),
    );

    assert!(updated.is_ok());
    let updated = updated.unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.id(), &treasurer);
    assert_eq!(updated.name().as_str(), "Chief Treasurer");
    assert_eq!(updated.description(), "Chief Treasurer duties");
    assert!(updated.has_permission(Permission::FinancialApprove));
    assert!(!updated.has_permission(Permission::ReportsView));
    assert_eq!(updated.member_count(), 1);
    assert!(!updated.is_system_role());
    assert!(updated.updated_at() > updated.created_at());
    assert_eq!(store.find_role(&treasurer), Some(&updated));
}

#[test]
fn update_of_system_role_is_protected_and_changes_nothing() {
    let (mut store, notifier) = seeded_store();
    let administrator = role_id("1");
    let before = store.find_role(&administrator).cloned();

    let result = store.update_role(&administrator, input("Root", &["members:view"]));

    assert!(matches!(result, Err(AppError::ProtectedEntity(_))));
    assert_eq!(store.find_role(&administrator).cloned(), before);
    let rejections = notifier.rejections();
    assert_eq!(rejections.len(), 1);
    assert_eq!(rejections[0].0, RoleOperation::Update);
    assert_eq!(rejections[0].1.as_ref(), Some(&administrator));
}

#[test]
fn update_of_system_role_reports_protection_before_bad_permissions() {
    let (mut store, _) = seeded_store();

    let result = store.update_role(&role_id("1"), input("Root", &["nope"]));

    assert!(matches!(result, Err(AppError::ProtectedEntity(_))));
}

#[test]
fn update_of_missing_role_is_not_found() {
    let (mut store, _) = seeded_store();

    let result = store.update_role(&role_id("404"), input("Ghost", &[]));

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[test]
fn update_with_unknown_permission_keeps_previous_grants() {
    let (mut store, _) = seeded_store();
    let clerk = role_id("3");
    let before = store.find_role(&clerk).cloned();

    let result = store.update_role(&clerk, input("Clerk", &["reports:print"]));

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(store.find_role(&clerk).cloned(), before);
}

#[test]
fn delete_custom_role_without_members_removes_it() {
    let (mut store, notifier) = seeded_store();
    let clerk = role_id("3");

    let result = store.delete_role(&clerk, &no_members());

    assert!(result.is_ok());
    assert!(store.find_role(&clerk).is_none());
    assert_eq!(store.list_roles().len(), 2);
    assert!(notifier.rejections().is_empty());
}

#[test]
fn delete_role_with_members_has_dependents_until_counts_refresh() {
    let (mut store, notifier) = seeded_store();
    let treasurer = role_id("2");

    let rejected = store.delete_role(&treasurer, &no_members());
    assert!(matches!(rejected, Err(AppError::HasDependents(_))));
    assert!(store.find_role(&treasurer).is_some());
    assert_eq!(notifier.rejections()[0].0, RoleOperation::Delete);

    store.refresh_member_counts(&no_members());
    let accepted = store.delete_role(&treasurer, &no_members());

    assert!(accepted.is_ok());
    assert!(
        store
            .list_roles()
            .iter()
            .all(|role| role.id() != &treasurer)
    );
}

#[test]
fn delete_counts_assignments_made_after_last_refresh() {
    let (mut store, notifier) = seeded_store();
    let clerk = role_id("3");
    store.refresh_member_counts(&no_members());
    let assigned = FakeMemberCounts {
        counts: HashMap::from([(clerk.clone(), 1)]),
    };

    let result = store.delete_role(&clerk, &assigned);

    assert!(matches!(result, Err(AppError::HasDependents(_))));
    assert!(store.find_role(&clerk).is_some());
    assert_eq!(notifier.rejections().len(), 1);
    assert!(
        store
            .role_actions(&clerk, &assigned)
            .is_ok_and(|actions| !actions.can_delete)
    );
}

#[test]
fn delete_system_role_is_protected() {
    let (mut store, _) = seeded_store();

    let result = store.delete_role(&role_id("1"), &no_members());

    assert!(matches!(result, Err(AppError::ProtectedEntity(_))));
    assert_eq!(store.list_roles().len(), 3);
}

#[test]
fn delete_missing_role_is_not_found() {
    let (mut store, notifier) = seeded_store();

    let result = store.delete_role(&role_id("99"), &no_members());

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(notifier.rejections().len(), 1);
}

#[test]
fn duplicate_role_creates_unassigned_custom_copy() {
    let (mut store, _) = seeded_store();
    let administrator = role_id("1");

    let copy = store.duplicate_role(&administrator);

    assert!(copy.is_ok());
    let copy = copy.unwrap_or_else(|_| unreachable!());
    let source = store
        .find_role(&administrator)
        .cloned()
        .unwrap_or_else(|| unreachable!());
    assert_eq!(copy.name().as_str(), "Administrator (Copy)");
    assert_eq!(copy.description(), source.description());
    assert_eq!(copy.permissions(), source.permissions());
    assert_eq!(copy.member_count(), 0);
    assert!(!copy.is_system_role());
    assert_ne!(copy.id(), source.id());
    assert_eq!(store.list_roles().last(), Some(&copy));
}

#[test]
fn duplicate_of_missing_role_is_not_found() {
    let (mut store, notifier) = seeded_store();

    let result = store.duplicate_role(&role_id("404"));

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.list_roles().len(), 3);
    assert_eq!(notifier.rejections()[0].0, RoleOperation::Duplicate);
}

#[test]
fn refresh_member_counts_does_not_touch_updated_at() {
    let (mut store, _) = seeded_store();
    let clerk = role_id("3");
    let updated_at = store.find_role(&clerk).map(Role::updated_at);

    store.refresh_member_counts(&FakeMemberCounts {
        counts: HashMap::from([(clerk.clone(), 7)]),
    });

    let refreshed = store.find_role(&clerk);
    assert_eq!(refreshed.map(Role::member_count), Some(7));
    assert_eq!(refreshed.map(Role::updated_at), updated_at);
}

#[test]
fn role_stats_aggregate_over_roles() {
    let (store, _) = seeded_store();

    // (15 + 2 + 1) / 3 = 6
    assert_eq!(
        store.role_stats(),
        RoleStats {
            total_roles: 3,
            custom_roles: 2,
            total_members: 3,
            avg_permissions: 6,
        }
    );
}

#[test]
fn role_stats_round_half_up() {
    let notifier = Arc::new(FakeNotifier::default());
    let store = RoleStore::new(
        vec![
            seeded_role("a", "One", vec![Permission::MembersView], 0, false),
            seeded_role(
                "b",
                "Two",
                vec![Permission::MembersView, Permission::ReportsView],
                0,
                false,
            ),
        ],
        notifier,
    )
    .unwrap_or_else(|_| unreachable!());

    assert_eq!(store.role_stats().avg_permissions, 2);
}

#[test]
fn role_stats_of_empty_store_are_zero() {
    let store = RoleStore::empty(Arc::new(FakeNotifier::default()));

    assert_eq!(
        store.role_stats(),
        RoleStats {
            total_roles: 0,
            custom_roles: 0,
            total_members: 0,
            avg_permissions: 0,
        }
    );
}

#[test]
fn role_actions_follow_protection_rules() {
    let (store, _) = seeded_store();

    let members = no_members();
    let administrator = store.role_actions(&role_id("1"), &members);
    let treasurer = store.role_actions(&role_id("2"), &members);
    let clerk = store.role_actions(&role_id("3"), &members);

    assert!(administrator.is_ok_and(|actions| !actions.can_edit && !actions.can_delete));
    assert!(treasurer.is_ok_and(|actions| actions.can_edit && !actions.can_delete));
    assert!(clerk.is_ok_and(|actions| actions.can_edit && actions.can_delete));
    assert!(matches!(
        store.role_actions(&role_id("404"), &members),
        Err(AppError::NotFound(_))
    ));
}

#[test]
fn catalog_is_grouped_in_category_order() {
    let (store, _) = seeded_store();

    let grouped = store.permissions_by_category();

    assert_eq!(
        grouped.keys().copied().collect::<Vec<_>>(),
        PermissionCategory::all().to_vec()
    );
    assert_eq!(store.list_permissions().len(), 15);
}

#[test]
fn draft_submission_round_trips_through_store() {
    let (mut store, _) = seeded_store();
    let mut draft = RoleDraft::new();
    draft.set_name("Bookkeeper");
    draft.toggle_all_in_category(PermissionCategory::Financial);
    draft.toggle_permission(Permission::ReportsView);

    let created = store.create_role(RoleInput::from_draft(&draft));

    assert!(created.is_ok_and(|role| role.permissions() == draft.selected()));
}
