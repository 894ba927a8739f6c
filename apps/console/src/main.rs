//! Coopdesk console composition root.
//!
//! Seeds a role store and member directory, then prints the permission
//! catalog, roles and dashboard statistics as JSON on stdout.

#![forbid(unsafe_code)]

mod console_config;

use std::sync::Arc;

use coopdesk_application::{
    MemberCountProvider, MemberDirectory, MemberStats, RoleActions, RoleStats, RoleStore,
};
use coopdesk_core::AppError;
use coopdesk_domain::{Member, Permission, PermissionCategory, Role};
use coopdesk_infrastructure::{TracingRoleRejectionNotifier, reference_members, reference_roles};
use serde::Serialize;
use tracing::info;

use crate::console_config::{ConsoleConfig, OutputFormat, SeedMode, init_tracing};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionView {
    id: &'static str,
    name: &'static str,
    description: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionGroupView {
    category: PermissionCategory,
    permissions: Vec<PermissionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoleView<'a> {
    #[serde(flatten)]
    role: &'a Role,
    actions: RoleActions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardView<'a> {
    permission_groups: Vec<PermissionGroupView>,
    roles: Vec<RoleView<'a>>,
    role_stats: RoleStats,
    members: Vec<&'a Member>,
    member_stats: MemberStats,
}

fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let (roles, members) = match config.seed_mode {
        SeedMode::Reference => (reference_roles()?, reference_members()?),
        SeedMode::Empty => (Vec::new(), Vec::new()),
    };

    let role_store = RoleStore::new(roles, Arc::new(TracingRoleRejectionNotifier::new()))?;
    let member_directory = MemberDirectory::new(members)?;

    info!(
        seed_mode = ?config.seed_mode,
        role_count = role_store.list_roles().len(),
        member_count = member_directory.list_members().len(),
        "coopdesk-console session seeded"
    );

    let view = DashboardView {
        permission_groups: role_store
            .permissions_by_category()
            .into_iter()
            .filter(|(category, _)| {
                config
                    .permission_category
                    .is_none_or(|selected| selected == *category)
            })
            .map(|(category, permissions)| PermissionGroupView {
                category,
                permissions: permissions.iter().map(permission_view).collect(),
            })
            .collect(),
        roles: role_store
            .list_roles()
            .iter()
            .map(|role| RoleView {
                role,
                actions: RoleActions::for_role(role, member_directory.member_count(role.id())),
            })
            .collect(),
        role_stats: role_store.role_stats(),
        members: member_directory.filter_members(&config.member_filter),
        member_stats: member_directory.member_stats(),
    };

    let rendered = match config.output_format {
        OutputFormat::Pretty => serde_json::to_string_pretty(&view),
        OutputFormat::Compact => serde_json::to_string(&view),
    }
    .map_err(|error| AppError::Internal(format!("failed to render dashboard: {error}")))?;

    println!("{rendered}");
    Ok(())
}

fn permission_view(permission: &Permission) -> PermissionView {
    PermissionView {
        id: permission.as_str(),
        name: permission.name(),
        description: permission.description(),
    }
}
