use std::collections::BTreeMap;
use std::str::FromStr;

use coopdesk_core::AppError;
use serde::{Deserialize, Serialize};

/// Fixed grouping used for bulk selection and display of permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionCategory {
    /// Member registry access.
    Members,
    /// Transactions, approvals and loans.
    Financial,
    /// Standard and custom reports.
    Reports,
    /// Cooperative settings.
    Settings,
    /// System administration.
    System,
}

impl PermissionCategory {
    /// Returns a stable storage value for this category.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::Financial => "financial",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::System => "system",
        }
    }

    /// Returns all categories in display order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[PermissionCategory] = &[
            PermissionCategory::Members,
            PermissionCategory::Financial,
            PermissionCategory::Reports,
            PermissionCategory::Settings,
            PermissionCategory::System,
        ];

        ALL
    }

    /// Returns the catalog permissions that belong to this category.
    pub fn permissions(self) -> impl Iterator<Item = Permission> {
        Permission::all()
            .iter()
            .copied()
            .filter(move |permission| permission.category() == self)
    }
}

impl FromStr for PermissionCategory {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|category| category.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission category '{value}'")))
    }
}

/// Capability grants that can be bundled into roles.
///
/// Declaration order is the canonical catalog order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    /// View member profiles and information.
    #[serde(rename = "members:view")]
    MembersView,
    /// Register new members.
    #[serde(rename = "members:create")]
    MembersCreate,
    /// Update member information.
    #[serde(rename = "members:edit")]
    MembersEdit,
    /// Remove members from system.
    #[serde(rename = "members:delete")]
    MembersDelete,
    /// Access financial reports and transactions.
    #[serde(rename = "financial:view")]
    FinancialView,
    /// Record new financial transactions.
    #[serde(rename = "financial:create")]
    FinancialCreate,
    /// Approve pending transactions.
    #[serde(rename = "financial:approve")]
    FinancialApprove,
    /// Process loan applications and disbursements.
    #[serde(rename = "financial:loans")]
    FinancialLoans,
    /// Access standard reports.
    #[serde(rename = "reports:view")]
    ReportsView,
    /// Generate custom reports.
    #[serde(rename = "reports:create")]
    ReportsCreate,
    /// Export reports to various formats.
    #[serde(rename = "reports:export")]
    ReportsExport,
    /// Access system settings.
    #[serde(rename = "settings:view")]
    SettingsView,
    /// Modify system configuration.
    #[serde(rename = "settings:edit")]
    SettingsEdit,
    /// Full system administration access.
    #[serde(rename = "system:admin")]
    SystemAdmin,
    /// Create and restore system backups.
    #[serde(rename = "system:backup")]
    SystemBackup,
}

impl Permission {
    /// Returns the stable token for this permission, e.g. `members:view`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MembersView => "members:view",
            Self::MembersCreate => "members:create",
            Self::MembersEdit => "members:edit",
            Self::MembersDelete => "members:delete",
            Self::FinancialView => "financial:view",
            Self::FinancialCreate => "financial:create",
            Self::FinancialApprove => "financial:approve",
            Self::FinancialLoans => "financial:loans",
            Self::ReportsView => "reports:view",
            Self::ReportsCreate => "reports:create",
            Self::ReportsExport => "reports:export",
            Self::SettingsView => "settings:view",
            Self::SettingsEdit => "settings:edit",
            Self::SystemAdmin => "system:admin",
            Self::SystemBackup => "system:backup",
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::MembersView => "View Members",
            Self::MembersCreate => "Add Members",
            Self::MembersEdit => "Edit Members",
            Self::MembersDelete => "Delete Members",
            Self::FinancialView => "View Financial Data",
            Self::FinancialCreate => "Create Transactions",
            Self::FinancialApprove => "Approve Transactions",
            Self::FinancialLoans => "Manage Loans",
            Self::ReportsView => "View Reports",
            Self::ReportsCreate => "Create Reports",
            Self::ReportsExport => "Export Reports",
            Self::SettingsView => "View Settings",
            Self::SettingsEdit => "Edit Settings",
            Self::SystemAdmin => "System Administration",
            Self::SystemBackup => "System Backup",
        }
    }

    /// Returns the long-form description.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::MembersView => "View member profiles and information",
            Self::MembersCreate => "Register new members",
            Self::MembersEdit => "Update member information",
            Self::MembersDelete => "Remove members from system",
            Self::FinancialView => "Access financial reports and transactions",
            Self::FinancialCreate => "Record new financial transactions",
            Self::FinancialApprove => "Approve pending transactions",
            Self::FinancialLoans => "Process loan applications and disbursements",
            Self::ReportsView => "Access standard reports",
            Self::ReportsCreate => "Generate custom reports",
            Self::ReportsExport => "Export reports to various formats",
            Self::SettingsView => "Access system settings",
            Self::SettingsEdit => "Modify system configuration",
            Self::SystemAdmin => "Full system administration access",
            Self::SystemBackup => "Create and restore system backups",
        }
    }

    /// Returns the category this permission is grouped under.
    #[must_use]
    pub fn category(&self) -> PermissionCategory {
        match self {
            Self::MembersView | Self::MembersCreate | Self::MembersEdit | Self::MembersDelete => {
                PermissionCategory::Members
            }
            Self::FinancialView
            | Self::FinancialCreate
            | Self::FinancialApprove
            | Self::FinancialLoans => PermissionCategory::Financial,
            Self::ReportsView | Self::ReportsCreate | Self::ReportsExport => {
                PermissionCategory::Reports
            }
            Self::SettingsView | Self::SettingsEdit => PermissionCategory::Settings,
            Self::SystemAdmin | Self::SystemBackup => PermissionCategory::System,
        }
    }

    /// Returns the full static catalog in canonical order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::MembersView,
            Permission::MembersCreate,
            Permission::MembersEdit,
            Permission::MembersDelete,
            Permission::FinancialView,
            Permission::FinancialCreate,
            Permission::FinancialApprove,
            Permission::FinancialLoans,
            Permission::ReportsView,
            Permission::ReportsCreate,
            Permission::ReportsExport,
            Permission::SettingsView,
            Permission::SettingsEdit,
            Permission::SystemAdmin,
            Permission::SystemBackup,
        ];

        ALL
    }

    /// Parses a transport value into a permission.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|permission| permission.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown permission '{value}'")))
    }
}

/// Groups permissions by category, preserving catalog order inside each group.
///
/// Categories without any permission are omitted.
pub fn group_by_category(
    permissions: impl IntoIterator<Item = Permission>,
) -> BTreeMap<PermissionCategory, Vec<Permission>> {
    let mut grouped: BTreeMap<PermissionCategory, Vec<Permission>> = BTreeMap::new();
    for permission in permissions {
        grouped
            .entry(permission.category())
            .or_default()
            .push(permission);
    }

    for group in grouped.values_mut() {
        group.sort_unstable();
        group.dedup();
    }

    grouped
}
