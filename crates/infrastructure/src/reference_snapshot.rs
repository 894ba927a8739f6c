//! Reference roles and members a fresh dashboard session starts with.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use coopdesk_core::{AppError, AppResult};
use coopdesk_domain::{
    Member, MemberId, MemberRecord, MemberStatus, MembershipType, Permission, PermissionCategory,
    Role, RoleId, RoleSnapshot,
};


/// Returns the four reference roles: Administrator, Treasurer, Secretary and
/// Member.
pub fn reference_roles() -> AppResult<Vec<Role>> {
    let treasurer_permissions = Permission::all()
        .iter()
        .copied()
        .filter(|permission| {
            matches!(
                permission.category(),
                PermissionCategory::Financial | PermissionCategory::Reports
            ) || *permission == Permission::MembersView
        })
        .collect();
    let secretary_permissions = Permission::all()
        .iter()
        .copied()
        .filter(|permission| {
            permission.category() == PermissionCategory::Members
                || *permission == Permission::ReportsView
        })
        .collect();

    [
        RoleSnapshot {
            id: RoleId::parse("1")?,
            name: "Administrator".to_owned(),
            description: "Full system access with all permissions".to_owned(),
            permissions: Permission::all().to_vec(),
            member_count: 2,
            is_system_role: true,
            created_at: utc_date(2023, 1, 1)?,
            updated_at: utc_date(2023, 1, 1)?,
        },
        RoleSnapshot {
            id: RoleId::parse("2")?,
            name: "Treasurer".to_owned(),
            description: "Financial management and reporting access".to_owned(),
            permissions: treasurer_permissions,
            member_count: 1,
            is_system_role: false,
            created_at: utc_date(2023, 1, 15)?,
            updated_at: utc_date(2023, 2, 10)?,
        },
        RoleSnapshot {
            id: RoleId::parse("3")?,
            name: "Secretary".to_owned(),
            description: "Member management and basic reporting".to_owned(),
            permissions: secretary_permissions,
            member_count: 1,
            is_system_role: false,
            created_at: utc_date(2023, 1, 20)?,
            updated_at: utc_date(2023, 1, 20)?,
        },
        RoleSnapshot {
            id: RoleId::parse("4")?,
            name: "Member".to_owned(),
            description: "Basic member access with view-only permissions".to_owned(),
            permissions: vec![Permission::MembersView, Permission::ReportsView],
            member_count: 15,
            is_system_role: true,
            created_at: utc_date(2023, 1, 1)?,
            updated_at: utc_date(2023, 1, 1)?,
        },
    ]
    .into_iter()
    .map(Role::restore)
    .collect()
}

/// Returns the three reference member records. None of them carries a role
/// assignment, so the seeded role member counts stand on their own.
pub fn reference_members() -> AppResult<Vec<Member>> {
    [
        MemberRecord {
            id: MemberId::parse("1")?,
            member_number: "M-001".to_owned(),
            first_name: "Juan".to_owned(),
            last_name: "Dela Cruz".to_owned(),
            email: "juan.delacruz@example.com".to_owned(),
            phone: "+63-912-345-6789".to_owned(),
            address: "123 Main St, Manila, Philippines".to_owned(),
            date_joined: naive_date(2023, 1, 15)?,
            status: MemberStatus::Active,
            membership_type: MembershipType::Regular,
            contribution_amount: 5000,
            loan_balance: 25000,
            savings_balance: 15000,
            role_id: None,
        },
        MemberRecord {
            id: MemberId::parse("2")?,
            member_number: "M-002".to_owned(),
            first_name: "Maria".to_owned(),
            last_name: "Santos".to_owned(),
            email: "maria.santos@example.com".to_owned(),
            phone: "+63-923-456-7890".to_owned(),
            address: "456 Oak Ave, Quezon City, Philippines".to_owned(),
            date_joined: naive_date(2023, 2, 20)?,
            status: MemberStatus::Active,
            membership_type: MembershipType::Premium,
            contribution_amount: 10000,
            loan_balance: 50000,
            savings_balance: 35000,
            role_id: None,
        },
        MemberRecord {
            id: MemberId::parse("3")?,
            member_number: "M-003".to_owned(),
            first_name: "Pedro".to_owned(),
            last_name: "Reyes".to_owned(),
            email: "pedro.reyes@example.com".to_owned(),
            phone: "+63-934-567-8901".to_owned(),
            address: "789 Pine St, Makati, Philippines".to_owned(),
            date_joined: naive_date(2023, 3, 10)?,
            status: MemberStatus::Inactive,
            membership_type: MembershipType::Associate,
            contribution_amount: 3000,
            loan_balance: 0,
            savings_balance: 8000,
            role_id: None,
        },
    ]
    .into_iter()
    .map(Member::restore)
    .collect()
}

fn naive_date(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::Internal(format!("invalid date {year}-{month}-{day}")))
}

fn utc_date(year: i32, month: u32, day: u32) -> AppResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::Internal(format!("invalid date {year}-{month}-{day}")))
}
