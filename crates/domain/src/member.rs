//! Cooperative member records.
//!
//! Members own the role assignment that the role store reads back as the
//! denormalized per-role member count.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDate;
use coopdesk_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::RoleId;

/// Unique identifier for a member record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(String);

impl MemberId {
    /// Creates a new random member identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wraps an existing identifier, rejecting blank values.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "member id must not be empty".to_owned(),
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

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for MemberId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated, lowercased email address.
    ///
    /// Requires exactly one `@`, a non-empty local part and a dotted domain.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        };

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.contains('@') {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Membership lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    /// Member in good standing.
    Active,
    /// Dormant membership.
    Inactive,
    /// Membership suspended by the board.
    Suspended,
}

impl MemberStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            _ => Err(AppError::Validation(format!(
                "unknown member status '{value}'"
            ))),
        }
    }
}

/// Membership tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipType {
    /// Standard voting member.
    Regular,
    /// Non-voting associate.
    Associate,
    /// Premium tier.
    Premium,
}

impl MembershipType {
    /// Returns a stable storage value for this membership type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Associate => "associate",
            Self::Premium => "premium",
        }
    }
}

impl FromStr for MembershipType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "regular" => Ok(Self::Regular),
            "associate" => Ok(Self::Associate),
            "premium" => Ok(Self::Premium),
            _ => Err(AppError::Validation(format!(
                "unknown membership type '{value}'"
            ))),
        }
    }
}

/// Formats the display member number for a 1-based sequence, e.g. `M-007`.
#[must_use]
pub fn member_number(sequence: usize) -> String {
    format!("M-{sequence:03}")
}

/// Registration form payload for a new member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRegistration {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Postal address.
    pub address: String,
    /// Membership tier.
    pub membership_type: MembershipType,
    /// Initial share contribution.
    pub contribution_amount: u64,
}

/// Complete member state used to restore records from a seed snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRecord {
    /// Stable member identifier.
    pub id: MemberId,
    /// Display member number.
    pub member_number: String,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Postal address.
    pub address: String,
    /// Date the member joined.
    pub date_joined: NaiveDate,
    /// Lifecycle status.
    pub status: MemberStatus,
    /// Membership tier.
    pub membership_type: MembershipType,
    /// Share contribution.
    pub contribution_amount: u64,
    /// Outstanding loan balance.
    pub loan_balance: u64,
    /// Savings balance.
    pub savings_balance: u64,
    /// Assigned role, if any.
    pub role_id: Option<RoleId>,
}

/// Partial update applied to an existing member. `None` keeps the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberUpdate {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New contact phone.
    pub phone: Option<String>,
    /// New postal address.
    pub address: Option<String>,
    /// New lifecycle status.
    pub status: Option<MemberStatus>,
    /// New membership tier.
    pub membership_type: Option<MembershipType>,
    /// New share contribution.
    pub contribution_amount: Option<u64>,
    /// New loan balance.
    pub loan_balance: Option<u64>,
    /// New savings balance.
    pub savings_balance: Option<u64>,
}

/// Cooperative member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    id: MemberId,
    member_number: NonEmptyString,
    first_name: NonEmptyString,
    last_name: NonEmptyString,
    email: EmailAddress,
    phone: String,
    address: String,
    date_joined: NaiveDate,
    status: MemberStatus,
    membership_type: MembershipType,
    contribution_amount: u64,
    loan_balance: u64,
    savings_balance: u64,
    role_id: Option<RoleId>,
}

impl Member {
    /// Enrolls a new active member whose savings start at the contribution.
    pub fn enroll(
        registration: MemberRegistration,
        sequence: usize,
        date_joined: NaiveDate,
    ) -> AppResult<Self> {
        Self::restore(MemberRecord {
            id: MemberId::new(),
            member_number: member_number(sequence),
            first_name: registration.first_name,
            last_name: registration.last_name,
            email: registration.email,
            phone: registration.phone,
            address: registration.address,
            date_joined,
            status: MemberStatus::Active,
            membership_type: registration.membership_type,
            contribution_amount: registration.contribution_amount,
            loan_balance: 0,
            savings_balance: registration.contribution_amount,
            role_id: None,
        })
    }

    /// Restores a member from snapshot state.
    pub fn restore(record: MemberRecord) -> AppResult<Self> {
        Ok(Self {
            id: record.id,
            member_number: NonEmptyString::new(record.member_number)?,
            first_name: NonEmptyString::new(record.first_name)?,
            last_name: NonEmptyString::new(record.last_name)?,
            email: EmailAddress::new(record.email)?,
            phone: record.phone.trim().to_owned(),
            address: record.address.trim().to_owned(),
            date_joined: record.date_joined,
            status: record.status,
            membership_type: record.membership_type,
            contribution_amount: record.contribution_amount,
            loan_balance: record.loan_balance,
            savings_balance: record.savings_balance,
            role_id: record.role_id,
        })
    }

    /// Applies a partial update atomically.
    ///
    /// Either every provided field validates and is applied, or nothing changes.
    pub fn apply(&mut self, update: MemberUpdate) -> AppResult<()> {
        let first_name = update.first_name.map(NonEmptyString::new).transpose()?;
        let last_name = update.last_name.map(NonEmptyString::new).transpose()?;
        let email = update.email.map(EmailAddress::new).transpose()?;

        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(phone) = update.phone {
            self.phone = phone.trim().to_owned();
        }
        if let Some(address) = update.address {
            self.address = address.trim().to_owned();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(membership_type) = update.membership_type {
            self.membership_type = membership_type;
        }
        if let Some(contribution_amount) = update.contribution_amount {
            self.contribution_amount = contribution_amount;
        }
        if let Some(loan_balance) = update.loan_balance {
            self.loan_balance = loan_balance;
        }
        if let Some(savings_balance) = update.savings_balance {
            self.savings_balance = savings_balance;
        }

        Ok(())
    }

    /// Returns true when the lowercased needle occurs in the name, email or
    /// member number. An empty needle matches everything.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.member_number.as_str(),
        ]
        .iter()
        .any(|value| value.to_lowercase().contains(needle.as_str()))
    }

    /// Assigns a role, replacing any previous assignment.
    pub fn assign_role(&mut self, role_id: RoleId) {
        self.role_id = Some(role_id);
    }

    /// Clears the role assignment and returns the previous one.
    pub fn unassign_role(&mut self) -> Option<RoleId> {
        self.role_id.take()
    }

    /// Returns the member identifier.
    #[must_use]
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Returns the display member number.
    #[must_use]
    pub fn member_number(&self) -> &str {
        self.member_number.as_str()
    }

    /// Returns the given name.
    #[must_use]
    pub fn first_name(&self) -> &str {
        self.first_name.as_str()
    }

    /// Returns the family name.
    #[must_use]
    pub fn last_name(&self) -> &str {
        self.last_name.as_str()
    }

    /// Returns the contact email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the contact phone.
    #[must_use]
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }

    /// Returns the postal address.
    #[must_use]
    pub fn address(&self) -> &str {
        self.address.as_str()
    }

    /// Returns the join date.
    #[must_use]
    pub fn date_joined(&self) -> NaiveDate {
        self.date_joined
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> MemberStatus {
        self.status
    }

    /// Returns the membership tier.
    #[must_use]
    pub fn membership_type(&self) -> MembershipType {
        self.membership_type
    }

    /// Returns the share contribution.
    #[must_use]
    pub fn contribution_amount(&self) -> u64 {
        self.contribution_amount
    }

    /// Returns the outstanding loan balance.
    #[must_use]
    pub fn loan_balance(&self) -> u64 {
        self.loan_balance
    }

    /// Returns the savings balance.
    #[must_use]
    pub fn savings_balance(&self) -> u64 {
        self.savings_balance
    }

    /// Returns the assigned role, if any.
    #[must_use]
    pub fn role_id(&self) -> Option<&RoleId> {
        self.role_id.as_ref()
    }
}
