use std::collections::HashSet;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use coopdesk_core::{AppError, AppResult};
use coopdesk_domain::{
    Member, MemberId, MemberRegistration, MemberStatus, MemberUpdate, MembershipType, RoleId,
};

use crate::role_ports::MemberCountProvider;


/// Member list filter. `None` fields match every member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberFilter {
    /// Lifecycle status to keep.
    pub status: Option<MemberStatus>,
    /// Membership tier to keep.
    pub membership_type: Option<MembershipType>,
    /// Case-insensitive needle over names, email and member number.
    pub search: Option<String>,
}

impl MemberFilter {
    fn matches(&self, member: &Member) -> bool {
        self.status.is_none_or(|status| member.status() == status)
            && self
                .membership_type
                .is_none_or(|membership_type| member.membership_type() == membership_type)
            && self
                .search
                .as_deref()
                .is_none_or(|needle| member.matches_search(needle))
    }
}

/// Aggregate member statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberStats {
    /// Number of members.
    pub total_members: usize,
    /// Number of active members.
    pub active_members: usize,
    /// Sum of share contributions.
    pub total_contributions: u64,
    /// Sum of savings balances.
    pub total_savings: u64,
}

/// In-memory member registry and owner of role assignments.
pub struct MemberDirectory {
    members: Vec<Member>,
    next_sequence: usize,
}

impl MemberDirectory {
    /// Creates a directory seeded with an initial snapshot.
    pub fn new(snapshot: Vec<Member>) -> AppResult<Self> {
        let mut seen = HashSet::with_capacity(snapshot.len());
        for member in &snapshot {
            if !seen.insert(member.id().clone()) {
                return Err(AppError::Conflict(format!(
                    "member id '{}' appears more than once in the snapshot",
                    member.id()
                )));
            }
        }

        // Numbers continue after the highest seeded one so deletions never
        // cause a number to be handed out twice.
        let highest_number = snapshot
            .iter()
            .filter_map(|member| member.member_number().strip_prefix("M-"))
            .filter_map(|digits| digits.parse::<usize>().ok())
            .max()
            .unwrap_or(0);

        let next_sequence = highest_number
            .max(snapshot.len())
            .checked_add(1)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "seeded member number M-{highest_number} leaves no numbers to assign"
                ))
            })?;

        Ok(Self {
            next_sequence,
            members: snapshot,
        })
    }

    /// Returns all members in insertion order.
    #[must_use]
    pub fn list_members(&self) -> &[Member] {
        self.members.as_slice()
    }

    /// Finds a member by id.
    #[must_use]
    pub fn find_member(&self, member_id: &MemberId) -> Option<&Member> {
        self.members.iter().find(|member| member.id() == member_id)
    }

    /// Returns members matching the filter in insertion order.
    #[must_use]
    pub fn filter_members(&self, filter: &MemberFilter) -> Vec<&Member> {
        self.members
            .iter()
            .filter(|member| filter.matches(member))
            .collect()
    }

    /// Registers a new active member joined today.
    pub fn add_member(&mut self, registration: MemberRegistration) -> AppResult<Member> {
        let next_sequence = self
            .next_sequence
            .checked_add(1)
            .ok_or_else(|| AppError::Conflict("member numbers are exhausted".to_owned()))?;
        let member = Member::enroll(registration, self.next_sequence, Utc::now().date_naive())?;
        self.next_sequence = next_sequence;
        self.members.push(member.clone());

        info!(
            member_id = %member.id(),
            member_number = member.member_number(),
            "member registered"
        );
        Ok(member)
    }

    /// Applies a partial update to a member.
    pub fn update_member(
        &mut self,
        member_id: &MemberId,
        update: MemberUpdate,
    ) -> AppResult<Member> {
        let member = self.member_mut(member_id)?;
        member.apply(update)?;

        info!(member_id = %member.id(), "member updated");
        Ok(member.clone())
    }

    /// Removes a member.
    pub fn delete_member(&mut self, member_id: &MemberId) -> AppResult<()> {
        let index = self
            .members
            .iter()
            .position(|member| member.id() == member_id)
            .ok_or_else(|| member_not_found(member_id))?;
        let removed = self.members.remove(index);

        info!(
            member_id = %removed.id(),
            role_id = removed.role_id().map(RoleId::as_str),
            "member deleted"
        );
        Ok(())
    }

    /// Assigns a role to a member, replacing any previous assignment.
    ///
    /// The caller checks that the role exists in the role store.
    pub fn assign_role(&mut self, member_id: &MemberId, role_id: RoleId) -> AppResult<()> {
        let member = self.member_mut(member_id)?;
        info!(member_id = %member.id(), role_id = %role_id, "role assigned to member");
        member.assign_role(role_id);
        Ok(())
    }

    /// Clears a member's role assignment, returning the previous role.
    pub fn unassign_role(&mut self, member_id: &MemberId) -> AppResult<Option<RoleId>> {
        let member = self.member_mut(member_id)?;
        let previous = member.unassign_role();
        if let Some(role_id) = &previous {
            info!(member_id = %member.id(), role_id = %role_id, "role removed from member");
        }

        Ok(previous)
    }

    /// Computes aggregate statistics over all members.
    #[must_use]
    pub fn member_stats(&self) -> MemberStats {
        MemberStats {
            total_members: self.members.len(),
            active_members: self
                .members
                .iter()
                .filter(|member| member.status() == MemberStatus::Active)
                .count(),
            total_contributions: self.members.iter().map(Member::contribution_amount).sum(),
            total_savings: self.members.iter().map(Member::savings_balance).sum(),
        }
    }

    fn member_mut(&mut self, member_id: &MemberId) -> AppResult<&mut Member> {
        self.members
            .iter_mut()
            .find(|member| member.id() == member_id)
            .ok_or_else(|| member_not_found(member_id))
    }
}

impl MemberCountProvider for MemberDirectory {
    fn member_count(&self, role_id: &RoleId) -> u32 {
        let count = self
            .members
            .iter()
            .filter(|member| member.role_id() == Some(role_id))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}

fn member_not_found(member_id: &MemberId) -> AppError {
    AppError::NotFound(format!("member '{member_id}' does not exist"))
}
