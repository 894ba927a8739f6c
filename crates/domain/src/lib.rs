//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod member;
mod permission;
mod role;
mod role_draft;

pub use member::{
    EmailAddress, Member, MemberId, MemberRecord, MemberRegistration, MemberStatus, MemberUpdate,
    MembershipType, member_number,
};
pub use permission::{Permission, PermissionCategory, group_by_category};
pub use role::{DUPLICATE_ROLE_SUFFIX, Role, RoleId, RoleSnapshot};
pub use role_draft::{CategorySelection, RoleDraft};
