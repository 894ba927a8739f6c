//! Application services and ports.

#![forbid(unsafe_code)]

mod member_directory;
mod role_ports;
mod role_store;

pub use member_directory::{MemberDirectory, MemberFilter, MemberStats};
pub use role_ports::{
    MemberCountProvider, RoleActions, RoleInput, RoleOperation, RoleRejectionNotifier, RoleStats,
};
pub use role_store::RoleStore;
