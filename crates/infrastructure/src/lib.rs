//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod reference_snapshot;
mod tracing_role_rejection_notifier;

pub use reference_snapshot::{reference_members, reference_roles};
pub use tracing_role_rejection_notifier::TracingRoleRejectionNotifier;
