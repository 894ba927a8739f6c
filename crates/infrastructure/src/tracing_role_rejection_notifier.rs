//! Rejection notifier that reports refused role operations as log warnings.

use coopdesk_application::{RoleOperation, RoleRejectionNotifier};
use coopdesk_core::AppError;
use coopdesk_domain::RoleId;
use tracing::{error, warn};

/// Notifier that emits one structured `tracing` event per rejection.
///
/// User-facing rejections are logged at warn level, internal failures at
/// error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRoleRejectionNotifier;

impl TracingRoleRejectionNotifier {
    /// Creates a new tracing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RoleRejectionNotifier for TracingRoleRejectionNotifier {
    fn notify_rejected(
        &self,
        operation: RoleOperation,
        role_id: Option<&RoleId>,
        error: &AppError,
    ) {
        let role_id = role_id.map(RoleId::as_str);

        if error.is_user_facing() {
            warn!(
                operation = operation.as_str(),
                role_id,
                reason = error.message(),
                "role {} rejected: {}",
                operation.as_str(),
                error.message()
            );
        } else {
            error!(
                operation = operation.as_str(),
                role_id,
                error = %error,
                "role operation failed"
            );
        }
    }
}
