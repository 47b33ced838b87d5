//! Cooperative cancellation checkpoints.

use tokio_util::sync::CancellationToken;

use super::error::{ManagerError, ManagerResult};

/// Return [`ManagerError::Cancelled`] if `cancel` has been triggered.
pub(crate) fn check_cancelled(cancel: Option<&CancellationToken>) -> ManagerResult<()> {
    match cancel {
        Some(token) if token.is_cancelled() => Err(ManagerError::Cancelled),
        _ => Ok(()),
    }
}
