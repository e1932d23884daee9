mod broadcaster;
mod viewer;

pub use broadcaster::*;
pub use viewer::*;

use crate::access::AccessGate;
use crate::error::{AccessDenial, SessionError};
use periscope_core::ApprovalState;

/// Shared start gate: both roles refuse to negotiate for an absent,
/// pending or rejected user.
pub(crate) async fn check_access(gate: &dyn AccessGate) -> Result<(), SessionError> {
    let Some(user) = gate.current_user().await else {
        return Err(SessionError::AccessDenied {
            reason: AccessDenial::NotSignedIn,
        });
    };

    match gate.approval_state(&user).await {
        ApprovalState::Approved => Ok(()),
        ApprovalState::Pending => Err(SessionError::AccessDenied {
            reason: AccessDenial::Pending,
        }),
        ApprovalState::Rejected => Err(SessionError::AccessDenied {
            reason: AccessDenial::Rejected,
        }),
    }
}
