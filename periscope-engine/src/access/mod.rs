use async_trait::async_trait;
use periscope_core::{ApprovalState, User, UserId};

/// External authorization check consulted before a session may start.
///
/// The actual account store and admin approval list live outside this
/// crate; drivers only ask two questions and act on the answers.
#[async_trait]
pub trait AccessGate: Send + Sync {
    async fn current_user(&self) -> Option<User>;

    async fn approval_state(&self, user: &User) -> ApprovalState;
}

/// Gate that lets everyone through. For tests and single-machine use.
pub struct OpenGate;

#[async_trait]
impl AccessGate for OpenGate {
    async fn current_user(&self) -> Option<User> {
        Some(User {
            id: UserId::new(),
            email: "local@periscope".into(),
        })
    }

    async fn approval_state(&self, _user: &User) -> ApprovalState {
        ApprovalState::Approved
    }
}
