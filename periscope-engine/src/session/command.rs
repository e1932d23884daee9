/// Commands a role driver can send into a running session.
#[derive(Debug)]
pub enum SessionCommand {
    /// Tear the session down: close the transport and release the
    /// candidate queue. Safe from any phase.
    Stop,
}
