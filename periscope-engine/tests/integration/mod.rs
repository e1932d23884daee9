pub mod driver_tests;

use periscope_core::ConnectionPhase;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Every observed transition must move the phase forward; none may
/// return toward `Idle` or leave a terminal phase.
pub fn assert_monotonic(history: &[ConnectionPhase]) {
    for pair in history.windows(2) {
        assert!(
            pair[0].can_advance_to(pair[1]),
            "non-monotonic phase transition {} -> {} in {history:?}",
            pair[0],
            pair[1],
        );
    }
}
