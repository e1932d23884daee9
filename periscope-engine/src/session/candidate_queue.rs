use periscope_core::CandidateInit;
use std::collections::VecDeque;

/// Buffers remote candidates that arrived before the remote description.
///
/// Strict FIFO: items come back out in arrival order, never reordered or
/// deduplicated. Unbounded; growth is capped in practice by the session's
/// negotiation timeout.
#[derive(Default)]
pub struct CandidateQueue {
    items: VecDeque<CandidateInit>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, candidate: CandidateInit) {
        self.items.push_back(candidate);
    }

    /// Remove and return everything in arrival order when `ready`;
    /// otherwise a no-op returning nothing.
    pub fn drain_if_ready(&mut self, ready: bool) -> Vec<CandidateInit> {
        if !ready {
            return Vec::new();
        }
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
