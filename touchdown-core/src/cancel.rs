//! Cooperative cancellation.
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A flag checked by the [`EpisodeLoop`](crate::EpisodeLoop) once per tick.
///
/// Clones share the flag, so a renderer or another thread can stop the loop.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Constructs a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the loop to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once [`CancelToken::cancel`] was called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }
}
