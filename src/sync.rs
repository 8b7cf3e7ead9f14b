//! Cooperative cancellation for document resolution.
//!
//! Resolution state is either immutable after load (the model bundle) or
//! owned by a single pass (the per-document caches, filled sequentially
//! before scoring fans out), so no locking is needed anywhere; the only
//! cross-thread signal is the [`CancelToken`] polled by the scoring loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{Error, Result};

/// Cooperative cancellation signal for document resolution.
///
/// The token is cheap to clone and safe to set from another thread. The
/// pairwise scorer polls it before every pair score and every anaphoricity
/// score; on detection the whole document's resolution aborts with
/// [`Error::Interrupted`]. Cluster merges already committed for earlier
/// anaphors are left as-is, so a cancelled document's result must be
/// treated as unusable as a whole.
///
/// # Example
///
/// ```rust
/// use anaphora::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(token.check().is_ok());
/// token.cancel();
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// True if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Return `Err(Error::Interrupted)` if cancellation has been requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_starts_clear() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancel_is_visible_through_clones() {
        let token = CancelToken::new();
        let view = token.clone();
        token.cancel();
        assert!(view.is_cancelled());
        assert!(view.check().unwrap_err().is_interrupted());
    }

    #[test]
    fn cancel_from_another_thread() {
        let token = CancelToken::new();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
