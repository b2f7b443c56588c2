//! Cooperative cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{MarqueeError, Result};

/// A cloneable cancellation flag.
///
/// Long-running operations poll [`CancellationToken::check`] at safe points
/// and abort with [`MarqueeError::Cancelled`] without touching committed
/// index state.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Return `Err(Cancelled)` once cancellation was requested.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(MarqueeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Check an optional token.
pub(crate) fn check(token: Option<&CancellationToken>) -> Result<()> {
    match token {
        Some(token) => token.check(),
        None => Ok(()),
    }
}
