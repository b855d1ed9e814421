use log::debug;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

use crate::error::FetchError;

/// Lifetime of one mounted view.
///
/// Loads driven through [`ViewScope::run`] are dropped as soon as the scope is
/// disposed, and results that arrive afterwards are reported as
/// [`FetchError::Disposed`] so callers never write them into view state.
#[derive(Debug, Clone)]
pub struct ViewScope {
    disposed: Arc<watch::Sender<bool>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        ViewScope {
            disposed: Arc::new(tx),
        }
    }

    pub fn dispose(&self) {
        if !self.disposed.send_replace(true) {
            debug!("View scope disposed");
        }
    }

    pub fn is_disposed(&self) -> bool {
        *self.disposed.borrow()
    }

    /// Drives `fut` until it completes or the scope is disposed, whichever comes first.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, FetchError>
    where
        F: Future<Output = Result<T, FetchError>>,
    {
        let mut rx = self.disposed.subscribe();
        if *rx.borrow_and_update() {
            return Err(FetchError::Disposed);
        }
        tokio::select! {
            result = fut => {
                if self.is_disposed() {
                    Err(FetchError::Disposed)
                } else {
                    result
                }
            }
            _ = rx.wait_for(|disposed| *disposed) => Err(FetchError::Disposed),
        }
    }
}
