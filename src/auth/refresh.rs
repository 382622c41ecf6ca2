//! Single-flight access-token refresh.
//!
//! # States
//! - Idle: no refresh in progress
//! - Refreshing: exactly one refresh call outstanding; later callers queue
//!
//! # State Transitions
//! ```text
//! Idle → Refreshing: first caller to enter() becomes the leader
//! Refreshing → Idle: the leader settles (success, failure, or drop)
//! ```
//!
//! The flag check-and-set happens under a mutex that is never held across
//! an `.await`, so it is atomic on a multi-threaded runtime. Waiters are
//! released in enqueue order, each exactly once, after the refresh settles.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::oneshot;

use crate::http::error::ApiError;
use crate::observability::metrics;

/// Result of a refresh incident: the new access token or the refresh error.
pub type RefreshOutcome = Result<String, ApiError>;

#[derive(Default)]
struct RefreshState {
    refreshing: bool,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
}

/// Coordinates refresh calls for one session.
#[derive(Default)]
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// What a caller that needs a fresh token should do.
pub enum Ticket<'a> {
    /// Perform the refresh call, then settle the lease.
    Leader(RefreshLease<'a>),
    /// A refresh is already in flight; wait for its outcome.
    Waiter(RefreshWaiter),
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RefreshState> {
        // State is only mutated in short non-panicking sections.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Join the current refresh incident, or start one.
    pub fn enter(&self) -> Ticket<'_> {
        let mut state = self.lock();
        if state.refreshing {
            let (tx, rx) = oneshot::channel();
            state.waiters.push_back(tx);
            metrics::record_refresh_waiters(state.waiters.len());
            tracing::debug!(waiters = state.waiters.len(), "Refresh in flight, queued caller");
            Ticket::Waiter(RefreshWaiter { rx })
        } else {
            state.refreshing = true;
            tracing::debug!("Starting token refresh");
            Ticket::Leader(RefreshLease {
                coordinator: self,
                settled: false,
            })
        }
    }

    /// True while a refresh call is outstanding.
    pub fn is_refreshing(&self) -> bool {
        self.lock().refreshing
    }

    /// Number of callers queued behind the current refresh.
    pub fn waiting(&self) -> usize {
        self.lock().waiters.len()
    }

    fn settle(&self, outcome: &RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.lock();
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };
        metrics::record_refresh_waiters(0);

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away has dropped its receiver.
            let _ = waiter.send(outcome.clone());
        }
        released
    }
}

/// Held by the caller performing the refresh call.
///
/// Dropping the lease without settling releases every waiter with
/// [`ApiError::RefreshAborted`] and returns the coordinator to Idle.
pub struct RefreshLease<'a> {
    coordinator: &'a RefreshCoordinator,
    settled: bool,
}

impl RefreshLease<'_> {
    /// Publish the outcome to every waiter and return to Idle.
    pub fn settle(mut self, outcome: RefreshOutcome) -> RefreshOutcome {
        self.settled = true;
        let released = self.coordinator.settle(&outcome);
        tracing::debug!(released, success = outcome.is_ok(), "Token refresh settled");
        outcome
    }
}

impl Drop for RefreshLease<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!("Token refresh abandoned before settling");
            self.coordinator.settle(&Err(ApiError::RefreshAborted));
        }
    }
}

/// Held by a caller queued behind an in-flight refresh.
pub struct RefreshWaiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWaiter {
    /// Wait for the in-flight refresh to settle.
    pub async fn wait(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(Err(ApiError::RefreshAborted))
    }
}
