//! Single-flight coordination for credential renewal.
//!
//! When concurrent requests all observe a 401, exactly one of them (the
//! leader) performs the renewal call; the rest queue up and are released
//! together with the leader's outcome. The gate is the explicit state
//! machine owning that invariant: `Idle` or `Refreshing` with a FIFO list
//! of waiters.

use std::mem;
use std::sync::{Mutex, PoisonError};

use tokio::sync::oneshot;

/// Outcome of a renewal attempt, observed by every queued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefreshOutcome {
    /// Renewal succeeded; queued requests replay with the new credential.
    Refreshed,
    /// Renewal failed; the whole pending batch rejects with `SessionExpired`.
    Expired,
}

/// Role handed to a request that hit a refresh-eligible 401.
pub(crate) enum RefreshTicket {
    /// First 401 of an idle window: this request must perform the renewal
    /// and close the window via [`RefreshGate::finish`].
    Leader,
    /// A renewal is already in flight: await the shared outcome.
    Follower(oneshot::Receiver<RefreshOutcome>),
}

enum GateState {
    Idle,
    Refreshing {
        waiters: Vec<oneshot::Sender<RefreshOutcome>>,
    },
}

/// Gate guarding the "at most one outstanding renewal" invariant.
///
/// Uses a plain `std::sync::Mutex`: the lock is never held across an await
/// point. The check-then-act on "is a refresh already running" happens
/// entirely inside [`RefreshGate::join`].
pub(crate) struct RefreshGate {
    state: Mutex<GateState>,
}

impl RefreshGate {
    pub(crate) const fn new() -> Self {
        Self {
            state: Mutex::new(GateState::Idle),
        }
    }

    /// Join the current refresh window, opening one if none exists.
    pub(crate) fn join(&self) -> RefreshTicket {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &mut *state {
            GateState::Idle => {
                *state = GateState::Refreshing {
                    waiters: Vec::new(),
                };
                RefreshTicket::Leader
            }
            GateState::Refreshing { waiters } => {
                let (tx, rx) = oneshot::channel();
                waiters.push(tx);
                RefreshTicket::Follower(rx)
            }
        }
    }

    /// Close the window: return to `Idle` and release every waiter, in the
    /// order they were enqueued, with the shared outcome.
    pub(crate) fn finish(&self, outcome: RefreshOutcome) {
        let waiters = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            match mem::replace(&mut *state, GateState::Idle) {
                GateState::Idle => Vec::new(),
                GateState::Refreshing { waiters } => waiters,
            }
        };
        for waiter in waiters {
            // A dropped receiver means the caller gave up; nothing to do.
            let _ = waiter.send(outcome);
        }
    }

    #[cfg(test)]
    pub(crate) fn is_idle(&self) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        matches!(*state, GateState::Idle)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_joiner_leads_rest_follow() {
        let gate = RefreshGate::new();

        assert!(matches!(gate.join(), RefreshTicket::Leader));
        let RefreshTicket::Follower(rx1) = gate.join() else {
            panic!("second joiner must follow");
        };
        let RefreshTicket::Follower(rx2) = gate.join() else {
            panic!("third joiner must follow");
        };

        gate.finish(RefreshOutcome::Refreshed);
        assert_eq!(rx1.await.unwrap(), RefreshOutcome::Refreshed);
        assert_eq!(rx2.await.unwrap(), RefreshOutcome::Refreshed);
        assert!(gate.is_idle());
    }

    #[tokio::test]
    async fn test_failure_reaches_every_waiter() {
        let gate = RefreshGate::new();

        assert!(matches!(gate.join(), RefreshTicket::Leader));
        let RefreshTicket::Follower(rx) = gate.join() else {
            panic!("expected follower");
        };

        gate.finish(RefreshOutcome::Expired);
        assert_eq!(rx.await.unwrap(), RefreshOutcome::Expired);
    }

    #[tokio::test]
    async fn test_new_window_after_finish() {
        let gate = RefreshGate::new();

        assert!(matches!(gate.join(), RefreshTicket::Leader));
        gate.finish(RefreshOutcome::Expired);

        // The next 401 opens a fresh window with a fresh leader.
        assert!(matches!(gate.join(), RefreshTicket::Leader));
        gate.finish(RefreshOutcome::Refreshed);
        assert!(gate.is_idle());
    }
}
