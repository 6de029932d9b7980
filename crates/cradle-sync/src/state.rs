use crate::error::SyncError;
use serde::Serialize;

/// Lifecycle of one change feed subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedState {
    /// Created, not yet subscribing
    Idle,
    /// Subscription request in flight
    Subscribing,
    /// Receiving change events
    Active,
    /// Subscription failed or dropped; last good record kept
    Error,
    /// Unmounted or stream ended; terminal
    Closed,
}

impl FeedState {
    /// Check if no further transitions are possible
    #[inline]
    #[must_use]
    pub fn is_terminal(self) -> bool {
        allowed_transitions(self).is_empty()
    }
}

/// Validates a feed state transition.
///
/// `Error -> Subscribing` is the resubscribe edge; whether the listener
/// takes it is decided by its retry policy.
pub fn validate_transition(from: FeedState, to: FeedState) -> Result<(), SyncError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(SyncError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: FeedState) -> Vec<FeedState> {
    use FeedState::*;
    match from {
        Idle => vec![Subscribing, Closed],
        Subscribing => vec![Active, Error, Closed],
        Active => vec![Error, Closed],
        Error => vec![Subscribing, Closed],
        Closed => vec![],
    }
}

fn allowed(from: FeedState, to: FeedState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
