//! Retry policy
//!
//! A small state machine: callers ask [`RetryPolicy::next`] after every failed
//! attempt and either sleep for the returned delay or give up.

use std::time::Duration;

/// Bounded retries with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff: Duration,
}

/// Position within a retry sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    retries: u32,
}

impl RetryState {
    /// Retries performed so far.
    pub const fn retries(self) -> u32 {
        self.retries
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Wait `delay`, then try again from `state`.
    Retry {
        /// State to carry into the next attempt.
        state: RetryState,
        /// How long to wait first.
        delay: Duration,
    },

    /// No retries left.
    Exhausted,
}

impl RetryPolicy {
    /// A policy allowing `max_retries` retries after the first attempt.
    #[must_use]
    pub const fn new(max_retries: u32, backoff: Duration) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// Maximum retries after the first attempt.
    pub const fn max_retries(self) -> u32 {
        self.max_retries
    }

    /// Delay between attempts.
    pub const fn backoff(self) -> Duration {
        self.backoff
    }

    /// Decide what follows a failure observed in `state`.
    #[must_use]
    pub fn next(self, state: RetryState) -> RetryDecision {
        if state.retries >= self.max_retries {
            return RetryDecision::Exhausted;
        }

        RetryDecision::Retry {
            state: RetryState {
                retries: state.retries + 1,
            },
            delay: self.backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}
