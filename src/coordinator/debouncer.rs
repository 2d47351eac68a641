use std::time::Duration;

use tokio::time::Instant;

use crate::CoordinatorConfig;

/// Coordinator state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    /// Nothing requested since the last pass
    Idle,
    /// A deferred pass is scheduled; new requests reschedule it
    Pending,
    /// The ceiling was reached; the next tick fires unconditionally
    ArmedForced,
}

/// Deadline bookkeeping for coalescing update requests.
///
/// Pure state: callers pass `now` in, so every transition can be driven
/// deterministically. The floor (`min_interval`) is folded into every
/// deadline, forced ones included.
#[derive(Debug, Clone)]
pub struct Debouncer {
    min_delay: Duration,
    max_delay: Duration,
    burst_threshold: Duration,
    max_coalesced: usize,
    min_interval: Duration,

    state: CoordinatorState,
    deadline: Option<Instant>,
    coalesced: usize,
    last_request_at: Option<Instant>,
    last_started_at: Option<Instant>,
}

impl Debouncer {
    pub fn new(config: &CoordinatorConfig) -> Self {
        Self {
            min_delay: config.min_delay(),
            max_delay: config.max_delay(),
            burst_threshold: config.burst_threshold(),
            max_coalesced: config.max_coalesced.max(1),
            min_interval: config.min_interval(),
            state: CoordinatorState::Idle,
            deadline: None,
            coalesced: 0,
            last_request_at: None,
            last_started_at: None,
        }
    }

    pub fn state(&self) -> CoordinatorState {
        self.state
    }

    /// Requests absorbed since leaving Idle
    pub fn coalesced(&self) -> usize {
        self.coalesced
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(
        &self,
        now: Instant,
    ) -> bool {
        self.deadline.is_some_and(|d| d <= now)
    }

    /// Debounce delay for a request arriving at `now`: short when isolated,
    /// long when it follows the previous request within the burst threshold.
    pub fn delay_for(
        &self,
        now: Instant,
    ) -> Duration {
        match self.last_request_at {
            Some(prev) if now.saturating_duration_since(prev) < self.burst_threshold => self.max_delay,
            _ => self.min_delay,
        }
    }

    /// Records one request and returns the resulting state.
    pub fn on_request(
        &mut self,
        now: Instant,
    ) -> CoordinatorState {
        let delay = self.delay_for(now);
        self.last_request_at = Some(now);

        match self.state {
            CoordinatorState::Idle | CoordinatorState::Pending => {
                self.coalesced += 1;
                if self.coalesced >= self.max_coalesced {
                    self.state = CoordinatorState::ArmedForced;
                    self.deadline = Some(self.respect_floor(now));
                } else {
                    self.state = CoordinatorState::Pending;
                    self.deadline = Some(self.respect_floor(now + delay));
                }
            }
            CoordinatorState::ArmedForced => {
                // Already firing as soon as allowed; nothing to reschedule
                self.coalesced += 1;
            }
        }
        self.state
    }

    /// Marks a pass as started at `now`; returns how many requests it covers.
    pub fn on_fire(
        &mut self,
        now: Instant,
    ) -> usize {
        let covered = self.coalesced;
        self.state = CoordinatorState::Idle;
        self.deadline = None;
        self.coalesced = 0;
        self.last_started_at = Some(now);
        covered
    }

    /// Earliest start allowed by the minimum inter-pass interval
    fn respect_floor(
        &self,
        at: Instant,
    ) -> Instant {
        match self.last_started_at {
            Some(started) => at.max(started + self.min_interval),
            None => at,
        }
    }
}
