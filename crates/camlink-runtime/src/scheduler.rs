//! [`BeaconScheduler`] – the outbound beacon cadence as an explicit state
//! machine.
//!
//! ```text
//!            set_interval(d > 0)
//!   Idle ───────────────────────▶ Armed { interval: d, deadline: now + d }
//!    ▲                               │  fire(): deadline = now + interval
//!    └──── set_interval(0) / cancel ─┘
//! ```
//!
//! Every `set_interval` replaces the pending deadline atomically, so a
//! cancelled timer can never fire.  `fire` re-arms from the moment it is
//! called; lateness therefore accumulates one interval per cycle.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Armed { interval: Duration, deadline: Instant },
}

#[derive(Debug, Clone)]
pub struct BeaconScheduler {
    state: SchedulerState,
}

impl Default for BeaconScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl BeaconScheduler {
    /// A scheduler in the [`SchedulerState::Idle`] state.
    pub fn new() -> Self {
        Self {
            state: SchedulerState::Idle,
        }
    }

    /// Replace any pending timer.  A zero interval leaves the scheduler idle.
    pub fn set_interval(&mut self, interval: Duration) {
        self.state = if interval.is_zero() {
            SchedulerState::Idle
        } else {
            SchedulerState::Armed {
                interval,
                deadline: Instant::now() + interval,
            }
        };
    }

    /// Drop the pending timer.  Idempotent.
    pub fn cancel(&mut self) {
        self.state = SchedulerState::Idle;
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, SchedulerState::Armed { .. })
    }

    /// Current interval, if armed.
    pub fn interval(&self) -> Option<Duration> {
        match self.state {
            SchedulerState::Armed { interval, .. } => Some(interval),
            SchedulerState::Idle => None,
        }
    }

    /// Pending deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Armed { deadline, .. } => Some(deadline),
            SchedulerState::Idle => None,
        }
    }

    /// Re-arm for the same interval from now.  Returns `false` when idle, in
    /// which case no cycle should run.
    pub fn fire(&mut self) -> bool {
        match self.state {
            SchedulerState::Armed { interval, .. } => {
                self.state = SchedulerState::Armed {
                    interval,
                    deadline: Instant::now() + interval,
                };
                true
            }
            SchedulerState::Idle => false,
        }
    }

    /// Resolve when the current deadline passes; never resolves while idle.
    pub async fn wait(&self) {
        wait_until(self.deadline()).await
    }
}

/// Sleep until `deadline`, or forever when there is none.
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending::<()>().await,
    }
}
