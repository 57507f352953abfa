//! Debounce window for successful landings.
use crate::{EpisodeOutcome, LanderObs};
use log::{debug, trace};

/// State of a [`LandingDebouncer`].
#[derive(Clone, Debug, PartialEq)]
pub enum DebounceState {
    /// No tentative success.
    Idle,

    /// A tentative success waits for the window to elapse.
    Pending {
        /// Steps until the success is re-evaluated.
        remaining_steps: usize,

        /// Observation of the step that opened the window.
        anchor: LanderObs,
    },
}

/// What an update of [`LandingDebouncer`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceEvent {
    /// Stayed idle.
    Idle,

    /// Opened a pending window.
    Started,

    /// Counted down the pending window.
    Counting,

    /// A failure dropped the pending window.
    Cancelled,

    /// The window elapsed with a success, which must be counted.
    Committed,

    /// The window elapsed without a success at that step.
    Discarded,
}

/// Holds a success classification for a fixed number of steps before committing it.
///
/// A single terminal frame satisfying the success predicate can be a bounce or
/// a momentary contact. The debouncer counts the success only if the step at
/// which the window elapses is classified as a success as well. Only the
/// outcome of that step is tested; intermediate steps cancel the window only
/// when they are failures.
#[derive(Clone, Debug)]
pub struct LandingDebouncer {
    window: usize,
    state: DebounceState,
}

impl LandingDebouncer {
    /// Constructs an idle debouncer with a window of `window` steps.
    pub fn new(window: usize) -> Self {
        Self {
            window,
            state: DebounceState::Idle,
        }
    }

    /// Number of steps a tentative success is held.
    pub fn window(&self) -> usize {
        self.window
    }

    /// Current state.
    pub fn state(&self) -> &DebounceState {
        &self.state
    }

    /// Returns `true` while a tentative success is held.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DebounceState::Pending { .. })
    }

    /// Drops any pending window.
    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// Feeds the outcome of a step, terminal or not.
    ///
    /// `obs` is the observation the outcome was computed from.
    pub fn update(&mut self, outcome: EpisodeOutcome, obs: &LanderObs) -> DebounceEvent {
        let state = std::mem::replace(&mut self.state, DebounceState::Idle);

        match state {
            DebounceState::Idle => match outcome {
                EpisodeOutcome::Success if self.window == 0 => {
                    debug!("Landing committed without debounce window");
                    DebounceEvent::Committed
                }
                EpisodeOutcome::Success => {
                    debug!("Tentative landing, waiting {} steps", self.window);
                    self.state = DebounceState::Pending {
                        remaining_steps: self.window,
                        anchor: *obs,
                    };
                    DebounceEvent::Started
                }
                _ => DebounceEvent::Idle,
            },
            DebounceState::Pending {
                remaining_steps,
                anchor,
            } => {
                if outcome == EpisodeOutcome::Failure {
                    debug!("Tentative landing cancelled by a failure");
                    return DebounceEvent::Cancelled;
                }

                debug_assert!(remaining_steps > 0, "pending window underflow");
                let remaining_steps = remaining_steps.saturating_sub(1);

                if remaining_steps > 0 {
                    trace!("Tentative landing, {} steps left", remaining_steps);
                    self.state = DebounceState::Pending {
                        remaining_steps,
                        anchor,
                    };
                    DebounceEvent::Counting
                } else if outcome == EpisodeOutcome::Success {
                    debug!("Landing committed, anchored at {:?}", anchor);
                    DebounceEvent::Committed
                } else {
                    debug!("Tentative landing discarded at the end of the window");
                    DebounceEvent::Discarded
                }
            }
        }
    }
}
