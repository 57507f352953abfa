#![warn(missing_docs)]
//! Monitoring of a lunar-lander-style control task.
//!
//! An [`EpisodeLoop`] drives an [`Env`] with an [`Agent`], classifies terminal
//! observations into landing successes and failures with an
//! [`OutcomeClassifier`], holds tentative successes in a [`LandingDebouncer`]
//! before counting them, and overrides the agent with the neutral action once
//! the [`FuelGovernor`] is exhausted. Counters, fuel and frames are published
//! to a [`StatsSink`] at every tick.
pub mod dummy;
pub mod error;
pub mod record;

mod base;
pub use base::{Act, Agent, DiscreteAct, Env, Frame, Policy, Step};

mod observation;
pub use observation::{LanderObs, OBS_DIM};

mod classifier;
pub use classifier::{
    classify_failure, classify_success, EpisodeOutcome, FailureThresholds, OutcomeClassifier,
    SuccessThresholds,
};

mod debouncer;
pub use debouncer::{DebounceEvent, DebounceState, LandingDebouncer};

mod fuel;
pub use fuel::{FuelConfig, FuelGovernor};

mod stats;
pub use stats::{Counters, NullSink, StatsSink, TickPayload};

mod pacer;
pub use pacer::FramePacer;

mod cancel;
pub use cancel::CancelToken;

mod random;
pub use random::RandomAgent;

mod episode_loop;
pub use episode_loop::{EpisodeLoop, EpisodeLoopConfig, LoopPhase, RunSummary, TickReport};
