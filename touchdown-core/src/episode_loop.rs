//! Monitoring loop driving an [`Env`] with an [`Agent`].
mod config;
use crate::{
    record::{AggregateRecorder, Record, RecordValue},
    Agent, CancelToken, Counters, DebounceEvent, EpisodeOutcome, Env, FramePacer, FuelGovernor,
    LandingDebouncer, LanderObs, OutcomeClassifier, Policy, StatsSink, TickPayload,
};
use anyhow::Result;
use chrono::Local;
pub use config::EpisodeLoopConfig;
use log::{debug, info, trace, warn};
use std::{
    marker::PhantomData,
    path::Path,
    time::{Duration, Instant},
};

/// Phase of the loop.
///
/// `Resetting` lasts while the environment is reset at an episode boundary.
/// Between ticks the phase reads `Running`, unless that reset failed; the next
/// [`EpisodeLoop::tick`] then retries the reset before stepping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopPhase {
    /// Stepping an episode.
    Running,

    /// Between the terminal step of an episode and the first step of the next.
    Resetting,
}

/// What happened in a tick.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Outcome of the step.
    pub outcome: EpisodeOutcome,

    /// Transition of the debouncer.
    pub debounce: DebounceEvent,

    /// The neutral action replaced the policy because the fuel was exhausted.
    pub forced_neutral: bool,

    /// The step was terminated or truncated and the environment was reset.
    pub is_done: bool,

    /// Fuel after the step, before a possible refill.
    pub fuel_after_step: f64,
}

/// Statistics of a finished or cancelled run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// Environment steps simulated by the loop.
    pub env_steps: usize,

    /// Episodes finished.
    pub episodes: usize,

    /// Committed successful landings.
    pub success_count: u64,

    /// Failed landings.
    pub failure_count: u64,

    /// The run was stopped by a [`CancelToken`].
    pub cancelled: bool,
}

#[derive(Default)]
struct EpisodeStats {
    steps: usize,
    ret: f32,
    forced_steps: usize,
}

/// Orchestrates an environment, an agent and a [`StatsSink`] step by step.
///
/// # Tick
///
/// 1. If the fuel is exhausted, the action is [`Env::neutral_act`];
///    otherwise it is [`Policy::predict`] on the current observation.
/// 2. [`Env::step`] is called with the action.
/// 3. If the step is terminal, the observation is classified with
///    [`OutcomeClassifier`]. A [`EpisodeOutcome::Failure`] increments the failure
///    count at once. The outcome of every step is fed into the
///    [`LandingDebouncer`] and a committed landing increments the success count.
/// 4. One step of fuel is consumed.
/// 5. If the step is terminal, the environment is reset and the fuel refilled.
/// 6. The counters, the fuel level and the rendered frame are published to the
///    [`StatsSink`], then the tick is paced to the target frame rate.
///
/// # Run
///
/// [`EpisodeLoop::run`] simulates `total_step_budget` steps in blocks of
/// `steps_per_training_block`. Before every block, the block length is handed
/// to [`Agent::learn`]. The [`CancelToken`] is checked before every block and
/// every tick. When the budget is exhausted, the agent is saved once in
/// `model_path`; a cancelled run is not saved.
///
/// All collaborator errors are propagated and end the run.
pub struct EpisodeLoop<E: Env> {
    config: EpisodeLoopConfig,
    classifier: OutcomeClassifier,
    debouncer: LandingDebouncer,
    fuel: FuelGovernor,
    counters: Counters,
    pacer: FramePacer,
    phase: LoopPhase,
    obs: Option<LanderObs>,
    env_steps: usize,
    episodes: usize,
    episode: EpisodeStats,
    max_call_latency: Duration,
    phantom: PhantomData<E>,
}

impl<E: Env> EpisodeLoop<E> {
    /// Constructs a loop, rejecting an invalid configuration.
    pub fn build(config: EpisodeLoopConfig) -> Result<Self> {
        config.validate()?;
        let classifier =
            OutcomeClassifier::new(config.failure_thresholds, config.success_thresholds)?;
        let fuel = FuelGovernor::new(&config.fuel)?;

        Ok(Self {
            classifier,
            debouncer: LandingDebouncer::new(config.debounce_window),
            fuel,
            counters: Counters::default(),
            pacer: FramePacer::new(config.target_frame_rate),
            phase: LoopPhase::Running,
            obs: None,
            env_steps: 0,
            episodes: 0,
            episode: EpisodeStats::default(),
            max_call_latency: Duration::from_millis(config.max_call_latency_ms),
            phantom: PhantomData,
            config,
        })
    }

    /// Configuration of the loop.
    pub fn config(&self) -> &EpisodeLoopConfig {
        &self.config
    }

    /// Landing counters.
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Fuel of the current episode.
    pub fn fuel(&self) -> &FuelGovernor {
        &self.fuel
    }

    /// Debouncer of tentative landings.
    pub fn debouncer(&self) -> &LandingDebouncer {
        &self.debouncer
    }

    /// Current phase. `Resetting` only after a failed reset.
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Environment steps simulated so far.
    pub fn env_steps(&self) -> usize {
        self.env_steps
    }

    /// Episodes finished so far.
    pub fn episodes(&self) -> usize {
        self.episodes
    }

    /// Runs `f`, warning if it takes longer than the configured latency bound.
    fn timed<T>(&self, name: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let start = Instant::now();
        let ret = f();
        let elapsed = start.elapsed();
        if elapsed > self.max_call_latency {
            warn!(
                "{} took {:?}, longer than {:?}",
                name, elapsed, self.max_call_latency
            );
        }
        ret
    }

    /// Starts the first episode. Called by [`EpisodeLoop::tick`] if needed.
    pub fn start(&mut self, env: &mut E) -> Result<()> {
        let obs = self.timed("Env::reset", || env.reset())?;
        self.obs = Some(obs);
        self.fuel.reset_to_capacity();
        self.episode = EpisodeStats::default();
        self.phase = LoopPhase::Running;
        Ok(())
    }

    fn episode_record(&self, outcome: EpisodeOutcome) -> Record {
        Record::from_slice(&[
            ("episode", RecordValue::Scalar(self.episodes as f32)),
            ("episode_length", RecordValue::Scalar(self.episode.steps as f32)),
            ("episode_return", RecordValue::Scalar(self.episode.ret)),
            (
                "forced_neutral_steps",
                RecordValue::Scalar(self.episode.forced_steps as f32),
            ),
            ("fuel_remaining", RecordValue::Scalar(self.fuel.remaining() as f32)),
            ("outcome", RecordValue::String(outcome.as_str().to_string())),
            ("datetime", RecordValue::DateTime(Local::now())),
        ])
    }

    /// Performs a single step of the loop.
    pub fn tick<P, S>(
        &mut self,
        env: &mut E,
        policy: &mut P,
        sink: &mut S,
        recorder: &mut dyn AggregateRecorder,
    ) -> Result<TickReport>
    where
        P: Policy<E> + ?Sized,
        S: StatsSink + ?Sized,
    {
        let obs = match self.obs {
            Some(obs) if self.phase == LoopPhase::Running => obs,
            _ => {
                self.start(env)?;
                self.obs.unwrap_or_default()
            }
        };

        // Select an action
        let forced_neutral = self.fuel.must_force_neutral_action();
        let act = if forced_neutral {
            env.neutral_act()
        } else {
            let deterministic = self.config.deterministic;
            self.timed("Policy::predict", || policy.predict(&obs, deterministic))?
        };

        let step = self.timed("Env::step", || env.step(&act))?;
        let is_done = step.is_done();
        self.env_steps += 1;
        self.episode.steps += 1;
        self.episode.ret += step.reward;
        if forced_neutral {
            self.episode.forced_steps += 1;
        }

        // Classify and debounce
        let outcome = self.classifier.classify(&step.obs, is_done);
        if outcome == EpisodeOutcome::Failure {
            self.counters.failure_count += 1;
            info!(
                "Landing failure at step {}, failures = {}",
                self.env_steps, self.counters.failure_count
            );
        }
        let debounce = self.debouncer.update(outcome, &step.obs);
        if debounce == DebounceEvent::Committed {
            self.counters.success_count += 1;
            info!(
                "Successful landing at step {}, successes = {}",
                self.env_steps, self.counters.success_count
            );
        }

        self.fuel.consume();
        let fuel_after_step = self.fuel.remaining();

        // Episode boundary
        if is_done {
            self.phase = LoopPhase::Resetting;
            self.episodes += 1;
            debug!(
                "Episode {} ended after {} steps, return = {}, outcome = {}",
                self.episodes,
                self.episode.steps,
                self.episode.ret,
                outcome.as_str()
            );
            recorder.store(self.episode_record(outcome));

            let obs = self.timed("Env::reset", || env.reset())?;
            self.obs = Some(obs);
            self.fuel.reset_to_capacity();
            self.episode = EpisodeStats::default();
            self.phase = LoopPhase::Running;
        } else {
            self.obs = Some(step.obs);
        }

        // Publish
        let frame = self.timed("Env::render", || env.render())?;
        let payload = TickPayload::new(frame.as_ref(), self.counters, self.fuel.remaining());
        self.timed("StatsSink::publish", || sink.publish(&payload))?;
        let slept = self.pacer.tick();
        trace!("Tick {} paced by {:?}", self.env_steps, slept);

        Ok(TickReport {
            outcome,
            debounce,
            forced_neutral,
            is_done,
            fuel_after_step,
        })
    }

    /// Runs the loop until the step budget is exhausted or `cancel` is set.
    pub fn run<A, S>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        sink: &mut S,
        recorder: &mut dyn AggregateRecorder,
        cancel: &CancelToken,
    ) -> Result<RunSummary>
    where
        A: Agent<E> + ?Sized,
        S: StatsSink + ?Sized,
    {
        let budget = self.config.total_step_budget;
        let block = self.config.steps_per_training_block;
        let mut cancelled = false;
        info!(
            "Start monitoring {} for {} steps in blocks of {}",
            self.config.env_id, budget, block
        );

        if self.obs.is_none() {
            self.start(env)?;
        }

        'outer: while self.env_steps < budget {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let n = block.min(budget - self.env_steps);
            let record = self.timed("Agent::learn", || agent.learn(n))?;
            if !record.is_empty() {
                recorder.store(record);
            }

            for _ in 0..n {
                if cancel.is_cancelled() {
                    cancelled = true;
                    break 'outer;
                }
                self.tick(env, agent, sink, recorder)?;
            }

            recorder.flush(self.env_steps as i64);
        }

        if cancelled {
            recorder.flush(self.env_steps as i64);
            info!("Cancelled after {} steps, the model is not saved", self.env_steps);
        } else {
            let path = Path::new(&self.config.model_path);
            agent.save_params(path)?;
            info!("Saved the model in {:?}", path);
        }

        let summary = RunSummary {
            env_steps: self.env_steps,
            episodes: self.episodes,
            success_count: self.counters.success_count,
            failure_count: self.counters.failure_count,
            cancelled,
        };
        info!("{:?}", summary);
        Ok(summary)
    }
}
