//! Configuration of [`EpisodeLoop`](super::EpisodeLoop).
use crate::{error::TouchdownError, FailureThresholds, FuelConfig, SuccessThresholds};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`EpisodeLoop`](super::EpisodeLoop).
///
/// Every field has a default, so a YAML file only needs the values it changes.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
#[serde(default)]
pub struct EpisodeLoopConfig {
    /// Identifier of the simulation.
    pub env_id: String,

    /// Title of the display window.
    pub window_title: String,

    /// Steps a tentative success is held before it is counted.
    pub debounce_window: usize,

    /// Fuel capacity and depletion rate.
    pub fuel: FuelConfig,

    /// Bounds of the failure predicate.
    pub failure_thresholds: FailureThresholds,

    /// Bounds of the success predicate.
    pub success_thresholds: SuccessThresholds,

    /// Number of environment steps simulated by the loop.
    pub total_step_budget: usize,

    /// Training steps handed to the agent before every block of simulated steps.
    /// This is also the length of the blocks.
    pub steps_per_training_block: usize,

    /// Ticks per second of the display, 0 for no pacing.
    pub target_frame_rate: u32,

    /// Whether the policy selects actions deterministically.
    pub deterministic: bool,

    /// Where the trained policy is saved at the end of the run.
    pub model_path: String,

    /// Collaborator calls taking longer than this are reported.
    pub max_call_latency_ms: u64,
}

impl Default for EpisodeLoopConfig {
    fn default() -> Self {
        Self {
            env_id: "LunarLander-v3".to_string(),
            window_title: "DQNLunarLandV3".to_string(),
            debounce_window: 100,
            fuel: FuelConfig::default(),
            failure_thresholds: FailureThresholds::default(),
            success_thresholds: SuccessThresholds::default(),
            total_step_budget: 1_000_000,
            steps_per_training_block: 1_000,
            target_frame_rate: 30,
            deterministic: true,
            model_path: "lunar_lander_dqn".to_string(),
            max_call_latency_ms: 1_000,
        }
    }
}

impl EpisodeLoopConfig {
    /// Sets the identifier of the simulation.
    pub fn env_id(mut self, v: impl Into<String>) -> Self {
        self.env_id = v.into();
        self
    }

    /// Sets the title of the display window.
    pub fn window_title(mut self, v: impl Into<String>) -> Self {
        self.window_title = v.into();
        self
    }

    /// Sets the debounce window in steps.
    pub fn debounce_window(mut self, v: usize) -> Self {
        self.debounce_window = v;
        self
    }

    /// Sets the fuel configuration.
    pub fn fuel(mut self, v: FuelConfig) -> Self {
        self.fuel = v;
        self
    }

    /// Sets the bounds of the failure predicate.
    pub fn failure_thresholds(mut self, v: FailureThresholds) -> Self {
        self.failure_thresholds = v;
        self
    }

    /// Sets the bounds of the success predicate.
    pub fn success_thresholds(mut self, v: SuccessThresholds) -> Self {
        self.success_thresholds = v;
        self
    }

    /// Sets the number of environment steps of the run.
    pub fn total_step_budget(mut self, v: usize) -> Self {
        self.total_step_budget = v;
        self
    }

    /// Sets the length of training blocks.
    pub fn steps_per_training_block(mut self, v: usize) -> Self {
        self.steps_per_training_block = v;
        self
    }

    /// Sets the display rate, 0 for no pacing.
    pub fn target_frame_rate(mut self, v: u32) -> Self {
        self.target_frame_rate = v;
        self
    }

    /// Sets whether actions are selected deterministically.
    pub fn deterministic(mut self, v: bool) -> Self {
        self.deterministic = v;
        self
    }

    /// Sets where the trained policy is saved.
    pub fn model_path(mut self, v: impl Into<String>) -> Self {
        self.model_path = v.into();
        self
    }

    /// Sets the latency above which collaborator calls are reported.
    pub fn max_call_latency_ms(mut self, v: u64) -> Self {
        self.max_call_latency_ms = v;
        self
    }

    /// Checks the configuration before a run.
    pub fn validate(&self) -> Result<(), TouchdownError> {
        self.failure_thresholds.validate()?;
        self.success_thresholds.validate()?;
        self.fuel.validate()?;
        if self.steps_per_training_block == 0 {
            return Err(TouchdownError::InvalidLoopConfig(
                "steps_per_training_block must be positive".to_string(),
            ));
        }
        if self.total_step_budget == 0 {
            return Err(TouchdownError::InvalidLoopConfig(
                "total_step_budget must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Constructs [`EpisodeLoopConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EpisodeLoopConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
