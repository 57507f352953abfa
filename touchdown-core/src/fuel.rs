//! Depleting fuel that overrides the agent once exhausted.
use crate::error::TouchdownError;
use serde::{Deserialize, Serialize};

/// Configuration of [`FuelGovernor`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct FuelConfig {
    /// Fuel at the beginning of an episode, in seconds of thrust.
    pub capacity: f64,

    /// Fuel consumed per environment step.
    pub depletion_rate: f64,
}

impl Default for FuelConfig {
    fn default() -> Self {
        Self {
            capacity: 10.0,
            depletion_rate: 0.01,
        }
    }
}

impl FuelConfig {
    /// Sets the capacity.
    pub fn capacity(mut self, v: f64) -> Self {
        self.capacity = v;
        self
    }

    /// Sets the depletion rate per step.
    pub fn depletion_rate(mut self, v: f64) -> Self {
        self.depletion_rate = v;
        self
    }

    /// Both values must be finite and strictly positive.
    pub fn validate(&self) -> Result<(), TouchdownError> {
        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            return Err(TouchdownError::InvalidFuel(format!(
                "capacity must be positive, got {}",
                self.capacity
            )));
        }
        if !(self.depletion_rate.is_finite() && self.depletion_rate > 0.0) {
            return Err(TouchdownError::InvalidFuel(format!(
                "depletion rate must be positive, got {}",
                self.depletion_rate
            )));
        }
        Ok(())
    }
}

/// Tracks the fuel of the current episode.
///
/// The remaining level after `k` consuming steps since the last reset is
/// `max(0, capacity - k * rate)`, computed from the step count so that rounding
/// errors do not accumulate.
#[derive(Clone, Debug)]
pub struct FuelGovernor {
    capacity: f64,
    rate: f64,
    consumed_steps: u64,
    remaining: f64,
}

impl FuelGovernor {
    /// Constructs a governor with a full tank.
    pub fn new(config: &FuelConfig) -> Result<Self, TouchdownError> {
        config.validate()?;
        Ok(Self {
            capacity: config.capacity,
            rate: config.depletion_rate,
            consumed_steps: 0,
            remaining: config.capacity,
        })
    }

    /// Returns `true` if the fuel is exhausted and the neutral action must be taken.
    #[inline]
    pub fn must_force_neutral_action(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Depletes the fuel by one step, clamping at zero. No-op when empty.
    pub fn consume(&mut self) {
        if self.remaining > 0.0 {
            self.consumed_steps += 1;
            self.remaining = (self.capacity - self.consumed_steps as f64 * self.rate).max(0.0);
        }
        debug_assert!(
            (0.0..=self.capacity).contains(&self.remaining),
            "fuel {} outside [0, {}]",
            self.remaining,
            self.capacity
        );
    }

    /// Refills the tank. Called at every episode boundary.
    pub fn reset_to_capacity(&mut self) {
        self.consumed_steps = 0;
        self.remaining = self.capacity;
    }

    /// Remaining fuel.
    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    /// Fuel at the beginning of an episode.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Fuel consumed per step.
    pub fn depletion_rate(&self) -> f64 {
        self.rate
    }
}
