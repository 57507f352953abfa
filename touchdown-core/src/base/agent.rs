//! Agent.
use super::{Env, Policy};
use crate::record::Record;
use anyhow::Result;
use std::path::Path;

/// Represents a trainable policy on an environment.
///
/// The agent owns its training procedure, including its own interaction with
/// the environment and its replay memory. The [`EpisodeLoop`](crate::EpisodeLoop)
/// only hands over a budget of training steps.
pub trait Agent<E: Env>: Policy<E> {
    /// Trains the agent for `step_budget` environment steps.
    fn learn(&mut self, step_budget: usize) -> Result<Record>;

    /// Save the parameters of the agent at the given path.
    ///
    /// The format of the artifact is up to the agent.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Load the parameters of the agent from the given path.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
