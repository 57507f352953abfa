//! Configuration of [`GymEnv`](super::GymEnv).
use serde::{Deserialize, Serialize};

/// Configuration of [`GymEnv`](super::GymEnv).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GymEnvConfig {
    /// Name of the environment, given to `gymnasium.make()`.
    pub name: String,

    /// Render mode given to `gymnasium.make()`, e.g. `"rgb_array"`.
    ///
    /// If `None`, the environment does not render frames.
    pub render_mode: Option<String>,

    /// Maximum number of steps in an episode. The episode is truncated when reached.
    pub max_steps: Option<usize>,
}

impl Default for GymEnvConfig {
    fn default() -> Self {
        Self {
            name: "LunarLander-v3".to_string(),
            render_mode: None,
            max_steps: None,
        }
    }
}

impl GymEnvConfig {
    /// Set the name of the environment.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the render mode.
    pub fn render_mode(mut self, render_mode: Option<String>) -> Self {
        self.render_mode = render_mode;
        self
    }

    /// Set the maximum number of steps in an episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }
}
