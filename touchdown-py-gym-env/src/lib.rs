//! Python-backed collaborators of [`touchdown_core::EpisodeLoop`].
//!
//! [`GymEnv`] is a wrapper of [Gymnasium](https://gymnasium.farama.org) based on [`PyO3`](https://github.com/PyO3/pyo3).
//! It is meant for `LunarLander`-like environments: a discrete action space and
//! an 8-dimensional observation, converted into [`LanderObs`]. With the
//! `rgb_array` render mode, frames are converted into [`Frame`]s.
//!
//! [`Sb3Dqn`] wraps the DQN agent of [Stable-Baselines3](https://stable-baselines3.readthedocs.io).
//! It trains on its own vectorized copy of the environment; the
//! [`EpisodeLoop`] only hands over training budgets and asks for actions.
//!
//! Both need a Python interpreter with `gymnasium` and `stable_baselines3`.
//!
//! [`LanderObs`]: touchdown_core::LanderObs
//! [`Frame`]: touchdown_core::Frame
//! [`EpisodeLoop`]: touchdown_core::EpisodeLoop
mod base;
mod config;
mod sb3;
pub mod util;
pub use base::GymEnv;
pub use config::GymEnvConfig;
pub use sb3::{Sb3Dqn, Sb3DqnConfig};
