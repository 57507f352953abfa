//! DQN agent of [Stable-Baselines3](https://stable-baselines3.readthedocs.io).
use crate::{util::obs_to_pyobj, GymEnv};
use anyhow::{anyhow, Result};
use log::info;
use pyo3::{
    types::{IntoPyDict, PyDict, PyTuple},
    PyObject, Python,
};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use touchdown_core::{record::Record, Agent, DiscreteAct, LanderObs, Policy};

/// Configuration of [`Sb3Dqn`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Sb3DqnConfig {
    /// Name of the training environment, given to `make_vec_env()`.
    pub env_id: String,

    /// Number of training environments.
    pub n_envs: usize,

    /// Policy network.
    pub policy: String,

    /// Learning rate.
    pub learning_rate: f64,

    /// Capacity of the replay buffer.
    pub buffer_size: usize,

    /// Minibatch size.
    pub batch_size: usize,

    /// Discount factor.
    pub gamma: f64,

    /// Fraction of the training during which epsilon decays.
    pub exploration_fraction: f64,

    /// Final value of epsilon.
    pub exploration_final_eps: f64,

    /// Verbosity of Stable-Baselines3.
    pub verbose: i32,

    /// Seed of the training environments and the agent.
    pub seed: Option<i64>,
}

impl Default for Sb3DqnConfig {
    fn default() -> Self {
        Self {
            env_id: "LunarLander-v3".to_string(),
            n_envs: 1,
            policy: "MlpPolicy".to_string(),
            learning_rate: 1e-5,
            buffer_size: 50_000,
            batch_size: 128,
            gamma: 0.99,
            exploration_fraction: 0.1,
            exploration_final_eps: 0.02,
            verbose: 0,
            seed: None,
        }
    }
}

impl Sb3DqnConfig {
    /// Sets the name of the training environment.
    pub fn env_id(mut self, v: impl Into<String>) -> Self {
        self.env_id = v.into();
        self
    }

    /// Sets the learning rate.
    pub fn learning_rate(mut self, v: f64) -> Self {
        self.learning_rate = v;
        self
    }

    /// Sets the capacity of the replay buffer.
    pub fn buffer_size(mut self, v: usize) -> Self {
        self.buffer_size = v;
        self
    }

    /// Sets the minibatch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the seed.
    pub fn seed(mut self, v: Option<i64>) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`Sb3DqnConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`Sb3DqnConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// DQN agent trained by Stable-Baselines3 in Python.
///
/// The agent trains on its own vectorized environment. [`Agent::learn`]
/// continues the same training run, so the exploration schedule is not
/// restarted at every block.
pub struct Sb3Dqn {
    model: PyObject,
    vec_env: PyObject,
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| anyhow!("Path {:?} is not valid UTF-8", path))
}

impl Sb3Dqn {
    /// Constructs the agent and its training environment.
    pub fn build(config: &Sb3DqnConfig) -> Result<Self> {
        Python::with_gil(|py| -> Result<Self> {
            let env_util = py.import("stable_baselines3.common.env_util")?;
            let sb3 = py.import("stable_baselines3")?;

            let env_kwargs = PyDict::new(py);
            env_kwargs.set_item("n_envs", config.n_envs)?;
            if let Some(seed) = config.seed {
                env_kwargs.set_item("seed", seed)?;
            }
            let vec_env = env_util
                .getattr("make_vec_env")?
                .call((config.env_id.as_str(),), Some(env_kwargs))?;

            let kwargs = PyDict::new(py);
            kwargs.set_item("verbose", config.verbose)?;
            kwargs.set_item("learning_rate", config.learning_rate)?;
            kwargs.set_item("buffer_size", config.buffer_size)?;
            kwargs.set_item("batch_size", config.batch_size)?;
            kwargs.set_item("gamma", config.gamma)?;
            kwargs.set_item("exploration_fraction", config.exploration_fraction)?;
            kwargs.set_item("exploration_final_eps", config.exploration_final_eps)?;
            if let Some(seed) = config.seed {
                kwargs.set_item("seed", seed)?;
            }
            let model = sb3
                .getattr("DQN")?
                .call((config.policy.as_str(), vec_env), Some(kwargs))?;
            info!(
                "Built DQN with {} on {} (lr = {}, buffer = {}, batch = {})",
                config.policy,
                config.env_id,
                config.learning_rate,
                config.buffer_size,
                config.batch_size
            );

            Ok(Self {
                model: model.into(),
                vec_env: vec_env.into(),
            })
        })
    }

    /// Number of training steps so far.
    pub fn num_timesteps(&self) -> Result<i64> {
        Python::with_gil(|py| -> Result<i64> {
            Ok(self.model.getattr(py, "num_timesteps")?.extract(py)?)
        })
    }
}

impl Policy<GymEnv> for Sb3Dqn {
    fn predict(&mut self, obs: &LanderObs, deterministic: bool) -> Result<DiscreteAct> {
        Python::with_gil(|py| -> Result<DiscreteAct> {
            let obs = obs_to_pyobj(py, obs);
            let kwargs = vec![("deterministic", deterministic)].into_py_dict(py);
            let ret = self.model.call_method(py, "predict", (obs,), Some(kwargs))?;
            let ret: &PyTuple = ret.extract(py)?;
            let act: i64 = ret.get_item(0).call_method0("item")?.extract()?;
            Ok(DiscreteAct(act))
        })
    }
}

impl Agent<GymEnv> for Sb3Dqn {
    fn learn(&mut self, step_budget: usize) -> Result<Record> {
        let num_timesteps = Python::with_gil(|py| -> Result<i64> {
            let kwargs = PyDict::new(py);
            kwargs.set_item("total_timesteps", step_budget)?;
            kwargs.set_item("reset_num_timesteps", false)?;
            self.model.call_method(py, "learn", (), Some(kwargs))?;
            Ok(self.model.getattr(py, "num_timesteps")?.extract(py)?)
        })?;

        Ok(Record::from_scalar("num_timesteps", num_timesteps as f32))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        let path = path_str(path)?;
        Python::with_gil(|py| -> Result<()> {
            self.model.call_method1(py, "save", (path,))?;
            Ok(())
        })?;
        info!("Saved the DQN model in {}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        let path = path_str(path)?;
        self.model = Python::with_gil(|py| -> Result<PyObject> {
            let sb3 = py.import("stable_baselines3")?;
            let kwargs = vec![("env", self.vec_env.clone_ref(py))].into_py_dict(py);
            let model = sb3
                .getattr("DQN")?
                .call_method("load", (path,), Some(kwargs))?;
            Ok(model.into())
        })?;
        info!("Loaded the DQN model from {}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_sb3_dqn_config() -> Result<()> {
        let config = Sb3DqnConfig::default()
            .learning_rate(1e-4)
            .batch_size(64)
            .seed(Some(42));

        let dir = TempDir::new("sb3_dqn_config")?;
        let path = dir.path().join("dqn.yaml");
        config.save(&path)?;
        let config_ = Sb3DqnConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_default_hyperparameters() {
        let config = Sb3DqnConfig::default();
        assert_eq!(config.learning_rate, 1e-5);
        assert_eq!(config.buffer_size, 50_000);
        assert_eq!(config.batch_size, 128);
        assert_eq!(config.exploration_final_eps, 0.02);
    }
}
