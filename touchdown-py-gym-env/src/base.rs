//! Wrapper of gym environments implemented in Python.
use crate::{
    util::{pyobj_to_frame, pyobj_to_obs},
    GymEnvConfig,
};
use anyhow::Result;
use log::{info, trace};
use pyo3::{
    types::{IntoPyDict, PyTuple},
    PyObject, Python,
};
use touchdown_core::{DiscreteAct, Env, Frame, LanderObs, Step};

/// An environment in [Gymnasium](https://gymnasium.farama.org) with a discrete
/// action space and the 8-dimensional lander observation.
#[derive(Debug)]
pub struct GymEnv {
    env: PyObject,

    n_actions: i64,

    render: bool,

    count_steps: usize,

    max_steps: Option<usize>,

    /// Initial seed.
    ///
    /// This value will be used at the first call of the reset method.
    initial_seed: Option<i64>,
}

impl GymEnv {
    /// Number of discrete actions.
    pub fn n_actions(&self) -> i64 {
        self.n_actions
    }
}

impl Env for GymEnv {
    type Config = GymEnvConfig;
    type Act = DiscreteAct;

    /// Constructs [`GymEnv`].
    ///
    /// * `seed` - The seed value of the random number generator.
    ///   This value will be used at the first call of the reset method.
    fn build(config: &Self::Config, seed: i64) -> Result<Self> {
        Python::with_gil(|py| -> Result<Self> {
            // sys.argv is used by pyglet library, which is responsible for rendering.
            // Depending on the python interpreter, however, sys.argv can be empty.
            // For that case, sys argv is set here.
            // See https://github.com/PyO3/pyo3/issues/1241#issuecomment-715952517
            let locals = [("sys", py.import("sys")?)].into_py_dict(py);
            let _ = py.eval("sys.argv.insert(0, 'GymEnv')", None, Some(locals))?;
            let ver = py.eval("sys.version", None, Some(locals))?;
            info!("Initialize GymEnv {}", config.name);
            info!("Python version = {}", ver);

            let gym = py.import("gymnasium")?;
            let kwargs = config
                .render_mode
                .clone()
                .map(|mode| vec![("render_mode", mode)].into_py_dict(py));
            let env = gym.getattr("make")?.call((config.name.as_str(),), kwargs)?;

            let n_actions: i64 = env.getattr("action_space")?.getattr("n")?.extract()?;
            let observation_space = env.getattr("observation_space")?;
            info!("Observation space = {}", observation_space);

            Ok(GymEnv {
                env: env.into(),
                n_actions,
                render: config.render_mode.is_some(),
                count_steps: 0,
                max_steps: config.max_steps,
                initial_seed: Some(seed),
            })
        })
    }

    /// Resets the environment and returns an observation.
    ///
    /// The seed given to [`GymEnv::build`] is passed at the first call only.
    fn reset(&mut self) -> Result<LanderObs> {
        trace!("GymEnv::reset()");
        self.count_steps = 0;

        Python::with_gil(|py| -> Result<LanderObs> {
            let ret = if let Some(seed) = self.initial_seed.take() {
                let kwargs = vec![("seed", seed)].into_py_dict(py);
                self.env.call_method(py, "reset", (), Some(kwargs))?
            } else {
                self.env.call_method0(py, "reset")?
            };
            let ret: &PyTuple = ret.extract(py)?;
            pyobj_to_obs(ret.get_item(0))
        })
    }

    /// Runs a step of the environment's dynamics.
    ///
    /// The episode is truncated when `max_steps` is reached.
    fn step(&mut self, a: &DiscreteAct) -> Result<Step<Self>> {
        trace!("GymEnv::step()");

        Python::with_gil(|py| -> Result<Step<Self>> {
            let ret = self.env.call_method(py, "step", (a.0,), None)?;
            let step: &PyTuple = ret.extract(py)?;
            let obs = pyobj_to_obs(step.get_item(0))?;
            let reward: f32 = step.get_item(1).extract()?;
            let is_terminated: bool = step.get_item(2).extract()?;
            let mut is_truncated: bool = step.get_item(3).extract()?;

            self.count_steps += 1;
            if let Some(max_steps) = self.max_steps {
                if self.count_steps >= max_steps {
                    is_truncated = true;
                }
            }

            Ok(Step::new(obs, *a, reward, is_terminated, is_truncated))
        })
    }

    /// Returns the frame of the `rgb_array` render mode.
    ///
    /// `None` if the environment was built without a render mode.
    fn render(&mut self) -> Result<Option<Frame>> {
        if !self.render {
            return Ok(None);
        }

        Python::with_gil(|py| -> Result<Option<Frame>> {
            let ret = self.env.call_method0(py, "render")?;
            if ret.is_none(py) {
                Ok(None)
            } else {
                Ok(Some(pyobj_to_frame(ret.as_ref(py))?))
            }
        })
    }

    /// Action 0, doing nothing.
    fn neutral_act(&self) -> DiscreteAct {
        DiscreteAct(0)
    }
}
