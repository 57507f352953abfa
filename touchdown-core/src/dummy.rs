//! Scripted collaborators. This module is used for tests.
use crate::{record::Record, Agent, DiscreteAct, Env, Frame, LanderObs, Policy, Step};
use anyhow::{bail, Result};
use std::{cell::RefCell, path::Path, path::PathBuf};

/// A step returned by [`ScriptedEnv`].
#[derive(Clone, Debug)]
pub struct ScriptedStep {
    /// Observation.
    pub obs: LanderObs,

    /// Reward.
    pub reward: f32,

    /// Terminated flag.
    pub terminated: bool,

    /// Truncated flag.
    pub truncated: bool,
}

impl ScriptedStep {
    /// A non-terminal step.
    pub fn flying(obs: LanderObs) -> Self {
        Self {
            obs,
            reward: 0.0,
            terminated: false,
            truncated: false,
        }
    }

    /// A terminated step.
    pub fn terminal(obs: LanderObs) -> Self {
        Self {
            terminated: true,
            ..Self::flying(obs)
        }
    }

    /// A truncated step.
    pub fn truncated(obs: LanderObs) -> Self {
        Self {
            truncated: true,
            ..Self::flying(obs)
        }
    }
}

/// Configuration of [`ScriptedEnv`].
#[derive(Clone, Debug, Default)]
pub struct ScriptedEnvConfig {
    /// Steps returned in order, cycling when the end is reached.
    /// An empty script hovers forever.
    pub steps: Vec<ScriptedStep>,

    /// Size `(width, height)` of the rendered frames, `None` for no frame.
    pub frame_size: Option<(u32, u32)>,

    /// Step index (0-based, counted over the whole run) at which `step` fails.
    pub fail_at_step: Option<usize>,

    /// Call index (0-based) at which `reset` fails.
    pub fail_at_reset: Option<usize>,
}

impl ScriptedEnvConfig {
    /// Sets the script.
    pub fn steps(mut self, steps: Vec<ScriptedStep>) -> Self {
        self.steps = steps;
        self
    }

    /// Sets the frame size.
    pub fn frame_size(mut self, width: u32, height: u32) -> Self {
        self.frame_size = Some((width, height));
        self
    }

    /// Makes `step` fail at the given step index.
    pub fn fail_at_step(mut self, ix: usize) -> Self {
        self.fail_at_step = Some(ix);
        self
    }

    /// Makes `reset` fail at the given call index.
    pub fn fail_at_reset(mut self, ix: usize) -> Self {
        self.fail_at_reset = Some(ix);
        self
    }
}

/// An environment replaying a script of observations.
pub struct ScriptedEnv {
    config: ScriptedEnvConfig,
    cursor: usize,
    n_steps: usize,
    n_resets: usize,
    acts: Vec<DiscreteAct>,
}

impl ScriptedEnv {
    /// Number of calls of [`Env::reset`].
    pub fn n_resets(&self) -> usize {
        self.n_resets
    }

    /// Actions received, in order.
    pub fn acts(&self) -> &[DiscreteAct] {
        &self.acts
    }
}

fn hovering() -> LanderObs {
    LanderObs {
        y: 1.0,
        ..Default::default()
    }
}

impl Env for ScriptedEnv {
    type Config = ScriptedEnvConfig;
    type Act = DiscreteAct;

    fn build(config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            cursor: 0,
            n_steps: 0,
            n_resets: 0,
            acts: vec![],
        })
    }

    fn reset(&mut self) -> Result<LanderObs> {
        let ix = self.n_resets;
        self.n_resets += 1;
        if self.config.fail_at_reset == Some(ix) {
            bail!("Scripted failure at reset {}", ix);
        }
        Ok(hovering())
    }

    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>> {
        if self.config.fail_at_step == Some(self.n_steps) {
            bail!("Scripted failure at step {}", self.n_steps);
        }
        self.n_steps += 1;
        self.acts.push(*a);

        let s = if self.config.steps.is_empty() {
            ScriptedStep::flying(hovering())
        } else {
            let s = self.config.steps[self.cursor % self.config.steps.len()].clone();
            self.cursor += 1;
            s
        };
        Ok(Step::new(s.obs, *a, s.reward, s.terminated, s.truncated))
    }

    fn render(&mut self) -> Result<Option<Frame>> {
        Ok(self
            .config
            .frame_size
            .map(|(w, h)| Frame::new(w, h)))
    }

    fn neutral_act(&self) -> Self::Act {
        DiscreteAct(0)
    }
}

/// An agent always taking the same action and remembering its calls.
pub struct ScriptedAgent {
    act: DiscreteAct,
    n_predicts: usize,
    learn_budgets: Vec<usize>,
    saved: RefCell<Vec<PathBuf>>,
    fail_learn: bool,
}

impl ScriptedAgent {
    /// Constructs an agent taking `act` at every step.
    pub fn new(act: i64) -> Self {
        Self {
            act: DiscreteAct(act),
            n_predicts: 0,
            learn_budgets: vec![],
            saved: RefCell::new(vec![]),
            fail_learn: false,
        }
    }

    /// Makes [`Agent::learn`] fail.
    pub fn failing_learn(mut self) -> Self {
        self.fail_learn = true;
        self
    }

    /// Number of calls of [`Policy::predict`].
    pub fn n_predicts(&self) -> usize {
        self.n_predicts
    }

    /// Budgets given to [`Agent::learn`], in order.
    pub fn learn_budgets(&self) -> &[usize] {
        &self.learn_budgets
    }

    /// Paths given to [`Agent::save_params`], in order.
    pub fn saved(&self) -> Vec<PathBuf> {
        self.saved.borrow().clone()
    }
}

impl Policy<ScriptedEnv> for ScriptedAgent {
    fn predict(&mut self, _obs: &LanderObs, _deterministic: bool) -> Result<DiscreteAct> {
        self.n_predicts += 1;
        Ok(self.act)
    }
}

impl Agent<ScriptedEnv> for ScriptedAgent {
    fn learn(&mut self, step_budget: usize) -> Result<Record> {
        if self.fail_learn {
            bail!("Scripted learn failure");
        }
        self.learn_budgets.push(step_budget);
        Ok(Record::from_scalar("learn_steps", step_budget as f32))
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.saved.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn load_params(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
