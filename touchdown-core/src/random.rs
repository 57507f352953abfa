//! Uniformly random agent.
use crate::{record::Record, Agent, Env, LanderObs, Policy};
use anyhow::Result;
use log::info;
use std::path::Path;

/// Samples one of `n_acts` discrete actions uniformly, ignoring the observation.
///
/// It does not learn and has no parameters. Useful to check a display or a
/// recorder without a trained model.
pub struct RandomAgent {
    n_acts: u32,
}

impl RandomAgent {
    /// Constructs an agent over the actions `0..n_acts`.
    pub fn new(n_acts: u32) -> Self {
        Self {
            n_acts: n_acts.max(1),
        }
    }
}

impl<E> Policy<E> for RandomAgent
where
    E: Env,
    E::Act: From<i64>,
{
    fn predict(&mut self, _obs: &LanderObs, _deterministic: bool) -> Result<E::Act> {
        Ok(i64::from(fastrand::u32(..self.n_acts)).into())
    }
}

impl<E> Agent<E> for RandomAgent
where
    E: Env,
    E::Act: From<i64>,
{
    fn learn(&mut self, _step_budget: usize) -> Result<Record> {
        Ok(Record::empty())
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        info!("Random agent has no parameters to save in {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{dummy::ScriptedEnv, DiscreteAct};

    #[test]
    fn test_random_actions_in_range() -> Result<()> {
        fastrand::seed(42);
        let mut agent = RandomAgent::new(4);
        let obs = LanderObs::default();
        for _ in 0..200 {
            let DiscreteAct(a) = Policy::<ScriptedEnv>::predict(&mut agent, &obs, true)?;
            assert!((0..4).contains(&a));
        }
        assert!(Agent::<ScriptedEnv>::learn(&mut agent, 10)?.is_empty());
        Ok(())
    }
}
