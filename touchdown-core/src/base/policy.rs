//! Policy.
use super::Env;
use crate::LanderObs;
use anyhow::Result;

/// A policy on an environment.
///
/// Policy is a mapping from an observation to an action.
pub trait Policy<E: Env> {
    /// Selects an action given an observation.
    ///
    /// With `deterministic = false` a stochastic policy may sample an action.
    fn predict(&mut self, obs: &LanderObs, deterministic: bool) -> Result<E::Act>;
}
