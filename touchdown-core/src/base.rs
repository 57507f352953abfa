//! Collaborator traits: environment, policy and agent.
mod agent;
mod env;
mod policy;
mod step;
pub use agent::Agent;
pub use env::{Env, Frame};
pub use policy::Policy;
use std::fmt::Debug;
pub use step::Step;

/// An action of the environment.
pub trait Act: Clone + Debug {}

/// A discrete action, the index of one of the actions of the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DiscreteAct(pub i64);

impl Act for DiscreteAct {}

impl From<i64> for DiscreteAct {
    fn from(v: i64) -> Self {
        Self(v)
    }
}
