//! Environment.
use super::{Act, Step};
use crate::LanderObs;
use anyhow::Result;
use image::RgbImage;

/// A rendered frame, `height x width x 3` channels.
pub type Frame = RgbImage;

/// Represents an episodic simulation emitting [`LanderObs`].
///
/// All methods are blocking. Any error returned by [`Env::reset`],
/// [`Env::step`] or [`Env::render`] ends the run of the
/// [`EpisodeLoop`](crate::EpisodeLoop).
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Action of the environment.
    type Act: Act;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Starts a new episode and returns its first observation.
    fn reset(&mut self) -> Result<LanderObs>;

    /// Performs an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<Step<Self>>
    where
        Self: Sized;

    /// Renders the current state.
    ///
    /// `Ok(None)` means no frame is available, which is not an error.
    fn render(&mut self) -> Result<Option<Frame>>;

    /// The no-op action taken when the fuel is exhausted.
    fn neutral_act(&self) -> Self::Act;
}
