//! Classification of terminal steps into landing outcomes.
//!
//! Both predicates are pure functions of an observation and a threshold record.
//! [`OutcomeClassifier::classify`] evaluates the failure predicate first and
//! consults the success predicate only when the failure predicate is false,
//! so an observation satisfying both is a [`EpisodeOutcome::Failure`].
use crate::{error::TouchdownError, LanderObs};
use serde::{Deserialize, Serialize};

/// Outcome of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeOutcome {
    /// Crash, drift out of the landing zone or excessive tilt.
    Failure,

    /// Soft, upright touchdown inside the landing zone.
    Success,

    /// Non-terminal step, or a terminal step matching neither predicate.
    Ongoing,
}

impl EpisodeOutcome {
    /// Name used in records and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Failure => "failure",
            Self::Success => "success",
            Self::Ongoing => "ongoing",
        }
    }
}

/// Bounds of the failure predicate.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct FailureThresholds {
    /// Vertical speed above which a near-ground lander has crashed.
    pub velocity: f32,

    /// Height at or below which the lander is considered near the ground.
    pub height: f32,

    /// Left end of the landing zone.
    pub x_min: f32,

    /// Right end of the landing zone.
    pub x_max: f32,

    /// Tilt above which the landing has failed.
    pub angle: f32,
}

impl Default for FailureThresholds {
    fn default() -> Self {
        Self {
            velocity: 2.0,
            height: 0.1,
            x_min: -0.2,
            x_max: 0.2,
            angle: 0.2,
        }
    }
}

/// Bounds of the success predicate.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub struct SuccessThresholds {
    /// Upper bound (exclusive) of both horizontal and vertical speed.
    pub velocity: f32,

    /// Height at or below which the lander is on the ground.
    pub height: f32,

    /// Left end of the landing zone.
    pub x_min: f32,

    /// Right end of the landing zone.
    pub x_max: f32,

    /// Upper bound (exclusive) of the tilt.
    pub angle: f32,
}

impl Default for SuccessThresholds {
    fn default() -> Self {
        Self {
            velocity: 0.5,
            height: 0.0,
            x_min: -0.2,
            x_max: 0.2,
            angle: 0.2,
        }
    }
}

fn check_bounds(
    kind: &str,
    velocity: f32,
    height: f32,
    x_min: f32,
    x_max: f32,
    angle: f32,
) -> Result<(), TouchdownError> {
    let values = [velocity, height, x_min, x_max, angle];
    if values.iter().any(|v| !v.is_finite()) {
        return Err(TouchdownError::InvalidThresholds(format!(
            "{} thresholds must be finite: {:?}",
            kind, values
        )));
    }
    if velocity < 0.0 || angle < 0.0 {
        return Err(TouchdownError::InvalidThresholds(format!(
            "{} velocity and angle must be non-negative (velocity = {}, angle = {})",
            kind, velocity, angle
        )));
    }
    if x_min > x_max {
        return Err(TouchdownError::InvalidThresholds(format!(
            "{} x_min ({}) is larger than x_max ({})",
            kind, x_min, x_max
        )));
    }
    Ok(())
}

impl FailureThresholds {
    /// Checks that the bounds describe a usable predicate.
    pub fn validate(&self) -> Result<(), TouchdownError> {
        check_bounds(
            "failure",
            self.velocity,
            self.height,
            self.x_min,
            self.x_max,
            self.angle,
        )
    }
}

impl SuccessThresholds {
    /// Checks that the bounds describe a usable predicate.
    pub fn validate(&self) -> Result<(), TouchdownError> {
        check_bounds(
            "success",
            self.velocity,
            self.height,
            self.x_min,
            self.x_max,
            self.angle,
        )
    }
}

/// Returns `true` if the observation is a failed landing.
///
/// Any of the following is a failure:
/// * hitting the ground zone (`y <= height`) with `|vy| > velocity`,
/// * `x` outside `[x_min, x_max]`,
/// * `|angle| > angle`.
pub fn classify_failure(obs: &LanderObs, th: &FailureThresholds) -> bool {
    if obs.y <= th.height && obs.vy.abs() > th.velocity {
        return true;
    }
    if obs.x < th.x_min || obs.x > th.x_max {
        return true;
    }
    obs.angle.abs() > th.angle
}

/// Returns `true` if the observation is a successful landing.
///
/// All of the following must hold: `y <= height`, `|vy|` and `|vx|` below
/// `velocity`, `x` in `[x_min, x_max]`, `|angle| < angle` and at least one leg
/// touching the ground.
pub fn classify_success(obs: &LanderObs, th: &SuccessThresholds) -> bool {
    obs.y <= th.height
        && obs.vy.abs() < th.velocity
        && obs.vx.abs() < th.velocity
        && th.x_min <= obs.x
        && obs.x <= th.x_max
        && obs.angle.abs() < th.angle
        && obs.has_leg_contact()
}

/// Maps terminal steps to [`EpisodeOutcome`]s with failure-first priority.
#[derive(Clone, Debug, PartialEq)]
pub struct OutcomeClassifier {
    failure: FailureThresholds,
    success: SuccessThresholds,
}

impl Default for OutcomeClassifier {
    fn default() -> Self {
        Self {
            failure: FailureThresholds::default(),
            success: SuccessThresholds::default(),
        }
    }
}

impl OutcomeClassifier {
    /// Constructs a classifier, rejecting invalid thresholds.
    pub fn new(
        failure: FailureThresholds,
        success: SuccessThresholds,
    ) -> Result<Self, TouchdownError> {
        failure.validate()?;
        success.validate()?;
        Ok(Self { failure, success })
    }

    /// Thresholds of the failure predicate.
    pub fn failure_thresholds(&self) -> &FailureThresholds {
        &self.failure
    }

    /// Thresholds of the success predicate.
    pub fn success_thresholds(&self) -> &SuccessThresholds {
        &self.success
    }

    /// Classifies a step.
    ///
    /// `is_done` is `true` if the step was terminated or truncated.
    /// Non-terminal steps are always [`EpisodeOutcome::Ongoing`].
    pub fn classify(&self, obs: &LanderObs, is_done: bool) -> EpisodeOutcome {
        if !is_done {
            EpisodeOutcome::Ongoing
        } else if classify_failure(obs, &self.failure) {
            EpisodeOutcome::Failure
        } else if classify_success(obs, &self.success) {
            EpisodeOutcome::Success
        } else {
            EpisodeOutcome::Ongoing
        }
    }
}
