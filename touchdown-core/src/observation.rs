//! Observation vector of a lander.
use crate::error::TouchdownError;
use std::convert::TryFrom;

/// Number of scalars in an observation vector.
pub const OBS_DIM: usize = 8;

/// Snapshot of the simulated physical state at one step.
///
/// The layout follows the 8-dimensional observation of `LunarLander`:
/// position, velocity, tilt, angular velocity and the two leg-contact flags.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct LanderObs {
    /// Horizontal position.
    pub x: f32,

    /// Vertical position.
    pub y: f32,

    /// Horizontal velocity.
    pub vx: f32,

    /// Vertical velocity.
    pub vy: f32,

    /// Tilt angle in radians.
    pub angle: f32,

    /// Angular velocity.
    pub angular_velocity: f32,

    /// Left leg touches the ground.
    pub left_leg_contact: bool,

    /// Right leg touches the ground.
    pub right_leg_contact: bool,
}

impl LanderObs {
    /// Returns `true` if at least one leg touches the ground.
    #[inline]
    pub fn has_leg_contact(&self) -> bool {
        self.left_leg_contact || self.right_leg_contact
    }

    /// Returns the raw vector, leg contacts encoded as `0.0` or `1.0`.
    pub fn to_array(&self) -> [f32; OBS_DIM] {
        [
            self.x,
            self.y,
            self.vx,
            self.vy,
            self.angle,
            self.angular_velocity,
            if self.left_leg_contact { 1.0 } else { 0.0 },
            if self.right_leg_contact { 1.0 } else { 0.0 },
        ]
    }
}

impl From<[f32; OBS_DIM]> for LanderObs {
    /// A leg-contact element is set iff it is non-zero.
    fn from(v: [f32; OBS_DIM]) -> Self {
        Self {
            x: v[0],
            y: v[1],
            vx: v[2],
            vy: v[3],
            angle: v[4],
            angular_velocity: v[5],
            left_leg_contact: v[6] != 0.0,
            right_leg_contact: v[7] != 0.0,
        }
    }
}

impl TryFrom<&[f32]> for LanderObs {
    type Error = TouchdownError;

    fn try_from(v: &[f32]) -> Result<Self, Self::Error> {
        let arr: [f32; OBS_DIM] =
            TryFrom::try_from(v).map_err(|_| TouchdownError::ObservationShape(v.len()))?;
        Ok(arr.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leg_contact_is_nonzero() {
        let obs = LanderObs::from([0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
        assert!(!obs.left_leg_contact);
        assert!(obs.right_leg_contact);
        assert!(obs.has_leg_contact());
        assert!(!LanderObs::default().has_leg_contact());
    }

    #[test]
    fn test_try_from_slice() {
        let v = vec![0.1f32, 0.2, 0.3, 0.4, 0.5, 0.6, 1.0, 0.0];
        let obs = LanderObs::try_from(v.as_slice()).unwrap();
        assert_eq!(obs.vy, 0.4);
        assert_eq!(obs.to_array(), [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 1.0, 0.0]);

        let short = [0f32; 6];
        assert_eq!(
            LanderObs::try_from(&short[..]),
            Err(TouchdownError::ObservationShape(6))
        );
    }
}
