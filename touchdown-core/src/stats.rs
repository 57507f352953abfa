//! Counters and the sink they are published to at every tick.
use crate::Frame;
use anyhow::Result;

/// Landing counters of a run. Both are monotonically non-decreasing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Counters {
    /// Committed successful landings.
    pub success_count: u64,

    /// Failed landings.
    pub failure_count: u64,
}

/// Values handed to a [`StatsSink`] at every tick.
#[derive(Clone, Copy, Debug)]
pub struct TickPayload<'a> {
    /// Latest rendered frame, if the environment produced one.
    pub frame: Option<&'a Frame>,

    /// Committed successful landings.
    pub success_count: u64,

    /// Failed landings.
    pub failure_count: u64,

    /// Remaining fuel of the current episode.
    pub fuel_remaining: f64,
}

impl<'a> TickPayload<'a> {
    /// Constructs a payload from the counters.
    pub fn new(frame: Option<&'a Frame>, counters: Counters, fuel_remaining: f64) -> Self {
        Self {
            frame,
            success_count: counters.success_count,
            failure_count: counters.failure_count,
            fuel_remaining,
        }
    }

    /// Overlay labels: success count, failure count and remaining fuel.
    pub fn overlay_labels(&self) -> [String; 3] {
        [
            format!("Successful landings: {}", self.success_count),
            format!("Landing failures: {}", self.failure_count),
            format!("Fuel: {:.2} s", self.fuel_remaining),
        ]
    }
}

/// Receives counters, fuel level and the latest frame at every tick.
///
/// Implemented by renderers. An error ends the run.
pub trait StatsSink {
    /// Publishes the values of a tick.
    fn publish(&mut self, payload: &TickPayload) -> Result<()>;
}

/// A sink discarding every payload.
#[derive(Default)]
pub struct NullSink {}

impl StatsSink for NullSink {
    fn publish(&mut self, _payload: &TickPayload) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_labels() {
        let counters = Counters {
            success_count: 3,
            failure_count: 12,
        };
        let payload = TickPayload::new(None, counters, 7.456);
        assert_eq!(
            payload.overlay_labels(),
            [
                "Successful landings: 3".to_string(),
                "Landing failures: 12".to_string(),
                "Fuel: 7.46 s".to_string(),
            ]
        );
        assert_eq!(TickPayload::new(None, counters, 0.0).overlay_labels()[2], "Fuel: 0.00 s");
    }
}
