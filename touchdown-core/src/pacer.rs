//! Fixed-rate pacing of displayed ticks.
use std::time::{Duration, Instant};

/// Sleeps so that consecutive calls of [`FramePacer::tick`] are at least one
/// frame period apart.
///
/// Pacing only smooths the display. It does not change the number of
/// simulated steps or any classification.
#[derive(Debug)]
pub struct FramePacer {
    period: Option<Duration>,
    last: Option<Instant>,
}

impl FramePacer {
    /// Constructs a pacer for `target_frame_rate` ticks per second.
    ///
    /// A rate of 0 disables pacing.
    pub fn new(target_frame_rate: u32) -> Self {
        let period = match target_frame_rate {
            0 => None,
            fps => Some(Duration::from_secs(1) / fps),
        };
        Self { period, last: None }
    }

    /// Frame period, `None` if pacing is disabled.
    pub fn period(&self) -> Option<Duration> {
        self.period
    }

    /// Waits for the rest of the current frame period and returns the time slept.
    pub fn tick(&mut self) -> Duration {
        let period = match self.period {
            Some(period) => period,
            None => return Duration::from_secs(0),
        };

        let slept = match self.last {
            Some(last) => {
                let elapsed = last.elapsed();
                if elapsed < period {
                    let wait = period - elapsed;
                    std::thread::sleep(wait);
                    wait
                } else {
                    Duration::from_secs(0)
                }
            }
            None => Duration::from_secs(0),
        };
        self.last = Some(Instant::now());
        slept
    }
}
