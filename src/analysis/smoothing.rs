// Signal smoothing - fixed-capacity sliding window over a scalar measurement
//
// Two policies share one type, selected by configuration:
// - FullWindowMean: no output until the window is primed with N samples,
//   then the arithmetic mean of all N. High latency, strong noise rejection
//   (arm-curl).
// - LastTwoMean: emits after a single sample (raw), then the mean of the
//   two most recent. Low latency, light smoothing (push-up, squat).

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Smoothing policy applied to the measurement window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingPolicy {
    /// Wait for a full window, then average all samples.
    FullWindowMean,
    /// Average the two most recent samples; a single sample passes raw.
    LastTwoMean,
}

/// Fixed-capacity FIFO of the most recent valid measurements.
///
/// Invalid measurements are never pushed (the caller skips the frame
/// entirely), so the window only ever holds usable values.
#[derive(Debug)]
pub struct SignalSmoother {
    window: VecDeque<f32>,
    capacity: usize,
    policy: SmoothingPolicy,
}

impl SignalSmoother {
    pub fn new(capacity: usize, policy: SmoothingPolicy) -> Self {
        Self {
            window: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            policy,
        }
    }

    /// Append a measurement and return the smoothed value, or `None` while
    /// the policy is still pending output.
    pub fn push(&mut self, value: f32) -> Option<f32> {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(value);

        match self.policy {
            SmoothingPolicy::FullWindowMean => {
                if self.window.len() < self.capacity {
                    return None;
                }
                Some(self.window.iter().sum::<f32>() / self.window.len() as f32)
            }
            SmoothingPolicy::LastTwoMean => {
                let len = self.window.len();
                if len >= 2 {
                    Some((self.window[len - 1] + self.window[len - 2]) / 2.0)
                } else {
                    self.window.back().copied()
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_window_mean_waits_for_priming() {
        let mut smoother = SignalSmoother::new(3, SmoothingPolicy::FullWindowMean);
        assert_eq!(smoother.push(10.0), None);
        assert_eq!(smoother.push(20.0), None);
        assert_eq!(smoother.push(30.0), Some(20.0));
    }

    #[test]
    fn full_window_mean_slides() {
        let mut smoother = SignalSmoother::new(3, SmoothingPolicy::FullWindowMean);
        smoother.push(10.0);
        smoother.push(20.0);
        smoother.push(30.0);
        // Oldest (10) evicted: mean of [20, 30, 40]
        assert_eq!(smoother.push(40.0), Some(30.0));
    }

    #[test]
    fn last_two_mean_emits_immediately() {
        let mut smoother = SignalSmoother::new(3, SmoothingPolicy::LastTwoMean);
        assert_eq!(smoother.push(100.0), Some(100.0));
        assert_eq!(smoother.push(120.0), Some(110.0));
        assert_eq!(smoother.push(140.0), Some(130.0));
    }

    #[test]
    fn last_two_mean_ignores_older_samples() {
        let mut smoother = SignalSmoother::new(3, SmoothingPolicy::LastTwoMean);
        smoother.push(0.0);
        smoother.push(0.0);
        smoother.push(170.0);
        assert_eq!(smoother.push(170.0), Some(170.0));
    }

    #[test]
    fn window_never_exceeds_capacity() {
        let mut smoother = SignalSmoother::new(5, SmoothingPolicy::FullWindowMean);
        for i in 0..20 {
            smoother.push(i as f32);
        }
        assert_eq!(smoother.len(), 5);
    }

    #[test]
    fn clear_resets_priming() {
        let mut smoother = SignalSmoother::new(2, SmoothingPolicy::FullWindowMean);
        smoother.push(1.0);
        smoother.push(2.0);
        smoother.clear();
        assert!(smoother.is_empty());
        assert_eq!(smoother.push(5.0), None);
    }
}
