// AngleExerciseCounter - joint-angle state machine with hysteresis
//
// Covers push-up, squat, and arm-curl. Each frame:
// 1. Measure the tracked angle on both body sides and select a working
//    measurement (average when side confidences agree within 0.1, otherwise
//    the more confident side).
// 2. Reject the frame below the confidence floor.
// 3. Smooth the angle through the configured window policy.
// 4. Run the two-phase machine with distinct up/down thresholds
//    (hysteresis) and a minimum-dwell-frame gate against chatter.
//
// Push-up and squat count on the raise transition, gated on a prior
// descent. The arm-curl counts at the extension transition with no gate:
// the raised phase is the curl itself and the rep completes on the way out.

use log::{debug, info};

use crate::analysis::geometry;
use crate::analysis::smoothing::SignalSmoother;
use crate::analysis::{CounterStatus, ExerciseCounter, ExerciseState};
use crate::config::{AngleCounterConfig, CountTrigger};
use crate::pose::{JointTriple, KeypointFrame};

/// Side confidences closer than this are treated as equally trustworthy
/// and the two angles are averaged.
const SIDE_CONFIDENCE_DELTA: f32 = 0.1;

/// Which body side produced the working angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    /// Both sides agreed; the angle is their average
    Both,
}

/// One frame's selected angle measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleMeasurement {
    /// Angle in degrees, [0, 180]
    pub angle_deg: f32,
    /// Mean confidence of the contributing joints
    pub confidence: f32,
    pub side: Side,
}

/// Movement phase of an angle-based exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Up,
    Down,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Up => "up",
            Phase::Down => "down",
        }
    }
}

/// Repetition counter for angle-threshold exercises.
pub struct AngleExerciseCounter {
    /// Exercise name used in logs ("push-up", "squat", "arm-curl")
    name: &'static str,
    config: AngleCounterConfig,
    left: JointTriple,
    right: JointTriple,
    smoother: SignalSmoother,
    phase: Phase,
    went_down: bool,
    last_phase_change: u64,
    count: u32,
    frame_count: u64,
    last_state: ExerciseState,
}

impl AngleExerciseCounter {
    /// Create a counter for the given symmetric joint triples.
    ///
    /// The initial phase follows the count trigger: raise-counting
    /// exercises start raised (push-up top, standing squat), the arm-curl
    /// starts extended.
    pub fn new(
        name: &'static str,
        left: JointTriple,
        right: JointTriple,
        config: AngleCounterConfig,
    ) -> Self {
        let smoother = SignalSmoother::new(config.window, config.smoothing);
        let phase = Self::initial_phase(&config);
        info!(
            "[{}] counter ready: up={:.0}°, down={:.0}°, window={}, dwell={}",
            name, config.up_threshold, config.down_threshold, config.window, config.min_dwell_frames
        );
        Self {
            name,
            config,
            left,
            right,
            smoother,
            phase,
            went_down: false,
            last_phase_change: 0,
            count: 0,
            frame_count: 0,
            last_state: ExerciseState::Pending,
        }
    }

    fn initial_phase(config: &AngleCounterConfig) -> Phase {
        match config.count_on {
            CountTrigger::RaiseAfterDescent => Phase::Up,
            CountTrigger::Extension => Phase::Down,
        }
    }

    /// Adjust thresholds at runtime (configuration surface).
    pub fn set_thresholds(&mut self, up: Option<f32>, down: Option<f32>) {
        if let Some(up) = up {
            self.config.up_threshold = up;
            info!("[{}] up threshold adjusted to {:.0}°", self.name, up);
        }
        if let Some(down) = down {
            self.config.down_threshold = down;
            info!("[{}] down threshold adjusted to {:.0}°", self.name, down);
        }
    }

    fn side_measurement(frame: &KeypointFrame, triple: JointTriple) -> Option<(f32, f32)> {
        let (a, b, c) = triple.resolve(frame);
        let angle = geometry::joint_angle(a, b, c)?;
        let confidence = (a.confidence + b.confidence + c.confidence) / 3.0;
        Some((angle, confidence))
    }

    /// Select the working angle from the two body sides.
    fn measure(&self, frame: &KeypointFrame) -> Option<AngleMeasurement> {
        let left = Self::side_measurement(frame, self.left);
        let right = Self::side_measurement(frame, self.right);

        match (left, right) {
            (Some((l_angle, l_conf)), Some((r_angle, r_conf))) => {
                if (l_conf - r_conf).abs() < SIDE_CONFIDENCE_DELTA {
                    Some(AngleMeasurement {
                        angle_deg: (l_angle + r_angle) / 2.0,
                        confidence: (l_conf + r_conf) / 2.0,
                        side: Side::Both,
                    })
                } else if r_conf > l_conf {
                    Some(AngleMeasurement {
                        angle_deg: r_angle,
                        confidence: r_conf,
                        side: Side::Right,
                    })
                } else {
                    Some(AngleMeasurement {
                        angle_deg: l_angle,
                        confidence: l_conf,
                        side: Side::Left,
                    })
                }
            }
            (Some((angle, confidence)), None) => Some(AngleMeasurement {
                angle_deg: angle,
                confidence,
                side: Side::Left,
            }),
            (None, Some((angle, confidence))) => Some(AngleMeasurement {
                angle_deg: angle,
                confidence,
                side: Side::Right,
            }),
            (None, None) => None,
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(
            "[{}] phase {} -> {} at frame {}",
            self.name,
            self.phase.as_str(),
            phase.as_str(),
            self.frame_count
        );
        self.phase = phase;
        self.last_phase_change = self.frame_count;
    }

    /// Run the hysteresis state machine over a smoothed angle.
    fn advance_phase(&mut self, angle: f32) {
        // Dwell gate: suppress transitions until the current phase has held
        // long enough
        if self.frame_count - self.last_phase_change < self.config.min_dwell_frames {
            return;
        }

        match (self.config.count_on, self.phase) {
            (CountTrigger::RaiseAfterDescent, Phase::Up) => {
                if angle < self.config.down_threshold {
                    self.set_phase(Phase::Down);
                    self.went_down = true;
                    info!(
                        "[{}] descent at {:.1}° (threshold {:.0}°)",
                        self.name, angle, self.config.down_threshold
                    );
                }
            }
            (CountTrigger::RaiseAfterDescent, Phase::Down) => {
                if angle > self.config.up_threshold {
                    self.set_phase(Phase::Up);
                    if self.went_down {
                        self.count += 1;
                        self.went_down = false;
                        info!(
                            "[{}] rep #{} at {:.1}° (threshold {:.0}°)",
                            self.name, self.count, angle, self.config.up_threshold
                        );
                    } else {
                        debug!("[{}] raise without prior descent, not counted", self.name);
                    }
                }
            }
            (CountTrigger::Extension, Phase::Down) => {
                if angle < self.config.up_threshold {
                    self.set_phase(Phase::Up);
                    info!(
                        "[{}] curl at {:.1}° (threshold {:.0}°)",
                        self.name, angle, self.config.up_threshold
                    );
                }
            }
            (CountTrigger::Extension, Phase::Up) => {
                if angle > self.config.down_threshold {
                    self.set_phase(Phase::Down);
                    self.count += 1;
                    info!(
                        "[{}] rep #{} completed, extended to {:.1}°",
                        self.name, self.count, angle
                    );
                }
            }
        }
    }

    fn pending(&mut self) -> (u32, ExerciseState) {
        self.last_state = ExerciseState::Pending;
        (self.count, ExerciseState::Pending)
    }
}

impl ExerciseCounter for AngleExerciseCounter {
    fn analyze(&mut self, frame: Option<&KeypointFrame>) -> (u32, ExerciseState) {
        self.frame_count += 1;

        let Some(frame) = frame else {
            return self.pending();
        };

        let Some(measurement) = self.measure(frame) else {
            return self.pending();
        };

        if measurement.confidence < self.config.min_confidence {
            return self.pending();
        }

        let Some(smoothed) = self.smoother.push(measurement.angle_deg) else {
            return self.pending();
        };

        self.advance_phase(smoothed);

        if self.frame_count % 10 == 0 {
            debug!(
                "[{}] frame {}: angle {:.1}°, phase {}, count {}",
                self.name,
                self.frame_count,
                smoothed,
                self.phase.as_str(),
                self.count
            );
        }

        self.last_state = ExerciseState::Angle(smoothed);
        (self.count, self.last_state)
    }

    fn reset(&mut self) {
        self.count = 0;
        self.frame_count = 0;
        self.phase = Self::initial_phase(&self.config);
        self.went_down = false;
        self.last_phase_change = 0;
        self.smoother.clear();
        self.last_state = ExerciseState::Pending;
        info!("[{}] counter reset", self.name);
    }

    fn status(&self) -> CounterStatus {
        CounterStatus {
            count: self.count,
            frame_count: self.frame_count,
            state: format!(
                "{} ({})",
                self.phase.as_str(),
                self.last_state.label()
            ),
        }
    }

    fn count(&self) -> u32 {
        self.count
    }
}
