// MotionExerciseCounter - displacement-direction state machine
//
// Pull-ups/chin-ups have no single joint angle that tracks the movement
// well, so this counter watches the vertical distance between the wrist
// centroid and the shoulder centroid instead. Each frame:
// 1. Validate all four tracked joints (both shoulders, both wrists).
// 2. Append the displacement to a bounded history; compute the movement
//    trend across the last 5 samples.
// 3. Classify the instantaneous direction and feed consecutive-frame
//    confirmation counters (stable frames decay both by 0.5).
// 4. A direction is trusted only after enough consecutive frames; each
//    confirmed change is logged with timestamp and displacement.
// 5. A rep is a (DOWN, UP) tail in the change log whose displacement range
//    exceeds the minimum, gated by a wall-clock cooldown. The log is
//    cleared after a counted rep so the same pair cannot re-trigger.

use std::collections::VecDeque;
use std::sync::Arc;

use log::{debug, info};

use crate::analysis::{CounterStatus, ExerciseCounter, ExerciseState, Position};
use crate::clock::Clock;
use crate::config::MotionCounterConfig;
use crate::pose::{KeypointFrame, KeypointIndex};

/// Confirmed movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Stable,
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Stable => "stable",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

/// One confirmed direction change: what, when, and at what displacement.
#[derive(Debug, Clone, Copy)]
struct DirectionChange {
    direction: Direction,
    at_secs: f64,
    displacement: f32,
}

/// Repetition counter for motion-based exercises (pull-up/chin-up).
pub struct MotionExerciseCounter {
    config: MotionCounterConfig,
    clock: Arc<dyn Clock>,
    /// Raw displacement samples, oldest first
    history: VecDeque<f32>,
    /// Confirmed direction changes, oldest first
    change_log: VecDeque<DirectionChange>,
    direction: Direction,
    consecutive_up: f32,
    consecutive_down: f32,
    last_rep_at: Option<f64>,
    count: u32,
    frame_count: u64,
    last_state: ExerciseState,
}

impl MotionExerciseCounter {
    pub fn new(config: MotionCounterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            history: VecDeque::new(),
            change_log: VecDeque::new(),
            direction: Direction::Stable,
            consecutive_up: 0.0,
            consecutive_down: 0.0,
            last_rep_at: None,
            count: 0,
            frame_count: 0,
            last_state: ExerciseState::Position(Position::Neutral),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Vertical wrist-to-shoulder displacement for a frame.
    ///
    /// Positive movement of this value over time means the shoulders are
    /// rising relative to the wrists (the athlete pulling up).
    pub fn displacement(frame: &KeypointFrame) -> f32 {
        let left_shoulder = frame.joint(KeypointIndex::LeftShoulder);
        let right_shoulder = frame.joint(KeypointIndex::RightShoulder);
        let left_wrist = frame.joint(KeypointIndex::LeftWrist);
        let right_wrist = frame.joint(KeypointIndex::RightWrist);

        let shoulder_y = (left_shoulder.y + right_shoulder.y) / 2.0;
        let wrist_y = (left_wrist.y + right_wrist.y) / 2.0;
        wrist_y - shoulder_y
    }

    fn tracked_joints_confident(&self, frame: &KeypointFrame) -> bool {
        [
            KeypointIndex::LeftShoulder,
            KeypointIndex::RightShoulder,
            KeypointIndex::LeftWrist,
            KeypointIndex::RightWrist,
        ]
        .iter()
        .all(|&index| frame.joint(index).confidence >= self.config.min_confidence)
    }

    fn push_history(&mut self, displacement: f32) {
        if self.history.len() == self.config.position_history {
            self.history.pop_front();
        }
        self.history.push_back(displacement);
    }

    /// Movement across the trend span: newest sample minus the sample
    /// `trend_span` positions back.
    fn trend_movement(&self) -> f32 {
        let len = self.history.len();
        self.history[len - 1] - self.history[len - self.config.trend_span]
    }

    /// Classify the instantaneous direction of a movement value.
    fn classify(&self, movement: f32) -> Direction {
        if movement > self.config.movement_threshold {
            Direction::Up
        } else if movement < -self.config.movement_threshold {
            Direction::Down
        } else {
            Direction::Stable
        }
    }

    /// Feed the confirmation counters with this frame's direction.
    fn update_confirmation(&mut self, instantaneous: Direction) {
        match instantaneous {
            Direction::Up => {
                self.consecutive_up += 1.0;
                self.consecutive_down = 0.0;
            }
            Direction::Down => {
                self.consecutive_down += 1.0;
                self.consecutive_up = 0.0;
            }
            Direction::Stable => {
                // No clear direction: decay both counters toward zero
                self.consecutive_up = (self.consecutive_up - 0.5).max(0.0);
                self.consecutive_down = (self.consecutive_down - 0.5).max(0.0);
            }
        }
    }

    /// Resolve the confirmed direction from the counters.
    ///
    /// Confirmation is sticky: without enough support for a new direction
    /// the previous one holds, reverting to stable only when both counters
    /// fully decay.
    fn confirmed_direction(&self) -> Direction {
        if self.consecutive_up >= self.config.min_consecutive_frames {
            Direction::Up
        } else if self.consecutive_down >= self.config.min_consecutive_frames {
            Direction::Down
        } else if self.consecutive_up == 0.0 && self.consecutive_down == 0.0 {
            Direction::Stable
        } else {
            self.direction
        }
    }

    fn record_direction_change(&mut self, direction: Direction, displacement: f32) {
        if self.change_log.len() == self.config.change_log_capacity {
            self.change_log.pop_front();
        }
        self.change_log.push_back(DirectionChange {
            direction,
            at_secs: self.clock.now(),
            displacement,
        });
        self.direction = direction;
        info!(
            "[pull-up] direction {} (displacement {:.1})",
            direction.as_str(),
            displacement
        );
    }

    /// Count a rep if the change log ends in a qualifying DOWN -> UP pair.
    fn try_count_rep(&mut self) {
        let now = self.clock.now();
        if let Some(last_rep) = self.last_rep_at {
            if now - last_rep <= self.config.rep_cooldown_secs {
                return;
            }
        }

        if self.change_log.len() < 2 {
            return;
        }
        let len = self.change_log.len();
        let down = self.change_log[len - 2];
        let up = self.change_log[len - 1];

        if down.direction != Direction::Down || up.direction != Direction::Up {
            return;
        }

        let movement_range = (up.displacement - down.displacement).abs();
        if movement_range > self.config.min_movement_range {
            self.count += 1;
            self.last_rep_at = Some(now);
            // Clear so the same pair cannot count twice
            self.change_log.clear();
            info!(
                "[pull-up] rep #{} completed (range {:.1}, down at {:.2}s, up at {:.2}s)",
                self.count, movement_range, down.at_secs, up.at_secs
            );
        } else {
            debug!(
                "[pull-up] cycle range {:.1} below minimum {:.1}, not counted",
                movement_range, self.config.min_movement_range
            );
        }
    }

    fn report(&mut self, position: Position) -> (u32, ExerciseState) {
        self.last_state = ExerciseState::Position(position);
        (self.count, self.last_state)
    }
}

impl ExerciseCounter for MotionExerciseCounter {
    fn analyze(&mut self, frame: Option<&KeypointFrame>) -> (u32, ExerciseState) {
        self.frame_count += 1;

        let Some(frame) = frame else {
            return self.report(Position::NoPerson);
        };

        if !self.tracked_joints_confident(frame) {
            return self.report(Position::LowConfidence);
        }

        let displacement = Self::displacement(frame);
        self.push_history(displacement);

        if self.history.len() < self.config.trend_span {
            return self.report(Position::Starting);
        }

        let movement = self.trend_movement();
        let instantaneous = self.classify(movement);
        self.update_confirmation(instantaneous);

        let confirmed = self.confirmed_direction();
        if confirmed != self.direction {
            self.record_direction_change(confirmed, displacement);
        }

        self.try_count_rep();

        let position = match self.direction {
            Direction::Up => Position::PullingUp,
            Direction::Down => Position::LoweringDown,
            Direction::Stable => Position::Stable,
        };
        self.report(position)
    }

    fn reset(&mut self) {
        self.count = 0;
        self.frame_count = 0;
        self.history.clear();
        self.change_log.clear();
        self.direction = Direction::Stable;
        self.consecutive_up = 0.0;
        self.consecutive_down = 0.0;
        self.last_rep_at = None;
        self.last_state = ExerciseState::Position(Position::Neutral);
        info!("[pull-up] counter reset");
    }

    fn status(&self) -> CounterStatus {
        CounterStatus {
            count: self.count,
            frame_count: self.frame_count,
            state: self.last_state.label(),
        }
    }

    fn count(&self) -> u32 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::testing::fixtures::pullup_frame;

    fn counter_with_clock() -> (MotionExerciseCounter, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let counter = MotionExerciseCounter::new(MotionCounterConfig::default(), clock.clone());
        (counter, clock)
    }

    fn feed(
        counter: &mut MotionExerciseCounter,
        clock: &ManualClock,
        displacements: &[f32],
    ) -> (u32, ExerciseState) {
        let mut last = (0, ExerciseState::Pending);
        for &displacement in displacements {
            // ~30 fps frame spacing
            clock.advance(1.0 / 30.0);
            let frame = pullup_frame(displacement, 0.9);
            last = counter.analyze(Some(&frame));
        }
        last
    }

    /// A full hang -> pull -> lower -> pull cycle with generous amplitude.
    fn full_cycle() -> Vec<f32> {
        let mut sequence = vec![-60.0; 5];
        // First pull (UP confirms, but no prior DOWN in the log yet)
        sequence.extend([-50.0, -40.0, -30.0, -20.0, -10.0]);
        // Lower back down (DOWN confirms)
        sequence.extend([-20.0, -30.0, -40.0, -50.0, -60.0]);
        // Second pull (UP confirms: DOWN -> UP tail completes a rep)
        sequence.extend([-50.0, -40.0, -30.0, -20.0, -10.0]);
        sequence
    }

    #[test]
    fn full_cycle_counts_exactly_one_rep() {
        let (mut counter, clock) = counter_with_clock();
        let (count, state) = feed(&mut counter, &clock, &full_cycle());

        assert_eq!(count, 1);
        assert_eq!(state, ExerciseState::Position(Position::PullingUp));
        // Log cleared after the counted rep
        assert!(counter.change_log.is_empty());
    }

    #[test]
    fn shallow_cycle_counts_nothing() {
        let (mut counter, clock) = counter_with_clock();

        // Directions confirm (movement over the 5-sample trend exceeds the
        // 4px threshold) but the displacement range between the confirmed
        // DOWN and UP stays at the 15px minimum, which must not count
        let mut sequence = vec![-20.0; 5];
        sequence.extend([-23.0, -26.0, -29.0, -32.0]); // down
        sequence.extend([-29.0, -26.0, -23.0, -20.0, -17.0]); // back up
        let (count, _) = feed(&mut counter, &clock, &sequence);

        assert_eq!(count, 0);
        assert!(
            !counter.change_log.is_empty(),
            "directions should confirm even when the rep does not"
        );
    }

    #[test]
    fn warm_up_reports_starting() {
        let (mut counter, clock) = counter_with_clock();
        for i in 0..4 {
            clock.advance(1.0 / 30.0);
            let frame = pullup_frame(-60.0, 0.9);
            let (_, state) = counter.analyze(Some(&frame));
            assert_eq!(
                state,
                ExerciseState::Position(Position::Starting),
                "frame {} should report starting",
                i
            );
        }
        // Fifth sample fills the trend span
        clock.advance(1.0 / 30.0);
        let frame = pullup_frame(-60.0, 0.9);
        let (_, state) = counter.analyze(Some(&frame));
        assert_eq!(state, ExerciseState::Position(Position::Stable));
    }

    #[test]
    fn no_person_mutates_nothing() {
        let (mut counter, clock) = counter_with_clock();
        feed(&mut counter, &clock, &[-60.0, -60.0, -60.0]);
        let history_before = counter.history.len();

        let (count, state) = counter.analyze(None);
        assert_eq!(count, 0);
        assert_eq!(state, ExerciseState::Position(Position::NoPerson));
        assert_eq!(counter.history.len(), history_before);
        assert_eq!(counter.consecutive_up, 0.0);
    }

    #[test]
    fn low_confidence_mutates_nothing() {
        let (mut counter, clock) = counter_with_clock();
        feed(&mut counter, &clock, &full_cycle()[..8].to_vec());
        let history_before = counter.history.len();
        let up_before = counter.consecutive_up;

        // A wild displacement at low confidence must be ignored entirely
        let frame = pullup_frame(500.0, 0.1);
        let (_, state) = counter.analyze(Some(&frame));

        assert_eq!(state, ExerciseState::Position(Position::LowConfidence));
        assert_eq!(counter.history.len(), history_before);
        assert_eq!(counter.consecutive_up, up_before);
    }

    #[test]
    fn cooldown_blocks_back_to_back_reps() {
        let clock = Arc::new(ManualClock::new());
        let mut config = MotionCounterConfig::default();
        config.rep_cooldown_secs = 600.0; // effectively never cools down
        let mut counter = MotionExerciseCounter::new(config, clock.clone());

        let mut sequence = full_cycle();
        // Second full lower/pull immediately after the first rep
        sequence.extend([-20.0, -30.0, -40.0, -50.0, -60.0]);
        sequence.extend([-50.0, -40.0, -30.0, -20.0, -10.0]);
        let (count, _) = feed(&mut counter, &clock, &sequence);

        assert_eq!(count, 1, "cooldown must swallow the second rep");
    }

    #[test]
    fn second_rep_counts_after_cooldown() {
        let (mut counter, clock) = counter_with_clock();
        let (count, _) = feed(&mut counter, &clock, &full_cycle());
        assert_eq!(count, 1);

        // Default cooldown is 0.5s; frames arrive at ~33ms so the second
        // cycle's 10 frames alone leave ~0.33s. Let the athlete hang for a
        // moment first.
        clock.advance(1.0);
        let mut second = vec![-20.0, -30.0, -40.0, -50.0, -60.0];
        second.extend([-50.0, -40.0, -30.0, -20.0, -10.0]);
        let (count, _) = feed(&mut counter, &clock, &second);
        assert_eq!(count, 2);
    }

    #[test]
    fn stable_frames_decay_confirmation_counters() {
        let (mut counter, clock) = counter_with_clock();
        let mut sequence = vec![-60.0; 5];
        sequence.extend([-50.0, -40.0, -40.0, -40.0, -40.0]);
        feed(&mut counter, &clock, &sequence);
        assert_eq!(counter.consecutive_up, 5.0);

        // The trend window is now flat: each stable frame decays the
        // counter by 0.5
        feed(&mut counter, &clock, &[-40.0]);
        assert_eq!(counter.consecutive_up, 4.5);
        feed(&mut counter, &clock, &[-40.0]);
        assert_eq!(counter.consecutive_up, 4.0);
    }

    #[test]
    fn count_is_monotone_and_reset_zeroes_everything() {
        let (mut counter, clock) = counter_with_clock();
        let mut previous = 0;
        for &displacement in &full_cycle() {
            clock.advance(1.0 / 30.0);
            let frame = pullup_frame(displacement, 0.9);
            let (count, _) = counter.analyze(Some(&frame));
            assert!(count >= previous);
            previous = count;
        }
        assert_eq!(previous, 1);

        counter.reset();
        assert_eq!(counter.count(), 0);
        assert!(counter.history.is_empty());
        assert!(counter.change_log.is_empty());
        assert_eq!(counter.direction, Direction::Stable);
        assert_eq!(counter.last_rep_at, None);
    }

    #[test]
    fn history_is_bounded() {
        let (mut counter, clock) = counter_with_clock();
        let displacements: Vec<f32> = (0..100).map(|i| -(i as f32)).collect();
        feed(&mut counter, &clock, &displacements);
        assert_eq!(counter.history.len(), counter.config.position_history);
    }
}
