// Pose data model - keypoint frames in the standard 17-point body layout
//
// The detector itself is an external collaborator (see `PoseSource`); the
// engine only consumes its output: one frame of 17 `[x, y, confidence]`
// joints per analyzed image, or no frame at all when no person is visible.
//
// Index layout (COCO):
//   0 nose, 1/2 eyes, 3/4 ears, 5/6 shoulders, 7/8 elbows, 9/10 wrists,
//   11/12 hips, 13/14 knees, 15/16 ankles

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::PoseError;

/// Number of joints in a body-pose frame.
pub const KEYPOINT_COUNT: usize = 17;

/// One detected body joint: 2D position plus detection confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Detection confidence in [0, 1]
    pub confidence: f32,
}

impl Keypoint {
    pub fn new(x: f32, y: f32, confidence: f32) -> Self {
        Self { x, y, confidence }
    }
}

/// Named indices into a [`KeypointFrame`] (COCO 17-point layout).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum KeypointIndex {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftEar = 3,
    RightEar = 4,
    LeftShoulder = 5,
    RightShoulder = 6,
    LeftElbow = 7,
    RightElbow = 8,
    LeftWrist = 9,
    RightWrist = 10,
    LeftHip = 11,
    RightHip = 12,
    LeftKnee = 13,
    RightKnee = 14,
    LeftAnkle = 15,
    RightAnkle = 16,
}

/// One frame of detected keypoints.
///
/// Immutable once constructed; counters only read it. Construction via
/// [`KeypointFrame::from_rows`] validates shape and finiteness so malformed
/// service payloads are rejected at the boundary instead of surfacing as
/// NaN angles deep inside a state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointFrame {
    joints: [Keypoint; KEYPOINT_COUNT],
}

impl KeypointFrame {
    pub fn new(joints: [Keypoint; KEYPOINT_COUNT]) -> Self {
        Self { joints }
    }

    /// Build a frame from raw `[x, y, confidence]` rows.
    ///
    /// # Errors
    /// * `PoseError::MalformedFrame` - row count is not 17
    /// * `PoseError::NonFiniteValue` - any coordinate or confidence is NaN/inf
    pub fn from_rows(rows: &[[f32; 3]]) -> Result<Self, PoseError> {
        if rows.len() != KEYPOINT_COUNT {
            return Err(PoseError::MalformedFrame {
                expected: KEYPOINT_COUNT,
                got: rows.len(),
            });
        }

        let mut joints = [Keypoint::new(0.0, 0.0, 0.0); KEYPOINT_COUNT];
        for (index, row) in rows.iter().enumerate() {
            if row.iter().any(|value| !value.is_finite()) {
                return Err(PoseError::NonFiniteValue { index });
            }
            joints[index] = Keypoint::new(row[0], row[1], row[2]);
        }

        Ok(Self { joints })
    }

    pub fn joint(&self, index: KeypointIndex) -> Keypoint {
        self.joints[index as usize]
    }

    pub fn joints(&self) -> &[Keypoint; KEYPOINT_COUNT] {
        &self.joints
    }

    /// Serialize back to raw rows (fixture scripts, debug payloads).
    pub fn to_rows(&self) -> Vec<[f32; 3]> {
        self.joints
            .iter()
            .map(|joint| [joint.x, joint.y, joint.confidence])
            .collect()
    }
}

/// Three joints defining one measured angle (first-vertex-last).
///
/// Static per exercise variant: the angle is always computed at the vertex
/// (elbow or knee) between the rays toward the outer joints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointTriple {
    pub first: KeypointIndex,
    pub vertex: KeypointIndex,
    pub last: KeypointIndex,
}

impl JointTriple {
    /// Shoulder-elbow-wrist, left arm.
    pub const LEFT_ELBOW: JointTriple = JointTriple {
        first: KeypointIndex::LeftShoulder,
        vertex: KeypointIndex::LeftElbow,
        last: KeypointIndex::LeftWrist,
    };

    /// Shoulder-elbow-wrist, right arm.
    pub const RIGHT_ELBOW: JointTriple = JointTriple {
        first: KeypointIndex::RightShoulder,
        vertex: KeypointIndex::RightElbow,
        last: KeypointIndex::RightWrist,
    };

    /// Hip-knee-ankle, left leg.
    pub const LEFT_KNEE: JointTriple = JointTriple {
        first: KeypointIndex::LeftHip,
        vertex: KeypointIndex::LeftKnee,
        last: KeypointIndex::LeftAnkle,
    };

    /// Hip-knee-ankle, right leg.
    pub const RIGHT_KNEE: JointTriple = JointTriple {
        first: KeypointIndex::RightHip,
        vertex: KeypointIndex::RightKnee,
        last: KeypointIndex::RightAnkle,
    };

    pub fn resolve(&self, frame: &KeypointFrame) -> (Keypoint, Keypoint, Keypoint) {
        (
            frame.joint(self.first),
            frame.joint(self.vertex),
            frame.joint(self.last),
        )
    }

    /// Mean confidence of the triple's three joints.
    pub fn confidence(&self, frame: &KeypointFrame) -> f32 {
        let (a, b, c) = self.resolve(frame);
        (a.confidence + b.confidence + c.confidence) / 3.0
    }
}

/// External pose detector contract.
///
/// `detect` maps an encoded image to a keypoint frame, or `None` when no
/// person is found. The engine never looks inside the image; decoding,
/// resizing and model inference all live behind this trait.
pub trait PoseSource: Send {
    fn detect(&mut self, image: &[u8]) -> Option<KeypointFrame>;
}

/// Deterministic pose source that replays a prerecorded frame sequence.
///
/// Used by tests and the replay harness to drive the analysis pipeline
/// without a detector. Returns `None` both for scripted no-person frames
/// and once the script is exhausted.
#[derive(Debug, Default)]
pub struct ScriptedPoseSource {
    frames: VecDeque<Option<KeypointFrame>>,
}

impl ScriptedPoseSource {
    pub fn new(frames: Vec<Option<KeypointFrame>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl PoseSource for ScriptedPoseSource {
    fn detect(&mut self, _image: &[u8]) -> Option<KeypointFrame> {
        self.frames.pop_front().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows_with(count: usize) -> Vec<[f32; 3]> {
        vec![[1.0, 2.0, 0.9]; count]
    }

    #[test]
    fn from_rows_accepts_17_joints() {
        let frame = KeypointFrame::from_rows(&rows_with(KEYPOINT_COUNT)).unwrap();
        let shoulder = frame.joint(KeypointIndex::LeftShoulder);
        assert_eq!(shoulder.x, 1.0);
        assert_eq!(shoulder.y, 2.0);
        assert_eq!(shoulder.confidence, 0.9);
    }

    #[test]
    fn from_rows_rejects_wrong_joint_count() {
        let err = KeypointFrame::from_rows(&rows_with(5)).unwrap_err();
        assert_eq!(
            err,
            PoseError::MalformedFrame {
                expected: KEYPOINT_COUNT,
                got: 5
            }
        );
    }

    #[test]
    fn from_rows_rejects_non_finite_values() {
        let mut rows = rows_with(KEYPOINT_COUNT);
        rows[10] = [f32::NAN, 0.0, 0.5];
        let err = KeypointFrame::from_rows(&rows).unwrap_err();
        assert_eq!(err, PoseError::NonFiniteValue { index: 10 });
    }

    #[test]
    fn rows_roundtrip() {
        let rows = rows_with(KEYPOINT_COUNT);
        let frame = KeypointFrame::from_rows(&rows).unwrap();
        assert_eq!(frame.to_rows(), rows);
    }

    #[test]
    fn triple_confidence_is_mean_of_joints() {
        let mut rows = rows_with(KEYPOINT_COUNT);
        rows[KeypointIndex::LeftShoulder as usize][2] = 0.3;
        rows[KeypointIndex::LeftElbow as usize][2] = 0.6;
        rows[KeypointIndex::LeftWrist as usize][2] = 0.9;
        let frame = KeypointFrame::from_rows(&rows).unwrap();

        let confidence = JointTriple::LEFT_ELBOW.confidence(&frame);
        assert!((confidence - 0.6).abs() < 1e-6);
    }

    #[test]
    fn scripted_source_replays_then_runs_dry() {
        let frame = KeypointFrame::from_rows(&rows_with(KEYPOINT_COUNT)).unwrap();
        let mut source = ScriptedPoseSource::new(vec![Some(frame.clone()), None]);
        assert_eq!(source.remaining(), 2);

        assert_eq!(source.detect(b""), Some(frame));
        assert_eq!(source.remaining(), 1);
        assert_eq!(source.detect(b""), None);
        // Script exhausted: keeps reporting no person
        assert_eq!(source.detect(b""), None);
    }
}
