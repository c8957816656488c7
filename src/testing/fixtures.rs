// Synthetic keypoint fixtures
//
// Builders that construct geometrically exact frames for each exercise:
// given a target elbow/knee angle or wrist-shoulder displacement, they
// place the relevant joints so the analysis pipeline measures precisely
// that value. Everything else in the frame is an anatomically plausible
// filler joint at high confidence.
//
// Also defines the JSON replay script consumed by the `pose_replay` binary.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pose::{Keypoint, KeypointFrame, KeypointIndex, KEYPOINT_COUNT};

/// Limb segment length used by the angle fixtures, in pixels.
const LIMB_LENGTH: f32 = 80.0;

fn base_frame() -> [Keypoint; KEYPOINT_COUNT] {
    // A loose standing figure; joints that matter get overwritten
    let rows: [[f32; 2]; KEYPOINT_COUNT] = [
        [100.0, 30.0],  // nose
        [95.0, 25.0],   // left eye
        [105.0, 25.0],  // right eye
        [90.0, 28.0],   // left ear
        [110.0, 28.0],  // right ear
        [80.0, 60.0],   // left shoulder
        [120.0, 60.0],  // right shoulder
        [75.0, 100.0],  // left elbow
        [125.0, 100.0], // right elbow
        [70.0, 140.0],  // left wrist
        [130.0, 140.0], // right wrist
        [85.0, 150.0],  // left hip
        [115.0, 150.0], // right hip
        [85.0, 210.0],  // left knee
        [115.0, 210.0], // right knee
        [85.0, 270.0],  // left ankle
        [115.0, 270.0], // right ankle
    ];
    let mut joints = [Keypoint::new(0.0, 0.0, 0.9); KEYPOINT_COUNT];
    for (joint, row) in joints.iter_mut().zip(rows.iter()) {
        joint.x = row[0];
        joint.y = row[1];
    }
    joints
}

/// Place `first`-`vertex`-`last` so the angle at the vertex is exactly
/// `angle_deg`, with all three joints at `confidence`.
fn set_triple_angle(
    joints: &mut [Keypoint; KEYPOINT_COUNT],
    first: KeypointIndex,
    vertex: KeypointIndex,
    last: KeypointIndex,
    angle_deg: f32,
    confidence: f32,
) {
    let vx = joints[vertex as usize].x;
    let vy = joints[vertex as usize].y;

    // First ray points straight up from the vertex; second is rotated by
    // the requested angle
    let radians = angle_deg.to_radians();
    joints[first as usize] = Keypoint::new(vx, vy - LIMB_LENGTH, confidence);
    joints[last as usize] = Keypoint::new(
        vx + LIMB_LENGTH * radians.sin(),
        vy - LIMB_LENGTH * radians.cos(),
        confidence,
    );
    joints[vertex as usize].confidence = confidence;
}

/// Frame with both elbow angles at `angle_deg` (push-up / arm-curl input).
pub fn pushup_frame(angle_deg: f32, confidence: f32) -> KeypointFrame {
    let mut joints = base_frame();
    set_triple_angle(
        &mut joints,
        KeypointIndex::LeftShoulder,
        KeypointIndex::LeftElbow,
        KeypointIndex::LeftWrist,
        angle_deg,
        confidence,
    );
    set_triple_angle(
        &mut joints,
        KeypointIndex::RightShoulder,
        KeypointIndex::RightElbow,
        KeypointIndex::RightWrist,
        angle_deg,
        confidence,
    );
    KeypointFrame::new(joints)
}

/// Frame with both knee angles at `angle_deg` (squat input).
pub fn squat_frame(angle_deg: f32, confidence: f32) -> KeypointFrame {
    let mut joints = base_frame();
    set_triple_angle(
        &mut joints,
        KeypointIndex::LeftHip,
        KeypointIndex::LeftKnee,
        KeypointIndex::LeftAnkle,
        angle_deg,
        confidence,
    );
    set_triple_angle(
        &mut joints,
        KeypointIndex::RightHip,
        KeypointIndex::RightKnee,
        KeypointIndex::RightAnkle,
        angle_deg,
        confidence,
    );
    KeypointFrame::new(joints)
}

/// Frame where the wrist centroid sits `displacement` pixels below the
/// shoulder centroid (negative = wrists above shoulders, a hanging athlete).
pub fn pullup_frame(displacement: f32, confidence: f32) -> KeypointFrame {
    let mut joints = base_frame();
    let shoulder_y = 100.0;
    joints[KeypointIndex::LeftShoulder as usize] = Keypoint::new(90.0, shoulder_y, confidence);
    joints[KeypointIndex::RightShoulder as usize] = Keypoint::new(110.0, shoulder_y, confidence);
    joints[KeypointIndex::LeftWrist as usize] =
        Keypoint::new(90.0, shoulder_y + displacement, confidence);
    joints[KeypointIndex::RightWrist as usize] =
        Keypoint::new(110.0, shoulder_y + displacement, confidence);
    KeypointFrame::new(joints)
}

/// Frame with one side's elbow confidence boosted above the other, for
/// side-selection tests. Both sides carry different angles.
pub fn asymmetric_elbow_frame(
    left_angle: f32,
    left_confidence: f32,
    right_angle: f32,
    right_confidence: f32,
) -> KeypointFrame {
    let mut joints = base_frame();
    set_triple_angle(
        &mut joints,
        KeypointIndex::LeftShoulder,
        KeypointIndex::LeftElbow,
        KeypointIndex::LeftWrist,
        left_angle,
        left_confidence,
    );
    set_triple_angle(
        &mut joints,
        KeypointIndex::RightShoulder,
        KeypointIndex::RightElbow,
        KeypointIndex::RightWrist,
        right_angle,
        right_confidence,
    );
    KeypointFrame::new(joints)
}

/// Declarative frame sequence for the replay harness.
///
/// `null` entries are no-person frames. Loaded from JSON written either by
/// hand or by recording a detector's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameScript {
    pub mode: String,
    pub frames: Vec<Option<Vec<[f32; 3]>>>,
}

impl FrameScript {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading frame script {:?}", path))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("parsing frame script {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("serializing frame script")?;
        fs::write(path, json).with_context(|| format!("writing frame script {:?}", path))
    }

    /// Build a script from in-memory frames.
    pub fn from_frames(mode: &str, frames: &[Option<KeypointFrame>]) -> Self {
        Self {
            mode: mode.to_string(),
            frames: frames
                .iter()
                .map(|frame| frame.as_ref().map(|f| f.to_rows()))
                .collect(),
        }
    }
}
