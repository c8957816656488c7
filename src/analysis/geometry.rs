// Joint-angle geometry
//
// Single pure function: the angle at a vertex joint between the rays toward
// two outer joints, computed via the normalized dot product. Degenerate
// input (either ray shorter than DEGENERACY_EPSILON, i.e. coincident
// points) yields no angle rather than a garbage value.

use crate::pose::Keypoint;

/// Vectors shorter than this are treated as degenerate.
pub const DEGENERACY_EPSILON: f32 = 1e-6;

/// Angle at vertex `b` between rays `b -> a` and `b -> c`, in degrees.
///
/// Returns `None` for degenerate vectors (`a == b` or `c == b` within
/// epsilon) or if the result falls outside [0, 180].
///
/// # Arguments
/// * `a` - first outer joint
/// * `b` - vertex joint
/// * `c` - second outer joint
pub fn joint_angle(a: Keypoint, b: Keypoint, c: Keypoint) -> Option<f32> {
    let v1 = (a.x - b.x, a.y - b.y);
    let v2 = (c.x - b.x, c.y - b.y);

    let norm1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let norm2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();

    if norm1 < DEGENERACY_EPSILON || norm2 < DEGENERACY_EPSILON {
        return None;
    }

    let cosine = ((v1.0 * v2.0 + v1.1 * v2.1) / (norm1 * norm2)).clamp(-1.0, 1.0);
    let angle = cosine.acos().to_degrees();

    (0.0..=180.0).contains(&angle).then_some(angle)
}
