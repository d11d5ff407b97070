//! Head pose estimation from landmark asymmetry, and frontalization.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::landmarks::{self, BRIDGE_TOP, CHIN, LEFT_CHEEK_CONTOUR, NOSE_TIP, RIGHT_CHEEK_CONTOUR};
use crate::types::{LandmarkSet, Point};

/// Below this many degrees on every axis a face is left untouched.
pub const FRONTAL_THRESHOLD_DEG: f64 = 3.0;

/// Above this many degrees on any axis a face counts as non-frontal.
pub const NON_FRONTAL_THRESHOLD_DEG: f64 = 15.0;

const CONFIDENCE_MISSING: f64 = 0.3;
const CONFIDENCE_PLANAR: f64 = 0.6;
const CONFIDENCE_DEPTH: f64 = 0.9;

const EPSILON: f64 = 1e-9;

/// Estimated head rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
    /// Trust in the estimate, in [0, 1].
    pub confidence: f64,
}

impl Pose {
    pub const fn new(yaw: f64, pitch: f64, roll: f64, confidence: f64) -> Self {
        Self {
            yaw,
            pitch,
            roll,
            confidence,
        }
    }

    /// Largest absolute rotation over the three axes.
    pub fn max_angle(&self) -> f64 {
        self.yaw.abs().max(self.pitch.abs()).max(self.roll.abs())
    }

    /// True if any axis exceeds `threshold` degrees.
    pub fn is_non_frontal(&self, threshold: f64) -> bool {
        self.max_angle() > threshold
    }

    /// Euclidean distance between two poses in angle space.
    pub fn disparity(&self, other: &Pose) -> f64 {
        let dy = self.yaw - other.yaw;
        let dp = self.pitch - other.pitch;
        let dr = self.roll - other.roll;
        (dy * dy + dp * dp + dr * dr).sqrt()
    }
}

/// Estimate the head pose of a single face.
///
/// Yaw comes from the left/right cheek distance asymmetry around the nose
/// tip, pitch from how far the nose tip sits from its expected height
/// between bridge and chin, and roll from the tilt of the eye line.
pub fn estimate_pose(landmarks: &LandmarkSet) -> Pose {
    let n = landmarks.len();
    if landmarks::required_for_pose().any(|idx| idx >= n) {
        return Pose::new(0.0, 0.0, 0.0, CONFIDENCE_MISSING);
    }

    let nose_tip = landmarks.point(NOSE_TIP);
    let right_cheek = nose_tip.distance(&landmarks.point(RIGHT_CHEEK_CONTOUR));
    let left_cheek = nose_tip.distance(&landmarks.point(LEFT_CHEEK_CONTOUR));
    let asymmetry = (right_cheek - left_cheek) / (right_cheek + left_cheek).max(EPSILON);
    let yaw = (asymmetry * 90.0).clamp(-90.0, 90.0);

    let bridge = landmarks.point(BRIDGE_TOP);
    let chin = landmarks.point(CHIN);
    let face_height = chin.y - bridge.y;
    let expected_nose_y = bridge.y + face_height * 0.45;
    let pitch = ((nose_tip.y - expected_nose_y) / nonzero(face_height) * 60.0).clamp(-90.0, 90.0);

    let eyes = landmarks::eye_centers(landmarks);
    let roll = eyes.right.angle_to(&eyes.left);

    let all_depth =
        landmarks::required_for_pose().all(|idx| landmarks.point(idx).z.is_some());
    let confidence = if all_depth {
        CONFIDENCE_DEPTH
    } else {
        CONFIDENCE_PLANAR
    };

    Pose::new(yaw, pitch, roll, confidence)
}

/// Rotate landmarks to cancel `pose`, approximating a forward-facing view.
///
/// Faces within `frontal_threshold` degrees on every axis are returned
/// unchanged. Otherwise each landmark is rotated about the landmark centroid
/// by the inverse rotation `Rz(-roll)·Rx(-pitch)·Ry(-yaw)`. Landmarks without
/// depth keep `z = None`, so later stages still know depth was absent.
pub fn frontalize(landmarks: &LandmarkSet, pose: &Pose, frontal_threshold: f64) -> LandmarkSet {
    if pose.max_angle() <= frontal_threshold {
        return landmarks.clone();
    }
    LandmarkSet::new(rotate_about(&landmarks.points, pose, landmarks.centroid()))
}

/// Apply the inverse rotation of `pose` to `points` about `center`.
///
/// Used for geometry that must follow the landmarks through
/// frontalization, such as a jaw contour in the same pixel space.
pub fn rotate_about(points: &[Point], pose: &Pose, center: Point) -> Vec<Point> {
    let rotation = inverse_rotation(pose);
    let center = Vector3::new(center.x, center.y, center.z_or_zero());

    points
        .iter()
        .map(|p| {
            let v = Vector3::new(p.x, p.y, p.z_or_zero()) - center;
            let r = rotation * v + center;
            Point {
                x: r.x,
                y: r.y,
                z: p.z.map(|_| r.z),
            }
        })
        .collect()
}

fn inverse_rotation(pose: &Pose) -> Matrix3<f64> {
    let yaw = (-pose.yaw).to_radians();
    let pitch = (-pose.pitch).to_radians();
    let roll = (-pose.roll).to_radians();

    let (sy, cy) = yaw.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    let (sr, cr) = roll.sin_cos();

    #[rustfmt::skip]
    let ry = Matrix3::new(
        cy,  0.0, sy,
        0.0, 1.0, 0.0,
        -sy, 0.0, cy,
    );
    #[rustfmt::skip]
    let rx = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, cp,  -sp,
        0.0, sp,  cp,
    );
    #[rustfmt::skip]
    let rz = Matrix3::new(
        cr,  -sr, 0.0,
        sr,  cr,  0.0,
        0.0, 0.0, 1.0,
    );

    rz * rx * ry
}

fn nonzero(v: f64) -> f64 {
    if v.abs() < EPSILON {
        EPSILON.copysign(v)
    } else {
        v
    }
}
