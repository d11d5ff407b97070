//! Fixed landmark-ID topology of the 468-point face mesh.
//!
//! Sides are named from the subject's point of view: "right" landmarks sit on
//! the image's left half when the face looks at the camera.

use crate::types::{EyeCenters, LandmarkSet};

/// Minimum number of landmarks a detector must report for feature extraction.
pub const MIN_LANDMARKS: usize = 468;

// Midline
pub const UPPER_LIP_TOP: usize = 0;
pub const NOSE_TIP: usize = 1;
pub const NOSE_BASE: usize = 2;
pub const GLABELLA: usize = 9;
pub const FOREHEAD_TOP: usize = 10;
pub const UPPER_LIP_INNER: usize = 13;
pub const LOWER_LIP_INNER: usize = 14;
pub const LOWER_LIP_BOTTOM: usize = 17;
pub const CHIN: usize = 152;
pub const BRIDGE_TOP: usize = 168;
pub const BRIDGE_MID: usize = 197;

// Face contour
pub const RIGHT_CHEEK_CONTOUR: usize = 234;
pub const LEFT_CHEEK_CONTOUR: usize = 454;
pub const RIGHT_GONION: usize = 172;
pub const LEFT_GONION: usize = 397;
pub const RIGHT_CHIN_SIDE: usize = 148;
pub const LEFT_CHIN_SIDE: usize = 377;
pub const RIGHT_TEMPLE: usize = 54;
pub const LEFT_TEMPLE: usize = 284;

// Eyes
pub const RIGHT_EYE_OUTER: usize = 33;
pub const RIGHT_EYE_INNER: usize = 133;
pub const RIGHT_EYE_UPPER_LID: usize = 159;
pub const RIGHT_EYE_LOWER_LID: usize = 145;
pub const LEFT_EYE_OUTER: usize = 263;
pub const LEFT_EYE_INNER: usize = 362;
pub const LEFT_EYE_UPPER_LID: usize = 386;
pub const LEFT_EYE_LOWER_LID: usize = 374;

/// Landmarks averaged into the eye centers.
pub const RIGHT_EYE_RING: [usize; 8] = [33, 133, 160, 159, 158, 144, 145, 153];
pub const LEFT_EYE_RING: [usize; 8] = [362, 263, 387, 386, 385, 373, 374, 380];

/// Corner neighbourhoods, averaged to suppress single-point jitter.
pub const RIGHT_EYE_OUTER_CORNER: [usize; 3] = [33, 246, 7];
pub const RIGHT_EYE_INNER_CORNER: [usize; 3] = [133, 173, 155];
pub const LEFT_EYE_OUTER_CORNER: [usize; 3] = [263, 466, 249];
pub const LEFT_EYE_INNER_CORNER: [usize; 3] = [362, 398, 382];
pub const RIGHT_MOUTH_CORNER: [usize; 3] = [61, 185, 146];
pub const LEFT_MOUTH_CORNER: [usize; 3] = [291, 409, 375];

// Brows
pub const RIGHT_BROW_INNER: usize = 107;
pub const RIGHT_BROW_PEAK: usize = 105;
pub const RIGHT_BROW_OUTER: usize = 70;
pub const RIGHT_BROW_LOWER_PEAK: usize = 52;
pub const LEFT_BROW_INNER: usize = 336;
pub const LEFT_BROW_PEAK: usize = 334;
pub const LEFT_BROW_OUTER: usize = 300;
pub const LEFT_BROW_LOWER_PEAK: usize = 282;

// Nose
pub const RIGHT_ALAR: usize = 129;
pub const LEFT_ALAR: usize = 358;

// Mouth
pub const RIGHT_CUPIDS_PEAK: usize = 37;
pub const LEFT_CUPIDS_PEAK: usize = 267;

// Cheeks
pub const RIGHT_CHEEKBONE: usize = 123;
pub const LEFT_CHEEKBONE: usize = 352;
pub const RIGHT_CHEEK_CENTER: usize = 50;
pub const LEFT_CHEEK_CENTER: usize = 280;

/// Landmarks the pose estimator cannot work without.
pub const POSE_LANDMARKS: [usize; 5] = [
    NOSE_TIP,
    RIGHT_CHEEK_CONTOUR,
    LEFT_CHEEK_CONTOUR,
    BRIDGE_TOP,
    CHIN,
];

/// Average the eye rings into eye centers.
pub fn eye_centers(landmarks: &LandmarkSet) -> EyeCenters {
    EyeCenters::new(
        landmarks.mean_of(&LEFT_EYE_RING),
        landmarks.mean_of(&RIGHT_EYE_RING),
    )
}

/// Every landmark index the pose estimator reads.
pub fn required_for_pose() -> impl Iterator<Item = usize> {
    POSE_LANDMARKS
        .into_iter()
        .chain(RIGHT_EYE_RING)
        .chain(LEFT_EYE_RING)
}
