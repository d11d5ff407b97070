//! # face-congruence
//!
//! Pure Rust morphological comparison of two faces.
//!
//! This crate provides:
//! - **Pose**: yaw, pitch, and roll from landmark asymmetry, plus frontalization
//! - **Feature Measurements**: scale-invariant measurements over eight facial regions
//! - **Classification**: a categorical label and confidence per measurement axis
//! - **Comparison**: tolerance-aware per-axis similarity and a headline congruence score
//! - **Masks**: overlap-based region similarity from face-parsing segmentation masks
//!
//! Landmarks follow the 468-point face-mesh topology (see [`landmarks`]). All
//! scoring is deterministic; nothing is learned or cached.
//!
//! ## Pipeline
//!
//! 1. Estimate each face's pose and frontalize if it is turned
//! 2. Extract per-region measurements, preferring a dense jaw contour when given
//! 3. Classify every axis against fixed band thresholds
//! 4. Compare axis by axis with the calibrated tolerance table
//! 5. Score regions by hybrid agreement, or by mask overlap when both faces carry a mask
//! 6. Report congruence, shared axes, a pose warning, and an age penalty
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use face_congruence::{FaceComparator, FaceInput};
//!
//! let a: FaceInput = serde_json::from_str(&std::fs::read_to_string("a.json")?)?;
//! let b: FaceInput = serde_json::from_str(&std::fs::read_to_string("b.json")?)?;
//!
//! let result = FaceComparator::default().compare(&a, &b)?;
//! println!("congruence: {:.1}%", result.congruence_score * 100.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod aggregate;
mod axis;
mod calibration;
mod classify;
mod compare;
mod contour;
mod error;
pub mod landmarks;
mod mask;
mod metrics;
mod pose;
mod tolerance;
mod types;

pub use aggregate::{
    AgreementSummary, ComparisonResult, FaceAnalysis, FaceComparator, FaceInput, PoseWarning,
    RegionScore, ScoredRegion, ScoringKind, ScoringMode,
};
pub use axis::{Axis, Region};
pub use calibration::{AgePenalty, Calibration};
pub use classify::{
    bands, classify_axis, classify_features, AxisBands, AxisClassification, RegionClassification,
};
pub use compare::{
    hybrid_score, morphological_congruence, shared_axes, similarity, AxisComparator,
    AxisComparison, Direction, FeatureComparison, ToleranceMode,
};
pub use contour::{ContourJaw, ContourPolicy, JawContour};
pub use error::{Error, Result};
pub use mask::{
    area_ratio_similarity, compare_masks, dice, iou, region_similarity, BinaryMask, MaskClass,
    MaskComparison, MaskRegion, MaskRegionScore, SegmentationMask,
};
pub use metrics::{
    BrowMeasurements, CheekMeasurements, EyeMeasurements, FaceShapeMeasurements, FeatureExtractor,
    FeatureMeasurements, ForeheadMeasurements, JawMeasurements, JawSource, MouthMeasurements,
    NoseMeasurements,
};
pub use pose::{
    estimate_pose, frontalize, rotate_about, Pose, FRONTAL_THRESHOLD_DEG,
    NON_FRONTAL_THRESHOLD_DEG,
};
pub use tolerance::{
    AxisTolerance, Provenance, ToleranceConfig, ToleranceModel, DEFAULT_RELATIVE_TOLERANCE,
};
pub use types::{BoundingBox, EyeCenters, LandmarkSet, Point};
