//! The comparison pipeline: two faces in, one [`ComparisonResult`] out.
//!
//! Per request: estimate pose for both faces, frontalize, extract
//! measurements, classify, compare axis-by-axis, score regions, and
//! summarize. Nothing is cached between requests.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::axis::{Axis, Region};
use crate::calibration::Calibration;
use crate::classify::{classify_features, RegionClassification};
use crate::compare::{
    morphological_congruence, shared_axes, AxisComparator, FeatureComparison, ToleranceMode,
};
use crate::contour::JawContour;
use crate::error::Result;
use crate::landmarks::eye_centers;
use crate::mask::{compare_masks, MaskComparison, MaskRegion, SegmentationMask};
use crate::metrics::{FeatureExtractor, FeatureMeasurements};
use crate::pose::{estimate_pose, frontalize, rotate_about, Pose};
use crate::types::{EyeCenters, LandmarkSet};

/// Everything the upstream detectors produced for one face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceInput {
    pub landmarks: LandmarkSet,
    /// Pre-averaged eye centers from the detector.
    #[serde(default)]
    pub eye_centers: Option<EyeCenters>,
    #[serde(default)]
    pub mask: Option<SegmentationMask>,
    /// Segmentation-derived jaw outline in landmark pixel space.
    #[serde(default)]
    pub jaw_contour: Option<JawContour>,
    /// Estimated age in years.
    #[serde(default)]
    pub age: Option<f64>,
}

impl FaceInput {
    pub fn new(landmarks: LandmarkSet) -> Self {
        Self {
            landmarks,
            ..Default::default()
        }
    }
}

/// Intermediate per-face results.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAnalysis {
    pub pose: Pose,
    pub measurements: FeatureMeasurements,
    pub classifications: Vec<RegionClassification>,
}

/// Which strategy produces the region scores. Chosen once per comparison.
#[derive(Debug, Clone, Copy)]
pub enum ScoringMode<'a> {
    LandmarkOnly,
    MaskBacked {
        a: &'a SegmentationMask,
        b: &'a SegmentationMask,
    },
}

impl<'a> ScoringMode<'a> {
    /// Masks only count when both faces carry one.
    pub fn select(a: &'a FaceInput, b: &'a FaceInput) -> Self {
        match (&a.mask, &b.mask) {
            (Some(a), Some(b)) => ScoringMode::MaskBacked { a, b },
            _ => ScoringMode::LandmarkOnly,
        }
    }

    pub fn kind(&self) -> ScoringKind {
        match self {
            ScoringMode::LandmarkOnly => ScoringKind::LandmarkOnly,
            ScoringMode::MaskBacked { .. } => ScoringKind::MaskBacked,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScoringKind {
    LandmarkOnly,
    MaskBacked,
}

/// A scored region: a landmark region or a mask region, depending on mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "region", rename_all = "camelCase")]
pub enum ScoredRegion {
    Feature(Region),
    Mask(MaskRegion),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionScore {
    pub region: ScoredRegion,
    pub score: f64,
}

/// Regions bucketed for narrative text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgreementSummary {
    pub similar: Vec<Region>,
    pub different: Vec<Region>,
}

/// Raised when either face is turned far enough to distort measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseWarning {
    /// Angular distance between the two poses, in degrees.
    pub disparity: f64,
    pub a_non_frontal: bool,
    pub b_non_frontal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub mode: ScoringKind,
    pub pose_a: Pose,
    pub pose_b: Pose,
    pub pose_warning: Option<PoseWarning>,
    pub region_scores: Vec<RegionScore>,
    pub comparisons: Vec<FeatureComparison>,
    pub shared_axes: Vec<Axis>,
    /// Published score, after any age penalty, in [0, 1].
    pub congruence_score: f64,
    /// Mean raw axis similarity before the age penalty.
    pub raw_congruence: f64,
    /// Amount subtracted for the age gap; 0 without two age estimates.
    pub age_penalty: f64,
    pub mask: Option<MaskComparison>,
    pub agreement_summary: AgreementSummary,
}

/// Compares faces with a fixed calibration.
///
/// Holds only immutable configuration, so one comparator can serve
/// concurrent callers.
#[derive(Debug, Clone)]
pub struct FaceComparator {
    calibration: Calibration,
    extractor: FeatureExtractor,
    comparator: AxisComparator,
}

impl Default for FaceComparator {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}

impl FaceComparator {
    pub fn new(calibration: Calibration) -> Self {
        Self::with_mode(calibration, ToleranceMode::Stepped)
    }

    pub fn with_mode(calibration: Calibration, mode: ToleranceMode) -> Self {
        let extractor = FeatureExtractor::new(calibration.jaw_contour);
        let comparator = AxisComparator::new(calibration.tolerances.clone(), mode);
        Self {
            calibration,
            extractor,
            comparator,
        }
    }

    /// Pose, measurements, and classifications for one face.
    pub fn analyze(&self, face: &FaceInput) -> Result<FaceAnalysis> {
        let pose = estimate_pose(&face.landmarks);
        let rotated = pose.max_angle() > self.calibration.frontal_threshold;

        let measurements = if rotated {
            let landmarks = frontalize(&face.landmarks, &pose, self.calibration.frontal_threshold);
            // Detector eye centers and the jaw contour live in the original
            // pose; follow the landmarks through the rotation.
            let eyes = eye_centers(&landmarks);
            let contour = face.jaw_contour.as_ref().map(|c| JawContour {
                points: rotate_about(&c.points, &pose, face.landmarks.centroid()),
                confidence: c.confidence,
            });
            self.extractor
                .extract(&landmarks, Some(eyes), contour.as_ref())?
        } else {
            self.extractor
                .extract(&face.landmarks, face.eye_centers, face.jaw_contour.as_ref())?
        };

        Ok(FaceAnalysis {
            pose,
            classifications: classify_features(&measurements),
            measurements,
        })
    }

    /// Compare two faces. An extraction failure for either face aborts the
    /// whole comparison.
    pub fn compare(&self, a: &FaceInput, b: &FaceInput) -> Result<ComparisonResult> {
        let analysis_a = self.analyze(a)?;
        let analysis_b = self.analyze(b)?;
        let mode = ScoringMode::select(a, b);

        let comparisons = self
            .comparator
            .compare_features(&analysis_a.classifications, &analysis_b.classifications);

        let (region_scores, mask) = match mode {
            ScoringMode::LandmarkOnly => (landmark_region_scores(&comparisons), None),
            ScoringMode::MaskBacked { a, b } => {
                let masks = compare_masks(a, b);
                let scores = masks
                    .regions
                    .iter()
                    .map(|r| RegionScore {
                        region: ScoredRegion::Mask(r.region),
                        score: r.score,
                    })
                    .collect();
                (scores, Some(masks))
            }
        };

        let raw_congruence = morphological_congruence(&comparisons);
        let age_penalty = match (a.age, b.age) {
            (Some(age_a), Some(age_b)) => self.calibration.age_penalty.penalty(age_a, age_b),
            _ => 0.0,
        };
        let congruence_score = (raw_congruence - age_penalty).clamp(0.0, 1.0);

        let pose_warning = self.pose_warning(&analysis_a.pose, &analysis_b.pose);
        let agreement_summary = self.summarize(&comparisons);

        debug!(
            mode = ?mode.kind(),
            congruence = congruence_score,
            age_penalty,
            "faces compared"
        );

        Ok(ComparisonResult {
            mode: mode.kind(),
            pose_a: analysis_a.pose,
            pose_b: analysis_b.pose,
            pose_warning,
            region_scores,
            shared_axes: shared_axes(&comparisons),
            comparisons,
            congruence_score,
            raw_congruence,
            age_penalty,
            mask,
            agreement_summary,
        })
    }

    fn pose_warning(&self, a: &Pose, b: &Pose) -> Option<PoseWarning> {
        let threshold = self.calibration.non_frontal_threshold;
        let a_non_frontal = a.is_non_frontal(threshold);
        let b_non_frontal = b.is_non_frontal(threshold);
        if !a_non_frontal && !b_non_frontal {
            return None;
        }

        let disparity = a.disparity(b);
        warn!(disparity, a_non_frontal, b_non_frontal, "non-frontal pose in comparison");
        Some(PoseWarning {
            disparity,
            a_non_frontal,
            b_non_frontal,
        })
    }

    fn summarize(&self, comparisons: &[FeatureComparison]) -> AgreementSummary {
        let mut summary = AgreementSummary::default();
        for c in comparisons {
            if c.overall_agreement >= self.calibration.similar_threshold {
                summary.similar.push(c.feature);
            } else if c.overall_agreement <= self.calibration.different_threshold {
                summary.different.push(c.feature);
            }
        }
        summary
    }
}

fn landmark_region_scores(comparisons: &[FeatureComparison]) -> Vec<RegionScore> {
    comparisons
        .iter()
        .map(|c| RegionScore {
            region: ScoredRegion::Feature(c.feature),
            score: c.overall_agreement,
        })
        .collect()
}
