//! End-to-end comparisons over a synthetic, symmetric 468-point face.

use face_congruence::{
    classify_axis, landmarks::*, Axis, AxisComparator, BoundingBox, Calibration, ComparisonResult,
    Error, EyeCenters, FaceComparator, FaceInput, JawContour, JawSource, LandmarkSet, MaskClass, MaskRegion, Point,
    Region, ScoredRegion, ScoringKind, SegmentationMask, ToleranceMode,
};
use pretty_assertions::assert_eq;

const MIRROR_X: f64 = 640.0;

/// Subject-right landmarks with their subject-left mirror index.
const PAIRED: [(usize, usize, f64, f64, f64); 27] = [
    // Eye ring and corners
    (RIGHT_EYE_OUTER, LEFT_EYE_OUTER, 240.0, 190.0, 0.0),
    (246, 466, 240.0, 190.0, 0.0),
    (7, 249, 240.0, 190.0, 0.0),
    (RIGHT_EYE_INNER, LEFT_EYE_INNER, 300.0, 190.0, 0.0),
    (173, 398, 300.0, 190.0, 0.0),
    (155, 382, 300.0, 190.0, 0.0),
    (160, 387, 255.0, 182.0, 0.0),
    (RIGHT_EYE_UPPER_LID, LEFT_EYE_UPPER_LID, 270.0, 180.0, 0.0),
    (158, 385, 285.0, 182.0, 0.0),
    (144, 373, 255.0, 198.0, 0.0),
    (RIGHT_EYE_LOWER_LID, LEFT_EYE_LOWER_LID, 270.0, 200.0, 0.0),
    (153, 380, 285.0, 198.0, 0.0),
    // Brows
    (RIGHT_BROW_INNER, LEFT_BROW_INNER, 300.0, 160.0, 0.0),
    (RIGHT_BROW_PEAK, LEFT_BROW_PEAK, 265.0, 150.0, 0.0),
    (RIGHT_BROW_OUTER, LEFT_BROW_OUTER, 235.0, 160.0, 0.0),
    (RIGHT_BROW_LOWER_PEAK, LEFT_BROW_LOWER_PEAK, 265.0, 158.0, 0.0),
    // Contour
    (RIGHT_CHEEK_CONTOUR, LEFT_CHEEK_CONTOUR, 220.0, 230.0, 0.0),
    (RIGHT_GONION, LEFT_GONION, 235.0, 300.0, 0.0),
    (RIGHT_CHIN_SIDE, LEFT_CHIN_SIDE, 300.0, 335.0, 0.0),
    (RIGHT_TEMPLE, LEFT_TEMPLE, 240.0, 120.0, 0.0),
    // Nose, mouth, cheeks
    (RIGHT_ALAR, LEFT_ALAR, 300.0, 255.0, -8.0),
    (RIGHT_CUPIDS_PEAK, LEFT_CUPIDS_PEAK, 312.0, 282.0, -4.0),
    (61, 291, 285.0, 290.0, 0.0),
    (185, 409, 285.0, 290.0, 0.0),
    (146, 375, 285.0, 290.0, 0.0),
    (RIGHT_CHEEKBONE, LEFT_CHEEKBONE, 245.0, 225.0, -5.0),
    (RIGHT_CHEEK_CENTER, LEFT_CHEEK_CENTER, 255.0, 240.0, -8.0),
];

const MIDLINE: [(usize, f64, f64); 11] = [
    (UPPER_LIP_TOP, 283.0, -6.0),
    (NOSE_TIP, 252.0, -30.0),
    (NOSE_BASE, 265.0, -15.0),
    (GLABELLA, 165.0, -5.0),
    (FOREHEAD_TOP, 110.0, 0.0),
    (UPPER_LIP_INNER, 290.0, -5.0),
    (LOWER_LIP_INNER, 292.0, -5.0),
    (LOWER_LIP_BOTTOM, 305.0, -5.0),
    (CHIN, 340.0, -5.0),
    (BRIDGE_TOP, 180.0, -10.0),
    (BRIDGE_MID, 215.0, -18.0),
];

fn base_points() -> Vec<Point> {
    let mut points = vec![Point::with_z(320.0, 260.0, 0.0); MIN_LANDMARKS];
    for &(right, left, x, y, z) in &PAIRED {
        points[right] = Point::with_z(x, y, z);
        points[left] = Point::with_z(MIRROR_X - x, y, z);
    }
    for &(idx, y, z) in &MIDLINE {
        points[idx] = Point::with_z(MIRROR_X / 2.0, y, z);
    }
    points
}

fn face() -> FaceInput {
    FaceInput::new(LandmarkSet::new(base_points()))
}

/// Raise both outer eye corners by `rise` pixels, tilting the eyes up.
fn face_with_canthal_rise(rise: f64) -> FaceInput {
    let mut points = base_points();
    for (right, left) in [(RIGHT_EYE_OUTER, LEFT_EYE_OUTER), (246, 466), (7, 249)] {
        points[right].y -= rise;
        points[left].y -= rise;
    }
    FaceInput::new(LandmarkSet::new(points))
}

/// 20x20 parsing mask: skin everywhere, eyes in the top rows, and
/// optionally a 10x10 nose block.
fn mask(nose: bool) -> SegmentationMask {
    SegmentationMask::from_fn(20, 20, BoundingBox::new(200.0, 100.0, 240.0, 260.0), |x, y| {
        if nose && (5..15).contains(&x) && (5..15).contains(&y) {
            MaskClass::Nose as u8
        } else if y == 2 && (2..6).contains(&x) {
            MaskClass::RightEye as u8
        } else if y == 2 && (14..18).contains(&x) {
            MaskClass::LeftEye as u8
        } else if y == 17 && (7..13).contains(&x) {
            MaskClass::UpperLip as u8
        } else {
            MaskClass::Skin as u8
        }
    })
}

fn jaw_contour(points: usize, confidence: f64) -> JawContour {
    let outline = [
        (235.0, 300.0),
        (260.0, 325.0),
        (300.0, 338.0),
        (320.0, 340.0),
        (340.0, 338.0),
        (380.0, 325.0),
        (405.0, 300.0),
    ];
    let take = points.min(outline.len());
    let skip = (outline.len() - take) / 2;
    JawContour::new(
        outline[skip..skip + take]
            .iter()
            .map(|&(x, y)| Point::new(x, y))
            .collect(),
        confidence,
    )
}

#[test]
fn synthetic_face_is_frontal() {
    let analysis = FaceComparator::default().analyze(&face()).unwrap();
    let pose = analysis.pose;
    assert!(pose.yaw.abs() < 1e-9);
    assert!(pose.pitch.abs() < 1e-9);
    assert!(pose.roll.abs() < 1e-9);
    assert_eq!(pose.confidence, 0.9);
    assert!(analysis.measurements.has_depth);
    assert_eq!(analysis.classifications.len(), Region::ALL.len());
}

#[test]
fn identical_faces_are_fully_congruent() {
    let result = FaceComparator::default().compare(&face(), &face()).unwrap();

    assert_eq!(result.mode, ScoringKind::LandmarkOnly);
    assert_eq!(result.congruence_score, 1.0);
    assert_eq!(result.raw_congruence, 1.0);
    assert_eq!(result.age_penalty, 0.0);
    assert!(result.pose_warning.is_none());
    assert!(result.mask.is_none());

    for feature in &result.comparisons {
        assert!(feature.axes.iter().all(|c| c.agreement));
        assert_eq!(feature.overall_agreement, 1.0);
    }
    assert_eq!(result.shared_axes.len(), Axis::ALL.len());
    assert_eq!(result.agreement_summary.similar, Region::ALL.to_vec());
    assert!(result.agreement_summary.different.is_empty());
}

#[test]
fn identical_faces_with_identical_masks() {
    let mut a = face();
    a.mask = Some(mask(true));
    let b = a.clone();

    let result = FaceComparator::default().compare(&a, &b).unwrap();
    assert_eq!(result.mode, ScoringKind::MaskBacked);
    assert_eq!(result.congruence_score, 1.0);
    assert!(result
        .comparisons
        .iter()
        .flat_map(|f| &f.axes)
        .all(|c| c.agreement));

    let masks = result.mask.unwrap();
    assert!((masks.overall - 1.0).abs() < 1e-12);
    assert_eq!(result.region_scores.len(), MaskRegion::ALL.len());
    assert!(result
        .region_scores
        .iter()
        .all(|r| (r.score - 1.0).abs() < 1e-12));
}

#[test]
fn opposite_canthal_tilt() {
    let up = face_with_canthal_rise(6.0);
    let down = face_with_canthal_rise(-6.0);
    let result = FaceComparator::default().compare(&up, &down).unwrap();

    let eyes = result
        .comparisons
        .iter()
        .find(|f| f.feature == Region::Eyes)
        .unwrap();
    let tilt = eyes
        .axes
        .iter()
        .find(|c| c.axis == Axis::CanthalTilt)
        .unwrap();

    assert_eq!(tilt.value_a, "positive");
    assert_eq!(tilt.value_b, "negative");
    assert!(!tilt.agreement);
    assert!((tilt.hybrid_score - 0.6 * tilt.similarity).abs() < 1e-12);
    assert!(!result.shared_axes.contains(&Axis::CanthalTilt));
    assert!(result.congruence_score < 1.0);
}

#[test]
fn nose_missing_from_one_mask_scores_zero() {
    let mut a = face();
    a.mask = Some(mask(true));
    let mut b = face();
    b.mask = Some(mask(false));

    let result = FaceComparator::default().compare(&a, &b).unwrap();
    let nose = result
        .region_scores
        .iter()
        .find(|r| r.region == ScoredRegion::Mask(MaskRegion::Nose))
        .unwrap();
    assert_eq!(nose.score, 0.0);

    let eyes = result
        .region_scores
        .iter()
        .find(|r| r.region == ScoredRegion::Mask(MaskRegion::Eyes))
        .unwrap();
    assert!((eyes.score - 1.0).abs() < 1e-12);

    // Landmarks are identical, so the headline score is untouched by masks
    assert_eq!(result.congruence_score, 1.0);
}

#[test]
fn one_mask_falls_back_to_landmarks() {
    let mut a = face();
    a.mask = Some(mask(true));
    let result = FaceComparator::default().compare(&a, &face()).unwrap();

    assert_eq!(result.mode, ScoringKind::LandmarkOnly);
    assert!(result.mask.is_none());
    assert!(result
        .region_scores
        .iter()
        .all(|r| matches!(r.region, ScoredRegion::Feature(_))));
}

#[test]
fn mandibular_angle_past_absolute_tolerance() {
    let a = classify_axis(Axis::MandibularAngle, 105.0);
    let b = classify_axis(Axis::MandibularAngle, 120.0);
    let c = AxisComparator::default().compare_axis(&a, &b);
    assert!((c.similarity - 0.5).abs() < 1e-12);
}

#[test]
fn jaw_contour_override_thresholds() {
    let cmp = FaceComparator::default();
    let source = |contour: JawContour| {
        let mut input = face();
        input.jaw_contour = Some(contour);
        cmp.analyze(&input).unwrap().measurements.jaw_source
    };

    assert_eq!(source(jaw_contour(6, 0.12)), JawSource::Contour);
    assert_eq!(source(jaw_contour(7, 0.9)), JawSource::Contour);
    assert_eq!(source(jaw_contour(5, 0.9)), JawSource::Landmarks);
    assert_eq!(source(jaw_contour(6, 0.11)), JawSource::Landmarks);
}

#[test]
fn age_gap_reduces_congruence() {
    let cmp = FaceComparator::default();

    let mut a = face();
    let mut b = face();
    a.age = Some(20.0);
    b.age = Some(45.0);
    let result = cmp.compare(&a, &b).unwrap();
    assert_eq!(result.raw_congruence, 1.0);
    assert!((result.age_penalty - 0.1).abs() < 1e-12);
    assert!((result.congruence_score - 0.9).abs() < 1e-12);

    // Within tau, or with one age missing, nothing is deducted
    b.age = Some(24.0);
    assert_eq!(cmp.compare(&a, &b).unwrap().age_penalty, 0.0);
    b.age = None;
    assert_eq!(cmp.compare(&a, &b).unwrap().congruence_score, 1.0);
}

#[test]
fn turned_face_raises_pose_warning() {
    let mut points = base_points();
    points[NOSE_TIP].x = 280.0;
    let turned = FaceInput::new(LandmarkSet::new(points));

    let result = FaceComparator::default().compare(&face(), &turned).unwrap();
    let warning = result.pose_warning.unwrap();
    assert!(!warning.a_non_frontal);
    assert!(warning.b_non_frontal);
    assert!(result.pose_b.yaw.abs() > 15.0);
    assert!((warning.disparity - result.pose_a.disparity(&result.pose_b)).abs() < 1e-12);
}

fn misplaced_eyes() -> EyeCenters {
    EyeCenters::new(Point::new(600.0, 40.0), Point::new(20.0, 420.0))
}

#[test]
fn turned_face_recomputes_eye_centers() {
    let cmp = FaceComparator::default();
    let mut points = base_points();
    points[NOSE_TIP].x = 280.0;

    let derived = FaceInput::new(LandmarkSet::new(points));
    let mut supplied = derived.clone();
    supplied.eye_centers = Some(misplaced_eyes());

    // After frontalization the detector's eye centers are stale and ignored
    assert_eq!(
        cmp.analyze(&supplied).unwrap().measurements,
        cmp.analyze(&derived).unwrap().measurements
    );

    // On a frontal face they are used as given
    let mut frontal = face();
    frontal.eye_centers = Some(misplaced_eyes());
    assert_ne!(
        cmp.analyze(&frontal).unwrap().measurements,
        cmp.analyze(&face()).unwrap().measurements
    );
}

#[test]
fn turned_face_keeps_jaw_contour() {
    let mut points = base_points();
    points[NOSE_TIP].x = 280.0;
    let mut turned = FaceInput::new(LandmarkSet::new(points));
    turned.jaw_contour = Some(jaw_contour(7, 0.9));

    let analysis = FaceComparator::default().analyze(&turned).unwrap();
    assert!(analysis.pose.yaw.abs() > 15.0);
    assert_eq!(analysis.measurements.jaw_source, JawSource::Contour);
    assert!(analysis.measurements.jaw.mandibular_angle.is_finite());
    assert!(analysis.measurements.jaw.jaw_width > 0.0);
}

#[test]
fn disabled_tolerance_never_scores_higher() {
    let up = face_with_canthal_rise(6.0);
    let down = face_with_canthal_rise(-6.0);

    let stepped = FaceComparator::new(Calibration::default())
        .compare(&up, &down)
        .unwrap();
    let raw = FaceComparator::with_mode(Calibration::default(), ToleranceMode::Disabled)
        .compare(&up, &down)
        .unwrap();

    assert!(raw.congruence_score <= stepped.congruence_score);
}

#[test]
fn short_landmark_set_fails_the_comparison() {
    let short = FaceInput::new(LandmarkSet::new(vec![Point::zero(); 100]));
    let err = FaceComparator::default()
        .compare(&face(), &short)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::InsufficientLandmarks {
            found: 100,
            required: 468
        }
    ));
}

#[test]
fn face_input_from_json() {
    let points: Vec<serde_json::Value> = base_points()
        .iter()
        .map(|p| serde_json::json!({ "x": p.x, "y": p.y, "z": p.z }))
        .collect();
    let json = serde_json::json!({
        "landmarks": points,
        "eyeCenters": { "left": { "x": 370.0, "y": 190.0 }, "right": { "x": 270.0, "y": 190.0 } },
        "age": 31.0,
    });
    let input: FaceInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.landmarks.len(), MIN_LANDMARKS);
    assert!(input.eye_centers.is_some());
    assert!(input.mask.is_none());
    assert_eq!(input.age, Some(31.0));

    let bad_mask = serde_json::json!({
        "landmarks": [],
        "mask": {
            "width": 4,
            "height": 4,
            "labels": [1, 1, 1],
            "crop": { "x": 0.0, "y": 0.0, "width": 4.0, "height": 4.0 },
        },
    });
    assert!(serde_json::from_value::<FaceInput>(bad_mask).is_err());
}

#[test]
fn result_serializes_camel_case() {
    let result = FaceComparator::default().compare(&face(), &face()).unwrap();
    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["congruenceScore"], 1.0);
    assert_eq!(value["mode"], "landmarkOnly");
    assert!(value["poseWarning"].is_null());
    assert!(value["comparisons"][0]["overallAgreement"].is_number());
}

#[test]
fn mask_backed_result_survives_json() {
    let mut a = face();
    a.mask = Some(mask(true));
    let mut b = face();
    b.mask = Some(mask(false));
    let result = FaceComparator::default().compare(&a, &b).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    let back: ComparisonResult = serde_json::from_str(&json).unwrap();

    assert_eq!(back.mode, ScoringKind::MaskBacked);
    let regions = |r: &ComparisonResult| r.region_scores.iter().map(|s| s.region).collect::<Vec<_>>();
    assert_eq!(regions(&back), regions(&result));
    assert!(regions(&back)
        .iter()
        .all(|r| matches!(r, ScoredRegion::Mask(_))));
    assert_eq!(back.region_scores[0].region, ScoredRegion::Mask(MaskRegion::Nose));
}
