//! Facial feature measurements from landmarks.
//!
//! Every value is a ratio or an angle: lengths are normalized by the
//! interocular distance (IPD) or by the face width, so no raw pixel unit
//! leaves this module. Degenerate input never fails: denominators floor at
//! a small epsilon and the output is defined, if meaningless.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::{Axis, Region};
use crate::contour::{ContourPolicy, JawContour};
use crate::error::{Error, Result};
use crate::landmarks::*;
use crate::types::{EyeCenters, LandmarkSet, Point};

const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EyeMeasurements {
    /// Degrees, positive when the outer corner sits above the inner corner.
    pub canthal_tilt: f64,
    /// Eyelid aperture / IPD.
    pub eye_size: f64,
    /// IPD / face width.
    pub interocular_distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowMeasurements {
    pub arch_height: f64,
    pub thickness: f64,
    pub brow_eye_distance: f64,
    /// Degrees, positive when the tail sits above the head of the brow.
    pub brow_tilt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoseMeasurements {
    pub width: f64,
    /// Positive = convex.
    pub bridge_contour: f64,
    /// Negative = forward projection.
    pub tip_projection: f64,
    pub length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MouthMeasurements {
    pub lip_fullness: f64,
    pub cupids_bow_definition: f64,
    /// Degrees, positive = upturned corners.
    pub lip_corner_orientation: f64,
    pub philtrum_length: f64,
    pub mouth_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheekMeasurements {
    pub cheekbone_prominence: f64,
    pub cheekbone_width: f64,
    pub cheekbone_height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JawMeasurements {
    pub jaw_width: f64,
    /// Degrees.
    pub mandibular_angle: f64,
    pub chin_projection: f64,
    /// 1.0 = chin on the facial midline.
    pub symmetry: f64,
    pub chin_width: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeheadMeasurements {
    pub height: f64,
    pub width: f64,
    pub slope: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceShapeMeasurements {
    pub length_width_ratio: f64,
    /// 1.0 = three equal vertical thirds.
    pub facial_thirds_balance: f64,
    pub forehead_jaw_ratio: f64,
}

/// Where the jaw measurements came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JawSource {
    #[default]
    Landmarks,
    Contour,
}

/// All region measurements for one face.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureMeasurements {
    pub eyes: EyeMeasurements,
    pub brows: BrowMeasurements,
    pub nose: NoseMeasurements,
    pub mouth: MouthMeasurements,
    pub cheeks: CheekMeasurements,
    pub jaw: JawMeasurements,
    pub forehead: ForeheadMeasurements,
    pub face_shape: FaceShapeMeasurements,
    pub jaw_source: JawSource,
    /// False when the landmarks carried no depth; z-based axes are then 0.
    pub has_depth: bool,
}

impl FeatureMeasurements {
    /// Named scalar values of one region, in a fixed axis order.
    pub fn region(&self, region: Region) -> Vec<(Axis, f64)> {
        use Axis::*;
        match region {
            Region::Eyes => vec![
                (CanthalTilt, self.eyes.canthal_tilt),
                (EyeSize, self.eyes.eye_size),
                (InterocularDistance, self.eyes.interocular_distance),
            ],
            Region::Brows => vec![
                (ArchHeight, self.brows.arch_height),
                (BrowThickness, self.brows.thickness),
                (BrowEyeDistance, self.brows.brow_eye_distance),
                (BrowTilt, self.brows.brow_tilt),
            ],
            Region::Nose => vec![
                (NoseWidth, self.nose.width),
                (BridgeContour, self.nose.bridge_contour),
                (TipProjection, self.nose.tip_projection),
                (NoseLength, self.nose.length),
            ],
            Region::Mouth => vec![
                (LipFullness, self.mouth.lip_fullness),
                (CupidsBowDefinition, self.mouth.cupids_bow_definition),
                (LipCornerOrientation, self.mouth.lip_corner_orientation),
                (PhiltrumLength, self.mouth.philtrum_length),
                (MouthWidth, self.mouth.mouth_width),
            ],
            Region::Cheeks => vec![
                (CheekboneProminence, self.cheeks.cheekbone_prominence),
                (CheekboneWidth, self.cheeks.cheekbone_width),
                (CheekboneHeight, self.cheeks.cheekbone_height),
            ],
            Region::Jaw => vec![
                (JawWidth, self.jaw.jaw_width),
                (MandibularAngle, self.jaw.mandibular_angle),
                (ChinProjection, self.jaw.chin_projection),
                (Symmetry, self.jaw.symmetry),
                (ChinWidth, self.jaw.chin_width),
            ],
            Region::Forehead => vec![
                (ForeheadHeight, self.forehead.height),
                (ForeheadWidth, self.forehead.width),
                (ForeheadSlope, self.forehead.slope),
            ],
            Region::FaceShape => vec![
                (LengthWidthRatio, self.face_shape.length_width_ratio),
                (FacialThirdsBalance, self.face_shape.facial_thirds_balance),
                (ForeheadJawRatio, self.face_shape.forehead_jaw_ratio),
            ],
        }
    }
}

/// Computes [`FeatureMeasurements`] from a landmark set.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor {
    contour_policy: ContourPolicy,
}

impl FeatureExtractor {
    pub fn new(contour_policy: ContourPolicy) -> Self {
        Self { contour_policy }
    }

    /// Measure every region.
    ///
    /// `eyes` are the detector's pre-averaged eye centers; when absent they
    /// are averaged from the eye rings. A usable `jaw_contour` replaces the
    /// landmark jaw width, angle, chin width, and symmetry.
    ///
    /// Fails only when the set has fewer than [`MIN_LANDMARKS`] points.
    pub fn extract(
        &self,
        landmarks: &LandmarkSet,
        eyes: Option<EyeCenters>,
        jaw_contour: Option<&JawContour>,
    ) -> Result<FeatureMeasurements> {
        if landmarks.len() < MIN_LANDMARKS {
            return Err(Error::InsufficientLandmarks {
                found: landmarks.len(),
                required: MIN_LANDMARKS,
            });
        }

        let frame = Frame::new(landmarks, eyes.unwrap_or_else(|| eye_centers(landmarks)));

        let mut jaw = frame.jaw();
        let mut jaw_source = JawSource::Landmarks;
        if let Some(contour) = jaw_contour.filter(|c| c.is_usable(&self.contour_policy)) {
            if let Some(measured) = contour.measure() {
                debug!(
                    points = contour.points.len(),
                    confidence = contour.confidence,
                    "jaw measured from contour"
                );
                jaw.jaw_width = measured.jaw_width;
                jaw.mandibular_angle = measured.mandibular_angle;
                jaw.chin_width = measured.chin_width;
                jaw.symmetry = measured.symmetry;
                jaw_source = JawSource::Contour;
            }
        }

        Ok(FeatureMeasurements {
            eyes: frame.eyes(),
            brows: frame.brows(),
            nose: frame.nose(),
            mouth: frame.mouth(),
            cheeks: frame.cheeks(),
            jaw,
            forehead: frame.forehead(),
            face_shape: frame.face_shape(),
            jaw_source,
            has_depth: landmarks.has_depth(),
        })
    }
}

/// Landmarks plus the normalization units shared by every region.
struct Frame<'a> {
    lm: &'a LandmarkSet,
    eyes: EyeCenters,
    ipd: f64,
    face_width: f64,
    face_height: f64,
}

impl<'a> Frame<'a> {
    fn new(lm: &'a LandmarkSet, eyes: EyeCenters) -> Self {
        let ipd = eyes.distance();
        let face_width = lm
            .point(RIGHT_CHEEK_CONTOUR)
            .distance(&lm.point(LEFT_CHEEK_CONTOUR));
        let face_height = lm.point(FOREHEAD_TOP).distance(&lm.point(CHIN));
        Self {
            lm,
            eyes,
            ipd,
            face_width,
            face_height,
        }
    }

    fn p(&self, idx: usize) -> Point {
        self.lm.point(idx)
    }

    fn by_ipd(&self, v: f64) -> f64 {
        ratio(v, self.ipd)
    }

    fn by_width(&self, v: f64) -> f64 {
        ratio(v, self.face_width)
    }

    fn eyes(&self) -> EyeMeasurements {
        let right_outer = self.lm.mean_of(&RIGHT_EYE_OUTER_CORNER);
        let right_inner = self.lm.mean_of(&RIGHT_EYE_INNER_CORNER);
        let left_outer = self.lm.mean_of(&LEFT_EYE_OUTER_CORNER);
        let left_inner = self.lm.mean_of(&LEFT_EYE_INNER_CORNER);

        let canthal_tilt = (tilt(&left_inner, &left_outer, false)
            + tilt(&right_inner, &right_outer, true))
            / 2.0;

        let right_aperture = self.p(RIGHT_EYE_UPPER_LID).distance(&self.p(RIGHT_EYE_LOWER_LID));
        let left_aperture = self.p(LEFT_EYE_UPPER_LID).distance(&self.p(LEFT_EYE_LOWER_LID));

        EyeMeasurements {
            canthal_tilt,
            eye_size: self.by_ipd((right_aperture + left_aperture) / 2.0),
            interocular_distance: self.by_width(self.ipd),
        }
    }

    fn brows(&self) -> BrowMeasurements {
        let (ri, rp, ro, rl) = (
            self.p(RIGHT_BROW_INNER),
            self.p(RIGHT_BROW_PEAK),
            self.p(RIGHT_BROW_OUTER),
            self.p(RIGHT_BROW_LOWER_PEAK),
        );
        let (li, lp, lo, ll) = (
            self.p(LEFT_BROW_INNER),
            self.p(LEFT_BROW_PEAK),
            self.p(LEFT_BROW_OUTER),
            self.p(LEFT_BROW_LOWER_PEAK),
        );

        let arch = (arc_height(&ri, &ro, &rp) + arc_height(&li, &lo, &lp)) / 2.0;
        let thickness = (rp.distance(&rl) + lp.distance(&ll)) / 2.0;
        let gap = ((self.p(RIGHT_EYE_UPPER_LID).y - rl.y) + (self.p(LEFT_EYE_UPPER_LID).y - ll.y))
            / 2.0;

        BrowMeasurements {
            arch_height: self.by_ipd(arch),
            thickness: self.by_ipd(thickness),
            brow_eye_distance: self.by_ipd(gap),
            brow_tilt: (tilt(&li, &lo, false) + tilt(&ri, &ro, true)) / 2.0,
        }
    }

    fn nose(&self) -> NoseMeasurements {
        let top = self.p(BRIDGE_TOP);
        let mid = self.p(BRIDGE_MID);
        let tip = self.p(NOSE_TIP);

        // Depth the mid-bridge would have on a straight line from top to tip
        let t = signed_ratio(mid.y - top.y, tip.y - top.y);
        let expected_z = top.z_or_zero() + t * (tip.z_or_zero() - top.z_or_zero());
        let bridge_length = top.distance(&tip);

        NoseMeasurements {
            width: self.by_width(self.p(RIGHT_ALAR).distance(&self.p(LEFT_ALAR))),
            bridge_contour: ratio(mid.z_or_zero() - expected_z, bridge_length),
            tip_projection: self.by_ipd(tip.z_or_zero() - top.z_or_zero()),
            length: self.by_ipd(top.distance(&self.p(NOSE_BASE))),
        }
    }

    fn mouth(&self) -> MouthMeasurements {
        let lip_top = self.p(UPPER_LIP_TOP);
        let upper_inner = self.p(UPPER_LIP_INNER);
        let lower_inner = self.p(LOWER_LIP_INNER);
        let lip_bottom = self.p(LOWER_LIP_BOTTOM);

        let upper = lip_top.distance(&upper_inner);
        let lower = lower_inner.distance(&lip_bottom);

        let peaks_y = (self.p(RIGHT_CUPIDS_PEAK).y + self.p(LEFT_CUPIDS_PEAK).y) / 2.0;

        let right = self.lm.mean_of(&RIGHT_MOUTH_CORNER);
        let left = self.lm.mean_of(&LEFT_MOUTH_CORNER);
        let center = upper_inner.midpoint(&lower_inner);
        // Both angles follow the lip line from image-left to image-right,
        // with y flipped so "up" is positive.
        let left_angle = (-(left.y - center.y)).atan2(left.x - center.x).to_degrees();
        let right_angle = (-(center.y - right.y)).atan2(center.x - right.x).to_degrees();

        MouthMeasurements {
            lip_fullness: ratio(upper + lower, 2.0 * self.ipd),
            cupids_bow_definition: self.by_ipd((lip_top.y - peaks_y).abs()),
            lip_corner_orientation: (left_angle - right_angle) / 2.0,
            philtrum_length: self.by_ipd(self.p(NOSE_BASE).distance(&lip_top)),
            mouth_width: self.by_width(right.distance(&left)),
        }
    }

    fn cheeks(&self) -> CheekMeasurements {
        let rb = self.p(RIGHT_CHEEKBONE);
        let lb = self.p(LEFT_CHEEKBONE);
        let prominence = ((self.p(RIGHT_CHEEK_CENTER).z_or_zero() - rb.z_or_zero())
            + (self.p(LEFT_CHEEK_CENTER).z_or_zero() - lb.z_or_zero()))
            / 2.0;
        let height = ((rb.y - self.eyes.right.y) + (lb.y - self.eyes.left.y)) / 2.0;

        CheekMeasurements {
            cheekbone_prominence: self.by_ipd(prominence),
            cheekbone_width: self.by_width(rb.distance(&lb)),
            cheekbone_height: self.by_ipd(height),
        }
    }

    fn jaw(&self) -> JawMeasurements {
        let chin = self.p(CHIN);
        let rg = self.p(RIGHT_GONION);
        let lg = self.p(LEFT_GONION);

        let angle = (gonial_angle(&rg, &chin, &self.eyes.right)
            + gonial_angle(&lg, &chin, &self.eyes.left))
            / 2.0;

        let face_z = self.lm.points.iter().map(Point::z_or_zero).sum::<f64>()
            / self.lm.len() as f64;

        let midline_x = self.eyes.midpoint().x;
        let symmetry = (1.0 - ratio((chin.x - midline_x).abs(), 0.1 * self.ipd)).max(0.0);

        JawMeasurements {
            jaw_width: self.by_width(rg.distance(&lg)),
            mandibular_angle: angle,
            chin_projection: self.by_ipd(chin.z_or_zero() - face_z),
            symmetry,
            chin_width: self.by_width(self.p(RIGHT_CHIN_SIDE).distance(&self.p(LEFT_CHIN_SIDE))),
        }
    }

    fn forehead(&self) -> ForeheadMeasurements {
        let top = self.p(FOREHEAD_TOP);
        let glabella = self.p(GLABELLA);

        ForeheadMeasurements {
            height: ratio(glabella.y - top.y, self.face_height),
            width: self.by_width(self.p(RIGHT_TEMPLE).distance(&self.p(LEFT_TEMPLE))),
            slope: self.by_ipd(top.z_or_zero() - glabella.z_or_zero()),
        }
    }

    fn face_shape(&self) -> FaceShapeMeasurements {
        let top = self.p(FOREHEAD_TOP).y;
        let glabella = self.p(GLABELLA).y;
        let base = self.p(NOSE_BASE).y;
        let chin = self.p(CHIN).y;

        let thirds = [glabella - top, base - glabella, chin - base];
        let total: f64 = thirds.iter().sum();
        let mean = total / 3.0;
        let deviation: f64 = thirds.iter().map(|t| (t - mean).abs()).sum();
        let balance = (1.0 - ratio(deviation, total)).clamp(0.0, 1.0);

        let temples = self.p(RIGHT_TEMPLE).distance(&self.p(LEFT_TEMPLE));
        let gonions = self.p(RIGHT_GONION).distance(&self.p(LEFT_GONION));

        FaceShapeMeasurements {
            length_width_ratio: ratio(self.face_height, self.face_width),
            facial_thirds_balance: balance,
            forehead_jaw_ratio: ratio(temples, gonions),
        }
    }
}

/// Divide by a length, flooring the denominator at epsilon.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    numerator / denominator.max(EPSILON)
}

/// Divide by a signed quantity, keeping its sign away from zero.
fn signed_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        numerator / EPSILON.copysign(denominator)
    } else {
        numerator / denominator
    }
}

/// Angle in degrees of the inner→outer line, positive when `outer` is above
/// `inner`. `mirrored` flips x so both sides of the face share one sign
/// convention.
fn tilt(inner: &Point, outer: &Point, mirrored: bool) -> f64 {
    let dx = if mirrored {
        inner.x - outer.x
    } else {
        outer.x - inner.x
    };
    (inner.y - outer.y).atan2(dx).to_degrees()
}

/// Perpendicular height of `peak` above the chord `a`–`b`; negative below it.
fn arc_height(a: &Point, b: &Point, peak: &Point) -> f64 {
    let (cx, cy) = (b.x - a.x, b.y - a.y);
    let (px, py) = (peak.x - a.x, peak.y - a.y);
    let len = (cx * cx + cy * cy).sqrt();
    let height = (cx * py - cy * px).abs() / len.max(EPSILON);

    let t = (px * cx + py * cy) / (len * len).max(EPSILON);
    let chord_y = a.y + t * cy;
    if peak.y <= chord_y {
        height
    } else {
        -height
    }
}

/// |angle(gonion→chin) − angle(gonion→eye)| folded into [0°, 180°].
fn gonial_angle(gonion: &Point, chin: &Point, eye: &Point) -> f64 {
    let diff = (gonion.angle_to(chin) - gonion.angle_to(eye)).abs() % 360.0;
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}
