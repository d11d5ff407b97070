//! Jaw measurements from a dense segmentation-derived jaw polyline.
//!
//! When the segmentation collaborator traces the jaw with enough points and
//! enough confidence, these measurements replace the four-landmark jaw.

use serde::{Deserialize, Serialize};

use crate::types::Point;

const EPSILON: f64 = 1e-9;

/// Fraction of the polyline height treated as "the chin row".
const CHIN_BAND: f64 = 0.08;

/// Horizontal chin offset, as a fraction of face width, that drives
/// symmetry to zero.
const SYMMETRY_SPAN: f64 = 0.1;

/// A jaw outline ordered from one end of the jaw to the other, in the same
/// pixel space as the landmarks.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JawContour {
    pub points: Vec<Point>,
    /// Segmentation confidence for the traced outline, in [0, 1].
    pub confidence: f64,
}

/// When a jaw contour is dense and confident enough to override landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourPolicy {
    pub min_points: usize,
    pub min_confidence: f64,
}

impl Default for ContourPolicy {
    fn default() -> Self {
        Self {
            min_points: 6,
            min_confidence: 0.12,
        }
    }
}

/// Jaw measurements taken from a contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContourJaw {
    pub jaw_width: f64,
    pub mandibular_angle: f64,
    pub chin_width: f64,
    pub symmetry: f64,
}

impl JawContour {
    pub fn new(points: Vec<Point>, confidence: f64) -> Self {
        Self { points, confidence }
    }

    pub fn is_usable(&self, policy: &ContourPolicy) -> bool {
        self.points.len() >= policy.min_points && self.confidence >= policy.min_confidence
    }

    /// Measure the jaw from the polyline. Returns `None` for fewer than
    /// three points, where no chin angle exists.
    pub fn measure(&self) -> Option<ContourJaw> {
        let pts = &self.points;
        if pts.len() < 3 {
            return None;
        }

        let first = pts[0];
        let last = pts[pts.len() - 1];
        let midline_x = (first.x + last.x) / 2.0;

        // Twice the widest horizontal reach from the endpoint midline
        let face_width = (2.0
            * pts
                .iter()
                .map(|p| (p.x - midline_x).abs())
                .fold(0.0_f64, f64::max))
        .max(EPSILON);

        let (chin_idx, chin) = pts
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.y.total_cmp(&b.y))?;

        let jaw_width = first.distance(&last) / face_width;

        let anchor_a = pts[1];
        let anchor_b = pts[pts.len() - 2];
        let mandibular_angle = if chin_idx == 1 || chin_idx == pts.len() - 2 {
            // The chin is itself an anchor; no angle to measure
            0.0
        } else {
            vertex_angle(&chin, &anchor_a, &anchor_b)
        };

        let (min_y, max_y) = pts
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.y), hi.max(p.y))
            });
        let band = (max_y - min_y) * CHIN_BAND;
        let (row_min_x, row_max_x) = pts
            .iter()
            .filter(|p| (p.y - chin.y).abs() <= band)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.x), hi.max(p.x))
            });
        let chin_width = (row_max_x - row_min_x).max(0.0) / face_width;

        let deviation = (chin.x - midline_x).abs() / face_width;
        let symmetry = (1.0 - deviation / SYMMETRY_SPAN).max(0.0);

        Some(ContourJaw {
            jaw_width,
            mandibular_angle,
            chin_width,
            symmetry,
        })
    }
}

/// Angle in degrees at `vertex` between the rays towards `a` and `b`.
pub(crate) fn vertex_angle(vertex: &Point, a: &Point, b: &Point) -> f64 {
    let (ax, ay) = (a.x - vertex.x, a.y - vertex.y);
    let (bx, by) = (b.x - vertex.x, b.y - vertex.y);
    let cross = ax * by - ay * bx;
    let dot = ax * bx + ay * by;
    cross.abs().atan2(dot).to_degrees()
}
