//! Categorical classification of measurements.
//!
//! Every axis is split three ways (low / mid / high) by two breakpoints.
//! Confidence is 0.5 exactly at a breakpoint, from either side, and ramps
//! linearly to 1.0: outside the mid band it saturates `ramp` units past the
//! breakpoint, inside it saturates at the band center.

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, Region};
use crate::metrics::FeatureMeasurements;

/// Breakpoints and labels for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBands {
    pub low_max: f64,
    pub high_min: f64,
    /// Distance past a breakpoint at which outer-band confidence reaches 1.0.
    pub ramp: f64,
    pub labels: [&'static str; 3],
}

impl AxisBands {
    const fn new(low_max: f64, high_min: f64, ramp: f64, labels: [&'static str; 3]) -> Self {
        Self {
            low_max,
            high_min,
            ramp,
            labels,
        }
    }

    /// Label and confidence for a raw measurement.
    pub fn classify(&self, value: f64) -> (&'static str, f64) {
        let [low, mid, high] = self.labels;
        if !value.is_finite() {
            return (mid, 0.0);
        }

        if value < self.low_max {
            (low, ramp_confidence(self.low_max - value, self.ramp))
        } else if value > self.high_min {
            (high, ramp_confidence(value - self.high_min, self.ramp))
        } else {
            let half_band = (self.high_min - self.low_max) / 2.0;
            let to_edge = (value - self.low_max).min(self.high_min - value);
            (mid, ramp_confidence(to_edge, half_band))
        }
    }
}

fn ramp_confidence(distance: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 1.0;
    }
    0.5 + 0.5 * (distance / span).min(1.0)
}

/// Per-axis breakpoint table.
pub fn bands(axis: Axis) -> AxisBands {
    use Axis::*;
    match axis {
        CanthalTilt => AxisBands::new(-3.0, 3.0, 5.0, ["negative", "neutral", "positive"]),
        EyeSize => AxisBands::new(0.14, 0.20, 0.04, ["small", "average", "large"]),
        InterocularDistance => AxisBands::new(0.42, 0.48, 0.03, ["close-set", "average", "wide-set"]),

        ArchHeight => AxisBands::new(0.05, 0.11, 0.03, ["flat", "moderate", "high-arched"]),
        BrowThickness => AxisBands::new(0.08, 0.14, 0.03, ["thin", "medium", "thick"]),
        BrowEyeDistance => AxisBands::new(0.18, 0.30, 0.06, ["low-set", "average", "high-set"]),
        BrowTilt => AxisBands::new(-4.0, 4.0, 6.0, ["descending", "straight", "ascending"]),

        NoseWidth => AxisBands::new(0.22, 0.28, 0.03, ["narrow", "average", "wide"]),
        BridgeContour => AxisBands::new(-0.02, 0.02, 0.03, ["concave", "straight", "convex"]),
        TipProjection => AxisBands::new(-0.40, -0.20, 0.08, ["prominent", "moderate", "shallow"]),
        NoseLength => AxisBands::new(0.62, 0.78, 0.08, ["short", "average", "long"]),

        LipFullness => AxisBands::new(0.10, 0.16, 0.04, ["thin", "medium", "full"]),
        CupidsBowDefinition => AxisBands::new(0.015, 0.045, 0.02, ["subtle", "moderate", "pronounced"]),
        LipCornerOrientation => AxisBands::new(-3.0, 3.0, 5.0, ["downturned", "neutral", "upturned"]),
        PhiltrumLength => AxisBands::new(0.16, 0.26, 0.05, ["short", "average", "long"]),
        MouthWidth => AxisBands::new(0.33, 0.40, 0.04, ["narrow", "average", "wide"]),

        CheekboneProminence => AxisBands::new(0.0, 0.08, 0.05, ["flat", "moderate", "prominent"]),
        CheekboneWidth => AxisBands::new(0.76, 0.86, 0.05, ["narrow", "average", "wide"]),
        CheekboneHeight => AxisBands::new(0.22, 0.38, 0.08, ["high-set", "average", "low-set"]),

        JawWidth => AxisBands::new(0.74, 0.84, 0.05, ["narrow", "average", "wide"]),
        MandibularAngle => AxisBands::new(110.0, 125.0, 10.0, ["defined", "average", "soft"]),
        ChinProjection => AxisBands::new(-0.12, 0.02, 0.06, ["projected", "average", "recessed"]),
        Symmetry => AxisBands::new(0.50, 0.85, 0.15, ["asymmetric", "moderate", "symmetric"]),
        ChinWidth => AxisBands::new(0.22, 0.30, 0.04, ["narrow", "average", "broad"]),

        ForeheadHeight => AxisBands::new(0.24, 0.32, 0.04, ["short", "average", "tall"]),
        ForeheadWidth => AxisBands::new(0.70, 0.80, 0.05, ["narrow", "average", "broad"]),
        ForeheadSlope => AxisBands::new(0.05, 0.25, 0.10, ["upright", "average", "sloped"]),

        LengthWidthRatio => AxisBands::new(1.10, 1.30, 0.10, ["wide", "balanced", "long"]),
        FacialThirdsBalance => AxisBands::new(0.75, 0.90, 0.10, ["unbalanced", "moderate", "balanced"]),
        ForeheadJawRatio => AxisBands::new(0.90, 1.05, 0.08, ["narrow-forehead", "balanced", "wide-forehead"]),
    }
}

/// A measurement with its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisClassification {
    pub axis: Axis,
    /// Category label.
    pub value: String,
    pub confidence: f64,
    pub raw_measurement: f64,
}

/// Classify a single measurement.
pub fn classify_axis(axis: Axis, raw: f64) -> AxisClassification {
    let (label, confidence) = bands(axis).classify(raw);
    AxisClassification {
        axis,
        value: label.to_string(),
        confidence,
        raw_measurement: raw,
    }
}

/// Classifications for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionClassification {
    pub region: Region,
    pub axes: Vec<AxisClassification>,
}

/// Classify every region of a face, in [`Region::ALL`] order.
pub fn classify_features(measurements: &FeatureMeasurements) -> Vec<RegionClassification> {
    Region::ALL
        .iter()
        .map(|&region| RegionClassification {
            region,
            axes: measurements
                .region(region)
                .into_iter()
                .map(|(axis, raw)| classify_axis(axis, raw))
                .collect(),
        })
        .collect()
}
