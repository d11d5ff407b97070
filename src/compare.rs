//! Axis-by-axis comparison of two classified faces.

use serde::{Deserialize, Serialize};

use crate::axis::{Axis, Region};
use crate::classify::{AxisClassification, RegionClassification};
use crate::tolerance::{Provenance, ToleranceConfig, ToleranceModel};

const EPSILON: f64 = 1e-9;

/// Weight of category agreement in the hybrid per-axis score.
const AGREEMENT_WEIGHT: f64 = 0.4;
/// Weight of continuous similarity in the hybrid per-axis score.
const SIMILARITY_WEIGHT: f64 = 0.6;

/// How raw differences map to similarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToleranceMode {
    /// Differences within tolerance score 1.0, then decay linearly.
    #[default]
    Stepped,
    /// Diagnostic mode: plain `1 − normalized difference`, tolerance ignored.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Higher,
    Lower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisComparison {
    pub axis: Axis,
    pub value_a: String,
    pub value_b: String,
    pub raw_a: f64,
    pub raw_b: f64,
    /// Both faces fall in the same category.
    pub agreement: bool,
    /// Continuous similarity of the raw measurements, in [0, 1].
    pub similarity: f64,
    /// `0.4·agreement + 0.6·similarity`.
    pub hybrid_score: f64,
    pub percent_diff: f64,
    /// Whether face A measures higher or lower than face B.
    pub direction: Direction,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureComparison {
    pub feature: Region,
    pub axes: Vec<AxisComparison>,
    /// Mean hybrid score of the compared axes, in [0, 1].
    pub overall_agreement: f64,
}

/// Compares classifications using a tolerance table.
#[derive(Debug, Clone, Default)]
pub struct AxisComparator {
    tolerances: ToleranceModel,
    mode: ToleranceMode,
}

impl AxisComparator {
    pub fn new(tolerances: ToleranceModel, mode: ToleranceMode) -> Self {
        Self { tolerances, mode }
    }

    /// Compare one axis of face A against the same axis of face B.
    pub fn compare_axis(&self, a: &AxisClassification, b: &AxisClassification) -> AxisComparison {
        let tolerance = self.tolerances.lookup(a.axis);
        let (ra, rb) = (a.raw_measurement, b.raw_measurement);

        let diff = (ra - rb).abs();
        let avg_magnitude = ((ra.abs() + rb.abs()) / 2.0).max(EPSILON);
        let similarity = similarity(diff, avg_magnitude, tolerance.config, self.mode);
        let agreement = a.value == b.value;

        AxisComparison {
            axis: a.axis,
            value_a: a.value.clone(),
            value_b: b.value.clone(),
            raw_a: ra,
            raw_b: rb,
            agreement,
            similarity,
            hybrid_score: hybrid_score(agreement, similarity),
            percent_diff: diff / avg_magnitude * 100.0,
            direction: if ra > rb {
                Direction::Higher
            } else {
                Direction::Lower
            },
            provenance: tolerance.provenance,
        }
    }

    /// Compare one region. Axes are matched by name; an axis present on only
    /// one side is skipped.
    pub fn compare_feature(
        &self,
        region: Region,
        a: &[AxisClassification],
        b: &[AxisClassification],
    ) -> FeatureComparison {
        let axes: Vec<AxisComparison> = a
            .iter()
            .filter_map(|ca| {
                b.iter()
                    .find(|cb| cb.axis == ca.axis)
                    .map(|cb| self.compare_axis(ca, cb))
            })
            .collect();

        let overall_agreement = mean(axes.iter().map(|c| c.hybrid_score));

        FeatureComparison {
            feature: region,
            axes,
            overall_agreement,
        }
    }

    /// Compare every region present in both faces, in face A's order.
    pub fn compare_features(
        &self,
        a: &[RegionClassification],
        b: &[RegionClassification],
    ) -> Vec<FeatureComparison> {
        a.iter()
            .filter_map(|ra| {
                b.iter()
                    .find(|rb| rb.region == ra.region)
                    .map(|rb| self.compare_feature(ra.region, &ra.axes, &rb.axes))
            })
            .collect()
    }
}

/// Similarity of two raw values given their absolute difference.
pub fn similarity(diff: f64, avg_magnitude: f64, config: ToleranceConfig, mode: ToleranceMode) -> f64 {
    let (normalized, tolerance) = match config {
        ToleranceConfig::Relative(fraction) => (diff / avg_magnitude.max(EPSILON), fraction),
        ToleranceConfig::Absolute(threshold) => {
            let threshold = threshold.max(EPSILON);
            (diff / threshold, threshold)
        }
    };

    let sim = match (mode, config) {
        (ToleranceMode::Disabled, _) => 1.0 - normalized,
        (ToleranceMode::Stepped, ToleranceConfig::Relative(_)) => {
            if normalized < tolerance {
                1.0
            } else {
                1.0 - (normalized - tolerance) / (1.0 - tolerance).max(EPSILON)
            }
        }
        (ToleranceMode::Stepped, ToleranceConfig::Absolute(_)) => {
            if diff < tolerance {
                1.0
            } else {
                1.0 - (diff - tolerance) / tolerance
            }
        }
    };

    if sim.is_nan() {
        0.0
    } else {
        sim.clamp(0.0, 1.0)
    }
}

/// Region-level score for one axis. Category agreement alone cannot reach
/// 1.0: two "average" values that differ materially still lose the
/// similarity share.
pub fn hybrid_score(agreement: bool, similarity: f64) -> f64 {
    let categorical = if agreement { 1.0 } else { 0.0 };
    AGREEMENT_WEIGHT * categorical + SIMILARITY_WEIGHT * similarity
}

/// Headline score: unweighted mean of raw similarity over every compared
/// axis in every region.
pub fn morphological_congruence(comparisons: &[FeatureComparison]) -> f64 {
    mean(
        comparisons
            .iter()
            .flat_map(|f| f.axes.iter().map(|c| c.similarity)),
    )
}

/// Axes where both faces share a category, across all regions.
pub fn shared_axes(comparisons: &[FeatureComparison]) -> Vec<Axis> {
    comparisons
        .iter()
        .flat_map(|f| f.axes.iter().filter(|c| c.agreement).map(|c| c.axis))
        .collect()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
