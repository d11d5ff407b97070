use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::contour::ContourPolicy;
use crate::error::{Error, Result};
use crate::pose::{FRONTAL_THRESHOLD_DEG, NON_FRONTAL_THRESHOLD_DEG};
use crate::tolerance::{ToleranceConfig, ToleranceModel};

/// Similarity reduction for faces whose estimated ages differ:
/// `alpha · clip(|Δage| − tau, 0, max_gap)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AgePenalty {
    /// Penalty per year beyond `tau`.
    pub alpha: f64,
    /// Age gap, in years, below which nothing is deducted.
    pub tau: f64,
    /// Largest age gap, in years beyond `tau`, that keeps adding penalty.
    pub max_gap: f64,
}

impl Default for AgePenalty {
    fn default() -> Self {
        Self {
            alpha: 0.005,
            tau: 5.0,
            max_gap: 30.0,
        }
    }
}

impl AgePenalty {
    pub fn penalty(&self, age_a: f64, age_b: f64) -> f64 {
        let gap = (age_a - age_b).abs();
        self.alpha * (gap - self.tau).clamp(0.0, self.max_gap)
    }
}

/// Every fixed constant the comparison pipeline consumes.
///
/// Missing fields take their defaults, so a calibration file only needs to
/// list what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Calibration {
    pub tolerances: ToleranceModel,
    /// Regions at or above this agreement are summarized as similar.
    pub similar_threshold: f64,
    /// Regions at or below this agreement are summarized as different.
    pub different_threshold: f64,
    /// Degrees under which frontalization is skipped.
    pub frontal_threshold: f64,
    /// Degrees over which a face is flagged as non-frontal.
    pub non_frontal_threshold: f64,
    pub jaw_contour: ContourPolicy,
    pub age_penalty: AgePenalty,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            tolerances: ToleranceModel::default(),
            similar_threshold: 0.67,
            different_threshold: 0.33,
            frontal_threshold: FRONTAL_THRESHOLD_DEG,
            non_frontal_threshold: NON_FRONTAL_THRESHOLD_DEG,
            jaw_contour: ContourPolicy::default(),
            age_penalty: AgePenalty::default(),
        }
    }
}

impl Calibration {
    /// Load a calibration file: JSON for a `.json` extension, the binary
    /// format otherwise.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        let calibration: Self = if is_json(path) {
            serde_json::from_slice(&bytes)?
        } else {
            bincode::deserialize(&bytes)?
        };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Save to `path`, choosing the format by extension like [`Self::load`].
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let bytes = if is_json(path) {
            serde_json::to_vec_pretty(self)?
        } else {
            bincode::serialize(self)?
        };
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let calibration: Self = serde_json::from_str(json)?;
        calibration.validate()?;
        Ok(calibration)
    }

    /// Reject tables the comparator cannot use meaningfully.
    pub fn validate(&self) -> Result<()> {
        for (axis, tolerance) in self.tolerances.iter() {
            let ok = match tolerance.config {
                ToleranceConfig::Absolute(t) => t.is_finite() && t > 0.0,
                ToleranceConfig::Relative(f) => f.is_finite() && f > 0.0 && f < 1.0,
            };
            if !ok {
                return Err(Error::InvalidCalibration(format!(
                    "tolerance for {axis} out of range: {:?}",
                    tolerance.config
                )));
            }
        }

        let unit = 0.0..=1.0;
        if !unit.contains(&self.similar_threshold)
            || !unit.contains(&self.different_threshold)
            || self.different_threshold >= self.similar_threshold
        {
            return Err(Error::InvalidCalibration(format!(
                "summary thresholds must satisfy 0 <= different ({}) < similar ({}) <= 1",
                self.different_threshold, self.similar_threshold
            )));
        }

        if self.frontal_threshold < 0.0 || self.non_frontal_threshold < self.frontal_threshold {
            return Err(Error::InvalidCalibration(format!(
                "pose thresholds must satisfy 0 <= frontal ({}) <= non-frontal ({})",
                self.frontal_threshold, self.non_frontal_threshold
            )));
        }

        let p = &self.age_penalty;
        if p.alpha < 0.0 || p.tau < 0.0 || p.max_gap < 0.0 {
            return Err(Error::InvalidCalibration(
                "age penalty parameters must be non-negative".to_string(),
            ));
        }

        Ok(())
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::Axis;
    use crate::tolerance::AxisTolerance;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_is_valid() {
        Calibration::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = Calibration::from_json_str(r#"{"similarThreshold": 0.8}"#).unwrap();
        assert_eq!(c.similar_threshold, 0.8);
        assert_eq!(c.different_threshold, 0.33);
        assert_eq!(c.tolerances, ToleranceModel::default());
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let err = Calibration::from_json_str(r#"{"similarThreshold": 0.2}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidCalibration(_)));
    }

    #[test]
    fn rejects_unusable_tolerance() {
        let mut c = Calibration::default();
        c.tolerances.insert(
            Axis::NoseWidth,
            AxisTolerance::placeholder(ToleranceConfig::Relative(1.5)),
        );
        assert!(c.validate().is_err());
    }

    #[test]
    fn file_round_trip_in_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = Calibration::default();
        c.age_penalty.alpha = 0.01;

        for name in ["calibration.json", "calibration.bin"] {
            let path = dir.path().join(name);
            c.save(&path).unwrap();
            assert_eq!(Calibration::load(&path).unwrap(), c);
        }
    }

    #[test]
    fn age_penalty_shape() {
        let p = AgePenalty::default();
        assert_eq!(p.penalty(30.0, 33.0), 0.0);
        assert!((p.penalty(20.0, 35.0) - 0.05).abs() < 1e-12);
        // Gaps past tau + max_gap are capped
        assert!((p.penalty(10.0, 90.0) - 0.15).abs() < 1e-12);
    }
}
