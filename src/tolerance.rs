//! Per-axis noise tolerance.
//!
//! Two measurements closer than an axis's tolerance count as the same value.
//! Angles and signed depth offsets, where zero is meaningful, use an
//! absolute threshold; ratios use a fraction of the two values' average
//! magnitude.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axis::Axis;

/// Relative tolerance used for axes with no table entry.
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToleranceConfig {
    /// Threshold in the axis's own units.
    Absolute(f64),
    /// Fraction of the average magnitude of the two compared values.
    Relative(f64),
}

/// How trustworthy a tolerance is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    /// Measured from repeated captures of the same face.
    Calibrated,
    /// Estimated; needs calibration.
    Placeholder,
    /// Not in the table; [`DEFAULT_RELATIVE_TOLERANCE`] applied.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTolerance {
    pub config: ToleranceConfig,
    pub provenance: Provenance,
}

impl AxisTolerance {
    pub const fn calibrated(config: ToleranceConfig) -> Self {
        Self {
            config,
            provenance: Provenance::Calibrated,
        }
    }

    pub const fn placeholder(config: ToleranceConfig) -> Self {
        Self {
            config,
            provenance: Provenance::Placeholder,
        }
    }

    pub const fn fallback() -> Self {
        Self {
            config: ToleranceConfig::Relative(DEFAULT_RELATIVE_TOLERANCE),
            provenance: Provenance::Fallback,
        }
    }
}

/// Tolerance table keyed by axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToleranceModel {
    entries: BTreeMap<Axis, AxisTolerance>,
}

impl ToleranceModel {
    /// A table with no entries; every lookup falls back.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with(mut self, axis: Axis, tolerance: AxisTolerance) -> Self {
        self.entries.insert(axis, tolerance);
        self
    }

    pub fn insert(&mut self, axis: Axis, tolerance: AxisTolerance) {
        self.entries.insert(axis, tolerance);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Axis, &AxisTolerance)> {
        self.entries.iter()
    }

    /// Tolerance for `axis`, falling back to the default relative tolerance
    /// for uncalibrated axes.
    pub fn lookup(&self, axis: Axis) -> AxisTolerance {
        match self.entries.get(&axis) {
            Some(t) => *t,
            None => {
                debug!(%axis, "no tolerance entry, using default relative tolerance");
                AxisTolerance::fallback()
            }
        }
    }
}

impl Default for ToleranceModel {
    fn default() -> Self {
        use Axis::*;
        use ToleranceConfig::{Absolute, Relative};

        let calibrated = [
            (CanthalTilt, Absolute(2.0)),
            (EyeSize, Relative(0.10)),
            (InterocularDistance, Relative(0.05)),
        ];
        let placeholder = [
            (ArchHeight, Relative(0.15)),
            (BrowThickness, Relative(0.15)),
            (BrowEyeDistance, Relative(0.12)),
            (BrowTilt, Absolute(3.0)),
            (NoseWidth, Relative(0.08)),
            (BridgeContour, Absolute(0.02)),
            (TipProjection, Absolute(0.05)),
            (NoseLength, Relative(0.08)),
            (LipFullness, Relative(0.12)),
            (CupidsBowDefinition, Absolute(0.01)),
            (LipCornerOrientation, Absolute(3.0)),
            (PhiltrumLength, Relative(0.12)),
            (MouthWidth, Relative(0.08)),
            (CheekboneProminence, Absolute(0.03)),
            (CheekboneWidth, Relative(0.06)),
            (CheekboneHeight, Relative(0.12)),
            (JawWidth, Relative(0.06)),
            (MandibularAngle, Absolute(10.0)),
            (ChinProjection, Absolute(0.04)),
            (Symmetry, Absolute(0.15)),
            (ChinWidth, Relative(0.12)),
            (ForeheadHeight, Relative(0.10)),
            (ForeheadWidth, Relative(0.08)),
            (ForeheadSlope, Absolute(0.06)),
            (LengthWidthRatio, Relative(0.06)),
            (FacialThirdsBalance, Absolute(0.08)),
            (ForeheadJawRatio, Relative(0.08)),
        ];

        let mut entries = BTreeMap::new();
        for (axis, config) in calibrated {
            entries.insert(axis, AxisTolerance::calibrated(config));
        }
        for (axis, config) in placeholder {
            entries.insert(axis, AxisTolerance::placeholder(config));
        }
        Self { entries }
    }
}
