use std::fmt;

use serde::{Deserialize, Serialize};

/// Anatomical regions measured from landmarks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Region {
    Eyes,
    Brows,
    Nose,
    Mouth,
    Cheeks,
    Jaw,
    Forehead,
    FaceShape,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::Eyes,
        Region::Brows,
        Region::Nose,
        Region::Mouth,
        Region::Cheeks,
        Region::Jaw,
        Region::Forehead,
        Region::FaceShape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Eyes => "eyes",
            Region::Brows => "brows",
            Region::Nose => "nose",
            Region::Mouth => "mouth",
            Region::Cheeks => "cheeks",
            Region::Jaw => "jaw",
            Region::Forehead => "forehead",
            Region::FaceShape => "faceShape",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single measured dimension of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Axis {
    // eyes
    CanthalTilt,
    EyeSize,
    InterocularDistance,
    // brows
    ArchHeight,
    BrowThickness,
    BrowEyeDistance,
    BrowTilt,
    // nose
    NoseWidth,
    BridgeContour,
    TipProjection,
    NoseLength,
    // mouth
    LipFullness,
    CupidsBowDefinition,
    LipCornerOrientation,
    PhiltrumLength,
    MouthWidth,
    // cheeks
    CheekboneProminence,
    CheekboneWidth,
    CheekboneHeight,
    // jaw
    JawWidth,
    MandibularAngle,
    ChinProjection,
    Symmetry,
    ChinWidth,
    // forehead
    ForeheadHeight,
    ForeheadWidth,
    ForeheadSlope,
    // face shape
    LengthWidthRatio,
    FacialThirdsBalance,
    ForeheadJawRatio,
}

impl Axis {
    pub const ALL: [Axis; 30] = [
        Axis::CanthalTilt,
        Axis::EyeSize,
        Axis::InterocularDistance,
        Axis::ArchHeight,
        Axis::BrowThickness,
        Axis::BrowEyeDistance,
        Axis::BrowTilt,
        Axis::NoseWidth,
        Axis::BridgeContour,
        Axis::TipProjection,
        Axis::NoseLength,
        Axis::LipFullness,
        Axis::CupidsBowDefinition,
        Axis::LipCornerOrientation,
        Axis::PhiltrumLength,
        Axis::MouthWidth,
        Axis::CheekboneProminence,
        Axis::CheekboneWidth,
        Axis::CheekboneHeight,
        Axis::JawWidth,
        Axis::MandibularAngle,
        Axis::ChinProjection,
        Axis::Symmetry,
        Axis::ChinWidth,
        Axis::ForeheadHeight,
        Axis::ForeheadWidth,
        Axis::ForeheadSlope,
        Axis::LengthWidthRatio,
        Axis::FacialThirdsBalance,
        Axis::ForeheadJawRatio,
    ];

    pub fn region(&self) -> Region {
        use Axis::*;
        match self {
            CanthalTilt | EyeSize | InterocularDistance => Region::Eyes,
            ArchHeight | BrowThickness | BrowEyeDistance | BrowTilt => Region::Brows,
            NoseWidth | BridgeContour | TipProjection | NoseLength => Region::Nose,
            LipFullness | CupidsBowDefinition | LipCornerOrientation | PhiltrumLength
            | MouthWidth => Region::Mouth,
            CheekboneProminence | CheekboneWidth | CheekboneHeight => Region::Cheeks,
            JawWidth | MandibularAngle | ChinProjection | Symmetry | ChinWidth => Region::Jaw,
            ForeheadHeight | ForeheadWidth | ForeheadSlope => Region::Forehead,
            LengthWidthRatio | FacialThirdsBalance | ForeheadJawRatio => Region::FaceShape,
        }
    }

    pub fn as_str(&self) -> &'static str {
        use Axis::*;
        match self {
            CanthalTilt => "canthalTilt",
            EyeSize => "eyeSize",
            InterocularDistance => "interocularDistance",
            ArchHeight => "archHeight",
            BrowThickness => "browThickness",
            BrowEyeDistance => "browEyeDistance",
            BrowTilt => "browTilt",
            NoseWidth => "noseWidth",
            BridgeContour => "bridgeContour",
            TipProjection => "tipProjection",
            NoseLength => "noseLength",
            LipFullness => "lipFullness",
            CupidsBowDefinition => "cupidsBowDefinition",
            LipCornerOrientation => "lipCornerOrientation",
            PhiltrumLength => "philtrumLength",
            MouthWidth => "mouthWidth",
            CheekboneProminence => "cheekboneProminence",
            CheekboneWidth => "cheekboneWidth",
            CheekboneHeight => "cheekboneHeight",
            JawWidth => "jawWidth",
            MandibularAngle => "mandibularAngle",
            ChinProjection => "chinProjection",
            Symmetry => "symmetry",
            ChinWidth => "chinWidth",
            ForeheadHeight => "foreheadHeight",
            ForeheadWidth => "foreheadWidth",
            ForeheadSlope => "foreheadSlope",
            LengthWidthRatio => "lengthWidthRatio",
            FacialThirdsBalance => "facialThirdsBalance",
            ForeheadJawRatio => "foreheadJawRatio",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
