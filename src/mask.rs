//! Region similarity straight from two anatomical segmentation masks.
//!
//! Independent of landmark geometry: each region is compared by pixel
//! overlap (Dice), centroid displacement, and area ratio.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::BoundingBox;

const DICE_WEIGHT: f64 = 0.6;
const CENTROID_WEIGHT: f64 = 0.25;
const AREA_WEIGHT: f64 = 0.15;

/// The fixed 19-class segmentation palette. Discriminants are the label
/// bytes stored in a [`SegmentationMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[repr(u8)]
pub enum MaskClass {
    Background = 0,
    Skin = 1,
    Nose = 2,
    Eyeglasses = 3,
    LeftEye = 4,
    RightEye = 5,
    LeftBrow = 6,
    RightBrow = 7,
    LeftEar = 8,
    RightEar = 9,
    Mouth = 10,
    UpperLip = 11,
    LowerLip = 12,
    Hair = 13,
    Hat = 14,
    Earring = 15,
    Necklace = 16,
    Neck = 17,
    Cloth = 18,
}

impl MaskClass {
    /// Decode a label byte; unknown labels yield `None`.
    pub fn from_label(label: u8) -> Option<Self> {
        use MaskClass::*;
        Some(match label {
            0 => Background,
            1 => Skin,
            2 => Nose,
            3 => Eyeglasses,
            4 => LeftEye,
            5 => RightEye,
            6 => LeftBrow,
            7 => RightBrow,
            8 => LeftEar,
            9 => RightEar,
            10 => Mouth,
            11 => UpperLip,
            12 => LowerLip,
            13 => Hair,
            14 => Hat,
            15 => Earring,
            16 => Necklace,
            17 => Neck,
            18 => Cloth,
            _ => return None,
        })
    }

    /// Comparison region this class contributes to. Cloth and accessories
    /// are never compared.
    pub fn region(&self) -> Option<MaskRegion> {
        use MaskClass::*;
        match self {
            Nose => Some(MaskRegion::Nose),
            LeftEye | RightEye => Some(MaskRegion::Eyes),
            LeftBrow | RightBrow => Some(MaskRegion::Brows),
            Mouth | UpperLip | LowerLip => Some(MaskRegion::Mouth),
            Skin => Some(MaskRegion::Skin),
            LeftEar | RightEar => Some(MaskRegion::Ears),
            Hair => Some(MaskRegion::Hair),
            Neck => Some(MaskRegion::Neck),
            Background | Eyeglasses | Hat | Earring | Necklace | Cloth => None,
        }
    }
}

/// Regions scored by the mask path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaskRegion {
    Nose,
    Eyes,
    Brows,
    Mouth,
    Skin,
    Ears,
    Hair,
    Neck,
}

impl MaskRegion {
    pub const ALL: [MaskRegion; 8] = [
        MaskRegion::Nose,
        MaskRegion::Eyes,
        MaskRegion::Brows,
        MaskRegion::Mouth,
        MaskRegion::Skin,
        MaskRegion::Ears,
        MaskRegion::Hair,
        MaskRegion::Neck,
    ];

    fn contains(&self, label: u8) -> bool {
        MaskClass::from_label(label).and_then(|c| c.region()) == Some(*self)
    }
}

/// Per-pixel class labels over a face crop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaskData")]
pub struct SegmentationMask {
    width: u32,
    height: u32,
    labels: Vec<u8>,
    /// Where the crop sits in the source image. Carried through
    /// serialization only; scoring works in crop pixel space.
    crop: BoundingBox,
}

#[derive(Deserialize)]
struct MaskData {
    width: u32,
    height: u32,
    labels: Vec<u8>,
    crop: BoundingBox,
}

impl TryFrom<MaskData> for SegmentationMask {
    type Error = Error;

    fn try_from(data: MaskData) -> Result<Self> {
        Self::new(data.width, data.height, data.labels, data.crop)
    }
}

impl SegmentationMask {
    pub fn new(width: u32, height: u32, labels: Vec<u8>, crop: BoundingBox) -> Result<Self> {
        if labels.len() != width as usize * height as usize {
            return Err(Error::MaskSize {
                width,
                height,
                len: labels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            labels,
            crop,
        })
    }

    pub fn from_fn<F>(width: u32, height: u32, crop: BoundingBox, f: F) -> Self
    where
        F: Fn(u32, u32) -> u8,
    {
        let mut labels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                labels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            labels,
            crop,
        }
    }

    /// Caller guarantees `x < width` and `y < height`.
    fn label(&self, x: u32, y: u32) -> u8 {
        self.labels[(y as usize) * self.width as usize + x as usize]
    }

    /// Binary mask of `region` on a `width`×`height` grid, sampling this
    /// mask by nearest neighbour when the grids differ.
    fn region_on_grid(&self, region: MaskRegion, width: u32, height: u32) -> BinaryMask {
        let same = width == self.width && height == self.height;
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                let (sx, sy) = if same {
                    (x, y)
                } else {
                    (
                        nearest(x, width, self.width),
                        nearest(y, height, self.height),
                    )
                };
                bits.push(self.width > 0 && self.height > 0 && region.contains(self.label(sx, sy)));
            }
        }
        BinaryMask {
            width,
            height,
            bits,
        }
    }
}

fn nearest(i: u32, target: u32, source: u32) -> u32 {
    if source == 0 {
        return 0;
    }
    let scaled = ((i as f64 + 0.5) * source as f64 / target as f64).floor() as u32;
    scaled.min(source - 1)
}

/// A single-region pixel set.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl BinaryMask {
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let mut bits = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                bits.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    pub fn area(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    fn intersection(&self, other: &BinaryMask) -> usize {
        self.bits
            .iter()
            .zip(&other.bits)
            .filter(|&(&a, &b)| a && b)
            .count()
    }

    fn union(&self, other: &BinaryMask) -> usize {
        self.bits
            .iter()
            .zip(&other.bits)
            .filter(|&(&a, &b)| a || b)
            .count()
    }

    /// Mean pixel position, or `None` for an empty mask.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
        for (i, _) in self.bits.iter().enumerate().filter(|&(_, &b)| b) {
            sx += (i % self.width as usize) as f64;
            sy += (i / self.width as usize) as f64;
            n += 1;
        }
        if n == 0 {
            None
        } else {
            Some((sx / n as f64, sy / n as f64))
        }
    }

    fn diagonal(&self) -> f64 {
        (self.width as f64).hypot(self.height as f64)
    }
}

/// Dice coefficient `2|A∩B| / (|A|+|B|)`. Two empty masks score 1.
pub fn dice(a: &BinaryMask, b: &BinaryMask) -> f64 {
    let total = a.area() + b.area();
    if total == 0 {
        return 1.0;
    }
    2.0 * a.intersection(b) as f64 / total as f64
}

/// Intersection over union. Two empty masks score 1.
pub fn iou(a: &BinaryMask, b: &BinaryMask) -> f64 {
    let union = a.union(b);
    if union == 0 {
        return 1.0;
    }
    a.intersection(b) as f64 / union as f64
}

/// `min/max` of two pixel counts; 1 when both are zero.
pub fn area_ratio_similarity(a: usize, b: usize) -> f64 {
    match (a, b) {
        (0, 0) => 1.0,
        _ => a.min(b) as f64 / a.max(b) as f64,
    }
}

/// Score of two same-grid region masks.
pub fn region_similarity(a: &BinaryMask, b: &BinaryMask) -> f64 {
    match (a.centroid(), b.centroid()) {
        (None, None) => 1.0,
        (Some(_), None) | (None, Some(_)) => 0.0,
        (Some((ax, ay)), Some((bx, by))) => {
            let distance = ((ax - bx).hypot(ay - by) / a.diagonal().max(1.0)).clamp(0.0, 1.0);
            DICE_WEIGHT * dice(a, b)
                + CENTROID_WEIGHT * (1.0 - distance)
                + AREA_WEIGHT * area_ratio_similarity(a.area(), b.area())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskRegionScore {
    pub region: MaskRegion,
    pub score: f64,
    /// `max(|A|, |B|)`, the region's share in the overall score.
    pub weight: usize,
}

/// Mask-path scores for one pair of faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaskComparison {
    pub regions: Vec<MaskRegionScore>,
    /// Pixel-count-weighted mean of the region scores.
    pub overall: f64,
}

/// Compare two masks region by region.
///
/// B is read on A's grid, so masks of different sizes are compared in A's
/// pixel frame.
pub fn compare_masks(a: &SegmentationMask, b: &SegmentationMask) -> MaskComparison {
    let regions: Vec<MaskRegionScore> = MaskRegion::ALL
        .iter()
        .map(|&region| {
            let ma = a.region_on_grid(region, a.width, a.height);
            let mb = b.region_on_grid(region, a.width, a.height);
            MaskRegionScore {
                region,
                score: region_similarity(&ma, &mb),
                weight: ma.area().max(mb.area()),
            }
        })
        .collect();

    let total_weight: usize = regions.iter().map(|r| r.weight).sum();
    let overall = if total_weight == 0 {
        1.0
    } else {
        regions
            .iter()
            .map(|r| r.score * r.weight as f64)
            .sum::<f64>()
            / total_weight as f64
    };

    MaskComparison { regions, overall }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop() -> BoundingBox {
        BoundingBox::new(0.0, 0.0, 20.0, 20.0)
    }

    /// A 20x20 face: skin everywhere, a 10x10 nose block, eyes in the top row.
    fn face(nose: bool) -> SegmentationMask {
        SegmentationMask::from_fn(20, 20, crop(), |x, y| {
            if nose && (5..15).contains(&x) && (5..15).contains(&y) {
                MaskClass::Nose as u8
            } else if y == 1 && x < 3 {
                MaskClass::LeftEye as u8
            } else if y == 1 && x > 16 {
                MaskClass::RightEye as u8
            } else if y == 19 {
                MaskClass::Cloth as u8
            } else {
                MaskClass::Skin as u8
            }
        })
    }

    #[test]
    fn self_overlap_is_perfect() {
        let m = BinaryMask::from_fn(8, 8, |x, y| x > 2 && y < 5);
        assert_eq!(dice(&m, &m), 1.0);
        assert_eq!(iou(&m, &m), 1.0);
        assert_eq!(region_similarity(&m, &m), 1.0);
    }

    #[test]
    fn area_ratio_edges() {
        assert_eq!(area_ratio_similarity(0, 0), 1.0);
        assert_eq!(area_ratio_similarity(7, 0), 0.0);
        assert_eq!(area_ratio_similarity(0, 7), 0.0);
        assert!((area_ratio_similarity(50, 100) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn identical_masks_score_one() {
        let cmp = compare_masks(&face(true), &face(true));
        assert!(cmp.regions.iter().all(|r| (r.score - 1.0).abs() < 1e-12));
        assert_eq!(cmp.overall, 1.0);
    }

    #[test]
    fn one_sided_nose_scores_zero() {
        let cmp = compare_masks(&face(true), &face(false));
        let nose = cmp
            .regions
            .iter()
            .find(|r| r.region == MaskRegion::Nose)
            .unwrap();
        assert_eq!(nose.score, 0.0);
        assert_eq!(nose.weight, 100);

        let eyes = cmp
            .regions
            .iter()
            .find(|r| r.region == MaskRegion::Eyes)
            .unwrap();
        assert_eq!(eyes.score, 1.0);
    }

    #[test]
    fn absent_regions_are_vacuous_and_weightless() {
        let cmp = compare_masks(&face(true), &face(true));
        let hair = cmp
            .regions
            .iter()
            .find(|r| r.region == MaskRegion::Hair)
            .unwrap();
        assert_eq!(hair.score, 1.0);
        assert_eq!(hair.weight, 0);
    }

    #[test]
    fn cloth_is_never_a_region() {
        assert_eq!(MaskClass::Cloth.region(), None);
        assert!(MaskRegion::ALL.iter().all(|r| !r.contains(MaskClass::Cloth as u8)));
    }

    #[test]
    fn unknown_labels_are_ignored() {
        assert_eq!(MaskClass::from_label(19), None);
        let a = SegmentationMask::from_fn(4, 4, crop(), |_, _| 200);
        let cmp = compare_masks(&a, &a);
        assert_eq!(cmp.overall, 1.0);
        assert!(cmp.regions.iter().all(|r| r.weight == 0));
    }

    #[test]
    fn mismatched_sizes_are_resampled() {
        let small = SegmentationMask::from_fn(10, 10, crop(), |x, y| {
            if x < 5 && y < 5 {
                MaskClass::Nose as u8
            } else {
                MaskClass::Skin as u8
            }
        });
        let large = SegmentationMask::from_fn(20, 20, crop(), |x, y| {
            if x < 10 && y < 10 {
                MaskClass::Nose as u8
            } else {
                MaskClass::Skin as u8
            }
        });
        let cmp = compare_masks(&small, &large);
        assert!(cmp.regions.iter().all(|r| (r.score - 1.0).abs() < 1e-12));
    }

    #[test]
    fn buffer_size_is_validated() {
        let err = SegmentationMask::new(4, 4, vec![0; 15], crop()).unwrap_err();
        assert!(matches!(err, Error::MaskSize { len: 15, .. }));
        assert!(SegmentationMask::new(4, 4, vec![0; 16], crop()).is_ok());
    }

    #[test]
    fn deserialization_validates_buffer() {
        let bad = r#"{"width":2,"height":2,"labels":[1,1,1],"crop":{"x":0,"y":0,"width":2,"height":2}}"#;
        assert!(serde_json::from_str::<SegmentationMask>(bad).is_err());

        let good = r#"{"width":2,"height":2,"labels":[1,1,2,2],"crop":{"x":0,"y":0,"width":2,"height":2}}"#;
        let mask: SegmentationMask = serde_json::from_str(good).unwrap();
        assert_eq!(mask.label(0, 1), MaskClass::Nose as u8);
    }
}
