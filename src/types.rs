use serde::{Deserialize, Serialize};

/// A landmark position in image-pixel space.
///
/// Depth is optional: detectors that only report image-plane positions leave
/// `z` empty, and arithmetic treats a missing depth as 0.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: None }
    }

    pub const fn with_z(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z: Some(z) }
    }

    pub const fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: None,
        }
    }

    pub fn z_or_zero(&self) -> f64 {
        self.z.unwrap_or(0.0)
    }

    /// Image-plane distance, ignoring depth.
    pub fn distance(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(&self, other: &Point) -> Point {
        (*self + *other) * 0.5
    }

    /// Angle in degrees of the vector from `self` to `other`, measured with
    /// image y pointing down (0° = +x, 90° = +y).
    pub fn angle_to(&self, other: &Point) -> f64 {
        (other.y - self.y).atan2(other.x - self.x).to_degrees()
    }

    /// Mean of a set of points. Depth is reported only if some point has it.
    pub fn centroid(points: &[Point]) -> Point {
        if points.is_empty() {
            return Point::zero();
        }
        let sum = points.iter().fold(Point::zero(), |acc, p| acc + *p);
        sum * (1.0 / points.len() as f64)
    }
}

fn combine_z(a: Option<f64>, b: Option<f64>, f: impl Fn(f64, f64) -> f64) -> Option<f64> {
    match (a, b) {
        (None, None) => None,
        _ => Some(f(a.unwrap_or(0.0), b.unwrap_or(0.0))),
    }
}

impl std::ops::Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: combine_z(self.z, rhs.z, |a, b| a + b),
        }
    }
}

impl std::ops::Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: combine_z(self.z, rhs.z, |a, b| a - b),
        }
    }
}

impl std::ops::Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z.map(|z| z * rhs),
        }
    }
}

/// A rectangle in source-image pixel space: top-left corner, width, and height.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The ordered landmark output of a face-mesh detector.
///
/// Index meaning follows the fixed topology in [`crate::landmarks`]; the set
/// never reorders or drops points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    pub points: Vec<Point>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_fn<F>(n: usize, f: F) -> Self
    where
        F: Fn(usize) -> Point,
    {
        Self {
            points: (0..n).map(f).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark at `idx`, or the origin when the set is too short.
    pub fn point(&self, idx: usize) -> Point {
        self.points.get(idx).copied().unwrap_or_default()
    }

    /// Mean of the landmarks at `indices`.
    pub fn mean_of(&self, indices: &[usize]) -> Point {
        let pts: Vec<Point> = indices.iter().map(|&i| self.point(i)).collect();
        Point::centroid(&pts)
    }

    /// True when every landmark carries a depth value.
    pub fn has_depth(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.z.is_some())
    }

    pub fn centroid(&self) -> Point {
        Point::centroid(&self.points)
    }
}

/// Left and right eye centers, named from the subject's point of view
/// (the right eye appears on the image's left).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeCenters {
    pub left: Point,
    pub right: Point,
}

impl EyeCenters {
    pub const fn new(left: Point, right: Point) -> Self {
        Self { left, right }
    }

    /// Interocular distance in pixels.
    pub fn distance(&self) -> f64 {
        self.left.distance(&self.right)
    }

    pub fn midpoint(&self) -> Point {
        self.left.midpoint(&self.right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 4.0);

        let sum = a + b;
        assert_eq!(sum.x, 4.0);
        assert_eq!(sum.y, 6.0);
        assert_eq!(sum.z, None);

        let diff = b - a;
        assert_eq!(diff.x, 2.0);
        assert_eq!(diff.y, 2.0);

        let scaled = a * 2.0;
        assert_eq!(scaled.x, 2.0);
        assert_eq!(scaled.y, 4.0);
    }

    #[test]
    fn missing_depth_counts_as_zero() {
        let a = Point::with_z(0.0, 0.0, 3.0);
        let b = Point::new(0.0, 0.0);

        assert_eq!((a + b).z, Some(3.0));
        assert_eq!((b - a).z, Some(-3.0));
        assert_eq!(a.midpoint(&b).z, Some(1.5));
    }

    #[test]
    fn angle_uses_image_orientation() {
        let origin = Point::new(0.0, 0.0);
        assert!((origin.angle_to(&Point::new(1.0, 0.0))).abs() < 1e-12);
        assert!((origin.angle_to(&Point::new(0.0, 1.0)) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_empty_is_origin() {
        assert_eq!(Point::centroid(&[]), Point::zero());
    }

    #[test]
    fn landmark_set_lookup() {
        let set = LandmarkSet::from_fn(3, |i| Point::with_z(i as f64, 0.0, 1.0));
        assert_eq!(set.len(), 3);
        assert!(set.has_depth());
        assert_eq!(set.point(2).x, 2.0);
        // Out of range reads fall back to the origin
        assert_eq!(set.point(10), Point::zero());
        assert!((set.mean_of(&[0, 2]).x - 1.0).abs() < 1e-12);
    }
}
