//! Axis-aligned bounding boxes for search windows and node regions.

/// A 2D bounding box represented by minimum and maximum coordinates.
///
/// `BoundingBox` defines a rectangular area in 2D space using the minimum
/// (min_x, min_y) and maximum (max_x, max_y) corners. It serves both as the
/// region reported for R-tree nodes during descent and as the search window
/// queried against the index during buffer expansion.
///
/// # Examples
///
/// ```rust
/// use geoknn::BoundingBox;
///
/// let window = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
/// assert!(window.contains_point(50.0, 50.0));
/// assert_eq!(window.expanded(10.0).min_x, -10.0);
/// ```
#[derive(Clone, PartialEq, Default, Debug, serde::Deserialize, serde::Serialize)]
pub struct BoundingBox {
    /// Minimum X coordinate
    pub min_x: f64,
    /// Minimum Y coordinate
    pub min_y: f64,
    /// Maximum X coordinate
    pub max_x: f64,
    /// Maximum Y coordinate
    pub max_y: f64,
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BoundingBox({}, {}, {}, {})",
            self.min_x, self.min_y, self.max_x, self.max_y
        )
    }
}

impl BoundingBox {
    /// Creates a new bounding box with the specified coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> BoundingBox {
        BoundingBox {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The box covering the whole plane, used as the unconstrained
    /// containment frame and as the maximal-radius fallback window.
    pub fn whole_plane() -> BoundingBox {
        BoundingBox {
            min_x: f64::NEG_INFINITY,
            min_y: f64::NEG_INFINITY,
            max_x: f64::INFINITY,
            max_y: f64::INFINITY,
        }
    }

    /// Returns the width of the bounding box.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounding box.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Returns the center point of the bounding box.
    pub fn center(&self) -> (f64, f64) {
        ((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Returns the four corners as `(x, y)` pairs, in
    /// (min,min), (min,max), (max,min), (max,max) order.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.min_x, self.max_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
        ]
    }

    /// Returns this box grown outward by `radius` on every side.
    pub fn expanded(&self, radius: f64) -> BoundingBox {
        BoundingBox::new(
            self.min_x - radius,
            self.min_y - radius,
            self.max_x + radius,
            self.max_y + radius,
        )
    }

    /// Checks if this bounding box contains a point.
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Checks if this bounding box contains another bounding box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Checks if this bounding box intersects another bounding box.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Returns the union of this bounding box with another.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Returns the minimum distance from this box to a point
    /// (zero when the point lies inside).
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let dx = (self.min_x - x).max(x - self.max_x).max(0.0);
        let dy = (self.min_y - y).max(y - self.max_y).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Returns the minimum distance between this box and another
    /// (zero when they intersect).
    pub fn distance_to(&self, other: &BoundingBox) -> f64 {
        let dx = (self.min_x - other.max_x).max(other.min_x - self.max_x).max(0.0);
        let dy = (self.min_y - other.max_y).max(other.min_y - self.max_y).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Checks if this bounding box is a point (zero area).
    pub fn is_point(&self) -> bool {
        self.min_x == self.max_x && self.min_y == self.max_y
    }

    /// Checks if this bounding box is valid (min <= max, no NaN).
    pub fn is_valid(&self) -> bool {
        self.min_x <= self.max_x && self.min_y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(bbox.min_x, 1.0);
        assert_eq!(bbox.min_y, 2.0);
        assert_eq!(bbox.max_x, 3.0);
        assert_eq!(bbox.max_y, 4.0);
    }

    #[test]
    fn test_default_is_degenerate_origin() {
        let bbox = BoundingBox::default();
        assert!(bbox.is_point());
        assert!(bbox.is_valid());
    }

    #[test]
    fn test_whole_plane() {
        let plane = BoundingBox::whole_plane();
        assert!(plane.is_valid());
        assert!(plane.contains_point(1e300, -1e300));
        assert!(plane.contains(&BoundingBox::new(-10.0, -10.0, 10.0, 10.0)));
    }

    #[test]
    fn test_width_height() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 5.0);
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 5.0);
    }

    #[test]
    fn test_center() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(bbox.center(), (5.0, 5.0));
    }

    #[test]
    fn test_corners() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        let corners = bbox.corners();
        assert!(corners.contains(&(1.0, 2.0)));
        assert!(corners.contains(&(1.0, 4.0)));
        assert!(corners.contains(&(3.0, 2.0)));
        assert!(corners.contains(&(3.0, 4.0)));
    }

    #[test]
    fn test_expanded() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let grown = bbox.expanded(2.5);
        assert_eq!(grown, BoundingBox::new(-2.5, -2.5, 12.5, 12.5));
    }

    #[test]
    fn test_contains_point() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

        assert!(bbox.contains_point(5.0, 5.0));
        assert!(bbox.contains_point(0.0, 0.0));
        assert!(bbox.contains_point(10.0, 10.0));
        assert!(!bbox.contains_point(-1.0, 5.0));
        assert!(!bbox.contains_point(11.0, 5.0));
    }

    #[test]
    fn test_contains_bbox() {
        let outer = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let inner = BoundingBox::new(2.0, 2.0, 8.0, 8.0);
        let partial = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let outside = BoundingBox::new(20.0, 20.0, 30.0, 30.0);

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&partial));
        assert!(!outer.contains(&outside));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_intersects() {
        let bbox1 = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let bbox2 = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let bbox3 = BoundingBox::new(20.0, 20.0, 30.0, 30.0);
        let bbox4 = BoundingBox::new(10.0, 10.0, 20.0, 20.0); // Touches corner

        assert!(bbox1.intersects(&bbox2));
        assert!(bbox2.intersects(&bbox1));
        assert!(!bbox1.intersects(&bbox3));
        assert!(bbox1.intersects(&bbox4)); // Touching counts as intersection
    }

    #[test]
    fn test_union() {
        let bbox1 = BoundingBox::new(0.0, 0.0, 5.0, 5.0);
        let bbox2 = BoundingBox::new(3.0, 3.0, 10.0, 10.0);

        assert_eq!(bbox1.union(&bbox2), BoundingBox::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_distance_to_point() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);

        assert_eq!(bbox.distance_to_point(5.0, 5.0), 0.0); // Inside
        assert_eq!(bbox.distance_to_point(10.0, 10.0), 0.0); // Corner
        assert_eq!(bbox.distance_to_point(13.0, 14.0), 5.0); // 3-4-5 outside corner
        assert_eq!(bbox.distance_to_point(-4.0, 5.0), 4.0); // Left of the box
    }

    #[test]
    fn test_distance_to_box() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let overlapping = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
        let beside = BoundingBox::new(14.0, 0.0, 20.0, 10.0);
        let diagonal = BoundingBox::new(13.0, 14.0, 20.0, 20.0);

        assert_eq!(a.distance_to(&overlapping), 0.0);
        assert_eq!(a.distance_to(&beside), 4.0);
        assert_eq!(a.distance_to(&diagonal), 5.0);
    }

    #[test]
    fn test_is_point() {
        assert!(BoundingBox::new(5.0, 5.0, 5.0, 5.0).is_point());
        assert!(!BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_point());
    }

    #[test]
    fn test_is_valid() {
        assert!(BoundingBox::new(0.0, 0.0, 10.0, 10.0).is_valid());
        assert!(!BoundingBox::new(10.0, 10.0, 0.0, 0.0).is_valid());
        assert!(BoundingBox::new(5.0, 5.0, 5.0, 5.0).is_valid());
        assert!(!BoundingBox::new(f64::NAN, 0.0, 10.0, 10.0).is_valid());
    }

    #[test]
    fn test_negative_coordinates() {
        let bbox = BoundingBox::new(-10.0, -5.0, 10.0, 5.0);
        assert_eq!(bbox.width(), 20.0);
        assert_eq!(bbox.height(), 10.0);
        assert_eq!(bbox.center(), (0.0, 0.0));
    }

    #[test]
    fn test_serialization() {
        let bbox = BoundingBox::new(1.5, 2.5, 3.5, 4.5);
        let json = serde_json::to_string(&bbox).unwrap();
        let deserialized: BoundingBox = serde_json::from_str(&json).unwrap();
        assert_eq!(bbox, deserialized);
    }

    #[test]
    fn test_display() {
        let bbox = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
        assert_eq!(format!("{}", bbox), "BoundingBox(1, 2, 3, 4)");
    }
}
