//! Opaque geometry values carried through KNN queries.
//!
//! The query engine never inspects geometry structure beyond its bounding
//! box; distances are the host engine's business. These lightweight variants
//! cover the shapes the reference engine needs (points, point clusters,
//! envelopes) plus the blob codec used to carry a reference geometry through
//! the query argument surface.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::bounding_box::BoundingBox;
use crate::errors::{KnnError, KnnResult};

/// A 2D coordinate (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Creates a new coordinate.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculates the Euclidean distance to another coordinate.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A geometry value stored in a spatial column or passed as the reference
/// of a KNN query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    /// A single 2D point.
    Point(Coordinate),
    /// A non-empty cluster of 2D points.
    MultiPoint(Vec<Coordinate>),
    /// An axis-aligned rectangle.
    Envelope(BoundingBox),
}

impl Geometry {
    /// Creates a point geometry.
    pub fn point(x: f64, y: f64) -> Geometry {
        Geometry::Point(Coordinate::new(x, y))
    }

    /// Creates a multi-point geometry.
    ///
    /// # Errors
    /// Returns an error if `coordinates` is empty.
    pub fn multi_point(coordinates: Vec<Coordinate>) -> KnnResult<Geometry> {
        if coordinates.is_empty() {
            return Err(KnnError::InvalidGeometry(
                "multi-point geometry requires at least one coordinate".to_string(),
            ));
        }
        Ok(Geometry::MultiPoint(coordinates))
    }

    /// Creates an envelope geometry from a bounding box.
    ///
    /// # Errors
    /// Returns an error if the box is inverted or carries NaN coordinates.
    pub fn envelope(bbox: BoundingBox) -> KnnResult<Geometry> {
        if !bbox.is_valid() {
            return Err(KnnError::InvalidGeometry(format!(
                "invalid envelope: {}",
                bbox
            )));
        }
        Ok(Geometry::Envelope(bbox))
    }

    /// Returns the bounding box enclosing this geometry.
    pub fn bounding_box(&self) -> BoundingBox {
        match self {
            Geometry::Point(c) => BoundingBox::new(c.x, c.y, c.x, c.y),
            Geometry::MultiPoint(coords) => {
                let mut iter = coords.iter();
                let first = match iter.next() {
                    Some(c) => BoundingBox::new(c.x, c.y, c.x, c.y),
                    None => return BoundingBox::default(),
                };
                iter.fold(first, |bbox, c| {
                    bbox.union(&BoundingBox::new(c.x, c.y, c.x, c.y))
                })
            }
            Geometry::Envelope(bbox) => bbox.clone(),
        }
    }

    /// Computes the minimum planar distance between two geometries.
    ///
    /// Distances are exact for the supported variants; intersecting or
    /// contained shapes yield zero.
    pub fn distance(&self, other: &Geometry) -> f64 {
        match (self, other) {
            (Geometry::Point(a), Geometry::Point(b)) => a.distance(b),
            (Geometry::Point(p), Geometry::Envelope(b))
            | (Geometry::Envelope(b), Geometry::Point(p)) => b.distance_to_point(p.x, p.y),
            (Geometry::Envelope(a), Geometry::Envelope(b)) => a.distance_to(b),
            (Geometry::MultiPoint(coords), g) | (g, Geometry::MultiPoint(coords)) => coords
                .iter()
                .map(|c| g.distance(&Geometry::Point(*c)))
                .fold(f64::INFINITY, f64::min),
        }
    }

    /// Encodes this geometry into its opaque blob form.
    pub fn to_blob(&self) -> KnnResult<Vec<u8>> {
        bincode::serde::encode_to_vec(self, bincode::config::legacy())
            .map_err(|e| KnnError::Serialization(e.to_string()))
    }

    /// Decodes a geometry from its opaque blob form.
    ///
    /// # Errors
    /// Returns an error if the blob does not decode, or decodes to a
    /// degenerate geometry (empty multi-point, non-finite coordinates,
    /// inverted envelope).
    pub fn from_blob(blob: &[u8]) -> KnnResult<Geometry> {
        let (geometry, _): (Geometry, usize) =
            bincode::serde::decode_from_slice(blob, bincode::config::legacy())
                .map_err(|e| KnnError::Serialization(e.to_string()))?;
        geometry.validate()?;
        Ok(geometry)
    }

    fn validate(&self) -> KnnResult<()> {
        match self {
            Geometry::Point(c) => {
                if !c.x.is_finite() || !c.y.is_finite() {
                    return Err(KnnError::InvalidGeometry(format!(
                        "non-finite coordinate: {}",
                        c
                    )));
                }
            }
            Geometry::MultiPoint(coords) => {
                if coords.is_empty() {
                    return Err(KnnError::InvalidGeometry(
                        "multi-point geometry requires at least one coordinate".to_string(),
                    ));
                }
                for c in coords {
                    if !c.x.is_finite() || !c.y.is_finite() {
                        return Err(KnnError::InvalidGeometry(format!(
                            "non-finite coordinate: {}",
                            c
                        )));
                    }
                }
            }
            Geometry::Envelope(bbox) => {
                if !bbox.is_valid() {
                    return Err(KnnError::InvalidGeometry(format!(
                        "invalid envelope: {}",
                        bbox
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Point(c) => write!(f, "POINT({} {})", c.x, c.y),
            Geometry::MultiPoint(coords) => {
                write!(f, "MULTIPOINT(")?;
                for (i, c) in coords.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", c.x, c.y)?;
                }
                write!(f, ")")
            }
            Geometry::Envelope(b) => {
                write!(
                    f,
                    "ENVELOPE({} {}, {} {})",
                    b.min_x, b.min_y, b.max_x, b.max_y
                )
            }
        }
    }
}
