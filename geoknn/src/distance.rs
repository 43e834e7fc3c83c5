//! Distance queries against the reference geometry.

use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::engine::{ResolvedIndex, RowId, SpatialEngine};
use crate::geometry::Geometry;

/// Answers distance queries between one query's reference geometry and
/// stored rows, node bounding boxes, or raw points.
///
/// All three queries delegate to the host engine's distance primitive; box
/// and point queries synthesize an envelope/point geometry first. Failures
/// (vanished rows, null geometries, engine errors) degrade to the infinity
/// sentinel, which downstream code treats as "never a candidate". The
/// oracle holds no mutable state and performs no caching.
pub struct DistanceOracle {
    engine: Arc<dyn SpatialEngine>,
    index: ResolvedIndex,
    reference: Geometry,
}

impl DistanceOracle {
    /// Creates an oracle for one query's reference geometry.
    pub fn new(
        engine: Arc<dyn SpatialEngine>,
        index: ResolvedIndex,
        reference: Geometry,
    ) -> DistanceOracle {
        DistanceOracle {
            engine,
            index,
            reference,
        }
    }

    /// The reference geometry this oracle measures against.
    pub fn reference(&self) -> &Geometry {
        &self.reference
    }

    /// Distance from the reference geometry to a stored row's geometry.
    /// Infinite when the row no longer exists or holds no geometry.
    pub fn distance_to_row(&self, row_id: RowId) -> f64 {
        match self.engine.row_geometry(&self.index, row_id) {
            Ok(Some(stored)) => match self.engine.distance(&self.reference, &stored) {
                Ok(dist) => dist,
                Err(e) => {
                    log::trace!("distance evaluation failed for row {}: {}", row_id, e);
                    f64::INFINITY
                }
            },
            Ok(None) => {
                log::trace!("row {} has no geometry; dropping candidate", row_id);
                f64::INFINITY
            }
            Err(e) => {
                log::trace!("geometry lookup failed for row {}: {}", row_id, e);
                f64::INFINITY
            }
        }
    }

    /// Distance from the reference geometry to an axis-aligned box.
    pub fn distance_to_box(&self, bbox: &BoundingBox) -> f64 {
        let envelope = Geometry::Envelope(bbox.clone());
        self.engine
            .distance(&self.reference, &envelope)
            .unwrap_or(f64::INFINITY)
    }

    /// Distance from the reference geometry to a raw point.
    pub fn distance_to_point(&self, x: f64, y: f64) -> f64 {
        let point = Geometry::point(x, y);
        self.engine
            .distance(&self.reference, &point)
            .unwrap_or(f64::INFINITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{KnnError, KnnResult};
    use crate::engine::{NodeId, SpatialColumn, TreeNode};

    /// Engine stub: one known row, everything else missing or failing.
    struct StubEngine;

    impl SpatialEngine for StubEngine {
        fn spatial_columns(&self, _: Option<&str>, _: &str) -> KnnResult<Vec<SpatialColumn>> {
            Ok(vec![])
        }

        fn view_mapping(
            &self,
            _: Option<&str>,
            _: &str,
            _: Option<&str>,
        ) -> KnnResult<Option<SpatialColumn>> {
            Ok(None)
        }

        fn root_nodes(&self, _: &ResolvedIndex) -> KnnResult<Vec<TreeNode>> {
            Ok(vec![])
        }

        fn child_nodes(&self, _: &ResolvedIndex, _: NodeId) -> KnnResult<Vec<TreeNode>> {
            Ok(vec![])
        }

        fn range_query(&self, _: &ResolvedIndex, _: &BoundingBox) -> KnnResult<Vec<RowId>> {
            Ok(vec![])
        }

        fn approximate_count(&self, _: &ResolvedIndex, _: usize) -> KnnResult<usize> {
            Ok(0)
        }

        fn row_geometry(
            &self,
            _: &ResolvedIndex,
            row_id: RowId,
        ) -> KnnResult<Option<Geometry>> {
            match row_id {
                1 => Ok(Some(Geometry::point(3.0, 4.0))),
                2 => Ok(None),
                _ => Err(KnnError::Engine("row store offline".to_string())),
            }
        }

        fn distance(&self, a: &Geometry, b: &Geometry) -> KnnResult<f64> {
            Ok(a.distance(b))
        }

        fn buffered_envelope(&self, geometry: &Geometry, radius: f64) -> KnnResult<BoundingBox> {
            Ok(geometry.bounding_box().expanded(radius))
        }
    }

    fn oracle() -> DistanceOracle {
        let index = ResolvedIndex {
            db: None,
            table: "t".to_string(),
            column: "g".to_string(),
        };
        DistanceOracle::new(Arc::new(StubEngine), index, Geometry::point(0.0, 0.0))
    }

    #[test]
    fn test_distance_to_existing_row() {
        assert_eq!(oracle().distance_to_row(1), 5.0);
    }

    #[test]
    fn test_missing_geometry_yields_sentinel() {
        assert_eq!(oracle().distance_to_row(2), f64::INFINITY);
    }

    #[test]
    fn test_engine_error_yields_sentinel() {
        assert_eq!(oracle().distance_to_row(99), f64::INFINITY);
    }

    #[test]
    fn test_distance_to_box() {
        let o = oracle();
        assert_eq!(o.distance_to_box(&BoundingBox::new(3.0, 4.0, 9.0, 9.0)), 5.0);
        assert_eq!(o.distance_to_box(&BoundingBox::new(-1.0, -1.0, 1.0, 1.0)), 0.0);
    }

    #[test]
    fn test_distance_to_point() {
        assert_eq!(oracle().distance_to_point(0.0, 7.0), 7.0);
    }
}
