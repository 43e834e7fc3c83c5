//! Per-query evaluation context.

use std::sync::Arc;

use crate::distance::DistanceOracle;
use crate::engine::{ResolvedIndex, SpatialEngine, COUNT_PROBE_LIMIT};
use crate::errors::KnnResult;
use crate::geometry::Geometry;

/// Everything one KNN evaluation needs, fixed at construction.
///
/// A fresh context is built per query and passed explicitly to the descent
/// and expansion phases; nothing in it mutates after construction and
/// nothing is shared across queries.
pub struct QueryContext {
    engine: Arc<dyn SpatialEngine>,
    index: ResolvedIndex,
    reference: Geometry,
    reference_blob: Vec<u8>,
    max_items: usize,
    rtree_count: usize,
    oracle: DistanceOracle,
}

impl QueryContext {
    /// Builds a context, probing the approximate index size once.
    pub fn new(
        engine: Arc<dyn SpatialEngine>,
        index: ResolvedIndex,
        reference: Geometry,
        reference_blob: Vec<u8>,
        max_items: usize,
    ) -> KnnResult<QueryContext> {
        let rtree_count = engine.approximate_count(&index, COUNT_PROBE_LIMIT)?;
        let oracle = DistanceOracle::new(engine.clone(), index.clone(), reference.clone());
        Ok(QueryContext {
            engine,
            index,
            reference,
            reference_blob,
            max_items,
            rtree_count,
            oracle,
        })
    }

    pub fn engine(&self) -> &dyn SpatialEngine {
        self.engine.as_ref()
    }

    pub fn index(&self) -> &ResolvedIndex {
        &self.index
    }

    pub fn reference(&self) -> &Geometry {
        &self.reference
    }

    pub fn reference_blob(&self) -> &[u8] {
        &self.reference_blob
    }

    /// The effective K, already clamped by the adapter.
    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Approximate leaf-entry count of the index, capped at the probe limit.
    pub fn rtree_count(&self) -> usize {
        self.rtree_count
    }

    pub fn oracle(&self) -> &DistanceOracle {
        &self.oracle
    }
}
