//! The host spatial engine seam.
//!
//! The KNN engine consumes the host database through this trait: catalog
//! lookups for spatially indexed columns and spatial views, internal-node
//! access for the level walker, flat bbox range scans over leaf entries, a
//! bounded entry-count probe, per-row geometry retrieval, and the engine's
//! own distance and buffering primitives. `MemoryEngine` is the in-crate
//! reference implementation; an embedding database supplies its own.

use crate::bounding_box::BoundingBox;
use crate::errors::KnnResult;
use crate::geometry::Geometry;

/// Row identifiers of the host engine.
pub type RowId = i64;

/// Opaque identifier for an internal R-tree node, stable for the duration
/// of one query evaluation.
pub type NodeId = u64;

/// Cap on the approximate-count probe of leaf entries.
pub const COUNT_PROBE_LIMIT: usize = 1024;

/// An internal R-tree node as surfaced to the level walker.
///
/// Levels count from the bottom of the tree: level 1 nodes are the parents
/// of leaf data entries. Data entries themselves are never surfaced as
/// nodes; they are only reachable through [`SpatialEngine::range_query`].
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub id: NodeId,
    pub level: u32,
    pub bbox: BoundingBox,
}

/// A spatially indexed geometry column registered in the host catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialColumn {
    /// Canonical table name as registered.
    pub table: String,
    /// Canonical column name as registered.
    pub column: String,
}

/// The outcome of index resolution: the R-tree to query, named by database,
/// table and geometry column.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIndex {
    /// Attached-database name; `None` selects the default database.
    pub db: Option<String>,
    pub table: String,
    pub column: String,
}

impl ResolvedIndex {
    /// The conventional name of the backing R-tree.
    pub fn rtree_name(&self) -> String {
        format!("idx_{}_{}", self.table, self.column)
    }
}

/// Host engine capabilities consumed by the KNN query engine.
///
/// All operations are read-only. Implementations must not require any
/// cross-call coordination beyond keeping [`NodeId`]s stable while a single
/// query evaluation is in flight.
pub trait SpatialEngine: Send + Sync {
    /// Index-enabled geometry columns registered for a literal table.
    /// Table matching is case-insensitive.
    fn spatial_columns(
        &self,
        db: Option<&str>,
        table: &str,
    ) -> KnnResult<Vec<SpatialColumn>>;

    /// Resolves a registered spatial view to the unique base table/column
    /// backing it, provided the base column is itself spatially indexed.
    /// Returns `None` when the view is unknown or the mapping is ambiguous.
    fn view_mapping(
        &self,
        db: Option<&str>,
        view: &str,
        view_geometry: Option<&str>,
    ) -> KnnResult<Option<SpatialColumn>>;

    /// The root internal nodes of the index's R-tree. Empty or degenerate
    /// trees may report nodes with invalid bounding boxes; callers prune
    /// those.
    fn root_nodes(&self, index: &ResolvedIndex) -> KnnResult<Vec<TreeNode>>;

    /// The internal children of a node previously returned by
    /// [`SpatialEngine::root_nodes`] or this method. Level-1 nodes have no
    /// internal children.
    fn child_nodes(&self, index: &ResolvedIndex, node: NodeId) -> KnnResult<Vec<TreeNode>>;

    /// Flat range scan: row ids of leaf entries whose bounding box
    /// intersects `window`.
    fn range_query(&self, index: &ResolvedIndex, window: &BoundingBox) -> KnnResult<Vec<RowId>>;

    /// Approximate number of leaf entries, probing at most `cap` of them.
    fn approximate_count(&self, index: &ResolvedIndex, cap: usize) -> KnnResult<usize>;

    /// The stored geometry of a row, or `None` when the row no longer
    /// exists or holds no geometry.
    fn row_geometry(&self, index: &ResolvedIndex, row_id: RowId) -> KnnResult<Option<Geometry>>;

    /// The engine's distance primitive between two geometries.
    fn distance(&self, a: &Geometry, b: &Geometry) -> KnnResult<f64>;

    /// The bounding box of `geometry` buffered outward by `radius`.
    fn buffered_envelope(&self, geometry: &Geometry, radius: f64) -> KnnResult<BoundingBox>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rtree_name_convention() {
        let index = ResolvedIndex {
            db: None,
            table: "places".to_string(),
            column: "geom".to_string(),
        };
        assert_eq!(index.rtree_name(), "idx_places_geom");
    }
}
