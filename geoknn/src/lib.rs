//! # Geoknn - K-Nearest-Neighbor Queries over R-Tree Spatial Indexes
//!
//! This crate implements a KNN query engine on top of a host spatial
//! engine's R-tree index, exposed as a virtual-table-like row source.
//! There is no pre-known search radius: the engine first descends the
//! R-tree level by level to find the tightest node region near the
//! reference geometry, then buffers the reference geometry by a growing
//! radius and re-scans the index until enough candidates accumulate.
//!
//! ## Features
//!
//! - **No search radius required**: the radius is discovered by tree
//!   descent and geometric expansion
//! - **Bounded results**: a fixed-capacity sorted candidate set, K clamped
//!   to `[1, 1024]`
//! - **Pluggable host engine**: catalog, range scans, node access and
//!   distance evaluation behind the [`SpatialEngine`] trait
//! - **Spatial views**: targets resolve through registered view metadata
//!   when the table itself carries no index
//! - **Attached databases**: `DB=<name>.<table>` targets select a named
//!   catalog namespace
//! - **Graceful degradation**: unresolvable targets and malformed
//!   arguments yield empty results, never query errors
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use geoknn::{Geometry, KnnArg, KnnTableAdapter, MemoryEngine};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = Arc::new(MemoryEngine::new());
//! engine.register_spatial_column(None, "places", "geom");
//! engine.insert(None, "places", "geom", 1, Geometry::point(0.0, 0.0))?;
//! engine.insert(None, "places", "geom", 2, Geometry::point(5.0, 5.0))?;
//! engine.insert(None, "places", "geom", 3, Geometry::point(40.0, 40.0))?;
//!
//! let adapter = KnnTableAdapter::new(engine);
//! let reference = Geometry::point(1.0, 1.0).to_blob()?;
//! let args = [
//!     KnnArg::Text("places".to_string()),
//!     KnnArg::Blob(reference),
//!     KnnArg::Integer(2),
//! ];
//! for row in adapter.query(&args) {
//!     println!("#{} row {} at distance {:.3}", row.pos, row.fid, row.distance);
//! }
//! # Ok(())
//! # }
//! ```

// Query surface
pub mod adapter;

// Core value types
pub mod bounding_box;
pub mod geometry;
pub mod result_set;

// Host engine seam and reference implementation
pub mod engine;
pub mod memory_engine;

// Query evaluation phases
pub mod context;
pub mod distance;
pub mod search;
pub mod walker;

pub mod errors;

// Re-export the query surface
pub use adapter::{
    KnnArg, KnnQuery, KnnRow, KnnRows, KnnTableAdapter, TableTarget, DEFAULT_MAX_ITEMS,
    MAX_ITEMS_CEILING,
};

// Re-export value types
pub use bounding_box::BoundingBox;
pub use geometry::{Coordinate, Geometry};
pub use result_set::{KnnResultSet, Neighbor};

// Re-export the engine seam
pub use engine::{
    NodeId, ResolvedIndex, RowId, SpatialColumn, SpatialEngine, TreeNode, COUNT_PROBE_LIMIT,
};
pub use memory_engine::MemoryEngine;

// Re-export evaluation types
pub use context::QueryContext;
pub use distance::DistanceOracle;
pub use errors::{KnnError, KnnResult};
