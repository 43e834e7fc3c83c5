//! The virtual-table-shaped query surface.
//!
//! `KnnTableAdapter` accepts the 2/3/4-argument predicate shapes of a KNN
//! query, resolves the target to a spatially indexed column (directly or
//! through a registered spatial view), runs the descent and the buffer
//! expansion, and streams the result set as rows. Anything that cannot be
//! resolved or parsed yields an empty row sequence rather than an error,
//! matching the convention of a query planner that found no usable plan.

use std::sync::Arc;

use crate::context::QueryContext;
use crate::engine::{ResolvedIndex, RowId, SpatialColumn, SpatialEngine};
use crate::errors::KnnResult;
use crate::geometry::Geometry;
use crate::result_set::{KnnResultSet, Neighbor};
use crate::{search, walker};

/// Number of neighbors returned when the query does not ask for a count.
pub const DEFAULT_MAX_ITEMS: i64 = 3;

/// Upper bound on the number of neighbors a query may ask for.
pub const MAX_ITEMS_CEILING: i64 = 1024;

/// One positional argument of a KNN query.
#[derive(Debug, Clone, PartialEq)]
pub enum KnnArg {
    Text(String),
    Blob(Vec<u8>),
    Integer(i64),
}

/// A query target, optionally qualified with an attached-database prefix
/// using the `DB=<name>.<table>` convention.
#[derive(Debug, Clone, PartialEq)]
pub struct TableTarget {
    /// Attached-database name; `None` selects the default database.
    pub db: Option<String>,
    pub table: String,
}

impl TableTarget {
    /// Splits an optional `DB=<name>.` prefix off a table reference.
    /// Anything that does not match the convention is a literal table name.
    pub fn parse(name: &str) -> TableTarget {
        let prefixed = name
            .get(..3)
            .map(|p| p.eq_ignore_ascii_case("DB="))
            .unwrap_or(false);
        if prefixed {
            let rest = &name[3..];
            if let Some(dot) = rest.find('.') {
                if dot > 0 {
                    return TableTarget {
                        db: Some(rest[..dot].to_string()),
                        table: rest[dot + 1..].to_string(),
                    };
                }
            }
        }
        TableTarget {
            db: None,
            table: name.to_string(),
        }
    }
}

/// A parsed and validated KNN query, ready for resolution.
#[derive(Debug, Clone)]
pub struct KnnQuery {
    target: TableTarget,
    geometry_column: Option<String>,
    reference: Geometry,
    reference_blob: Vec<u8>,
    max_items: i64,
}

impl KnnQuery {
    /// Builds a query from explicit parts. `max_items` is clamped to
    /// `[1, 1024]` and defaults to 3.
    ///
    /// # Errors
    /// Fails when the reference blob does not decode to a usable geometry.
    pub fn new(
        table: &str,
        geometry_column: Option<&str>,
        reference_blob: Vec<u8>,
        max_items: Option<i64>,
    ) -> KnnResult<KnnQuery> {
        let reference = Geometry::from_blob(&reference_blob)?;
        Ok(KnnQuery {
            target: TableTarget::parse(table),
            geometry_column: geometry_column.map(str::to_string),
            reference,
            reference_blob,
            max_items: max_items.unwrap_or(DEFAULT_MAX_ITEMS).clamp(1, MAX_ITEMS_CEILING),
        })
    }

    /// Matches the positional argument shapes of the query surface:
    ///
    /// - `(table, reference)`
    /// - `(table, geometry_column, reference)`
    /// - `(table, reference, max_items)`
    /// - `(table, geometry_column, reference, max_items)`
    ///
    /// Returns `None` for any other combination, including a reference blob
    /// that does not decode.
    pub fn from_args(args: &[KnnArg]) -> Option<KnnQuery> {
        let (table, column, blob, max_items) = match args {
            [KnnArg::Text(t), KnnArg::Blob(b)] => (t, None, b, None),
            [KnnArg::Text(t), KnnArg::Text(c), KnnArg::Blob(b)] => (t, Some(c.as_str()), b, None),
            [KnnArg::Text(t), KnnArg::Blob(b), KnnArg::Integer(k)] => (t, None, b, Some(*k)),
            [KnnArg::Text(t), KnnArg::Text(c), KnnArg::Blob(b), KnnArg::Integer(k)] => {
                (t, Some(c.as_str()), b, Some(*k))
            }
            _ => {
                log::debug!("rejecting KNN query: unsupported argument shape");
                return None;
            }
        };
        match KnnQuery::new(table, column, blob.clone(), max_items) {
            Ok(query) => Some(query),
            Err(e) => {
                log::debug!("rejecting KNN query: {}", e);
                None
            }
        }
    }

    pub fn target(&self) -> &TableTarget {
        &self.target
    }

    pub fn geometry_column(&self) -> Option<&str> {
        self.geometry_column.as_deref()
    }

    pub fn reference(&self) -> &Geometry {
        &self.reference
    }

    pub fn reference_blob(&self) -> &[u8] {
        &self.reference_blob
    }

    /// The effective K, already clamped.
    pub fn max_items(&self) -> i64 {
        self.max_items
    }
}

/// One output row of a KNN query. Query parameters are echoed into every
/// row alongside the candidate's position, row id and distance.
#[derive(Debug, Clone, PartialEq)]
pub struct KnnRow {
    pub table: String,
    pub geometry_column: String,
    pub ref_geometry: Vec<u8>,
    pub max_items: i64,
    /// 1-based rank in ascending-distance order.
    pub pos: i64,
    pub fid: RowId,
    pub distance: f64,
}

/// A lazy, finite, non-restartable sequence of KNN result rows in
/// ascending-distance order.
pub struct KnnRows {
    table: String,
    geometry_column: String,
    ref_geometry: Vec<u8>,
    max_items: i64,
    neighbors: std::vec::IntoIter<Neighbor>,
    pos: i64,
}

impl KnnRows {
    fn empty() -> KnnRows {
        KnnRows {
            table: String::new(),
            geometry_column: String::new(),
            ref_geometry: Vec::new(),
            max_items: 0,
            neighbors: Vec::new().into_iter(),
            pos: 0,
        }
    }

    fn new(ctx: &QueryContext, results: KnnResultSet) -> KnnRows {
        KnnRows {
            table: ctx.index().table.clone(),
            geometry_column: ctx.index().column.clone(),
            ref_geometry: ctx.reference_blob().to_vec(),
            max_items: ctx.max_items() as i64,
            neighbors: results.into_sorted_vec().into_iter(),
            pos: 0,
        }
    }
}

impl Iterator for KnnRows {
    type Item = KnnRow;

    fn next(&mut self) -> Option<KnnRow> {
        let neighbor = self.neighbors.next()?;
        self.pos += 1;
        Some(KnnRow {
            table: self.table.clone(),
            geometry_column: self.geometry_column.clone(),
            ref_geometry: self.ref_geometry.clone(),
            max_items: self.max_items,
            pos: self.pos,
            fid: neighbor.row_id,
            distance: neighbor.distance,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.neighbors.size_hint()
    }
}

impl ExactSizeIterator for KnnRows {}

/// The KNN query entry point over a host engine.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use geoknn::{Geometry, KnnArg, KnnTableAdapter, MemoryEngine};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = Arc::new(MemoryEngine::new());
/// engine.register_spatial_column(None, "places", "geom");
/// engine.insert(None, "places", "geom", 1, Geometry::point(0.0, 0.0))?;
/// engine.insert(None, "places", "geom", 2, Geometry::point(9.0, 9.0))?;
///
/// let adapter = KnnTableAdapter::new(engine);
/// let reference = Geometry::point(1.0, 1.0).to_blob()?;
/// let args = [
///     KnnArg::Text("places".to_string()),
///     KnnArg::Blob(reference),
///     KnnArg::Integer(1),
/// ];
/// let nearest: Vec<_> = adapter.query(&args).collect();
/// assert_eq!(nearest.len(), 1);
/// assert_eq!(nearest[0].fid, 1);
/// # Ok(())
/// # }
/// ```
pub struct KnnTableAdapter {
    engine: Arc<dyn SpatialEngine>,
}

impl KnnTableAdapter {
    /// Creates an adapter over a host engine.
    pub fn new(engine: Arc<dyn SpatialEngine>) -> KnnTableAdapter {
        KnnTableAdapter { engine }
    }

    /// Parses positional arguments and evaluates the query. Unsupported
    /// argument shapes yield no rows.
    pub fn query(&self, args: &[KnnArg]) -> KnnRows {
        match KnnQuery::from_args(args) {
            Some(query) => self.execute(query),
            None => KnnRows::empty(),
        }
    }

    /// Evaluates a parsed query to completion and returns its rows.
    /// Resolution failures and engine errors yield no rows.
    pub fn execute(&self, query: KnnQuery) -> KnnRows {
        match self.try_execute(&query) {
            Ok(rows) => rows,
            Err(e) => {
                log::warn!(
                    "KNN query against {} failed: {}",
                    query.target().table,
                    e
                );
                KnnRows::empty()
            }
        }
    }

    fn try_execute(&self, query: &KnnQuery) -> KnnResult<KnnRows> {
        let Some(index) = self.resolve(query.target(), query.geometry_column())? else {
            log::debug!(
                "no spatially indexed column resolved for {}; returning no rows",
                query.target().table
            );
            return Ok(KnnRows::empty());
        };
        log::debug!("resolved KNN target to {}", index.rtree_name());

        let ctx = QueryContext::new(
            self.engine.clone(),
            index,
            query.reference().clone(),
            query.reference_blob().to_vec(),
            query.max_items() as usize,
        )?;
        let seed = walker::locate(&ctx)?;
        let results = search::run(&ctx, seed)?;
        Ok(KnnRows::new(&ctx, results))
    }

    /// Resolves the target to the R-tree to query: a unique direct catalog
    /// match first, then the spatial-view indirection.
    fn resolve(
        &self,
        target: &TableTarget,
        column: Option<&str>,
    ) -> KnnResult<Option<ResolvedIndex>> {
        let db = target.db.as_deref();
        let columns = self.engine.spatial_columns(db, &target.table)?;
        let matches: Vec<&SpatialColumn> = columns
            .iter()
            .filter(|c| {
                column
                    .map(|name| c.column.eq_ignore_ascii_case(name))
                    .unwrap_or(true)
            })
            .collect();
        if let [matched] = matches.as_slice() {
            return Ok(Some(ResolvedIndex {
                db: target.db.clone(),
                table: matched.table.clone(),
                column: matched.column.clone(),
            }));
        }

        let view = self.engine.view_mapping(db, &target.table, column)?;
        Ok(view.map(|base| ResolvedIndex {
            db: target.db.clone(),
            table: base.table,
            column: base.column,
        }))
    }
}
