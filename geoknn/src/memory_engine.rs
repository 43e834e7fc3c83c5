//! In-memory reference implementation of the host engine seam.
//!
//! Backed by one `rstar` R-tree per registered spatial column, rebuilt
//! lazily (bulk load) whenever the column's rows changed. Internal tree
//! nodes are snapshotted into an arena per tree version so the walker's
//! [`NodeId`]s stay stable for the duration of a query; snapshot order is
//! the order rstar stores children, which makes repeated queries over an
//! unchanged index deterministic.
//!
//! Catalog matching (tables, columns, views) is case-insensitive, and the
//! optional `db` qualifier namespaces registrations the way an attached
//! database would.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::RwLock;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{ParentNode, RTree, RTreeNode, AABB};

use crate::bounding_box::BoundingBox;
use crate::engine::{NodeId, ResolvedIndex, RowId, SpatialColumn, SpatialEngine, TreeNode};
use crate::errors::{KnnError, KnnResult};
use crate::geometry::Geometry;

type IndexEntry = GeomWithData<Rectangle<[f64; 2]>, RowId>;

/// Case-insensitive lookup key for a registered spatial column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ColumnKey {
    /// Lowercased database name; empty selects the default database.
    db: String,
    table: String,
    column: String,
}

impl ColumnKey {
    fn new(db: Option<&str>, table: &str, column: &str) -> ColumnKey {
        ColumnKey {
            db: db.unwrap_or("").to_ascii_lowercase(),
            table: table.to_ascii_lowercase(),
            column: column.to_ascii_lowercase(),
        }
    }

    fn for_index(index: &ResolvedIndex) -> ColumnKey {
        ColumnKey::new(index.db.as_deref(), &index.table, &index.column)
    }
}

struct ColumnStore {
    /// Canonical names as registered.
    table: String,
    column: String,
    rows: BTreeMap<RowId, Geometry>,
    version: u64,
}

struct ViewEntry {
    db: String,
    view: String,
    view_geometry: String,
    base: SpatialColumn,
}

/// One internal node of the snapshotted tree.
struct ArenaNode {
    level: u32,
    bbox: BoundingBox,
    children: Vec<NodeId>,
}

/// Immutable snapshot of one column's R-tree at a given version.
struct IndexState {
    version: u64,
    tree: RTree<IndexEntry>,
    arena: Vec<ArenaNode>,
    roots: Vec<NodeId>,
}

/// An in-memory spatial engine for tests, benchmarks and embedding without
/// a host database.
///
/// # Examples
///
/// ```rust
/// use geoknn::{Geometry, MemoryEngine, SpatialEngine};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = MemoryEngine::new();
/// engine.register_spatial_column(None, "places", "geom");
/// engine.insert(None, "places", "geom", 1, Geometry::point(2.0, 3.0))?;
///
/// let columns = engine.spatial_columns(None, "PLACES")?;
/// assert_eq!(columns.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemoryEngine {
    columns: RwLock<HashMap<ColumnKey, ColumnStore>>,
    views: RwLock<Vec<ViewEntry>>,
    states: RwLock<HashMap<ColumnKey, Arc<IndexState>>>,
}

impl MemoryEngine {
    /// Creates an engine with an empty catalog.
    pub fn new() -> MemoryEngine {
        MemoryEngine::default()
    }

    /// Registers a spatially indexed geometry column. Registering the same
    /// column twice keeps the existing rows.
    pub fn register_spatial_column(&self, db: Option<&str>, table: &str, column: &str) {
        let key = ColumnKey::new(db, table, column);
        self.columns.write().entry(key).or_insert_with(|| ColumnStore {
            table: table.to_string(),
            column: column.to_string(),
            rows: BTreeMap::new(),
            version: 0,
        });
    }

    /// Registers a spatial view backed by `base_table`.`base_column`.
    pub fn register_view(
        &self,
        db: Option<&str>,
        view: &str,
        view_geometry: &str,
        base_table: &str,
        base_column: &str,
    ) {
        self.views.write().push(ViewEntry {
            db: db.unwrap_or("").to_ascii_lowercase(),
            view: view.to_string(),
            view_geometry: view_geometry.to_string(),
            base: SpatialColumn {
                table: base_table.to_string(),
                column: base_column.to_string(),
            },
        });
    }

    /// Stores a row's geometry under a registered column.
    pub fn insert(
        &self,
        db: Option<&str>,
        table: &str,
        column: &str,
        row_id: RowId,
        geometry: Geometry,
    ) -> KnnResult<()> {
        let key = ColumnKey::new(db, table, column);
        let mut columns = self.columns.write();
        let store = columns
            .get_mut(&key)
            .ok_or_else(|| KnnError::Engine(unknown_column(table, column)))?;
        store.rows.insert(row_id, geometry);
        store.version += 1;
        Ok(())
    }

    /// Removes a row, returning whether it existed.
    pub fn remove(
        &self,
        db: Option<&str>,
        table: &str,
        column: &str,
        row_id: RowId,
    ) -> KnnResult<bool> {
        let key = ColumnKey::new(db, table, column);
        let mut columns = self.columns.write();
        let store = columns
            .get_mut(&key)
            .ok_or_else(|| KnnError::Engine(unknown_column(table, column)))?;
        let existed = store.rows.remove(&row_id).is_some();
        if existed {
            store.version += 1;
        }
        Ok(existed)
    }

    /// Number of rows stored under a registered column.
    pub fn row_count(&self, db: Option<&str>, table: &str, column: &str) -> usize {
        let key = ColumnKey::new(db, table, column);
        self.columns
            .read()
            .get(&key)
            .map(|store| store.rows.len())
            .unwrap_or(0)
    }

    fn state(&self, index: &ResolvedIndex) -> KnnResult<Arc<IndexState>> {
        let key = ColumnKey::for_index(index);
        let version = {
            let columns = self.columns.read();
            let store = columns
                .get(&key)
                .ok_or_else(|| KnnError::Engine(unknown_column(&index.table, &index.column)))?;
            store.version
        };
        {
            let states = self.states.read();
            if let Some(state) = states.get(&key) {
                if state.version == version {
                    return Ok(state.clone());
                }
            }
        }
        let state = Arc::new(self.build_state(&key, version)?);
        self.states.write().insert(key, state.clone());
        Ok(state)
    }

    fn build_state(&self, key: &ColumnKey, version: u64) -> KnnResult<IndexState> {
        let entries: Vec<IndexEntry> = {
            let columns = self.columns.read();
            let store = columns
                .get(key)
                .ok_or_else(|| KnnError::Engine(unknown_column(&key.table, &key.column)))?;
            store
                .rows
                .iter()
                .map(|(row_id, geometry)| {
                    let b = geometry.bounding_box();
                    GeomWithData::new(
                        Rectangle::from_corners([b.min_x, b.min_y], [b.max_x, b.max_y]),
                        *row_id,
                    )
                })
                .collect()
        };
        log::debug!(
            "rebuilding in-memory R-tree for idx_{}_{} ({} entries)",
            key.table,
            key.column,
            entries.len()
        );
        let tree = RTree::bulk_load(entries);
        let mut arena = Vec::new();
        let root = snapshot_node(tree.root(), &mut arena);
        Ok(IndexState {
            version,
            tree,
            arena,
            roots: vec![root],
        })
    }
}

fn unknown_column(table: &str, column: &str) -> String {
    format!("no spatial index registered for {}.{}", table, column)
}

/// Records `parent` and its internal descendants into the arena, returning
/// the parent's id. Levels count up from the entry parents (level 1).
fn snapshot_node(parent: &ParentNode<IndexEntry>, arena: &mut Vec<ArenaNode>) -> NodeId {
    let id = arena.len() as NodeId;
    arena.push(ArenaNode {
        level: 1,
        bbox: BoundingBox::default(),
        children: Vec::new(),
    });

    let mut level = 1;
    let mut children = Vec::new();
    for child in parent.children() {
        if let RTreeNode::Parent(p) = child {
            let child_id = snapshot_node(p, arena);
            level = level.max(arena[child_id as usize].level + 1);
            children.push(child_id);
        }
    }

    let envelope = parent.envelope();
    let lower = envelope.lower();
    let upper = envelope.upper();
    arena[id as usize] = ArenaNode {
        level,
        bbox: BoundingBox::new(lower[0], lower[1], upper[0], upper[1]),
        children,
    };
    id
}

fn arena_tree_node(arena: &[ArenaNode], id: NodeId) -> TreeNode {
    let node = &arena[id as usize];
    TreeNode {
        id,
        level: node.level,
        bbox: node.bbox.clone(),
    }
}

impl SpatialEngine for MemoryEngine {
    fn spatial_columns(&self, db: Option<&str>, table: &str) -> KnnResult<Vec<SpatialColumn>> {
        let db_key = db.unwrap_or("").to_ascii_lowercase();
        let table_key = table.to_ascii_lowercase();
        let columns = self.columns.read();
        let mut matches: Vec<SpatialColumn> = columns
            .iter()
            .filter(|(key, _)| key.db == db_key && key.table == table_key)
            .map(|(_, store)| SpatialColumn {
                table: store.table.clone(),
                column: store.column.clone(),
            })
            .collect();
        matches.sort_by(|a, b| a.column.cmp(&b.column));
        Ok(matches)
    }

    fn view_mapping(
        &self,
        db: Option<&str>,
        view: &str,
        view_geometry: Option<&str>,
    ) -> KnnResult<Option<SpatialColumn>> {
        let db_key = db.unwrap_or("").to_ascii_lowercase();
        let views = self.views.read();
        let matches: Vec<&ViewEntry> = views
            .iter()
            .filter(|entry| {
                entry.db == db_key
                    && entry.view.eq_ignore_ascii_case(view)
                    && view_geometry
                        .map(|g| entry.view_geometry.eq_ignore_ascii_case(g))
                        .unwrap_or(true)
            })
            .collect();
        let [entry] = matches.as_slice() else {
            return Ok(None);
        };
        // The base column must itself be spatially indexed.
        let base_key = ColumnKey::new(db, &entry.base.table, &entry.base.column);
        if self.columns.read().contains_key(&base_key) {
            Ok(Some(entry.base.clone()))
        } else {
            Ok(None)
        }
    }

    fn root_nodes(&self, index: &ResolvedIndex) -> KnnResult<Vec<TreeNode>> {
        let state = self.state(index)?;
        Ok(state
            .roots
            .iter()
            .map(|&id| arena_tree_node(&state.arena, id))
            .collect())
    }

    fn child_nodes(&self, index: &ResolvedIndex, node: NodeId) -> KnnResult<Vec<TreeNode>> {
        let state = self.state(index)?;
        let arena_node = state
            .arena
            .get(node as usize)
            .ok_or_else(|| KnnError::Engine(format!("unknown tree node {}", node)))?;
        Ok(arena_node
            .children
            .iter()
            .map(|&id| arena_tree_node(&state.arena, id))
            .collect())
    }

    fn range_query(&self, index: &ResolvedIndex, window: &BoundingBox) -> KnnResult<Vec<RowId>> {
        let state = self.state(index)?;
        let envelope = AABB::from_corners(
            [window.min_x, window.min_y],
            [window.max_x, window.max_y],
        );
        Ok(state
            .tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|entry| entry.data)
            .collect())
    }

    fn approximate_count(&self, index: &ResolvedIndex, cap: usize) -> KnnResult<usize> {
        let key = ColumnKey::for_index(index);
        let columns = self.columns.read();
        let store = columns
            .get(&key)
            .ok_or_else(|| KnnError::Engine(unknown_column(&index.table, &index.column)))?;
        Ok(store.rows.len().min(cap))
    }

    fn row_geometry(&self, index: &ResolvedIndex, row_id: RowId) -> KnnResult<Option<Geometry>> {
        let key = ColumnKey::for_index(index);
        let columns = self.columns.read();
        let store = columns
            .get(&key)
            .ok_or_else(|| KnnError::Engine(unknown_column(&index.table, &index.column)))?;
        Ok(store.rows.get(&row_id).cloned())
    }

    fn distance(&self, a: &Geometry, b: &Geometry) -> KnnResult<f64> {
        Ok(a.distance(b))
    }

    fn buffered_envelope(&self, geometry: &Geometry, radius: f64) -> KnnResult<BoundingBox> {
        Ok(geometry.bounding_box().expanded(radius))
    }
}
