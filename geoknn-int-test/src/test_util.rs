//! Engine builders and fixtures shared across integration tests.

use std::sync::Arc;

use geoknn::{Geometry, MemoryEngine};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Initializes env_logger once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An engine with one indexed column `points.geom` holding `count` points
/// drawn uniformly from `[0, extent)²`, seeded for reproducibility.
pub fn uniform_engine(count: i64, extent: f64, seed: u64) -> Arc<MemoryEngine> {
    let engine = Arc::new(MemoryEngine::new());
    engine.register_spatial_column(None, "points", "geom");
    let mut rng = StdRng::seed_from_u64(seed);
    for id in 0..count {
        let x: f64 = rng.gen_range(0.0..extent);
        let y: f64 = rng.gen_range(0.0..extent);
        engine
            .insert(None, "points", "geom", id, Geometry::point(x, y))
            .expect("column is registered");
    }
    engine
}

/// An engine with one indexed column `points.geom` holding a `side`x`side`
/// grid of unit-spaced points, row ids counting in row-major order.
pub fn grid_engine(side: i64) -> Arc<MemoryEngine> {
    let engine = Arc::new(MemoryEngine::new());
    engine.register_spatial_column(None, "points", "geom");
    for i in 0..side * side {
        let x = (i % side) as f64;
        let y = (i / side) as f64;
        engine
            .insert(None, "points", "geom", i, Geometry::point(x, y))
            .expect("column is registered");
    }
    engine
}

/// Encodes a reference point into its query blob form.
pub fn point_blob(x: f64, y: f64) -> Vec<u8> {
    Geometry::point(x, y).to_blob().expect("point encodes")
}
