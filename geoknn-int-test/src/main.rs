use std::time::Instant;

use geoknn::{KnnQuery, KnnTableAdapter};
use geoknn_int_test::test_util::{point_blob, uniform_engine};

fn main() {
    println!("Starting KNN stress run...");

    let count = 100_000;
    let start = Instant::now();
    let engine = uniform_engine(count, 10_000.0, 7);
    println!("Loaded {} points in {:?}", count, start.elapsed());

    let adapter = KnnTableAdapter::new(engine);
    let queries = 1_000u32;
    let start = Instant::now();
    let mut total_rows = 0usize;
    for i in 0..queries {
        let x = (i % 100) as f64 * 100.0;
        let y = (i / 100) as f64 * 1000.0;
        let query = KnnQuery::new("points", None, point_blob(x, y), Some(16))
            .expect("query parses");
        total_rows += adapter.execute(query).count();
    }
    let elapsed = start.elapsed();
    println!(
        "Ran {} queries ({} rows) in {:?} ({:?}/query)",
        queries,
        total_rows,
        elapsed,
        elapsed / queries
    );
}
