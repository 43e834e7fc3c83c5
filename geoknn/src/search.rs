//! Iterative buffer-expansion search.
//!
//! Once the descent has produced a seed region, the search buffers the
//! reference geometry by a radius large enough to cover that region, range
//! scans the index for candidates inside the buffered window, and scores
//! each candidate into the bounded result set. The radius grows
//! geometrically until an iteration comes back empty, rich enough (at
//! least K candidates), or covering effectively the whole index.
//!
//! The stopping rule is a heuristic: an iteration returning K candidates
//! does not prove they are the exact K nearest, since a row just outside
//! the window can be closer than one just inside it.

use crate::bounding_box::BoundingBox;
use crate::context::QueryContext;
use crate::engine::RowId;
use crate::errors::KnnResult;
use crate::result_set::KnnResultSet;

/// Per-iteration growth applied to the buffer radius.
pub const GROWTH_FACTOR: f64 = 1.05;

/// Runs the expansion search and returns the populated result set.
///
/// `seed` is the region produced by the descent; `None` (empty or
/// degenerate tree) degrades to a single scan of the whole plane, which
/// terminates by construction: it returns either nothing or at least the
/// probed index count.
pub fn run(ctx: &QueryContext, seed: Option<BoundingBox>) -> KnnResult<KnnResultSet> {
    let mut results = KnnResultSet::new(ctx.max_items());

    let Some(region) = seed else {
        log::debug!("no seed region found; falling back to a whole-plane scan");
        let ids = ctx
            .engine()
            .range_query(ctx.index(), &BoundingBox::whole_plane())?;
        score_candidates(ctx, &ids, &mut results);
        return Ok(results);
    };

    let mut radius = initial_radius(ctx, &region);
    if !(radius > 0.0) {
        // A zero or NaN seed radius cannot grow geometrically.
        radius = 1.0;
    }

    loop {
        let window = ctx.engine().buffered_envelope(ctx.reference(), radius)?;
        let ids = ctx.engine().range_query(ctx.index(), &window)?;
        score_candidates(ctx, &ids, &mut results);
        log::debug!(
            "expansion at radius {}: {} candidates, {} kept",
            radius,
            ids.len(),
            results.len()
        );

        if ids.is_empty() {
            log::debug!("search stopped: window returned no candidates");
            break;
        }
        if ids.len() >= ctx.max_items() {
            log::debug!("search stopped: window rich enough ({} candidates)", ids.len());
            break;
        }
        if ids.len() >= ctx.rtree_count() {
            log::debug!(
                "search stopped: window covers the index ({} of ~{})",
                ids.len(),
                ctx.rtree_count()
            );
            break;
        }
        radius *= GROWTH_FACTOR;
    }

    Ok(results)
}

/// The smallest radius whose buffer fully covers the seed region: the
/// farthest of the region's four corners from the reference geometry.
fn initial_radius(ctx: &QueryContext, region: &BoundingBox) -> f64 {
    region
        .corners()
        .iter()
        .map(|&(x, y)| ctx.oracle().distance_to_point(x, y))
        .fold(0.0, f64::max)
}

fn score_candidates(ctx: &QueryContext, ids: &[RowId], results: &mut KnnResultSet) {
    for &row_id in ids {
        let distance = ctx.oracle().distance_to_row(row_id);
        results.offer(row_id, distance);
    }
}
