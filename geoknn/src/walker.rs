//! Level-by-level R-tree descent locating the tightest node region.
//!
//! A KNN query starts with no search radius, so the first task is to find
//! the lowest-level R-tree node whose bounding box is nearest to (or
//! contains) the reference geometry; its region seeds the buffer expansion.
//! The descent repeatedly walks the tree from its roots, one target level
//! per pass: nodes above the target are expanded only when they overlap the
//! best region of the previous pass, nodes at the target are scored by box
//! distance, and the pass's nearest box becomes the next containment frame.
//! The walk is driven by an explicit queue with a pure classification
//! function; no traversal state lives outside [`DescentState`].

use std::collections::VecDeque;

use crate::bounding_box::BoundingBox;
use crate::context::QueryContext;
use crate::engine::TreeNode;
use crate::errors::KnnResult;

/// Decision for a node encountered above the target level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Expand the node's children.
    Descend,
    /// Skip the node's subtree.
    Prune,
}

/// How a node's box relates to the containment frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Containment {
    FullyWithin,
    PartlyWithin,
    NotWithin,
}

/// Transient state threaded through one descent.
#[derive(Debug)]
struct DescentState {
    /// Level whose nodes are scored this pass; nodes above it are only
    /// classified for expansion.
    target_level: u32,
    /// Best region of the previous pass, the containment frame for this one.
    frame: BoundingBox,
    /// Whether any pass has recorded a region yet.
    found: bool,
}

fn containment(frame: &BoundingBox, bbox: &BoundingBox) -> Containment {
    if frame.contains(bbox) {
        Containment::FullyWithin
    } else if !frame.intersects(bbox) {
        Containment::NotWithin
    } else {
        Containment::PartlyWithin
    }
}

/// Classifies a node against the containment frame. Partial overlap still
/// descends; a malformed (inverted or NaN) box prunes.
pub fn classify(node: &TreeNode, frame: &BoundingBox) -> Visit {
    if !node.bbox.is_valid() {
        return Visit::Prune;
    }
    match containment(frame, &node.bbox) {
        Containment::FullyWithin | Containment::PartlyWithin => Visit::Descend,
        Containment::NotWithin => Visit::Prune,
    }
}

/// Runs the descent, returning the tightest node region found, or `None`
/// when the tree is empty or no node could be scored.
pub fn locate(ctx: &QueryContext) -> KnnResult<Option<BoundingBox>> {
    let mut state = DescentState {
        target_level: u32::MAX,
        frame: BoundingBox::whole_plane(),
        found: false,
    };

    loop {
        // (region, distance, level) of the nearest node scored this pass.
        let mut pass_best: Option<(BoundingBox, f64, u32)> = None;
        let mut queue: VecDeque<TreeNode> = ctx.engine().root_nodes(ctx.index())?.into();

        while let Some(node) = queue.pop_front() {
            if node.level > state.target_level {
                if classify(&node, &state.frame) == Visit::Descend {
                    queue.extend(ctx.engine().child_nodes(ctx.index(), node.id)?);
                }
            } else if node.bbox.is_valid() {
                let dist = ctx.oracle().distance_to_box(&node.bbox);
                let improved = match &pass_best {
                    None => dist < f64::INFINITY,
                    Some((_, best, _)) => dist < *best,
                };
                if improved {
                    pass_best = Some((node.bbox.clone(), dist, node.level));
                }
            }
        }

        match pass_best {
            Some((region, dist, level)) => {
                log::trace!(
                    "descent pass at level {}: nearest region {} at distance {}",
                    level,
                    region,
                    dist
                );
                state.frame = region;
                state.found = true;
                if level <= 1 {
                    return Ok(Some(state.frame));
                }
                state.target_level = level - 1;
            }
            None => {
                // A pass that scored nothing ends the descent; keep the last
                // recorded region if any pass produced one.
                return Ok(if state.found { Some(state.frame) } else { None });
            }
        }
    }
}
