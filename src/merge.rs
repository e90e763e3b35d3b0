use geo::{BooleanOps, MultiPolygon};

use crate::geometry::Depression;

/// Coalesces overlapping shapes into their geometric union.
///
/// The union of the whole population is computed pairwise over a balanced
/// split, then decomposed into its connected pieces: one output shape per
/// polygon of the union. Disjoint inputs pass through with their area intact,
/// overlapping clusters collapse into a single piece, and no record is kept
/// of which inputs contributed to which piece.
pub fn merge_population(shapes: &[Depression]) -> Vec<Depression> {
    match shapes {
        [] => Vec::new(),
        [single] => vec![single.clone()],
        _ => union_all(shapes)
            .into_iter()
            .map(Depression::from_polygon)
            .collect(),
    }
}

fn union_all(shapes: &[Depression]) -> MultiPolygon<f64> {
    debug_assert!(!shapes.is_empty());
    if shapes.len() == 1 {
        return shapes[0].geometry().clone();
    }
    let (left, right) = shapes.split_at(shapes.len() / 2);
    union_all(left).union(&union_all(right))
}
