//! Spatial queries over one or more quadtree roots.

use glam::DVec3;

use crate::node::QuadId;
use crate::tree::QuadTree;

/// Leaf nearest to `point`, found by descending into the closest child at
/// every level starting from the closest root.
pub fn closest_quad(tree: &QuadTree, roots: &[QuadId], point: DVec3) -> Option<QuadId> {
    let mut best = nearest(tree, roots.iter().copied(), point)?;
    while let Some(children) = tree.children(best) {
        best = nearest(tree, children.into_iter(), point)?;
    }
    Some(best)
}

/// Every leaf under `roots` whose centre lies within `distance` of `point`.
pub fn quads_within_distance(
    tree: &QuadTree,
    roots: &[QuadId],
    point: DVec3,
    distance: f64,
) -> Vec<QuadId> {
    let mut found = Vec::new();
    let mut stack: Vec<QuadId> = roots.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        let Some(node) = tree.node(id) else {
            continue;
        };
        match node.children() {
            Some(children) => stack.extend(children.iter().rev()),
            None => {
                if node.world_centre().distance(point) <= distance {
                    found.push(id);
                }
            }
        }
    }
    found
}

fn nearest(tree: &QuadTree, candidates: impl Iterator<Item = QuadId>, point: DVec3) -> Option<QuadId> {
    candidates
        .filter_map(|id| {
            tree.node(id)
                .map(|node| (id, node.world_centre().distance_squared(point)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::QuadOptions;

    fn subdivided_tree() -> QuadTree {
        let mut tree = QuadTree::new(QuadOptions::default()).unwrap();
        tree.subdivide(tree.root());
        tree
    }

    #[test]
    fn test_closest_quad_on_unsplit_root_is_root() {
        let tree = QuadTree::new(QuadOptions::default()).unwrap();
        let found = closest_quad(&tree, tree.roots(), DVec3::new(5.0, 5.0, 5.0));
        assert_eq!(found, Some(tree.root()));
    }

    #[test]
    fn test_closest_quad_returns_leaf_in_right_quadrant() {
        let tree = subdivided_tree();
        let found = closest_quad(&tree, tree.roots(), DVec3::new(0.9, -0.8, 0.2)).unwrap();
        let node = tree.node(found).unwrap();
        assert!(!node.has_children());
        assert_eq!(node.centre(), DVec3::new(0.5, -0.5, 0.0));
    }

    #[test]
    fn test_within_distance_returns_only_near_leaves() {
        let tree = subdivided_tree();
        let point = DVec3::new(-0.5, -0.5, 0.0);
        let found = quads_within_distance(&tree, tree.roots(), point, 0.1);
        assert_eq!(found.len(), 1);

        let all = quads_within_distance(&tree, tree.roots(), point, 10.0);
        assert_eq!(all.len(), 4);
        for id in all {
            let node = tree.node(id).unwrap();
            assert!(!node.has_children());
            assert!(node.world_centre().distance(point) <= 10.0);
        }
    }

    #[test]
    fn test_empty_roots_find_nothing() {
        let tree = subdivided_tree();
        assert_eq!(closest_quad(&tree, &[], DVec3::ZERO), None);
        assert!(quads_within_distance(&tree, &[], DVec3::ZERO, 1.0).is_empty());
    }
}
