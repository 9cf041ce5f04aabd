//! Viewer-driven refinement with hysteresis.
//!
//! One call to [`QuadTree::update`] performs at most one structural edit,
//! which keeps per-frame cost bounded and lets the topology key settle over
//! a few frames instead of churning in one.

use glam::DVec3;

use crate::error::QuadError;
use crate::node::{QuadId, QuadNode};
use crate::tree::QuadTree;

/// Distance thresholds that drive refinement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LodPolicy {
    /// A leaf splits when the viewer is closer than `radius * split_factor`.
    pub split_factor: f64,
    /// A parent collapses when the viewer is farther than
    /// `radius * split_factor * unify_hysteresis`.
    pub unify_hysteresis: f64,
}

impl Default for LodPolicy {
    fn default() -> Self {
        Self {
            split_factor: 2.0,
            unify_hysteresis: 1.5,
        }
    }
}

/// Structural edit chosen for one update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodAction {
    /// Nothing to do.
    Keep,
    /// Split this leaf.
    Subdivide(QuadId),
    /// Collapse this parent.
    Unify(QuadId),
}

impl LodAction {
    /// Returns `true` if this action edits the tree.
    pub fn changed(self) -> bool {
        self != LodAction::Keep
    }
}

impl LodPolicy {
    /// Validated policy.
    pub fn new(split_factor: f64, unify_hysteresis: f64) -> Result<Self, QuadError> {
        let valid = split_factor.is_finite()
            && split_factor > 0.0
            && unify_hysteresis.is_finite()
            && unify_hysteresis >= 1.0;
        if !valid {
            return Err(QuadError::InvalidLodPolicy {
                split_factor,
                unify_hysteresis,
            });
        }
        Ok(Self {
            split_factor,
            unify_hysteresis,
        })
    }

    pub fn split_distance(&self, node: &QuadNode) -> f64 {
        node.radius() * self.split_factor
    }

    pub fn unify_distance(&self, node: &QuadNode) -> f64 {
        self.split_distance(node) * self.unify_hysteresis
    }

    /// Picks the edit for `viewer` without applying it.
    ///
    /// The leaf nearest the viewer splits if the viewer is inside its split
    /// distance; otherwise that leaf's parent collapses if the viewer has
    /// left the parent's unify distance.
    pub fn decide(&self, tree: &QuadTree, viewer: DVec3) -> LodAction {
        let Some(leaf) = tree.closest_quad(viewer) else {
            return LodAction::Keep;
        };
        let Some(node) = tree.node(leaf) else {
            return LodAction::Keep;
        };

        let distance = node.world_centre().distance(viewer);
        if node.level() < tree.max_level() && distance < self.split_distance(node) {
            return LodAction::Subdivide(leaf);
        }

        if let Some(parent_id) = node.parent()
            && let Some(parent) = tree.node(parent_id)
            && parent.world_centre().distance(viewer) > self.unify_distance(parent)
        {
            return LodAction::Unify(parent_id);
        }
        LodAction::Keep
    }
}

impl QuadTree {
    /// Applies at most one refinement step toward `viewer`.
    pub fn update(&mut self, viewer: DVec3, policy: &LodPolicy) -> LodAction {
        let action = policy.decide(self, viewer);
        match action {
            LodAction::Keep => {}
            LodAction::Subdivide(id) => self.subdivide(id),
            LodAction::Unify(id) => self.unify(id),
        }
        if action.changed() {
            tracing::debug!(?action, leaves = self.leaf_count(), "lod step");
        }
        action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::QuadOptions;

    fn tree(max_level: u32) -> QuadTree {
        QuadTree::new(QuadOptions {
            max_level,
            ..QuadOptions::default()
        })
        .unwrap()
    }

    fn settle(tree: &mut QuadTree, viewer: DVec3, policy: &LodPolicy) -> usize {
        let mut steps = 0;
        while tree.update(viewer, policy).changed() {
            steps += 1;
            assert!(steps < 1000, "refinement did not settle");
        }
        steps
    }

    #[test]
    fn test_policy_validation() {
        assert!(LodPolicy::new(2.0, 1.5).is_ok());
        assert!(LodPolicy::new(0.0, 1.5).is_err());
        assert!(LodPolicy::new(2.0, 0.5).is_err());
        assert!(LodPolicy::new(f64::NAN, 1.5).is_err());
    }

    #[test]
    fn test_far_viewer_keeps_root() {
        let mut tree = tree(4);
        let policy = LodPolicy::default();
        assert_eq!(tree.update(DVec3::new(0.0, 0.0, 100.0), &policy), LodAction::Keep);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_near_viewer_refines_to_max_level() {
        let mut tree = tree(4);
        let policy = LodPolicy::default();
        let viewer = DVec3::new(0.3, -0.6, 0.01);
        assert!(settle(&mut tree, viewer, &policy) >= 4);
        assert_eq!(tree.max_depth(), 4);
        let leaf = tree.closest_quad(viewer).unwrap();
        assert_eq!(tree.node(leaf).unwrap().level(), 4);
    }

    #[test]
    fn test_one_edit_per_update() {
        let mut tree = tree(4);
        let policy = LodPolicy::default();
        let viewer = DVec3::new(0.0, 0.0, 0.01);
        let action = tree.update(viewer, &policy);
        assert_eq!(action, LodAction::Subdivide(tree.root()));
        assert_eq!(tree.leaf_count(), 4);
    }

    #[test]
    fn test_receding_viewer_collapses_back() {
        let mut tree = tree(4);
        let policy = LodPolicy::default();
        settle(&mut tree, DVec3::new(0.5, 0.5, 0.01), &policy);
        assert!(tree.max_depth() > 1);

        settle(&mut tree, DVec3::new(0.5, 0.5, 50.0), &policy);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_hysteresis_prevents_flapping() {
        let mut tree = tree(1);
        let policy = LodPolicy::default();
        // Inside split distance of the root (radius 1, factor 2).
        let viewer = DVec3::new(0.0, 0.0, 1.9);
        assert_eq!(tree.update(viewer, &policy), LodAction::Subdivide(tree.root()));

        // Just outside split distance but inside unify distance: no change.
        let viewer = DVec3::new(0.0, 0.0, 2.5);
        assert_eq!(tree.update(viewer, &policy), LodAction::Keep);
        assert_eq!(tree.leaf_count(), 4);

        let viewer = DVec3::new(0.0, 0.0, 3.5);
        assert_eq!(tree.update(viewer, &policy), LodAction::Unify(tree.root()));
    }
}
