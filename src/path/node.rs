//! Working path nodes.

use crate::core::WorldPoint;
use crate::grid::GridIndex;

/// A point on the working path.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Current position
    pub position: WorldPoint,
    /// Fixed nodes never move (endpoints, anchors, nodes off the grid)
    pub fixed: bool,
    /// Obstacle indices found near this node in the current round
    pub nearby: Vec<usize>,
    /// Displacement applied in the current round
    pub displacement: WorldPoint,
}

impl Node {
    /// Movable node at `position`
    pub fn new(position: WorldPoint) -> Self {
        Self {
            position,
            fixed: false,
            nearby: Vec::new(),
            displacement: WorldPoint::ZERO,
        }
    }

    /// Node that never moves
    pub fn anchored(position: WorldPoint) -> Self {
        Self {
            fixed: true,
            ..Self::new(position)
        }
    }

    /// Clear per-round bookkeeping
    #[inline]
    pub fn reset(&mut self) {
        self.nearby.clear();
        self.displacement = WorldPoint::ZERO;
    }
}

/// One node per waypoint; first and last fixed, interior movable.
pub fn nodes_from_path(waypoints: &[WorldPoint]) -> Vec<Node> {
    let last = waypoints.len().saturating_sub(1);
    waypoints
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if i == 0 || i == last {
                Node::anchored(p)
            } else {
                Node::new(p)
            }
        })
        .collect()
}

/// Ordered node sequence for one planning request.
///
/// Node count and order are fixed once built; only positions change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkingPath {
    nodes: Vec<Node>,
}

impl WorkingPath {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Build directly from waypoints via [`nodes_from_path`]
    pub fn from_waypoints(waypoints: &[WorldPoint]) -> Self {
        Self::new(nodes_from_path(waypoints))
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes allowed to move
    pub fn movable_count(&self) -> usize {
        self.nodes.iter().filter(|n| !n.fixed).count()
    }

    /// Clear displacement and nearby lists on every node; positions are kept.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
    }

    /// Pin interior nodes that lie outside the grid.
    ///
    /// Returns the number of nodes newly fixed.
    pub fn fix_outside(&mut self, index: &GridIndex) -> usize {
        let mut fixed = 0;
        for node in &mut self.nodes {
            if !node.fixed && !index.contains(&node.position) {
                node.fixed = true;
                fixed += 1;
            }
        }
        fixed
    }

    /// Current node positions in path order
    pub fn positions(&self) -> Vec<WorldPoint> {
        self.nodes.iter().map(|n| n.position).collect()
    }
}
