//! Spatial indexing for efficient neighbor queries.
//!
//! Wraps a 2D k-d tree keyed by body handle.

use geo::Point;
use kdtree::distance::squared_euclidean;
use kdtree::{ErrorKind as KdTreeError, KdTree};

use super::world::BodyHandle;

/// Type alias for the 2D k-d tree used for neighbor queries.
pub type Tree2D = KdTree<f32, BodyHandle, [f32; 2]>;

/// Result of a spatial radius query: (`distance_squared`, handle), nearest first.
pub type SpatialQueryResult = Vec<(f32, BodyHandle)>;

/// k-d tree over body positions.
pub struct SpatialIndex {
    tree: Tree2D,
}

impl SpatialIndex {
    /// Builds an index from `(handle, position)` pairs.
    ///
    /// Bodies with non-finite coordinates are rejected by the tree and
    /// surface as an error.
    pub fn build<I>(bodies: I) -> Result<Self, KdTreeError>
    where
        I: IntoIterator<Item = (BodyHandle, Point<f32>)>,
    {
        let mut tree = KdTree::new(2);
        for (handle, pos) in bodies {
            tree.add([pos.x(), pos.y()], handle)?;
        }
        Ok(Self { tree })
    }

    /// Bodies within `radius` of `pos`.
    pub fn query(&self, pos: Point<f32>, radius: f32) -> SpatialQueryResult {
        self.tree
            .within(&[pos.x(), pos.y()], radius.powi(2), &squared_euclidean)
            .unwrap_or_default()
            .into_iter()
            .map(|(dist, &handle)| (dist, handle))
            .collect()
    }

    /// Number of indexed bodies.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the index holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self {
            tree: KdTree::new(2),
        }
    }
}
