//! Nearest-node text resolution.
//!
//! A text draw command only carries its anchor point. The node it drew is
//! taken to be the laid-out text node whose bounding-box origin is closest
//! (Euclidean) to that anchor. Nodes without resolvable text never match.

// ============================================================================
// Imports
// ============================================================================

use crate::capture::LayoutTable;

// ============================================================================
// TextResolver
// ============================================================================

/// Resolver over one snapshot's layout.
///
/// Candidate nodes are collected once at construction, so resolving many
/// commands against the same snapshot does not rescan the layout.
#[derive(Debug, Clone)]
pub struct TextResolver {
    /// `(node, x, y)` for every node with text and bounds.
    candidates: Vec<(usize, f64, f64)>,
}

impl TextResolver {
    /// Collects the text-bearing nodes of `layout`.
    #[must_use]
    pub fn new(layout: &LayoutTable) -> Self {
        let candidates = layout
            .text
            .iter()
            .zip(&layout.bounds)
            .enumerate()
            .filter(|(_, (text, _))| **text >= 0)
            .map(|(node, (_, bounds))| (node, bounds[0], bounds[1]))
            .collect();

        Self { candidates }
    }

    /// Returns the number of text-bearing nodes.
    #[inline]
    #[must_use]
    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Returns the node closest to `(x, y)`.
    ///
    /// Ties go to the node with the lowest index. Returns `None` when the
    /// layout has no text-bearing node.
    #[must_use]
    pub fn resolve(&self, x: f64, y: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for &(node, nx, ny) in &self.candidates {
            let distance = (x - nx).hypot(y - ny);
            if best.is_none_or(|(_, min)| distance < min) {
                best = Some((node, distance));
            }
        }

        best.map(|(node, _)| node)
    }
}

/// Resolves a single point against `layout`.
#[must_use]
pub fn resolve(point: (f64, f64), layout: &LayoutTable) -> Option<usize> {
    TextResolver::new(layout).resolve(point.0, point.1)
}

// ============================================================================
// Tests
// ============================================================================
