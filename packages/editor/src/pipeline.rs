//! # Layout Pipeline
//!
//! Coordinates one refresh: Tree → Layout → Compensate → Diff
//!
//! The pipeline manages:
//! - Running the layout calculator on the current tree
//! - Keeping one node anchored across a relayout
//! - Diffing against the cached layout
//! - Caching the new layout for the next refresh

use crate::layout::{Layout, LayoutCalculator};
use crate::layout_differ::{diff_layouts, LayoutChange};
use mindmap_content::{Idea, IdeaId, Link};

/// Manages the tree → layout → changes pipeline
pub struct LayoutPipeline {
    calculator: Box<dyn LayoutCalculator>,
    last_layout: Option<Layout>,
}

impl LayoutPipeline {
    pub fn new(calculator: impl LayoutCalculator + 'static) -> Self {
        Self {
            calculator: Box::new(calculator),
            last_layout: None,
        }
    }

    /// Recompute the layout and return what changed since the last refresh
    ///
    /// With `anchor`, the new layout is shifted so that node keeps the
    /// position it had in the cached layout. Nothing is shifted when the node
    /// is missing from either layout.
    pub fn refresh(&mut self, root: &Idea, links: &[Link], anchor: Option<IdeaId>) -> Vec<LayoutChange> {
        let mut layout = self.calculator.calculate(root, links);
        layout.stamp_ids();

        let empty = Layout::default();
        let previous = self.last_layout.as_ref().unwrap_or(&empty);

        if let Some((dx, dy)) = anchor.and_then(|id| anchor_offset(previous, &layout, id)) {
            tracing::debug!(anchor = ?anchor, dx, dy, "Compensating relayout");
            layout.translate(dx, dy);
        }

        let changes = diff_layouts(previous, &layout);
        tracing::trace!(
            changes = changes.len(),
            nodes = layout.nodes.len(),
            links = layout.links.len(),
            "Layout refreshed"
        );

        self.last_layout = Some(layout);
        changes
    }

    /// Last computed layout (if any)
    pub fn last_layout(&self) -> Option<&Layout> {
        self.last_layout.as_ref()
    }

    /// Clear the cache; the next refresh reports every node as created
    pub fn clear_cache(&mut self) {
        self.last_layout = None;
    }
}

impl std::fmt::Debug for LayoutPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutPipeline")
            .field("last_layout", &self.last_layout)
            .finish_non_exhaustive()
    }
}

/// Offset that puts `id` back where it was, if it moved
fn anchor_offset(previous: &Layout, current: &Layout, id: IdeaId) -> Option<(f64, f64)> {
    let before = previous.node(id)?;
    let after = current.node(id)?;
    let offset = (before.x - after.x, before.y - after.y);
    (offset != (0.0, 0.0)).then_some(offset)
}
