//! # Selection
//!
//! The selected idea and keyboard-style navigation over the last layout.
//!
//! Navigation follows the tree, not raw geometry:
//!
//! - Left/right: a node on the far side of the root steps back to its parent;
//!   otherwise it descends to its lowest-ranking child, expanding first when
//!   the node is collapsed
//! - Up/down: the nearest drawn sibling, else the closest node above/below in
//!   the same horizontal half

use crate::events::MapEvent;
use crate::layout::{Layout, NodeLayout};
use mindmap_content::{IdeaId, IdeaStore};

/// Holds at most one selected idea
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionTracker {
    selected: Option<IdeaId>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<IdeaId> {
        self.selected
    }

    /// Select `id`, returning the transitions to publish (empty when `id` is
    /// already selected)
    pub fn select(&mut self, id: IdeaId) -> Vec<MapEvent> {
        if self.selected == Some(id) {
            return Vec::new();
        }

        let mut transitions = Vec::with_capacity(2);
        if let Some(previous) = self.selected.replace(id) {
            transitions.push(MapEvent::NodeSelectionChanged {
                id: previous,
                selected: false,
            });
        }
        transitions.push(MapEvent::NodeSelectionChanged { id, selected: true });
        transitions
    }

    /// Drop the selection, returning the deselect transition if there was one
    pub fn deselect(&mut self) -> Option<MapEvent> {
        self.selected
            .take()
            .map(|id| MapEvent::NodeSelectionChanged { id, selected: false })
    }

    /// Forget the selection without publishing anything
    pub fn clear(&mut self) {
        self.selected = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    /// Analytic label of the matching map model operation
    pub fn action(self) -> &'static str {
        match self {
            Direction::Left => "selectNodeLeft",
            Direction::Right => "selectNodeRight",
            Direction::Up => "selectNodeUp",
            Direction::Down => "selectNodeDown",
        }
    }
}

/// Where a navigation step lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigation {
    pub target: IdeaId,
    /// Collapsed idea that has to be expanded before selecting `target`
    pub expand: Option<IdeaId>,
}

impl Navigation {
    fn select(target: IdeaId) -> Self {
        Self { target, expand: None }
    }
}

/// Resolve one navigation step from `current`
pub fn navigate<S: IdeaStore + ?Sized>(
    store: &S,
    layout: &Layout,
    current: IdeaId,
    direction: Direction,
    horizontal_threshold: f64,
) -> Option<Navigation> {
    match direction {
        Direction::Left => navigate_horizontally(store, layout, current, true),
        Direction::Right => navigate_horizontally(store, layout, current, false),
        Direction::Up => navigate_vertically(store, layout, current, true, horizontal_threshold),
        Direction::Down => navigate_vertically(store, layout, current, false, horizontal_threshold),
    }
    .filter(|navigation| navigation.target != current)
}

fn navigate_horizontally<S: IdeaStore + ?Sized>(
    store: &S,
    layout: &Layout,
    current: IdeaId,
    towards_left: bool,
) -> Option<Navigation> {
    let root_id = store.root_id();
    let idea = store.find_idea(current)?;

    if current != root_id {
        let on_left = is_left_of_root(layout, root_id, current)?;
        if on_left != towards_left {
            return store.find_parent(current).map(|parent| Navigation::select(parent.id));
        }
    }

    let child = if current == root_id {
        // Root children sit on both sides; the sign of the rank picks the side
        idea.ideas
            .iter()
            .filter(|(rank, _)| (**rank < 0) == towards_left)
            .min_by_key(|(rank, _)| rank.abs())
    } else {
        idea.ideas.iter().min_by_key(|(rank, _)| **rank)
    }
    .map(|(_, child)| child.id)?;

    Some(Navigation {
        target: child,
        expand: idea.is_collapsed().then_some(current),
    })
}

fn navigate_vertically<S: IdeaStore + ?Sized>(
    store: &S,
    layout: &Layout,
    current: IdeaId,
    upwards: bool,
    horizontal_threshold: f64,
) -> Option<Navigation> {
    let sibling = if upwards {
        store.previous_sibling_id(current)
    } else {
        store.next_sibling_id(current)
    };
    if let Some(sibling) = sibling {
        return Some(Navigation::select(sibling));
    }

    closest_vertically(layout, store.root_id(), current, upwards, horizontal_threshold).map(Navigation::select)
}

/// Side of `id` relative to the root, by layout position
fn is_left_of_root(layout: &Layout, root_id: IdeaId, id: IdeaId) -> Option<bool> {
    let root = layout.node(root_id)?;
    let node = layout.node(id)?;
    Some(node.x < root.x)
}

/// Closest node strictly above (or below) `current` in the same horizontal
/// half, ties broken by vertical distance and then by id
fn closest_vertically(
    layout: &Layout,
    root_id: IdeaId,
    current: IdeaId,
    upwards: bool,
    horizontal_threshold: f64,
) -> Option<IdeaId> {
    let from = layout.node(current)?;
    let root_x = layout.node(root_id).map_or(0.0, |root| root.x);
    let left_half = |node: &NodeLayout| node.x < root_x;

    layout
        .nodes
        .values()
        .filter(|node| node.id != current)
        .filter(|node| left_half(node) == left_half(from))
        .filter(|node| if upwards { node.y < from.y } else { node.y > from.y })
        .filter(|node| (node.x - from.x).abs() <= horizontal_threshold)
        .map(|node| {
            let dx = node.x - from.x;
            let dy = node.y - from.y;
            (dx.hypot(dy), dy.abs(), node.id)
        })
        .min_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.cmp(&b.2))
        })
        .map(|(_, _, id)| id)
}
