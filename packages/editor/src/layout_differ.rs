//! # Layout Differ
//!
//! Compares two layout snapshots and reports what a renderer has to do to
//! go from the first to the second.
//!
//! - Ids only in the new layout are created, ids only in the old one removed
//! - Ids in both report moved, title and attribute changes independently
//! - Links are matched by their `(from, to)` pair
//!
//! The differ is a pure function: the same inputs always produce the same
//! changes, in the same order (removals, then nodes by id, then links).

use crate::layout::{Layout, LinkLayout, NodeLayout};
use std::collections::HashSet;

/// One change between two layouts
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutChange {
    NodeCreated(NodeLayout),
    NodeRemoved(NodeLayout),
    NodeMoved(NodeLayout),
    NodeTitleChanged(NodeLayout),
    NodeAttrChanged(NodeLayout),
    LinkCreated(LinkLayout),
    LinkRemoved(LinkLayout),
}

impl LayoutChange {
    /// Id of the node this change is about (None for links)
    pub fn node_id(&self) -> Option<mindmap_content::IdeaId> {
        match self {
            LayoutChange::NodeCreated(node)
            | LayoutChange::NodeRemoved(node)
            | LayoutChange::NodeMoved(node)
            | LayoutChange::NodeTitleChanged(node)
            | LayoutChange::NodeAttrChanged(node) => Some(node.id),
            LayoutChange::LinkCreated(_) | LayoutChange::LinkRemoved(_) => None,
        }
    }
}

/// Diff two layouts
pub fn diff_layouts(old: &Layout, new: &Layout) -> Vec<LayoutChange> {
    let mut changes = Vec::new();

    for (id, old_node) in &old.nodes {
        if !new.nodes.contains_key(id) {
            changes.push(LayoutChange::NodeRemoved(old_node.clone()));
        }
    }

    for (id, new_node) in &new.nodes {
        match old.nodes.get(id) {
            None => changes.push(LayoutChange::NodeCreated(new_node.clone())),
            Some(old_node) => changes.extend(diff_node(old_node, new_node)),
        }
    }

    changes.extend(diff_links(&old.links, &new.links));

    changes
}

fn diff_node(old: &NodeLayout, new: &NodeLayout) -> Vec<LayoutChange> {
    let mut changes = Vec::new();

    if old.x != new.x || old.y != new.y {
        changes.push(LayoutChange::NodeMoved(new.clone()));
    }

    if old.title != new.title {
        changes.push(LayoutChange::NodeTitleChanged(new.clone()));
    }

    // Deep structural comparison of the attribute bags
    if old.attr != new.attr {
        changes.push(LayoutChange::NodeAttrChanged(new.clone()));
    }

    changes
}

fn diff_links(old: &[LinkLayout], new: &[LinkLayout]) -> Vec<LayoutChange> {
    let old_keys: HashSet<_> = old.iter().map(LinkLayout::key).collect();
    let new_keys: HashSet<_> = new.iter().map(LinkLayout::key).collect();
    let mut changes = Vec::new();

    let mut removed = HashSet::new();
    for link in old {
        if !new_keys.contains(&link.key()) && removed.insert(link.key()) {
            changes.push(LayoutChange::LinkRemoved(link.clone()));
        }
    }

    let mut created = HashSet::new();
    for link in new {
        if !old_keys.contains(&link.key()) && created.insert(link.key()) {
            changes.push(LayoutChange::LinkCreated(link.clone()));
        }
    }

    changes
}
