//! # Layout Snapshots
//!
//! Geometry computed outside the editor for one state of the idea tree.
//! Snapshots are treated as immutable values: the model keeps the last one
//! and diffs it against the next.

use mindmap_content::{Idea, IdeaId, Link};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Position and presentation of one idea
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeLayout {
    #[serde(default)]
    pub id: IdeaId,

    #[serde(default)]
    pub x: f64,

    #[serde(default)]
    pub y: f64,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: Map<String, Value>,
}

impl NodeLayout {
    pub fn new(id: IdeaId, x: f64, y: f64, title: impl Into<String>) -> Self {
        Self {
            id,
            x,
            y,
            title: title.into(),
            attr: Map::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attr.insert(name.into(), value);
        self
    }

    /// Value of one style property, if the node carries a style object
    pub fn style_property(&self, property: &str) -> Option<&Value> {
        self.attr
            .get(mindmap_content::ATTR_STYLE)
            .and_then(Value::as_object)
            .and_then(|style| style.get(property))
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..self.clone()
        }
    }
}

/// A drawn link between two ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkLayout {
    pub idea_id_from: IdeaId,
    pub idea_id_to: IdeaId,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: Map<String, Value>,
}

impl LinkLayout {
    pub fn new(idea_id_from: IdeaId, idea_id_to: IdeaId) -> Self {
        Self {
            idea_id_from,
            idea_id_to,
            attr: Map::new(),
        }
    }

    /// Identity of a link is its endpoint pair
    pub fn key(&self) -> (IdeaId, IdeaId) {
        (self.idea_id_from, self.idea_id_to)
    }
}

impl From<&Link> for LinkLayout {
    fn from(link: &Link) -> Self {
        Self {
            idea_id_from: link.idea_id_from,
            idea_id_to: link.idea_id_to,
            attr: link.attr.clone(),
        }
    }
}

/// Screen or map coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometry of a whole tree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub nodes: BTreeMap<IdeaId, NodeLayout>,

    #[serde(default)]
    pub links: Vec<LinkLayout>,
}

impl Layout {
    /// Build from `(id, node)` pairs, stamping each node with its id
    pub fn from_nodes(nodes: impl IntoIterator<Item = NodeLayout>) -> Self {
        Self {
            nodes: nodes.into_iter().map(|node| (node.id, node)).collect(),
            links: Vec::new(),
        }
    }

    pub fn with_links(mut self, links: impl IntoIterator<Item = LinkLayout>) -> Self {
        self.links = links.into_iter().collect();
        self
    }

    pub fn node(&self, id: IdeaId) -> Option<&NodeLayout> {
        self.nodes.get(&id)
    }

    /// Make every node's `id` agree with the key it is stored under
    pub fn stamp_ids(&mut self) {
        for (id, node) in self.nodes.iter_mut() {
            node.id = *id;
        }
    }

    /// Shift every node by `(dx, dy)`
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for node in self.nodes.values_mut() {
            node.x += dx;
            node.y += dy;
        }
    }
}

/// Computes a layout for a tree state
///
/// Implemented for any `Fn(&Idea, &[Link]) -> Layout`, so plain closures work.
pub trait LayoutCalculator {
    fn calculate(&self, root: &Idea, links: &[Link]) -> Layout;
}

impl<F> LayoutCalculator for F
where
    F: Fn(&Idea, &[Link]) -> Layout,
{
    fn calculate(&self, root: &Idea, links: &[Link]) -> Layout {
        self(root, links)
    }
}
