//! # Idea Tree
//!
//! An idea is a titled node with an open attribute bag and ranked children.
//! Rank ordering doubles as side placement for children of the root:
//! negative ranks sit left of the root, positive ranks sit right.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Identifier of an idea, unique within one tree
pub type IdeaId = u64;

/// Sibling ordering key
pub type Rank = i64;

/// Attribute names the editor understands
pub const ATTR_STYLE: &str = "style";
pub const ATTR_COLLAPSED: &str = "collapsed";
pub const ATTR_ATTACHMENT: &str = "attachment";

/// A node in the idea tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Idea {
    pub id: IdeaId,

    #[serde(default)]
    pub title: String,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: Map<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub ideas: BTreeMap<Rank, Idea>,
}

/// A cross-tree link between two ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub idea_id_from: IdeaId,
    pub idea_id_to: IdeaId,

    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub attr: Map<String, Value>,
}

impl Link {
    pub fn new(idea_id_from: IdeaId, idea_id_to: IdeaId) -> Self {
        Self {
            idea_id_from,
            idea_id_to,
            attr: Map::new(),
        }
    }

    pub fn connects(&self, from: IdeaId, to: IdeaId) -> bool {
        self.idea_id_from == from && self.idea_id_to == to
    }
}

impl Idea {
    pub fn new(id: IdeaId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            attr: Map::new(),
            ideas: BTreeMap::new(),
        }
    }

    /// Builder helper: attach a child at `rank`
    pub fn with_child(mut self, rank: Rank, child: Idea) -> Self {
        self.ideas.insert(rank, child);
        self
    }

    /// Builder helper: set an attribute
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attr.insert(name.into(), value);
        self
    }

    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attr.get(name)
    }

    pub fn is_collapsed(&self) -> bool {
        matches!(self.attr.get(ATTR_COLLAPSED), Some(Value::Bool(true)))
    }

    pub fn has_children(&self) -> bool {
        !self.ideas.is_empty()
    }

    /// Style attribute as a map (empty when absent or not an object)
    pub fn style(&self) -> Map<String, Value> {
        match self.attr.get(ATTR_STYLE) {
            Some(Value::Object(style)) => style.clone(),
            _ => Map::new(),
        }
    }

    /// Depth-first search for an idea by id, including `self`
    pub fn find(&self, id: IdeaId) -> Option<&Idea> {
        if self.id == id {
            return Some(self);
        }
        self.ideas.values().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: IdeaId) -> Option<&mut Idea> {
        if self.id == id {
            return Some(self);
        }
        self.ideas.values_mut().find_map(|child| child.find_mut(id))
    }

    /// Find the direct parent of `id` (None for self or unknown ids)
    pub fn find_parent(&self, id: IdeaId) -> Option<&Idea> {
        if self.ideas.values().any(|child| child.id == id) {
            return Some(self);
        }
        self.ideas.values().find_map(|child| child.find_parent(id))
    }

    /// Rank of a direct child
    pub fn child_rank(&self, child_id: IdeaId) -> Option<Rank> {
        self.ideas
            .iter()
            .find(|(_, child)| child.id == child_id)
            .map(|(rank, _)| *rank)
    }

    /// Highest id in this subtree
    pub fn max_id(&self) -> IdeaId {
        self.ideas
            .values()
            .map(Idea::max_id)
            .fold(self.id, IdeaId::max)
    }

    /// All ids of this subtree in depth-first rank order
    pub fn ids(&self) -> Vec<IdeaId> {
        let mut ids = vec![self.id];
        for child in self.ideas.values() {
            ids.extend(child.ids());
        }
        ids
    }

    /// Renumber the subtree with consecutive ids starting at `next`,
    /// returning the first id not used
    pub fn renumber(&mut self, next: IdeaId) -> IdeaId {
        self.id = next;
        let mut next = next + 1;
        for child in self.ideas.values_mut() {
            next = child.renumber(next);
        }
        next
    }
}
