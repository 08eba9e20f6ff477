//! # In-Memory Content
//!
//! The reference `IdeaStore`: an idea tree plus links, with an undo stack
//! and one notification queue per subscriber.
//!
//! ## Lifecycle
//!
//! ```text
//! command → validate → operations (undo batch) → notification → queues
//! ```
//!
//! A command that fails validation leaves the tree, the undo stack and every
//! queue untouched.

use crate::command::{ChangeNotification, Command};
use crate::errors::ContentError;
use crate::idea::{Idea, IdeaId, Link, Rank};
use crate::operations::{Operation, TreeState};
use crate::store::{IdeaStore, SubscriptionId};
use crate::undo_stack::UndoStack;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// Editable idea tree with session-tagged history
#[derive(Debug)]
pub struct Content {
    state: TreeState,
    history: UndoStack,
    queues: HashMap<SubscriptionId, Vec<ChangeNotification>>,
    next_subscription: u64,
}

impl Content {
    pub fn new(root: Idea) -> Self {
        Self::with_links(root, Vec::new())
    }

    pub fn with_links(root: Idea, links: Vec<Link>) -> Self {
        Self {
            state: TreeState { root, links },
            history: UndoStack::new(),
            queues: HashMap::new(),
            next_subscription: 0,
        }
    }

    /// Parse a JSON document of the shape `{"id": .., "title": .., "ideas": {..}, "links": [..]}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        #[derive(serde::Deserialize)]
        struct Document {
            id: IdeaId,
            #[serde(default)]
            title: String,
            #[serde(default)]
            attr: serde_json::Map<String, Value>,
            #[serde(default)]
            ideas: BTreeMap<Rank, Idea>,
            #[serde(default)]
            links: Vec<Link>,
        }

        let document: Document = serde_json::from_str(json)?;
        let root = Idea {
            id: document.id,
            title: document.title,
            attr: document.attr,
            ideas: document.ideas,
        };
        Ok(Self::with_links(root, document.links))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Queue a notification without changing the tree (replay of remote changes
    /// whose effect was already merged by other means)
    pub fn notify(&mut self, command: Command, session: Option<&str>) {
        self.publish(ChangeNotification::new(command, session));
    }

    fn publish(&mut self, notification: ChangeNotification) {
        debug!(
            command = notification.command.name(),
            session = ?notification.session,
            subscribers = self.queues.len(),
            "Content changed"
        );
        for queue in self.queues.values_mut() {
            queue.push(notification.clone());
        }
    }

    /// Run `operations` as one undoable batch and publish `command`
    fn execute(
        &mut self,
        command: Command,
        operations: Vec<Operation>,
        session: Option<&str>,
    ) -> Result<(), ContentError> {
        self.history.begin_batch();
        for operation in operations {
            if let Err(error) = self.history.apply(operation, &mut self.state) {
                self.history.abort_batch(&mut self.state);
                return Err(error);
            }
        }
        self.history.end_batch(command.clone());
        self.publish(ChangeNotification::new(command, session));
        Ok(())
    }

    fn idea(&self, id: IdeaId) -> Result<&Idea, ContentError> {
        self.state.root.find(id).ok_or(ContentError::IdeaNotFound(id))
    }

    fn parent_of(&self, id: IdeaId) -> Result<&Idea, ContentError> {
        self.idea(id)?;
        self.state.root.find_parent(id).ok_or(ContentError::NoParent(id))
    }

    fn next_id(&self) -> IdeaId {
        self.state.root.max_id() + 1
    }

    /// Rank for a new child of `parent`; root children go to the emptier side
    fn next_rank(&self, parent: &Idea) -> Rank {
        let max = parent.ideas.keys().copied().max().unwrap_or(0).max(0);
        if parent.id != self.state.root.id {
            return max + 1;
        }

        let right = parent.ideas.keys().filter(|rank| **rank > 0).count();
        let left = parent.ideas.keys().filter(|rank| **rank < 0).count();
        if right > left {
            parent.ideas.keys().copied().min().unwrap_or(0).min(0) - 1
        } else {
            max + 1
        }
    }
}

impl IdeaStore for Content {
    fn root(&self) -> &Idea {
        &self.state.root
    }

    fn links(&self) -> &[Link] {
        &self.state.links
    }

    fn update_title(&mut self, id: IdeaId, title: &str, session: Option<&str>) -> Result<(), ContentError> {
        if self.idea(id)?.title == title {
            return Err(ContentError::NoChange);
        }

        self.execute(
            Command::UpdateTitle {
                id,
                title: title.to_string(),
            },
            vec![Operation::SetTitle {
                id,
                title: title.to_string(),
            }],
            session,
        )
    }

    fn add_sub_idea(&mut self, parent_id: IdeaId, title: &str, session: Option<&str>) -> Result<IdeaId, ContentError> {
        let parent = self.idea(parent_id)?;
        let new_id = self.next_id();
        let mut children = parent.ideas.clone();
        children.insert(self.next_rank(parent), Idea::new(new_id, title));

        self.execute(
            Command::AddSubIdea {
                parent_id,
                title: title.to_string(),
                new_id,
            },
            vec![Operation::ReplaceChildren { parent_id, children }],
            session,
        )?;
        Ok(new_id)
    }

    fn remove_sub_idea(&mut self, id: IdeaId, session: Option<&str>) -> Result<(), ContentError> {
        let parent = self.parent_of(id)?;
        let parent_id = parent.id;
        let mut children = parent.ideas.clone();
        children.retain(|_, child| child.id != id);

        let removed: HashSet<IdeaId> = self.idea(id)?.ids().into_iter().collect();
        let mut operations = vec![Operation::ReplaceChildren { parent_id, children }];
        if self
            .state
            .links
            .iter()
            .any(|link| removed.contains(&link.idea_id_from) || removed.contains(&link.idea_id_to))
        {
            let links = self
                .state
                .links
                .iter()
                .filter(|link| !removed.contains(&link.idea_id_from) && !removed.contains(&link.idea_id_to))
                .cloned()
                .collect();
            operations.push(Operation::ReplaceLinks { links });
        }

        self.execute(Command::RemoveSubIdea { id, parent_id }, operations, session)
    }

    fn insert_intermediate(&mut self, id: IdeaId, title: &str, session: Option<&str>) -> Result<IdeaId, ContentError> {
        let parent = self.parent_of(id)?;
        let parent_id = parent.id;
        let rank = parent.child_rank(id).ok_or(ContentError::IdeaNotFound(id))?;

        let mut children = parent.ideas.clone();
        let Some(child) = children.remove(&rank) else {
            return Err(ContentError::IdeaNotFound(id));
        };
        let new_id = self.next_id();
        children.insert(rank, Idea::new(new_id, title).with_child(1, child));

        self.execute(
            Command::InsertIntermediate {
                id,
                title: title.to_string(),
                new_id,
            },
            vec![Operation::ReplaceChildren { parent_id, children }],
            session,
        )?;
        Ok(new_id)
    }

    fn update_attr(&mut self, id: IdeaId, name: &str, value: Value, session: Option<&str>) -> Result<(), ContentError> {
        let current = self.idea(id)?.attr.get(name);
        let next = match &value {
            Value::Null | Value::Bool(false) => None,
            other => Some(other.clone()),
        };
        if current == next.as_ref() {
            return Err(ContentError::NoChange);
        }

        self.execute(
            Command::UpdateAttr {
                id,
                name: name.to_string(),
                value,
            },
            vec![Operation::SetAttr {
                id,
                name: name.to_string(),
                value: next,
            }],
            session,
        )
    }

    fn add_link(&mut self, from: IdeaId, to: IdeaId, session: Option<&str>) -> Result<(), ContentError> {
        self.idea(from)?;
        self.idea(to)?;

        let is_parent_child = |a: IdeaId, b: IdeaId| {
            self.state.root.find_parent(b).is_some_and(|parent| parent.id == a)
        };
        if from == to
            || is_parent_child(from, to)
            || is_parent_child(to, from)
            || self.state.links.iter().any(|link| link.connects(from, to) || link.connects(to, from))
        {
            return Err(ContentError::InvalidLink { from, to });
        }

        let mut links = self.state.links.clone();
        links.push(Link::new(from, to));
        self.execute(
            Command::AddLink { from, to },
            vec![Operation::ReplaceLinks { links }],
            session,
        )
    }

    fn remove_link(&mut self, from: IdeaId, to: IdeaId, session: Option<&str>) -> Result<(), ContentError> {
        if !self.state.links.iter().any(|link| link.connects(from, to)) {
            return Err(ContentError::LinkNotFound { from, to });
        }

        let links = self
            .state
            .links
            .iter()
            .filter(|link| !link.connects(from, to))
            .cloned()
            .collect();
        self.execute(
            Command::RemoveLink { from, to },
            vec![Operation::ReplaceLinks { links }],
            session,
        )
    }

    fn paste(&mut self, parent_id: IdeaId, subtree: &Idea, session: Option<&str>) -> Result<IdeaId, ContentError> {
        let parent = self.idea(parent_id)?;
        let new_id = self.next_id();

        let mut pasted = subtree.clone();
        pasted.renumber(new_id);
        let mut children = parent.ideas.clone();
        children.insert(self.next_rank(parent), pasted);

        self.execute(
            Command::Paste { parent_id, new_id },
            vec![Operation::ReplaceChildren { parent_id, children }],
            session,
        )?;
        Ok(new_id)
    }

    fn move_relative(&mut self, id: IdeaId, delta: i32, session: Option<&str>) -> Result<(), ContentError> {
        let parent = self.parent_of(id)?;
        let parent_id = parent.id;
        let current = parent.child_rank(id).ok_or(ContentError::IdeaNotFound(id))?;
        let is_root = parent_id == self.state.root.id;

        // Sibling ranks on the same side, in vertical order
        let mut ranks: Vec<Rank> = parent
            .ideas
            .keys()
            .copied()
            .filter(|rank| !is_root || (*rank < 0) == (current < 0))
            .collect();
        if is_root {
            ranks.sort_by_key(|rank| rank.abs());
        }

        let Some(from) = ranks.iter().position(|rank| *rank == current) else {
            return Err(ContentError::IdeaNotFound(id));
        };
        let to = (from as i64 + i64::from(delta)).clamp(0, ranks.len() as i64 - 1) as usize;
        if from == to {
            return Err(ContentError::NoChange);
        }

        // Keep the set of ranks, rotate which idea holds each one
        let mut order: Vec<Idea> = ranks.iter().filter_map(|rank| parent.ideas.get(rank).cloned()).collect();
        let moved = order.remove(from);
        order.insert(to, moved);

        let mut children: BTreeMap<Rank, Idea> = parent.ideas.clone();
        for (rank, idea) in ranks.iter().zip(order) {
            children.insert(*rank, idea);
        }

        self.execute(
            Command::MoveRelative { id, delta },
            vec![Operation::ReplaceChildren { parent_id, children }],
            session,
        )
    }

    fn undo(&mut self, session: Option<&str>) -> Result<(), ContentError> {
        let undone = self.history.undo(&mut self.state)?;
        debug!(command = ?undone.as_ref().map(Command::name), "Undo");
        self.publish(ChangeNotification::new(Command::Undo, session));
        Ok(())
    }

    fn redo(&mut self, session: Option<&str>) -> Result<(), ContentError> {
        let redone = self.history.redo(&mut self.state)?;
        debug!(command = ?redone.as_ref().map(Command::name), "Redo");
        self.publish(ChangeNotification::new(Command::Redo, session));
        Ok(())
    }

    fn subscribe(&mut self) -> SubscriptionId {
        let subscription = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.queues.insert(subscription, Vec::new());
        subscription
    }

    fn unsubscribe(&mut self, subscription: SubscriptionId) {
        self.queues.remove(&subscription);
    }

    fn take_changes(&mut self, subscription: SubscriptionId) -> Vec<ChangeNotification> {
        self.queues
            .get_mut(&subscription)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn content() -> Content {
        Content::new(
            Idea::new(1, "root")
                .with_child(10, Idea::new(2, "child").with_child(1, Idea::new(3, "grandchild"))),
        )
    }

    #[test]
    fn test_failed_command_publishes_nothing() {
        let mut content = content();
        let sub = content.subscribe();

        assert_eq!(content.remove_sub_idea(1, None), Err(ContentError::NoParent(1)));
        assert_eq!(content.update_title(99, "x", None), Err(ContentError::IdeaNotFound(99)));
        assert!(content.take_changes(sub).is_empty());
        assert!(!content.can_undo());
    }

    #[test]
    fn test_root_children_alternate_sides() {
        let mut content = Content::new(Idea::new(1, "root"));
        let a = content.add_sub_idea(1, "a", None).unwrap();
        let b = content.add_sub_idea(1, "b", None).unwrap();
        let c = content.add_sub_idea(1, "c", None).unwrap();

        let root = content.root();
        assert_eq!(root.child_rank(a), Some(1));
        assert_eq!(root.child_rank(b), Some(-1));
        assert_eq!(root.child_rank(c), Some(2));
    }

    #[test]
    fn test_false_attribute_removes_it() {
        let mut content = content();
        content.update_attr(2, "collapsed", json!(true), None).unwrap();
        assert!(content.find_idea(2).unwrap().is_collapsed());

        content.update_attr(2, "collapsed", json!(false), None).unwrap();
        assert!(content.find_idea(2).unwrap().attr.is_empty());

        assert_eq!(
            content.update_attr(2, "collapsed", json!(false), None),
            Err(ContentError::NoChange)
        );
    }

    #[test]
    fn test_unsubscribed_queue_is_dropped() {
        let mut content = content();
        let sub = content.subscribe();
        content.unsubscribe(sub);
        content.update_title(2, "x", None).unwrap();
        assert!(content.take_changes(sub).is_empty());
    }

    #[test]
    fn test_from_json_reads_links() {
        let content = Content::from_json(
            r#"{"id": 1, "title": "1", "ideas": {"7": {"id": 2, "title": "2"}},
                "links": [{"ideaIdFrom": 1, "ideaIdTo": 2}]}"#,
        )
        .unwrap();
        assert_eq!(content.links(), &[Link::new(1, 2)]);
        assert_eq!(content.find_parent(2).map(|p| p.id), Some(1));
    }
}
