//! # Idea Store Interface
//!
//! The interface the map model consumes. Read access is provided through the
//! root idea; every mutation is session-tagged and, when it succeeds, queues a
//! `ChangeNotification` for every subscriber.

use crate::command::ChangeNotification;
use crate::errors::ContentError;
use crate::idea::{Idea, IdeaId, Link, Rank};
use serde_json::Value;

/// Handle for one change-notification queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

pub trait IdeaStore {
    /// Root of the tree
    fn root(&self) -> &Idea;

    /// Links between ideas
    fn links(&self) -> &[Link];

    fn root_id(&self) -> IdeaId {
        self.root().id
    }

    fn find_idea(&self, id: IdeaId) -> Option<&Idea> {
        self.root().find(id)
    }

    fn find_parent(&self, id: IdeaId) -> Option<&Idea> {
        self.root().find_parent(id)
    }

    /// Nearest sibling drawn above `id` (same side for children of the root)
    fn previous_sibling_id(&self, id: IdeaId) -> Option<IdeaId> {
        sibling_id(self.root(), id, true)
    }

    /// Nearest sibling drawn below `id` (same side for children of the root)
    fn next_sibling_id(&self, id: IdeaId) -> Option<IdeaId> {
        sibling_id(self.root(), id, false)
    }

    /// Deep copy of a subtree, ids untouched
    fn clone_idea(&self, id: IdeaId) -> Option<Idea> {
        self.find_idea(id).cloned()
    }

    fn update_title(&mut self, id: IdeaId, title: &str, session: Option<&str>) -> Result<(), ContentError>;

    fn add_sub_idea(&mut self, parent_id: IdeaId, title: &str, session: Option<&str>) -> Result<IdeaId, ContentError>;

    fn remove_sub_idea(&mut self, id: IdeaId, session: Option<&str>) -> Result<(), ContentError>;

    fn insert_intermediate(&mut self, id: IdeaId, title: &str, session: Option<&str>) -> Result<IdeaId, ContentError>;

    fn update_attr(&mut self, id: IdeaId, name: &str, value: Value, session: Option<&str>) -> Result<(), ContentError>;

    fn add_link(&mut self, from: IdeaId, to: IdeaId, session: Option<&str>) -> Result<(), ContentError>;

    fn remove_link(&mut self, from: IdeaId, to: IdeaId, session: Option<&str>) -> Result<(), ContentError>;

    fn paste(&mut self, parent_id: IdeaId, subtree: &Idea, session: Option<&str>) -> Result<IdeaId, ContentError>;

    fn move_relative(&mut self, id: IdeaId, delta: i32, session: Option<&str>) -> Result<(), ContentError>;

    fn undo(&mut self, session: Option<&str>) -> Result<(), ContentError>;

    fn redo(&mut self, session: Option<&str>) -> Result<(), ContentError>;

    /// Open a new notification queue; only changes made afterwards are queued
    fn subscribe(&mut self) -> SubscriptionId;

    fn unsubscribe(&mut self, subscription: SubscriptionId);

    /// Drain the queue of `subscription`, oldest first
    fn take_changes(&mut self, subscription: SubscriptionId) -> Vec<ChangeNotification>;
}

fn sibling_id(root: &Idea, id: IdeaId, above: bool) -> Option<IdeaId> {
    let parent = root.find_parent(id)?;
    let current = parent.child_rank(id)?;
    let is_root = parent.id == root.id;

    // Children of the root fan out from the center on both sides, so the
    // vertical order there follows the absolute rank.
    let order = |rank: Rank| if is_root { rank.abs() } else { rank };
    let same_side = |rank: Rank| !is_root || (rank < 0) == (current < 0);

    let candidates = parent.ideas.iter().filter(|(rank, _)| {
        same_side(**rank)
            && if above {
                order(**rank) < order(current)
            } else {
                order(**rank) > order(current)
            }
    });

    let nearest = if above {
        candidates.max_by_key(|(rank, _)| order(**rank))
    } else {
        candidates.min_by_key(|(rank, _)| order(**rank))
    };

    nearest.map(|(_, idea)| idea.id)
}
