//! # Reactions
//!
//! Tree changes can call for follow-up UI work on the local side. For example:
//! - A new idea was added → select it and open it for editing
//! - An idea was pasted → select it
//! - The selected idea was removed → select its former parent
//! - An auto-selection was undone → go back to what was selected before
//!
//! Reactions only look at the change and the selection; they never mutate the
//! tree. Each one returns the effects it wants, and the map model applies them
//! in registration order.

use mindmap_content::{Command, IdeaId};

/// Selection made by a reaction, remembered so undo can revert it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSelection {
    pub selected: IdeaId,
    pub previous: Option<IdeaId>,
}

/// What a reaction sees of one processed change
pub struct ChangeContext<'a> {
    pub command: &'a Command,
    /// Issued by this session (or untagged)
    pub is_local: bool,
    pub selected: Option<IdeaId>,
    /// Auto-selection made while handling the previous change, if any
    pub last_auto_selection: Option<AutoSelection>,
    /// Whether an idea exists after the change
    pub exists: &'a dyn Fn(IdeaId) -> bool,
}

impl ChangeContext<'_> {
    fn selection_lost(&self) -> bool {
        self.selected.is_some_and(|id| !(self.exists)(id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Select without remembering it as an auto-selection
    Select(IdeaId),
    /// Select and remember the previous selection
    AutoSelect(IdeaId),
    /// Open an idea for editing as a brand-new node
    EditNew(IdeaId),
}

/// Follow-up triggered by a processed change
pub trait Reaction: std::fmt::Debug {
    fn react(&self, change: &ChangeContext<'_>) -> Vec<Effect>;
}

/// Select and edit ideas the local user just created
#[derive(Debug)]
pub struct EditNewIdea;

impl Reaction for EditNewIdea {
    fn react(&self, change: &ChangeContext<'_>) -> Vec<Effect> {
        if !change.is_local {
            return vec![];
        }
        match change.command {
            Command::AddSubIdea { new_id, .. } | Command::InsertIntermediate { new_id, .. }
                if (change.exists)(*new_id) =>
            {
                vec![Effect::AutoSelect(*new_id), Effect::EditNew(*new_id)]
            }
            _ => vec![],
        }
    }
}

/// Select what the local user just pasted
#[derive(Debug)]
pub struct SelectPastedIdea;

impl Reaction for SelectPastedIdea {
    fn react(&self, change: &ChangeContext<'_>) -> Vec<Effect> {
        match change.command {
            Command::Paste { new_id, .. } if change.is_local && (change.exists)(*new_id) => {
                vec![Effect::AutoSelect(*new_id)]
            }
            _ => vec![],
        }
    }
}

/// Move the selection to the parent when the selected idea is removed
#[derive(Debug)]
pub struct SelectParentOfRemoved;

impl Reaction for SelectParentOfRemoved {
    fn react(&self, change: &ChangeContext<'_>) -> Vec<Effect> {
        match change.command {
            Command::RemoveSubIdea { parent_id, .. } if change.selection_lost() && (change.exists)(*parent_id) => {
                vec![Effect::Select(*parent_id)]
            }
            _ => vec![],
        }
    }
}

/// Undoing a change that auto-selected an idea restores the earlier selection
#[derive(Debug)]
pub struct RestoreSelectionOnUndo;

impl Reaction for RestoreSelectionOnUndo {
    fn react(&self, change: &ChangeContext<'_>) -> Vec<Effect> {
        if !change.is_local || !matches!(change.command, Command::Undo) {
            return vec![];
        }
        match change.last_auto_selection {
            Some(AutoSelection {
                selected,
                previous: Some(previous),
            }) if change.selected == Some(selected) && (change.exists)(previous) => {
                vec![Effect::Select(previous)]
            }
            _ => vec![],
        }
    }
}

/// Runs every registered reaction against a change
#[derive(Debug)]
pub struct ReactionEngine {
    reactions: Vec<Box<dyn Reaction>>,
}

impl ReactionEngine {
    /// Create engine with the default reactions
    pub fn new() -> Self {
        Self {
            reactions: vec![
                Box::new(EditNewIdea),
                Box::new(SelectPastedIdea),
                Box::new(SelectParentOfRemoved),
                Box::new(RestoreSelectionOnUndo),
            ],
        }
    }

    /// Engine with no reactions
    pub fn empty() -> Self {
        Self { reactions: Vec::new() }
    }

    pub fn register(&mut self, reaction: impl Reaction + 'static) {
        self.reactions.push(Box::new(reaction));
    }

    /// Collect the effects of every reaction, in registration order
    pub fn analyze(&self, change: &ChangeContext<'_>) -> Vec<Effect> {
        let mut effects = Vec::new();

        for reaction in &self.reactions {
            let mut reaction_effects = reaction.react(change);
            if !reaction_effects.is_empty() {
                tracing::debug!(reaction = ?reaction, effects = ?reaction_effects, "Reaction triggered");
            }
            effects.append(&mut reaction_effects);
        }

        effects
    }
}

impl Default for ReactionEngine {
    fn default() -> Self {
        Self::new()
    }
}
