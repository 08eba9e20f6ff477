//! # Primitive Operations
//!
//! Every content command is expressed as a short sequence of primitive
//! operations. Applying an operation returns its inverse, which is what the
//! undo stack records.
//!
//! Operations are deliberately coarse: child lists and link lists are
//! replaced wholesale, so inverses never need to reason about ranks or ids.

use crate::errors::ContentError;
use crate::idea::{Idea, IdeaId, Link, Rank};
use serde_json::Value;
use std::collections::BTreeMap;

/// The mutable state a content store owns
#[derive(Debug, Clone, PartialEq)]
pub struct TreeState {
    pub root: Idea,
    pub links: Vec<Link>,
}

/// Invertible primitive edits on a `TreeState`
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    SetTitle {
        id: IdeaId,
        title: String,
    },

    /// `None` removes the attribute
    SetAttr {
        id: IdeaId,
        name: String,
        value: Option<Value>,
    },

    ReplaceChildren {
        parent_id: IdeaId,
        children: BTreeMap<Rank, Idea>,
    },

    ReplaceLinks {
        links: Vec<Link>,
    },
}

impl Operation {
    /// Apply to `state`, returning the operation that undoes it
    pub fn apply(&self, state: &mut TreeState) -> Result<Operation, ContentError> {
        match self {
            Operation::SetTitle { id, title } => {
                let idea = find_mut(state, *id)?;
                let previous = std::mem::replace(&mut idea.title, title.clone());
                Ok(Operation::SetTitle {
                    id: *id,
                    title: previous,
                })
            }

            Operation::SetAttr { id, name, value } => {
                let idea = find_mut(state, *id)?;
                let previous = match value {
                    Some(value) => idea.attr.insert(name.clone(), value.clone()),
                    None => idea.attr.remove(name),
                };
                Ok(Operation::SetAttr {
                    id: *id,
                    name: name.clone(),
                    value: previous,
                })
            }

            Operation::ReplaceChildren {
                parent_id,
                children,
            } => {
                let parent = find_mut(state, *parent_id)?;
                let previous = std::mem::replace(&mut parent.ideas, children.clone());
                Ok(Operation::ReplaceChildren {
                    parent_id: *parent_id,
                    children: previous,
                })
            }

            Operation::ReplaceLinks { links } => {
                let previous = std::mem::replace(&mut state.links, links.clone());
                Ok(Operation::ReplaceLinks { links: previous })
            }
        }
    }

    /// Debug name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Operation::SetTitle { .. } => "setTitle",
            Operation::SetAttr { .. } => "setAttr",
            Operation::ReplaceChildren { .. } => "replaceChildren",
            Operation::ReplaceLinks { .. } => "replaceLinks",
        }
    }
}

fn find_mut(state: &mut TreeState, id: IdeaId) -> Result<&mut Idea, ContentError> {
    state
        .root
        .find_mut(id)
        .ok_or(ContentError::IdeaNotFound(id))
}
