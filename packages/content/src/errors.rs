//! Error types for the content store

use crate::idea::IdeaId;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContentError {
    #[error("Idea not found: {0}")]
    IdeaNotFound(IdeaId),

    #[error("Idea {0} has no parent")]
    NoParent(IdeaId),

    #[error("Invalid link {from} -> {to}")]
    InvalidLink { from: IdeaId, to: IdeaId },

    #[error("Link not found: {from} -> {to}")]
    LinkNotFound { from: IdeaId, to: IdeaId },

    #[error("Command would not change anything")]
    NoChange,

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}
