//! # Mind Map Content
//!
//! The idea tree that a map model edits and observes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ IdeaStore: interface the map model consumes │
//! │  - Lookups (find, parent, siblings)         │
//! │  - Session-tagged commands                  │
//! │  - Change notification queues               │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Content: in-memory implementation           │
//! │  - Commands → invertible operations         │
//! │  - Undo/redo batches                        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use mindmap_content::{Command, Content, Idea, IdeaStore};
//!
//! let mut content = Content::new(Idea::new(1, "center"));
//! let subscription = content.subscribe();
//!
//! let id = content.add_sub_idea(1, "first", Some("session-a")).unwrap();
//!
//! let changes = content.take_changes(subscription);
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].session(), Some("session-a"));
//! assert!(matches!(changes[0].command, Command::AddSubIdea { new_id, .. } if new_id == id));
//! ```

mod command;
mod content;
mod errors;
mod idea;
mod operations;
mod session;
mod store;
mod undo_stack;

pub use command::{ChangeNotification, Command};
pub use content::Content;
pub use errors::ContentError;
pub use idea::{Idea, IdeaId, Link, Rank, ATTR_ATTACHMENT, ATTR_COLLAPSED, ATTR_STYLE};
pub use operations::{Operation, TreeState};
pub use session::{is_local_session, SessionId};
pub use store::{IdeaStore, SubscriptionId};
pub use undo_stack::{OperationBatch, UndoStack};
