//! # Mind Map Editor
//!
//! Change reconciliation for a mind-map editor.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ content: idea tree + session-tagged commands│
//! └─────────────────────────────────────────────┘
//!                     ↓ change notifications
//! ┌─────────────────────────────────────────────┐
//! │ editor: MapModel                            │
//! │  - Input gate + analytic trace              │
//! │  - Relayout and diff into renderer events   │
//! │  - Local-session reactions (select, edit)   │
//! │  - Selection, clipboard, view transform     │
//! └─────────────────────────────────────────────┘
//!                     ↓ MapEvent
//! ┌─────────────────────────────────────────────┐
//! │ renderer / UI                               │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The tree is the source of truth**: layouts and events are derived
//! 2. **Layouts come from outside**: any `LayoutCalculator` will do
//! 3. **Local reactions only**: remote edits never steal focus
//! 4. **Silent no-ops**: nothing to do is not an error
//!
//! ## Usage
//!
//! ```rust
//! use mindmap_content::{Content, Idea, Link};
//! use mindmap_editor::{EventKind, Layout, MapEvent, MapModel, MapModelConfig, NodeLayout};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let calculator = |root: &Idea, _: &[Link]| {
//!     Layout::from_nodes(root.ids().into_iter().map(|id| NodeLayout::new(id, 0.0, id as f64 * 20.0, "")))
//! };
//! let store = Rc::new(RefCell::new(Content::new(Idea::new(1, "center"))));
//!
//! let mut model = MapModel::new(MapModelConfig::default(), calculator);
//! model.set_idea(Rc::clone(&store));
//!
//! let created = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&created);
//! model.add_event_listener(EventKind::NodeCreated, move |event| {
//!     if let MapEvent::NodeCreated(node) = event {
//!         sink.borrow_mut().push(node.id);
//!     }
//! });
//!
//! model.add_sub_idea("toolbar", None);
//!
//! assert_eq!(*created.borrow(), vec![2]);
//! assert_eq!(model.selected_id(), Some(2));
//! ```

mod clipboard;
mod config;
mod errors;
mod events;
mod layout;
mod layout_differ;
mod map_model;
mod pipeline;
mod reactions;
mod selection;
mod view;

pub use clipboard::{merge_style, Attachment, Clipboard};
pub use config::{pick_title, MapModelConfig, RandomSource, SeededRandom, DEFAULT_TITLE};
pub use errors::EditorError;
pub use events::{EventBus, EventKind, ListenerId, MapEvent};
pub use layout::{Layout, LayoutCalculator, LinkLayout, NodeLayout, Point};
pub use layout_differ::{diff_layouts, LayoutChange};
pub use map_model::MapModel;
pub use pipeline::LayoutPipeline;
pub use reactions::{
    AutoSelection, ChangeContext, EditNewIdea, Effect, Reaction, ReactionEngine, RestoreSelectionOnUndo,
    SelectParentOfRemoved, SelectPastedIdea,
};
pub use selection::{navigate, Direction, Navigation, SelectionTracker};
pub use view::ViewTransform;
