//! # Map Events
//!
//! Everything the map model tells renderers and other UI collaborators.
//! Listeners register per event kind and are called synchronously, in
//! registration order, while the model operation that raised the event is
//! still running.

use crate::layout::{LinkLayout, NodeLayout, Point};
use crate::layout_differ::LayoutChange;
use mindmap_content::IdeaId;
use serde_json::Value;
use std::collections::HashMap;

/// Topic a listener subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    InputEnabledChanged,
    NodeCreated,
    NodeMoved,
    NodeRemoved,
    NodeTitleChanged,
    NodeAttrChanged,
    LinkCreated,
    LinkRemoved,
    LinkSelected,
    NodeSelectionChanged,
    NodeEditRequested,
    AttachmentOpened,
    MapScaleChanged,
    MapMoveRequested,
    MapViewResetRequested,
    Analytic,
}

impl EventKind {
    /// Event name as exposed to script-facing hosts
    pub fn name(self) -> &'static str {
        match self {
            EventKind::InputEnabledChanged => "inputEnabledChanged",
            EventKind::NodeCreated => "nodeCreated",
            EventKind::NodeMoved => "nodeMoved",
            EventKind::NodeRemoved => "nodeRemoved",
            EventKind::NodeTitleChanged => "nodeTitleChanged",
            EventKind::NodeAttrChanged => "nodeAttrChanged",
            EventKind::LinkCreated => "linkCreated",
            EventKind::LinkRemoved => "linkRemoved",
            EventKind::LinkSelected => "linkSelected",
            EventKind::NodeSelectionChanged => "nodeSelectionChanged",
            EventKind::NodeEditRequested => "nodeEditRequested",
            EventKind::AttachmentOpened => "attachmentOpened",
            EventKind::MapScaleChanged => "mapScaleChanged",
            EventKind::MapMoveRequested => "mapMoveRequested",
            EventKind::MapViewResetRequested => "mapViewResetRequested",
            EventKind::Analytic => "analytic",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    InputEnabledChanged(bool),
    NodeCreated(NodeLayout),
    /// Absolute position, or the compensated one after a relayout
    NodeMoved(NodeLayout),
    NodeRemoved(NodeLayout),
    NodeTitleChanged(NodeLayout),
    NodeAttrChanged(NodeLayout),
    LinkCreated(LinkLayout),
    LinkRemoved(LinkLayout),
    LinkSelected {
        link: LinkLayout,
        point: Point,
    },
    NodeSelectionChanged {
        id: IdeaId,
        selected: bool,
    },
    NodeEditRequested {
        id: IdeaId,
        select_all: bool,
        is_new: bool,
    },
    AttachmentOpened {
        id: IdeaId,
        attachment: Option<Value>,
    },
    MapScaleChanged {
        scale: f64,
        zoom_point: Option<Point>,
    },
    MapMoveRequested {
        dx: f64,
        dy: f64,
    },
    MapViewResetRequested,
    Analytic {
        component: String,
        action: String,
        source: String,
    },
}

impl MapEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            MapEvent::InputEnabledChanged(_) => EventKind::InputEnabledChanged,
            MapEvent::NodeCreated(_) => EventKind::NodeCreated,
            MapEvent::NodeMoved(_) => EventKind::NodeMoved,
            MapEvent::NodeRemoved(_) => EventKind::NodeRemoved,
            MapEvent::NodeTitleChanged(_) => EventKind::NodeTitleChanged,
            MapEvent::NodeAttrChanged(_) => EventKind::NodeAttrChanged,
            MapEvent::LinkCreated(_) => EventKind::LinkCreated,
            MapEvent::LinkRemoved(_) => EventKind::LinkRemoved,
            MapEvent::LinkSelected { .. } => EventKind::LinkSelected,
            MapEvent::NodeSelectionChanged { .. } => EventKind::NodeSelectionChanged,
            MapEvent::NodeEditRequested { .. } => EventKind::NodeEditRequested,
            MapEvent::AttachmentOpened { .. } => EventKind::AttachmentOpened,
            MapEvent::MapScaleChanged { .. } => EventKind::MapScaleChanged,
            MapEvent::MapMoveRequested { .. } => EventKind::MapMoveRequested,
            MapEvent::MapViewResetRequested => EventKind::MapViewResetRequested,
            MapEvent::Analytic { .. } => EventKind::Analytic,
        }
    }
}

impl From<LayoutChange> for MapEvent {
    fn from(change: LayoutChange) -> Self {
        match change {
            LayoutChange::NodeCreated(node) => MapEvent::NodeCreated(node),
            LayoutChange::NodeRemoved(node) => MapEvent::NodeRemoved(node),
            LayoutChange::NodeMoved(node) => MapEvent::NodeMoved(node),
            LayoutChange::NodeTitleChanged(node) => MapEvent::NodeTitleChanged(node),
            LayoutChange::NodeAttrChanged(node) => MapEvent::NodeAttrChanged(node),
            LayoutChange::LinkCreated(link) => MapEvent::LinkCreated(link),
            LayoutChange::LinkRemoved(link) => MapEvent::LinkRemoved(link),
        }
    }
}

/// Handle returned by `EventBus::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&MapEvent)>;

/// Named-topic publish/subscribe
#[derive(Default)]
pub struct EventBus {
    listeners: HashMap<EventKind, Vec<(ListenerId, Listener)>>,
    next_id: u64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: EventKind, listener: impl FnMut(&MapEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Returns false when `id` was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        for listeners in self.listeners.values_mut() {
            let before = listeners.len();
            listeners.retain(|(listener_id, _)| *listener_id != id);
            if listeners.len() != before {
                return true;
            }
        }
        false
    }

    pub fn publish(&mut self, event: &MapEvent) {
        tracing::trace!(event = event.kind().name(), "Dispatching map event");
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.listeners.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}
