//! # Map Model
//!
//! The editing surface a mind-map UI drives. It turns user commands into
//! tree commands, reconciles every tree change into renderer events and keeps
//! selection, clipboard and view state in step with the tree.
//!
//! ## Change handling
//!
//! ```text
//! command → IdeaStore → notification queue
//!                             ↓ process_changes()
//!           relayout → diff → events → reactions → selection/edit
//! ```
//!
//! The store is shared (`Rc<RefCell<_>>`) so the host can also apply remote
//! edits to it; the model picks those up on the next `process_changes()`.
//! Commands issued through the model process their own changes before
//! returning.
//!
//! ## Targets
//!
//! Operations on "the selected idea" take an optional explicit id and
//! otherwise use the selection. Attaching a tree selects its root; with
//! nothing selected and no id given they stop before touching the store.
//!
//! ## Input gate
//!
//! While input is disabled every gated operation returns without touching
//! anything or publishing any event. An accepted operation publishes exactly
//! one analytic event. `update_title` is the one editing command that stays
//! available, so an edit opened before input was disabled can be committed.

use crate::clipboard::{merge_style, Attachment, Clipboard};
use crate::config::{pick_title, MapModelConfig, RandomSource, SeededRandom, DEFAULT_TITLE};
use crate::events::{EventBus, EventKind, ListenerId, MapEvent};
use crate::layout::{Layout, LayoutCalculator, LinkLayout, Point};
use crate::layout_differ::LayoutChange;
use crate::pipeline::LayoutPipeline;
use crate::reactions::{AutoSelection, ChangeContext, Effect, Reaction, ReactionEngine};
use crate::selection::{navigate, Direction, SelectionTracker};
use crate::view::ViewTransform;
use mindmap_content::{
    is_local_session, ChangeNotification, Command, ContentError, IdeaId, IdeaStore, SubscriptionId,
    ATTR_ATTACHMENT, ATTR_COLLAPSED, ATTR_STYLE,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, trace};

/// Store the model is attached to, with its notification queue
struct BoundTree<S> {
    store: Rc<RefCell<S>>,
    subscription: SubscriptionId,
}

pub struct MapModel<S: IdeaStore> {
    config: MapModelConfig,
    random: Box<dyn RandomSource>,
    events: EventBus,
    input_enabled: bool,
    tree: Option<BoundTree<S>>,
    pipeline: LayoutPipeline,
    selection: SelectionTracker,
    last_auto_selection: Option<AutoSelection>,
    clipboard: Clipboard,
    view: ViewTransform,
    reactions: ReactionEngine,
}

impl<S: IdeaStore> MapModel<S> {
    pub fn new(config: MapModelConfig, calculator: impl LayoutCalculator + 'static) -> Self {
        Self {
            config,
            random: Box::new(SeededRandom::from_entropy()),
            events: EventBus::new(),
            input_enabled: true,
            tree: None,
            pipeline: LayoutPipeline::new(calculator),
            selection: SelectionTracker::new(),
            last_auto_selection: None,
            clipboard: Clipboard::new(),
            view: ViewTransform::default(),
            reactions: ReactionEngine::new(),
        }
    }

    /// Replace the source of placeholder-title randomness
    pub fn with_random(mut self, random: impl RandomSource + 'static) -> Self {
        self.random = Box::new(random);
        self
    }

    pub fn config(&self) -> &MapModelConfig {
        &self.config
    }

    pub fn add_event_listener(&mut self, kind: EventKind, listener: impl FnMut(&MapEvent) + 'static) -> ListenerId {
        self.events.subscribe(kind, listener)
    }

    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn register_reaction(&mut self, reaction: impl Reaction + 'static) {
        self.reactions.register(reaction);
    }

    pub fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
        self.events.publish(&MapEvent::InputEnabledChanged(enabled));
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn selected_id(&self) -> Option<IdeaId> {
        self.selection.selected()
    }

    pub fn current_layout(&self) -> Option<&Layout> {
        self.pipeline.last_layout()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn view_transform(&self) -> ViewTransform {
        self.view
    }

    // ---- Tree assignment and change processing ----

    /// Attach to a store, dropping all state tied to the previous one
    ///
    /// The layout cache starts empty, so every node of the new tree is
    /// reported as created. The root ends up selected.
    pub fn set_idea(&mut self, store: Rc<RefCell<S>>) {
        if let Some(previous) = self.tree.take() {
            previous.store.borrow_mut().unsubscribe(previous.subscription);
        }

        let subscription = store.borrow_mut().subscribe();
        self.pipeline.clear_cache();
        self.selection.clear();
        self.last_auto_selection = None;

        let (root_id, changes) = {
            let tree = store.borrow();
            debug!(root = tree.root_id(), "Attaching map model to tree");
            (tree.root_id(), self.pipeline.refresh(tree.root(), tree.links(), None))
        };
        self.tree = Some(BoundTree { store, subscription });
        self.publish_layout_changes(changes);
        self.change_selection(root_id);
    }

    /// Handle every queued tree change, oldest first
    pub fn process_changes(&mut self) {
        loop {
            let Some(tree) = &self.tree else {
                return;
            };
            let changes = tree.store.borrow_mut().take_changes(tree.subscription);
            if changes.is_empty() {
                return;
            }
            for change in &changes {
                self.handle_change(change);
            }
        }
    }

    fn handle_change(&mut self, change: &ChangeNotification) {
        let Some(store) = self.store() else {
            return;
        };
        let is_local = is_local_session(change.session(), self.config.session_id.as_deref());
        debug!(
            command = change.command.name(),
            session = ?change.session(),
            is_local,
            "Processing tree change"
        );

        // Keep the node the user is working on in place across a local relayout
        let anchor = match change.command {
            Command::UpdateAttr { .. } if is_local => self.target_id(None),
            _ => None,
        };

        let layout_changes = {
            let tree = store.borrow();
            self.pipeline.refresh(tree.root(), tree.links(), anchor)
        };
        self.publish_layout_changes(layout_changes);

        let effects = {
            let tree = store.borrow();
            let exists = |id: IdeaId| tree.find_idea(id).is_some();
            let context = ChangeContext {
                command: &change.command,
                is_local,
                selected: self.selection.selected(),
                last_auto_selection: self.last_auto_selection.take(),
                exists: &exists,
            };
            self.reactions.analyze(&context)
        };
        for effect in effects {
            self.apply_effect(effect);
        }

        self.repair_selection(&store);
    }

    fn apply_effect(&mut self, effect: Effect) {
        match effect {
            Effect::Select(id) => self.change_selection(id),
            Effect::AutoSelect(id) => {
                let previous = self.selection.selected();
                self.change_selection(id);
                self.last_auto_selection = Some(AutoSelection { selected: id, previous });
            }
            Effect::EditNew(id) => self.request_edit(id, true, true),
        }
    }

    /// Fall back to the root when the selected idea is gone
    fn repair_selection(&mut self, store: &Rc<RefCell<S>>) {
        let Some(selected) = self.selection.selected() else {
            return;
        };
        let root = {
            let tree = store.borrow();
            if tree.find_idea(selected).is_some() {
                return;
            }
            tree.root_id()
        };
        debug!(selected, root, "Selected idea disappeared");
        self.change_selection(root);
    }

    fn publish_layout_changes(&mut self, changes: Vec<LayoutChange>) {
        for change in changes {
            self.events.publish(&MapEvent::from(change));
        }
    }

    // ---- Gate and helpers ----

    fn store(&self) -> Option<Rc<RefCell<S>>> {
        self.tree.as_ref().map(|tree| Rc::clone(&tree.store))
    }

    fn accepts_input(&self, action: &str) -> bool {
        if !self.input_enabled {
            trace!(action, "Input disabled, ignoring");
        }
        self.input_enabled
    }

    fn publish_analytic(&mut self, action: &str, source: &str) {
        self.events.publish(&MapEvent::Analytic {
            component: self.config.analytic_component.clone(),
            action: action.to_string(),
            source: source.to_string(),
        });
    }

    /// Gate for operations that need a tree: the store when accepted
    fn begin(&mut self, action: &str, source: &str) -> Option<Rc<RefCell<S>>> {
        let store = self.store()?;
        if !self.accepts_input(action) {
            return None;
        }
        self.publish_analytic(action, source);
        Some(store)
    }

    /// Explicit id, else the selection
    fn target_id(&self, explicit: Option<IdeaId>) -> Option<IdeaId> {
        explicit.or_else(|| self.selection.selected())
    }

    /// Run one store command, then handle the changes it caused
    fn mutate<R>(
        &mut self,
        store: &Rc<RefCell<S>>,
        operation: &str,
        command: impl FnOnce(&mut S, Option<&str>) -> Result<R, ContentError>,
    ) -> Option<R> {
        let result = {
            let mut tree = store.borrow_mut();
            command(&mut *tree, self.config.session_id.as_deref())
        };
        self.process_changes();

        match result {
            Ok(value) => Some(value),
            Err(error) => {
                debug!(operation, %error, "Tree rejected command");
                None
            }
        }
    }

    fn change_selection(&mut self, id: IdeaId) {
        for transition in self.selection.select(id) {
            self.events.publish(&transition);
        }
    }

    fn request_edit(&mut self, id: IdeaId, select_all: bool, is_new: bool) {
        let placeholder = match &self.tree {
            Some(tree) => {
                let tree = tree.store.borrow();
                tree.find_idea(id)
                    .is_some_and(|idea| self.config.is_placeholder_title(&idea.title))
            }
            None => false,
        };
        self.events.publish(&MapEvent::NodeEditRequested {
            id,
            select_all: select_all || is_new || placeholder,
            is_new,
        });
    }

    fn random_title(&mut self, intermediate: bool) -> String {
        let titles = if intermediate {
            self.config.intermediary_titles()
        } else {
            self.config.titles.as_slice()
        };
        pick_title(titles, self.random.as_mut()).unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    fn ensure_expanded(&mut self, store: &Rc<RefCell<S>>, id: IdeaId) {
        let collapsed = store.borrow().find_idea(id).is_some_and(|idea| idea.is_collapsed());
        if collapsed {
            self.mutate(store, "expand", |tree, session| {
                tree.update_attr(id, ATTR_COLLAPSED, Value::Bool(false), session)
            });
        }
    }

    // ---- Selection ----

    /// Select an idea; does nothing when it is already selected
    pub fn select_node(&mut self, id: IdeaId) {
        if self.tree.is_none() || !self.accepts_input("selectNode") {
            return;
        }
        self.change_selection(id);
    }

    /// Drop the selection; targeted operations do nothing until the next select
    pub fn clear_selection(&mut self) {
        if self.tree.is_none() || !self.accepts_input("clearSelection") {
            return;
        }
        if let Some(transition) = self.selection.deselect() {
            self.events.publish(&transition);
        }
    }

    pub fn select_node_left(&mut self, source: &str) {
        self.select_node_towards(source, Direction::Left);
    }

    pub fn select_node_right(&mut self, source: &str) {
        self.select_node_towards(source, Direction::Right);
    }

    pub fn select_node_up(&mut self, source: &str) {
        self.select_node_towards(source, Direction::Up);
    }

    pub fn select_node_down(&mut self, source: &str) {
        self.select_node_towards(source, Direction::Down);
    }

    fn select_node_towards(&mut self, source: &str, direction: Direction) {
        let Some(store) = self.begin(direction.action(), source) else {
            return;
        };
        let Some(current) = self.target_id(None) else {
            trace!(?direction, "Nothing selected to navigate from");
            return;
        };

        let navigation = {
            let tree = store.borrow();
            self.pipeline.last_layout().and_then(|layout| {
                navigate(&*tree, layout, current, direction, self.config.horizontal_selection_threshold)
            })
        };
        let Some(navigation) = navigation else {
            trace!(current, ?direction, "Nowhere to navigate");
            return;
        };

        if let Some(id) = navigation.expand {
            self.mutate(&store, "expand", |tree, session| {
                tree.update_attr(id, ATTR_COLLAPSED, Value::Bool(false), session)
            });
        }
        self.change_selection(navigation.target);
    }

    pub fn select_link(&mut self, link: &LinkLayout, point: Point) {
        if self.tree.is_none() || !self.accepts_input("selectLink") {
            return;
        }
        self.events.publish(&MapEvent::LinkSelected {
            link: link.clone(),
            point,
        });
    }

    // ---- Editing ----

    /// Ask the renderer to open an idea (default: selected) for editing
    pub fn edit_node(&mut self, source: &str, id: Option<IdeaId>, select_all: bool, is_new: bool) {
        if self.begin("editNode", source).is_none() {
            return;
        }
        let Some(id) = self.target_id(id) else {
            trace!("Nothing selected to edit");
            return;
        };
        self.request_edit(id, select_all, is_new);
    }

    /// Commit a title; not gated by input
    pub fn update_title(&mut self, id: IdeaId, title: &str) {
        let Some(store) = self.store() else {
            return;
        };
        self.mutate(&store, "updateTitle", |tree, session| tree.update_title(id, title, session));
    }

    pub fn add_sub_idea(&mut self, source: &str, parent_id: Option<IdeaId>) {
        let Some(store) = self.begin("addSubIdea", source) else {
            return;
        };
        let Some(parent) = self.target_id(parent_id) else {
            return;
        };
        self.ensure_expanded(&store, parent);
        let title = self.random_title(false);
        self.mutate(&store, "addSubIdea", |tree, session| tree.add_sub_idea(parent, &title, session));
    }

    /// Add a sibling of the selected idea (a child when the root is selected)
    pub fn add_sibling_idea(&mut self, source: &str) {
        let Some(store) = self.begin("addSiblingIdea", source) else {
            return;
        };
        let Some(target) = self.target_id(None) else {
            return;
        };
        let parent = {
            let tree = store.borrow();
            tree.find_parent(target).map_or_else(|| tree.root_id(), |parent| parent.id)
        };
        self.ensure_expanded(&store, parent);
        let title = self.random_title(false);
        self.mutate(&store, "addSiblingIdea", |tree, session| tree.add_sub_idea(parent, &title, session));
    }

    pub fn remove_sub_idea(&mut self, source: &str, id: Option<IdeaId>) {
        let Some(store) = self.begin("removeSubIdea", source) else {
            return;
        };
        let Some(id) = self.target_id(id) else {
            return;
        };
        self.mutate(&store, "removeSubIdea", |tree, session| tree.remove_sub_idea(id, session));
    }

    /// Insert an idea between the selected idea and its parent
    ///
    /// Nothing happens, not even the analytic event, unless a non-root idea
    /// is selected.
    pub fn insert_intermediate(&mut self, source: &str) {
        let Some(store) = self.store() else {
            return;
        };
        if !self.accepts_input("insertIntermediate") {
            return;
        }
        let root_id = store.borrow().root_id();
        let Some(id) = self.selection.selected().filter(|id| *id != root_id) else {
            trace!("No selection to insert an intermediate for");
            return;
        };

        self.publish_analytic("insertIntermediate", source);
        let title = self.random_title(true);
        self.mutate(&store, "insertIntermediate", |tree, session| {
            tree.insert_intermediate(id, &title, session)
        });
    }

    /// Collapse or expand the selected idea; leaves are left alone
    pub fn collapse(&mut self, source: &str, collapsed: bool) {
        let Some(store) = self.begin(&format!("collapse:{collapsed}"), source) else {
            return;
        };
        let Some(id) = self.target_id(None) else {
            return;
        };
        let has_children = store.borrow().find_idea(id).is_some_and(|idea| idea.has_children());
        if !has_children {
            return;
        }
        self.mutate(&store, "collapse", |tree, session| {
            tree.update_attr(id, ATTR_COLLAPSED, Value::Bool(collapsed), session)
        });
    }

    /// Set one style property on the selected idea
    ///
    /// The new value is merged into the idea's existing style. Nothing is
    /// written when the layout already shows that value.
    pub fn update_style(&mut self, source: &str, property: &str, value: Value) {
        let Some(store) = self.begin(&format!("updateStyle:{property}"), source) else {
            return;
        };
        let Some(id) = self.target_id(None) else {
            return;
        };
        if self.style_of(id, property).as_ref() == Some(&value) {
            return;
        }

        let Some(mut style) = store.borrow().find_idea(id).map(|idea| idea.style()) else {
            return;
        };
        style.insert(property.to_string(), value);
        self.mutate(&store, "updateStyle", |tree, session| {
            tree.update_attr(id, ATTR_STYLE, Value::Object(style), session)
        });
    }

    /// Style property of the selected idea, as laid out
    pub fn get_selected_style(&self, property: &str) -> Option<Value> {
        self.target_id(None).and_then(|id| self.style_of(id, property))
    }

    fn style_of(&self, id: IdeaId, property: &str) -> Option<Value> {
        self.pipeline
            .last_layout()
            .and_then(|layout| layout.node(id))
            .and_then(|node| node.style_property(property))
            .cloned()
    }

    pub fn move_relative(&mut self, source: &str, delta: i32) {
        let Some(store) = self.begin("moveRelative", source) else {
            return;
        };
        let Some(id) = self.target_id(None) else {
            return;
        };
        self.mutate(&store, "moveRelative", |tree, session| tree.move_relative(id, delta, session));
    }

    pub fn undo(&mut self, source: &str) {
        let Some(store) = self.begin("undo", source) else {
            return;
        };
        self.mutate(&store, "undo", |tree, session| tree.undo(session));
    }

    pub fn redo(&mut self, source: &str) {
        let Some(store) = self.begin("redo", source) else {
            return;
        };
        self.mutate(&store, "redo", |tree, session| tree.redo(session));
    }

    // ---- Links ----

    /// Link the selected idea to `to`
    pub fn add_link(&mut self, source: &str, to: IdeaId) {
        let Some(store) = self.begin("addLink", source) else {
            return;
        };
        let Some(from) = self.target_id(None) else {
            return;
        };
        self.mutate(&store, "addLink", |tree, session| tree.add_link(from, to, session));
    }

    pub fn remove_link(&mut self, source: &str, from: IdeaId, to: IdeaId) {
        let Some(store) = self.begin("removeLink", source) else {
            return;
        };
        self.mutate(&store, "removeLink", |tree, session| tree.remove_link(from, to, session));
    }

    // ---- Clipboard and attachments ----

    /// Clone an idea (default: selected) into the clipboard
    pub fn copy(&mut self, source: &str, id: Option<IdeaId>) {
        let Some(store) = self.begin("copy", source) else {
            return;
        };
        let Some(id) = self.target_id(id) else {
            trace!("Nothing selected to copy");
            return;
        };
        let cloned = store.borrow().clone_idea(id);
        if let Some(idea) = cloned {
            self.clipboard.copy(idea);
        }
    }

    /// Copy the selected idea, then remove it right away
    pub fn cut(&mut self, source: &str) {
        let Some(store) = self.begin("cut", source) else {
            return;
        };
        let Some(id) = self.target_id(None) else {
            return;
        };
        let Some(idea) = store.borrow().clone_idea(id) else {
            return;
        };
        self.clipboard.cut(idea, id);
        self.mutate(&store, "cut", |tree, session| tree.remove_sub_idea(id, session));
    }

    /// Paste the clipboard under the selected idea
    pub fn paste(&mut self, source: &str) {
        let Some(store) = self.begin("paste", source) else {
            return;
        };
        let Some(content) = self.clipboard.content().cloned() else {
            trace!("Clipboard is empty");
            return;
        };
        let Some(parent) = self.target_id(None) else {
            return;
        };
        self.mutate(&store, "paste", |tree, session| tree.paste(parent, &content, session));
    }

    /// Merge the clipboard root's style into the selected idea's style
    pub fn paste_style(&mut self, source: &str) {
        let Some(store) = self.begin("pasteStyle", source) else {
            return;
        };
        let Some(clipboard_style) = self.clipboard.style() else {
            return;
        };
        let Some(id) = self.target_id(None) else {
            return;
        };
        let Some(existing) = store.borrow().find_idea(id).map(|idea| idea.style()) else {
            return;
        };
        let merged = merge_style(&existing, &clipboard_style);
        self.mutate(&store, "pasteStyle", |tree, session| {
            tree.update_attr(id, ATTR_STYLE, Value::Object(merged), session)
        });
    }

    pub fn set_attachment(&mut self, source: &str, id: IdeaId, attachment: &Attachment) {
        let Some(store) = self.begin("setAttachment", source) else {
            return;
        };
        let value = attachment.to_attr_value();
        self.mutate(&store, "setAttachment", |tree, session| {
            tree.update_attr(id, ATTR_ATTACHMENT, value, session)
        });
    }

    /// Ask the UI to show the attachment of an idea (default: selected)
    pub fn open_attachment(&mut self, source: &str, id: Option<IdeaId>) {
        if self.begin("openAttachment", source).is_none() {
            return;
        }
        let Some(id) = self.target_id(id) else {
            return;
        };
        let attachment = self
            .pipeline
            .last_layout()
            .and_then(|layout| layout.node(id))
            .and_then(|node| node.attr.get(ATTR_ATTACHMENT))
            .cloned();
        self.events.publish(&MapEvent::AttachmentOpened { id, attachment });
    }

    // ---- View ----

    pub fn scale_up(&mut self, source: &str) {
        if self.accepts_input("scaleUp") {
            self.publish_analytic("scaleUp", source);
            self.apply_scale(self.config.scale_up_factor, None);
        }
    }

    pub fn scale_down(&mut self, source: &str) {
        if self.accepts_input("scaleDown") {
            self.publish_analytic("scaleDown", source);
            self.apply_scale(self.config.scale_down_factor, None);
        }
    }

    pub fn scale(&mut self, source: &str, factor: f64, zoom_point: Option<Point>) {
        if self.accepts_input("scale") {
            self.publish_analytic("scale", source);
            self.apply_scale(factor, zoom_point);
        }
    }

    fn apply_scale(&mut self, factor: f64, zoom_point: Option<Point>) {
        self.view.scale_by(factor);
        self.events.publish(&MapEvent::MapScaleChanged {
            scale: factor,
            zoom_point,
        });
    }

    /// Pan the map
    pub fn move_map(&mut self, source: &str, dx: f64, dy: f64) {
        if self.accepts_input("move") {
            self.publish_analytic("move", source);
            self.view.move_by(dx, dy);
            self.events.publish(&MapEvent::MapMoveRequested { dx, dy });
        }
    }

    pub fn reset_view(&mut self, source: &str) {
        if self.accepts_input("resetView") {
            self.publish_analytic("resetView", source);
            self.view.reset();
            self.events.publish(&MapEvent::MapViewResetRequested);
        }
    }
}

impl<S: IdeaStore> std::fmt::Debug for MapModel<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapModel")
            .field("input_enabled", &self.input_enabled)
            .field("attached", &self.tree.is_some())
            .field("selected", &self.selection.selected())
            .field("view", &self.view)
            .finish_non_exhaustive()
    }
}
