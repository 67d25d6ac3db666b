//! In-memory page, virtual clock and capability doubles.
//!
//! Lets the page features run outside a browser: in tests, and in hosts
//! that pre-render or check pages. Time only moves through
//! [`ManualTimers::advance`], and async clipboard writes complete on
//! [`MemoryClipboard::settle`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

use crate::clipboard::AsyncClipboard;
use crate::document::{Document, ReadyState};
use crate::error::{ClipboardError, ObserverError};
use crate::platform::Timers;
use crate::reveal::{ObserverOptions, VisibilityObserver};

/// Handle to a node of a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Behavior of the legacy copy command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyCommand {
    /// Copies the selected text and returns true
    #[default]
    Works,
    /// Returns false without copying
    Unsupported,
    /// Throws
    Throws,
}

#[derive(Debug, Default)]
struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    styles: BTreeMap<String, String>,
    inner_html: String,
    text: String,
    value: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    hidden: bool,
    top: f64,
    removed: bool,
}

struct Page {
    title: String,
    ready_state: ReadyState,
    viewport_height: f64,
    nodes: Vec<NodeData>,
    focused: Option<NodeId>,
    selection: Option<NodeId>,
    copy_command: CopyCommand,
    copied: Option<String>,
    content_loaded: Vec<Box<dyn FnOnce()>>,
    load: Vec<Box<dyn FnOnce()>>,
    input_handlers: Vec<(NodeId, Rc<dyn Fn(String)>)>,
    key_handlers: Vec<(NodeId, Rc<dyn Fn(&str)>)>,
}

/// A page held in memory.
///
/// Document order is creation order. Starts in [`ReadyState::Interactive`]
/// with an 800px viewport.
pub struct MemoryDocument {
    page: RefCell<Page>,
}

impl MemoryDocument {
    pub fn new(title: &str) -> Self {
        Self {
            page: RefCell::new(Page {
                title: title.to_string(),
                ready_state: ReadyState::Interactive,
                viewport_height: 800.0,
                nodes: Vec::new(),
                focused: None,
                selection: None,
                copy_command: CopyCommand::Works,
                copied: None,
                content_loaded: Vec::new(),
                load: Vec::new(),
                input_handlers: Vec::new(),
                key_handlers: Vec::new(),
            }),
        }
    }

    /// Create an element under `parent` (or the body).
    pub fn create(&self, tag: &str, parent: Option<NodeId>) -> NodeId {
        let mut page = self.page.borrow_mut();
        let id = NodeId(page.nodes.len());
        page.nodes.push(NodeData {
            tag: tag.to_string(),
            parent,
            ..Default::default()
        });
        if let Some(parent) = parent {
            page.nodes[parent.0].children.push(id);
        }
        id
    }

    pub fn set_id(&self, node: &NodeId, id: &str) {
        self.page.borrow_mut().nodes[node.0].id = Some(id.to_string());
    }

    pub fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        self.page.borrow_mut().nodes[node.0]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Set the node's own text; descendants contribute theirs to `text_content`.
    pub fn set_text(&self, node: &NodeId, text: &str) {
        self.page.borrow_mut().nodes[node.0].text = text.to_string();
    }

    pub fn set_top(&self, node: &NodeId, top: f64) {
        self.page.borrow_mut().nodes[node.0].top = top;
    }

    pub fn set_viewport_height(&self, height: f64) {
        self.page.borrow_mut().viewport_height = height;
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.page.borrow_mut().ready_state = state;
    }

    pub fn set_copy_command(&self, command: CopyCommand) {
        self.page.borrow_mut().copy_command = command;
    }

    pub fn focus(&self, node: &NodeId) {
        self.page.borrow_mut().focused = Some(*node);
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.page.borrow().focused
    }

    /// Text most recently placed on the clipboard by the copy command.
    pub fn copied_text(&self) -> Option<String> {
        self.page.borrow().copied.clone()
    }

    pub fn classes(&self, node: &NodeId) -> Vec<String> {
        self.page.borrow().nodes[node.0].classes.clone()
    }

    pub fn style(&self, node: &NodeId, property: &str) -> Option<String> {
        self.page.borrow().nodes[node.0].styles.get(property).cloned()
    }

    /// Event handlers registered so far, of every kind.
    pub fn listener_count(&self) -> usize {
        let page = self.page.borrow();
        page.content_loaded.len()
            + page.load.len()
            + page.input_handlers.len()
            + page.key_handlers.len()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<NodeId> {
        self.select(|node| node.tag == tag)
    }

    /// Parse finished: switch to interactive and run content-loaded handlers.
    pub fn fire_content_loaded(&self) {
        let handlers = {
            let mut page = self.page.borrow_mut();
            page.ready_state = ReadyState::Interactive;
            std::mem::take(&mut page.content_loaded)
        };
        for handler in handlers {
            handler();
        }
    }

    /// Full load: switch to complete and run load handlers.
    pub fn fire_load(&self) {
        let handlers = {
            let mut page = self.page.borrow_mut();
            page.ready_state = ReadyState::Complete;
            std::mem::take(&mut page.load)
        };
        for handler in handlers {
            handler();
        }
    }

    /// Replace a field's value as the user would, firing input handlers.
    pub fn type_text(&self, node: &NodeId, value: &str) {
        let handlers: Vec<_> = {
            let mut page = self.page.borrow_mut();
            page.nodes[node.0].value = value.to_string();
            page.input_handlers
                .iter()
                .filter(|(target, _)| target == node)
                .map(|(_, handler)| Rc::clone(handler))
                .collect()
        };
        for handler in handlers {
            handler(value.to_string());
        }
    }

    /// Press a key inside `node`, firing key handlers.
    pub fn press_key(&self, node: &NodeId, key: &str) {
        let handlers: Vec<_> = self
            .page
            .borrow()
            .key_handlers
            .iter()
            .filter(|(target, _)| target == node)
            .map(|(_, handler)| Rc::clone(handler))
            .collect();
        for handler in handlers {
            handler(key);
        }
    }

    fn select(&self, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.page
            .borrow()
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.removed && predicate(node))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    fn collect_text(page: &Page, node: NodeId, out: &mut String) {
        let data = &page.nodes[node.0];
        out.push_str(&data.text);
        for child in &data.children {
            Self::collect_text(page, *child, out);
        }
    }
}

impl Document for MemoryDocument {
    type Node = NodeId;

    fn title(&self) -> String {
        self.page.borrow().title.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.page.borrow().ready_state
    }

    fn elements_by_class(&self, class: &str) -> Vec<NodeId> {
        self.select(|node| node.classes.iter().any(|c| c == class))
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.select(|node| node.id.as_deref() == Some(id))
            .into_iter()
            .next()
    }

    fn descendants_by_class(&self, node: &NodeId, class: &str) -> Vec<NodeId> {
        let page = self.page.borrow();
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = page.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let data = &page.nodes[id.0];
            if data.removed {
                continue;
            }
            if data.classes.iter().any(|c| c == class) {
                found.push(id);
            }
            stack.extend(data.children.iter().rev().copied());
        }
        found
    }

    fn closest_with_class(&self, node: &NodeId, class: &str) -> Option<NodeId> {
        let page = self.page.borrow();
        let mut current = Some(*node);
        while let Some(id) = current {
            let data = &page.nodes[id.0];
            if data.classes.iter().any(|c| c == class) {
                return Some(id);
            }
            current = data.parent;
        }
        None
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.page.borrow().nodes[node.0].attributes.get(name).cloned()
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.page.borrow().nodes[node.0]
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        let mut page = self.page.borrow_mut();
        let classes = &mut page.nodes[node.0].classes;
        if !classes.iter().any(|c| c == class) {
            classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        self.page.borrow_mut().nodes[node.0]
            .classes
            .retain(|c| c != class);
    }

    fn inner_html(&self, node: &NodeId) -> String {
        self.page.borrow().nodes[node.0].inner_html.clone()
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        self.page.borrow_mut().nodes[node.0].inner_html = html.to_string();
    }

    fn text_content(&self, node: &NodeId) -> String {
        let page = self.page.borrow();
        let mut out = String::new();
        Self::collect_text(&page, *node, &mut out);
        out
    }

    fn is_displayed(&self, node: &NodeId) -> bool {
        !self.page.borrow().nodes[node.0].hidden
    }

    fn set_displayed(&self, node: &NodeId, shown: bool) {
        self.page.borrow_mut().nodes[node.0].hidden = !shown;
    }

    fn top_offset(&self, node: &NodeId) -> f64 {
        self.page.borrow().nodes[node.0].top
    }

    fn viewport_height(&self) -> f64 {
        self.page.borrow().viewport_height
    }

    fn value(&self, node: &NodeId) -> String {
        self.page.borrow().nodes[node.0].value.clone()
    }

    fn set_value(&self, node: &NodeId, value: &str) {
        self.page.borrow_mut().nodes[node.0].value = value.to_string();
    }

    fn blur(&self, node: &NodeId) {
        let mut page = self.page.borrow_mut();
        if page.focused == Some(*node) {
            page.focused = None;
        }
    }

    fn append_offscreen_text_area(&self, text: &str) -> Result<NodeId, String> {
        let area = self.create("textarea", None);
        let mut page = self.page.borrow_mut();
        let data = &mut page.nodes[area.0];
        data.value = text.to_string();
        data.attributes.insert("readonly".to_string(), String::new());
        for (property, value) in [
            ("position", "fixed"),
            ("left", "-999999px"),
            ("top", "-999999px"),
        ] {
            data.styles.insert(property.to_string(), value.to_string());
        }
        Ok(area)
    }

    fn focus_and_select(&self, node: &NodeId) {
        let mut page = self.page.borrow_mut();
        page.focused = Some(*node);
        page.selection = Some(*node);
    }

    fn exec_copy(&self) -> Result<bool, String> {
        let mut page = self.page.borrow_mut();
        match page.copy_command {
            CopyCommand::Works => {
                let text = page.selection.map(|node| page.nodes[node.0].value.clone());
                page.copied = text;
                Ok(true)
            }
            CopyCommand::Unsupported => Ok(false),
            CopyCommand::Throws => Err("SecurityError: copy not allowed".to_string()),
        }
    }

    fn remove_node(&self, node: &NodeId) {
        let mut page = self.page.borrow_mut();
        page.nodes[node.0].removed = true;
        if let Some(parent) = page.nodes[node.0].parent {
            page.nodes[parent.0].children.retain(|child| child != node);
        }
        if page.selection == Some(*node) {
            page.selection = None;
        }
        if page.focused == Some(*node) {
            page.focused = None;
        }
    }

    fn on_content_loaded(&self, handler: Box<dyn FnOnce()>) {
        self.page.borrow_mut().content_loaded.push(handler);
    }

    fn on_load(&self, handler: Box<dyn FnOnce()>) {
        self.page.borrow_mut().load.push(handler);
    }

    fn on_input(&self, node: &NodeId, handler: Box<dyn Fn(String)>) {
        self.page
            .borrow_mut()
            .input_handlers
            .push((*node, Rc::from(handler)));
    }

    fn on_key_down(&self, node: &NodeId, handler: Box<dyn Fn(&str)>) {
        self.page
            .borrow_mut()
            .key_handlers
            .push((*node, Rc::from(handler)));
    }
}

struct Scheduled {
    due: Duration,
    seq: u64,
    task: Box<dyn FnOnce()>,
}

/// Virtual clock. Tasks run in due order (ties in scheduling order) when
/// time is advanced past them.
#[derive(Default)]
pub struct ManualTimers {
    now: Cell<Duration>,
    seq: Cell<u64>,
    queue: RefCell<Vec<Scheduled>>,
}

impl ManualTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Move time forward by `by`, running every task that falls due,
    /// including tasks scheduled by tasks.
    pub fn advance(&self, by: Duration) {
        let target = self.now.get() + by;
        while let Some(task) = self.pop_due(target) {
            self.now.set(task.due);
            (task.task)();
        }
        self.now.set(target);
    }

    fn pop_due(&self, target: Duration) -> Option<Scheduled> {
        let mut queue = self.queue.borrow_mut();
        let next = queue
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due <= target)
            .min_by_key(|(_, task)| (task.due, task.seq))
            .map(|(i, _)| i)?;
        Some(queue.swap_remove(next))
    }
}

impl Timers for ManualTimers {
    fn set_timeout(&self, delay: Duration, task: Box<dyn FnOnce()>) {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        self.queue.borrow_mut().push(Scheduled {
            due: self.now.get() + delay,
            seq,
            task,
        });
    }
}

/// Intersection observer driven by hand.
#[derive(Default)]
pub struct ManualObserver {
    failure: Option<ObserverError>,
    observed: RefCell<Vec<NodeId>>,
    options: Cell<Option<ObserverOptions>>,
    callback: RefCell<Option<Rc<dyn Fn(&NodeId)>>>,
}

impl ManualObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer whose setup throws.
    pub fn failing(error: ObserverError) -> Self {
        Self {
            failure: Some(error),
            ..Default::default()
        }
    }

    pub fn observed(&self) -> Vec<NodeId> {
        self.observed.borrow().clone()
    }

    pub fn options(&self) -> Option<ObserverOptions> {
        self.options.get()
    }

    /// Report `node` as intersecting. Returns false if it is not observed.
    pub fn intersect(&self, node: &NodeId) -> bool {
        if !self.observed.borrow().contains(node) {
            return false;
        }
        let callback = self.callback.borrow().clone();
        match callback {
            Some(callback) => {
                callback(node);
                true
            }
            None => false,
        }
    }
}

impl VisibilityObserver<NodeId> for ManualObserver {
    fn observe(
        &self,
        targets: &[NodeId],
        options: &ObserverOptions,
        on_intersect: Rc<dyn Fn(&NodeId)>,
    ) -> Result<(), ObserverError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.observed.borrow_mut().extend_from_slice(targets);
        self.options.set(Some(*options));
        *self.callback.borrow_mut() = Some(on_intersect);
        Ok(())
    }
}

type PendingWrite = (String, Box<dyn FnOnce(Result<(), ClipboardError>)>);

/// Async clipboard whose writes complete on [`MemoryClipboard::settle`].
pub struct MemoryClipboard {
    rejection: Option<String>,
    contents: RefCell<Option<String>>,
    pending: RefCell<Vec<PendingWrite>>,
}

impl MemoryClipboard {
    pub fn accepting() -> Self {
        Self {
            rejection: None,
            contents: RefCell::new(None),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// A clipboard that rejects every write with `reason`.
    pub fn rejecting(reason: &str) -> Self {
        Self {
            rejection: Some(reason.to_string()),
            ..Self::accepting()
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }

    /// Complete every pending write. Returns how many completed.
    pub fn settle(&self) -> usize {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let count = pending.len();
        for (text, done) in pending {
            match &self.rejection {
                Some(reason) => done(Err(ClipboardError::Rejected(reason.clone()))),
                None => {
                    *self.contents.borrow_mut() = Some(text);
                    done(Ok(()));
                }
            }
        }
        count
    }
}

impl AsyncClipboard for MemoryClipboard {
    fn write_text(&self, text: &str, done: Box<dyn FnOnce(Result<(), ClipboardError>)>) {
        self.pending.borrow_mut().push((text.to_string(), done));
    }
}
