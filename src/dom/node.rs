//! Live interface nodes.
//!
//! A [`Node`] is a shared handle (`Rc<RefCell<..>>`) to one element of the
//! render tree. Nodes own their children; parents are held weakly. Event
//! listeners receive the node they were registered on, so listeners never
//! need to capture their own node (which would leak through an `Rc` cycle).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::canvas::Context2d;
use super::event::{DataTransfer, Event, EventKind};
use super::file::FileBlob;
use super::selector::{Selector, SelectorError};

bitflags::bitflags! {
    /// Boolean node state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct NodeFlags: u8 {
        const NONE = 0;
        /// Checkbox/radio is checked.
        const CHECKED = 1 << 0;
        /// Can receive keyboard focus in the terminal host.
        const FOCUSABLE = 1 << 1;
        /// Not painted.
        const HIDDEN = 1 << 2;
        /// Currently focused.
        const FOCUSED = 1 << 3;
    }
}

/// Event listener. Receives the node it is registered on.
pub type Listener = Rc<dyn Fn(&Node, &mut Event)>;

struct NodeData {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    text: String,
    value: String,
    flags: NodeFlags,
    children: Vec<Node>,
    parent: Weak<RefCell<NodeData>>,
    listeners: Vec<(EventKind, Listener)>,
    surface: Option<Context2d>,
    files: Vec<FileBlob>,
}

/// Handle to a node of the render tree.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

/// Non-owning node handle.
#[derive(Clone)]
pub struct WeakNode(Weak<RefCell<NodeData>>);

impl WeakNode {
    pub fn upgrade(&self) -> Option<Node> {
        self.0.upgrade().map(Node)
    }
}

impl Node {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
            text: String::new(),
            value: String::new(),
            flags: NodeFlags::NONE,
            children: Vec::new(),
            parent: Weak::new(),
            listeners: Vec::new(),
            surface: None,
            files: Vec::new(),
        })))
    }

    // =========================================================================
    // Builders
    // =========================================================================

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.0.borrow_mut().id = Some(id.into());
        self
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.set_text(text);
        self
    }

    pub fn with_flags(self, flags: NodeFlags) -> Self {
        self.insert_flags(flags);
        self
    }

    pub fn with_child(self, child: Node) -> Self {
        self.append_child(child);
        self
    }

    pub fn with_children(self, children: impl IntoIterator<Item = Node>) -> Self {
        for child in children {
            self.append_child(child);
        }
        self
    }

    /// Attach a 2d drawing surface (canvas nodes).
    pub fn with_surface(self, width: u16, height: u16) -> Self {
        self.0.borrow_mut().surface = Some(Context2d::new(width, height));
        self
    }

    // =========================================================================
    // Identity & attributes
    // =========================================================================

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn id(&self) -> Option<String> {
        self.0.borrow().id.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: impl Into<String>) {
        let class = class.into();
        let mut data = self.0.borrow_mut();
        if !data.classes.contains(&class) {
            data.classes.push(class);
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.0
            .borrow()
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        let mut data = self.0.borrow_mut();
        match data.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => data.attrs.push((name, value)),
        }
    }

    /// The `data-value` attribute carried by checkbox/radio options.
    pub fn data_value(&self) -> Option<String> {
        self.attr("data-value")
    }

    /// Rendered text content.
    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    /// Replace rendered text content.
    pub fn set_text(&self, text: impl Into<String>) {
        self.0.borrow_mut().text = text.into();
    }

    /// Current value of a text field.
    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.0.borrow_mut().value = value.into();
    }

    pub fn flags(&self) -> NodeFlags {
        self.0.borrow().flags
    }

    pub fn insert_flags(&self, flags: NodeFlags) {
        self.0.borrow_mut().flags.insert(flags);
    }

    pub fn remove_flags(&self, flags: NodeFlags) {
        self.0.borrow_mut().flags.remove(flags);
    }

    pub fn is_checked(&self) -> bool {
        self.flags().contains(NodeFlags::CHECKED)
    }

    pub fn context_2d(&self) -> Option<Context2d> {
        self.0.borrow().surface.clone()
    }

    /// Files currently selected in a file picker node.
    pub fn files(&self) -> Vec<FileBlob> {
        self.0.borrow().files.clone()
    }

    pub fn set_files(&self, files: Vec<FileBlob>) {
        self.0.borrow_mut().files = files;
    }

    // =========================================================================
    // Tree
    // =========================================================================

    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode(Rc::downgrade(&self.0))
    }

    pub fn parent(&self) -> Option<Node> {
        self.0.borrow().parent.upgrade().map(Node)
    }

    pub fn children(&self) -> Vec<Node> {
        self.0.borrow().children.clone()
    }

    pub fn child_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn first_child(&self) -> Option<Node> {
        self.0.borrow().children.first().cloned()
    }

    /// Append `child`, detaching it from its previous parent first.
    pub fn append_child(&self, child: Node) {
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child);
    }

    /// Remove `child` if it is a direct child. Returns whether it was found.
    pub fn remove_child(&self, child: &Node) -> bool {
        let removed = {
            let mut data = self.0.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| !c.ptr_eq(child));
            before != data.children.len()
        };
        if removed {
            child.0.borrow_mut().parent = Weak::new();
        }
        removed
    }

    /// Detach this node from its parent, if any.
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Remove every child.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    /// Remove every child, then attach `children` in one step.
    pub fn replace_children(&self, children: Vec<Node>) {
        self.clear_children();
        for child in &children {
            child.detach();
            child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        }
        self.0.borrow_mut().children = children;
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<Node> {
        let mut out = Vec::new();
        fn walk(node: &Node, out: &mut Vec<Node>) {
            for child in node.children() {
                out.push(child.clone());
                walk(&child, out);
            }
        }
        walk(self, &mut out);
        out
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants()
            .into_iter()
            .filter(|node| selector.matches(node))
            .collect())
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>, SelectorError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn add_event_listener(&self, kind: EventKind, listener: impl Fn(&Node, &mut Event) + 'static) {
        self.0.borrow_mut().listeners.push((kind, Rc::new(listener)));
    }

    pub fn listener_count(&self) -> usize {
        self.0.borrow().listeners.len()
    }

    pub fn listener_count_for(&self, kind: EventKind) -> usize {
        self.0.borrow().listeners.iter().filter(|(k, _)| *k == kind).count()
    }

    /// Invoke every listener registered for the event's kind, in order.
    ///
    /// The listener list is snapshotted first, so listeners may freely
    /// mutate this node or the tree.
    pub fn dispatch(&self, event: &mut Event) {
        let listeners: Vec<Listener> = self
            .0
            .borrow()
            .listeners
            .iter()
            .filter(|(kind, _)| *kind == event.kind())
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(self, event);
        }
    }

    // =========================================================================
    // Gesture helpers
    // =========================================================================

    /// Replace the field value and fire `input`.
    pub fn input_text(&self, text: impl Into<String>) {
        self.set_value(text);
        self.dispatch(&mut Event::new(EventKind::Input));
    }

    /// Set the checked state and fire `change`.
    pub fn set_checked(&self, checked: bool) {
        if checked {
            self.insert_flags(NodeFlags::CHECKED);
        } else {
            self.remove_flags(NodeFlags::CHECKED);
        }
        self.dispatch(&mut Event::new(EventKind::Change));
    }

    pub fn click(&self) {
        self.dispatch(&mut Event::new(EventKind::Click));
    }

    /// Fire `dragover`; returns the event so callers can inspect it.
    pub fn drag_over(&self) -> Event {
        let mut event = Event::new(EventKind::DragOver);
        self.dispatch(&mut event);
        event
    }

    /// Fire `drop` carrying `transfer`.
    pub fn drop_transfer(&self, transfer: DataTransfer) -> Event {
        let mut event = Event::with_transfer(EventKind::Drop, transfer);
        self.dispatch(&mut event);
        event
    }

    /// Fire `dragend` carrying `transfer`.
    pub fn drag_end(&self, transfer: DataTransfer) -> Event {
        let mut event = Event::with_transfer(EventKind::DragEnd, transfer);
        self.dispatch(&mut event);
        event
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Node")
            .field("tag", &data.tag)
            .field("id", &data.id)
            .field("classes", &data.classes)
            .field("children", &data.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_append_sets_parent() {
        let parent = Node::new("div");
        let child = Node::new("span");
        parent.append_child(child.clone());

        assert_eq!(parent.child_count(), 1);
        assert!(child.parent().unwrap().ptr_eq(&parent));
    }

    #[test]
    fn test_append_moves_between_parents() {
        let a = Node::new("div");
        let b = Node::new("div");
        let child = Node::new("span");

        a.append_child(child.clone());
        b.append_child(child.clone());

        assert_eq!(a.child_count(), 0);
        assert_eq!(b.child_count(), 1);
        assert!(child.parent().unwrap().ptr_eq(&b));
    }

    #[test]
    fn test_replace_children() {
        let root = Node::new("body").with_child(Node::new("old"));
        let old = root.first_child().unwrap();

        root.replace_children(vec![Node::new("a"), Node::new("b")]);

        assert!(old.parent().is_none());
        let tags: Vec<String> = root.children().iter().map(Node::tag).collect();
        assert_eq!(tags, vec!["a", "b"]);
        assert!(root.children().iter().all(|c| c.parent().unwrap().ptr_eq(&root)));
    }

    #[test]
    fn test_descendants_document_order() {
        let root = Node::new("div")
            .with_child(Node::new("a").with_child(Node::new("a1")))
            .with_child(Node::new("b"));

        let tags: Vec<String> = root.descendants().iter().map(Node::tag).collect();
        assert_eq!(tags, vec!["a", "a1", "b"]);
    }

    #[test]
    fn test_query_selector_all() {
        let root = Node::new("div")
            .with_child(Node::new("input").with_class("choice").with_attr("data-value", "x"))
            .with_child(Node::new("label"))
            .with_child(Node::new("input").with_class("choice").with_attr("data-value", "y"));

        let found = root.query_selector_all(".choice").unwrap();
        let values: Vec<Option<String>> = found.iter().map(Node::data_value).collect();
        assert_eq!(values, vec![Some("x".into()), Some("y".into())]);

        assert!(root.query_selector("button").unwrap().is_none());
        assert!(root.query_selector("div > input").is_err());
    }

    #[test]
    fn test_query_selector_descendants() {
        let root = Node::new("div")
            .with_child(Node::new("label").with_child(Node::new("input").with_attr("data-value", "in")))
            .with_child(Node::new("input").with_attr("data-value", "out"));

        let found = root.query_selector_all("label input").unwrap();
        let values: Vec<Option<String>> = found.iter().map(Node::data_value).collect();
        assert_eq!(values, vec![Some("in".into())]);

        // The scoping node itself may satisfy an ancestor compound
        assert_eq!(root.query_selector_all("div input").unwrap().len(), 2);
    }

    #[test]
    fn test_dispatch_by_kind() {
        let node = Node::new("button");
        let clicks = Rc::new(Cell::new(0));
        let clicks_clone = clicks.clone();
        node.add_event_listener(EventKind::Click, move |_, _| {
            clicks_clone.set(clicks_clone.get() + 1);
        });

        node.click();
        node.dispatch(&mut Event::new(EventKind::Change));
        node.click();

        assert_eq!(clicks.get(), 2);
        assert_eq!(node.listener_count(), 1);
        assert_eq!(node.listener_count_for(EventKind::Change), 0);
    }

    #[test]
    fn test_listener_may_add_listener() {
        let node = Node::new("button");
        node.add_event_listener(EventKind::Click, |node, _| {
            node.add_event_listener(EventKind::Click, |_, _| {});
        });

        node.click();
        assert_eq!(node.listener_count(), 2);
    }

    #[test]
    fn test_input_text_and_checked() {
        let input = Node::new("input");
        input.input_text("hi");
        assert_eq!(input.value(), "hi");

        input.set_checked(true);
        assert!(input.is_checked());
        input.set_checked(false);
        assert!(!input.is_checked());
    }

    #[test]
    fn test_set_attr_overwrites() {
        let node = Node::new("input").with_attr("type", "text");
        node.set_attr("type", "file");
        assert_eq!(node.attr("type").as_deref(), Some("file"));
        assert_eq!(node.attr("missing"), None);
    }
}
