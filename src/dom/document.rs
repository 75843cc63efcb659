//! Host document: head, body and the file chooser hook.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::file::FileBlob;
use super::node::Node;

/// Produces the files a user picked. Empty means the dialog was cancelled.
pub type FileChooser = Rc<dyn Fn() -> Vec<FileBlob>>;

struct DocumentInner {
    head: Node,
    body: Node,
    chooser: RefCell<Option<FileChooser>>,
}

/// Shared handle to the host document.
#[derive(Clone)]
pub struct Document(Rc<DocumentInner>);

/// Non-owning document handle, for listeners living inside the tree.
#[derive(Clone)]
pub struct WeakDocument(Weak<DocumentInner>);

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.0.upgrade().map(Document)
    }
}

impl Document {
    pub fn new() -> Self {
        Self(Rc::new(DocumentInner {
            head: Node::new("head"),
            body: Node::new("body"),
            chooser: RefCell::new(None),
        }))
    }

    pub fn head(&self) -> Node {
        self.0.head.clone()
    }

    pub fn body(&self) -> Node {
        self.0.body.clone()
    }

    pub fn create_element(&self, tag: &str) -> Node {
        Node::new(tag)
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument(Rc::downgrade(&self.0))
    }

    /// Append a `<link rel="stylesheet">` to the head.
    pub fn add_style_sheet(&self, href: &str) {
        let link = self
            .create_element("link")
            .with_attr("rel", "stylesheet")
            .with_attr("href", href);
        self.0.head.append_child(link);
    }

    /// Hrefs of every stylesheet link in the head, in insertion order.
    pub fn style_sheets(&self) -> Vec<String> {
        self.0
            .head
            .children()
            .iter()
            .filter(|node| node.tag() == "link" && node.attr("rel").as_deref() == Some("stylesheet"))
            .filter_map(|node| node.attr("href"))
            .collect()
    }

    /// Install the dialog used when a file button is clicked.
    pub fn set_file_chooser(&self, chooser: impl Fn() -> Vec<FileBlob> + 'static) {
        *self.0.chooser.borrow_mut() = Some(Rc::new(chooser));
    }

    /// Ask the installed chooser for files. No chooser means no selection.
    pub fn choose_files(&self) -> Vec<FileBlob> {
        let chooser = self.0.chooser.borrow().clone();
        chooser.map(|choose| choose()).unwrap_or_default()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("body_children", &self.0.body.child_count())
            .field("style_sheets", &self.style_sheets())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_sheets() {
        let doc = Document::new();
        doc.add_style_sheet("a.css");
        doc.add_style_sheet("b.css");
        assert_eq!(doc.style_sheets(), vec!["a.css", "b.css"]);
    }

    #[test]
    fn test_file_chooser() {
        let doc = Document::new();
        assert!(doc.choose_files().is_empty());

        doc.set_file_chooser(|| vec![FileBlob::new("pick.txt", b"x".to_vec())]);
        let files = doc.choose_files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].name(), "pick.txt");
    }

    #[test]
    fn test_weak_handle() {
        let doc = Document::new();
        let weak = doc.downgrade();
        assert!(weak.upgrade().is_some());
        drop(doc);
        assert!(weak.upgrade().is_none());
    }
}
