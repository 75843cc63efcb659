//! Theme system - turns element descriptors into live nodes.
//!
//! The engine never builds nodes itself. For every descriptor it asks the
//! active [`ThemeTransform`] for a [`ThemeOutput`]: the nodes to mount plus
//! metadata telling the engine where to wire events.
//!
//! ```text
//! Element ──transform_elem──→ ThemeOutput { elem, main, evt, file_* }
//!                                   │
//!                     main = elem[main]            (default 0)
//!                     targets = main.query(evt)    (default [main])
//! ```
//!
//! A theme is either a bare transform (any `Fn(&Element, &ThemeContext) ->
//! ThemeOutput`) or a [`ThemeObject`] that also carries a root node, an init
//! hook and stylesheet URLs.
//!
//! # Example
//!
//! ```ignore
//! use spark_stdio::theme::{ThemeOutput, ThemeContext};
//! use spark_stdio::{Element, Node};
//!
//! let bare = |element: &Element, _cx: &ThemeContext<'_>| -> ThemeOutput {
//!     Node::new(element.kind().as_str()).into()
//! };
//! ```

use std::fmt;
use std::rc::Rc;

use crate::dom::Node;
use crate::types::Element;

mod default;
pub mod presets;

pub use default::DefaultTheme;
pub use presets::{get_preset, preset_names, PlainTheme};

// =============================================================================
// ThemeOutput
// =============================================================================

/// Nodes produced for one descriptor, plus wiring metadata.
#[derive(Clone, Debug, Default)]
pub struct ThemeOutput {
    /// Nodes to mount, in order.
    pub elem: Vec<Node>,
    /// Index into `elem` of the node events are looked up in.
    pub main: usize,
    /// Selector for event targets inside `main`. `None` targets `main` itself.
    pub evt: Option<String>,
    /// File kind: node showing the chosen file name.
    pub file_display: Option<String>,
    /// File kind: node opening the picker when clicked.
    pub file_button: Option<String>,
    /// File kind: drop target.
    pub file_drag_to: Option<String>,
}

impl ThemeOutput {
    pub fn new(elem: Vec<Node>) -> Self {
        Self {
            elem,
            ..Default::default()
        }
    }

    pub fn main(mut self, main: usize) -> Self {
        self.main = main;
        self
    }

    pub fn evt(mut self, selector: impl Into<String>) -> Self {
        self.evt = Some(selector.into());
        self
    }

    pub fn file_display(mut self, selector: impl Into<String>) -> Self {
        self.file_display = Some(selector.into());
        self
    }

    pub fn file_button(mut self, selector: impl Into<String>) -> Self {
        self.file_button = Some(selector.into());
        self
    }

    pub fn file_drag_to(mut self, selector: impl Into<String>) -> Self {
        self.file_drag_to = Some(selector.into());
        self
    }
}

/// A bare node becomes a one-node output.
impl From<Node> for ThemeOutput {
    fn from(node: Node) -> Self {
        Self::new(vec![node])
    }
}

/// A node list becomes an output with `main = 0`.
impl From<Vec<Node>> for ThemeOutput {
    fn from(nodes: Vec<Node>) -> Self {
        Self::new(nodes)
    }
}

// =============================================================================
// ThemeTransform
// =============================================================================

/// Read-only view of the engine handed to a theme transform.
#[derive(Clone, Copy, Debug)]
pub struct ThemeContext<'a> {
    elements: &'a [Element],
    index: Option<usize>,
}

impl<'a> ThemeContext<'a> {
    pub fn new(elements: &'a [Element], index: Option<usize>) -> Self {
        Self { elements, index }
    }

    /// Every descriptor in the current refresh, in order.
    pub fn elements(&self) -> &'a [Element] {
        self.elements
    }

    /// Position of the descriptor being transformed. `None` for the title.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The descriptor rendered just before this one.
    pub fn previous(&self) -> Option<&'a Element> {
        let index = self.index?;
        index.checked_sub(1).and_then(|i| self.elements.get(i))
    }
}

/// Converts one descriptor into nodes. Must not mutate engine state.
pub trait ThemeTransform {
    fn transform_elem(&self, element: &Element, cx: &ThemeContext<'_>) -> ThemeOutput;
}

impl<F> ThemeTransform for F
where
    F: Fn(&Element, &ThemeContext<'_>) -> ThemeOutput,
{
    fn transform_elem(&self, element: &Element, cx: &ThemeContext<'_>) -> ThemeOutput {
        self(element, cx)
    }
}

// =============================================================================
// ThemeObject
// =============================================================================

/// Called once with the render root after the theme root is mounted.
pub type InitFn = Rc<dyn Fn(&Node)>;

/// A complete theme: transform plus optional root, init hook and stylesheets.
#[derive(Clone, Default)]
pub struct ThemeObject {
    /// Mounted under the document body and used as the render root.
    pub root: Option<Node>,
    pub init: Option<InitFn>,
    pub style_urls: Vec<String>,
    /// Required. A theme object without one is rejected by `style()`.
    pub transform: Option<Rc<dyn ThemeTransform>>,
}

impl ThemeObject {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(mut self, transform: impl ThemeTransform + 'static) -> Self {
        self.transform = Some(Rc::new(transform));
        self
    }

    pub fn with_root(mut self, root: Node) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_init(mut self, init: impl Fn(&Node) + 'static) -> Self {
        self.init = Some(Rc::new(init));
        self
    }

    pub fn with_style_url(mut self, url: impl Into<String>) -> Self {
        self.style_urls.push(url.into());
        self
    }
}

impl fmt::Debug for ThemeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeObject")
            .field("root", &self.root)
            .field("init", &self.init.is_some())
            .field("style_urls", &self.style_urls)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}
