//! Stdio - the public facade.
//!
//! Owns one [`RenderEngine`] and the active theme. Every mutation of the
//! descriptor list refreshes; style changes take effect on the next refresh.
//!
//! # Example
//!
//! ```ignore
//! use spark_stdio::{Stdio, TextInput, Output, Value};
//!
//! let app = Stdio::new();
//! app.title("Shout")?;
//! app.add([
//!     TextInput::new("a").transform(|v| Value::Text(v.to_display().to_uppercase())).into(),
//!     Output::link("a").into(),
//! ])?;
//! app.ready()?;
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::dom::{Document, Node};
use crate::engine::{EngineConfig, RenderEngine};
use crate::error::{EngineError, Result};
use crate::scope::ScopeStore;
use crate::theme::{self, ThemeObject, ThemeTransform};
use crate::types::Element;

// =============================================================================
// Style
// =============================================================================

/// Argument to [`Stdio::style`].
#[derive(Clone)]
pub enum Style {
    /// Swap only the transform; root, init and stylesheets stay.
    Transform(Rc<dyn ThemeTransform>),
    /// Replace the whole theme.
    Theme(ThemeObject),
    /// Replace the whole theme with a named preset.
    Preset(String),
}

impl Style {
    pub fn transform(transform: impl ThemeTransform + 'static) -> Self {
        Self::Transform(Rc::new(transform))
    }

    pub fn preset(name: impl Into<String>) -> Self {
        Self::Preset(name.into())
    }
}

impl From<ThemeObject> for Style {
    fn from(theme: ThemeObject) -> Self {
        Self::Theme(theme)
    }
}

impl From<&str> for Style {
    fn from(name: &str) -> Self {
        Self::Preset(name.to_string())
    }
}

impl fmt::Debug for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transform(_) => f.write_str("Style::Transform(..)"),
            Self::Theme(theme) => f.debug_tuple("Style::Theme").field(theme).finish(),
            Self::Preset(name) => f.debug_tuple("Style::Preset").field(name).finish(),
        }
    }
}

// =============================================================================
// Stdio
// =============================================================================

pub struct Stdio {
    engine: RenderEngine,
    theme: RefCell<ThemeObject>,
    initialized: Cell<bool>,
}

impl Stdio {
    /// Fresh document and scope, terminal theme, default config.
    pub fn new() -> Self {
        Self::with_parts(Document::new(), ScopeStore::new(), EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_parts(Document::new(), ScopeStore::new(), config)
    }

    pub fn with_parts(document: Document, scope: ScopeStore, config: EngineConfig) -> Self {
        let theme = theme::presets::terminal();
        let transform: Rc<dyn ThemeTransform> = match &theme.transform {
            Some(transform) => transform.clone(),
            None => Rc::new(theme::DefaultTheme),
        };
        Self {
            engine: RenderEngine::new(document, scope, transform, config),
            theme: RefCell::new(theme),
            initialized: Cell::new(false),
        }
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn scope(&self) -> &ScopeStore {
        self.engine.scope()
    }

    pub fn document(&self) -> &Document {
        self.engine.document()
    }

    /// The active theme object.
    pub fn theme(&self) -> ThemeObject {
        self.theme.borrow().clone()
    }

    // =========================================================================
    // Descriptors
    // =========================================================================

    /// Append descriptors and refresh.
    ///
    /// If the refresh fails the new descriptors are dropped again, so later
    /// calls are not held up by them.
    pub fn add<I>(&self, elements: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        let kept = self.engine.len();
        for element in elements {
            self.engine.push(element);
        }
        if let Err(err) = self.engine.refresh() {
            self.engine.truncate(kept);
            return Err(err);
        }
        Ok(())
    }

    /// Set the title and refresh.
    pub fn title(&self, text: impl Into<String>) -> Result<()> {
        self.engine.set_title(text);
        self.engine.refresh()
    }

    /// Remove the descriptor at `index` and refresh.
    pub fn remove(&self, index: usize) -> Result<Option<Element>> {
        let removed = self.engine.remove(index);
        self.engine.refresh()?;
        Ok(removed)
    }

    /// Remove every descriptor and refresh.
    pub fn clear(&self) -> Result<()> {
        self.engine.clear();
        self.engine.refresh()
    }

    // =========================================================================
    // Theme
    // =========================================================================

    /// Swap the theme. Does not refresh.
    pub fn style(&self, style: impl Into<Style>) -> Result<()> {
        let next = match style.into() {
            Style::Transform(transform) => {
                let mut theme = self.theme.borrow().clone();
                theme.transform = Some(transform);
                theme
            }
            Style::Theme(theme) => theme,
            Style::Preset(name) => theme::get_preset(&name)
                .ok_or_else(|| EngineError::Configuration(format!("unknown preset `{name}`")))?,
        };

        let transform = next
            .transform
            .clone()
            .ok_or_else(|| EngineError::Configuration("theme object has no transform".into()))?;
        self.engine.set_theme(transform);
        *self.theme.borrow_mut() = next;
        Ok(())
    }

    /// Add a stylesheet link to the document head for each theme style URL.
    pub fn load_style_sheet(&self) {
        let urls = self.theme.borrow().style_urls.clone();
        for url in &urls {
            self.document().add_style_sheet(url);
        }
        log::debug!("loaded {} style sheet(s)", urls.len());
    }

    // =========================================================================
    // Bootstrap
    // =========================================================================

    /// Mark the document ready, mount the theme root, run `init`, refresh.
    ///
    /// The root is mounted and `init` runs only on the first call.
    pub fn ready(&self) -> Result<()> {
        self.engine.set_ready();

        if !self.initialized.replace(true) {
            let (root, init) = {
                let theme = self.theme.borrow();
                (theme.root.clone(), theme.init.clone())
            };
            if let Some(root) = root {
                self.document().body().append_child(root.clone());
                self.engine.set_root(root);
            }
            if let Some(init) = init {
                init(&self.engine.root());
            }
        }

        self.engine.refresh()
    }

    /// Render root currently in use.
    pub fn root(&self) -> Node {
        self.engine.root()
    }
}

impl Default for Stdio {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Stdio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stdio")
            .field("engine", &self.engine)
            .field("theme", &self.theme.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{ThemeContext, ThemeOutput};
    use crate::types::{Output, TextInput};

    fn setup() -> Stdio {
        let app = Stdio::new();
        app.ready().unwrap();
        app
    }

    #[test]
    fn test_add_refreshes() {
        let app = setup();
        app.add([Element::from(TextInput::new("a")), Output::link("a").into()]).unwrap();
        assert_eq!(app.root().child_count(), 2);

        app.remove(0).unwrap();
        assert_eq!(app.root().child_count(), 1);

        app.clear().unwrap();
        assert_eq!(app.root().child_count(), 0);
    }

    #[test]
    fn test_add_before_ready_renders_on_ready() {
        let app = Stdio::new();
        app.add([Output::link("a")]).unwrap();
        assert_eq!(app.root().child_count(), 0);

        app.ready().unwrap();
        assert_eq!(app.root().child_count(), 1);
    }

    #[test]
    fn test_style_errors() {
        let app = setup();

        let err = app.style(ThemeObject::new()).unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));

        let err = app.style("no-such-theme").unwrap_err();
        assert_eq!(err, EngineError::Configuration("unknown preset `no-such-theme`".into()));

        app.style("plain").unwrap();
        assert!(app.theme().root.is_none());
    }

    #[test]
    fn test_style_transform_applies_on_refresh() {
        let app = setup();
        app.add([Output::link("a")]).unwrap();

        app.style(Style::transform(|_: &Element, _: &ThemeContext<'_>| -> ThemeOutput {
            Node::new("pre").into()
        }))
        .unwrap();
        assert_eq!(app.root().first_child().unwrap().tag(), "div");

        app.title("T").unwrap();
        let tags: Vec<String> = app.root().children().iter().map(Node::tag).collect();
        assert_eq!(tags, vec!["pre", "pre"]);
    }

    #[test]
    fn test_ready_mounts_theme_root_once() {
        let app = Stdio::new();
        app.style("framed").unwrap();
        app.ready().unwrap();
        app.ready().unwrap();

        let body = app.document().body();
        assert_eq!(body.child_count(), 1);
        assert_eq!(app.root().id().as_deref(), Some("app"));
        assert_eq!(app.root().attr("data-theme").as_deref(), Some("framed"));
    }

    #[test]
    fn test_load_style_sheet() {
        let app = Stdio::new();
        app.style("framed").unwrap();
        app.load_style_sheet();
        assert_eq!(app.document().style_sheets(), vec!["themes/framed.css"]);
    }
}
