//! Core types - scope values, transforms and element descriptors.
//!
//! Element descriptors are plain data the user hands to the engine. Each kind
//! is its own struct carrying only the fields that kind uses; [`Element`] is
//! the closed set of kinds plus a passthrough variant for anything the engine
//! does not wire.
//!
//! ```ignore
//! use spark_stdio::{Element, TextInput, Output, Value};
//!
//! let elements: Vec<Element> = vec![
//!     TextInput::new("name")
//!         .label("Your name")
//!         .transform(|v| Value::Text(v.to_display().to_uppercase()))
//!         .into(),
//!     Output::link("name").into(),
//! ];
//! ```

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use crate::dom::{Context2d, FileBlob, Node};
use crate::scope::ScopeStore;

// =============================================================================
// Value
// =============================================================================

/// A value stored in scope.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    /// Checkbox selections.
    List(Vec<String>),
    Number(f64),
    Bool(bool),
    File(FileBlob),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileBlob> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Text used when the value is rendered into an output node.
    ///
    /// Lists join with `,`, integral numbers drop the fraction, files show
    /// their name and null renders empty.
    pub fn to_display(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{}", *n as i64)
            }
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::File(file) => file.name().to_string(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<FileBlob> for Value {
    fn from(file: FileBlob) -> Self {
        Self::File(file)
    }
}

// =============================================================================
// Transforms
// =============================================================================

/// A pure value transform.
pub type Transform = Rc<dyn Fn(Value) -> Value>;

/// Zero or more transforms applied left to right. Empty is the identity.
#[derive(Clone, Default)]
pub struct TransformChain(Vec<Transform>);

impl TransformChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fn(f: impl Fn(Value) -> Value + 'static) -> Self {
        Self(vec![Rc::new(f)])
    }

    /// Append a transform to the end of the chain.
    pub fn then(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.0.push(Rc::new(f));
        self
    }

    pub fn push(&mut self, f: Transform) {
        self.0.push(f);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn apply(&self, value: Value) -> Value {
        self.0.iter().fold(value, |acc, f| f(acc))
    }
}

impl fmt::Debug for TransformChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransformChain({})", self.0.len())
    }
}

// =============================================================================
// Callback Types
// =============================================================================

/// Canvas draw routine: (drawing context, current scope, canvas node).
pub type DrawFn = Rc<dyn Fn(&Context2d, &ScopeStore, &Node)>;

/// Button click handler. Receives the scope; the engine writes nothing itself.
pub type ButtonHandler = Rc<dyn Fn(&ScopeStore)>;

// =============================================================================
// Element Kinds
// =============================================================================

/// Kind tag of an [`Element`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKind {
    TextInput,
    Checkbox,
    Radio,
    Output,
    Canvas,
    File,
    Button,
    Title,
    Other,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TextInput => "text-input",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Output => "output",
            Self::Canvas => "canvas",
            Self::File => "file",
            Self::Button => "button",
            Self::Title => "title",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a canvas is redrawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Interval {
    /// Redraw on every scope write, whatever the key.
    #[default]
    OnUpdate,
    /// Redraw on a fixed period; scope writes do not redraw.
    Every(Duration),
}

impl Interval {
    pub fn millis(ms: u64) -> Self {
        Self::Every(Duration::from_millis(ms))
    }
}

// =============================================================================
// Element Descriptors
// =============================================================================

/// Single-line text field writing `transform(text)` to `name`.
#[derive(Clone, Debug, Default)]
pub struct TextInput {
    pub name: String,
    pub label: Option<String>,
    pub placeholder: Option<String>,
    pub transform: TransformChain,
}

impl TextInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn transform(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.transform = self.transform.then(f);
        self
    }
}

/// One checkbox/radio option.
#[derive(Clone, Debug, PartialEq)]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

/// Option group shared by checkbox and radio elements.
#[derive(Clone, Debug, Default)]
pub struct Choice {
    pub name: String,
    pub label: Option<String>,
    pub options: Vec<ChoiceOption>,
}

impl Choice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn option(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push(ChoiceOption {
            label: label.into(),
            value: value.into(),
        });
        self
    }
}

/// Sink rendering one or more scope keys.
#[derive(Clone, Debug, Default)]
pub struct Output {
    pub name: Option<String>,
    pub link: Vec<String>,
    pub transform: TransformChain,
}

impl Output {
    /// Output bound to a single key.
    pub fn link(key: impl Into<String>) -> Self {
        Self {
            link: vec![key.into()],
            ..Default::default()
        }
    }

    /// Output bound to several keys; each write to any of them re-renders it.
    pub fn links<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            link: keys.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn transform(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.transform = self.transform.then(f);
        self
    }
}

/// Drawing surface redrawn on scope writes or on a timer.
#[derive(Clone)]
pub struct Canvas {
    pub name: Option<String>,
    pub width: u16,
    pub height: u16,
    pub draw: DrawFn,
    pub interval: Interval,
}

impl Canvas {
    pub fn new(
        width: u16,
        height: u16,
        draw: impl Fn(&Context2d, &ScopeStore, &Node) + 'static,
    ) -> Self {
        Self {
            name: None,
            width,
            height,
            draw: Rc::new(draw),
            interval: Interval::OnUpdate,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = interval;
        self
    }

    pub fn every(self, period: Duration) -> Self {
        self.interval(Interval::Every(period))
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("name", &self.name)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// File picker plus drop target writing `transform(file)` to `name`.
#[derive(Clone, Debug, Default)]
pub struct FileInput {
    pub name: String,
    pub label: Option<String>,
    pub transform: TransformChain,
}

impl FileInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn transform(mut self, f: impl Fn(Value) -> Value + 'static) -> Self {
        self.transform = self.transform.then(f);
        self
    }
}

/// Clickable button running a user handler.
#[derive(Clone)]
pub struct Button {
    pub label: String,
    pub handler: ButtonHandler,
}

impl Button {
    pub fn new(label: impl Into<String>, handler: impl Fn(&ScopeStore) + 'static) -> Self {
        Self {
            label: label.into(),
            handler: Rc::new(handler),
        }
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Any kind the engine does not wire. Rendered by the theme, nothing else.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Passthrough {
    pub kind: String,
    pub text: Option<String>,
}

impl Passthrough {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            text: None,
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// A user-authored element descriptor.
#[derive(Clone, Debug)]
pub enum Element {
    TextInput(TextInput),
    Checkbox(Choice),
    Radio(Choice),
    Output(Output),
    Canvas(Canvas),
    File(FileInput),
    Button(Button),
    /// Heading synthesized from the facade title.
    Title(String),
    Other(Passthrough),
}

impl Element {
    pub fn checkbox(choice: Choice) -> Self {
        Self::Checkbox(choice)
    }

    pub fn radio(choice: Choice) -> Self {
        Self::Radio(choice)
    }

    pub fn kind(&self) -> ElementKind {
        match self {
            Self::TextInput(_) => ElementKind::TextInput,
            Self::Checkbox(_) => ElementKind::Checkbox,
            Self::Radio(_) => ElementKind::Radio,
            Self::Output(_) => ElementKind::Output,
            Self::Canvas(_) => ElementKind::Canvas,
            Self::File(_) => ElementKind::File,
            Self::Button(_) => ElementKind::Button,
            Self::Title(_) => ElementKind::Title,
            Self::Other(_) => ElementKind::Other,
        }
    }

    /// Scope key the element writes to (or is named by).
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::TextInput(e) => Some(&e.name),
            Self::Checkbox(e) | Self::Radio(e) => Some(&e.name),
            Self::Output(e) => e.name.as_deref(),
            Self::Canvas(e) => e.name.as_deref(),
            Self::File(e) => Some(&e.name),
            Self::Button(_) | Self::Title(_) | Self::Other(_) => None,
        }
    }
}

impl From<TextInput> for Element {
    fn from(e: TextInput) -> Self {
        Self::TextInput(e)
    }
}

impl From<Output> for Element {
    fn from(e: Output) -> Self {
        Self::Output(e)
    }
}

impl From<Canvas> for Element {
    fn from(e: Canvas) -> Self {
        Self::Canvas(e)
    }
}

impl From<FileInput> for Element {
    fn from(e: FileInput) -> Self {
        Self::File(e)
    }
}

impl From<Button> for Element {
    fn from(e: Button) -> Self {
        Self::Button(e)
    }
}

impl From<Passthrough> for Element {
    fn from(e: Passthrough) -> Self {
        Self::Other(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upper(v: Value) -> Value {
        Value::Text(v.to_display().to_uppercase())
    }

    #[test]
    fn test_transform_chain_left_to_right() {
        let chain = TransformChain::from_fn(upper).then(|v| Value::Text(format!("{}!", v.to_display())));
        assert_eq!(chain.apply("hi".into()), Value::Text("HI!".into()));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = TransformChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.apply(Value::Number(3.0)), Value::Number(3.0));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_display(), "");
        assert_eq!(Value::List(vec!["a".into(), "b".into()]).to_display(), "a,b");
        assert_eq!(Value::Number(42.0).to_display(), "42");
        assert_eq!(Value::Number(1.5).to_display(), "1.5");
        assert_eq!(Value::Bool(true).to_display(), "true");
        assert_eq!(Value::File(FileBlob::new("a.png", Vec::new())).to_display(), "a.png");
    }

    #[test]
    fn test_element_kind_and_name() {
        let input: Element = TextInput::new("a").into();
        assert_eq!(input.kind(), ElementKind::TextInput);
        assert_eq!(input.name(), Some("a"));

        let other: Element = Passthrough::new("marquee").into();
        assert_eq!(other.kind().as_str(), "other");
        assert_eq!(other.name(), None);

        let radio = Element::radio(Choice::new("size").option("Small", "s"));
        assert_eq!(radio.kind(), ElementKind::Radio);
    }

    #[test]
    fn test_builders_accumulate_transforms() {
        let output = Output::links(["a", "b"]).transform(upper).transform(upper);
        assert_eq!(output.link, vec!["a", "b"]);
        assert_eq!(output.transform.len(), 2);
    }

    #[test]
    fn test_interval_default() {
        assert_eq!(Interval::default(), Interval::OnUpdate);
        assert_eq!(Interval::millis(250), Interval::Every(Duration::from_millis(250)));
    }
}
