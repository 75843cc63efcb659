//! Theme presets.
//!
//! - terminal (default - labelled fields, see [`DefaultTheme`])
//! - plain (bare nodes, no wrappers, no metadata beyond what wiring needs)
//! - framed (terminal layout mounted under its own `#app` root, with a stylesheet)

use crate::dom::{Node, NodeFlags};
use crate::types::{Choice, Element};

use super::{DefaultTheme, ThemeContext, ThemeObject, ThemeOutput, ThemeTransform};

// =============================================================================
// Plain Theme
// =============================================================================

/// Minimal theme: one node per element where possible.
///
/// File elements use a single `div` as display, button and drop target
/// at once, so the engine falls back to `main` for all three.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainTheme;

fn plain_choices(choice: &Choice, input_type: &str) -> ThemeOutput {
    let group = Node::new("div");
    for option in &choice.options {
        group.append_child(
            Node::new("input")
                .with_attr("type", input_type)
                .with_attr("data-value", option.value.as_str())
                .with_text(option.label.as_str())
                .with_flags(NodeFlags::FOCUSABLE),
        );
    }
    ThemeOutput::from(group).evt("input")
}

impl ThemeTransform for PlainTheme {
    fn transform_elem(&self, element: &Element, _cx: &ThemeContext<'_>) -> ThemeOutput {
        match element {
            Element::TextInput(_) => Node::new("input")
                .with_attr("type", "text")
                .with_flags(NodeFlags::FOCUSABLE)
                .into(),
            Element::Checkbox(choice) => plain_choices(choice, "checkbox"),
            Element::Radio(choice) => plain_choices(choice, "radio"),
            Element::Output(_) => Node::new("span").into(),
            Element::Canvas(canvas) => Node::new("canvas").with_surface(canvas.width, canvas.height).into(),
            Element::File(file) => Node::new("div")
                .with_text(file.label.as_deref().unwrap_or(&file.name))
                .with_flags(NodeFlags::FOCUSABLE)
                .into(),
            Element::Button(button) => Node::new("button")
                .with_text(button.label.as_str())
                .with_flags(NodeFlags::FOCUSABLE)
                .into(),
            Element::Title(text) => Node::new("h1").with_text(text.as_str()).into(),
            Element::Other(other) => Node::new(other.kind.as_str())
                .with_text(other.text.clone().unwrap_or_default())
                .into(),
        }
    }
}

// =============================================================================
// Presets
// =============================================================================

/// Default labelled-field theme with no root or stylesheet.
pub fn terminal() -> ThemeObject {
    ThemeObject::new().with_transform(DefaultTheme)
}

pub fn plain() -> ThemeObject {
    ThemeObject::new().with_transform(PlainTheme)
}

/// Terminal layout inside a dedicated `div#app` root.
pub fn framed() -> ThemeObject {
    ThemeObject::new()
        .with_transform(DefaultTheme)
        .with_root(Node::new("div").with_id("app").with_class("framed"))
        .with_init(|root| root.set_attr("data-theme", "framed"))
        .with_style_url("themes/framed.css")
}

/// Get a preset theme by name.
///
/// Case-insensitive; underscores are ignored.
pub fn get_preset(name: &str) -> Option<ThemeObject> {
    match name.to_lowercase().replace('_', "").as_str() {
        "terminal" | "default" => Some(terminal()),
        "plain" => Some(plain()),
        "framed" => Some(framed()),
        _ => None,
    }
}

/// List all available preset names.
pub fn preset_names() -> &'static [&'static str] {
    &["terminal", "plain", "framed"]
}
