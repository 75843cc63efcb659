//! Default theme - labelled fields laid out for the terminal host.
//!
//! Every kind gets a wrapper `div.field` as `main`, with the interactive
//! nodes inside selected through `evt`:
//!
//! | kind | nodes | evt |
//! |---|---|---|
//! | text-input | `label`, `input.text-input` | `input` |
//! | checkbox / radio | `label`, one `input.choice` per option | `.choice` |
//! | output | `div.output` | (main) |
//! | canvas | `label`, `canvas` | `canvas` |
//! | file | `span.file-display`, `button.file-button`, `div.file-drop` | file selectors |
//! | button | `button` | (main) |

use crate::dom::{Node, NodeFlags};
use crate::types::{Choice, Element};

use super::{ThemeContext, ThemeOutput, ThemeTransform};

/// The theme used until `style()` swaps it.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultTheme;

fn field(class: &str) -> Node {
    Node::new("div").with_class("field").with_class(class)
}

fn label(text: &str) -> Node {
    Node::new("label").with_class("label").with_text(text)
}

fn choices(choice: &Choice, input_type: &str) -> Node {
    let group = field(input_type).with_child(label(choice.label.as_deref().unwrap_or(&choice.name)));
    for option in &choice.options {
        group.append_child(
            Node::new("input")
                .with_class("choice")
                .with_attr("type", input_type)
                .with_attr("name", choice.name.as_str())
                .with_attr("data-value", option.value.as_str())
                .with_text(option.label.as_str())
                .with_flags(NodeFlags::FOCUSABLE),
        );
    }
    group
}

impl ThemeTransform for DefaultTheme {
    fn transform_elem(&self, element: &Element, _cx: &ThemeContext<'_>) -> ThemeOutput {
        match element {
            Element::TextInput(input) => {
                let field_input = Node::new("input")
                    .with_class("text-input")
                    .with_attr("type", "text")
                    .with_flags(NodeFlags::FOCUSABLE);
                if let Some(placeholder) = &input.placeholder {
                    field_input.set_attr("placeholder", placeholder.as_str());
                }
                let main = field("text")
                    .with_child(label(input.label.as_deref().unwrap_or(&input.name)))
                    .with_child(field_input);
                ThemeOutput::from(main).evt("input")
            }
            Element::Checkbox(choice) => ThemeOutput::from(choices(choice, "checkbox")).evt(".choice"),
            Element::Radio(choice) => ThemeOutput::from(choices(choice, "radio")).evt(".choice"),
            Element::Output(_) => Node::new("div").with_class("output").into(),
            Element::Canvas(canvas) => {
                let main = field("canvas");
                if let Some(name) = &canvas.name {
                    main.append_child(label(name));
                }
                main.append_child(Node::new("canvas").with_surface(canvas.width, canvas.height));
                ThemeOutput::from(main).evt("canvas")
            }
            Element::File(file) => {
                let main = field("file")
                    .with_child(label(file.label.as_deref().unwrap_or(&file.name)))
                    .with_child(Node::new("span").with_class("file-display").with_text("No file chosen"))
                    .with_child(
                        Node::new("button")
                            .with_class("file-button")
                            .with_text("Choose file")
                            .with_flags(NodeFlags::FOCUSABLE),
                    )
                    .with_child(Node::new("div").with_class("file-drop").with_text("or drop a file here"));
                ThemeOutput::from(main)
                    .file_display(".file-display")
                    .file_button(".file-button")
                    .file_drag_to(".file-drop")
            }
            Element::Button(button) => Node::new("button")
                .with_class("button")
                .with_text(button.label.as_str())
                .with_flags(NodeFlags::FOCUSABLE)
                .into(),
            Element::Title(text) => Node::new("h1").with_class("title").with_text(text.as_str()).into(),
            Element::Other(other) => {
                let node = Node::new("div").with_class(other.kind.as_str());
                if let Some(text) = &other.text {
                    node.set_text(text.as_str());
                }
                node.into()
            }
        }
    }
}
