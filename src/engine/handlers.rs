//! Element handlers - one wiring routine per element kind.
//!
//! Each routine receives the theme's nodes for one descriptor and attaches
//! listeners, registry entries or timers:
//!
//! | kind       | wiring                                   | scope write                      |
//! |------------|------------------------------------------|----------------------------------|
//! | text-input | `input` on the sole target               | `transform(text)`                |
//! | checkbox   | `change` on every target                 | checked `data-value`s, node order |
//! | radio      | `change` on every target                 | `data-value` of the changed node |
//! | output     | OutputRegistry under each linked key     | none                             |
//! | canvas     | timer, or the update path                | none                             |
//! | file       | picker button, drag-over, drop, drag-end | `transform(file)`                |
//! | button     | `click` on the sole target               | none (user handler)              |
//!
//! Listeners hold weak handles to nodes other than the one they are
//! registered on, so the tree never owns itself through a listener.

use std::rc::Rc;

use crate::dom::{DataTransfer, Event, EventKind, FileBlob, Node, NodeFlags, WeakNode};
use crate::error::{EngineError, Result};
use crate::scope::ScopeStore;
use crate::theme::ThemeOutput;
use crate::types::{Button, Canvas, Choice, Element, ElementKind, FileInput, Interval, Output, TextInput, Value};

use super::registry::{CanvasEntry, CanvasRegistry, OutputBinding, OutputRegistry, Redraw};
use super::render::RenderEngine;

// =============================================================================
// Build State
// =============================================================================

/// Registries and nodes accumulated by one refresh pass.
///
/// Only moved into the engine once every descriptor wired successfully.
#[derive(Debug, Default)]
pub(crate) struct Build {
    pub outputs: OutputRegistry,
    pub canvases: CanvasRegistry,
    pub buffer: Vec<Node>,
    /// Text-input keys absent from scope, set to `""` after the commit.
    pub defaults: Vec<String>,
}

/// Main node and event targets of one theme output.
#[derive(Debug)]
pub(crate) struct Rendered {
    pub main: Node,
    pub targets: Vec<Node>,
}

/// Pick `elem[main]` and run the `evt` selector inside it.
pub(crate) fn resolve(output: &ThemeOutput, index: usize, kind: ElementKind) -> Result<Rendered> {
    let main = output
        .elem
        .get(output.main)
        .cloned()
        .ok_or(EngineError::MainOutOfRange {
            index,
            kind: kind.as_str(),
            main: output.main,
            len: output.elem.len(),
        })?;

    let targets = match &output.evt {
        Some(selector) => main.query_selector_all(selector)?,
        None => vec![main.clone()],
    };

    Ok(Rendered { main, targets })
}

/// First target, or `MissingTarget` naming the selector that came up empty.
fn sole_target(output: &ThemeOutput, rendered: &Rendered, index: usize, kind: ElementKind) -> Result<Node> {
    rendered
        .targets
        .first()
        .cloned()
        .ok_or_else(|| EngineError::MissingTarget {
            index,
            kind: kind.as_str(),
            selector: output.evt.clone().unwrap_or_default(),
        })
}

/// Node matched by an optional selector inside `main`; `None` means `main`.
fn select_in(main: &Node, selector: Option<&str>, index: usize, kind: ElementKind) -> Result<Node> {
    let Some(selector) = selector else {
        return Ok(main.clone());
    };
    main.query_selector(selector)?.ok_or_else(|| EngineError::MissingTarget {
        index,
        kind: kind.as_str(),
        selector: selector.to_string(),
    })
}

// =============================================================================
// Dispatch
// =============================================================================

/// Wire one descriptor. Title and passthrough kinds get nothing.
pub(crate) fn wire(
    engine: &RenderEngine,
    build: &mut Build,
    element: &Element,
    output: &ThemeOutput,
    index: usize,
) -> Result<()> {
    let kind = element.kind();
    match element {
        Element::TextInput(input) => {
            let rendered = resolve(output, index, kind)?;
            let target = sole_target(output, &rendered, index, kind)?;
            wire_text_input(engine.scope(), &mut build.defaults, input, &target);
        }
        Element::Checkbox(choice) => {
            let rendered = resolve(output, index, kind)?;
            wire_checkbox(engine.scope(), choice, &rendered.targets);
        }
        Element::Radio(choice) => {
            let rendered = resolve(output, index, kind)?;
            wire_radio(engine.scope(), choice, &rendered.targets);
        }
        Element::Output(sink) => {
            let rendered = resolve(output, index, kind)?;
            wire_output(engine.scope(), &mut build.outputs, sink, &rendered.targets);
        }
        Element::Canvas(canvas) => {
            let rendered = resolve(output, index, kind)?;
            let target = sole_target(output, &rendered, index, kind)?;
            wire_canvas(engine, &mut build.canvases, canvas, &target, index)?;
        }
        Element::File(file) => {
            let rendered = resolve(output, index, kind)?;
            wire_file(engine, file, output, &rendered.main, index)?;
        }
        Element::Button(button) => {
            let rendered = resolve(output, index, kind)?;
            let target = sole_target(output, &rendered, index, kind)?;
            wire_button(engine.scope(), button, &target);
        }
        Element::Title(_) | Element::Other(_) => {}
    }
    Ok(())
}

// =============================================================================
// Inputs
// =============================================================================

fn wire_text_input(scope: &ScopeStore, defaults: &mut Vec<String>, input: &TextInput, target: &Node) {
    // Keep what an earlier pass (or the user) already wrote
    match scope.get(&input.name) {
        None => defaults.push(input.name.clone()),
        Some(Value::Text(text)) if input.transform.is_empty() => target.set_value(text),
        Some(_) => {}
    }

    let scope = scope.clone();
    let name = input.name.clone();
    let transform = input.transform.clone();
    target.add_event_listener(EventKind::Input, move |node, _| {
        scope.set(name.as_str(), transform.apply(Value::Text(node.value())));
    });
}

fn wire_checkbox(scope: &ScopeStore, choice: &Choice, targets: &[Node]) {
    let group: Rc<[WeakNode]> = targets.iter().map(Node::downgrade).collect();

    for target in targets {
        let scope = scope.clone();
        let name = choice.name.clone();
        let group = group.clone();
        target.add_event_listener(EventKind::Change, move |_, _| {
            let checked: Vec<String> = group
                .iter()
                .filter_map(WeakNode::upgrade)
                .filter(Node::is_checked)
                .map(|node| node.data_value().unwrap_or_default())
                .collect();
            scope.set(name.as_str(), Value::List(checked));
        });
    }
}

fn wire_radio(scope: &ScopeStore, choice: &Choice, targets: &[Node]) {
    for target in targets {
        let scope = scope.clone();
        let name = choice.name.clone();
        target.add_event_listener(EventKind::Change, move |node, _| {
            let value = node.data_value().map(Value::Text).unwrap_or_default();
            scope.set(name.as_str(), value);
        });
    }
}

fn wire_button(scope: &ScopeStore, button: &Button, target: &Node) {
    let scope = scope.clone();
    let handler = button.handler.clone();
    target.add_event_listener(EventKind::Click, move |_, _| handler(&scope));
}

// =============================================================================
// Sinks
// =============================================================================

fn wire_output(scope: &ScopeStore, outputs: &mut OutputRegistry, sink: &Output, targets: &[Node]) {
    for target in targets {
        for key in &sink.link {
            if let Some(value) = scope.get(key) {
                target.set_text(sink.transform.apply(value).to_display());
            }
            outputs.register(
                key.as_str(),
                OutputBinding {
                    node: target.clone(),
                    transform: sink.transform.clone(),
                },
            );
        }
    }
}

fn wire_canvas(
    engine: &RenderEngine,
    canvases: &mut CanvasRegistry,
    canvas: &Canvas,
    target: &Node,
    index: usize,
) -> Result<()> {
    let context = target.context_2d().ok_or(EngineError::MissingSurface {
        index,
        kind: ElementKind::Canvas.as_str(),
    })?;

    let scope = engine.scope().clone();
    let node = target.clone();
    let draw = canvas.draw.clone();
    let redraw: Redraw = Rc::new(move || draw(&context, &scope, &node));

    let entry = match canvas.interval {
        Interval::OnUpdate => CanvasEntry {
            redraw,
            on_update: true,
            timer: None,
        },
        Interval::Every(period) => CanvasEntry {
            timer: Some(engine.start_timer(period, redraw.clone())),
            redraw,
            on_update: false,
        },
    };
    canvases.register(entry);
    Ok(())
}

// =============================================================================
// Files
// =============================================================================

fn wire_file(engine: &RenderEngine, file: &FileInput, output: &ThemeOutput, main: &Node, index: usize) -> Result<()> {
    let kind = ElementKind::File;
    let display = select_in(main, output.file_display.as_deref(), index, kind)?;
    let button = select_in(main, output.file_button.as_deref(), index, kind)?;
    let drop_target = select_in(main, output.file_drag_to.as_deref(), index, kind)?;

    let have_file: Rc<dyn Fn(Option<FileBlob>)> = {
        let scope = engine.scope().clone();
        let name = file.name.clone();
        let transform = file.transform.clone();
        let display = display.downgrade();
        Rc::new(move |file| {
            let Some(file) = file else {
                return;
            };
            if let Some(display) = display.upgrade() {
                display.set_text(file.name());
            }
            scope.set(name.as_str(), transform.apply(Value::File(file.slice())));
        })
    };

    let picker = engine.document().create_element("input");
    picker.set_attr("type", "file");
    picker.insert_flags(NodeFlags::HIDDEN);
    {
        let have_file = have_file.clone();
        picker.add_event_listener(EventKind::Input, move |node, _| {
            have_file(node.files().into_iter().next());
        });
    }

    let document = engine.document().downgrade();
    button.add_event_listener(EventKind::Click, move |_, _| {
        let Some(document) = document.upgrade() else {
            return;
        };
        picker.set_files(document.choose_files());
        picker.dispatch(&mut Event::new(EventKind::Input));
    });

    drop_target.add_event_listener(EventKind::DragOver, |_, event| event.prevent_default());
    drop_target.add_event_listener(EventKind::Drop, move |_, event| {
        event.prevent_default();
        have_file(event.data_transfer().and_then(DataTransfer::first_file));
    });
    drop_target.add_event_listener(EventKind::DragEnd, |_, event| {
        if let Some(transfer) = event.data_transfer_mut() {
            transfer.clear();
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Document, TransferItem};
    use crate::engine::EngineConfig;
    use crate::theme::DefaultTheme;
    use crate::types::{FileInput, Passthrough};

    fn setup() -> (RenderEngine, Build) {
        let engine = RenderEngine::new(
            Document::new(),
            ScopeStore::new(),
            Rc::new(DefaultTheme),
            EngineConfig::default(),
        );
        (engine, Build::default())
    }

    #[test]
    fn test_resolve_defaults_to_main() {
        let output = ThemeOutput::from(Node::new("input"));
        let rendered = resolve(&output, 0, ElementKind::TextInput).unwrap();
        assert_eq!(rendered.targets.len(), 1);
        assert!(rendered.targets[0].ptr_eq(&rendered.main));
    }

    #[test]
    fn test_resolve_main_out_of_range() {
        let output = ThemeOutput::from(Node::new("input")).main(3);
        let err = resolve(&output, 2, ElementKind::Radio).unwrap_err();
        assert_eq!(
            err,
            EngineError::MainOutOfRange {
                index: 2,
                kind: "radio",
                main: 3,
                len: 1
            }
        );
    }

    #[test]
    fn test_text_input_needs_target() {
        let (engine, mut build) = setup();
        let element: Element = TextInput::new("a").into();
        let output = ThemeOutput::from(Node::new("div")).evt("input");

        let err = wire(&engine, &mut build, &element, &output, 0).unwrap_err();
        assert!(matches!(err, EngineError::MissingTarget { selector, .. } if selector == "input"));
    }

    #[test]
    fn test_text_input_initialises_once() {
        let (engine, mut build) = setup();
        let element: Element = TextInput::new("a").into();
        let field = Node::new("input");

        wire(&engine, &mut build, &element, &ThemeOutput::from(field.clone()), 0).unwrap();
        // Scope is only written once the pass commits
        assert_eq!(build.defaults, vec!["a"]);
        assert!(!engine.scope().contains("a"));

        field.input_text("kept");
        let rebuilt = Node::new("input");
        wire(&engine, &mut build, &element, &ThemeOutput::from(rebuilt.clone()), 0).unwrap();

        assert_eq!(engine.scope().value("a").to_display(), "kept");
        assert_eq!(rebuilt.value(), "kept");
    }

    #[test]
    fn test_radio_writes_changed_value() {
        let (engine, mut build) = setup();
        let element = Element::radio(Choice::new("size"));
        let group = Node::new("div")
            .with_child(Node::new("input").with_attr("data-value", "s"))
            .with_child(Node::new("input").with_attr("data-value", "l"))
            .with_child(Node::new("input"));
        let output = ThemeOutput::from(group.clone()).evt("input");

        wire(&engine, &mut build, &element, &output, 0).unwrap();
        let options = group.children();
        options[1].set_checked(true);
        assert_eq!(engine.scope().get("size"), Some(Value::Text("l".into())));

        options[2].set_checked(true);
        assert_eq!(engine.scope().get("size"), Some(Value::Null));
    }

    #[test]
    fn test_output_registers_every_target_and_key() {
        let (engine, mut build) = setup();
        engine.scope().set("a", "x");
        let element: Element = Output::links(["a", "b"]).into();

        wire(&engine, &mut build, &element, &ThemeOutput::from(Node::new("span")), 0).unwrap();

        assert_eq!(build.outputs.keys(), vec!["a", "b"]);
        assert_eq!(build.outputs.bindings("a")[0].node.text(), "x");
    }

    #[test]
    fn test_canvas_needs_surface() {
        let (engine, mut build) = setup();
        let element: Element = Canvas::new(4, 2, |_, _, _| {}).into();

        let err = wire(&engine, &mut build, &element, &ThemeOutput::from(Node::new("canvas")), 3).unwrap_err();
        assert_eq!(err, EngineError::MissingSurface { index: 3, kind: "canvas" });
    }

    #[test]
    fn test_file_drop_item_list_and_file_list() {
        let (engine, mut build) = setup();
        let element: Element = FileInput::new("doc").into();
        let target = Node::new("div");

        wire(&engine, &mut build, &element, &ThemeOutput::from(target.clone()), 0).unwrap();

        let event = target.drop_transfer(DataTransfer::Items(vec![TransferItem::File(FileBlob::new(
            "a.txt",
            b"A".to_vec(),
        ))]));
        assert!(event.default_prevented());
        assert_eq!(target.text(), "a.txt");

        target.drop_transfer(DataTransfer::Files(vec![FileBlob::new("b.txt", b"B".to_vec())]));
        assert_eq!(engine.scope().value("doc").as_file().map(FileBlob::name), Some("b.txt"));
    }

    #[test]
    fn test_file_empty_drop_is_noop() {
        let (engine, mut build) = setup();
        let element: Element = FileInput::new("doc").into();
        let target = Node::new("div");
        wire(&engine, &mut build, &element, &ThemeOutput::from(target.clone()), 0).unwrap();

        target.drop_transfer(DataTransfer::Items(vec![TransferItem::Text("hello".into())]));
        target.drop_transfer(DataTransfer::Files(Vec::new()));

        assert!(!engine.scope().contains("doc"));
    }

    #[test]
    fn test_passthrough_gets_no_listeners() {
        let (engine, mut build) = setup();
        let node = Node::new("marquee");
        let element: Element = Passthrough::new("marquee").into();

        wire(&engine, &mut build, &element, &ThemeOutput::from(node.clone()), 0).unwrap();

        assert_eq!(node.listener_count(), 0);
        assert!(build.outputs.is_empty());
        assert!(build.canvases.is_empty());
    }
}
