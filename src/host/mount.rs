//! Mount API - terminal lifecycle, render effect and key routing.
//!
//! # Example
//!
//! ```ignore
//! use spark_stdio::host::{mount, run};
//!
//! let handle = mount(&app)?;
//! run(&handle)?;  // Blocks until Esc or Ctrl+C
//! handle.unmount();
//! ```
//!
//! The ONE render effect reads the engine's frame signal, so every refresh,
//! update pass or timer redraw repaints the screen. Keys act on the focused
//! node the way a browser would act on the focused control:
//!
//! | key              | effect                                   |
//! |------------------|------------------------------------------|
//! | Tab / Shift+Tab  | move focus                               |
//! | chars, Backspace | edit focused text input (fires `input`)  |
//! | Space            | toggle focused checkbox / pick radio     |
//! | Enter            | click focused button                     |
//! | Esc, Ctrl+C      | stop                                     |

use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::{poll, read, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use spark_signals::effect;

use crate::dom::{Node, NodeFlags};
use crate::engine::RenderEngine;
use crate::stdio::Stdio;

use super::paint::compose_frame;
use super::terminal::{self, TerminalGuard};

// =============================================================================
// Mount Handle
// =============================================================================

/// Handle returned by [`mount`]. Dropping it restores the terminal.
pub struct MountHandle {
    engine: RenderEngine,
    stop_effect: Option<Box<dyn FnOnce()>>,
    running: Rc<Cell<bool>>,
    last_tick: Cell<Instant>,
    guard: Option<TerminalGuard>,
}

impl MountHandle {
    /// Stop the render effect and restore the terminal.
    pub fn unmount(mut self) {
        self.running.set(false);
        self.shutdown();
    }

    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Ask the loop to stop after the current tick.
    pub fn stop(&self) {
        self.running.set(false);
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop_effect.take() {
            stop();
        }
        if let Some(mut guard) = self.guard.take() {
            let _ = guard.leave();
        }
    }
}

impl Drop for MountHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// Mount Function
// =============================================================================

/// Enter the terminal and start repainting `app` whenever its tree changes.
///
/// Focuses the first focusable node.
pub fn mount(app: &Stdio) -> io::Result<MountHandle> {
    let guard = TerminalGuard::enter()?;
    let engine = app.engine().clone();
    focus_next(&engine.root());

    let frame = engine.frame();
    let painter = engine.clone();
    let stop = effect(move || {
        // Read creates the dependency
        let _ = frame.get();

        let (width, height) = terminal::size();
        let rows = compose_frame(&painter.root(), width, height);
        if let Err(err) = terminal::write_frame(&mut io::stdout(), &rows) {
            log::warn!("frame write failed: {err}");
        }
    });

    log::debug!("mounted");
    Ok(MountHandle {
        engine,
        stop_effect: Some(Box::new(stop)),
        running: Rc::new(Cell::new(true)),
        last_tick: Cell::new(Instant::now()),
        guard: Some(guard),
    })
}

/// Unmount and clean up.
pub fn unmount(handle: MountHandle) {
    handle.unmount();
}

// =============================================================================
// Event Loop
// =============================================================================

/// Process at most one terminal event, then advance canvas timers.
///
/// Returns `Ok(false)` once the app should stop.
pub fn tick(handle: &MountHandle) -> io::Result<bool> {
    if !handle.is_running() {
        return Ok(false);
    }

    // Poll with short timeout (~60fps)
    if poll(Duration::from_millis(16))? {
        match read()? {
            CrosstermEvent::Key(key) => {
                if route_key(&handle.engine, key) == KeyFlow::Stop {
                    handle.stop();
                }
            }
            CrosstermEvent::Resize(..) => handle.engine.request_frame(),
            _ => {}
        }
    }

    let now = Instant::now();
    let elapsed = now.duration_since(handle.last_tick.replace(now));
    handle.engine.advance(elapsed);

    Ok(handle.is_running())
}

/// Run the event loop until stopped.
pub fn run(handle: &MountHandle) -> io::Result<()> {
    while tick(handle)? {}
    Ok(())
}

// =============================================================================
// Focus
// =============================================================================

fn focusables(root: &Node) -> Vec<Node> {
    root.descendants()
        .into_iter()
        .filter(|node| {
            let flags = node.flags();
            flags.contains(NodeFlags::FOCUSABLE) && !flags.contains(NodeFlags::HIDDEN)
        })
        .collect()
}

pub fn focused(root: &Node) -> Option<Node> {
    root.descendants()
        .into_iter()
        .find(|node| node.flags().contains(NodeFlags::FOCUSED))
}

fn move_focus(root: &Node, forward: bool) -> bool {
    let nodes = focusables(root);
    if nodes.is_empty() {
        return false;
    }
    let current = nodes.iter().position(|node| node.flags().contains(NodeFlags::FOCUSED));
    let next = match (current, forward) {
        (None, true) => 0,
        (None, false) => nodes.len() - 1,
        (Some(i), true) => (i + 1) % nodes.len(),
        (Some(i), false) => (i + nodes.len() - 1) % nodes.len(),
    };
    if let Some(i) = current {
        nodes[i].remove_flags(NodeFlags::FOCUSED);
    }
    nodes[next].insert_flags(NodeFlags::FOCUSED);
    true
}

/// Focus the next focusable node, wrapping. Returns false if there is none.
pub fn focus_next(root: &Node) -> bool {
    move_focus(root, true)
}

pub fn focus_previous(root: &Node) -> bool {
    move_focus(root, false)
}

// =============================================================================
// Key Routing
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFlow {
    Continue,
    Stop,
}

fn input_type(node: &Node) -> Option<String> {
    (node.tag() == "input").then(|| node.attr("type").unwrap_or_else(|| "text".into()))
}

/// Apply one key press to the engine's tree.
pub fn route_key(engine: &RenderEngine, key: KeyEvent) -> KeyFlow {
    if key.kind == KeyEventKind::Release {
        return KeyFlow::Continue;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if key.code == KeyCode::Esc || (ctrl && key.code == KeyCode::Char('c')) {
        return KeyFlow::Stop;
    }

    let root = engine.root();
    match key.code {
        KeyCode::Tab => {
            focus_next(&root);
        }
        KeyCode::BackTab => {
            focus_previous(&root);
        }
        code => {
            let Some(node) = focused(&root) else {
                return KeyFlow::Continue;
            };
            activate(&root, &node, code);
        }
    }

    engine.request_frame();
    KeyFlow::Continue
}

fn activate(root: &Node, node: &Node, code: KeyCode) {
    match (input_type(node).as_deref(), code) {
        (Some("checkbox"), KeyCode::Char(' ')) => node.set_checked(!node.is_checked()),
        (Some("radio"), KeyCode::Char(' ')) => {
            let group = node.attr("name");
            for other in root.query_selector_all("input[type=radio]").unwrap_or_default() {
                if !other.ptr_eq(node) && other.attr("name") == group {
                    other.remove_flags(NodeFlags::CHECKED);
                }
            }
            node.set_checked(true);
        }
        (Some("text"), KeyCode::Char(c)) => {
            let mut value = node.value();
            value.push(c);
            node.input_text(value);
        }
        (Some("text"), KeyCode::Backspace) => {
            let mut value = node.value();
            if value.pop().is_some() {
                node.input_text(value);
            }
        }
        (None, KeyCode::Enter) if node.tag() == "button" => node.click(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Button, Choice, Element, Output, TextInput, Value};

    fn setup() -> Stdio {
        let app = Stdio::new();
        app.ready().unwrap();
        app
    }

    fn press(engine: &RenderEngine, code: KeyCode) -> KeyFlow {
        route_key(engine, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_typing_into_text_input() {
        let app = setup();
        app.add([
            Element::from(TextInput::new("a").transform(|v| Value::Text(v.to_display().to_uppercase()))),
            Output::link("a").into(),
        ])
        .unwrap();
        let engine = app.engine();

        press(engine, KeyCode::Tab);
        press(engine, KeyCode::Char('h'));
        press(engine, KeyCode::Char('i'));
        press(engine, KeyCode::Char('x'));
        press(engine, KeyCode::Backspace);

        assert_eq!(app.scope().get("a"), Some(Value::Text("HI".into())));
        assert_eq!(engine.output_nodes("a")[0].text(), "HI");
    }

    #[test]
    fn test_focus_wraps() {
        let app = setup();
        app.add([Button::new("one", |_| {}), Button::new("two", |_| {})]).unwrap();
        let root = app.root();

        press(app.engine(), KeyCode::Tab);
        assert_eq!(focused(&root).unwrap().text(), "one");
        press(app.engine(), KeyCode::Tab);
        press(app.engine(), KeyCode::Tab);
        assert_eq!(focused(&root).unwrap().text(), "one");
        press(app.engine(), KeyCode::BackTab);
        assert_eq!(focused(&root).unwrap().text(), "two");
    }

    #[test]
    fn test_space_picks_radio() {
        let app = setup();
        app.add([Element::radio(Choice::new("size").option("S", "s").option("L", "l"))])
            .unwrap();
        let engine = app.engine();

        press(engine, KeyCode::Tab);
        press(engine, KeyCode::Char(' '));
        press(engine, KeyCode::Tab);
        press(engine, KeyCode::Char(' '));

        assert_eq!(app.scope().get("size"), Some(Value::Text("l".into())));
        let checked: Vec<bool> = app
            .root()
            .query_selector_all(".choice")
            .unwrap()
            .iter()
            .map(Node::is_checked)
            .collect();
        assert_eq!(checked, vec![false, true]);
    }

    #[test]
    fn test_enter_clicks_button() {
        let app = setup();
        app.add([Button::new("go", |scope| scope.set("clicked", true))]).unwrap();

        press(app.engine(), KeyCode::Tab);
        press(app.engine(), KeyCode::Enter);

        assert_eq!(app.scope().get("clicked"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_stop_keys() {
        let app = setup();
        assert_eq!(press(app.engine(), KeyCode::Esc), KeyFlow::Stop);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(route_key(app.engine(), ctrl_c), KeyFlow::Stop);
        assert_eq!(press(app.engine(), KeyCode::Char('c')), KeyFlow::Continue);
    }
}
