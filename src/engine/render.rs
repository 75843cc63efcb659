//! RenderEngine - descriptor list, full refresh and targeted update.
//!
//! ```text
//! push/remove ──→ elements ──refresh()──→ theme ──→ handlers ──→ buffer ──commit──→ root
//!                                                       │
//!                 scope.set(k) ──→ update(k) ──→ outputs[k], on-update canvases
//!                 advance(dt)  ──→ timer-driven canvases
//! ```
//!
//! The engine is a cheap `Clone` handle. It subscribes to its scope on
//! construction and unsubscribes when the last handle drops.
//!
//! # Refresh
//!
//! A refresh wires every descriptor into a fresh [`Build`]. Nothing live is
//! touched until the whole pass succeeds: then the previous canvas timers are
//! cancelled, the new registries replace the old ones, the buffer is
//! committed into the root and absent text-input keys are set to `""`. If the
//! pass fails or a user closure panics inside it, the timers it started are
//! cancelled and the engine keeps its previous tree, registries and scope.
//!
//! # Update
//!
//! Every scope write calls [`RenderEngine::update`] exactly once. Each output
//! bound to the key re-renders `transform(current value)`; a binding whose
//! key was written again while its transform ran keeps the newer render.
//! With [`UpdatePolicy::Queued`] writes made during a pass are deferred until
//! the pass returns, in write order.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use spark_signals::{signal, Signal};

use crate::dom::{Document, Node};
use crate::error::Result;
use crate::scope::{ScopeStore, SubscriptionId};
use crate::theme::{ThemeContext, ThemeTransform};
use crate::types::Element;

use super::config::{EngineConfig, UpdatePolicy};
use super::handlers::{self, Build};
use super::reconcile::{FullRebuild, Reconcile};
use super::registry::{CanvasRegistry, OutputRegistry, Redraw};
use super::timer::{TimerId, TimerQueue};

struct EngineState {
    elements: Vec<Element>,
    title: Option<String>,
    root: Node,
    ready: bool,
    outputs: OutputRegistry,
    canvases: CanvasRegistry,
}

struct EngineInner {
    document: Document,
    scope: ScopeStore,
    theme: RefCell<Rc<dyn ThemeTransform>>,
    reconciler: Box<dyn Reconcile>,
    config: EngineConfig,
    state: RefCell<EngineState>,
    timers: RefCell<TimerQueue>,
    updating: Cell<bool>,
    pending: RefCell<VecDeque<String>>,
    update_count: Cell<u64>,
    frame: Signal<u64>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl Drop for EngineInner {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.scope.unsubscribe(id);
        }
    }
}

/// Shared handle to one render engine.
#[derive(Clone)]
pub struct RenderEngine {
    inner: Rc<EngineInner>,
}

/// Clears the in-pass flag even if a user closure panics mid-pass.
struct UpdateGuard<'a>(&'a EngineInner);

impl<'a> UpdateGuard<'a> {
    fn enter(inner: &'a EngineInner) -> Self {
        inner.updating.set(true);
        Self(inner)
    }
}

impl Drop for UpdateGuard<'_> {
    fn drop(&mut self) {
        self.0.updating.set(false);
        self.0.pending.borrow_mut().clear();
    }
}

/// Owns an in-flight [`Build`]; cancels its timers unless the pass commits.
struct PendingBuild<'a> {
    inner: &'a EngineInner,
    build: Option<Build>,
}

impl<'a> PendingBuild<'a> {
    fn new(inner: &'a EngineInner) -> Self {
        Self {
            inner,
            build: Some(Build::default()),
        }
    }

    fn build_mut(&mut self) -> &mut Build {
        self.build.get_or_insert_with(Build::default)
    }

    fn commit(mut self) -> Build {
        self.build.take().unwrap_or_default()
    }
}

impl Drop for PendingBuild<'_> {
    fn drop(&mut self) {
        let Some(build) = self.build.take() else {
            return;
        };
        // May run while unwinding; never panic on a held borrow
        let Ok(mut timers) = self.inner.timers.try_borrow_mut() else {
            return;
        };
        for id in build.canvases.timers() {
            timers.cancel(id);
        }
    }
}

impl RenderEngine {
    /// Engine rendering into `document.body()` with the full-rebuild reconciler.
    pub fn new(
        document: Document,
        scope: ScopeStore,
        theme: Rc<dyn ThemeTransform>,
        config: EngineConfig,
    ) -> Self {
        Self::with_reconciler(document, scope, theme, config, FullRebuild)
    }

    pub fn with_reconciler(
        document: Document,
        scope: ScopeStore,
        theme: Rc<dyn ThemeTransform>,
        config: EngineConfig,
        reconciler: impl Reconcile + 'static,
    ) -> Self {
        let root = document.body();
        let inner = Rc::new(EngineInner {
            timers: RefCell::new(TimerQueue::new(config.min_timer_period)),
            document,
            scope,
            theme: RefCell::new(theme),
            reconciler: Box::new(reconciler),
            config,
            state: RefCell::new(EngineState {
                elements: Vec::new(),
                title: None,
                root,
                ready: false,
                outputs: OutputRegistry::default(),
                canvases: CanvasRegistry::default(),
            }),
            updating: Cell::new(false),
            pending: RefCell::new(VecDeque::new()),
            update_count: Cell::new(0),
            frame: signal(0),
            subscription: Cell::new(None),
        });

        let weak: Weak<EngineInner> = Rc::downgrade(&inner);
        let id = inner.scope.subscribe(move |key| {
            if let Some(inner) = weak.upgrade() {
                RenderEngine { inner }.update(key);
            }
        });
        inner.subscription.set(Some(id));

        Self { inner }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    pub fn scope(&self) -> &ScopeStore {
        &self.inner.scope
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Container whose children are replaced on every refresh.
    pub fn root(&self) -> Node {
        self.inner.state.borrow().root.clone()
    }

    /// Render into `root` from the next refresh on.
    pub fn set_root(&self, root: Node) {
        self.inner.state.borrow_mut().root = root;
    }

    /// Swap the theme transform. Takes effect on the next refresh.
    pub fn set_theme(&self, theme: Rc<dyn ThemeTransform>) {
        *self.inner.theme.borrow_mut() = theme;
    }

    // =========================================================================
    // Descriptors
    // =========================================================================

    pub fn push(&self, element: impl Into<Element>) {
        self.inner.state.borrow_mut().elements.push(element.into());
    }

    pub fn remove(&self, index: usize) -> Option<Element> {
        let mut state = self.inner.state.borrow_mut();
        (index < state.elements.len()).then(|| state.elements.remove(index))
    }

    pub fn clear(&self) {
        self.inner.state.borrow_mut().elements.clear();
    }

    /// Keep only the first `len` descriptors.
    pub fn truncate(&self, len: usize) {
        self.inner.state.borrow_mut().elements.truncate(len);
    }

    pub fn elements(&self) -> Vec<Element> {
        self.inner.state.borrow().elements.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn title(&self) -> Option<String> {
        self.inner.state.borrow().title.clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.inner.state.borrow_mut().title = Some(title.into());
    }

    /// Allow refreshes. Until then [`refresh`](Self::refresh) does nothing.
    pub fn set_ready(&self) {
        self.inner.state.borrow_mut().ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.inner.state.borrow().ready
    }

    // =========================================================================
    // Refresh
    // =========================================================================

    /// Rebuild the whole tree from the descriptor list.
    pub fn refresh(&self) -> Result<()> {
        if !self.is_ready() {
            log::trace!("refresh skipped: document not ready");
            return Ok(());
        }

        let mut pending = PendingBuild::new(&self.inner);
        if let Err(err) = self.build(pending.build_mut()) {
            drop(pending);
            log::warn!("refresh failed, keeping previous tree: {err}");
            return Err(err);
        }

        let Build {
            outputs,
            canvases,
            buffer,
            defaults,
        } = pending.commit();
        let (previous, root) = {
            let mut state = self.inner.state.borrow_mut();
            state.outputs = outputs;
            let previous = std::mem::replace(&mut state.canvases, canvases);
            (previous, state.root.clone())
        };
        {
            let mut timers = self.inner.timers.borrow_mut();
            for id in previous.timers() {
                timers.cancel(id);
            }
        }

        let count = buffer.len();
        self.inner.reconciler.commit(&root, buffer);
        log::debug!("refresh committed {count} node(s) into <{}>", root.tag());

        let scope = &self.inner.scope;
        for key in defaults {
            if !scope.contains(&key) {
                scope.set(key.as_str(), "");
            }
        }
        self.request_frame();
        Ok(())
    }

    fn build(&self, build: &mut Build) -> Result<()> {
        let (elements, title) = {
            let state = self.inner.state.borrow();
            (state.elements.clone(), state.title.clone())
        };
        let theme = self.inner.theme.borrow().clone();

        if let Some(title) = title {
            let output = theme.transform_elem(&Element::Title(title), &ThemeContext::new(&elements, None));
            build.buffer.extend(output.elem);
        }

        for (index, element) in elements.iter().enumerate() {
            let output = theme.transform_elem(element, &ThemeContext::new(&elements, Some(index)));
            handlers::wire(self, build, element, &output, index)?;
            build.buffer.extend(output.elem);
        }
        Ok(())
    }

    // =========================================================================
    // Update
    // =========================================================================

    /// Re-render outputs bound to `key` and every on-update canvas.
    pub fn update(&self, key: &str) {
        match self.inner.config.update_policy {
            UpdatePolicy::Reentrant => self.update_pass(key),
            UpdatePolicy::Queued => {
                if self.inner.updating.get() {
                    self.inner.pending.borrow_mut().push_back(key.to_string());
                    return;
                }
                let _guard = UpdateGuard::enter(&self.inner);
                self.update_pass(key);
                loop {
                    let next = self.inner.pending.borrow_mut().pop_front();
                    match next {
                        Some(key) => self.update_pass(&key),
                        None => break,
                    }
                }
            }
        }
    }

    fn update_pass(&self, key: &str) {
        let (bindings, redraws) = {
            let state = self.inner.state.borrow();
            (state.outputs.bindings(key).to_vec(), state.canvases.on_update_redraws())
        };
        self.inner.update_count.set(self.inner.update_count.get() + 1);
        log::trace!("update `{key}`: {} output(s), {} canvas(es)", bindings.len(), redraws.len());

        let scope = &self.inner.scope;
        for binding in &bindings {
            let version = scope.version(key);
            let rendered = binding.transform.apply(scope.value(key));
            if scope.version(key) != version {
                continue;
            }
            binding.node.set_text(rendered.to_display());
        }

        for redraw in redraws {
            redraw();
        }
        self.request_frame();
    }

    /// Number of update passes run so far.
    pub fn update_count(&self) -> u64 {
        self.inner.update_count.get()
    }

    // =========================================================================
    // Timers
    // =========================================================================

    pub(crate) fn start_timer(&self, period: Duration, redraw: Redraw) -> TimerId {
        let id = self.inner.timers.borrow_mut().start(period, redraw);
        log::trace!("timer {id:?} started every {period:?}");
        id
    }

    /// Move the timer clock forward, firing due canvas redraws in order.
    ///
    /// Returns how many redraws ran.
    pub fn advance(&self, elapsed: Duration) -> usize {
        let until = self.inner.timers.borrow().now() + elapsed;
        let mut fired = 0;
        loop {
            let next = self.inner.timers.borrow_mut().pop_due(until);
            let Some(callback) = next else {
                break;
            };
            callback();
            fired += 1;
        }
        self.inner.timers.borrow_mut().settle(until);

        if fired > 0 {
            log::trace!("advance {elapsed:?}: {fired} redraw(s)");
            self.request_frame();
        }
        fired
    }

    pub fn active_timer_count(&self) -> usize {
        self.inner.timers.borrow().len()
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Bumped whenever the live tree changes. Read it in an effect to repaint.
    pub fn frame(&self) -> Signal<u64> {
        self.inner.frame.clone()
    }

    pub fn request_frame(&self) {
        self.inner.frame.set(self.inner.frame.get() + 1);
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Keys with at least one output binding, sorted.
    pub fn output_keys(&self) -> Vec<String> {
        self.inner.state.borrow().outputs.keys()
    }

    /// Nodes bound to `key`, in render order.
    pub fn output_nodes(&self, key: &str) -> Vec<Node> {
        self.inner
            .state
            .borrow()
            .outputs
            .bindings(key)
            .iter()
            .map(|binding| binding.node.clone())
            .collect()
    }

    pub fn output_binding_count(&self) -> usize {
        self.inner.state.borrow().outputs.len()
    }

    /// `true` per update-driven canvas, `false` per timer-driven one.
    pub fn canvas_modes(&self) -> Vec<bool> {
        self.inner.state.borrow().canvases.modes()
    }
}

impl fmt::Debug for RenderEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("RenderEngine")
            .field("elements", &state.elements.len())
            .field("title", &state.title)
            .field("ready", &state.ready)
            .field("outputs", &state.outputs)
            .field("canvases", &state.canvases)
            .field("policy", &self.inner.config.update_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::theme::{DefaultTheme, ThemeOutput};
    use crate::types::{Canvas, Choice, Interval, Output, Passthrough, TextInput, Value};

    fn setup() -> RenderEngine {
        let engine = RenderEngine::new(
            Document::new(),
            ScopeStore::new(),
            Rc::new(DefaultTheme),
            EngineConfig::default(),
        );
        engine.set_ready();
        engine
    }

    fn upper(v: Value) -> Value {
        Value::Text(v.to_display().to_uppercase())
    }

    #[test]
    fn test_refresh_noop_until_ready() {
        let engine = RenderEngine::new(
            Document::new(),
            ScopeStore::new(),
            Rc::new(DefaultTheme),
            EngineConfig::default(),
        );
        engine.push(Output::link("a"));

        engine.refresh().unwrap();
        assert_eq!(engine.root().child_count(), 0);

        engine.set_ready();
        engine.refresh().unwrap();
        assert_eq!(engine.root().child_count(), 1);
    }

    #[test]
    fn test_title_rendered_first() {
        let engine = setup();
        engine.push(Output::link("a"));
        engine.set_title("Demo");
        engine.refresh().unwrap();

        let first = engine.root().first_child().unwrap();
        assert_eq!(first.text(), "Demo");
        assert_eq!(engine.root().child_count(), 2);
    }

    #[test]
    fn test_update_renders_outputs() {
        let engine = setup();
        engine.push(Output::link("a").transform(upper));
        engine.push(Output::link("a"));
        engine.refresh().unwrap();

        engine.scope().set("a", "hi");

        let texts: Vec<String> = engine.output_nodes("a").iter().map(Node::text).collect();
        assert_eq!(texts, vec!["HI", "hi"]);
    }

    #[test]
    fn test_one_update_per_write() {
        let engine = setup();
        engine.push(Output::link("a"));
        engine.refresh().unwrap();
        let before = engine.update_count();

        engine.scope().set("a", 1);
        engine.scope().set("a", 1);
        engine.scope().set("b", 2);

        assert_eq!(engine.update_count() - before, 3);
    }

    #[test]
    fn test_reentrant_last_write_wins() {
        let engine = setup();
        let scope = engine.scope().clone();
        engine.push(Output::link("a").transform(move |v| {
            if v.to_display() == "first" {
                scope.set("a", "second");
            }
            v
        }));
        engine.refresh().unwrap();

        engine.scope().set("a", "first");

        assert_eq!(engine.output_nodes("a")[0].text(), "second");
    }

    #[test]
    fn test_queued_policy_defers_nested_updates() {
        let engine = RenderEngine::new(
            Document::new(),
            ScopeStore::new(),
            Rc::new(DefaultTheme),
            EngineConfig::queued(),
        );
        engine.set_ready();
        let scope = engine.scope().clone();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        engine.push(Output::link("a").transform(move |v| {
            seen_clone.borrow_mut().push(v.to_display());
            if v.to_display() == "1" {
                scope.set("a", "2");
            }
            v
        }));
        engine.refresh().unwrap();

        engine.scope().set("a", "1");

        // Outer pass saw "1" and finished before the nested pass saw "2"
        assert_eq!(*seen.borrow(), vec!["1", "2"]);
        assert_eq!(engine.output_nodes("a")[0].text(), "2");
    }

    #[test]
    fn test_canvas_timer_cancelled_on_removal() {
        let engine = setup();
        let draws = Rc::new(Cell::new(0));
        let draws_clone = draws.clone();
        engine.push(
            Canvas::new(4, 2, move |_, _, _| draws_clone.set(draws_clone.get() + 1))
                .interval(Interval::millis(100)),
        );
        engine.refresh().unwrap();

        assert_eq!(engine.canvas_modes(), vec![false]);
        assert_eq!(engine.advance(Duration::from_millis(250)), 2);
        engine.scope().set("x", 1);
        assert_eq!(draws.get(), 2);

        engine.remove(0);
        engine.refresh().unwrap();

        assert_eq!(engine.active_timer_count(), 0);
        assert_eq!(engine.advance(Duration::from_secs(1)), 0);
        assert_eq!(draws.get(), 2);
    }

    #[test]
    fn test_refresh_twice_keeps_one_timer() {
        let engine = setup();
        engine.push(Canvas::new(1, 1, |_, _, _| {}).every(Duration::from_millis(10)));
        engine.refresh().unwrap();
        engine.refresh().unwrap();

        assert_eq!(engine.active_timer_count(), 1);
    }

    #[test]
    fn test_failed_refresh_keeps_previous_state() {
        let engine = setup();
        engine.push(Output::link("a"));
        engine.push(Canvas::new(1, 1, |_, _, _| {}).every(Duration::from_millis(10)));
        engine.refresh().unwrap();
        let before: Vec<Node> = engine.root().children();

        engine.set_theme(Rc::new(|element: &Element, cx: &ThemeContext<'_>| -> ThemeOutput {
            match element {
                // Second canvas gets no surface
                Element::Canvas(_) if cx.index() == Some(2) => Node::new("canvas").into(),
                _ => DefaultTheme.transform_elem(element, cx),
            }
        }));
        engine.push(Canvas::new(1, 1, |_, _, _| {}).every(Duration::from_millis(10)));

        let err = engine.refresh().unwrap_err();
        assert!(matches!(err, EngineError::MissingSurface { index: 2, .. }));

        let after = engine.root().children();
        assert_eq!(after.len(), before.len());
        assert!(after.iter().zip(&before).all(|(a, b)| a.ptr_eq(b)));
        assert_eq!(engine.output_keys(), vec!["a"]);
        assert_eq!(engine.active_timer_count(), 1);
    }

    #[test]
    fn test_failed_refresh_leaves_scope_untouched() {
        let engine = setup();
        engine.push(TextInput::new("typed"));
        engine.push(Output::link("typed"));
        engine.set_theme(Rc::new(|element: &Element, cx: &ThemeContext<'_>| -> ThemeOutput {
            match element {
                Element::Output(_) => ThemeOutput::from(Node::new("span")).main(5),
                _ => DefaultTheme.transform_elem(element, cx),
            }
        }));
        let writes = engine.update_count();

        let err = engine.refresh().unwrap_err();
        assert!(matches!(err, EngineError::MainOutOfRange { index: 1, .. }));
        assert!(!engine.scope().contains("typed"));
        assert_eq!(engine.update_count(), writes);

        engine.set_theme(Rc::new(DefaultTheme));
        engine.refresh().unwrap();
        assert_eq!(engine.scope().get("typed"), Some(Value::Text(String::new())));
    }

    #[test]
    fn test_panicking_refresh_cancels_its_timers() {
        let engine = setup();
        engine.scope().set("a", "x");
        engine.push(Canvas::new(1, 1, |_, _, _| {}).every(Duration::from_millis(10)));
        engine.push(Output::link("a").transform(|_| panic!("transform failed")));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| engine.refresh()));
        assert!(result.is_err());

        assert_eq!(engine.active_timer_count(), 0);
        assert_eq!(engine.advance(Duration::from_millis(100)), 0);
        assert_eq!(engine.root().child_count(), 0);
    }

    #[test]
    fn test_checkbox_node_order() {
        let engine = setup();
        engine.push(Element::checkbox(
            Choice::new("pick").option("A", "a").option("B", "b").option("C", "c"),
        ));
        engine.refresh().unwrap();

        let boxes = engine.root().query_selector_all(".choice").unwrap();
        boxes[2].set_checked(true);
        boxes[0].set_checked(true);

        assert_eq!(engine.scope().get("pick"), Some(Value::List(vec!["a".into(), "c".into()])));
    }

    #[test]
    fn test_passthrough_wires_nothing() {
        let engine = setup();
        engine.push(Passthrough::new("marquee").text("hello"));
        engine.refresh().unwrap();

        assert_eq!(engine.root().child_count(), 1);
        assert_eq!(engine.output_binding_count(), 0);
        assert!(engine.canvas_modes().is_empty());
        let root = engine.root();
        assert!(root.descendants().iter().all(|n| n.listener_count() == 0));
    }

    #[test]
    fn test_frame_bumps_on_change() {
        let engine = setup();
        engine.push(TextInput::new("a"));
        let frame = engine.frame();
        let start = frame.get();

        engine.refresh().unwrap();
        assert!(frame.get() > start);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let scope = ScopeStore::new();
        let engine = RenderEngine::new(
            Document::new(),
            scope.clone(),
            Rc::new(DefaultTheme),
            EngineConfig::default(),
        );
        assert_eq!(scope.subscriber_count(), 1);
        drop(engine);
        assert_eq!(scope.subscriber_count(), 0);
    }
}
