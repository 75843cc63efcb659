//! Output and canvas registries.
//!
//! Rebuilt from scratch on every refresh:
//! - OutputRegistry: scope key → ordered `{node, transform}` bindings
//! - CanvasRegistry: redraw routines, either update-driven or timer-driven

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::dom::Node;
use crate::types::TransformChain;

use super::timer::TimerId;

/// Redraws one canvas with the current scope.
pub type Redraw = Rc<dyn Fn()>;

// =============================================================================
// Outputs
// =============================================================================

/// An output node bound to a scope key.
#[derive(Clone, Debug)]
pub struct OutputBinding {
    pub node: Node,
    pub transform: TransformChain,
}

#[derive(Default)]
pub struct OutputRegistry {
    bindings: HashMap<String, Vec<OutputBinding>>,
}

impl OutputRegistry {
    /// Append a binding; bindings for a key render in insertion order.
    pub fn register(&mut self, key: impl Into<String>, binding: OutputBinding) {
        self.bindings.entry(key.into()).or_default().push(binding);
    }

    pub fn bindings(&self, key: &str) -> &[OutputBinding] {
        self.bindings.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Bound keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.bindings.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Total bindings across all keys.
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for OutputRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.keys().into_iter().map(|k| {
                let count = self.bindings(&k).len();
                (k, count)
            }))
            .finish()
    }
}

// =============================================================================
// Canvases
// =============================================================================

pub struct CanvasEntry {
    pub redraw: Redraw,
    /// Redraw on every scope write. False means a timer drives it.
    pub on_update: bool,
    pub timer: Option<TimerId>,
}

#[derive(Default)]
pub struct CanvasRegistry {
    entries: Vec<CanvasEntry>,
}

impl CanvasRegistry {
    pub fn register(&mut self, entry: CanvasEntry) {
        self.entries.push(entry);
    }

    /// Redraw routines of update-driven canvases, in registration order.
    pub fn on_update_redraws(&self) -> Vec<Redraw> {
        self.entries
            .iter()
            .filter(|entry| entry.on_update)
            .map(|entry| entry.redraw.clone())
            .collect()
    }

    /// Timers owned by timer-driven canvases.
    pub fn timers(&self) -> Vec<TimerId> {
        self.entries.iter().filter_map(|entry| entry.timer).collect()
    }

    /// `on_update` flag of each entry, in order.
    pub fn modes(&self) -> Vec<bool> {
        self.entries.iter().map(|entry| entry.on_update).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for CanvasRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanvasRegistry")
            .field("modes", &self.modes())
            .field("timers", &self.timers())
            .finish()
    }
}
