//! # spark-stdio
//!
//! Declarative reactive UI micro-framework for Rust.
//!
//! Describe interactive elements as plain data; the engine turns them into
//! live nodes through a pluggable theme, wires their events into a shared
//! reactive [`ScopeStore`], and re-renders bound outputs on every write.
//!
//! ## Architecture
//!
//! ```text
//! Stdio::add ──→ RenderEngine::refresh ──→ ThemeTransform ──→ handlers ──→ root
//!                                                                │
//!        node events ──→ ScopeStore::set ──→ RenderEngine::update ──→ outputs, canvases
//! ```
//!
//! Reactivity is built on [spark-signals](https://github.com/RLabs-Inc/spark-signals):
//! the scope's write count and the engine's frame counter are signals, so the
//! terminal host repaints from a single effect.
//!
//! ## Modules
//!
//! - [`types`] - Values, transforms and element descriptors
//! - [`scope`] - The reactive key/value store
//! - [`dom`] - In-process host document (nodes, events, selectors, canvas)
//! - [`theme`] - Theme contract, default theme and presets
//! - [`engine`] - RenderEngine, element handlers, registries, timers
//! - [`stdio`] - The public facade
//! - [`host`] - Terminal host (taffy layout, crossterm loop)

pub mod dom;
pub mod engine;
pub mod error;
pub mod host;
pub mod scope;
pub mod stdio;
pub mod theme;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use dom::{DataTransfer, Document, FileBlob, Node, NodeFlags, TransferItem};
pub use engine::{EngineConfig, FullRebuild, Reconcile, RenderEngine, UpdatePolicy};
pub use error::{EngineError, Result};
pub use scope::{ScopeStore, SubscriptionId};
pub use stdio::{Stdio, Style};
pub use theme::{
    get_preset, preset_names, DefaultTheme, PlainTheme, ThemeContext, ThemeObject, ThemeOutput,
    ThemeTransform,
};
