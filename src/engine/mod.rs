//! Render engine - descriptors in, wired live tree out.
//!
//! - RenderEngine: descriptor list, refresh (full rebuild), update (targeted)
//! - Handlers: one wiring routine per element kind
//! - Registries: output bindings and canvas redraws, rebuilt every refresh
//! - Timers: virtual-clock intervals for timer-driven canvases
//! - Reconcile: how a finished build buffer reaches the root
//!
//! # Architecture
//!
//! ```text
//! refresh():  title → for each descriptor: theme → resolve main/targets → wire → buffer
//!             then: swap registries, cancel old timers, commit buffer
//!
//! update(k):  outputs[k] → node.text = transform(scope[k])
//!             canvases   → redraw (on-update only)
//! ```

mod config;
mod handlers;
mod reconcile;
mod registry;
mod render;
mod timer;

pub use config::{EngineConfig, UpdatePolicy};
pub use reconcile::{FullRebuild, Reconcile};
pub use registry::{CanvasEntry, CanvasRegistry, OutputBinding, OutputRegistry, Redraw};
pub use render::RenderEngine;
pub use timer::{TimerCallback, TimerId, TimerQueue};
