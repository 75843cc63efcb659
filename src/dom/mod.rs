//! Host document model.
//!
//! The engine renders into this in-process document instead of a browser:
//!
//! - [`Node`] - render tree nodes with attributes, flags and listeners
//! - [`Event`] / [`DataTransfer`] - dispatched events and drag/drop payloads
//! - [`Selector`] - the small selector language themes use for metadata
//! - [`Context2d`] - character-grid drawing surface for canvas nodes
//! - [`Document`] - head, body, stylesheet links and the file chooser
//!
//! Gesture helpers on [`Node`] (`input_text`, `set_checked`, `click`,
//! `drop_transfer`, ...) stand in for user interaction, both for tests and
//! for the terminal host's key routing.

mod canvas;
mod document;
mod event;
mod file;
mod node;
mod selector;

pub use canvas::Context2d;
pub use document::{Document, FileChooser, WeakDocument};
pub use event::{DataTransfer, Event, EventKind, TransferItem};
pub use file::FileBlob;
pub use node::{Listener, Node, NodeFlags, WeakNode};
pub use selector::{Selector, SelectorError};
