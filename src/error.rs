//! Engine error taxonomy.
//!
//! Only configuration and render-shape problems are errors. Unknown element
//! kinds and empty file drops are silent no-ops, and panics inside user
//! closures (transforms, draw routines, button handlers) propagate to the
//! caller untouched.

use thiserror::Error;

use crate::dom::SelectorError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// `style()` received something that cannot act as a theme.
    #[error("invalid style: {0}")]
    Configuration(String),

    /// The theme's `main` index points past its node list.
    #[error("element {index} ({kind}): main index {main} out of range for {len} node(s)")]
    MainOutOfRange {
        index: usize,
        kind: &'static str,
        main: usize,
        len: usize,
    },

    /// A kind that needs a node to wire found none.
    #[error("element {index} ({kind}): no node matched `{selector}`")]
    MissingTarget {
        index: usize,
        kind: &'static str,
        selector: String,
    },

    /// A canvas element's target node has no 2d surface.
    #[error("element {index} ({kind}): target node has no 2d surface")]
    MissingSurface { index: usize, kind: &'static str },

    #[error(transparent)]
    Selector(#[from] SelectorError),
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
