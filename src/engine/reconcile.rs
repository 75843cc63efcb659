//! Commit strategy for a finished build buffer.

use crate::dom::Node;

/// Moves a freshly built node list into the live root.
///
/// Element wiring happens before commit and never depends on the strategy,
/// so an incremental strategy can replace [`FullRebuild`] without touching
/// the handlers.
pub trait Reconcile {
    fn commit(&self, root: &Node, buffer: Vec<Node>);
}

/// Discard every existing child, then attach the whole buffer at once.
#[derive(Clone, Copy, Debug, Default)]
pub struct FullRebuild;

impl Reconcile for FullRebuild {
    fn commit(&self, root: &Node, buffer: Vec<Node>) {
        root.replace_children(buffer);
    }
}
