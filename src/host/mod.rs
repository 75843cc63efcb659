//! Terminal host - shows the live tree in a terminal and feeds keys back.
//!
//! - layout: Taffy column stacking of top-level fields
//! - paint: node → text lines, frame composition
//! - terminal: crossterm raw mode / alternate screen, frame output
//! - mount: render effect, event loop, focus and key routing

pub mod layout;
pub mod paint;
pub mod terminal;
mod mount;

pub use layout::stack_offsets;
pub use mount::{
    focus_next, focus_previous, focused, mount, route_key, run, tick, unmount, KeyFlow, MountHandle,
};
pub use paint::{compose_frame, paint_node};
pub use terminal::TerminalGuard;
