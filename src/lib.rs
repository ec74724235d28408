//! Widget tree core for OpenGL UIs.
//!
//! # Conceptual overview
//! A [`Context`] owns a tree of views. The root’s subviews are *frames*, stacked back to front;
//! frames contain containers and widgets. The context receives input from a windowing backend,
//! routes it to views, and draws the tree through a [`Renderer`].
//!
//! ## Views
//! Views live in an arena ([`ViewTree`]) and are referred to by [`ViewId`] handles. Handles are
//! generational, so a handle to a destroyed view simply stops resolving. A view decides at
//! insertion whether it is a widget (a leaf), a container, or a frame; the tree rejects any
//! structural change that would break these roles or create a cycle.
//!
//! The tree stores each view’s geometry (position, size and corner style). Views implement
//! [`View`], a table of hooks the tree calls into.
//!
//! ## Geometry updates
//! Geometry changes travel in two directions.
//!
//! A public mutator such as [`ViewTree::resize`] asks the view first (its *test* may veto the
//! change) and then performs it. The view stores the value and, if it is a container, lays out its
//! subviews by setting their geometry directly; this is top-down and skips the subviews’ tests.
//!
//! A view that changed on its own then *reports* the change to its ancestors, one after another,
//! so containers can react (usually by laying out again). Reports never change the reporting
//! view’s own geometry.
//!
//! While a view’s hook runs, operations addressed to that view are queued and run right after the
//! hook returns. Views may therefore resize or destroy themselves from within event handlers.
//!
//! ## Events
//! Mouse events first pick a frame: the topmost visible modal frame, or else the topmost visible
//! frame under the pointer. Presses move keyboard focus to that frame and close popups they land
//! outside of. Within the frame, an event goes to the innermost view under the pointer (or to the
//! view that accepted the last press, until release) and bubbles up towards the frame until a view
//! finishes it. Key events go to the focused frame’s focused widget and bubble up the same way.
//!
//! Focus and hover changes always notify the old holder before the new one.
//!
//! ## Backends
//! A [`Host`] connects a context to a [`Backend`] window. Backends turn native input callbacks into
//! [`RawEvent`]s sent over a channel; the host drains the channel on `poll` and redraws on `render`
//! when something changed.

pub mod backend;
pub mod color;
pub mod config;
mod context;
pub mod cursor;
pub mod draw;
pub mod error;
pub mod events;
pub mod frame;
mod host;
pub mod layout;
pub mod raw_events;
mod rect;
mod request;
pub mod signal;
#[cfg(test)]
mod testing;
mod tree;
#[macro_use]
mod view;
pub mod widgets;

pub use backend::Backend;
pub use color::Color;
pub use config::HostConfig;
pub use context::Context;
pub use draw::{DrawCtx, Renderer};
pub use error::{HostError, TreeError};
pub use frame::{Frame, FrameAnchor, FrameFlags};
pub use host::Host;
pub use layout::{Alignment, LinearLayout, Orientation};
pub use raw_events::RawEvent;
pub use rect::{Margin, Point, Rect, Size};
pub use request::{Update, UpdateRequest};
pub use tree::{Children, EventCtx, QueryCtx, UpdateCtx, ViewTree};
pub use view::{Response, RoundType, View, ViewId, ViewKind};
