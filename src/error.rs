//! Error types.

use crate::view::ViewId;
use core::fmt;
use thiserror::Error;

/// Tree-integrity violations.
///
/// These are programming errors on the caller’s side. The tree is left untouched when one is
/// returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TreeError {
    #[error("view {0:?} does not exist")]
    NoSuchView(ViewId),
    #[error("view {0:?} cannot have subviews")]
    NotAContainer(ViewId),
    #[error("view {child:?} is not a subview of {parent:?}")]
    NotAChild { parent: ViewId, child: ViewId },
    #[error("view {0:?} would become its own ancestor")]
    Cycle(ViewId),
    #[error("the root view cannot be adopted, detached or destroyed")]
    Root,
    #[error("view {0:?} is not a frame; only frames can be attached to the root")]
    NotAFrame(ViewId),
    #[error("frame {0:?} can only be attached to the root")]
    MisplacedFrame(ViewId),
}

/// Errors returned by a [`Host`](crate::Host).
#[derive(Debug, Error)]
pub enum HostError<E: fmt::Debug> {
    #[error("backend error: {0:?}")]
    Backend(E),
}
