//! Traits for backends.

use crate::cursor::CursorShape;
use crate::raw_events::RawEvent;
use crossbeam::channel::Sender;

/// A windowing backend: owns native windows and their GL surfaces.
///
/// Backends turn native input callbacks into [`RawEvent`]s and send them to the host’s event
/// channel; the host applies them on the UI thread.
pub trait Backend {
    /// A native window with a drawing surface.
    type Window;

    /// Error type.
    type Error: std::fmt::Debug;

    /// Creates a window with a drawing surface of the given size.
    fn create_window(
        &mut self,
        title: &str,
        width: u32,
        height: u32,
    ) -> Result<Self::Window, Self::Error>;

    /// Makes the window’s drawing surface current on this thread.
    fn make_current(&mut self, window: &Self::Window) -> Result<(), Self::Error>;

    /// Presents the last drawn frame.
    fn swap_buffers(&mut self, window: &Self::Window) -> Result<(), Self::Error>;

    /// Processes native events, sending those for `window` to `events`.
    ///
    /// Must not block.
    fn poll_events(
        &mut self,
        window: &Self::Window,
        events: &Sender<RawEvent>,
    ) -> Result<(), Self::Error>;

    /// Changes the pointer shape over the window.
    fn set_cursor(&mut self, window: &Self::Window, shape: CursorShape) -> Result<(), Self::Error>;

    /// Whether the user asked to close the window.
    fn should_close(&self, window: &Self::Window) -> bool;
}
