use crate::backend::Backend;
use crate::config::HostConfig;
use crate::context::Context;
use crate::cursor::CursorShape;
use crate::draw::Renderer;
use crate::error::HostError;
use crate::events::{KeyEvent, Modifiers, MouseEvent};
use crate::raw_events::{ButtonAction, RawEvent};
use crate::rect::{Point, Size};
use cgmath::EuclideanSpace;
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, trace};

/// Connects a context to a backend window.
pub struct Host<B: Backend> {
    /// The UI context.
    pub context: Context,
    backend: B,
    window: B::Window,
    event_send: Sender<RawEvent>,
    event_recv: Receiver<RawEvent>,
    cursor: Point,
    modifiers: Modifiers,
    applied_cursor: Option<CursorShape>,
}

impl<B: Backend> Host<B> {
    /// Creates a new Host with a window as described by the configuration.
    ///
    /// The context is sized to the window but won’t be rendered until you call `render`.
    pub fn new(mut backend: B, config: &HostConfig) -> Result<Host<B>, HostError<B::Error>> {
        let window = backend
            .create_window(&config.title, config.width, config.height)
            .map_err(HostError::Backend)?;
        debug!(
            "created window {:?} ({}x{})",
            config.title, config.width, config.height
        );

        let (event_send, event_recv) = channel::unbounded();
        let mut context = Context::new();
        context.resize(Size::new(config.width as i32, config.height as i32));

        Ok(Host {
            context,
            backend,
            window,
            event_send,
            event_recv,
            cursor: Point::origin(),
            modifiers: Modifiers::empty(),
            applied_cursor: None,
        })
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn window(&self) -> &B::Window {
        &self.window
    }

    /// Returns a sender for raw events; they will be applied on the next `poll`.
    pub fn event_sender(&self) -> Sender<RawEvent> {
        self.event_send.clone()
    }

    /// Receives all events from the event queue and updates the context accordingly.
    pub fn poll(&mut self) -> Result<(), HostError<B::Error>> {
        self.backend
            .poll_events(&self.window, &self.event_send)
            .map_err(HostError::Backend)?;

        // the host keeps a sender, so the channel is only ever empty
        while let Ok(event) = self.event_recv.try_recv() {
            self.recv_raw_event(event);
        }

        let shape = self.context.cursor();
        if self.applied_cursor != Some(shape) {
            self.backend
                .set_cursor(&self.window, shape)
                .map_err(HostError::Backend)?;
            self.applied_cursor = Some(shape);
        }
        Ok(())
    }

    fn recv_raw_event(&mut self, event: RawEvent) {
        trace!("raw event {:?}", event);
        match event {
            RawEvent::Resize { width, height } => {
                self.context.resize(Size::new(width, height));
            }
            RawEvent::Key {
                key,
                scancode,
                action,
                modifiers,
            } => {
                self.modifiers = modifiers;
                self.context.dispatch_key_event(KeyEvent {
                    key,
                    scancode,
                    action,
                    modifiers,
                });
            }
            RawEvent::MouseButton {
                button,
                action,
                modifiers,
            } => {
                self.modifiers = modifiers;
                let event = match action {
                    ButtonAction::Press => MouseEvent::press(button, self.cursor),
                    ButtonAction::Release => MouseEvent::release(button, self.cursor),
                };
                self.context
                    .dispatch_mouse_event(event.with_modifiers(modifiers));
            }
            RawEvent::CursorPos { x, y } => {
                self.cursor = Point::new(x.floor() as i32, y.floor() as i32);
                let event = MouseEvent::moved(self.cursor).with_modifiers(self.modifiers);
                self.context.dispatch_mouse_event(event);
            }
        }
    }

    /// Draws the context and presents it, if anything changed since the last call.
    ///
    /// Returns whether a frame was drawn.
    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<bool, HostError<B::Error>> {
        if !self.context.needs_redraw() {
            return Ok(false);
        }
        self.backend
            .make_current(&self.window)
            .map_err(HostError::Backend)?;
        self.context.draw(renderer);
        self.backend
            .swap_buffers(&self.window)
            .map_err(HostError::Backend)?;
        Ok(true)
    }

    pub fn should_close(&self) -> bool {
        self.backend.should_close(&self.window)
    }
}
