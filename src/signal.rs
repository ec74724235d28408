//! Observer lists.

use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

/// Identifies one connection to a [`Signal`]; pass it to [`Signal::disconnect`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    fn new() -> SubscriptionId {
        SubscriptionId(Uuid::new_v4())
    }
}

/// A shareable callback.
pub struct EventHandler<T>(Arc<Mutex<dyn FnMut(&T) + Send>>);

impl<T> Clone for EventHandler<T> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<T> EventHandler<T> {
    pub fn new<F: 'static + FnMut(&T) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    pub fn call(&self, value: &T) {
        let mut handler = self.0.lock();
        (&mut *handler)(value)
    }
}

impl<T> fmt::Debug for EventHandler<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler(..)")
    }
}

/// A list of subscribers that are called synchronously, in connection order, on `emit`.
pub struct Signal<T> {
    handlers: Vec<(SubscriptionId, EventHandler<T>)>,
}

impl<T> Signal<T> {
    pub fn new() -> Self {
        Signal {
            handlers: Vec::new(),
        }
    }

    pub fn connect<F: 'static + FnMut(&T) + Send>(&mut self, handler: F) -> SubscriptionId {
        self.connect_handler(EventHandler::new(handler))
    }

    pub fn connect_handler(&mut self, handler: EventHandler<T>) -> SubscriptionId {
        let id = SubscriptionId::new();
        self.handlers.push((id, handler));
        id
    }

    /// Removes a subscriber. Returns false if it wasn’t connected.
    pub fn disconnect(&mut self, id: SubscriptionId) -> bool {
        let len = self.handlers.len();
        self.handlers.retain(|(i, _)| *i != id);
        self.handlers.len() != len
    }

    pub fn emit(&self, value: &T) {
        for (_, handler) in &self.handlers {
            handler.call(value);
        }
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Signal::new()
    }
}

impl<T> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Signal({} subscribers)", self.handlers.len())
    }
}
