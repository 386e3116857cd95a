// In-process client: commands sent to it are delivered to its own callbacks

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use super::{CallbackRegistry, ClientCommand, EventHandler, ExternalClient};
use crate::error::Result;

/// Client that routes commands back to its registered callbacks
///
/// Used by the demo binary to drive the clock, and by tests to observe
/// registration symmetry.
#[derive(Default)]
pub struct LoopbackClient {
    handlers: RefCell<HashMap<String, Vec<EventHandler>>>,
    sent: RefCell<Vec<ClientCommand>>,
}

impl LoopbackClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `payload` to every handler of `event`; returns how many ran
    pub fn emit(&self, event: &str, payload: &Value) -> usize {
        // Handlers may unregister themselves while running
        let handlers: Vec<EventHandler> = self
            .handlers
            .borrow()
            .get(event)
            .cloned()
            .unwrap_or_default();
        trace!(event, handlers = handlers.len(), "Emitting event");
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Handlers currently registered for `event`
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.borrow().get(event).map_or(0, Vec::len)
    }

    /// Handlers registered across all events
    pub fn total_handlers(&self) -> usize {
        self.handlers.borrow().values().map(Vec::len).sum()
    }

    /// Commands received through [`ExternalClient::send_command`]
    pub fn sent_commands(&self) -> Vec<ClientCommand> {
        self.sent.borrow().clone()
    }
}

impl CallbackRegistry for LoopbackClient {
    fn register_callback(&self, event: &str, handler: EventHandler) {
        debug!(event, "Callback registered");
        self.handlers
            .borrow_mut()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn unregister_callback(&self, event: &str, handler: &EventHandler) {
        let mut handlers = self.handlers.borrow_mut();
        let Some(list) = handlers.get_mut(event) else {
            return;
        };
        if let Some(pos) = list.iter().position(|h| Rc::ptr_eq(h, handler)) {
            list.remove(pos);
            debug!(event, "Callback unregistered");
        }
        if list.is_empty() {
            handlers.remove(event);
        }
    }
}

impl ExternalClient for LoopbackClient {
    fn name(&self) -> &str {
        "loopback"
    }

    fn callbacks(&self) -> Option<&dyn CallbackRegistry> {
        Some(self)
    }

    fn send_command(&self, command: ClientCommand) -> Result<()> {
        self.sent.borrow_mut().push(command.clone());
        self.emit(&command.method, &command.payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_register_emit_unregister() {
        let client = LoopbackClient::new();
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let handler: EventHandler = Rc::new(move |_: &Value| seen.set(seen.get() + 1));

        client.register_callback("tick", handler.clone());
        assert_eq!(client.handler_count("tick"), 1);
        assert_eq!(client.emit("tick", &Value::Null), 1);
        assert_eq!(hits.get(), 1);

        client.unregister_callback("tick", &handler);
        assert_eq!(client.total_handlers(), 0);
        assert_eq!(client.emit("tick", &Value::Null), 0);
    }

    #[test]
    fn test_unregister_matches_identity_and_event() {
        let client = LoopbackClient::new();
        let a: EventHandler = Rc::new(|_: &Value| {});
        let b: EventHandler = Rc::new(|_: &Value| {});
        client.register_callback("x", a.clone());
        client.register_callback("x", b.clone());

        // Wrong event name removes nothing
        client.unregister_callback("y", &a);
        assert_eq!(client.handler_count("x"), 2);

        client.unregister_callback("x", &a);
        assert_eq!(client.handler_count("x"), 1);
        client.unregister_callback("x", &a);
        assert_eq!(client.handler_count("x"), 1);
    }

    #[test]
    fn test_send_command_is_delivered_and_recorded() {
        let client = LoopbackClient::new();
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        client.register_callback("ping", Rc::new(move |_: &Value| seen.set(seen.get() + 1)));

        client
            .send_command(ClientCommand::new("ping", Value::Bool(true)))
            .unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(client.sent_commands().len(), 1);
    }
}
