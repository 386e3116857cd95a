// Callback registrations held against an external client while mounted

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{debug, info, warn};

use super::view::ClockView;
use crate::client::{
    parse_change_color, EventHandler, ExternalClient, CHANGE_COLOR_EVENT, CUSTOM_CLOCK_EVENT,
};

/// Registrations made against one client, undone by [`Subscriptions::clear`]
#[derive(Default)]
pub struct Subscriptions {
    client: Option<Weak<dyn ExternalClient>>,
    registered: Vec<(&'static str, EventHandler)>,
}

impl Subscriptions {
    /// Register the clock's handlers with `client`
    ///
    /// A client without the callback capability gets a warning and no
    /// registrations.
    pub fn subscribe(client: &Rc<dyn ExternalClient>, view: &Rc<RefCell<ClockView>>) -> Self {
        let mut subscriptions = Self {
            client: Some(Rc::downgrade(client)),
            registered: Vec::new(),
        };

        let Some(registry) = client.callbacks() else {
            warn!(
                client = client.name(),
                "External client cannot register callbacks; continuing without them"
            );
            return subscriptions;
        };

        let handlers = [
            (CUSTOM_CLOCK_EVENT, custom_event_handler()),
            (CHANGE_COLOR_EVENT, change_color_handler(Rc::downgrade(view))),
        ];
        for (event, handler) in handlers {
            registry.register_callback(event, Rc::clone(&handler));
            subscriptions.registered.push((event, handler));
        }

        debug!(
            client = client.name(),
            count = subscriptions.registered.len(),
            "Registered client callbacks"
        );
        subscriptions
    }

    /// Whether these registrations belong to `client`
    pub fn is_for(&self, client: Option<&Rc<dyn ExternalClient>>) -> bool {
        match (&self.client, client) {
            (None, None) => true,
            (Some(ours), Some(theirs)) => {
                ours.as_ptr() as *const () == Rc::as_ptr(theirs) as *const ()
            }
            _ => false,
        }
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        self.registered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }

    /// Unregister everything, with the same event names and handlers
    pub fn clear(&mut self) {
        let registered = std::mem::take(&mut self.registered);
        let client = self.client.take().and_then(|weak| weak.upgrade());

        let Some(client) = client else {
            if !registered.is_empty() {
                // The client went away first; its handler table went with it
                debug!(count = registered.len(), "Client dropped before unregistering");
            }
            return;
        };
        let Some(registry) = client.callbacks() else {
            return;
        };
        for (event, handler) in &registered {
            registry.unregister_callback(event, handler);
        }
        if !registered.is_empty() {
            debug!(
                client = client.name(),
                count = registered.len(),
                "Unregistered client callbacks"
            );
        }
    }
}

impl Drop for Subscriptions {
    fn drop(&mut self) {
        self.clear();
    }
}

fn custom_event_handler() -> EventHandler {
    Rc::new(|payload: &Value| {
        info!(payload = %payload, "Received {}", CUSTOM_CLOCK_EVENT);
    })
}

fn change_color_handler(view: Weak<RefCell<ClockView>>) -> EventHandler {
    Rc::new(move |payload: &Value| {
        let Some(view) = view.upgrade() else {
            return;
        };
        let Some(color) = parse_change_color(payload) else {
            debug!(payload = %payload, "Ignoring malformed change_color payload");
            return;
        };
        match view.try_borrow_mut() {
            Ok(mut view) => {
                view.set_accent(color);
                info!(color = %color, "Accent color changed");
            }
            Err(_) => warn!("Clock view busy; change_color dropped"),
        };
    })
}
