//! External messaging client integration
//!
//! The host may hand the clock a messaging client. The clock never owns
//! it and only relies on optional capabilities: a client that cannot
//! register callbacks is tolerated with a warning.

mod loopback;

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, WidgetError};
use crate::theme::Color;

pub use loopback::LoopbackClient;

/// Event carrying a color change for the header/accent
pub const CHANGE_COLOR_EVENT: &str = "/clock/change_color";

/// Demonstration hook with no payload contract; only logged
pub const CUSTOM_CLOCK_EVENT: &str = "customClockEvent";

/// Handler invoked with the raw message payload
///
/// Identity (for unregistration) is the `Rc` allocation, compared with
/// [`Rc::ptr_eq`].
pub type EventHandler = Rc<dyn Fn(&Value)>;

/// Outbound command envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientCommand {
    pub method: String,
    #[serde(default)]
    pub payload: Value,
}

impl ClientCommand {
    pub fn new(method: impl Into<String>, payload: Value) -> Self {
        Self {
            method: method.into(),
            payload,
        }
    }
}

/// Callback registration capability
pub trait CallbackRegistry {
    fn register_callback(&self, event: &str, handler: EventHandler);

    /// Remove a handler previously registered under `event`
    fn unregister_callback(&self, event: &str, handler: &EventHandler);
}

/// A host-supplied messaging client
pub trait ExternalClient {
    /// Human-readable name for logs
    fn name(&self) -> &str {
        "external-client"
    }

    /// Callback registration, when the client supports it
    fn callbacks(&self) -> Option<&dyn CallbackRegistry> {
        None
    }

    /// Send a command to the other side, when supported
    fn send_command(&self, command: ClientCommand) -> Result<()> {
        Err(WidgetError::UnsupportedCommand(command.method))
    }
}

/// `{ "data": { "color": { "r": .., "g": .., "b": .. } } }`
#[derive(Debug, Deserialize)]
struct ChangeColorMessage {
    data: ChangeColorData,
}

#[derive(Debug, Deserialize)]
struct ChangeColorData {
    color: RgbPayload,
}

#[derive(Debug, Deserialize)]
struct RgbPayload {
    r: u8,
    g: u8,
    b: u8,
}

/// Extract the color from a change-color payload
///
/// Returns `None` for anything malformed: missing fields, non-integer
/// channels, or channels outside 0-255.
pub fn parse_change_color(payload: &Value) -> Option<Color> {
    let message = ChangeColorMessage::deserialize(payload).ok()?;
    let RgbPayload { r, g, b } = message.data.color;
    Some(Color::rgb(r, g, b))
}

/// Build a change-color payload, e.g. for tests or a loopback host
pub fn change_color_payload(color: Color) -> Value {
    serde_json::json!({
        "data": { "color": { "r": color.r, "g": color.g, "b": color.b } }
    })
}
