//! Analog Clock Widget Library
//!
//! An embeddable analog clock: a dial with hour, minute and second hands
//! plus a digital time and date readout, refreshed on a repeating timer.
//! It exposes modules for time sampling, hand geometry, scene assembly,
//! rasterization, refresh scheduling and the element lifecycle.

pub mod client;
pub mod config;
pub mod error;
pub mod face;
pub mod geometry;
pub mod readout;
pub mod render;
pub mod text;
pub mod theme;
pub mod time;
pub mod update;
pub mod widget;

// Re-export commonly used types
pub use client::{
    change_color_payload, parse_change_color, CallbackRegistry, ClientCommand, EventHandler,
    ExternalClient, LoopbackClient, CHANGE_COLOR_EVENT, CUSTOM_CLOCK_EVENT,
};
pub use config::Config;
pub use error::{ConfigError, WidgetError};
pub use face::{ClockFaceRenderer, ClockScene, NodeRole, Shape};
pub use geometry::{FaceGeometry, HandAngles, Point};
pub use readout::{ChronoLocaleFormatter, DigitalReadout, LocaleFormatter, Readout};
pub use render::{Rasterizer, WidgetLayout};
pub use theme::{ClockTheme, Color};
pub use time::{FixedTimeSource, Moment, SystemTimeSource, TimeSource};
pub use update::{CalloopTimers, ManualTimers, RefreshScheduler, TimerService};
pub use widget::{
    ClockElement, ClockElementFactory, ClockView, CustomElement, ElementContext, ElementRegistry,
    OuterStyle,
};
