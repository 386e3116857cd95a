//! The clock element and the machinery around it
//!
//! This module provides:
//! - [`CustomElement`] - the lifecycle contract hosts drive
//! - [`ClockElement`] - the analog clock element
//! - [`ElementRegistry`] - creation of elements by tag name
//! - the view tree, render boundary and client subscriptions behind them

pub mod boundary;
pub mod host;
pub mod registry;
pub mod subscriptions;
pub mod traits;
pub mod view;

pub use boundary::{BoundaryResources, MountedRoot, RenderBoundary};
pub use host::{ClockElement, ElementContext, OuterStyle, OBSERVED_ATTRIBUTES};
pub use registry::{
    create_element, define, is_defined, validate_tag_name, ClockElementFactory,
    DynElementFactory, ElementRegistry,
};
pub use subscriptions::Subscriptions;
pub use traits::CustomElement;
pub use view::{ClockView, PresentationState, ViewProps};
