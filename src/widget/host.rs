//! The embeddable clock element
//!
//! [`ClockElement`] is the boundary between a host and the clock:
//!
//! - `connected` creates the element's [`RenderBoundary`], injects its
//!   resources once and mounts the view tree (which starts the refresh
//!   timer and subscribes to the client, if any).
//! - `disconnected` unmounts the tree and releases the root handle.
//! - the `client` property may be reassigned at any time; while
//!   connected this re-renders so the tree sees the new reference.
//! - `width` and `height` attributes are mirrored onto the outer style.

use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use tiny_skia::Pixmap;
use tracing::{debug, info, warn};

use super::boundary::{BoundaryResources, MountedRoot, RenderBoundary};
use super::traits::CustomElement;
use super::view::{ClockView, PresentationState, ViewProps};
use crate::config::Config;
use crate::error::{Result, WidgetError};
use crate::readout::{ChronoLocaleFormatter, LocaleFormatter};
use crate::render::Rasterizer;
use crate::text::FontManager;
use crate::time::{SystemTimeSource, TimeSource};
use crate::update::TimerService;
use crate::client::ExternalClient;

/// Attributes the clock reacts to
pub const OBSERVED_ATTRIBUTES: &[&str] = &["width", "height"];

/// Host-provided services an element runs against
#[derive(Clone)]
pub struct ElementContext {
    pub timers: Rc<dyn TimerService>,
    pub time_source: Rc<dyn TimeSource>,
    pub formatter: Rc<dyn LocaleFormatter>,
}

impl ElementContext {
    /// Local wall clock and environment locale
    pub fn new(timers: Rc<dyn TimerService>) -> Self {
        Self {
            timers,
            time_source: Rc::new(SystemTimeSource),
            formatter: Rc::new(ChronoLocaleFormatter::from_env()),
        }
    }

    /// Like [`ElementContext::new`], honoring the configured locale
    pub fn for_config(timers: Rc<dyn TimerService>, config: &Config) -> Self {
        let context = Self::new(timers);
        let Some(name) = config.locale.as_deref() else {
            return context;
        };
        match ChronoLocaleFormatter::from_name(name) {
            Some(formatter) => context.with_formatter(Rc::new(formatter)),
            None => {
                warn!(locale = name, "Unknown locale in configuration, using environment");
                context
            }
        }
    }

    pub fn with_time_source(mut self, time_source: Rc<dyn TimeSource>) -> Self {
        self.time_source = time_source;
        self
    }

    pub fn with_formatter(mut self, formatter: Rc<dyn LocaleFormatter>) -> Self {
        self.formatter = formatter;
        self
    }
}

/// Dimensions of the element's outer box, as raw CSS strings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OuterStyle {
    pub width: Option<String>,
    pub height: Option<String>,
}

impl OuterStyle {
    pub fn get(&self, property: &str) -> Option<&str> {
        match property {
            "width" => self.width.as_deref(),
            "height" => self.height.as_deref(),
            _ => None,
        }
    }

    /// Set a dimension verbatim; `None` clears it
    pub fn set(&mut self, property: &str, value: Option<&str>) {
        let slot = match property {
            "width" => &mut self.width,
            "height" => &mut self.height,
            _ => return,
        };
        *slot = value.map(str::to_string);
    }

    /// Inline style text, e.g. `width: 300px; height: 200px`
    pub fn to_css(&self) -> String {
        [("width", &self.width), ("height", &self.height)]
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| format!("{}: {}", name, v)))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Pixel size for rasterizing, when both dimensions are plain numbers
    /// or `px` lengths
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        fn parse(value: Option<&String>) -> Option<u32> {
            let value = value?.trim();
            let number = value.strip_suffix("px").unwrap_or(value).trim();
            number.parse::<f32>().ok().filter(|v| *v >= 1.0).map(|v| v.round() as u32)
        }
        Some((parse(self.width.as_ref())?, parse(self.height.as_ref())?))
    }
}

pub struct ClockElement {
    tag_name: String,
    config: Config,
    context: ElementContext,
    client: Option<Weak<dyn ExternalClient>>,
    attributes: BTreeMap<String, String>,
    style: OuterStyle,
    boundary: Option<RenderBoundary>,
    connected: bool,
}

impl ClockElement {
    pub fn new(tag_name: &str, context: ElementContext, config: Config) -> Self {
        let mut element = Self {
            tag_name: tag_name.to_string(),
            config,
            context,
            client: None,
            attributes: BTreeMap::new(),
            style: OuterStyle::default(),
            boundary: None,
            connected: false,
        };

        // Declared defaults behave like attributes present at creation
        for name in OBSERVED_ATTRIBUTES {
            let value = match *name {
                "width" => element.config.width.clone(),
                _ => element.config.height.clone(),
            };
            if let Some(value) = value {
                element.set_attribute(name, &value);
            }
        }
        element
    }

    /// Mount or update the view tree inside the boundary
    fn render(&mut self) -> Result<()> {
        let boundary = self.boundary.get_or_insert_with(|| {
            debug!(tag = %self.tag_name, "Creating render boundary");
            RenderBoundary::new()
        });

        let config = &self.config;
        let resources = boundary
            .inject_resources(|| load_resources(config))
            .clone();

        let client = self.client.as_ref().and_then(Weak::upgrade);

        if let Some(root) = boundary.root_mut() {
            root.update_client(client.as_ref());
            return Ok(());
        }

        let props = ViewProps {
            title: self.config.title.clone(),
            time_source: Rc::clone(&self.context.time_source),
            formatter: Rc::clone(&self.context.formatter),
            theme: resources.theme,
            // A new mount starts from the configured defaults
            presentation: PresentationState::new(self.config.accent_color()),
            client: self.client.clone(),
        };
        let root = MountedRoot::mount(
            props,
            Rc::clone(&self.context.timers),
            self.config.refresh_interval(),
            client.as_ref(),
        )?;
        boundary.set_root(root);
        Ok(())
    }

    /// Current outer box dimensions
    pub fn style(&self) -> &OuterStyle {
        &self.style
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The mounted view, while connected
    pub fn view(&self) -> Option<Rc<RefCell<ClockView>>> {
        self.root().map(|root| Rc::clone(root.view()))
    }

    fn root(&self) -> Option<&MountedRoot> {
        self.boundary.as_ref().and_then(RenderBoundary::root)
    }

    pub fn boundary(&self) -> Option<&RenderBoundary> {
        self.boundary.as_ref()
    }

    /// Whether the refresh timer is running
    pub fn is_ticking(&self) -> bool {
        self.root().is_some_and(MountedRoot::is_ticking)
    }

    /// Client callbacks currently registered by this element
    pub fn registration_count(&self) -> usize {
        self.root().map_or(0, MountedRoot::registration_count)
    }

    /// Rasterize the current frame at the outer box size, or at the
    /// configured snapshot size when the box has no pixel dimensions
    pub fn snapshot(&self) -> Result<Pixmap> {
        let (width, height) = self
            .style
            .pixel_size()
            .unwrap_or((self.config.snapshot_size, self.config.snapshot_size));
        self.snapshot_with_size(width, height)
    }

    pub fn snapshot_with_size(&self, width: u32, height: u32) -> Result<Pixmap> {
        let (Some(boundary), Some(view)) = (self.boundary.as_ref(), self.view()) else {
            return Err(WidgetError::RenderError(format!(
                "<{}> is not mounted",
                self.tag_name
            )));
        };
        let resources = boundary
            .resources()
            .ok_or_else(|| WidgetError::RenderError("boundary has no resources".to_string()))?;

        let mut rasterizer = Rasterizer::new(resources.theme.clone(), resources.font.clone());
        let view = view.borrow();
        rasterizer.render_widget(&view, width, height)
    }
}

fn load_resources(config: &Config) -> BoundaryResources {
    let font = match &config.font_path {
        Some(path) => match FontManager::from_path(path) {
            Ok(font) => Some(font),
            Err(e) => {
                warn!(error = %e, "Configured font unusable, falling back to discovery");
                FontManager::discover()
            }
        },
        None => FontManager::discover(),
    };
    if font.is_none() {
        warn!("No usable font found; text will not be rasterized");
    }
    BoundaryResources {
        font,
        theme: config.clock_theme(),
    }
}

impl CustomElement for ClockElement {
    fn tag_name(&self) -> &str {
        &self.tag_name
    }

    fn observed_attributes(&self) -> &'static [&'static str] {
        OBSERVED_ATTRIBUTES
    }

    fn connected(&mut self) -> Result<()> {
        if self.connected {
            debug!(tag = %self.tag_name, "Already connected");
            return Ok(());
        }
        self.connected = true;
        if let Err(e) = self.render() {
            self.connected = false;
            return Err(e);
        }
        info!(tag = %self.tag_name, "Element connected");
        Ok(())
    }

    fn disconnected(&mut self) {
        self.connected = false;
        let Some(root) = self.boundary.as_mut().and_then(RenderBoundary::take_root) else {
            debug!(tag = %self.tag_name, "Disconnected without a mounted view");
            return;
        };
        root.unmount();
        info!(tag = %self.tag_name, "Element disconnected");
    }

    fn attribute_changed(&mut self, name: &str, old: Option<&str>, new: Option<&str>) {
        if !OBSERVED_ATTRIBUTES.contains(&name) {
            return;
        }
        debug!(attribute = name, old = ?old, new = ?new, "Attribute changed");
        self.style.set(name, new);
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn client(&self) -> Option<Rc<dyn ExternalClient>> {
        self.client.as_ref().and_then(Weak::upgrade)
    }

    fn set_client(&mut self, client: Option<Rc<dyn ExternalClient>>) -> Result<()> {
        info!(
            tag = %self.tag_name,
            client = client.as_ref().map_or("none", |c| c.name()),
            "Client property set"
        );
        self.client = client.as_ref().map(Rc::downgrade);
        if self.connected {
            self.render()?;
        }
        Ok(())
    }

    fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut BTreeMap<String, String> {
        &mut self.attributes
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for ClockElement {
    fn drop(&mut self) {
        if self.connected {
            self.disconnected();
        }
    }
}
