//! The clock's internal view tree
//!
//! One [`ClockView`] holds everything a frame needs: the header (title in
//! the accent color), the analog face scene and the digital readout.
//! It is re-rendered from a fresh [`Moment`] on every refresh tick.

use std::rc::{Rc, Weak};

use tracing::trace;

use crate::client::ExternalClient;
use crate::face::{ClockFaceRenderer, ClockScene};
use crate::geometry::{FaceGeometry, HandAngles};
use crate::readout::{DigitalReadout, LocaleFormatter, Readout};
use crate::theme::{ClockTheme, Color};
use crate::time::{Moment, TimeSource};

/// Widget-local view state that does not derive from time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresentationState {
    /// Header/accent color
    pub accent: Color,
}

impl PresentationState {
    pub fn new(accent: Color) -> Self {
        Self { accent }
    }
}

impl Default for PresentationState {
    fn default() -> Self {
        Self::new(Color::rgb(255, 255, 255))
    }
}

/// Everything the view needs from its host at mount time
pub struct ViewProps {
    pub title: String,
    pub time_source: Rc<dyn TimeSource>,
    pub formatter: Rc<dyn LocaleFormatter>,
    pub theme: ClockTheme,
    pub presentation: PresentationState,
    pub client: Option<Weak<dyn ExternalClient>>,
}

pub struct ClockView {
    title: String,
    time_source: Rc<dyn TimeSource>,
    readout: DigitalReadout,
    face: ClockFaceRenderer,
    presentation: PresentationState,
    client: Option<Weak<dyn ExternalClient>>,

    // Current frame
    moment: Moment,
    angles: HandAngles,
    scene: ClockScene,
    text: Readout,
    renders: u64,
}

impl ClockView {
    /// Build the view and render its first frame
    pub fn new(props: ViewProps) -> Self {
        let moment = props.time_source.now();
        let mut view = Self {
            title: props.title,
            time_source: props.time_source,
            readout: DigitalReadout::new(props.formatter),
            face: ClockFaceRenderer::new(props.theme),
            presentation: props.presentation,
            client: props.client,
            moment,
            angles: HandAngles::from_moment(&moment),
            scene: ClockScene::default(),
            text: Readout::default(),
            renders: 0,
        };
        view.render_frame();
        view
    }

    /// Sample the time source and re-render face and readout
    pub fn refresh(&mut self) {
        self.moment = self.time_source.now();
        self.angles = HandAngles::from_moment(&self.moment);
        self.render_frame();
    }

    fn render_frame(&mut self) {
        self.scene = self.face.scene(&self.angles, FaceGeometry::shared());
        self.text = self.readout.format(&self.moment);
        self.renders += 1;
        trace!(time = %self.text.time, renders = self.renders, "Clock view rendered");
    }

    /// Change the header/accent color; the face itself is unaffected
    pub fn set_accent(&mut self, color: Color) {
        self.presentation.accent = color;
        self.renders += 1;
    }

    pub fn set_client(&mut self, client: Option<Weak<dyn ExternalClient>>) {
        self.client = client;
        self.renders += 1;
    }

    /// The client reference the view was last rendered with
    pub fn client(&self) -> Option<Rc<dyn ExternalClient>> {
        self.client.as_ref().and_then(Weak::upgrade)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn accent(&self) -> Color {
        self.presentation.accent
    }

    pub fn presentation(&self) -> PresentationState {
        self.presentation
    }

    pub fn moment(&self) -> Moment {
        self.moment
    }

    pub fn angles(&self) -> HandAngles {
        self.angles
    }

    pub fn scene(&self) -> &ClockScene {
        &self.scene
    }

    pub fn readout(&self) -> &Readout {
        &self.text
    }

    pub fn theme(&self) -> &ClockTheme {
        self.face.theme()
    }

    /// Number of renders since mount (frames plus state changes)
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}
