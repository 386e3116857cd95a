// Rasterization of the clock widget using tiny-skia
//
// The face scene is drawn in its 0-100 face space through a scaling
// transform; text goes through fontdue glyphs blitted by TextRenderer.

use tiny_skia::{
    FillRule, LineCap, Paint, Path, PathBuilder, Pixmap, PixmapMut, Rect, Stroke, Transform,
};
use tracing::{instrument, trace};

use crate::error::{Result, WidgetError};
use crate::face::{ClockScene, Shape, StrokeStyle};
use crate::geometry::FACE_SIZE;
use crate::text::{FontManager, TextRenderer};
use crate::theme::{ClockTheme, Color};
use crate::widget::ClockView;

/// Header band as a fraction of the widget height
const HEADER_RATIO: f32 = 0.12;
/// Readout band as a fraction of the widget height
const READOUT_RATIO: f32 = 0.2;
/// Padding as a fraction of the smaller widget dimension
const PADDING_RATIO: f32 = 0.04;
/// Thickness of the accent rule under the title, in pixels
const ACCENT_RULE_WIDTH: f32 = 2.0;

/// Pixel layout of the widget's three bands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WidgetLayout {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
    /// Bottom edge of the header band
    pub header_bottom: f32,
    /// Top-left corner of the square face area
    pub face_origin: (f32, f32),
    pub face_side: f32,
    /// Top edge of the readout band
    pub readout_top: f32,
}

impl WidgetLayout {
    pub fn compute(width: u32, height: u32) -> Self {
        let (w, h) = (width as f32, height as f32);
        let padding = (w.min(h) * PADDING_RATIO).round();
        let header_bottom = padding + h * HEADER_RATIO;
        let readout_top = h - padding - h * READOUT_RATIO;

        let available_h = (readout_top - header_bottom).max(0.0);
        let available_w = (w - 2.0 * padding).max(0.0);
        let face_side = available_w.min(available_h);
        let face_origin = (
            (w - face_side) / 2.0,
            header_bottom + (available_h - face_side) / 2.0,
        );

        Self {
            width: w,
            height: h,
            padding,
            header_bottom,
            face_origin,
            face_side,
            readout_top,
        }
    }

    /// Vertical span of the accent rule under the title
    pub fn accent_rule(&self) -> Option<Rect> {
        Rect::from_xywh(
            self.padding,
            self.header_bottom - ACCENT_RULE_WIDTH,
            self.width - 2.0 * self.padding,
            ACCENT_RULE_WIDTH,
        )
    }
}

pub struct Rasterizer {
    text: Option<TextRenderer>,
    theme: ClockTheme,
}

impl Rasterizer {
    /// Without a font, text is skipped and shapes are still drawn
    pub fn new(theme: ClockTheme, font: Option<FontManager>) -> Self {
        Self {
            text: font.map(TextRenderer::new),
            theme,
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.is_some()
    }

    /// Render a whole widget frame: background, header, face and readout
    #[instrument(skip(self, view), fields(title = view.title()))]
    pub fn render_widget(&mut self, view: &ClockView, width: u32, height: u32) -> Result<Pixmap> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            WidgetError::RenderError(format!("cannot allocate a {}x{} pixmap", width, height))
        })?;
        let layout = WidgetLayout::compute(width, height);
        let mut canvas = pixmap.as_mut();

        if let Some(path) = rounded_rect_path(layout.width, layout.height, self.theme.corner_radius)
        {
            canvas.fill_path(
                &path,
                &paint(self.theme.background),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }

        self.draw_header(&mut canvas, view, &layout);

        self.draw_scene(
            &mut canvas,
            view.scene(),
            layout.face_origin,
            layout.face_side,
        );

        self.draw_readout(&mut canvas, view, &layout);

        trace!(width, height, face = layout.face_side, "Widget rasterized");
        Ok(pixmap)
    }

    fn draw_header(&mut self, canvas: &mut PixmapMut, view: &ClockView, layout: &WidgetLayout) {
        let accent = view.accent();

        if let Some(rule) = layout.accent_rule() {
            canvas.fill_rect(rule, &paint(accent), Transform::identity(), None);
        }

        if let Some(text) = self.text.as_mut() {
            let band = layout.header_bottom - layout.padding;
            let size = (band * 0.6).max(6.0);
            text.render_text_centered(
                canvas,
                view.title(),
                layout.width / 2.0,
                layout.padding + (band - ACCENT_RULE_WIDTH) / 2.0,
                size,
                accent.to_array(),
            );
        }
    }

    fn draw_readout(&mut self, canvas: &mut PixmapMut, view: &ClockView, layout: &WidgetLayout) {
        let Some(text) = self.text.as_mut() else {
            return;
        };
        let band = layout.height - layout.padding - layout.readout_top;
        let readout = view.readout();

        let time_size = (band * 0.4).max(6.0);
        let date_size = (band * 0.25).max(5.0);
        text.render_text_centered(
            canvas,
            &readout.time,
            layout.width / 2.0,
            layout.readout_top + band * 0.3,
            time_size,
            self.theme.text_primary.to_array(),
        );
        text.render_text_centered(
            canvas,
            &readout.date,
            layout.width / 2.0,
            layout.readout_top + band * 0.75,
            date_size,
            self.theme.text_secondary.to_array(),
        );
    }

    /// Draw a face scene into the square at `origin` with side `side`
    pub fn draw_scene(
        &mut self,
        canvas: &mut PixmapMut,
        scene: &ClockScene,
        origin: (f32, f32),
        side: f32,
    ) {
        if side <= 0.0 {
            return;
        }
        let scale = side / FACE_SIZE;
        let transform = Transform::from_row(scale, 0.0, 0.0, scale, origin.0, origin.1);

        for node in &scene.nodes {
            match &node.shape {
                Shape::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    let Some(path) = PathBuilder::from_circle(center.x, center.y, *radius) else {
                        continue;
                    };
                    if let Some(fill) = fill {
                        canvas.fill_path(&path, &paint(*fill), FillRule::Winding, transform, None);
                    }
                    if let Some(style) = stroke {
                        canvas.stroke_path(&path, &paint(style.color), &stroke_for(style), transform, None);
                    }
                }
                Shape::Line { from, to, stroke } => {
                    let mut pb = PathBuilder::new();
                    pb.move_to(from.x, from.y);
                    pb.line_to(to.x, to.y);
                    if let Some(path) = pb.finish() {
                        canvas.stroke_path(&path, &paint(stroke.color), &stroke_for(stroke), transform, None);
                    }
                }
                Shape::Text {
                    anchor,
                    content,
                    size,
                    fill,
                    ..
                } => {
                    if let Some(text) = self.text.as_mut() {
                        text.render_text_centered(
                            canvas,
                            content,
                            origin.0 + anchor.x * scale,
                            origin.1 + anchor.y * scale,
                            size * scale,
                            fill.to_array(),
                        );
                    }
                }
            }
        }
    }
}

fn paint(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_tiny_skia());
    paint.anti_alias = true;
    paint
}

fn stroke_for(style: &StrokeStyle) -> Stroke {
    Stroke {
        width: style.width,
        line_cap: if style.round_cap {
            LineCap::Round
        } else {
            LineCap::Butt
        },
        ..Default::default()
    }
}

/// Rounded rectangle with circular corners
fn rounded_rect_path(width: f32, height: f32, radius: f32) -> Option<Path> {
    let r = radius.min(width / 2.0).min(height / 2.0);
    if r <= 0.5 {
        return Some(PathBuilder::from_rect(Rect::from_xywh(0.0, 0.0, width, height)?));
    }

    // Cubic bezier approximation of a quarter circle
    const KAPPA: f32 = 0.552_284_8;
    let k = r * KAPPA;

    let mut pb = PathBuilder::new();
    pb.move_to(r, 0.0);
    pb.line_to(width - r, 0.0);
    pb.cubic_to(width - r + k, 0.0, width, r - k, width, r);
    pb.line_to(width, height - r);
    pb.cubic_to(width, height - r + k, width - r + k, height, width - r, height);
    pb.line_to(r, height);
    pb.cubic_to(r - k, height, 0.0, height - r + k, 0.0, height - r);
    pb.line_to(0.0, r);
    pb.cubic_to(0.0, r - k, r - k, 0.0, r, 0.0);
    pb.close();
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::ClockFaceRenderer;
    use crate::geometry::{FaceGeometry, HandAngles};
    use crate::readout::ChronoLocaleFormatter;
    use crate::time::{FixedTimeSource, Moment};
    use crate::widget::{PresentationState, ViewProps};
    use std::rc::Rc;

    fn demultiplied(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let pixel = pixmap.pixel(x, y).unwrap().demultiply();
        [pixel.red(), pixel.green(), pixel.blue(), pixel.alpha()]
    }

    fn view() -> ClockView {
        ClockView::new(ViewProps {
            title: "Analog Clock".to_string(),
            time_source: Rc::new(FixedTimeSource::new(Moment::from_hms(3, 0, 0).unwrap())),
            formatter: Rc::new(ChronoLocaleFormatter::default()),
            theme: ClockTheme::dark(),
            presentation: PresentationState::default(),
            client: None,
        })
    }

    #[test]
    fn test_layout_face_is_square_and_inside() {
        let layout = WidgetLayout::compute(300, 400);
        assert!(layout.face_side > 0.0);
        assert!(layout.face_origin.0 >= layout.padding);
        assert!(layout.face_origin.1 >= layout.header_bottom);
        assert!(layout.face_origin.1 + layout.face_side <= layout.readout_top + 0.01);
    }

    #[test]
    fn test_center_highlight_painted() {
        let theme = ClockTheme::dark();
        let scene = ClockFaceRenderer::new(theme.clone()).scene(
            &HandAngles::from_moment(&Moment::from_hms(3, 0, 0).unwrap()),
            FaceGeometry::shared(),
        );
        let mut rasterizer = Rasterizer::new(theme.clone(), None);
        let mut pixmap = Pixmap::new(400, 400).unwrap();
        rasterizer.draw_scene(&mut pixmap.as_mut(), &scene, (0.0, 0.0), 400.0);

        // Highlight radius is 4px at this scale, fully covering the center pixel
        let [r, g, b, a] = demultiplied(&pixmap, 200, 200);
        assert_eq!(a, 255);
        assert_eq!((r, g, b), (0xff, 0x6b, 0x6b));
    }

    #[test]
    fn test_widget_background_has_rounded_corners() {
        let mut rasterizer = Rasterizer::new(ClockTheme::dark(), None);
        let pixmap = rasterizer.render_widget(&view(), 200, 260).unwrap();
        assert_eq!(demultiplied(&pixmap, 0, 0)[3], 0);
        assert!(demultiplied(&pixmap, 100, 5)[3] > 200);
    }

    #[test]
    fn test_accent_rule_uses_accent_color() {
        let mut view = view();
        view.set_accent(Color::rgb(255, 0, 0));
        let mut rasterizer = Rasterizer::new(ClockTheme::dark(), None);
        let pixmap = rasterizer.render_widget(&view, 200, 260).unwrap();

        let rule = WidgetLayout::compute(200, 260).accent_rule().unwrap();
        let y = (rule.top() + rule.height() / 2.0) as u32;
        let [r, g, b, _] = demultiplied(&pixmap, 100, y);
        assert!(r > 240 && g < 16 && b < 16, "got {:?}", (r, g, b));
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut rasterizer = Rasterizer::new(ClockTheme::dark(), None);
        assert!(rasterizer.render_widget(&view(), 0, 10).is_err());
    }
}
