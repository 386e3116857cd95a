//! Clock face scene assembly
//!
//! [`ClockFaceRenderer`] turns the static dial layout plus the current
//! hand angles into a [`ClockScene`]: a flat, back-to-front list of
//! shapes in the 0-100 face space. It does no timing and no pixel work;
//! the rasterizer in [`crate::render`] and [`ClockScene::to_svg`] consume
//! the scene.

use std::fmt::Write as _;

use crate::geometry::{polar, FaceGeometry, HandAngles, Point, FACE_CENTER, FACE_SIZE};
use crate::theme::{ClockTheme, Color};

pub const OUTER_RING_RADIUS: f32 = 45.0;
pub const INNER_RING_RADIUS: f32 = 42.0;
pub const HOUR_HAND_LENGTH: f32 = 20.0;
pub const MINUTE_HAND_LENGTH: f32 = 30.0;
pub const SECOND_HAND_LENGTH: f32 = 35.0;
pub const CENTER_DOT_RADIUS: f32 = 2.0;
pub const CENTER_HIGHLIGHT_RADIUS: f32 = 1.0;
pub const NUMERAL_FONT_SIZE: f32 = 4.0;
pub const NUMERAL_FONT_WEIGHT: u16 = 500;

/// What a scene node depicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    OuterRing,
    InnerRing,
    HourTick,
    MinuteTick,
    Numeral,
    HourHand,
    MinuteHand,
    SecondHand,
    CenterDot,
    CenterHighlight,
}

impl NodeRole {
    /// Class name used in SVG output
    pub fn class_name(&self) -> &'static str {
        match self {
            NodeRole::OuterRing => "outer-ring",
            NodeRole::InnerRing => "inner-ring",
            NodeRole::HourTick => "hour-marker",
            NodeRole::MinuteTick => "minute-marker",
            NodeRole::Numeral => "numeral",
            NodeRole::HourHand => "hour-hand",
            NodeRole::MinuteHand => "minute-hand",
            NodeRole::SecondHand => "second-hand",
            NodeRole::CenterDot => "center-dot",
            NodeRole::CenterHighlight => "center-highlight",
        }
    }
}

/// Stroke parameters, widths in face units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    pub round_cap: bool,
}

impl StrokeStyle {
    fn round(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            round_cap: true,
        }
    }

    fn plain(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            round_cap: false,
        }
    }
}

/// A drawable primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle {
        center: Point,
        radius: f32,
        fill: Option<Color>,
        stroke: Option<StrokeStyle>,
    },
    Line {
        from: Point,
        to: Point,
        stroke: StrokeStyle,
    },
    /// Text centered on `anchor` both horizontally and vertically
    Text {
        anchor: Point,
        content: String,
        size: f32,
        weight: u16,
        fill: Color,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub role: NodeRole,
    pub shape: Shape,
}

/// Back-to-front list of shapes making up one frame of the dial
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClockScene {
    pub nodes: Vec<SceneNode>,
}

impl ClockScene {
    fn push(&mut self, role: NodeRole, shape: Shape) {
        self.nodes.push(SceneNode { role, shape });
    }

    /// All nodes with the given role, in paint order
    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(move |node| node.role == role)
    }

    /// The single node for a unique role such as a hand
    pub fn node(&self, role: NodeRole) -> Option<&SceneNode> {
        self.nodes_with_role(role).next()
    }

    /// Tip of a hand, if the role is one of the three hands
    pub fn hand_tip(&self, role: NodeRole) -> Option<Point> {
        match self.node(role)?.shape {
            Shape::Line { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Serialize as a standalone SVG document with a 0 0 100 100 view box
    pub fn to_svg(&self) -> String {
        let mut out = String::with_capacity(16 * 1024);
        // Writing into a String cannot fail
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {size} {size}" class="clock-face">"#,
            size = FACE_SIZE
        );
        for node in &self.nodes {
            let class = node.role.class_name();
            let _ = match &node.shape {
                Shape::Circle {
                    center,
                    radius,
                    fill,
                    stroke,
                } => {
                    let fill = fill.map_or_else(|| "none".to_string(), Color::to_css);
                    let stroke = stroke.map_or_else(String::new, |s| {
                        format!(r#" stroke="{}" stroke-width="{}""#, s.color.to_css(), s.width)
                    });
                    writeln!(
                        out,
                        r#"  <circle class="{class}" cx="{}" cy="{}" r="{radius}" fill="{fill}"{stroke}/>"#,
                        center.x, center.y
                    )
                }
                Shape::Line { from, to, stroke } => {
                    let cap = if stroke.round_cap {
                        r#" stroke-linecap="round""#
                    } else {
                        ""
                    };
                    writeln!(
                        out,
                        r#"  <line class="{class}" x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" stroke="{}" stroke-width="{}"{cap}/>"#,
                        from.x,
                        from.y,
                        to.x,
                        to.y,
                        stroke.color.to_css(),
                        stroke.width
                    )
                }
                Shape::Text {
                    anchor,
                    content,
                    size,
                    weight,
                    fill,
                } => writeln!(
                    out,
                    r#"  <text class="{class}" x="{:.3}" y="{:.3}" text-anchor="middle" dominant-baseline="middle" fill="{}" font-size="{size}" font-weight="{weight}" font-family="Inter, sans-serif">{content}</text>"#,
                    anchor.x,
                    anchor.y,
                    fill.to_css()
                ),
            };
        }
        out.push_str("</svg>\n");
        out
    }
}

/// Maps hand angles and dial geometry onto a drawable scene
#[derive(Debug, Clone, Default)]
pub struct ClockFaceRenderer {
    theme: ClockTheme,
}

impl ClockFaceRenderer {
    pub fn new(theme: ClockTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &ClockTheme {
        &self.theme
    }

    /// Build the scene for one frame
    pub fn scene(&self, angles: &HandAngles, geometry: &FaceGeometry) -> ClockScene {
        let theme = &self.theme;
        let mut scene = ClockScene {
            nodes: Vec::with_capacity(
                geometry.hour_ticks.len() + geometry.minute_ticks.len() + geometry.numerals.len() + 7,
            ),
        };

        scene.push(
            NodeRole::OuterRing,
            Shape::Circle {
                center: FACE_CENTER,
                radius: OUTER_RING_RADIUS,
                fill: None,
                stroke: Some(StrokeStyle::plain(theme.outer_ring, 0.5)),
            },
        );
        scene.push(
            NodeRole::InnerRing,
            Shape::Circle {
                center: FACE_CENTER,
                radius: INNER_RING_RADIUS,
                fill: Some(theme.inner_ring_fill),
                stroke: Some(StrokeStyle::plain(theme.inner_ring_stroke, 0.5)),
            },
        );

        for tick in &geometry.hour_ticks {
            scene.push(
                NodeRole::HourTick,
                Shape::Line {
                    from: tick.inner,
                    to: tick.outer,
                    stroke: StrokeStyle::round(theme.hour_tick, 2.0),
                },
            );
        }
        for tick in &geometry.minute_ticks {
            scene.push(
                NodeRole::MinuteTick,
                Shape::Line {
                    from: tick.inner,
                    to: tick.outer,
                    stroke: StrokeStyle::round(theme.minute_tick, 1.0),
                },
            );
        }
        for numeral in &geometry.numerals {
            scene.push(
                NodeRole::Numeral,
                Shape::Text {
                    anchor: numeral.position,
                    content: numeral.value.to_string(),
                    size: NUMERAL_FONT_SIZE,
                    weight: NUMERAL_FONT_WEIGHT,
                    fill: theme.numeral,
                },
            );
        }

        let hand = |angle: f32, length: f32, color: Color, width: f32| Shape::Line {
            from: FACE_CENTER,
            to: polar(FACE_CENTER, length, angle),
            stroke: StrokeStyle::round(color, width),
        };
        scene.push(
            NodeRole::HourHand,
            hand(angles.hour_deg, HOUR_HAND_LENGTH, theme.hand, 3.0),
        );
        scene.push(
            NodeRole::MinuteHand,
            hand(angles.minute_deg, MINUTE_HAND_LENGTH, theme.hand, 2.0),
        );
        scene.push(
            NodeRole::SecondHand,
            hand(angles.second_deg, SECOND_HAND_LENGTH, theme.second_hand, 1.0),
        );

        scene.push(
            NodeRole::CenterDot,
            Shape::Circle {
                center: FACE_CENTER,
                radius: CENTER_DOT_RADIUS,
                fill: Some(theme.hand),
                stroke: None,
            },
        );
        scene.push(
            NodeRole::CenterHighlight,
            Shape::Circle {
                center: FACE_CENTER,
                radius: CENTER_HIGHLIGHT_RADIUS,
                fill: Some(theme.second_hand),
                stroke: None,
            },
        );

        scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Moment;

    fn scene_at(h: u32, m: u32, s: u32) -> ClockScene {
        let angles = HandAngles::from_moment(&Moment::from_hms(h, m, s).unwrap());
        ClockFaceRenderer::default().scene(&angles, FaceGeometry::shared())
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_scene_inventory() {
        let scene = scene_at(10, 10, 30);
        assert_eq!(scene.nodes_with_role(NodeRole::HourTick).count(), 12);
        assert_eq!(scene.nodes_with_role(NodeRole::MinuteTick).count(), 48);
        assert_eq!(scene.nodes_with_role(NodeRole::Numeral).count(), 12);
        for role in [
            NodeRole::OuterRing,
            NodeRole::InnerRing,
            NodeRole::HourHand,
            NodeRole::MinuteHand,
            NodeRole::SecondHand,
            NodeRole::CenterDot,
            NodeRole::CenterHighlight,
        ] {
            assert_eq!(scene.nodes_with_role(role).count(), 1, "{role:?}");
        }
        assert_eq!(scene.nodes.len(), 12 + 48 + 12 + 7);
    }

    #[test]
    fn test_rings_have_distinct_opacity() {
        let scene = scene_at(0, 0, 0);
        let ring_stroke = |role| match scene.node(role).map(|n| &n.shape) {
            Some(Shape::Circle { radius, stroke, .. }) => (*radius, stroke.unwrap().color.a),
            other => panic!("unexpected shape {other:?}"),
        };
        let (outer_r, outer_a) = ring_stroke(NodeRole::OuterRing);
        let (inner_r, inner_a) = ring_stroke(NodeRole::InnerRing);
        assert_eq!(outer_r, 45.0);
        assert_eq!(inner_r, 42.0);
        assert_ne!(outer_a, inner_a);
    }

    #[test]
    fn test_hand_tips_at_quarter_past_three() {
        let scene = scene_at(3, 15, 45);

        // Second hand at 45s points left
        let tip = scene.hand_tip(NodeRole::SecondHand).unwrap();
        assert!(approx(tip.x, 50.0 - SECOND_HAND_LENGTH));
        assert!(approx(tip.y, 50.0));

        // Hand lengths are preserved
        for (role, length) in [
            (NodeRole::HourHand, HOUR_HAND_LENGTH),
            (NodeRole::MinuteHand, MINUTE_HAND_LENGTH),
            (NodeRole::SecondHand, SECOND_HAND_LENGTH),
        ] {
            let tip = scene.hand_tip(role).unwrap();
            assert!(approx(tip.distance(FACE_CENTER), length), "{role:?}");
        }
    }

    #[test]
    fn test_second_hand_is_distinguished() {
        let scene = scene_at(1, 2, 3);
        let color = |role| match scene.node(role).map(|n| &n.shape) {
            Some(Shape::Line { stroke, .. }) => stroke.color,
            other => panic!("unexpected shape {other:?}"),
        };
        assert_ne!(color(NodeRole::SecondHand), color(NodeRole::MinuteHand));
        assert_eq!(color(NodeRole::HourHand), color(NodeRole::MinuteHand));
    }

    #[test]
    fn test_svg_output() {
        let svg = scene_at(14, 30, 15).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<line").count(), 12 + 48 + 3);
        assert_eq!(svg.matches("<text").count(), 12);
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains(r#"class="second-hand""#));
        assert!(svg.contains("rgb(255, 107, 107)"));
        assert!(svg.contains(">12</text>"));
    }
}
