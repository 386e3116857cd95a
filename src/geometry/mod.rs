//! Clock geometry: hand angles and the static dial layout
//!
//! Everything here is pure. Angles are plain degrees measured clockwise
//! from 3 o'clock (screen coordinates, y grows downward), shifted by -90
//! so that zero seconds/minutes/hours point straight up. They are not
//! normalized to `[0, 360)`.
//!
//! Positions live in a 0-100 face space centered on (50, 50).

use once_cell::sync::Lazy;

use crate::time::Moment;

/// Side length of the face coordinate space
pub const FACE_SIZE: f32 = 100.0;

/// Center of the dial in face coordinates
pub const FACE_CENTER: Point = Point::new(50.0, 50.0);

/// Hour tick marks run from this radius...
pub const HOUR_TICK_INNER: f32 = 35.0;
/// ...out to this one
pub const HOUR_TICK_OUTER: f32 = 40.0;
pub const MINUTE_TICK_INNER: f32 = 37.0;
pub const MINUTE_TICK_OUTER: f32 = 40.0;
/// Radius of the numeral ring
pub const NUMERAL_RADIUS: f32 = 28.0;
/// Downward nudge applied to numerals to compensate for the text baseline
pub const NUMERAL_BASELINE_BIAS: f32 = 2.0;

const ANGLE_OFFSET: f32 = -90.0;

/// A point in face space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Point at `radius` from `center` along `angle_deg`
pub fn polar(center: Point, radius: f32, angle_deg: f32) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(center.x + radius * rad.cos(), center.y + radius * rad.sin())
}

/// Rotation of the three hands, in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandAngles {
    pub hour_deg: f32,
    pub minute_deg: f32,
    pub second_deg: f32,
}

impl HandAngles {
    /// Derive the hand angles for a moment
    ///
    /// The minute hand advances 0.1° per elapsed second and the hour hand
    /// 0.5° per elapsed minute, so neither jumps at the top of its unit.
    pub fn from_moment(moment: &Moment) -> Self {
        let hours = (moment.hour() % 12) as f32;
        let minutes = moment.minute() as f32;
        let seconds = moment.second() as f32;

        Self {
            hour_deg: hours * 30.0 + minutes * 0.5 + ANGLE_OFFSET,
            minute_deg: minutes * 6.0 + seconds * 0.1 + ANGLE_OFFSET,
            second_deg: seconds * 6.0 + ANGLE_OFFSET,
        }
    }
}

/// A tick mark: a short radial segment on the dial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMark {
    /// 1-12 for hour ticks, 1-59 for minute ticks
    pub index: u32,
    pub angle_deg: f32,
    pub inner: Point,
    pub outer: Point,
}

impl TickMark {
    fn new(index: u32, step_deg: f32, inner_radius: f32, outer_radius: f32) -> Self {
        let angle_deg = index as f32 * step_deg + ANGLE_OFFSET;
        Self {
            index,
            angle_deg,
            inner: polar(FACE_CENTER, inner_radius, angle_deg),
            outer: polar(FACE_CENTER, outer_radius, angle_deg),
        }
    }
}

/// Placement of one dial numeral
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Numeral {
    pub value: u32,
    pub angle_deg: f32,
    /// Text anchor, baseline bias already applied
    pub position: Point,
}

/// Static, time-independent layout of the dial
#[derive(Debug, Clone, PartialEq)]
pub struct FaceGeometry {
    pub hour_ticks: Vec<TickMark>,
    pub minute_ticks: Vec<TickMark>,
    pub numerals: Vec<Numeral>,
}

static SHARED_GEOMETRY: Lazy<FaceGeometry> = Lazy::new(FaceGeometry::new);

impl FaceGeometry {
    /// Compute the dial layout
    pub fn new() -> Self {
        let hour_ticks = (1..=12)
            .map(|i| TickMark::new(i, 30.0, HOUR_TICK_INNER, HOUR_TICK_OUTER))
            .collect();

        // Every fifth minute coincides with an hour tick
        let minute_ticks = (1..=60)
            .filter(|i| i % 5 != 0)
            .map(|i| TickMark::new(i, 6.0, MINUTE_TICK_INNER, MINUTE_TICK_OUTER))
            .collect();

        let numerals = (1..=12)
            .map(|value| {
                let angle_deg = value as f32 * 30.0 + ANGLE_OFFSET;
                let anchor = polar(FACE_CENTER, NUMERAL_RADIUS, angle_deg);
                Numeral {
                    value,
                    angle_deg,
                    position: Point::new(anchor.x, anchor.y + NUMERAL_BASELINE_BIAS),
                }
            })
            .collect();

        Self {
            hour_ticks,
            minute_ticks,
            numerals,
        }
    }

    /// The process-wide cached layout; it never changes
    pub fn shared() -> &'static FaceGeometry {
        &SHARED_GEOMETRY
    }
}

impl Default for FaceGeometry {
    fn default() -> Self {
        Self::new()
    }
}
