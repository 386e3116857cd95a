//! Theming system for the clock face and widget chrome

use std::fmt;

/// RGBA color representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// White with the given opacity (0.0-1.0)
    pub fn white(opacity: f32) -> Self {
        Self::rgb(255, 255, 255).with_opacity(opacity)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn with_opacity(self, opacity: f32) -> Self {
        self.with_alpha((opacity.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Alpha as a 0.0-1.0 opacity, rounded to two decimals
    pub fn opacity(self) -> f32 {
        (self.a as f32 / 255.0 * 100.0).round() / 100.0
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Convert to tiny-skia Color
    pub fn to_tiny_skia(self) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
    }

    /// CSS functional notation: `rgb(r, g, b)` when opaque, `rgba(...)` otherwise
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.opacity())
        }
    }

    /// Parse `#rrggbb`, `#rrggbbaa` or `#rgb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        // from_str_radix alone would accept a leading '+'
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match digits.len() {
            3 => {
                let mut it = digits.chars().map(|c| c.to_digit(16).map(|v| (v * 17) as u8));
                Some(Self::rgb(it.next()??, it.next()??, it.next()??))
            }
            6 => Some(Self::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            8 => Some(Self::new(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
                channel(&digits[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

/// Colors used to paint the clock face and the surrounding widget
#[derive(Debug, Clone)]
pub struct ClockTheme {
    /// Widget background
    pub background: Color,
    /// Outer ring stroke
    pub outer_ring: Color,
    /// Inner ring fill
    pub inner_ring_fill: Color,
    /// Inner ring stroke
    pub inner_ring_stroke: Color,
    /// Hour tick marks
    pub hour_tick: Color,
    /// Minute tick marks
    pub minute_tick: Color,
    /// Dial numerals
    pub numeral: Color,
    /// Hour and minute hands, center dot
    pub hand: Color,
    /// Second hand and center highlight
    pub second_hand: Color,
    /// Digital readout text
    pub text_primary: Color,
    /// Date line text
    pub text_secondary: Color,
    /// Corner radius for the widget background
    pub corner_radius: f32,
}

impl ClockTheme {
    /// Translucent white on dark, the widget's stock look
    pub fn dark() -> Self {
        Self {
            background: Color::new(30, 30, 46, 230),
            outer_ring: Color::white(0.2),
            inner_ring_fill: Color::white(0.05),
            inner_ring_stroke: Color::white(0.1),
            hour_tick: Color::white(0.8),
            minute_tick: Color::white(0.4),
            numeral: Color::white(0.9),
            hand: Color::white(0.9),
            second_hand: Color::rgb(0xff, 0x6b, 0x6b),
            text_primary: Color::white(0.95),
            text_secondary: Color::white(0.7),
            corner_radius: 16.0,
        }
    }

    /// Dark strokes on a light background
    pub fn light() -> Self {
        let ink = |opacity| Color::rgb(30, 30, 30).with_opacity(opacity);
        Self {
            background: Color::new(250, 250, 250, 240),
            outer_ring: ink(0.2),
            inner_ring_fill: ink(0.05),
            inner_ring_stroke: ink(0.1),
            hour_tick: ink(0.8),
            minute_tick: ink(0.4),
            numeral: ink(0.9),
            hand: ink(0.9),
            second_hand: Color::rgb(0xe0, 0x3e, 0x3e),
            text_primary: ink(0.95),
            text_secondary: ink(0.7),
            corner_radius: 16.0,
        }
    }

    /// Load theme by name
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }
}

impl Default for ClockTheme {
    fn default() -> Self {
        Self::dark()
    }
}
