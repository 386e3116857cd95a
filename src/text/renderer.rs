// Text rendering with alpha blending

use super::{FontManager, GlyphCache};
use tiny_skia::PixmapMut;
use tracing::trace;

pub struct TextRenderer {
    font_manager: FontManager,
    glyph_cache: GlyphCache,
}

impl TextRenderer {
    pub fn new(font_manager: FontManager) -> Self {
        Self {
            font_manager,
            glyph_cache: GlyphCache::new(),
        }
    }

    /// Render text with its baseline starting at (`x`, `y`)
    pub fn render_text(
        &mut self,
        pixmap: &mut PixmapMut,
        text: &str,
        x: f32,
        y: f32,
        size: f32,
        color: [u8; 4], // RGBA
    ) {
        trace!(text, x, y, size, "Rendering text");

        self.glyph_cache.clear_if_full();

        let mut cursor_x = x;
        let baseline_y = y.round() as i32;
        let font = self.font_manager.font();

        for c in text.chars() {
            let glyph = self.glyph_cache.get_or_rasterize(font, c, size);

            // fontdue's ymin is the offset from the baseline to the bitmap's
            // bottom edge; screen y grows downward
            let glyph_x = cursor_x.round() as i32 + glyph.xmin;
            let glyph_y = baseline_y - glyph.ymin - glyph.height as i32;

            blit_glyph(
                pixmap,
                &glyph.bitmap,
                glyph.width,
                glyph.height,
                glyph_x,
                glyph_y,
                color,
            );

            cursor_x += glyph.advance_width;
        }
    }

    /// Render text centered on (`cx`, `cy`)
    pub fn render_text_centered(
        &mut self,
        pixmap: &mut PixmapMut,
        text: &str,
        cx: f32,
        cy: f32,
        size: f32,
        color: [u8; 4],
    ) {
        let width = self.measure_text(text, size);
        let baseline = self.baseline_for_center(size, cy);
        self.render_text(pixmap, text, cx - width / 2.0, baseline, size, color);
    }

    /// Calculate text width for layout purposes
    pub fn measure_text(&mut self, text: &str, size: f32) -> f32 {
        let font = self.font_manager.font();
        text.chars()
            .map(|c| self.glyph_cache.get_or_rasterize(font, c, size).advance_width)
            .sum()
    }

    /// Baseline y that vertically centers a line of text on `y_center`
    pub fn baseline_for_center(&self, size: f32, y_center: f32) -> f32 {
        let (ascent, descent) = match self.font_manager.font().horizontal_line_metrics(size) {
            Some(metrics) => (metrics.ascent, metrics.descent),
            None => (size * 0.8, size * -0.2),
        };
        y_center + (ascent + descent) / 2.0
    }
}

/// Blit a glyph bitmap onto a pixmap with alpha blending
#[inline]
fn blit_glyph(
    pixmap: &mut PixmapMut,
    bitmap: &[u8],
    glyph_width: usize,
    glyph_height: usize,
    x: i32,
    y: i32,
    color: [u8; 4],
) {
    let pixmap_width = pixmap.width() as i32;
    let pixmap_height = pixmap.height() as i32;
    let pixels = pixmap.pixels_mut();

    let color_r = color[0] as f32;
    let color_g = color[1] as f32;
    let color_b = color[2] as f32;
    let color_a_factor = color[3] as f32 / 255.0;

    for gy in 0..glyph_height {
        let py = y + gy as i32;
        if py < 0 || py >= pixmap_height {
            continue;
        }

        let row_start = py * pixmap_width;

        for gx in 0..glyph_width {
            let px = x + gx as i32;
            if px < 0 || px >= pixmap_width {
                continue;
            }

            let glyph_alpha = bitmap[gy * glyph_width + gx];
            if glyph_alpha == 0 {
                continue;
            }

            let pixel = &mut pixels[(row_start + px) as usize];

            let alpha = (glyph_alpha as f32 / 255.0) * color_a_factor;
            let inv_alpha = 1.0 - alpha;
            let dst = pixel.demultiply();

            let new_r = (color_r * alpha + dst.red() as f32 * inv_alpha).clamp(0.0, 255.0) as u8;
            let new_g = (color_g * alpha + dst.green() as f32 * inv_alpha).clamp(0.0, 255.0) as u8;
            let new_b = (color_b * alpha + dst.blue() as f32 * inv_alpha).clamp(0.0, 255.0) as u8;
            let new_a =
                ((alpha + dst.alpha() as f32 / 255.0 * inv_alpha) * 255.0).clamp(0.0, 255.0) as u8;

            // tiny-skia stores premultiplied pixels
            *pixel = tiny_skia::ColorU8::from_rgba(new_r, new_g, new_b, new_a).premultiply();
        }
    }
}
