// Glyph caching for text rendering
//
// Numerals and readout digits repeat every frame, so rasterized glyphs are
// kept keyed by character and size.

use fontdue::Font;
use std::collections::HashMap;

const MAX_CACHE_SIZE: usize = 256;

pub struct GlyphCache {
    cache: HashMap<GlyphKey, RasterizedGlyph>,
    hits: u64,
    misses: u64,
}

#[derive(Hash, Eq, PartialEq, Clone, Copy)]
struct GlyphKey {
    character: char,
    size_px: u32, // size in pixels * 10 for sub-pixel precision
}

pub struct RasterizedGlyph {
    pub bitmap: Vec<u8>,
    pub width: usize,
    pub height: usize,
    pub xmin: i32,
    pub ymin: i32,
    pub advance_width: f32,
}

impl GlyphCache {
    pub fn new() -> Self {
        Self {
            cache: HashMap::with_capacity(64),
            hits: 0,
            misses: 0,
        }
    }

    pub fn get_or_rasterize(&mut self, font: &Font, c: char, size: f32) -> &RasterizedGlyph {
        let key = GlyphKey {
            character: c,
            size_px: (size * 10.0) as u32,
        };

        if self.cache.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }

        self.cache.entry(key).or_insert_with(|| {
            let (metrics, bitmap) = font.rasterize(c, size);
            RasterizedGlyph {
                bitmap,
                width: metrics.width,
                height: metrics.height,
                xmin: metrics.xmin,
                ymin: metrics.ymin,
                advance_width: metrics.advance_width,
            }
        })
    }

    pub fn clear_if_full(&mut self) {
        if self.cache.len() >= MAX_CACHE_SIZE {
            let evicted = self.cache.len();
            self.cache.clear();
            tracing::debug!(evicted, hits = self.hits, misses = self.misses, "Cleared glyph cache");
        }
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for GlyphCache {
    fn default() -> Self {
        Self::new()
    }
}
