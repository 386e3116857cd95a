// Text rendering module using fontdue

mod font;
mod glyph_cache;
mod renderer;

pub use font::FontManager;
pub use glyph_cache::GlyphCache;
pub use renderer::TextRenderer;
