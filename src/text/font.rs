// Font discovery and loading
//
// The dial numerals and the digital readout are drawn with a single sans
// face. Discovery tries fontconfig first, then well-known paths, then a
// directory walk. A missing font is not fatal: callers skip text.

use fontdue::{Font, FontSettings};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Result, WidgetError};

#[derive(Clone)]
pub struct FontManager {
    font: Arc<Font>,
    source: String,
}

impl FontManager {
    /// Find a usable sans-serif font on this system
    pub fn discover() -> Option<Self> {
        Self::try_fontconfig()
            .or_else(Self::try_known_paths)
            .or_else(Self::try_search_dirs)
    }

    /// Load a specific font file
    pub fn from_path(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let font = Font::from_bytes(data, FontSettings::default()).map_err(|e| {
            WidgetError::RenderError(format!("failed to parse font {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded font");
        Ok(Self {
            font: Arc::new(font),
            source: path.display().to_string(),
        })
    }

    fn try_fontconfig() -> Option<Self> {
        use std::process::Command;

        let output = Command::new("fc-match")
            .args(["--format=%{file}", "sans"])
            .output()
            .ok()?;

        if !output.status.success() {
            return None;
        }

        let path = String::from_utf8(output.stdout).ok()?;
        let path = path.trim();

        if path.is_empty() {
            return None;
        }

        Self::try_load_font(Path::new(path))
    }

    fn try_known_paths() -> Option<Self> {
        // Standard paths across different Linux distributions
        const FONT_PATHS: [&str; 6] = [
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf",
            "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/gnu-free/FreeSans.ttf",
        ];

        FONT_PATHS
            .iter()
            .find_map(|path| Self::try_load_font(Path::new(path)))
    }

    fn try_search_dirs() -> Option<Self> {
        let mut dirs: Vec<String> = std::env::var("XDG_DATA_DIRS")
            .map(|v| v.split(':').map(|d| format!("{}/fonts", d)).collect())
            .unwrap_or_default();
        dirs.extend(
            ["/usr/share/fonts", "/usr/local/share/fonts"]
                .iter()
                .map(|d| d.to_string()),
        );

        dirs.iter()
            .find_map(|dir| Self::search_dir_for_font(Path::new(dir)))
    }

    fn search_dir_for_font(dir: &Path) -> Option<Self> {
        const FONT_NAMES: [&str; 3] = [
            "DejaVuSans.ttf",
            "NotoSans-Regular.ttf",
            "LiberationSans-Regular.ttf",
        ];

        let entries = std::fs::read_dir(dir).ok()?;
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                if let Some(found) = Self::search_dir_for_font(&path) {
                    return Some(found);
                }
            } else if path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| FONT_NAMES.contains(&name))
            {
                if let Some(found) = Self::try_load_font(&path) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn try_load_font(path: &Path) -> Option<Self> {
        match Self::from_path(path) {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unusable font");
                None
            }
        }
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Where the font was loaded from
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl std::fmt::Debug for FontManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontManager")
            .field("source", &self.source)
            .finish()
    }
}
