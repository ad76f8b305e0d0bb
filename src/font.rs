// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Font lookup for text labels.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use ab_glyph::FontVec;

use crate::{verbose, warn};

/// Environment variable pointing at a TrueType font to use for labels.
pub const FONT_ENV: &str = "POSEVIZ_FONT";

/// Font fetched into the config directory when nothing else is configured.
pub const DEFAULT_FONT: &str = "Arial.ttf";

/// Assets URL for downloading fonts
#[cfg(feature = "annotate")]
const ASSETS_URL: &str = "https://github.com/ultralytics/assets/releases/download/v0.0.0";

static FONT: OnceLock<Option<FontVec>> = OnceLock::new();

/// The label font, resolved once per process.
///
/// Looks at [`FONT_ENV`] first, then the per-user config directory (downloading
/// [`DEFAULT_FONT`] there if needed). Returns `None` when no usable font is found; text
/// labels are then skipped.
pub fn label_font() -> Option<&'static FontVec> {
    FONT.get_or_init(resolve_font).as_ref()
}

fn resolve_font() -> Option<FontVec> {
    if let Some(path) = std::env::var_os(FONT_ENV) {
        let path = PathBuf::from(path);
        match read_font(&path) {
            Some(font) => return Some(font),
            None => warn!("{FONT_ENV}={} is not a readable TrueType font", path.display()),
        }
    }

    if let Some(font) = downloaded_font() {
        return Some(font);
    }

    warn!("No font available, text labels will not be drawn (set {FONT_ENV} to a .ttf file)");
    None
}

#[cfg(feature = "annotate")]
fn downloaded_font() -> Option<FontVec> {
    check_font(DEFAULT_FONT).and_then(|path| read_font(&path))
}

#[cfg(not(feature = "annotate"))]
fn downloaded_font() -> Option<FontVec> {
    None
}

fn read_font(path: &Path) -> Option<FontVec> {
    let data = fs::read(path).ok()?;
    FontVec::try_from_vec(data).ok()
}

/// Check if font exists locally or download it
#[cfg(feature = "annotate")]
pub fn check_font(font: &str) -> Option<PathBuf> {
    use std::fs::File;
    use std::io;

    let font_name = Path::new(font).file_name()?.to_string_lossy();
    let config_dir = dirs::config_dir()?.join("poseviz");
    let font_path = config_dir.join(font_name.as_ref());

    if font_path.exists() {
        return Some(font_path);
    }

    if let Err(e) = fs::create_dir_all(&config_dir) {
        warn!("Failed to create config directory: {e}");
        return None;
    }

    let url = format!("{ASSETS_URL}/{font_name}");
    verbose!("Downloading {url} to {}", font_path.display());

    match ureq::get(&url).call() {
        Ok(response) => {
            let mut file = match File::create(&font_path) {
                Ok(f) => f,
                Err(e) => {
                    warn!("Failed to create font file: {e}");
                    return None;
                }
            };

            let mut reader = response.into_body().into_reader();
            if let Err(e) = io::copy(&mut reader, &mut file) {
                warn!("Failed to download font: {e}");
                // Remove the partial file so the next run retries.
                let _ = fs::remove_file(&font_path);
                return None;
            }

            Some(font_path)
        }
        Err(e) => {
            warn!("Failed to download font from {url}: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_font_rejects_garbage() {
        let path = std::env::temp_dir().join(format!("poseviz-not-a-font-{}.ttf", std::process::id()));
        fs::write(&path, b"definitely not a font").unwrap();
        assert!(read_font(&path).is_none());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_read_font_missing_file() {
        assert!(read_font(Path::new("/nonexistent/poseviz/font.ttf")).is_none());
    }
}
