// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Scoped drawing surfaces.
//!
//! [`canvas`] and [`image_canvas`] create a [`Figure`], hand its [`Axes`] to caller code and,
//! once that code succeeds, save and/or show the result. The figure is released when the scope
//! ends, whether the caller returned normally, returned an error, or panicked.
//!
//! ```no_run
//! use poseviz::{CanvasConfig, KeypointPainter, canvas::image_canvas, io::load_image};
//! use ndarray::Array3;
//!
//! # fn main() -> poseviz::Result<()> {
//! let image = load_image("person.jpg", 1.0)?;
//! let keypoints = Array3::<f32>::zeros((1, 17, 3));
//! let config = CanvasConfig::new().with_fig_file("person.annotated.png").with_show(false);
//!
//! image_canvas(&image, &config, |ax| {
//!     KeypointPainter::new().draw(ax, Some(keypoints.view()), None)
//! })?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use ndarray::Array3;

use crate::axes::Axes;
use crate::error::{Result, VizError};
use crate::figure::{DEFAULT_FIGSIZE, Figure};
use crate::verbose;

/// Configuration for a canvas scope.
///
/// Uses a builder pattern; defaults save nothing and show the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasConfig {
    /// Where to save the rendered figure, if anywhere.
    pub fig_file: Option<PathBuf>,
    /// Whether to display the figure in a window.
    pub show: bool,
    /// Explicit figure size in inches (width, height).
    /// If `None`, [`canvas`] uses 10x6 and [`image_canvas`] derives it from the image.
    pub figsize: Option<(f32, f32)>,
    /// Save resolution of [`canvas`] figures.
    pub dpi: f32,
    /// Multiplier on the native-resolution dpi of [`image_canvas`] figures.
    pub dpi_factor: f32,
    /// Figure width in inches of [`image_canvas`] figures without an explicit size.
    pub fig_width: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            fig_file: None,
            show: true,
            figsize: None,
            dpi: 200.0,
            dpi_factor: 1.0,
            fig_width: 10.0,
        }
    }
}

impl CanvasConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Save the figure to `path` when the scope succeeds.
    #[must_use]
    pub fn with_fig_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.fig_file = Some(path.into());
        self
    }

    /// Enable or disable on-screen display.
    #[must_use]
    pub const fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Set an explicit figure size in inches.
    #[must_use]
    pub const fn with_figsize(mut self, width: f32, height: f32) -> Self {
        self.figsize = Some((width, height));
        self
    }

    /// Set the save resolution of [`canvas`] figures.
    #[must_use]
    pub const fn with_dpi(mut self, dpi: f32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the dpi multiplier of [`image_canvas`] figures.
    #[must_use]
    pub const fn with_dpi_factor(mut self, dpi_factor: f32) -> Self {
        self.dpi_factor = dpi_factor;
        self
    }

    /// Set the default [`image_canvas`] figure width in inches.
    #[must_use]
    pub const fn with_fig_width(mut self, fig_width: f32) -> Self {
        self.fig_width = fig_width;
        self
    }
}

/// A figure owned for the duration of a canvas scope.
///
/// Dropping the surface releases the figure; [`Surface::finish`] saves and shows it first.
#[must_use = "a `Surface` releases its figure as soon as it is dropped"]
pub struct Surface {
    figure: Figure,
    save_dpi: f32,
}

impl Surface {
    /// Wrap `figure`, to be saved at `save_dpi`.
    pub const fn new(figure: Figure, save_dpi: f32) -> Self {
        Self { figure, save_dpi }
    }

    /// The figure being drawn.
    pub const fn figure(&self) -> &Figure {
        &self.figure
    }

    /// The axes being drawn on.
    pub const fn axes_mut(&mut self) -> &mut Axes {
        self.figure.axes_mut()
    }

    /// Resolution the figure will be saved at.
    pub const fn save_dpi(&self) -> f32 {
        self.save_dpi
    }

    /// Save to `fig_file` and/or show, then release the figure.
    ///
    /// # Errors
    ///
    /// Returns an error if saving or displaying fails; the figure is released either way.
    pub fn finish(self, fig_file: Option<&Path>, show: bool) -> Result<()> {
        if let Some(path) = fig_file {
            self.figure.savefig(path, self.save_dpi)?;
        }
        if show {
            self.figure.show()?;
        }
        Ok(())
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        let (w, h) = self.figure.figsize();
        verbose!(
            "Released {w:.2}x{h:.2} in figure ({} artists)",
            self.figure.axes().len()
        );
    }
}

/// Run `draw` on the axes of a fresh figure, then save and/or show it.
///
/// The figure is `config.figsize` (default 10x6 inches) with one decorated subplot and tight
/// layout, saved at `config.dpi`.
///
/// # Errors
///
/// Returns the error of `draw` (nothing is saved or shown in that case), or an error from
/// creating, saving or showing the figure.
pub fn canvas<T, F>(config: &CanvasConfig, draw: F) -> Result<T>
where
    F: FnOnce(&mut Axes) -> Result<T>,
{
    let figure = Figure::new(config.figsize.unwrap_or(DEFAULT_FIGSIZE))?;
    let mut surface = Surface::new(figure, config.dpi);

    let value = draw(surface.axes_mut())?;

    surface.figure.set_tight_layout(true);
    surface.finish(config.fig_file.as_deref(), config.show)?;
    Ok(value)
}

/// Run `draw` on axes showing `image` edge to edge, then save and/or show it.
///
/// The figure keeps the image aspect ratio (`config.fig_width` wide unless `config.figsize`
/// is set), the axes cover the whole figure without decorations, and the view maps one data
/// unit to one image pixel with y pointing down. The save dpi is chosen so that the output is
/// `config.dpi_factor` times the image resolution.
///
/// # Errors
///
/// Returns an error if `image` is not (height, width, 3) or empty, the error of `draw`, or an
/// error from saving or showing the figure.
#[allow(clippy::cast_precision_loss)]
pub fn image_canvas<T, F>(image: &Array3<f32>, config: &CanvasConfig, draw: F) -> Result<T>
where
    F: FnOnce(&mut Axes) -> Result<T>,
{
    let shape = image.shape();
    if shape[2] != 3 || shape[0] == 0 || shape[1] == 0 {
        return Err(VizError::ShapeError(format!(
            "Expected a non-empty (height, width, 3) image, got {shape:?}"
        )));
    }
    let (height, width) = (shape[0] as f32, shape[1] as f32);
    let figsize = config
        .figsize
        .unwrap_or((config.fig_width, config.fig_width * height / width));

    let mut figure = Figure::new(figsize)?;
    let ax = figure.axes_mut();
    ax.set_position([0.0, 0.0, 1.0, 1.0]);
    ax.set_axis_off();
    ax.set_xlim(0.0, width);
    ax.set_ylim(height, 0.0);
    ax.imshow(image.clone())?;

    let save_dpi = width / figsize.0 * config.dpi_factor;
    let mut surface = Surface::new(figure, save_dpi);

    let value = draw(surface.axes_mut())?;

    surface.figure.set_tight_layout(true);
    surface.finish(config.fig_file.as_deref(), config.show)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artist::{Line, Patch};
    use crate::color::Color;

    fn quiet() -> CanvasConfig {
        CanvasConfig::new().with_show(false)
    }

    #[test]
    fn test_config_defaults() {
        let config = CanvasConfig::default();
        assert!(config.fig_file.is_none());
        assert!(config.show);
        assert!(config.figsize.is_none());
        assert!((config.dpi - 200.0).abs() < f32::EPSILON);
        assert!((config.dpi_factor - 1.0).abs() < f32::EPSILON);
        assert!((config.fig_width - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_config_builder() {
        let config = CanvasConfig::new()
            .with_fig_file("out.png")
            .with_show(false)
            .with_figsize(4.0, 3.0)
            .with_dpi(72.0)
            .with_dpi_factor(2.0)
            .with_fig_width(5.0);
        assert_eq!(config.fig_file, Some(PathBuf::from("out.png")));
        assert!(!config.show);
        assert_eq!(config.figsize, Some((4.0, 3.0)));
        assert!((config.dpi - 72.0).abs() < f32::EPSILON);
        assert!((config.dpi_factor - 2.0).abs() < f32::EPSILON);
        assert!((config.fig_width - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_canvas_returns_closure_value() {
        let count = canvas(&quiet(), |ax| {
            ax.add_line(Line::new(vec![0.0, 1.0], vec![0.0, 1.0], Color::RED));
            Ok(ax.len())
        })
        .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_canvas_propagates_error_without_saving() {
        let path = std::env::temp_dir().join(format!("poseviz-canvas-err-{}.png", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let config = quiet().with_fig_file(&path);
        let result: Result<()> = canvas(&config, |_ax| {
            Err(VizError::ConfigError("stop".to_string()))
        });
        assert!(matches!(result, Err(VizError::ConfigError(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_panic_in_draw_unwinds_without_saving() {
        let path = std::env::temp_dir().join(format!("poseviz-canvas-panic-{}.png", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let config = quiet().with_fig_file(&path);
        let image = Array3::<f32>::zeros((8, 8, 3));

        let plain = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            canvas(&config, |ax| -> Result<()> {
                ax.add_line(Line::new(vec![0.0, 1.0], vec![0.0, 1.0], Color::RED));
                panic!("draw failed");
            })
        }));
        assert!(plain.is_err());
        assert!(!path.exists());

        let framed = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            image_canvas(&image, &config, |_ax| -> Result<()> { panic!("draw failed") })
        }));
        assert!(framed.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_image_canvas_layout() {
        let image = Array3::<f32>::zeros((50, 100, 3));
        let (xlim, ylim, axis_on, position, first_is_picture) =
            image_canvas(&image, &quiet(), |ax| {
                Ok((
                    ax.xlim(),
                    ax.ylim(),
                    ax.axis_on(),
                    ax.position(),
                    matches!(ax.artists()[0], crate::artist::Artist::Picture(_)),
                ))
            })
            .unwrap();
        assert_eq!(xlim, (0.0, 100.0));
        assert_eq!(ylim, (50.0, 0.0));
        assert!(!axis_on);
        assert_eq!(position, Some([0.0, 0.0, 1.0, 1.0]));
        assert!(first_is_picture);
    }

    #[test]
    fn test_image_canvas_saves_at_native_resolution() {
        let path = std::env::temp_dir().join(format!("poseviz-native-{}.png", std::process::id()));
        let image = Array3::<f32>::from_elem((40, 80, 3), 0.5);
        let config = quiet().with_fig_file(&path).with_dpi_factor(0.5);
        image_canvas(&image, &config, |ax| {
            ax.add_patch(Patch::rectangle(10.0, 10.0, 20.0, 10.0).with_edge(Color::RED));
            Ok(())
        })
        .unwrap();

        let saved = image::open(&path).unwrap();
        assert_eq!((saved.width(), saved.height()), (40, 20));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_image_canvas_rejects_bad_shape() {
        let image = Array3::<f32>::zeros((10, 10, 4));
        let result = image_canvas(&image, &quiet(), |_ax| Ok(()));
        assert!(matches!(result, Err(VizError::ShapeError(_))));
    }
}
