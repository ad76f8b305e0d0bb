// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Figures: a page of a given physical size holding one [`Axes`].

use std::path::Path;

use image::{DynamicImage, Rgba, RgbaImage, imageops};

use crate::artist::Artist;
use crate::axes::Axes;
use crate::error::{Result, VizError};
use crate::font::label_font;
use crate::render::{Renderer, Transform};
use crate::{verbose, warn};

/// Default figure size in inches (width, height).
pub const DEFAULT_FIGSIZE: (f32, f32) = (10.0, 6.0);

/// Resolution used for on-screen display.
pub const SCREEN_DPI: f32 = 100.0;

/// Subplot margins as figure fractions: left, right, bottom, top.
const SUBPLOT_MARGINS: [f32; 4] = [0.125, 0.9, 0.11, 0.88];

/// Padding kept around a tight-layout subplot, in inches.
const TIGHT_PAD: f32 = 0.15;

/// Axes frame width in points.
const FRAME_WIDTH: f32 = 0.8;

/// A figure with a single axes.
#[derive(Debug, Clone)]
pub struct Figure {
    figsize: (f32, f32),
    axes: Axes,
    tight_layout: bool,
}

impl Figure {
    /// Create a figure of `figsize` inches with one empty subplot.
    ///
    /// # Errors
    ///
    /// Returns an error if either dimension is not a positive finite number.
    pub fn new(figsize: (f32, f32)) -> Result<Self> {
        let (w, h) = figsize;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(VizError::ConfigError(format!(
                "Figure size must be positive, got {w}x{h} inches"
            )));
        }
        Ok(Self {
            figsize,
            axes: Axes::new(),
            tight_layout: false,
        })
    }

    /// Figure size in inches (width, height).
    pub const fn figsize(&self) -> (f32, f32) {
        self.figsize
    }

    /// The figure's axes.
    pub const fn axes(&self) -> &Axes {
        &self.axes
    }

    /// The figure's axes, for drawing.
    pub const fn axes_mut(&mut self) -> &mut Axes {
        &mut self.axes
    }

    /// Shrink subplot margins to a small fixed padding.
    pub const fn set_tight_layout(&mut self, tight: bool) {
        self.tight_layout = tight;
    }

    /// Whether tight layout is enabled.
    pub const fn tight_layout(&self) -> bool {
        self.tight_layout
    }

    /// Pixel dimensions of the figure at `dpi`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self, dpi: f32) -> (u32, u32) {
        let (w, h) = self.figsize;
        (
            (w * dpi).round().max(1.0) as u32,
            (h * dpi).round().max(1.0) as u32,
        )
    }

    /// `[left, bottom, width, height]` of the axes in figure fractions.
    pub fn axes_position(&self) -> [f32; 4] {
        if let Some(rect) = self.axes.position() {
            return rect;
        }
        if self.tight_layout {
            let (w, h) = self.figsize;
            let pad_x = (TIGHT_PAD / w).min(0.25);
            let pad_y = (TIGHT_PAD / h).min(0.25);
            return [pad_x, pad_y, 1.0 - 2.0 * pad_x, 1.0 - 2.0 * pad_y];
        }
        let [left, right, bottom, top] = SUBPLOT_MARGINS;
        [left, bottom, right - left, top - bottom]
    }

    /// Rasterize the figure at `dpi`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dpi` is not positive or the axes area is empty.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn render(&self, dpi: f32) -> Result<RgbaImage> {
        if !(dpi.is_finite() && dpi > 0.0) {
            return Err(VizError::RenderError(format!("Invalid dpi: {dpi}")));
        }
        let (width, height) = self.pixel_size(dpi);
        let mut canvas = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));

        let [left, bottom, w, h] = self.axes_position();
        let x0 = (left * width as f32).round();
        let x1 = ((left + w) * width as f32).round();
        let y0 = ((1.0 - bottom - h) * height as f32).round();
        let y1 = ((1.0 - bottom) * height as f32).round();
        let (ax_width, ax_height) = (x1 - x0, y1 - y0);
        if ax_width < 1.0 || ax_height < 1.0 {
            return Err(VizError::RenderError(format!(
                "Axes area is empty at {dpi} dpi ({ax_width}x{ax_height} px)"
            )));
        }

        let background = if self.axes.axis_on() {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        };
        let layer = RgbaImage::from_pixel(ax_width as u32, ax_height as u32, background);
        let transform = Transform::new(self.axes.xlim(), self.axes.ylim(), ax_width, ax_height);

        let has_text = self
            .axes
            .artists()
            .iter()
            .any(|a| matches!(a, Artist::Text(_)));
        let font = if has_text { label_font() } else { None };

        let mut renderer = Renderer::new(layer, transform, dpi, font);
        for artist in self.axes.draw_order() {
            renderer.draw(artist);
        }
        if self.axes.axis_on() {
            renderer.draw_frame(FRAME_WIDTH);
        }
        let layer = renderer.finish();

        imageops::overlay(&mut canvas, &layer, i64::from(x0 as i32), i64::from(y0 as i32));
        Ok(canvas)
    }

    /// Render at `dpi` and write to `path`; the format follows the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails, the format is unknown or the file cannot be written.
    pub fn savefig(&self, path: impl AsRef<Path>, dpi: f32) -> Result<()> {
        let path = path.as_ref();
        let image = self.render(dpi)?;
        // Figures are opaque; RGB keeps JPEG and other alpha-less formats working.
        DynamicImage::ImageRgba8(image).to_rgb8().save(path)?;
        verbose!("Saved figure to {} at {dpi:.1} dpi", path.display());
        Ok(())
    }

    /// Display the figure in a window until it is closed.
    ///
    /// A missing display is reported as a warning, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the window stops accepting frames.
    #[cfg(feature = "visualize")]
    pub fn show(&self) -> Result<()> {
        let image = self.render(SCREEN_DPI)?;
        let (w, h) = image.dimensions();
        match crate::viewer::Viewer::new("poseviz", w as usize, h as usize) {
            Ok(mut viewer) => viewer.show_until_closed(&image),
            Err(e) => {
                warn!("Cannot show figure: {e}");
                Ok(())
            }
        }
    }

    /// Display the figure in a window until it is closed.
    ///
    /// Built without the `visualize` feature, this only warns.
    ///
    /// # Errors
    ///
    /// Never fails.
    #[cfg(not(feature = "visualize"))]
    pub fn show(&self) -> Result<()> {
        warn!("Cannot show figure: built without the 'visualize' feature");
        Ok(())
    }
}
