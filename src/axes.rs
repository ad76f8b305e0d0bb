// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! The drawing surface handed to caller code inside a canvas scope.

use ndarray::Array3;

use crate::artist::{Artist, ArtistId, Bounds, Line, Markers, Patch, Picture, Quiver, Text};
use crate::color::{Color, TAB10};
use crate::error::{Result, VizError};

/// Fraction of the data span added on each side when autoscaling.
const AUTOSCALE_MARGIN: f32 = 0.05;

/// A single plotting area: view limits plus the artists recorded on it.
///
/// Artists are kept in insertion order and drawn in ascending z-order (stable, so ties keep
/// insertion order). Limits that are not set explicitly are derived from the artists' data.
#[derive(Debug, Clone, Default)]
pub struct Axes {
    artists: Vec<Artist>,
    xlim: Option<(f32, f32)>,
    ylim: Option<(f32, f32)>,
    axis_off: bool,
    position: Option<[f32; 4]>,
    cycle: usize,
}

impl Axes {
    /// Create an empty axes with decorations and autoscaled limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an artist and return its id.
    pub fn add_artist(&mut self, artist: Artist) -> ArtistId {
        self.artists.push(artist);
        ArtistId(self.artists.len() - 1)
    }

    /// Record a polyline.
    pub fn add_line(&mut self, line: Line) -> ArtistId {
        self.add_artist(Artist::Line(line))
    }

    /// Record a set of circle markers.
    pub fn add_markers(&mut self, markers: Markers) -> ArtistId {
        self.add_artist(Artist::Markers(markers))
    }

    /// Record a rectangle or circle.
    pub fn add_patch(&mut self, patch: Patch) -> ArtistId {
        self.add_artist(Artist::Patch(patch))
    }

    /// Record a text label.
    pub fn add_text(&mut self, text: Text) -> ArtistId {
        self.add_artist(Artist::Text(text))
    }

    /// Record an arrow batch.
    pub fn add_quiver(&mut self, quiver: Quiver) -> ArtistId {
        self.add_artist(Artist::Quiver(quiver))
    }

    /// Show an RGB image with one data unit per pixel, pixel centers on integer coordinates.
    ///
    /// Unset limits are fixed to the image extent with the y axis pointing down.
    ///
    /// # Errors
    ///
    /// Returns an error if `image` is not shaped (height, width, 3).
    #[allow(clippy::cast_precision_loss)]
    pub fn imshow(&mut self, image: Array3<f32>) -> Result<ArtistId> {
        let shape = image.shape();
        if shape[2] != 3 {
            return Err(VizError::ShapeError(format!(
                "Expected an (height, width, 3) image, got {shape:?}"
            )));
        }
        let (height, width) = (shape[0] as f32, shape[1] as f32);
        let extent = [-0.5, width - 0.5, height - 0.5, -0.5];

        if self.xlim.is_none() {
            self.xlim = Some((extent[0], extent[1]));
        }
        if self.ylim.is_none() {
            self.ylim = Some((extent[2], extent[3]));
        }

        Ok(self.add_artist(Artist::Picture(Picture {
            data: image,
            extent,
            zorder: 0.0,
        })))
    }

    /// Next color of the default property cycle.
    pub fn next_color(&mut self) -> Color {
        let color = Color::from_cycle(self.cycle);
        self.cycle = (self.cycle + 1) % TAB10.len();
        color
    }

    /// Fix the x view limits. `left > right` flips the axis.
    pub fn set_xlim(&mut self, left: f32, right: f32) {
        self.xlim = Some((left, right));
    }

    /// Fix the y view limits. `bottom > top` flips the axis.
    pub fn set_ylim(&mut self, bottom: f32, top: f32) {
        self.ylim = Some((bottom, top));
    }

    /// Current x view limits, autoscaled when not fixed.
    pub fn xlim(&self) -> (f32, f32) {
        self.xlim
            .unwrap_or_else(|| self.autoscale().map_or((0.0, 1.0), |[x0, x1, _, _]| expand(x0, x1)))
    }

    /// Current y view limits, autoscaled when not fixed.
    pub fn ylim(&self) -> (f32, f32) {
        self.ylim
            .unwrap_or_else(|| self.autoscale().map_or((0.0, 1.0), |[_, _, y0, y1]| expand(y0, y1)))
    }

    /// Hide the axes frame and background.
    pub fn set_axis_off(&mut self) {
        self.axis_off = true;
    }

    /// Whether the frame and background are drawn.
    pub fn axis_on(&self) -> bool {
        !self.axis_off
    }

    /// Place the axes at `[left, bottom, width, height]` in figure fractions.
    ///
    /// Axes without an explicit position are laid out as a subplot.
    pub fn set_position(&mut self, rect: [f32; 4]) {
        self.position = Some(rect);
    }

    /// Explicit position in figure fractions, if any.
    pub fn position(&self) -> Option<[f32; 4]> {
        self.position
    }

    /// All recorded artists in insertion order.
    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    /// Look up one artist.
    pub fn artist(&self, id: ArtistId) -> Option<&Artist> {
        self.artists.get(id.0)
    }

    /// Number of recorded artists.
    pub fn len(&self) -> usize {
        self.artists.len()
    }

    /// Whether nothing has been drawn.
    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    /// Recorded lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Line(line) => Some(line),
            _ => None,
        })
    }

    /// Recorded marker sets in insertion order.
    pub fn markers(&self) -> impl Iterator<Item = &Markers> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Markers(markers) => Some(markers),
            _ => None,
        })
    }

    /// Recorded patches in insertion order.
    pub fn patches(&self) -> impl Iterator<Item = &Patch> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Patch(patch) => Some(patch),
            _ => None,
        })
    }

    /// Recorded text labels in insertion order.
    pub fn texts(&self) -> impl Iterator<Item = &Text> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Text(text) => Some(text),
            _ => None,
        })
    }

    /// Recorded arrow batches in insertion order.
    pub fn quivers(&self) -> impl Iterator<Item = &Quiver> {
        self.artists.iter().filter_map(|a| match a {
            Artist::Quiver(quiver) => Some(quiver),
            _ => None,
        })
    }

    /// Artists sorted by z-order, ties in insertion order.
    pub(crate) fn draw_order(&self) -> Vec<&Artist> {
        let mut ordered: Vec<&Artist> = self.artists.iter().collect();
        ordered.sort_by(|a, b| a.zorder().total_cmp(&b.zorder()));
        ordered
    }

    fn autoscale(&self) -> Option<[f32; 4]> {
        let mut bounds = Bounds::default();
        for bound in self.artists.iter().filter_map(Artist::data_bounds) {
            bounds.merge(bound);
        }
        bounds.finish()
    }
}

/// Pad a data interval by the autoscale margin, widening degenerate intervals first.
fn expand(lo: f32, hi: f32) -> (f32, f32) {
    let (lo, hi) = if (hi - lo).abs() <= f32::EPSILON {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    };
    let pad = (hi - lo) * AUTOSCALE_MARGIN;
    (lo - pad, hi + pad)
}
