// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Retained drawing primitives recorded on an [`Axes`](crate::Axes).
//!
//! Artists only describe what to draw, in data (or axes-fraction) coordinates. They are
//! rasterized by [`Figure::render`](crate::Figure::render) once the figure size and dpi are known.
//! Sizes such as line widths, marker sizes and font sizes are expressed in points (1/72 inch).

use ndarray::Array3;

use crate::color::{Color, Colormap, Normalize};

/// Identifier of an artist inside its axes, in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArtistId(pub usize);

/// Coordinate system a patch is positioned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Coords {
    /// Data coordinates, transformed by the axes limits.
    #[default]
    Data,
    /// Axes fractions: `(0, 0)` is the lower-left corner, `(1, 1)` the upper-right.
    Axes,
}

/// Stroke pattern of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineStyle {
    /// Continuous stroke.
    #[default]
    Solid,
    /// Dash pattern of 3.7 on / 1.6 off, scaled by the line width.
    Dashed,
}

/// Shape of line ends (and dash ends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapStyle {
    /// Square end exactly at the endpoint.
    #[default]
    Butt,
    /// Half-disc end centered on the endpoint.
    Round,
}

/// A polyline through `(xs[i], ys[i])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    /// X coordinates.
    pub xs: Vec<f32>,
    /// Y coordinates.
    pub ys: Vec<f32>,
    /// Stroke color.
    pub color: Color,
    /// Stroke width in points.
    pub linewidth: f32,
    /// Stroke pattern.
    pub style: LineStyle,
    /// End cap shape.
    pub cap: CapStyle,
    /// Drawing order; higher is drawn later.
    pub zorder: f32,
}

impl Line {
    /// Create a solid 1.5pt line.
    pub fn new(xs: Vec<f32>, ys: Vec<f32>, color: Color) -> Self {
        Self {
            xs,
            ys,
            color,
            linewidth: 1.5,
            style: LineStyle::Solid,
            cap: CapStyle::Butt,
            zorder: 2.0,
        }
    }

    /// Set the stroke width in points.
    #[must_use]
    pub const fn with_linewidth(mut self, linewidth: f32) -> Self {
        self.linewidth = linewidth;
        self
    }

    /// Set the stroke pattern.
    #[must_use]
    pub const fn with_style(mut self, style: LineStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the end cap shape.
    #[must_use]
    pub const fn with_cap(mut self, cap: CapStyle) -> Self {
        self.cap = cap;
        self
    }
}

/// Circle markers at `(xs[i], ys[i])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Markers {
    /// X coordinates.
    pub xs: Vec<f32>,
    /// Y coordinates.
    pub ys: Vec<f32>,
    /// Marker diameter in points.
    pub size: f32,
    /// Fill color.
    pub face: Color,
    /// Outline color.
    pub edge: Color,
    /// Outline width in points.
    pub edge_width: f32,
    /// Drawing order; higher is drawn later.
    pub zorder: f32,
}

impl Markers {
    /// Create 6pt markers with a 1pt outline of the same color.
    pub fn new(xs: Vec<f32>, ys: Vec<f32>, color: Color) -> Self {
        Self {
            xs,
            ys,
            size: 6.0,
            face: color,
            edge: color,
            edge_width: 1.0,
            zorder: 2.0,
        }
    }

    /// Set the marker diameter in points.
    #[must_use]
    pub const fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }

    /// Set the outline color and width.
    #[must_use]
    pub const fn with_edge(mut self, edge: Color, width: f32) -> Self {
        self.edge = edge;
        self.edge_width = width;
        self
    }

    /// Number of markers.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Whether there are no markers.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Geometry of a [`Patch`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned rectangle anchored at `(x, y)` with signed extents.
    Rectangle {
        /// Anchor x.
        x: f32,
        /// Anchor y.
        y: f32,
        /// Extent along x.
        width: f32,
        /// Extent along y.
        height: f32,
    },
    /// Circle centered at `(x, y)`.
    Circle {
        /// Center x.
        x: f32,
        /// Center y.
        y: f32,
        /// Radius in data units.
        radius: f32,
    },
}

/// A filled and/or outlined shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    /// Geometry.
    pub shape: Shape,
    /// Coordinate system of the geometry.
    pub coords: Coords,
    /// Fill color, `None` for an unfilled outline.
    pub face: Option<Color>,
    /// Outline color, `None` for no outline.
    pub edge: Option<Color>,
    /// Outline width in points.
    pub linewidth: f32,
    /// Opacity of fill and outline (0.0 to 1.0).
    pub alpha: f32,
    /// Drawing order; higher is drawn later.
    pub zorder: f32,
}

impl Patch {
    /// Rectangle in data coordinates, without fill or outline until set.
    pub const fn rectangle(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::new(Shape::Rectangle {
            x,
            y,
            width,
            height,
        })
    }

    /// Circle in data coordinates, without fill or outline until set.
    pub const fn circle(x: f32, y: f32, radius: f32) -> Self {
        Self::new(Shape::Circle { x, y, radius })
    }

    const fn new(shape: Shape) -> Self {
        Self {
            shape,
            coords: Coords::Data,
            face: None,
            edge: None,
            linewidth: 1.0,
            alpha: 1.0,
            zorder: 1.0,
        }
    }

    /// Set the fill color.
    #[must_use]
    pub const fn with_face(mut self, color: Color) -> Self {
        self.face = Some(color);
        self
    }

    /// Set the outline color.
    #[must_use]
    pub const fn with_edge(mut self, color: Color) -> Self {
        self.edge = Some(color);
        self
    }

    /// Set the outline width in points.
    #[must_use]
    pub const fn with_linewidth(mut self, linewidth: f32) -> Self {
        self.linewidth = linewidth;
        self
    }

    /// Set the opacity.
    #[must_use]
    pub const fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the drawing order.
    #[must_use]
    pub const fn with_zorder(mut self, zorder: f32) -> Self {
        self.zorder = zorder;
        self
    }

    /// Set the coordinate system.
    #[must_use]
    pub const fn with_coords(mut self, coords: Coords) -> Self {
        self.coords = coords;
        self
    }
}

/// A single-line text label anchored at its left baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Anchor x in data coordinates.
    pub x: f32,
    /// Anchor y in data coordinates.
    pub y: f32,
    /// Label content.
    pub content: String,
    /// Font size in points.
    pub size: f32,
    /// Text color.
    pub color: Color,
    /// Drawing order; higher is drawn later.
    pub zorder: f32,
}

impl Text {
    /// Create a black 10pt label.
    pub fn new(x: f32, y: f32, content: impl Into<String>) -> Self {
        Self {
            x,
            y,
            content: content.into(),
            size: 10.0,
            color: Color::BLACK,
            zorder: 3.0,
        }
    }

    /// Set the font size in points.
    #[must_use]
    pub const fn with_size(mut self, size: f32) -> Self {
        self.size = size;
        self
    }
}

/// One arrow of a [`Quiver`]: tail at `(x, y)`, tip at `(x + u, y + v)` in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    /// Tail x.
    pub x: f32,
    /// Tail y.
    pub y: f32,
    /// Displacement along x.
    pub u: f32,
    /// Displacement along y.
    pub v: f32,
    /// Scalar mapped through the colormap.
    pub c: f32,
}

/// A batch of arrows drawn in list order, colored by their scalar.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiver {
    /// Arrows in drawing order.
    pub arrows: Vec<Arrow>,
    /// Colormap for the arrow scalars.
    pub cmap: Colormap,
    /// Normalization of the arrow scalars.
    pub norm: Normalize,
    /// Shaft width as a fraction of the axes width.
    pub width: f32,
    /// Drawing order; higher is drawn later.
    pub zorder: f32,
}

impl Quiver {
    /// Color of one arrow under this quiver's colormap.
    pub fn color_of(&self, arrow: &Arrow) -> Color {
        self.cmap.sample(self.norm.apply(arrow.c))
    }
}

/// An RGB image (height, width, 3) with values in `[0, 1]`, stretched over `extent`.
#[derive(Debug, Clone, PartialEq)]
pub struct Picture {
    /// Pixel data.
    pub data: Array3<f32>,
    /// `(left, right, bottom, top)` in data coordinates.
    pub extent: [f32; 4],
    /// Drawing order; higher is drawn later.
    pub zorder: f32,
}

/// Anything that can be recorded on an axes.
#[derive(Debug, Clone, PartialEq)]
pub enum Artist {
    /// Polyline.
    Line(Line),
    /// Circle markers.
    Markers(Markers),
    /// Rectangle or circle.
    Patch(Patch),
    /// Text label.
    Text(Text),
    /// Arrow batch.
    Quiver(Quiver),
    /// Background image.
    Picture(Picture),
}

impl Artist {
    /// Drawing order key.
    pub fn zorder(&self) -> f32 {
        match self {
            Self::Line(line) => line.zorder,
            Self::Markers(markers) => markers.zorder,
            Self::Patch(patch) => patch.zorder,
            Self::Text(text) => text.zorder,
            Self::Quiver(quiver) => quiver.zorder,
            Self::Picture(picture) => picture.zorder,
        }
    }

    /// `(xmin, xmax, ymin, ymax)` of the data-space geometry, used for autoscaling.
    pub fn data_bounds(&self) -> Option<[f32; 4]> {
        let mut bounds = Bounds::default();
        match self {
            Self::Line(Line { xs, ys, .. }) | Self::Markers(Markers { xs, ys, .. }) => {
                for (&x, &y) in xs.iter().zip(ys) {
                    bounds.add(x, y);
                }
            }
            Self::Patch(patch) => {
                if patch.coords == Coords::Axes {
                    return None;
                }
                match patch.shape {
                    Shape::Rectangle {
                        x,
                        y,
                        width,
                        height,
                    } => {
                        bounds.add(x, y);
                        bounds.add(x + width, y + height);
                    }
                    Shape::Circle { x, y, radius } => {
                        bounds.add(x - radius, y - radius);
                        bounds.add(x + radius, y + radius);
                    }
                }
            }
            Self::Text(text) => bounds.add(text.x, text.y),
            Self::Quiver(quiver) => {
                for arrow in &quiver.arrows {
                    bounds.add(arrow.x, arrow.y);
                    bounds.add(arrow.x + arrow.u, arrow.y + arrow.v);
                }
            }
            Self::Picture(picture) => {
                let [left, right, bottom, top] = picture.extent;
                bounds.add(left, bottom);
                bounds.add(right, top);
            }
        }
        bounds.finish()
    }
}

/// Running min/max accumulator over finite points.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Bounds {
    xmin: f32,
    xmax: f32,
    ymin: f32,
    ymax: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            xmin: f32::INFINITY,
            xmax: f32::NEG_INFINITY,
            ymin: f32::INFINITY,
            ymax: f32::NEG_INFINITY,
        }
    }
}

impl Bounds {
    pub(crate) fn add(&mut self, x: f32, y: f32) {
        if x.is_finite() && y.is_finite() {
            self.xmin = self.xmin.min(x);
            self.xmax = self.xmax.max(x);
            self.ymin = self.ymin.min(y);
            self.ymax = self.ymax.max(y);
        }
    }

    pub(crate) fn merge(&mut self, other: [f32; 4]) {
        self.add(other[0], other[2]);
        self.add(other[1], other[3]);
    }

    pub(crate) fn finish(self) -> Option<[f32; 4]> {
        (self.xmin <= self.xmax).then_some([self.xmin, self.xmax, self.ymin, self.ymax])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zorder_defaults() {
        let line = Artist::Line(Line::new(vec![0.0], vec![0.0], Color::RED));
        let patch = Artist::Patch(Patch::rectangle(0.0, 0.0, 1.0, 1.0));
        let text = Artist::Text(Text::new(0.0, 0.0, "x"));
        assert!(patch.zorder() < line.zorder());
        assert!(line.zorder() < text.zorder());
    }

    #[test]
    fn test_axes_patch_has_no_data_bounds() {
        let patch = Patch::rectangle(0.0, 0.0, 1.0, 1.0).with_coords(Coords::Axes);
        assert!(Artist::Patch(patch).data_bounds().is_none());
    }

    #[test]
    fn test_quiver_bounds_include_tips() {
        let quiver = Quiver {
            arrows: vec![Arrow {
                x: 1.0,
                y: 2.0,
                u: 3.0,
                v: -4.0,
                c: 1.0,
            }],
            cmap: Colormap::Viridis,
            norm: Normalize::new(0.0, 1.0),
            width: 0.005,
            zorder: 10.0,
        };
        assert_eq!(
            Artist::Quiver(quiver).data_bounds(),
            Some([1.0, 4.0, -2.0, 2.0])
        );
    }

    #[test]
    fn test_bounds_skip_non_finite() {
        let line = Line::new(vec![f32::NAN, 1.0, 2.0], vec![0.0, 5.0, f32::INFINITY], Color::RED);
        assert_eq!(Artist::Line(line).data_bounds(), Some([1.0, 1.0, 5.0, 5.0]));
    }
}
