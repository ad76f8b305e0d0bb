// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Vector field rendering: dense per-cell fields and paired-point fields.

use ndarray::{ArrayView2, ArrayView3, Axis};

use crate::artist::{Arrow, ArtistId, Patch, Quiver};
use crate::axes::Axes;
use crate::color::{Color, Colormap, Normalize};
use crate::error::{Result, VizError};

/// Z-order of arrows and uncertainty circles, above keypoints and boxes.
const FIELD_ZORDER: f32 = 10.0;

/// Styling and sampling options for [`quiver`] and [`arrows`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuiverStyle {
    /// Sample every `step`-th row and column.
    pub step: usize,
    /// Cells with intensity below this are skipped.
    pub threshold: f32,
    /// Multiplier applied to positions, vectors and uncertainties.
    pub xy_scale: f32,
    /// Vectors hold absolute target positions instead of offsets.
    pub uv_is_offset: bool,
    /// Colormap for arrow scalars.
    pub cmap: Colormap,
    /// Fixed color limits; `None` autoscales to the drawn scalars.
    pub clim: Option<(f32, f32)>,
    /// Shaft width as a fraction of the axes width.
    pub width: f32,
}

impl Default for QuiverStyle {
    fn default() -> Self {
        Self {
            step: 1,
            threshold: 0.5,
            xy_scale: 1.0,
            uv_is_offset: false,
            cmap: Colormap::Viridis,
            clim: None,
            width: 0.005,
        }
    }
}

impl QuiverStyle {
    /// Create a style with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling stride.
    #[must_use]
    pub const fn with_step(mut self, step: usize) -> Self {
        self.step = step;
        self
    }

    /// Set the intensity threshold.
    #[must_use]
    pub const fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the coordinate multiplier.
    #[must_use]
    pub const fn with_xy_scale(mut self, xy_scale: f32) -> Self {
        self.xy_scale = xy_scale;
        self
    }

    /// Treat vectors as absolute target positions.
    #[must_use]
    pub const fn with_uv_is_offset(mut self, uv_is_offset: bool) -> Self {
        self.uv_is_offset = uv_is_offset;
        self
    }

    /// Set the colormap.
    #[must_use]
    pub const fn with_cmap(mut self, cmap: Colormap) -> Self {
        self.cmap = cmap;
        self
    }

    /// Fix the color limits.
    #[must_use]
    pub const fn with_clim(mut self, vmin: f32, vmax: f32) -> Self {
        self.clim = Some((vmin, vmax));
        self
    }

    /// Set the shaft width as a fraction of the axes width.
    #[must_use]
    pub const fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    fn quiver(&self, arrows: Vec<Arrow>) -> Quiver {
        let norm = self.clim.map_or_else(
            || Normalize::from_data(&arrows.iter().map(|a| a.c).collect::<Vec<_>>()),
            |(vmin, vmax)| Normalize::new(vmin, vmax),
        );
        Quiver {
            arrows,
            cmap: self.cmap,
            norm,
            width: self.width,
            zorder: FIELD_ZORDER,
        }
    }
}

/// Draw a dense vector field as arrows, one per sampled cell.
///
/// `vector_field` has shape (2, rows, columns) with the x and y components; `intensity` and
/// `reg_uncertainty`, when given, have shape (rows, columns). Cells whose intensity is below
/// `style.threshold` are skipped. Arrows are drawn in ascending intensity so strong vectors end
/// up on top. Each cell with a non-zero uncertainty also gets a translucent circle of diameter
/// equal to the uncertainty around the arrow tip.
///
/// # Errors
///
/// Returns an error if the vector field does not have two components, the optional fields do
/// not match its spatial shape, or `style.step` is 0.
#[allow(clippy::cast_precision_loss)]
pub fn quiver(
    ax: &mut Axes,
    vector_field: ArrayView3<'_, f32>,
    intensity: Option<ArrayView2<'_, f32>>,
    reg_uncertainty: Option<ArrayView2<'_, f32>>,
    style: &QuiverStyle,
) -> Result<ArtistId> {
    let (components, rows, cols) = vector_field.dim();
    if components != 2 {
        return Err(VizError::ShapeError(format!(
            "Vector field must have 2 components, got {components}"
        )));
    }
    let dims = [
        ("intensity", intensity.map(|f| f.dim())),
        ("uncertainty", reg_uncertainty.map(|f| f.dim())),
    ];
    for (name, dim) in dims {
        if let Some(dim) = dim.filter(|&dim| dim != (rows, cols)) {
            return Err(VizError::ShapeError(format!(
                "{name} field shape {dim:?} does not match vector field ({rows}, {cols})"
            )));
        }
    }
    if style.step == 0 {
        return Err(VizError::ConfigError("Quiver step must be at least 1".to_string()));
    }

    let s = style.xy_scale;
    let mut arrows = Vec::new();
    let mut radii = Vec::new();
    for j in (0..rows).step_by(style.step) {
        for i in (0..cols).step_by(style.step) {
            let c = intensity.map_or(1.0, |f| f[[j, i]]);
            if intensity.is_some() && c < style.threshold {
                continue;
            }
            arrows.push(Arrow {
                x: i as f32 * s,
                y: j as f32 * s,
                u: vector_field[[0, j, i]] * s,
                v: vector_field[[1, j, i]] * s,
                c,
            });
            radii.push(reg_uncertainty.map(|f| f[[j, i]] * s));
        }
    }

    let order = argsort(&arrows);
    if style.uv_is_offset {
        for arrow in &mut arrows {
            arrow.u -= arrow.x;
            arrow.v -= arrow.y;
        }
    }

    for (arrow, radius) in arrows.iter().zip(&radii) {
        let Some(r) = radius.filter(|&r| r != 0.0) else {
            continue;
        };
        ax.add_patch(
            Patch::circle(arrow.x + arrow.u, arrow.y + arrow.v, r / 2.0)
                .with_face(Color::from_cycle(0))
                .with_linewidth(1.0)
                .with_alpha(0.5)
                .with_zorder(FIELD_ZORDER),
        );
    }

    let sorted = order.into_iter().map(|k| arrows[k]).collect();
    Ok(ax.add_quiver(style.quiver(sorted)))
}

/// Draw arrows between paired points.
///
/// `fourd` has shape (2, ≥3, n): for each of the two endpoints, rows x, y and confidence over
/// `n` pairs. Pairs whose smaller confidence is below `threshold` are dropped; the rest run from
/// endpoint 0 to endpoint 1, scaled by `xy_scale`, and are colored and ordered by that smaller
/// confidence. Only the color and width options of `style` are used.
///
/// # Errors
///
/// Returns an error if `fourd` is not shaped (2, ≥3, n).
pub fn arrows(
    ax: &mut Axes,
    fourd: ArrayView3<'_, f32>,
    xy_scale: f32,
    threshold: f32,
    style: &QuiverStyle,
) -> Result<ArtistId> {
    let (endpoints, fields, _) = fourd.dim();
    if endpoints != 2 || fields < 3 {
        return Err(VizError::ShapeError(format!(
            "Paired field must be shaped (2, >=3, n), got {:?}",
            fourd.shape()
        )));
    }

    let (first, second) = (fourd.index_axis(Axis(0), 0), fourd.index_axis(Axis(0), 1));
    let pairs: Vec<Arrow> = first
        .axis_iter(Axis(1))
        .zip(second.axis_iter(Axis(1)))
        .filter_map(|(p1, p2)| {
            // NaN confidence never passes the threshold
            let c = if p1[2].is_nan() || p2[2].is_nan() {
                f32::NAN
            } else {
                p1[2].min(p2[2])
            };
            (c >= threshold).then(|| {
                let (x1, y1) = (p1[0] * xy_scale, p1[1] * xy_scale);
                let (x2, y2) = (p2[0] * xy_scale, p2[1] * xy_scale);
                Arrow {
                    x: x1,
                    y: y1,
                    u: x2 - x1,
                    v: y2 - y1,
                    c,
                }
            })
        })
        .collect();

    let sorted = argsort(&pairs).into_iter().map(|k| pairs[k]).collect();
    Ok(ax.add_quiver(style.quiver(sorted)))
}

/// Indices that order `arrows` by ascending scalar, ties kept in input order.
fn argsort(arrows: &[Arrow]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..arrows.len()).collect();
    order.sort_by(|&a, &b| arrows[a].c.total_cmp(&arrows[b].c));
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artist::Shape;
    use ndarray::{Array2, Array3, array};

    #[test]
    fn test_style_defaults() {
        let style = QuiverStyle::default();
        assert_eq!(style.step, 1);
        assert!((style.threshold - 0.5).abs() < f32::EPSILON);
        assert!(!style.uv_is_offset);
        assert_eq!(style.cmap, Colormap::Viridis);
        assert!(style.clim.is_none());
    }

    #[test]
    fn test_threshold_and_order() {
        let vf = Array3::<f32>::ones((2, 2, 2));
        let intensity = array![[0.9_f32, 0.2], [0.6, 0.7]];
        let mut ax = Axes::new();
        let id = quiver(&mut ax, vf.view(), Some(intensity.view()), None, &QuiverStyle::new()).unwrap();

        let crate::artist::Artist::Quiver(q) = ax.artist(id).unwrap() else {
            panic!("expected a quiver");
        };
        let cs: Vec<f32> = q.arrows.iter().map(|a| a.c).collect();
        assert_eq!(cs, vec![0.6, 0.7, 0.9]);
        assert!(!q.arrows.iter().any(|a| a.x == 1.0 && a.y == 0.0));
        assert!((q.zorder - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_no_intensity_keeps_all_cells_in_order() {
        let vf = Array3::<f32>::zeros((2, 2, 3));
        let mut ax = Axes::new();
        quiver(&mut ax, vf.view(), None, None, &QuiverStyle::new()).unwrap();
        let q = ax.quivers().next().unwrap();
        let xy: Vec<(f32, f32)> = q.arrows.iter().map(|a| (a.x, a.y)).collect();
        assert_eq!(xy, vec![(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (1.0, 1.0), (2.0, 1.0)]);
        assert!(q.arrows.iter().all(|a| (a.c - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_step_and_scale() {
        let mut vf = Array3::<f32>::zeros((2, 4, 4));
        vf[[0, 2, 2]] = 1.5;
        let style = QuiverStyle::new().with_step(2).with_xy_scale(8.0);
        let mut ax = Axes::new();
        quiver(&mut ax, vf.view(), None, None, &style).unwrap();
        let q = ax.quivers().next().unwrap();
        assert_eq!(q.arrows.len(), 4);
        let last = q.arrows[3];
        assert_eq!((last.x, last.y, last.u), (16.0, 16.0, 12.0));
    }

    #[test]
    fn test_uv_is_offset_subtracts_position() {
        let mut vf = Array3::<f32>::zeros((2, 1, 2));
        vf[[0, 0, 1]] = 3.0;
        vf[[1, 0, 1]] = 4.0;
        let style = QuiverStyle::new().with_uv_is_offset(true);
        let mut ax = Axes::new();
        quiver(&mut ax, vf.view(), None, None, &style).unwrap();
        let arrow = ax.quivers().next().unwrap().arrows[1];
        assert_eq!((arrow.u, arrow.v), (2.0, 4.0));
    }

    #[test]
    fn test_uncertainty_circles_skip_zero() {
        let vf = Array3::<f32>::ones((2, 1, 3));
        let uncertainty = array![[0.0_f32, 2.0, 4.0]];
        let style = QuiverStyle::new().with_xy_scale(2.0);
        let mut ax = Axes::new();
        quiver(&mut ax, vf.view(), None, Some(uncertainty.view()), &style).unwrap();

        let circles: Vec<&Patch> = ax.patches().collect();
        assert_eq!(circles.len(), 2);
        match circles[0].shape {
            Shape::Circle { x, y, radius } => {
                assert_eq!((x, y), (4.0, 2.0));
                assert!((radius - 2.0).abs() < f32::EPSILON);
            }
            Shape::Rectangle { .. } => panic!("expected a circle"),
        }
        assert!((circles[0].alpha - 0.5).abs() < f32::EPSILON);
        assert!((circles[0].zorder - 10.0).abs() < f32::EPSILON);
        assert_eq!(circles[0].face, Some(Color::from_cycle(0)));
        assert!(circles[0].edge.is_none());
    }

    #[test]
    fn test_quiver_shape_errors() {
        let mut ax = Axes::new();
        let vf = Array3::<f32>::zeros((3, 2, 2));
        assert!(matches!(
            quiver(&mut ax, vf.view(), None, None, &QuiverStyle::new()),
            Err(VizError::ShapeError(_))
        ));

        let vf = Array3::<f32>::zeros((2, 2, 2));
        let intensity = Array2::<f32>::zeros((3, 2));
        assert!(matches!(
            quiver(&mut ax, vf.view(), Some(intensity.view()), None, &QuiverStyle::new()),
            Err(VizError::ShapeError(_))
        ));
        assert!(matches!(
            quiver(&mut ax, vf.view(), None, None, &QuiverStyle::new().with_step(0)),
            Err(VizError::ConfigError(_))
        ));
        assert!(ax.is_empty());
    }

    #[test]
    fn test_clim_fixes_normalization() {
        let vf = Array3::<f32>::zeros((2, 1, 1));
        let mut ax = Axes::new();
        quiver(&mut ax, vf.view(), None, None, &QuiverStyle::new().with_clim(0.0, 2.0)).unwrap();
        let q = ax.quivers().next().unwrap();
        assert_eq!(q.norm, Normalize::new(0.0, 2.0));
        assert_eq!(q.color_of(&q.arrows[0]), Colormap::Viridis.sample(0.5));
    }

    #[test]
    fn test_arrows_mask_and_order() {
        // endpoint, (x, y, c), pair
        let fourd = array![
            [[0.0_f32, 1.0, 2.0], [0.0, 1.0, 2.0], [0.9, 0.1, 0.4]],
            [[5.0, 6.0, 7.0], [5.0, 6.0, 7.0], [0.8, 0.9, 0.9]],
        ];
        let mut ax = Axes::new();
        arrows(&mut ax, fourd.view(), 2.0, 0.3, &QuiverStyle::new()).unwrap();
        let q = ax.quivers().next().unwrap();

        assert_eq!(q.arrows.len(), 2);
        assert!((q.arrows[0].c - 0.4).abs() < f32::EPSILON);
        assert!((q.arrows[1].c - 0.8).abs() < f32::EPSILON);
        let first = q.arrows[0];
        assert_eq!((first.x, first.y, first.u, first.v), (4.0, 4.0, 10.0, 10.0));
    }

    #[test]
    fn test_arrows_shape_error() {
        let fourd = Array3::<f32>::zeros((2, 2, 4));
        let mut ax = Axes::new();
        assert!(matches!(
            arrows(&mut ax, fourd.view(), 1.0, 0.0, &QuiverStyle::new()),
            Err(VizError::ShapeError(_))
        ));
    }

    #[test]
    fn test_intensity_at_threshold_is_kept() {
        let vf = Array3::<f32>::ones((2, 1, 2));
        let intensity = array![[0.5_f32, 0.49]];
        let mut ax = Axes::new();
        quiver(&mut ax, vf.view(), Some(intensity.view()), None, &QuiverStyle::new()).unwrap();
        let q = ax.quivers().next().unwrap();
        assert_eq!(q.arrows.len(), 1);
        assert_eq!(q.arrows[0].x, 0.0);
    }

    #[test]
    fn test_uncertainty_shape_mismatch() {
        let vf = Array3::<f32>::zeros((2, 2, 2));
        let intensity = Array2::<f32>::ones((2, 2));
        let uncertainty = Array2::<f32>::zeros((2, 3));
        let mut ax = Axes::new();
        let result = quiver(
            &mut ax,
            vf.view(),
            Some(intensity.view()),
            Some(uncertainty.view()),
            &QuiverStyle::new(),
        );
        assert!(matches!(result, Err(VizError::ShapeError(msg)) if msg.starts_with("uncertainty")));
    }

    #[test]
    fn test_arrows_confidence_at_threshold_is_kept() {
        let fourd = array![
            [[0.0_f32, 0.0], [0.0, 0.0], [0.5, 0.9]],
            [[1.0, 1.0], [1.0, 1.0], [0.7, 0.4999]],
        ];
        let mut ax = Axes::new();
        arrows(&mut ax, fourd.view(), 1.0, 0.5, &QuiverStyle::new()).unwrap();
        let q = ax.quivers().next().unwrap();
        assert_eq!(q.arrows.len(), 1);
        assert!((q.arrows[0].c - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_arrows_nan_confidence_is_dropped() {
        let fourd = array![
            [[0.0_f32, 0.0], [0.0, 0.0], [f32::NAN, 0.8]],
            [[1.0, 1.0], [1.0, 1.0], [0.9, f32::NAN]],
        ];
        let mut ax = Axes::new();
        arrows(&mut ax, fourd.view(), 1.0, 0.5, &QuiverStyle::new()).unwrap();
        assert!(ax.quivers().next().unwrap().arrows.is_empty());
    }
}
