// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Keypoint and skeleton rendering.

use ndarray::{ArrayView2, ArrayView3, Axis};

use crate::artist::{CapStyle, Line, LineStyle, Markers, Patch, Text};
use crate::axes::Axes;
use crate::color::{Color, Colormap};
use crate::error::{Result, VizError};

/// COCO person skeleton as 1-based keypoint index pairs.
pub const COCO_PERSON_SKELETON: [[usize; 2]; 19] = [
    [16, 14], // right ankle to right knee
    [14, 12], // right knee to right hip
    [17, 15], // left ankle to left knee
    [15, 13], // left knee to left hip
    [12, 13], // right hip to left hip
    [6, 12],  // right shoulder to right hip
    [7, 13],  // left shoulder to left hip
    [6, 7],   // right shoulder to left shoulder
    [6, 8],   // right shoulder to right elbow
    [7, 9],   // left shoulder to left elbow
    [8, 10],  // right elbow to right wrist
    [9, 11],  // left elbow to left wrist
    [2, 3],   // eye to eye
    [1, 2],   // nose to eye
    [1, 3],   // nose to eye
    [2, 4],   // eye to ear
    [3, 5],   // eye to ear
    [4, 6],   // ear to shoulder
    [5, 7],   // ear to shoulder
];

/// Boxes narrower (or shorter) than this are padded.
pub const MIN_BOX_SPAN: f32 = 5.0;

/// Padding added on each side of a too-small box dimension.
pub const BOX_PADDING: f32 = 2.0;

/// Marker outline width in points.
const MARKER_EDGE_WIDTH: f32 = 2.0;

/// Score label font size in points.
const SCORE_FONT_SIZE: f32 = 8.0;

/// Connectivity between keypoints, stored as 0-based index pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skeleton {
    edges: Vec<[usize; 2]>,
}

impl Skeleton {
    /// Build a skeleton from 1-based index pairs.
    ///
    /// # Errors
    ///
    /// Returns an error if any index is 0.
    pub fn from_one_based(pairs: &[[usize; 2]]) -> Result<Self> {
        let edges = pairs
            .iter()
            .map(|&[a, b]| match (a.checked_sub(1), b.checked_sub(1)) {
                (Some(a), Some(b)) => Ok([a, b]),
                _ => Err(VizError::IndexError(format!(
                    "Skeleton indices are 1-based, got [{a}, {b}]"
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { edges })
    }

    /// The COCO person skeleton.
    pub fn coco_person() -> Self {
        Self {
            edges: COCO_PERSON_SKELETON
                .iter()
                .map(|&[a, b]| [a - 1, b - 1])
                .collect(),
        }
    }

    /// 0-based edges.
    pub fn edges(&self) -> &[[usize; 2]] {
        &self.edges
    }

    /// Number of edges.
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Whether the skeleton has no edges.
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Largest keypoint index referenced.
    fn max_index(&self) -> Option<usize> {
        self.edges.iter().flatten().copied().max()
    }
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::coco_person()
    }
}

/// Axis-aligned box `[x1, y1, x2, y2]` around the keypoints with visibility > 0.
///
/// Any dimension spanning less than [`MIN_BOX_SPAN`] is grown by [`BOX_PADDING`] on both sides
/// so degenerate boxes stay visible. Returns `None` when no keypoint is visible.
pub fn keypoint_box(x: &[f32], y: &[f32], v: &[f32]) -> Option<[f32; 4]> {
    let mut visible = x
        .iter()
        .zip(y)
        .zip(v)
        .filter(|&(_, &v)| v > 0.0)
        .map(|((&x, &y), _)| (x, y));

    let (x0, y0) = visible.next()?;
    let [mut x1, mut y1, mut x2, mut y2] = visible.fold([x0, y0, x0, y0], |[x1, y1, x2, y2], (x, y)| {
        [x1.min(x), y1.min(y), x2.max(x), y2.max(y)]
    });

    if x2 - x1 < MIN_BOX_SPAN {
        x1 -= BOX_PADDING;
        x2 += BOX_PADDING;
    }
    if y2 - y1 < MIN_BOX_SPAN {
        y1 -= BOX_PADDING;
        y2 += BOX_PADDING;
    }
    Some([x1, y1, x2, y2])
}

/// Draws keypoints, skeleton connections and bounding boxes of individuals.
///
/// Keypoints are `(x, y, v)` triples where `v = 0` means absent, `v = 1` predicted and `v > 1`
/// confidently visible. Connections between two present keypoints are dashed; connections
/// between two confident keypoints get a solid stroke on top.
///
/// # Example
///
/// ```rust
/// use poseviz::{Axes, KeypointPainter};
/// use ndarray::array;
///
/// let keypoints = array![[[10.0_f32, 10.0, 2.0], [20.0, 30.0, 2.0], [0.0, 0.0, 0.0]]];
/// let painter = KeypointPainter::new()
///     .with_skeleton(Some(poseviz::Skeleton::from_one_based(&[[1, 2], [2, 3]]).unwrap()))
///     .with_xy_scale(2.0);
///
/// let mut ax = Axes::new();
/// painter.draw(&mut ax, Some(keypoints.view()), Some(&[0.87])).unwrap();
/// assert_eq!(ax.lines().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeypointPainter {
    /// Connections to draw; `None` draws keypoints only.
    pub skeleton: Option<Skeleton>,
    /// Fixed color; `None` takes the next color of the axes color cycle per individual.
    pub color: Option<Color>,
    /// Multiplier applied to keypoint coordinates.
    pub xy_scale: f32,
    /// Keypoint indices drawn with double-size markers.
    pub highlight: Option<Vec<usize>>,
    /// Whether to draw a bounding box (and score) per individual.
    pub show_box: bool,
    /// Outline predicted-only keypoints in black.
    pub highlight_invisible: bool,
    /// Connection width in points.
    pub linewidth: f32,
    /// Marker diameter in points.
    pub markersize: f32,
    /// Color each connection from the tab20 palette by its index.
    pub color_connections: bool,
}

impl Default for KeypointPainter {
    fn default() -> Self {
        Self {
            skeleton: Some(Skeleton::coco_person()),
            color: None,
            xy_scale: 1.0,
            highlight: None,
            show_box: true,
            highlight_invisible: false,
            linewidth: 2.0,
            markersize: 3.0,
            color_connections: false,
        }
    }
}

impl KeypointPainter {
    /// Create a painter with the COCO person skeleton and default styling.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the skeleton; `None` disables connections.
    #[must_use]
    pub fn with_skeleton(mut self, skeleton: Option<Skeleton>) -> Self {
        self.skeleton = skeleton;
        self
    }

    /// Use a fixed color for every individual.
    #[must_use]
    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Set the coordinate multiplier.
    #[must_use]
    pub const fn with_xy_scale(mut self, xy_scale: f32) -> Self {
        self.xy_scale = xy_scale;
        self
    }

    /// Enlarge the markers of these keypoint indices.
    #[must_use]
    pub fn with_highlight(mut self, highlight: Vec<usize>) -> Self {
        self.highlight = Some(highlight);
        self
    }

    /// Enable or disable bounding boxes.
    #[must_use]
    pub const fn with_show_box(mut self, show_box: bool) -> Self {
        self.show_box = show_box;
        self
    }

    /// Enable or disable black outlines on predicted-only keypoints.
    #[must_use]
    pub const fn with_highlight_invisible(mut self, highlight_invisible: bool) -> Self {
        self.highlight_invisible = highlight_invisible;
        self
    }

    /// Set the connection width in points.
    #[must_use]
    pub const fn with_linewidth(mut self, linewidth: f32) -> Self {
        self.linewidth = linewidth;
        self
    }

    /// Set the marker diameter in points.
    #[must_use]
    pub const fn with_markersize(mut self, markersize: f32) -> Self {
        self.markersize = markersize;
        self
    }

    /// Enable or disable per-connection palette colors.
    #[must_use]
    pub const fn with_color_connections(mut self, color_connections: bool) -> Self {
        self.color_connections = color_connections;
        self
    }

    /// Draw every individual of `keypoint_sets` (shape: individuals × keypoints × 3).
    ///
    /// Individuals without any keypoint of visibility > 0 are skipped before any of their
    /// indices are looked at. When `scores` is given and boxes are shown, each box is labelled
    /// with its individual's score.
    ///
    /// # Errors
    ///
    /// Returns an error if the last axis is not 3 long, or, for a drawn individual, a skeleton or
    /// highlight index is out of range or its score is missing.
    pub fn draw(
        &self,
        ax: &mut Axes,
        keypoint_sets: Option<ArrayView3<'_, f32>>,
        scores: Option<&[f32]>,
    ) -> Result<()> {
        let Some(keypoint_sets) = keypoint_sets else {
            return Ok(());
        };
        let fields = keypoint_sets.dim().2;
        if fields != 3 {
            return Err(VizError::ShapeError(format!(
                "Keypoints must be (x, y, visibility) triples, got {fields} values per keypoint"
            )));
        }

        for (i, kps) in keypoint_sets.axis_iter(Axis(0)).enumerate() {
            self.draw_individual(ax, &kps, i, scores)?;
        }
        Ok(())
    }

    /// Check every index an individual with `n_keypoints` keypoints will be read at.
    fn check_indices(&self, n_keypoints: usize) -> Result<()> {
        if let Some(max) = self.skeleton.as_ref().and_then(Skeleton::max_index) {
            if max >= n_keypoints {
                return Err(VizError::IndexError(format!(
                    "Skeleton references keypoint {} but only {n_keypoints} are given",
                    max + 1
                )));
            }
        }
        if let Some(&max) = self.highlight.as_ref().and_then(|h| h.iter().max()) {
            if max >= n_keypoints {
                return Err(VizError::IndexError(format!(
                    "Highlight index {max} out of range for {n_keypoints} keypoints"
                )));
            }
        }
        Ok(())
    }

    #[allow(clippy::cast_precision_loss)]
    fn draw_individual(
        &self,
        ax: &mut Axes,
        kps: &ArrayView2<'_, f32>,
        i: usize,
        scores: Option<&[f32]>,
    ) -> Result<()> {
        let x: Vec<f32> = kps.column(0).iter().map(|&x| x * self.xy_scale).collect();
        let y: Vec<f32> = kps.column(1).iter().map(|&y| y * self.xy_scale).collect();
        let v: Vec<f32> = kps.column(2).to_vec();
        if !v.iter().any(|&v| v > 0.0) {
            return Ok(());
        }
        self.check_indices(v.len())?;
        let score = match scores.filter(|_| self.show_box) {
            Some(scores) => Some(*scores.get(i).ok_or_else(|| {
                VizError::IndexError(format!(
                    "No score for individual {i}, only {} given",
                    scores.len()
                ))
            })?),
            None => None,
        };

        let mut c = self.color;
        if let Some(skeleton) = &self.skeleton {
            for (ci, &[a, b]) in skeleton.edges().iter().enumerate() {
                if self.color_connections {
                    c = Some(Colormap::Tab20.sample(ci as f32 / skeleton.len() as f32));
                }
                if v[a] > 0.0 && v[b] > 0.0 {
                    let color = *c.get_or_insert_with(|| ax.next_color());
                    ax.add_line(self.connection(&x, &y, a, b, color, LineStyle::Dashed));
                }
                if v[a] > 1.0 && v[b] > 1.0 {
                    let color = *c.get_or_insert_with(|| ax.next_color());
                    ax.add_line(self.connection(&x, &y, a, b, color, LineStyle::Solid));
                }
            }
            if self.color_connections {
                c = Some(self.color.unwrap_or(Color::WHITE));
            }
        }
        let c = c.unwrap_or_else(|| ax.next_color());

        let inv_c = if self.highlight_invisible {
            Color::BLACK
        } else {
            c
        };
        let (vx, vy) = select(&x, &y, |i| v[i] > 0.0);
        ax.add_markers(
            Markers::new(vx, vy, c)
                .with_size(self.markersize)
                .with_edge(inv_c, MARKER_EDGE_WIDTH),
        );
        let (cx, cy) = select(&x, &y, |i| v[i] > 1.0);
        if !cx.is_empty() {
            ax.add_markers(
                Markers::new(cx, cy, c)
                    .with_size(self.markersize)
                    .with_edge(c, MARKER_EDGE_WIDTH),
            );
        }

        if let Some(highlight) = &self.highlight {
            let hx: Vec<f32> = highlight.iter().filter(|&&h| v[h] > 0.0).map(|&h| x[h]).collect();
            let hy: Vec<f32> = highlight.iter().filter(|&&h| v[h] > 0.0).map(|&h| y[h]).collect();
            if !hx.is_empty() {
                ax.add_markers(
                    Markers::new(hx, hy, c)
                        .with_size(self.markersize * 2.0)
                        .with_edge(c, MARKER_EDGE_WIDTH),
                );
            }
        }

        if self.show_box {
            if let Some([x1, y1, x2, y2]) = keypoint_box(&x, &y, &v) {
                ax.add_patch(Patch::rectangle(x1, y1, x2 - x1, y2 - y1).with_edge(c));
                if let Some(score) = score {
                    ax.add_text(Text::new(x1, y1, format!("{score:.4}")).with_size(SCORE_FONT_SIZE));
                }
            }
        }
        Ok(())
    }

    fn connection(
        &self,
        x: &[f32],
        y: &[f32],
        a: usize,
        b: usize,
        color: Color,
        style: LineStyle,
    ) -> Line {
        Line::new(vec![x[a], x[b]], vec![y[a], y[b]], color)
            .with_linewidth(self.linewidth)
            .with_style(style)
            .with_cap(CapStyle::Round)
    }
}

fn select(x: &[f32], y: &[f32], keep: impl Fn(usize) -> bool) -> (Vec<f32>, Vec<f32>) {
    (0..x.len()).filter(|&i| keep(i)).map(|i| (x[i], y[i])).unzip()
}
