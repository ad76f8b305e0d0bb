// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Rasterization of artists onto an RGBA axes layer.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{
    Blend, draw_filled_circle_mut, draw_filled_ellipse_mut, draw_filled_rect_mut,
    draw_hollow_ellipse_mut, draw_line_segment_mut, draw_polygon_mut, draw_text_mut,
};
use imageproc::point::Point;
use imageproc::rect::Rect;

use crate::artist::{
    Artist, CapStyle, Coords, Line, LineStyle, Markers, Patch, Picture, Quiver, Shape, Text,
};
use crate::color::Color;

/// Dash on/off lengths, in multiples of the line width.
const DASH_PATTERN: (f32, f32) = (3.7, 1.6);
/// Arrow head length (tip to barbs), in multiples of the shaft width.
const HEAD_LENGTH: f32 = 5.0;
/// Arrow head length along the shaft axis, in multiples of the shaft width.
const HEAD_AXIS_LENGTH: f32 = 4.5;
/// Arrow head width, in multiples of the shaft width.
const HEAD_WIDTH: f32 = 3.0;

/// Maps data and axes-fraction coordinates to layer pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Transform {
    x0: f32,
    x1: f32,
    y0: f32,
    y1: f32,
    width: f32,
    height: f32,
}

impl Transform {
    pub(crate) const fn new(xlim: (f32, f32), ylim: (f32, f32), width: f32, height: f32) -> Self {
        Self {
            x0: xlim.0,
            x1: xlim.1,
            y0: ylim.0,
            y1: ylim.1,
            width,
            height,
        }
    }

    /// Pixels per data unit along x and y (signed).
    pub(crate) fn scale(&self) -> (f32, f32) {
        (
            self.width / nonzero(self.x1 - self.x0),
            -self.height / nonzero(self.y1 - self.y0),
        )
    }

    pub(crate) fn data(&self, x: f32, y: f32) -> (f32, f32) {
        let fx = (x - self.x0) / nonzero(self.x1 - self.x0);
        let fy = (y - self.y0) / nonzero(self.y1 - self.y0);
        self.axes(fx, fy)
    }

    pub(crate) fn axes(&self, fx: f32, fy: f32) -> (f32, f32) {
        (fx * self.width, self.height - fy * self.height)
    }

    /// Inverse of [`Transform::data`] for a pixel center.
    pub(crate) fn pixel_to_data(&self, px: f32, py: f32) -> (f32, f32) {
        let fx = px / self.width;
        let fy = 1.0 - py / self.height;
        (
            self.x0 + fx * (self.x1 - self.x0),
            self.y0 + fy * (self.y1 - self.y0),
        )
    }

    fn point(&self, coords: Coords, x: f32, y: f32) -> (f32, f32) {
        match coords {
            Coords::Data => self.data(x, y),
            Coords::Axes => self.axes(x, y),
        }
    }
}

fn nonzero(span: f32) -> f32 {
    if span.abs() <= f32::EPSILON { 1.0 } else { span }
}

/// Draws artists onto one axes layer.
pub(crate) struct Renderer<'a> {
    layer: Blend<RgbaImage>,
    transform: Transform,
    dpi: f32,
    font: Option<&'a FontVec>,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        layer: RgbaImage,
        transform: Transform,
        dpi: f32,
        font: Option<&'a FontVec>,
    ) -> Self {
        Self {
            layer: Blend(layer),
            transform,
            dpi,
            font,
        }
    }

    pub(crate) fn finish(self) -> RgbaImage {
        self.layer.0
    }

    fn px(&self, points: f32) -> f32 {
        points * self.dpi / 72.0
    }

    pub(crate) fn draw(&mut self, artist: &Artist) {
        match artist {
            Artist::Line(line) => self.draw_line(line),
            Artist::Markers(markers) => self.draw_markers(markers),
            Artist::Patch(patch) => self.draw_patch(patch),
            Artist::Text(text) => self.draw_text(text),
            Artist::Quiver(quiver) => self.draw_quiver(quiver),
            Artist::Picture(picture) => self.draw_picture(picture),
        }
    }

    /// Black outline around the layer.
    pub(crate) fn draw_frame(&mut self, linewidth: f32) {
        let (w, h) = self.layer.0.dimensions();
        #[allow(clippy::cast_precision_loss)]
        let (w, h) = (w as f32, h as f32);
        let width = self.px(linewidth);
        let half = width / 2.0;
        let color = Color::BLACK.to_rgba(1.0);
        let corners = [
            (half, half),
            (w - half, half),
            (w - half, h - half),
            (half, h - half),
            (half, half),
        ];
        for pair in corners.windows(2) {
            self.stroke_segment(pair[0], pair[1], width, color, CapStyle::Round);
        }
    }

    fn draw_line(&mut self, line: &Line) {
        let points: Vec<(f32, f32)> = line
            .xs
            .iter()
            .zip(&line.ys)
            .map(|(&x, &y)| self.transform.data(x, y))
            .collect();
        let width = self.px(line.linewidth);
        let color = line.color.to_rgba(1.0);

        match line.style {
            LineStyle::Solid => {
                for pair in points.windows(2) {
                    self.stroke_segment(pair[0], pair[1], width, color, line.cap);
                }
            }
            LineStyle::Dashed => self.stroke_dashed(&points, width, color, line.cap),
        }
    }

    fn stroke_dashed(&mut self, points: &[(f32, f32)], width: f32, color: Rgba<u8>, cap: CapStyle) {
        let on = DASH_PATTERN.0 * width.max(1.0);
        let off = DASH_PATTERN.1 * width.max(1.0);
        // Distance already covered inside the current on/off period.
        let mut phase = 0.0_f32;

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let length = distance(a, b);
            if !length.is_finite() || length <= f32::EPSILON {
                continue;
            }
            let mut travelled = 0.0_f32;
            while travelled < length {
                let (remaining_in_state, drawing) = if phase < on {
                    (on - phase, true)
                } else {
                    (on + off - phase, false)
                };
                let step = remaining_in_state.min(length - travelled);
                if drawing {
                    let start = lerp(a, b, travelled / length);
                    let end = lerp(a, b, (travelled + step) / length);
                    self.stroke_segment(start, end, width, color, cap);
                }
                travelled += step;
                phase = (phase + step) % (on + off);
            }
        }
    }

    fn draw_markers(&mut self, markers: &Markers) {
        let radius = self.px(markers.size) / 2.0;
        let edge_width = self.px(markers.edge_width);
        let outer = radius + edge_width / 2.0;
        let inner = radius - edge_width / 2.0;
        let face = markers.face.to_rgba(1.0);
        let edge = markers.edge.to_rgba(1.0);

        for (&x, &y) in markers.xs.iter().zip(&markers.ys) {
            let center = self.transform.data(x, y);
            self.fill_circle(center, outer, edge);
            if inner >= 0.5 {
                self.fill_circle(center, inner, face);
            }
        }
    }

    fn draw_patch(&mut self, patch: &Patch) {
        match patch.shape {
            Shape::Rectangle {
                x,
                y,
                width,
                height,
            } => {
                let a = self.transform.point(patch.coords, x, y);
                let b = self.transform.point(patch.coords, x + width, y + height);
                if let Some(face) = patch.face {
                    self.fill_rect(a, b, face.to_rgba(patch.alpha));
                }
                if let Some(edge) = patch.edge {
                    let color = edge.to_rgba(patch.alpha);
                    let lw = self.px(patch.linewidth);
                    let corners = [a, (b.0, a.1), b, (a.0, b.1), a];
                    for pair in corners.windows(2) {
                        self.stroke_segment(pair[0], pair[1], lw, color, CapStyle::Round);
                    }
                }
            }
            Shape::Circle { x, y, radius } => {
                let center = self.transform.point(patch.coords, x, y);
                let (rx, ry) = match patch.coords {
                    Coords::Data => {
                        let (sx, sy) = self.transform.scale();
                        (radius * sx.abs(), radius * sy.abs())
                    }
                    Coords::Axes => (
                        radius * self.transform.width,
                        radius * self.transform.height,
                    ),
                };
                if let Some(face) = patch.face {
                    self.fill_ellipse(center, rx, ry, face.to_rgba(patch.alpha));
                }
                if let Some(edge) = patch.edge {
                    self.stroke_ellipse(center, rx, ry, self.px(patch.linewidth), edge.to_rgba(patch.alpha));
                }
            }
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_text(&mut self, text: &Text) {
        let Some(font) = self.font else {
            return;
        };
        let (x, y) = self.transform.data(text.x, text.y);
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let scale = PxScale::from(self.px(text.size).max(1.0));
        let ascent = font.as_scaled(scale).ascent();
        draw_text_mut(
            &mut self.layer,
            text.color.to_rgba(1.0),
            x.round() as i32,
            (y - ascent).round() as i32,
            scale,
            font,
            &text.content,
        );
    }

    fn draw_quiver(&mut self, quiver: &Quiver) {
        let shaft = (quiver.width * self.transform.width).max(1.0);

        for arrow in &quiver.arrows {
            let color = quiver.color_of(arrow).to_rgba(1.0);
            let tail = self.transform.data(arrow.x, arrow.y);
            let tip = self.transform.data(arrow.x + arrow.u, arrow.y + arrow.v);
            let length = distance(tail, tip);
            if !length.is_finite() {
                continue;
            }
            if length < shaft {
                self.fill_circle(tail, shaft / 2.0, color);
                continue;
            }

            let dir = ((tip.0 - tail.0) / length, (tip.1 - tail.1) / length);
            let normal = (-dir.1, dir.0);
            // Shrink the head for arrows shorter than it.
            let shrink = (length / (HEAD_LENGTH * shaft)).min(1.0);
            let head_length = HEAD_LENGTH * shaft * shrink;
            let head_axis = HEAD_AXIS_LENGTH * shaft * shrink;
            let head_half = HEAD_WIDTH * shaft * shrink / 2.0;
            let shaft_half = (shaft / 2.0).min(head_half);

            let at = |along: f32, across: f32| {
                (
                    tip.0 - dir.0 * along + normal.0 * across,
                    tip.1 - dir.1 * along + normal.1 * across,
                )
            };
            let polygon = [
                at(length, shaft_half),
                at(head_axis, shaft_half),
                at(head_length, head_half),
                tip,
                at(head_length, -head_half),
                at(head_axis, -shaft_half),
                at(length, -shaft_half),
            ];
            self.fill_polygon(&polygon, color);
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn draw_picture(&mut self, picture: &Picture) {
        let shape = picture.data.shape();
        let (rows, cols) = (shape[0], shape[1]);
        if rows == 0 || cols == 0 {
            return;
        }
        let [left, right, bottom, top] = picture.extent;
        let (w, h) = self.layer.0.dimensions();

        for py in 0..h {
            for px in 0..w {
                let (x, y) = self
                    .transform
                    .pixel_to_data(px as f32 + 0.5, py as f32 + 0.5);
                let col = ((x - left) / (right - left) * cols as f32).floor();
                let row = ((y - top) / (bottom - top) * rows as f32).floor();
                if col < 0.0 || row < 0.0 || col >= cols as f32 || row >= rows as f32 {
                    continue;
                }
                let (row, col) = (row as usize, col as usize);
                let channel =
                    |c: usize| (picture.data[[row, col, c]].clamp(0.0, 1.0) * 255.0).round() as u8;
                self.layer
                    .0
                    .put_pixel(px, py, Rgba([channel(0), channel(1), channel(2), 255]));
            }
        }
    }

    /// Thick segment as a quad, with optional round caps.
    #[allow(clippy::cast_possible_truncation)]
    fn stroke_segment(
        &mut self,
        a: (f32, f32),
        b: (f32, f32),
        width: f32,
        color: Rgba<u8>,
        cap: CapStyle,
    ) {
        let Some((a, b)) = self.clip(a, b, width) else {
            return;
        };
        if width <= 1.5 {
            draw_line_segment_mut(&mut self.layer, a, b, color);
            return;
        }

        let length = distance(a, b);
        if length > f32::EPSILON {
            let half = width / 2.0;
            let n = (-(b.1 - a.1) / length * half, (b.0 - a.0) / length * half);
            let quad = [
                (a.0 + n.0, a.1 + n.1),
                (b.0 + n.0, b.1 + n.1),
                (b.0 - n.0, b.1 - n.1),
                (a.0 - n.0, a.1 - n.1),
            ];
            self.fill_polygon(&quad, color);
        }
        if cap == CapStyle::Round {
            self.fill_circle(a, width / 2.0, color);
            self.fill_circle(b, width / 2.0, color);
        }
    }

    /// Clip a segment to the layer (grown by `pad`), Liang-Barsky style.
    ///
    /// Computed in `f64` so that far-away endpoints keep sub-pixel precision.
    #[allow(clippy::cast_possible_truncation)]
    fn clip(&self, a: (f32, f32), b: (f32, f32), pad: f32) -> Option<((f32, f32), (f32, f32))> {
        if !(a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite()) {
            return None;
        }
        let (w, h) = self.layer.0.dimensions();
        let pad = f64::from(pad);
        let (ax, ay) = (f64::from(a.0), f64::from(a.1));
        let (dx, dy) = (f64::from(b.0) - ax, f64::from(b.1) - ay);
        let (xmin, ymin) = (-pad, -pad);
        let (xmax, ymax) = (f64::from(w) + pad, f64::from(h) + pad);
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        for (p, q) in [
            (-dx, ax - xmin),
            (dx, xmax - ax),
            (-dy, ay - ymin),
            (dy, ymax - ay),
        ] {
            if p.abs() <= f64::EPSILON {
                if q < 0.0 {
                    return None;
                }
            } else {
                let r = q / p;
                if p < 0.0 {
                    t0 = t0.max(r);
                } else {
                    t1 = t1.min(r);
                }
            }
        }
        let at = |t: f64| ((ax + dx * t) as f32, (ay + dy * t) as f32);
        (t0 <= t1).then(|| (at(t0), at(t1)))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn fill_circle(&mut self, center: (f32, f32), radius: f32, color: Rgba<u8>) {
        if !self.visible(center, radius) {
            return;
        }
        draw_filled_circle_mut(
            &mut self.layer,
            (center.0.round() as i32, center.1.round() as i32),
            radius.round().max(0.0) as i32,
            color,
        );
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fill_ellipse(&mut self, center: (f32, f32), rx: f32, ry: f32, color: Rgba<u8>) {
        if !self.visible(center, rx.max(ry)) {
            return;
        }
        draw_filled_ellipse_mut(
            &mut self.layer,
            (center.0.round() as i32, center.1.round() as i32),
            rx.round().max(1.0) as i32,
            ry.round().max(1.0) as i32,
            color,
        );
    }

    #[allow(clippy::cast_possible_truncation)]
    fn stroke_ellipse(&mut self, center: (f32, f32), rx: f32, ry: f32, width: f32, color: Rgba<u8>) {
        if !self.visible(center, rx.max(ry) + width) {
            return;
        }
        let rings = width.round().max(1.0) as i32;
        for ring in 0..rings {
            #[allow(clippy::cast_precision_loss)]
            let offset = ring as f32 - (rings - 1) as f32 / 2.0;
            draw_hollow_ellipse_mut(
                &mut self.layer,
                (center.0.round() as i32, center.1.round() as i32),
                (rx + offset).round().max(1.0) as i32,
                (ry + offset).round().max(1.0) as i32,
                color,
            );
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn fill_rect(&mut self, a: (f32, f32), b: (f32, f32), color: Rgba<u8>) {
        let (w, h) = self.layer.0.dimensions();
        let x0 = a.0.min(b.0).round().clamp(0.0, w as f32);
        let x1 = a.0.max(b.0).round().clamp(0.0, w as f32);
        let y0 = a.1.min(b.1).round().clamp(0.0, h as f32);
        let y1 = a.1.max(b.1).round().clamp(0.0, h as f32);
        if x1 - x0 < 1.0 || y1 - y0 < 1.0 {
            return;
        }
        let rect = Rect::at(x0 as i32, y0 as i32).of_size((x1 - x0) as u32, (y1 - y0) as u32);
        draw_filled_rect_mut(&mut self.layer, rect, color);
    }

    #[allow(clippy::cast_possible_truncation)]
    fn fill_polygon(&mut self, points: &[(f32, f32)], color: Rgba<u8>) {
        if points.iter().any(|p| !(p.0.is_finite() && p.1.is_finite())) {
            return;
        }
        let mut poly: Vec<Point<i32>> = Vec::with_capacity(points.len());
        for &(x, y) in points {
            let p = Point::new(x.round() as i32, y.round() as i32);
            if poly.last() != Some(&p) {
                poly.push(p);
            }
        }
        while poly.len() > 1 && poly.first() == poly.last() {
            poly.pop();
        }

        match poly.len() {
            0 => {}
            1 | 2 => {
                #[allow(clippy::cast_precision_loss)]
                let to_f = |p: &Point<i32>| (p.x as f32, p.y as f32);
                let first = to_f(&poly[0]);
                let last = to_f(&poly[poly.len() - 1]);
                draw_line_segment_mut(&mut self.layer, first, last, color);
            }
            _ => draw_polygon_mut(&mut self.layer, &poly, color),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn visible(&self, center: (f32, f32), radius: f32) -> bool {
        let (w, h) = self.layer.0.dimensions();
        let reach = radius.max(0.0);
        center.0.is_finite()
            && center.1.is_finite()
            && reach.is_finite()
            && reach <= 4.0 * (w.max(h) as f32)
            && center.0 + reach >= 0.0
            && center.1 + reach >= 0.0
            && center.0 - reach <= w as f32
            && center.1 - reach <= h as f32
    }
}

fn distance(a: (f32, f32), b: (f32, f32)) -> f32 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

fn lerp(a: (f32, f32), b: (f32, f32), t: f32) -> (f32, f32) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}
