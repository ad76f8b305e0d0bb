// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

#![allow(clippy::multiple_crate_versions)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! # poseviz
//!
//! Pose-estimation overlays rendered to image files or a window: keypoints and skeletons of
//! detected individuals, dense vector fields and paired-point fields, drawn over the source
//! image at its native resolution.
//!
//! ## Features
//!
//! - **Scoped surfaces** - [`canvas()`] and [`image_canvas`] hand out an [`Axes`], then save and/or
//!   show the figure only if drawing succeeded
//! - **Keypoints** - [`KeypointPainter`] draws skeletons with dashed/solid confidence styling,
//!   bounding boxes and scores
//! - **Vector fields** - [`fields::quiver`] and [`fields::arrows`] draw colormapped arrow batches
//!   with optional uncertainty circles
//! - **Native resolution** - [`image_canvas`] output matches the image pixel for pixel
//!
//! ## Quick Start (Library)
//!
//! ```no_run
//! use poseviz::{CanvasConfig, KeypointPainter, image_canvas, load_image};
//! use ndarray::Array3;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let image = load_image("person.jpg", 1.0)?;
//!     let keypoints = Array3::<f32>::zeros((1, 17, 3));
//!
//!     let config = CanvasConfig::new()
//!         .with_fig_file("person.pose.png")
//!         .with_show(false);
//!     image_canvas(&image, &config, |ax| {
//!         poseviz::white_screen(ax, 0.5);
//!         KeypointPainter::new().draw(ax, Some(keypoints.view()), Some(&[0.93]))
//!     })?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Draw annotations and save at image resolution
//! poseviz render --image person.jpg --annotations person.json --output person.png
//!
//! # Show in a window with a faded background
//! poseviz render -i person.jpg -a person.json --show --white-screen 0.7
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`canvas`](mod@canvas) | Scoped drawing surfaces ([`CanvasConfig`], [`canvas()`], [`image_canvas`]) |
//! | [`keypoints`] | [`KeypointPainter`], [`Skeleton`] and the COCO person skeleton |
//! | [`fields`] | Vector field rendering ([`QuiverStyle`]) |
//! | [`overlay`] | Translucent overlays |
//! | [`axes`] / [`artist`] | Retained drawing primitives |
//! | [`figure`] | Figure layout, rasterization and output |
//! | [`io`] | Image loading |
//! | [`annotations`] | Keypoint annotation files |
//! | [`error`] | Error types ([`VizError`], [`Result`]) |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `annotate` | Download the label font on first use (default) |
//! | `visualize` | Window display with `minifb` (default) |

// Modules
pub mod annotations;
pub mod artist;
pub mod axes;
pub mod canvas;
pub mod cli;
pub mod color;
pub mod error;
pub mod fields;
pub mod figure;
pub mod font;
pub mod io;
pub mod keypoints;
pub mod logging;
pub mod overlay;
mod render;
#[cfg(feature = "visualize")]
pub mod viewer;

// Re-export main types for convenience
pub use annotations::{Annotation, KeypointSets, load_annotations};
pub use artist::{Artist, ArtistId};
pub use axes::Axes;
pub use canvas::{CanvasConfig, canvas, image_canvas};
pub use color::{Color, Colormap, Normalize};
pub use error::{Result, VizError};
pub use fields::QuiverStyle;
pub use figure::Figure;
pub use io::load_image;
pub use keypoints::{COCO_PERSON_SKELETON, KeypointPainter, Skeleton};
pub use overlay::white_screen;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(VERSION.contains('.'));
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "poseviz");
    }
}
