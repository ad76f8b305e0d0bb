// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Overlays covering the whole axes.

use crate::artist::{ArtistId, Coords, Patch};
use crate::axes::Axes;
use crate::color::Color;

/// Default opacity of [`white_screen`].
pub const WHITE_SCREEN_ALPHA: f32 = 0.9;

/// Fade everything drawn so far behind a translucent white layer.
///
/// The layer spans the full axes regardless of the data limits and sits at patch z-order, so
/// lines, markers and text drawn afterwards stay crisp on top of it.
pub fn white_screen(ax: &mut Axes, alpha: f32) -> ArtistId {
    ax.add_patch(
        Patch::rectangle(0.0, 0.0, 1.0, 1.0)
            .with_coords(Coords::Axes)
            .with_face(Color::WHITE)
            .with_alpha(alpha),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artist::{Artist, Shape};

    #[test]
    fn test_white_screen_patch() {
        let mut ax = Axes::new();
        let id = white_screen(&mut ax, WHITE_SCREEN_ALPHA);
        let Some(Artist::Patch(patch)) = ax.artist(id) else {
            panic!("expected a patch");
        };
        assert_eq!(patch.coords, Coords::Axes);
        assert_eq!(patch.face, Some(Color::WHITE));
        assert!(patch.edge.is_none());
        assert!((patch.alpha - 0.9).abs() < f32::EPSILON);
        assert_eq!(
            patch.shape,
            Shape::Rectangle {
                x: 0.0,
                y: 0.0,
                width: 1.0,
                height: 1.0
            }
        );
    }

    #[test]
    fn test_white_screen_does_not_affect_limits() {
        let mut ax = Axes::new();
        white_screen(&mut ax, 0.5);
        assert_eq!(ax.xlim(), (0.0, 1.0));
    }
}
