// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Colors, palettes and colormaps.

use std::fmt;
use std::str::FromStr;

use image::Rgba;

/// Color type for visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    /// Red color.
    pub const RED: Color = Color(255, 0, 0);
    /// Green color.
    pub const GREEN: Color = Color(0, 255, 0);
    /// Blue color.
    pub const BLUE: Color = Color(0, 0, 255);
    /// White color.
    pub const WHITE: Color = Color(255, 255, 255);
    /// Black color.
    pub const BLACK: Color = Color(0, 0, 0);

    /// Create a new color from RGB values.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    /// Get a color from the default property cycle by index.
    pub fn from_cycle(index: usize) -> Self {
        let color = TAB10[index % TAB10.len()];
        Self(color[0], color[1], color[2])
    }

    /// Convert to an RGBA pixel with the given opacity (0.0 to 1.0).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn to_rgba(self, alpha: f32) -> Rgba<u8> {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([self.0, self.1, self.2, a])
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn lerp(self, other: Self, t: f32) -> Self {
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        match s.as_str() {
            "w" | "white" => Ok(Self::WHITE),
            "k" | "black" => Ok(Self::BLACK),
            "r" | "red" => Ok(Self::RED),
            "g" | "green" => Ok(Self::GREEN),
            "b" | "blue" => Ok(Self::BLUE),
            _ => {
                if let Some(hex) = s.strip_prefix('#') {
                    parse_hex(hex).ok_or_else(|| format!("Invalid hex color: #{hex}"))
                } else if let Some(index) = s.strip_prefix('c') {
                    index
                        .parse::<usize>()
                        .map(Self::from_cycle)
                        .map_err(|_| format!("Unknown color: {s}"))
                } else {
                    Err(format!("Unknown color: {s}"))
                }
            }
        }
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color(channel(0)?, channel(2)?, channel(4)?))
}

/// Default color cycle (tab10), used when no explicit color is given.
pub const TAB10: [[u8; 3]; 10] = [
    [31, 119, 180],  // #1f77b4
    [255, 127, 14],  // #ff7f0e
    [44, 160, 44],   // #2ca02c
    [214, 39, 40],   // #d62728
    [148, 103, 189], // #9467bd
    [140, 86, 75],   // #8c564b
    [227, 119, 194], // #e377c2
    [127, 127, 127], // #7f7f7f
    [188, 189, 34],  // #bcbd22
    [23, 190, 207],  // #17becf
];

/// Twenty-color categorical palette (tab20), used to color skeleton connections.
pub const TAB20: [[u8; 3]; 20] = [
    [31, 119, 180],  // #1f77b4
    [174, 199, 232], // #aec7e8
    [255, 127, 14],  // #ff7f0e
    [255, 187, 120], // #ffbb78
    [44, 160, 44],   // #2ca02c
    [152, 223, 138], // #98df8a
    [214, 39, 40],   // #d62728
    [255, 152, 150], // #ff9896
    [148, 103, 189], // #9467bd
    [197, 176, 213], // #c5b0d5
    [140, 86, 75],   // #8c564b
    [196, 156, 148], // #c49c94
    [227, 119, 194], // #e377c2
    [247, 182, 210], // #f7b6d2
    [127, 127, 127], // #7f7f7f
    [199, 199, 199], // #c7c7c7
    [188, 189, 34],  // #bcbd22
    [219, 219, 141], // #dbdb8d
    [23, 190, 207],  // #17becf
    [158, 218, 229], // #9edae5
];

/// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [[u8; 3]; 9] = [
    [68, 1, 84],    // #440154
    [71, 44, 122],  // #472c7a
    [59, 81, 139],  // #3b518b
    [44, 113, 142], // #2c718e
    [33, 144, 141], // #21908d
    [39, 173, 129], // #27ad81
    [92, 200, 99],  // #5cc863
    [170, 220, 50], // #aadc32
    [253, 231, 37], // #fde725
];

/// Colormaps mapping a normalized scalar in `[0, 1]` to a color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Colormap {
    /// Perceptually uniform blue-green-yellow map.
    #[default]
    Viridis,
    /// Listed map over [`TAB20`].
    Tab20,
    /// Black to white.
    Gray,
}

impl Colormap {
    /// Look up the color for `x`. Values outside `[0, 1]` are clamped.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn sample(self, x: f32) -> Color {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        match self {
            Self::Viridis => {
                let pos = x * (VIRIDIS.len() - 1) as f32;
                let lo = (pos.floor() as usize).min(VIRIDIS.len() - 2);
                let [r0, g0, b0] = VIRIDIS[lo];
                let [r1, g1, b1] = VIRIDIS[lo + 1];
                Color(r0, g0, b0).lerp(Color(r1, g1, b1), pos - lo as f32)
            }
            Self::Tab20 => {
                let index = ((x * TAB20.len() as f32) as usize).min(TAB20.len() - 1);
                let [r, g, b] = TAB20[index];
                Color(r, g, b)
            }
            Self::Gray => Color::BLACK.lerp(Color::WHITE, x),
        }
    }
}

impl FromStr for Colormap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viridis" => Ok(Self::Viridis),
            "tab20" => Ok(Self::Tab20),
            "gray" | "grey" => Ok(Self::Gray),
            other => Err(format!("Unknown colormap: {other}")),
        }
    }
}

/// Linear mapping of data values onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    /// Value mapped to 0.
    pub vmin: f32,
    /// Value mapped to 1.
    pub vmax: f32,
}

impl Normalize {
    /// Create a normalization over an explicit range.
    pub const fn new(vmin: f32, vmax: f32) -> Self {
        Self { vmin, vmax }
    }

    /// Autoscale to the finite minimum and maximum of `values`.
    pub fn from_data(values: &[f32]) -> Self {
        let (vmin, vmax) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        if vmin > vmax {
            Self::new(0.0, 1.0)
        } else {
            Self::new(vmin, vmax)
        }
    }

    /// Map `value` into `[0, 1]` space. A degenerate range maps everything to 0.
    pub fn apply(&self, value: f32) -> f32 {
        if (self.vmax - self.vmin).abs() <= f32::EPSILON {
            return 0.0;
        }
        (value - self.vmin) / (self.vmax - self.vmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_color() {
        assert_eq!(Color::from_str("white").unwrap(), Color::WHITE);
        assert_eq!(Color::from_str("k").unwrap(), Color::BLACK);
        assert_eq!(Color::from_str("#1f77b4").unwrap(), Color(31, 119, 180));
        assert_eq!(Color::from_str("C1").unwrap(), Color(255, 127, 14));
        assert!(Color::from_str("#12345").is_err());
        assert!(Color::from_str("mauve").is_err());
    }

    #[test]
    fn test_color_display_roundtrip() {
        let color = Color(23, 190, 207);
        assert_eq!(color.to_string(), "#17becf");
        assert_eq!(Color::from_str(&color.to_string()).unwrap(), color);
    }

    #[test]
    fn test_tab20_listed_lookup() {
        assert_eq!(Colormap::Tab20.sample(0.0), Color(31, 119, 180));
        assert_eq!(Colormap::Tab20.sample(1.0 / 19.0), Color(174, 199, 232));
        assert_eq!(Colormap::Tab20.sample(1.0), Color(158, 218, 229));
    }

    #[test]
    fn test_viridis_endpoints() {
        assert_eq!(Colormap::Viridis.sample(0.0), Color(68, 1, 84));
        assert_eq!(Colormap::Viridis.sample(1.0), Color(253, 231, 37));
        assert_eq!(Colormap::Viridis.sample(2.0), Color(253, 231, 37));
        assert_eq!(Colormap::Viridis.sample(0.5), Color(33, 144, 141));
    }

    #[test]
    fn test_normalize() {
        let norm = Normalize::from_data(&[0.5, 1.0, 0.75, f32::NAN]);
        assert!((norm.apply(0.5) - 0.0).abs() < 1e-6);
        assert!((norm.apply(1.0) - 1.0).abs() < 1e-6);
        assert!((norm.apply(0.75) - 0.5).abs() < 1e-6);

        let flat = Normalize::from_data(&[0.3, 0.3]);
        assert!(flat.apply(0.3).abs() < 1e-6);
    }

    #[test]
    fn test_to_rgba_alpha() {
        assert_eq!(Color::WHITE.to_rgba(0.5), Rgba([255, 255, 255, 128]));
        assert_eq!(Color::BLACK.to_rgba(1.0), Rgba([0, 0, 0, 255]));
    }
}
