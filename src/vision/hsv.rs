//! Color vocabulary and HSV thresholding on the 8-bit OpenCV scale
//! (hue 0..=180, saturation and value 0..=255).

use image::{GrayImage, Luma, RgbImage};
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest hue value on the half-degree scale
pub const HUE_MAX: u8 = 180;

/// Colors the benchmark's scenes are drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneColor {
    Red,
    Green,
    Blue,
    Yellow,
    Gray,
}

impl SceneColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneColor::Red => "red",
            SceneColor::Green => "green",
            SceneColor::Blue => "blue",
            SceneColor::Yellow => "yellow",
            SceneColor::Gray => "gray",
        }
    }
}

impl fmt::Display for SceneColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed HSV box; a pixel matches when every channel lies within bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| self.lower[c] <= hsv[c] && hsv[c] <= self.upper[c])
    }

    pub fn is_well_formed(&self) -> bool {
        (0..3).all(|c| self.lower[c] <= self.upper[c]) && self.upper[0] <= HUE_MAX
    }
}

/// One logical color and the ranges that make it up. Red wraps around
/// hue 0 so it carries two sub-ranges that are OR-ed into a single mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub color: SceneColor,
    pub ranges: Vec<HsvRange>,
}

impl ColorSpec {
    pub fn matches(&self, hsv: [u8; 3]) -> bool {
        self.ranges.iter().any(|r| r.contains(hsv))
    }
}

pub const RED_LOW: HsvRange = HsvRange::new([0, 120, 70], [10, 255, 255]);
pub const RED_HIGH: HsvRange = HsvRange::new([170, 120, 70], [180, 255, 255]);
pub const GREEN: HsvRange = HsvRange::new([35, 100, 100], [85, 255, 255]);
pub const BLUE: HsvRange = HsvRange::new([100, 150, 0], [140, 255, 255]);
pub const YELLOW: HsvRange = HsvRange::new([20, 100, 100], [30, 255, 255]);
// Low-saturation band; very dark pixels (V < 40) stay background.
pub const GRAY: HsvRange = HsvRange::new([0, 0, 40], [180, 50, 220]);

/// Default scan order: red, green, blue, yellow, gray
pub fn default_color_specs() -> Vec<ColorSpec> {
    vec![
        ColorSpec {
            color: SceneColor::Red,
            ranges: vec![RED_LOW, RED_HIGH],
        },
        ColorSpec {
            color: SceneColor::Green,
            ranges: vec![GREEN],
        },
        ColorSpec {
            color: SceneColor::Blue,
            ranges: vec![BLUE],
        },
        ColorSpec {
            color: SceneColor::Yellow,
            ranges: vec![YELLOW],
        },
        ColorSpec {
            color: SceneColor::Gray,
            ranges: vec![GRAY],
        },
    ]
}

/// Convert one RGB pixel to `[h, s, v]` with hue halved to fit a byte.
pub fn hsv_from_rgb(rgb: [u8; 3]) -> [u8; 3] {
    let srgb = Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>();
    let hsv: Hsv = Hsv::from_color(srgb);
    let hue = hsv.hue.into_positive_degrees();
    [
        (hue / 2.0).round().min(HUE_MAX as f32) as u8,
        (hsv.saturation * 255.0).round().clamp(0.0, 255.0) as u8,
        (hsv.value * 255.0).round().clamp(0.0, 255.0) as u8,
    ]
}

/// Row-major HSV planes for a whole image
pub struct HsvImage {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 3]>,
}

impl HsvImage {
    pub fn from_rgb(rgb: &RgbImage) -> Self {
        let (width, height) = rgb.dimensions();
        let pixels = rgb.pixels().map(|p| hsv_from_rgb(p.0)).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 3] {
        self.pixels[(y as usize) * (self.width as usize) + x as usize]
    }

    /// Binary mask (255 = match) of pixels falling in any of the color's ranges
    pub fn mask(&self, spec: &ColorSpec) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            if spec.matches(self.get(x, y)) {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        })
    }
}
