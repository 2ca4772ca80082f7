//! Rule-based scene detector: HSV color masks, external contours, a
//! coarse square/circle classifier and moment centroids.

use image::DynamicImage;
use imageproc::contours::{Contour, find_contours};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::config::DetectorConfig;
use crate::vision::hsv::{HsvImage, SceneColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Circle,
    Square,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Circle => f.write_str("circle"),
            Shape::Square => f.write_str("square"),
        }
    }
}

/// A single detected object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneFact {
    pub color: SceneColor,
    pub shape: Shape,
    /// Integer centroid `(x, y)` in pixel coordinates
    pub position: (i32, i32),
}

impl fmt::Display for SceneFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "A {} {} at coordinates ({}, {})",
            self.color, self.shape, self.position.0, self.position.1
        )
    }
}

/// Zeroth and first spatial moments of a closed polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    /// Green's theorem over the polygon edges. The sign follows the
    /// winding direction; the centroid ratio is sign-independent.
    pub fn of(points: &[Point<i32>]) -> Self {
        let n = points.len();
        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;
        if n < 3 {
            return Self { m00, m10, m01 };
        }
        for i in 0..n {
            let p = points[i];
            let q = points[(i + 1) % n];
            let (x0, y0) = (p.x as f64, p.y as f64);
            let (x1, y1) = (q.x as f64, q.y as f64);
            let cross = x0 * y1 - x1 * y0;
            m00 += cross;
            m10 += (x0 + x1) * cross;
            m01 += (y0 + y1) * cross;
        }
        Self {
            m00: m00 / 2.0,
            m10: m10 / 6.0,
            m01: m01 / 6.0,
        }
    }

    pub fn area(&self) -> f64 {
        self.m00.abs()
    }

    /// Truncated centroid, or `None` for a degenerate (zero-area) polygon
    pub fn centroid(&self) -> Option<(i32, i32)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some(((self.m10 / self.m00) as i32, (self.m01 / self.m00) as i32))
    }
}

pub struct SceneDetector {
    config: DetectorConfig,
}

impl Default for SceneDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl SceneDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Decode and scan an image file. Unreadable files yield no facts.
    pub fn detect_path(&self, path: &Path) -> Vec<SceneFact> {
        match image::open(path) {
            Ok(img) => self.detect(&img),
            Err(e) => {
                tracing::warn!("Could not read image {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Facts in color scan order, then contour discovery order
    pub fn detect(&self, image: &DynamicImage) -> Vec<SceneFact> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Vec::new();
        }

        let hsv = HsvImage::from_rgb(&rgb);
        let mut facts = Vec::new();

        for spec in &self.config.colors {
            let mask = hsv.mask(spec);
            let contours: Vec<Contour<i32>> = find_contours(&mask);
            for contour in external_contours(&contours) {
                if let Some(fact) = self.classify_contour(spec.color, &contour.points) {
                    facts.push(fact);
                }
            }
        }

        tracing::debug!(objects = facts.len(), "scene detection complete");
        facts
    }

    /// Apply the noise floor, shape rule and centroid to one contour
    pub fn classify_contour(&self, color: SceneColor, points: &[Point<i32>]) -> Option<SceneFact> {
        let moments = PolygonMoments::of(points);
        if moments.area() < self.config.min_contour_area {
            return None;
        }

        let perimeter = arc_length(points, true);
        let approx = approximate_closed_polygon(points, self.config.approx_epsilon_ratio * perimeter);
        let shape = if approx.len() == self.config.square_vertices {
            Shape::Square
        } else {
            Shape::Circle
        };

        let Some(position) = moments.centroid() else {
            tracing::debug!("skipping degenerate {} contour with zero area moment", color);
            return None;
        };

        Some(SceneFact {
            color,
            shape,
            position,
        })
    }
}

/// Top-level borders only. A parentless border always encloses a
/// foreground region; `border_type` is not trusted here because regions
/// starting at column 0 come back tagged as holes.
fn external_contours(contours: &[Contour<i32>]) -> impl Iterator<Item = &Contour<i32>> {
    contours.iter().filter(|c| c.parent.is_none())
}

/// Douglas-Peucker over a closed boundary: split at the point farthest
/// from the start, simplify both open chains, then stitch them back
/// together without repeating the shared endpoints.
pub fn approximate_closed_polygon(points: &[Point<i32>], epsilon: f64) -> Vec<Point<i32>> {
    if points.len() < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let start = points[0];
    let mut far = 0;
    let mut far_dist = 0i64;
    for (i, p) in points.iter().enumerate().skip(1) {
        let dx = (p.x - start.x) as i64;
        let dy = (p.y - start.y) as i64;
        let d = dx * dx + dy * dy;
        if d > far_dist {
            far_dist = d;
            far = i;
        }
    }
    if far == 0 {
        return vec![start];
    }

    let mut polygon = approximate_polygon_dp(&points[..=far], epsilon, false);

    let mut tail: Vec<Point<i32>> = points[far..].to_vec();
    tail.push(start);
    let tail = approximate_polygon_dp(&tail, epsilon, false);

    polygon.pop();
    polygon.extend(tail);
    polygon.pop();
    polygon
}
