pub mod detector;
pub mod hsv;

pub use detector::{PolygonMoments, SceneDetector, SceneFact, Shape};
pub use hsv::{ColorSpec, HsvRange, SceneColor, default_color_specs, hsv_from_rgb};
