mod common;

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

use common::{FixedJudge, ScriptedModel, row};
use vqa_bench::config::DetectorConfig;
use vqa_bench::pipelines::ClassicStrategy;
use vqa_bench::{AnswerJudge, Dataset, SceneColor, SceneDetector, SceneFact, Shape, evaluate};

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const GREEN: Rgb<u8> = Rgb([0, 255, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const YELLOW: Rgb<u8> = Rgb([255, 255, 0]);
const GRAY: Rgb<u8> = Rgb([128, 128, 128]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
// Hue ~2 degrees and ~358 degrees, either side of the wrap
const RED_NEAR_ZERO: Rgb<u8> = Rgb([255, 10, 0]);
const RED_NEAR_WRAP: Rgb<u8> = Rgb([255, 0, 10]);

fn canvas(w: u32, h: u32) -> RgbImage {
    RgbImage::from_pixel(w, h, BLACK)
}

fn square(img: &mut RgbImage, x: i32, y: i32, side: u32, color: Rgb<u8>) {
    draw_filled_rect_mut(img, Rect::at(x, y).of_size(side, side), color);
}

fn near(actual: (i32, i32), expected: (i32, i32)) -> bool {
    (actual.0 - expected.0).abs() <= 1 && (actual.1 - expected.1).abs() <= 1
}

fn red_square_green_circle() -> DynamicImage {
    let mut img = canvas(100, 100);
    square(&mut img, 10, 10, 20, RED);
    draw_filled_circle_mut(&mut img, (70, 70), 15, GREEN);
    DynamicImage::ImageRgb8(img)
}

#[test]
fn test_blank_images_have_no_objects() {
    let detector = SceneDetector::default();
    assert!(detector.detect(&DynamicImage::ImageRgb8(canvas(64, 64))).is_empty());
    let white = RgbImage::from_pixel(64, 64, Rgb([255, 255, 255]));
    assert!(detector.detect(&DynamicImage::ImageRgb8(white)).is_empty());
}

#[test]
fn test_red_square_and_green_circle() {
    let facts = SceneDetector::default().detect(&red_square_green_circle());

    assert_eq!(facts.len(), 2, "{:?}", facts);
    assert_eq!(facts[0].color, SceneColor::Red);
    assert_eq!(facts[0].shape, Shape::Square);
    assert!(near(facts[0].position, (19, 19)), "{:?}", facts[0]);
    assert_eq!(facts[1].color, SceneColor::Green);
    assert_eq!(facts[1].shape, Shape::Circle);
    assert!(near(facts[1].position, (70, 70)), "{:?}", facts[1]);
}

#[test]
fn test_scan_order_does_not_change_the_facts() {
    let mut config = DetectorConfig::default();
    config.colors.reverse();
    let reversed = SceneDetector::new(config).detect(&red_square_green_circle());
    let default = SceneDetector::default().detect(&red_square_green_circle());

    assert_eq!(reversed.len(), 2);
    assert_eq!(reversed[0].color, SceneColor::Green);
    for fact in &default {
        assert!(reversed.contains(fact), "{:?} missing from {:?}", fact, reversed);
    }
}

#[test]
fn test_each_color_is_named() {
    let mut img = canvas(200, 60);
    square(&mut img, 5, 5, 20, BLUE);
    square(&mut img, 50, 5, 20, YELLOW);
    square(&mut img, 95, 5, 20, GRAY);
    let facts = SceneDetector::default().detect(&DynamicImage::ImageRgb8(img));

    let colors: Vec<SceneColor> = facts.iter().map(|f| f.color).collect();
    assert_eq!(colors, vec![SceneColor::Blue, SceneColor::Yellow, SceneColor::Gray]);
    assert!(facts.iter().all(|f| f.shape == Shape::Square));
}

#[test]
fn test_noise_floor_on_rendered_shapes() {
    let detector = SceneDetector::default();

    // 10 x 12 pixels traces a 9 x 11 boundary: 99 px²
    let mut small = canvas(40, 40);
    draw_filled_rect_mut(&mut small, Rect::at(5, 5).of_size(10, 12), RED);
    assert!(detector.detect(&DynamicImage::ImageRgb8(small)).is_empty());

    // 2 x 102 pixels traces a 1 x 101 boundary: 101 px²
    let mut strip = canvas(40, 120);
    draw_filled_rect_mut(&mut strip, Rect::at(5, 5).of_size(2, 102), RED);
    assert_eq!(detector.detect(&DynamicImage::ImageRgb8(strip)).len(), 1);
}

#[test]
fn test_shapes_touching_image_borders_are_detected() {
    let detector = SceneDetector::default();
    let placements = [
        ("left", (0, 20), (9, 29)),
        ("top_left", (0, 0), (9, 9)),
        ("top", (20, 0), (29, 9)),
        ("right", (40, 20), (49, 29)),
        ("bottom", (20, 40), (29, 49)),
        ("bottom_left", (0, 40), (9, 49)),
        ("interior", (20, 20), (29, 29)),
    ];
    for (name, (x, y), centre) in placements {
        let mut img = canvas(60, 60);
        square(&mut img, x, y, 20, RED);
        let facts = detector.detect(&DynamicImage::ImageRgb8(img));

        assert_eq!(facts.len(), 1, "{name}: {:?}", facts);
        assert_eq!(facts[0].color, SceneColor::Red, "{name}");
        assert_eq!(facts[0].shape, Shape::Square, "{name}");
        assert!(near(facts[0].position, centre), "{name}: {:?}", facts[0]);
    }
}

#[test]
fn test_red_on_both_sides_of_hue_wrap() {
    let mut img = canvas(100, 40);
    square(&mut img, 5, 5, 20, RED_NEAR_ZERO);
    square(&mut img, 60, 5, 20, RED_NEAR_WRAP);
    let facts = SceneDetector::default().detect(&DynamicImage::ImageRgb8(img));

    assert_eq!(facts.len(), 2, "{:?}", facts);
    assert!(facts.iter().all(|f| f.color == SceneColor::Red));
}

#[test]
fn test_shape_straddling_hue_wrap_is_one_object() {
    let mut img = canvas(60, 60);
    draw_filled_rect_mut(&mut img, Rect::at(10, 10).of_size(15, 30), RED_NEAR_ZERO);
    draw_filled_rect_mut(&mut img, Rect::at(25, 10).of_size(15, 30), RED_NEAR_WRAP);
    let facts = SceneDetector::default().detect(&DynamicImage::ImageRgb8(img));

    assert_eq!(facts.len(), 1, "{:?}", facts);
    assert_eq!(facts[0].color, SceneColor::Red);
    assert_eq!(facts[0].shape, Shape::Square);
}

#[test]
fn test_nested_shape_inside_hole_is_not_external() {
    let mut img = canvas(80, 80);
    square(&mut img, 10, 10, 50, RED);
    square(&mut img, 20, 20, 30, BLACK);
    square(&mut img, 28, 28, 14, RED);
    let facts = SceneDetector::default().detect(&DynamicImage::ImageRgb8(img));

    assert_eq!(facts.len(), 1, "{:?}", facts);
    assert_eq!(facts[0].shape, Shape::Square);
}

#[test]
fn test_detection_is_repeatable() {
    let detector = SceneDetector::default();
    let img = red_square_green_circle();
    let first: Vec<SceneFact> = detector.detect(&img);
    let second: Vec<SceneFact> = detector.detect(&img);
    assert_eq!(first, second);
}

#[test]
fn test_unreadable_paths_yield_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let detector = SceneDetector::default();
    assert!(detector.detect_path(&dir.path().join("missing.png")).is_empty());

    let bogus = dir.path().join("not_an_image.png");
    std::fs::write(&bogus, b"definitely not png bytes").unwrap();
    assert!(detector.detect_path(&bogus).is_empty());
}

#[tokio::test]
async fn test_classic_pipeline_injects_detected_facts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.png");
    red_square_green_circle().save(&path).unwrap();

    let model = ScriptedModel::answering(&["red"]);
    let judge_model = FixedJudge::says("Yes");
    let judge = AnswerJudge::new(&judge_model, 5);
    let strategy = ClassicStrategy::new(SceneDetector::default(), None);
    let dataset = Dataset::from_rows(vec![row("scene", "What color is the square?", "red", &path)]);

    let result = evaluate(&strategy, &model, &judge, &dataset).await;

    assert_eq!(result.accuracy, 1.0);
    let call = &model.calls()[0];
    assert!(call.prompt.starts_with("Scene Context: The following objects were detected:\n"));
    assert!(call.prompt.contains("- A red square at coordinates ("));
    assert!(call.prompt.contains("- A green circle at coordinates ("));
    assert!(call.prompt.contains("Based *only* on the scene context provided above"));
    assert_eq!(call.image.as_deref(), Some(path.as_path()));
}
