use anyhow::Result;
use glint_vision::{Classification, Classifier, DetectorConfig, ImageInput};
use image::{DynamicImage, GrayImage, Luma};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

const WHITE: Luma<u8> = Luma([255]);

fn canvas(width: u32, height: u32) -> GrayImage {
    GrayImage::new(width, height)
}

fn disk(img: &mut GrayImage, cx: i32, cy: i32, r: i32) {
    draw_filled_circle_mut(img, (cx, cy), r, WHITE);
}

fn classifier(large_blob_threshold: u32, light_region_radius_min: f32) -> Result<Classifier> {
    Ok(Classifier::new(DetectorConfig {
        large_blob_threshold,
        light_region_radius_min,
        ..Default::default()
    })?)
}

/// Six disks of decreasing size spread over the canonical canvas.
fn many_disks() -> DynamicImage {
    let mut img = canvas(400, 600);
    disk(&mut img, 110, 110, 90);
    disk(&mut img, 300, 110, 70);
    disk(&mut img, 100, 330, 50);
    disk(&mut img, 300, 330, 35);
    disk(&mut img, 100, 500, 20);
    disk(&mut img, 300, 500, 10);
    DynamicImage::ImageLuma8(img)
}

#[test]
fn black_image_is_not_overexposed() -> Result<()> {
    let img = DynamicImage::ImageLuma8(canvas(400, 600));
    for (area, radius) in [(0, 0.0), (500, 60.0), (10_000, 200.0)] {
        let result = classifier(area, radius)?.classify(img.clone())?;
        assert_eq!(
            result,
            Classification {
                light_region_num: 0,
                overexposed: false
            }
        );
    }
    Ok(())
}

#[test]
fn centered_disk_with_defaults() -> Result<()> {
    let mut img = canvas(400, 600);
    disk(&mut img, 200, 300, 80);

    let classifier = Classifier::new(DetectorConfig::default())?;
    let result = classifier.classify(DynamicImage::ImageLuma8(img))?;

    assert_eq!(result.light_region_num, 1);
    assert!(result.overexposed);
    Ok(())
}

#[test]
fn fully_white_image_is_overexposed() -> Result<()> {
    let mut img = canvas(400, 600);
    for p in img.pixels_mut() {
        *p = WHITE;
    }

    let analysis = Classifier::new(DetectorConfig::default())?.analyze(DynamicImage::ImageLuma8(img))?;
    assert_eq!(
        analysis.classification,
        Classification {
            light_region_num: 1,
            overexposed: true
        }
    );
    let region = &analysis.regions[0];
    assert!((region.center.0 - 199.5).abs() < 1.0);
    assert!((region.center.1 - 299.5).abs() < 1.0);
    Ok(())
}

#[test]
fn disks_clipped_by_the_frame_are_counted() -> Result<()> {
    let mut img = canvas(400, 600);
    // quarter disk in the top-left corner
    disk(&mut img, 0, 0, 150);
    // half disk against the right edge
    disk(&mut img, 399, 400, 90);

    let analysis = Classifier::new(DetectorConfig::default())?.analyze(DynamicImage::ImageLuma8(img))?;
    assert_eq!(analysis.classification.light_region_num, 2);
    assert!(analysis.classification.overexposed);

    let indices: Vec<usize> = analysis.regions.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2]);
    for region in &analysis.regions {
        assert!((0.0..400.0).contains(&region.center.0), "{:?}", region);
        assert!((0.0..600.0).contains(&region.center.1), "{:?}", region);
        assert!(region.radius >= 60.0);
    }
    // the corner region starts at x = 0
    assert!(analysis.regions[0].center.0 < analysis.regions[1].center.0);
    Ok(())
}

#[test]
fn color_input_of_other_size_is_resized() -> Result<()> {
    let mut img = canvas(600, 400);
    disk(&mut img, 300, 200, 80);
    let rgb = DynamicImage::ImageLuma8(img).to_rgb8();

    let analysis = Classifier::new(DetectorConfig::default())?.analyze(DynamicImage::ImageRgb8(rgb))?;
    assert_eq!(analysis.classification.light_region_num, 1);
    // the disk was stretched vertically by 600/400
    assert!(analysis.regions[0].radius > 90.0);
    Ok(())
}

#[test]
fn compact_region_below_radius_is_excluded() -> Result<()> {
    let mut img = canvas(400, 600);
    disk(&mut img, 200, 300, 25);
    let img = DynamicImage::ImageLuma8(img);

    // area clears 500 pixels but the radius stays near 25
    assert_eq!(classifier(500, 60.0)?.classify(img.clone())?.light_region_num, 0);
    assert_eq!(classifier(500, 20.0)?.classify(img.clone())?.light_region_num, 1);
    // and the area gate alone can reject it too
    assert_eq!(classifier(50_000, 0.0)?.classify(img)?.light_region_num, 0);
    Ok(())
}

#[test]
fn short_streak_is_excluded_by_radius() -> Result<()> {
    let mut img = canvas(400, 600);
    draw_filled_rect_mut(&mut img, Rect::at(150, 290).of_size(100, 20), WHITE);
    let img = DynamicImage::ImageLuma8(img);

    let analysis = classifier(0, 0.0)?.analyze(img.clone())?;
    assert_eq!(analysis.regions.len(), 1);
    assert!(analysis.regions[0].radius < 60.0);

    let result = classifier(500, 60.0)?.classify(img)?;
    assert!(!result.overexposed);
    Ok(())
}

#[test]
fn thresholds_are_monotonic() -> Result<()> {
    let img = many_disks();

    let mut previous = usize::MAX;
    for area in [0, 100, 500, 2_000, 5_000, 10_000, 30_000] {
        let n = classifier(area, 0.0)?.classify(img.clone())?.light_region_num;
        assert!(n <= previous, "area {}: {} > {}", area, n, previous);
        previous = n;
    }

    let mut previous = usize::MAX;
    for radius in [0.0, 15.0, 30.0, 45.0, 60.0, 80.0, 100.0] {
        let n = classifier(500, radius)?.classify(img.clone())?.light_region_num;
        assert!(n <= previous, "radius {}: {} > {}", radius, n, previous);
        previous = n;
    }
    Ok(())
}

#[test]
fn small_specks_vanish_and_large_disks_are_counted() -> Result<()> {
    let result = Classifier::new(DetectorConfig::default())?.classify(many_disks())?;
    // radii 90 and 70 reach the default 60 pixel minimum
    assert_eq!(result.light_region_num, 2);
    Ok(())
}

#[test]
fn regions_numbered_left_to_right() -> Result<()> {
    let mut img = canvas(400, 600);
    disk(&mut img, 300, 150, 70);
    disk(&mut img, 90, 450, 70);
    let analysis = Classifier::new(DetectorConfig::default())?.analyze(DynamicImage::ImageLuma8(img))?;

    let indices: Vec<usize> = analysis.regions.iter().map(|r| r.index).collect();
    assert_eq!(indices, vec![1, 2]);
    assert!(analysis.regions[0].center.0 < analysis.regions[1].center.0);
    Ok(())
}

#[test]
fn repeated_calls_agree() -> Result<()> {
    let classifier = Classifier::new(DetectorConfig::default())?;
    let img = many_disks();

    let first = classifier.analyze(img.clone())?;
    let second = classifier.analyze(img)?;
    assert_eq!(first.classification, second.classification);
    assert_eq!(first.regions, second.regions);
    Ok(())
}

#[test]
fn annotation_does_not_change_result() -> Result<()> {
    let img = many_disks();
    let plain = Classifier::new(DetectorConfig::default())?;
    let showing = plain.clone().with_show_result(true);

    let analysis = showing.analyze(img.clone())?;
    let annotated = analysis.annotated.expect("annotated image when show_result is set");
    assert_eq!(annotated.dimensions(), (400, 600));
    assert_eq!(analysis.classification, plain.classify(img.clone())?);
    assert!(plain.analyze(img)?.annotated.is_none());
    Ok(())
}

#[test]
fn shared_across_threads() -> Result<()> {
    let classifier = Classifier::new(DetectorConfig::default())?;
    let img = many_disks();
    let expected = classifier.classify(img.clone())?;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let img = img.clone();
                let classifier = &classifier;
                s.spawn(move || classifier.classify(img))
            })
            .collect();
        for handle in handles {
            let result = handle.join().expect("worker panicked").expect("classify");
            assert_eq!(result, expected);
        }
    });
    Ok(())
}

#[test]
fn input_variants_agree() -> Result<()> {
    let img = many_disks();
    let mut png = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;

    let classifier = Classifier::new(DetectorConfig::default())?;
    let from_image = classifier.classify(ImageInput::Image(img))?;
    let from_bytes = classifier.classify(ImageInput::Bytes(png))?;
    assert_eq!(from_image, from_bytes);
    Ok(())
}
