use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;

use crate::shape::BrightRegion;

const MARK: Rgb<u8> = Rgb([255, 0, 0]);
const THICKNESS: i32 = 3;

/// Copy of `img` with a circle over every region.
pub fn annotate(img: &DynamicImage, regions: &[BrightRegion]) -> RgbImage {
    let mut canvas = img.to_rgb8();
    for region in regions {
        let center = (region.center.0 as i32, region.center.1 as i32);
        let radius = region.radius as i32;
        for offset in -(THICKNESS / 2)..=(THICKNESS / 2) {
            let r = radius + offset;
            if r > 0 {
                draw_hollow_circle_mut(&mut canvas, center, r, MARK);
            }
        }
        log::debug!(
            "annotated region #{} at ({:.0}, {:.0}) r={:.1}",
            region.index,
            region.center.0,
            region.center.1,
            region.radius
        );
    }
    canvas
}
