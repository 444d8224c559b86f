use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::{dilate, erode};

pub const FOREGROUND: Luma<u8> = Luma([255]);
pub const BACKGROUND: Luma<u8> = Luma([0]);

/// Pixels at or above `cutoff` become foreground.
pub fn binarize(gray: &GrayImage, cutoff: u8) -> GrayImage {
    let mut mask = gray.clone();
    for p in mask.pixels_mut() {
        *p = if p[0] >= cutoff { FOREGROUND } else { BACKGROUND };
    }
    mask
}

/// Erode then dilate with a 3x3 square element.
///
/// `n` iterations with a 3x3 square equal one pass at chessboard distance `n`.
pub fn clean(mask: &GrayImage, erode_iterations: u8, dilate_iterations: u8) -> GrayImage {
    let mut out = mask.clone();
    if erode_iterations > 0 {
        out = erode(&out, Norm::LInf, erode_iterations);
    }
    if dilate_iterations > 0 {
        out = dilate(&out, Norm::LInf, dilate_iterations);
    }
    out
}

pub fn threshold(gray: &GrayImage, cutoff: u8, erode_iterations: u8, dilate_iterations: u8) -> GrayImage {
    let mask = binarize(gray, cutoff);
    let cleaned = clean(&mask, erode_iterations, dilate_iterations);
    log::debug!(
        "threshold: {} bright pixels, {} after cleaning",
        count_foreground(&mask),
        count_foreground(&cleaned)
    );
    cleaned
}

pub fn count_foreground(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}
