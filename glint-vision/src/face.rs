use std::path::Path;

use anyhow::{Context, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::preprocess::ImageInput;

pub const DEFAULT_MARGIN: u32 = 10;
pub const DEFAULT_FACE_SIZE: u32 = 64;

/// Face found by a detector
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub bbox: [f32; 4], // x, y, w, h; x and w run along columns
    pub score: f32,
}

/// Anything that locates faces in a photo.
pub trait FaceDetector {
    fn detect(&mut self, img: &DynamicImage) -> Result<Vec<Detection>>;
}

/// Anything that scores a cropped face.
pub trait BeautyModel {
    fn predict(&mut self, face: &DynamicImage) -> Result<f32>;
}

/// Cut the detection out with `margin` pixels of context, then produce a
/// `size` x `size` patch: shorter side scaled to `size`, longer side center-cropped.
pub fn crop_face(
    img: &DynamicImage,
    detection: &Detection,
    margin: u32,
    size: u32,
) -> Result<DynamicImage> {
    anyhow::ensure!(size > 0, "face size must be non-zero");

    let (img_w, img_h) = img.dimensions();
    let [x, y, w, h] = detection.bbox;
    let margin = margin as f32;

    let left = (x - margin).floor().max(0.0) as u32;
    let top = (y - margin).floor().max(0.0) as u32;
    let right = ((x + w + margin).ceil().max(0.0) as u32).min(img_w);
    let bottom = ((y + h + margin).ceil().max(0.0) as u32).min(img_h);

    if right <= left || bottom <= top {
        anyhow::bail!(
            "face box [{:.1}, {:.1}, {:.1}, {:.1}] lies outside the {}x{} image",
            x,
            y,
            w,
            h,
            img_w,
            img_h
        );
    }

    let region = img.crop_imm(left, top, right - left, bottom - top);
    let (rw, rh) = region.dimensions();

    let (new_w, new_h) = if rw < rh {
        let scaled = (rh as f32 * size as f32 / rw as f32).round() as u32;
        (size, scaled.max(size))
    } else {
        let scaled = (rw as f32 * size as f32 / rh as f32).round() as u32;
        (scaled.max(size), size)
    };
    let resized = region.resize_exact(new_w, new_h, FilterType::Triangle);

    let offset_x = (new_w - size) / 2;
    let offset_y = (new_h - size) / 2;
    Ok(resized.crop_imm(offset_x, offset_y, size, size))
}

/// Detect → crop → score
pub struct BeautyRecognizer<D, M> {
    detector: D,
    model: M,
    margin: u32,
    size: u32,
}

impl<D: FaceDetector, M: BeautyModel> BeautyRecognizer<D, M> {
    pub fn new(detector: D, model: M) -> Self {
        Self {
            detector,
            model,
            margin: DEFAULT_MARGIN,
            size: DEFAULT_FACE_SIZE,
        }
    }

    pub fn with_crop(mut self, margin: u32, size: u32) -> Self {
        self.margin = margin;
        self.size = size;
        self
    }

    /// Score the most confident face, rounded to two decimals.
    pub fn infer(&mut self, img: &DynamicImage) -> Result<f32> {
        let detections = self.detector.detect(img).context("detecting faces")?;

        let best = detections
            .iter()
            .max_by(|a, b| a.score.total_cmp(&b.score))
            .context("No face detected in image")?;

        let face = crop_face(img, best, self.margin, self.size).context("cropping face")?;
        let score = self.model.predict(&face).context("scoring face")?;

        Ok((score * 100.0).round() / 100.0)
    }

    pub fn infer_path(&mut self, path: &Path) -> Result<f32> {
        let img = ImageInput::from(path).decode()?;
        self.infer(&img)
    }
}
