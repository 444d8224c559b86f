use std::path::{Path, PathBuf};

use image::{imageops::FilterType, DynamicImage, GenericImageView, GrayImage, ImageReader};
use imageproc::filter::separable_filter_equal;

use crate::error::{Result, VisionError};

/// Anything the classifier accepts as an image.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
    Image(DynamicImage),
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageInput {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(img: DynamicImage) -> Self {
        Self::Image(img)
    }
}

impl ImageInput {
    /// Resolve to a decoded, non-empty image.
    pub fn decode(self) -> Result<DynamicImage> {
        let (origin, img) = match self {
            Self::Path(path) => {
                let origin = path.display().to_string();
                let img = ImageReader::open(&path)
                    .map_err(|e| VisionError::decode(&origin, e))?
                    .with_guessed_format()
                    .map_err(|e| VisionError::decode(&origin, e))?
                    .decode()
                    .map_err(|e| VisionError::decode(&origin, e))?;
                (origin, img)
            }
            Self::Bytes(bytes) => {
                let img = image::load_from_memory(&bytes)
                    .map_err(|e| VisionError::decode("<buffer>", e))?;
                ("<buffer>".to_string(), img)
            }
            Self::Image(img) => ("<image>".to_string(), img),
        };

        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(VisionError::decode(origin, "image is empty"));
        }
        Ok(img)
    }
}

/// Resize to exactly `width` x `height`; aspect ratio is not preserved.
pub fn resize(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    img.resize_exact(width, height, FilterType::Triangle)
}

/// Normalised 1-D Gaussian weights for an odd `size`, sigma derived from the size.
pub fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size / 2) as f32;
    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / sum).collect()
}

/// Grayscale and blur an already resized image.
pub fn blur_gray(img: &DynamicImage, kernel_size: u32) -> GrayImage {
    let gray = img.to_luma8();
    let kernel = gaussian_kernel(kernel_size);
    separable_filter_equal(&gray, &kernel)
}
