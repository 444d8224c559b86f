use std::collections::HashMap;

use image::GrayImage;
use imageproc::region_labelling::{connected_components, Connectivity};

use crate::threshold::{BACKGROUND, FOREGROUND};

/// Components that survived the area gate.
#[derive(Debug, Clone)]
pub struct LargeBlobs {
    /// Union of every kept component
    pub mask: GrayImage,
    /// Kept labels with their pixel counts, in label order
    pub labels: Vec<(u32, u32)>,
}

impl LargeBlobs {
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Label 8-connected components and keep those with more than `min_pixels` pixels.
pub fn extract_large_blobs(mask: &GrayImage, min_pixels: u32) -> LargeBlobs {
    let labelled = connected_components(mask, Connectivity::Eight, BACKGROUND);

    let mut counts: HashMap<u32, u32> = HashMap::new();
    for label in labelled.pixels() {
        if label[0] != 0 {
            *counts.entry(label[0]).or_insert(0) += 1;
        }
    }

    let mut labels: Vec<(u32, u32)> = counts
        .into_iter()
        .filter(|&(_, count)| count > min_pixels)
        .collect();
    labels.sort_unstable_by_key(|&(label, _)| label);

    let mut combined = GrayImage::new(mask.width(), mask.height());
    for (x, y, label) in labelled.enumerate_pixels() {
        let label = label[0];
        if label != 0 && labels.binary_search_by_key(&label, |&(l, _)| l).is_ok() {
            combined.put_pixel(x, y, FOREGROUND);
        }
    }

    log::debug!(
        "blobs: kept {} component(s) above {} pixels",
        labels.len(),
        min_pixels
    );

    LargeBlobs {
        mask: combined,
        labels,
    }
}
