use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::annotate::annotate;
use crate::blob::extract_large_blobs;
use crate::config::DetectorConfig;
use crate::error::Result;
use crate::preprocess::{blur_gray, resize, ImageInput};
use crate::shape::{filter_regions, BrightRegion};
use crate::threshold::threshold;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub light_region_num: usize,
    pub overexposed: bool,
}

impl Classification {
    pub fn from_count(light_region_num: usize) -> Self {
        Self {
            light_region_num,
            overexposed: light_region_num > 0,
        }
    }
}

/// Classification plus the per-region detail behind it.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub classification: Classification,
    pub regions: Vec<BrightRegion>,
    /// Only produced when the classifier was built with `show_result`
    pub annotated: Option<RgbImage>,
}

/// Full pipeline: resize → blur → threshold → area gate → radius gate
///
/// Holds nothing but its configuration, so one instance can be shared
/// across threads and reused for any number of images.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: DetectorConfig,
    show_result: bool,
}

impl Classifier {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            show_result: false,
        })
    }

    pub fn with_show_result(mut self, show_result: bool) -> Self {
        self.show_result = show_result;
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn show_result(&self) -> bool {
        self.show_result
    }

    pub fn classify(&self, input: impl Into<ImageInput>) -> Result<Classification> {
        Ok(self.run(input.into(), false)?.classification)
    }

    /// Like `classify`, also returning regions and the annotated image if enabled.
    pub fn analyze(&self, input: impl Into<ImageInput>) -> Result<Analysis> {
        self.run(input.into(), self.show_result)
    }

    fn run(&self, input: ImageInput, draw: bool) -> Result<Analysis> {
        let cfg = &self.config;
        let img = input.decode()?;

        let resized = resize(&img, cfg.width, cfg.height);
        let blurred = blur_gray(&resized, cfg.blur_kernel);
        let mask = threshold(
            &blurred,
            cfg.cutoff,
            cfg.erode_iterations,
            cfg.dilate_iterations,
        );

        let blobs = extract_large_blobs(&mask, cfg.large_blob_threshold);
        let regions = if blobs.is_empty() {
            Vec::new()
        } else {
            filter_regions(&blobs.mask, cfg.light_region_radius_min)
        };

        let classification = Classification::from_count(regions.len());
        let annotated = draw.then(|| annotate(&resized, &regions));

        Ok(Analysis {
            classification,
            regions,
            annotated,
        })
    }
}
