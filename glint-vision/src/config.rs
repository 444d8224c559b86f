use serde::{Deserialize, Serialize};

use crate::error::{Result, VisionError};

/// Tunables for the bright-region pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Canonical width every input is resized to
    pub width: u32,
    /// Canonical height every input is resized to
    pub height: u32,
    /// Gaussian kernel size, odd
    pub blur_kernel: u32,
    /// Grayscale level at or above which a pixel counts as bright
    pub cutoff: u8,
    pub erode_iterations: u8,
    pub dilate_iterations: u8,
    /// Components must have strictly more pixels than this to survive
    pub large_blob_threshold: u32,
    /// Enclosing-circle radius a region needs to be counted
    pub light_region_radius_min: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 600,
            blur_kernel: 11,
            cutoff: 236,
            erode_iterations: 2,
            dilate_iterations: 4,
            large_blob_threshold: 500,
            light_region_radius_min: 60.0,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "target size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "blur_kernel must be odd, got {}",
                self.blur_kernel
            )));
        }
        if self.cutoff == 0 {
            return Err(VisionError::InvalidConfiguration(
                "cutoff must be > 0".into(),
            ));
        }
        if !self.light_region_radius_min.is_finite() || self.light_region_radius_min < 0.0 {
            return Err(VisionError::InvalidConfiguration(format!(
                "light_region_radius_min must be a non-negative number, got {}",
                self.light_region_radius_min
            )));
        }
        Ok(())
    }
}
