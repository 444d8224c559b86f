pub mod config;
pub mod evaluate;

// Re-export vision types for convenience
pub use glint_vision::{
    face, pipeline, Analysis, BrightRegion, Classification, Classifier, DetectorConfig,
    ImageInput, VisionError,
};
