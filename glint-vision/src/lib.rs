pub mod annotate;
pub mod blob;
pub mod config;
pub mod error;
pub mod face;
pub mod pipeline;
pub mod preprocess;
pub mod shape;
pub mod threshold;

// Re-export commonly used types
pub use config::DetectorConfig;
pub use error::{Result, VisionError};
pub use face::{BeautyModel, BeautyRecognizer, Detection, FaceDetector};
pub use pipeline::{Analysis, Classification, Classifier};
pub use preprocess::ImageInput;
pub use shape::BrightRegion;
