pub mod image_store;
pub mod metrics;
pub mod storage;
pub mod vision;

pub use image_store::ImageStore;
pub use metrics::{get_metrics, init_metrics, record_analysis};
pub use storage::{MemStorage, MongoStorage, Storage};
pub use vision::{GeminiVisionProvider, MockVisionProvider, VisionProvider};
