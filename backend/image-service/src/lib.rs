pub mod config;
pub mod format;
pub mod grpc;
pub mod storage;

pub use format::ImageFormat;
pub use storage::{ImageStore, StoredImage};
