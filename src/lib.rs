pub mod config;
pub mod models;
pub mod monitor;
pub mod notifications;
pub mod scraper;
pub mod storage;
pub mod tracking;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use monitor::{MonitorStatus, MonitorTuning, TaskManager};
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
