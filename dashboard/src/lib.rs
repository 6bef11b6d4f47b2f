pub mod backend;
pub mod config;
pub mod error;
pub mod live_monitor;
pub mod page;
pub mod timer;
pub mod upload_preview;

pub use backend::BackendClient;
pub use config::Config;
pub use error::DashboardError;
pub use live_monitor::{CountSource, LiveMonitor, MonitorSettings, OverlapPolicy};
pub use upload_preview::{ResultProvider, SelectedFile, UploadPreview};
