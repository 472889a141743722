mod config;
mod service_provider;

pub use config::{StaticFilesConfig, UploadConfig, UploadServerConfig};
pub use service_provider::ServiceProvider;
