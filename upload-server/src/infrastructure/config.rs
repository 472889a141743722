use infrastructure_common::config::CommonConfig;
use serde::Deserialize;
use service_upload::DEFAULT_BUFFER_SIZE;

#[derive(Default, Clone, Deserialize, Debug)]
pub struct UploadServerConfig {
    #[serde(default, flatten)]
    pub common: CommonConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    #[serde(default)]
    pub static_files: StaticFilesConfig,
}

#[derive(Clone, Deserialize, Debug)]
pub struct UploadConfig {
    /// Directory every identifier is resolved under.
    #[serde(default = "UploadConfig::default_base_dir")]
    pub base_dir: String,
    /// Bytes read from a payload per write.
    #[serde(default = "UploadConfig::default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "UploadConfig::default_sync_each_write")]
    pub sync_each_write: bool,
    /// Bytes of text fields kept in memory per request.
    #[serde(default = "UploadConfig::default_memory_limit")]
    pub memory_limit: usize,
    /// Bytes of a whole multipart body.
    #[serde(default = "UploadConfig::default_total_limit")]
    pub total_limit: usize,
}

impl UploadConfig {
    fn default_base_dir() -> String {
        "uploads".to_string()
    }
    fn default_buffer_size() -> usize {
        DEFAULT_BUFFER_SIZE
    }
    fn default_sync_each_write() -> bool {
        true
    }
    fn default_memory_limit() -> usize {
        2 * 1024 * 1024
    }
    fn default_total_limit() -> usize {
        100 * 1024 * 1024
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            base_dir: Self::default_base_dir(),
            buffer_size: Self::default_buffer_size(),
            sync_each_write: Self::default_sync_each_write(),
            memory_limit: Self::default_memory_limit(),
            total_limit: Self::default_total_limit(),
        }
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct StaticFilesConfig {
    #[serde(default = "StaticFilesConfig::default_enable")]
    pub enable: bool,
    #[serde(default = "StaticFilesConfig::default_path")]
    pub path: String,
    #[serde(default = "StaticFilesConfig::default_index_file")]
    pub index_file: String,
}

impl StaticFilesConfig {
    fn default_enable() -> bool {
        true
    }
    fn default_path() -> String {
        "public".to_string()
    }
    fn default_index_file() -> String {
        "index.html".to_string()
    }
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        Self {
            enable: Self::default_enable(),
            path: Self::default_path(),
            index_file: Self::default_index_file(),
        }
    }
}
