use getset::Getters;
use serde::*;

pub const ENV_PREFIX: &str = "UPLOAD";

#[derive(Default, Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct CommonConfig {
    #[serde(default)]
    telemetry: crate::telemetry::TelemetryConfig,
    #[serde(default)]
    host: HostConfig,
}

#[derive(Deserialize, Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct HostConfig {
    #[serde(default = "HostConfig::default_address")]
    bind_address: String,
    #[serde(default = "HostConfig::default_port")]
    bind_port: u16,
    /// Worker threads, one per physical core when absent.
    #[serde(default)]
    workers: Option<usize>,
}
impl Default for HostConfig {
    fn default() -> Self {
        Self {
            bind_address: Self::default_address(),
            bind_port: Self::default_port(),
            workers: None,
        }
    }
}
impl HostConfig {
    fn default_address() -> String {
        "0.0.0.0".to_string()
    }

    fn default_port() -> u16 {
        8383
    }
}

/// Layers `config.yaml`, every yaml file named in the process arguments, then `UPLOAD__*` variables.
pub fn build_config() -> anyhow::Result<config::Config> {
    build_config_from(std::env::args())
}

pub fn build_config_from(args: impl IntoIterator<Item = String>) -> anyhow::Result<config::Config> {
    let mut config = config::Config::builder().add_source(
        config::File::with_name("config")
            .required(false)
            .format(config::FileFormat::Yaml),
    );
    for arg in args {
        if arg.ends_with("yaml") || arg.ends_with("yml") {
            config = config.add_source(
                config::File::from(std::path::Path::new(arg.as_str()))
                    .format(config::FileFormat::Yaml)
                    .required(false),
            );
        }
    }
    config = config.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );
    Ok(config.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CommonConfig::default();
        assert_eq!(config.host().bind_address(), "0.0.0.0");
        assert_eq!(*config.host().bind_port(), 8383);
        assert!(config.host().workers().is_none());
    }

    #[test]
    fn from_yaml() {
        let config = config::Config::builder()
            .add_source(config::File::from_str(
                "host:\n  bind_port: 9000\n  workers: 2\n",
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<CommonConfig>()
            .unwrap();
        assert_eq!(*config.host().bind_port(), 9000);
        assert_eq!(*config.host().workers(), Some(2));
        assert_eq!(config.host().bind_address(), "0.0.0.0");
    }

    #[test]
    fn missing_files_are_optional() {
        let config = build_config_from(["upload-server".to_string(), "nowhere.yaml".to_string()])
            .unwrap()
            .try_deserialize::<CommonConfig>()
            .unwrap();
        assert_eq!(config.host().bind_address(), "0.0.0.0");
    }
}
