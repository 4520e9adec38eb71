use crate::method::MethodKind;
use crate::settings::RawSettings;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "corruptor.toml";

/// Defaults applied to every run unless overridden on the command line.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct RunDefaults {
    #[serde(default)]
    pub method: MethodKind,
    pub xor_value: Option<u64>,
    pub count: Option<u64>,
    #[serde(default = "default_verbose")]
    pub verbose: bool,
    pub seed: Option<u64>,
    pub chunk_size: Option<u64>,
}

fn default_verbose() -> bool {
    true
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            method: MethodKind::default(),
            xor_value: None,
            count: None,
            verbose: default_verbose(),
            seed: None,
            chunk_size: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct CorruptorConfig {
    #[serde(default)]
    pub defaults: Option<RunDefaults>,
}

impl CorruptorConfig {
    pub fn load_from_file(path: &PathBuf) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file at {:?}: {}", path, e))?;

        let config: CorruptorConfig = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse TOML from config file {:?}: {}", path, e)
        })?;

        Ok(config)
    }

    /// Loads `path` if given, otherwise [`DEFAULT_CONFIG_FILE`] from `working_dir` if it
    /// exists, otherwise the built-in defaults.
    pub fn discover(path: Option<&PathBuf>, working_dir: &Path) -> Result<Self, anyhow::Error> {
        match path {
            Some(config_path) => {
                log::info!("Loading configuration from specified path: {config_path:?}");
                Self::load_from_file(config_path)
            }
            None => {
                let default_config_path = working_dir.join(DEFAULT_CONFIG_FILE);
                if default_config_path.is_file() {
                    log::info!("Loading default configuration: {default_config_path:?}");
                    Self::load_from_file(&default_config_path)
                } else {
                    log::debug!("No configuration file found, using built-in defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn run_defaults(&self) -> RunDefaults {
        self.defaults.clone().unwrap_or_default()
    }

    /// Fills the fields of `raw` that were left unset with this config's defaults.
    pub fn apply_to(&self, raw: RawSettings) -> RawSettings {
        let defaults = self.run_defaults();
        RawSettings {
            method: raw.method.or(Some(defaults.method)),
            xor_value: raw.xor_value.or(defaults.xor_value),
            count: raw.count.or(defaults.count),
            seed: raw.seed.or(defaults.seed),
            chunk_size: raw.chunk_size.or(defaults.chunk_size),
            ..raw
        }
    }
}
