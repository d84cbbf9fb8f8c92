use crate::models::ClientConfig;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File, FileFormat};
use std::fs;

/// File name of the client settings inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "labelpanel.yaml";

/// Prefix of environment variables that override the settings file,
/// e.g. `LABELPANEL_BACKEND_URL`.
pub const ENV_PREFIX: &str = "LABELPANEL";

/// Configuration manager for loading and saving the client settings.
///
/// Settings are layered: built-in defaults, then `labelpanel.yaml` (optional),
/// then `LABELPANEL_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` if needed.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            config_dir,
        })
    }

    /// Load settings from defaults, the settings file and the environment.
    pub fn load(&self) -> Result<ClientConfig> {
        self.load_with_env(Environment::with_prefix(ENV_PREFIX))
    }

    /// Load settings with an explicit environment source.
    ///
    /// Tests pass an `Environment` with a custom source map so they do not
    /// depend on the process environment.
    pub fn load_with_env(&self, env: Environment) -> Result<ClientConfig> {
        let defaults = serde_yaml_ng::to_string(&ClientConfig::default())
            .context("Failed to serialize default client config")?;

        if self.config_path.exists() {
            tracing::info!("Loading client config from {}", self.config_path);
        } else {
            tracing::warn!(
                "Client config file not found at {}, using defaults",
                self.config_path
            );
        }

        let settings = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Yaml))
            .add_source(
                File::new(self.config_path.as_str(), FileFormat::Yaml).required(false),
            )
            .add_source(env.try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read client config: {}", self.config_path))?;

        settings
            .try_deserialize::<ClientConfig>()
            .with_context(|| format!("Failed to parse client config: {}", self.config_path))
    }

    /// Save settings as YAML.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize client config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write client config: {}", self.config_path))?;

        tracing::info!("Saved client config to {}", self.config_path);
        Ok(())
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }
}
