use crate::core::get_config_dir;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Default, Clone)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    /// Project used when `--project` is not given
    #[serde(default)]
    pub project: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the job service, e.g. `https://jobs.example.com`
    #[serde(default = "default_url")]
    pub url: String,
    /// API version segment of request paths
    #[serde(default = "default_api_version")]
    pub version: u32,
    /// Sent as `X-Rundeck-Auth-Token` when set
    #[serde(default)]
    pub token: Option<String>,
}

fn default_url() -> String {
    "http://localhost:4440".to_string()
}

fn default_api_version() -> u32 {
    41
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            version: default_api_version(),
            token: None,
        }
    }
}

pub fn load_config(config_path: Option<&PathBuf>) -> Result<Config, config::ConfigError> {
    let mut config_vec = vec![];

    // User-provided config file
    if let Some(config_path) = config_path {
        if config_path.exists() {
            config_vec.push(config_path.clone());
        } else {
            eprintln!("Warning: Config file {config_path:?} not found.");
        }
    }

    // Default config file
    if let Ok(default_config_path) = get_config_dir().map(|d| d.join("rdjobs.toml")) {
        if default_config_path.exists() {
            config_vec.push(default_config_path);
        }
    }

    let settings = config::Config::builder();
    let settings = config_vec.iter().fold(settings, |s, path| {
        s.add_source(config::File::from(path.as_path()))
    });

    settings
        .add_source(
            config::Environment::with_prefix("RDJOBS")
                .separator("_")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}
