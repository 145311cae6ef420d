use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lol.toml";

/// Contents of `lol.toml`. Top-level keys mirror the command-line flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: String,
    pub compiler: String,
    pub force: bool,
    pub biblio: String,
    pub output: String,
    pub main: String,
    pub patterns: Vec<String>,
    pub quiet: bool,
    pub verbose: bool,
    pub debug: bool,
    pub services: Services,
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw)
            .with_context(|| format!("parsing TOML: {}", path.display()))?;
        Ok(cfg)
    }

    /// Loads `user` when given, else `./lol.toml` when it exists, else defaults.
    pub fn load_or_default(user: Option<&Path>) -> Result<Self> {
        if let Some(p) = user {
            return Self::load(p);
        }
        let default = Path::new(DEFAULT_CONFIG_FILE);
        if default.exists() {
            Self::load(default)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Services {
    pub laton_url: String,
    pub ytotech_url: String,
    /// Request timeout; 0 waits as long as the service needs.
    pub timeout_seconds: u64,
}
impl Default for Services {
    fn default() -> Self {
        Self {
            laton_url: "https://texlive2020.latexonline.cc/data".into(),
            ytotech_url: "https://latex.ytotech.com/builds/sync".into(),
            timeout_seconds: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub json: bool,
    pub file_path: String,
}
