//! Configuration: defaults < YAML file < environment < command line

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_LOG_FILE, DEFAULT_POLL_INTERVAL_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SERVER_URL,
};

/// Command line arguments
#[derive(Parser, Debug, Default)]
#[command(name = "objectify", version, about = "Upload a video for processing and follow its progress")]
pub struct Args {
    /// Video to submit right after startup
    pub file: Option<PathBuf>,

    /// Processing server base URL
    #[arg(long, env = "OBJECTIFY_SERVER_URL")]
    pub server: Option<String>,

    /// Directory downloads are saved into
    #[arg(long, env = "OBJECTIFY_DOWNLOAD_DIR")]
    pub download_dir: Option<PathBuf>,

    /// Milliseconds between progress polls
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Give up polling after this many seconds
    #[arg(long)]
    pub max_poll_secs: Option<u64>,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Config file (default: ~/.objectify/config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub poll_interval_ms: u64,
    /// Unbounded when unset
    pub max_poll_secs: Option<u64>,
    pub request_timeout_secs: u64,
    pub download_dir: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: String::from(DEFAULT_SERVER_URL),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_secs: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

impl Config {
    /// Build the effective configuration from all layers
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Config::default(),
            },
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Overlay explicit arguments (clap has already merged env vars in)
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(server) = &args.server {
            self.server_url = server.clone();
        }
        if let Some(dir) = &args.download_dir {
            self.download_dir = dir.clone();
        }
        if let Some(ms) = args.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(secs) = args.max_poll_secs {
            self.max_poll_secs = Some(secs);
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = log_file.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.server_url)
            .with_context(|| format!("Invalid server URL {:?}", self.server_url))?;
        if self.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn max_poll(&self) -> Option<Duration> {
        self.max_poll_secs.map(Duration::from_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// `~/.objectify/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".objectify").join("config.yaml"))
}
