use anyhow::{Context, Result};
use game_discovery::Platform;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG: &str = include_str!("../discover.toml");
const CONFIG_FILE: &str = "discover.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub search: Search,
    #[serde(default)]
    pub cache: Cache,
}

impl Config {
    /// Loads `path`, or `discover.toml` from the working directory, or the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_str = match path {
            Some(path) => read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None if std::fs::exists(CONFIG_FILE)? => read_to_string(CONFIG_FILE)?,
            None => DEFAULT_CONFIG.to_string(),
        };
        Self::parse(&config_str)
    }

    pub fn parse(config_str: &str) -> Result<Self> {
        toml::from_str(config_str).context("Invalid discovery config")
    }
}

#[derive(Debug, Deserialize)]
pub struct Search {
    #[serde(default)]
    pub game: String,
    #[serde(default)]
    pub exe: String,
    #[serde(default)]
    pub depth: usize,
    #[serde(default = "all_platforms")]
    pub platforms: Vec<String>,
}

impl Search {
    /// Platforms to search in the configured order, each at most once.
    pub fn platforms(&self) -> Result<Vec<Platform>> {
        let mut platforms: Vec<Platform> = Vec::new();
        for name in &self.platforms {
            let parsed: Platform = name.parse()?;
            for platform in parsed.unique_flags() {
                if !platforms.contains(&platform) {
                    platforms.push(platform);
                }
            }
        }
        Ok(platforms)
    }
}

fn all_platforms() -> Vec<String> {
    vec!["all".to_string()]
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            enabled: true,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("obj")
}

fn enabled() -> bool {
    true
}
