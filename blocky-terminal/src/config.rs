/// Command line and configuration file handling
use anyhow::Context;
use blocky_core::SessionConfig;
use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

const DEFAULT_FPS: u32 = 30;
const MAX_FPS: u32 = 120;

/// Which half of the scene the app starts in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Click to place flat marks
    #[default]
    Paint,
    /// Animated blocky animal
    Animal,
}

#[derive(Debug, Parser)]
#[command(name = "blocky-terminal", version, about = "Blocky paint and animal in the terminal")]
pub struct Cli {
    /// Starting mode
    #[arg(long, value_enum)]
    pub mode: Option<Mode>,

    /// Target frames per second for the animal mode
    #[arg(long)]
    pub fps: Option<u32>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write logs to this file (the terminal itself is used for drawing)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log per-frame diagnostics
    #[arg(long)]
    pub verbose: bool,
}

/// Settings after merging the file with command line overrides.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: Mode,
    pub fps: u32,
    pub session: SessionConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            fps: DEFAULT_FPS,
            session: SessionConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match &cli.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Self::parse(&text).with_context(|| format!("invalid config {}", path.display()))?
            }
            None => Self::default(),
        };

        if let Some(mode) = cli.mode {
            config.mode = mode;
        }
        if let Some(fps) = cli.fps {
            config.fps = fps;
        }
        config.fps = config.fps.clamp(1, MAX_FPS);
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
