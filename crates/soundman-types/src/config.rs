//! Shell configuration loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, SoundError};

/// Which sound backend drives the volume commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// In-process mixer state. Touches nothing outside the process.
    Memory,
    /// PipeWire through the `wpctl` command-line tool.
    #[default]
    Wpctl,
}

impl std::str::FromStr for BackendKind {
    type Err = SoundError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "wpctl" => Ok(Self::Wpctl),
            other => Err(SoundError::Config(format!("unknown backend: {other}"))),
        }
    }
}

/// Top-level shell configuration (`soundman.toml`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Prompt shown before each input line.
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Banner shown once when the interactive loop starts.
    #[serde(default = "default_intro")]
    pub intro: String,
    /// Use ANSI colors for the banner and error lines.
    #[serde(default = "yes")]
    pub color: bool,
    /// Report how long each command took.
    #[serde(default)]
    pub timing: bool,
    /// Append-only file the interactive history is loaded from and saved to.
    #[serde(default)]
    pub history_file: Option<PathBuf>,
    /// Maximum number of history entries kept in memory.
    #[serde(default = "default_max_history")]
    pub max_history: usize,
    /// Sound backend.
    #[serde(default)]
    pub backend: BackendKind,
    /// Volume change applied by `volume_up` / `volume_down`.
    #[serde(default = "default_volume_step")]
    pub volume_step: u8,
    /// Sink addressed by the `wpctl` backend.
    #[serde(default = "default_wpctl_sink")]
    pub wpctl_sink: String,
    /// Command file run once before the first interactive prompt.
    #[serde(default)]
    pub startup_script: Option<PathBuf>,
}

fn default_prompt() -> String {
    "Sound Manager> ".to_string()
}
fn default_intro() -> String {
    "Welcome to Sound Manager".to_string()
}
fn yes() -> bool {
    true
}
fn default_max_history() -> usize {
    100
}
fn default_volume_step() -> u8 {
    2
}
fn default_wpctl_sink() -> String {
    "@DEFAULT_AUDIO_SINK@".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            intro: default_intro(),
            color: true,
            timing: false,
            history_file: None,
            max_history: default_max_history(),
            backend: BackendKind::default(),
            volume_step: default_volume_step(),
            wpctl_sink: default_wpctl_sink(),
            startup_script: None,
        }
    }
}

impl ShellConfig {
    /// Parse and validate a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        log::debug!("loaded config from {}", path.display());
        Self::from_toml_str(&text)
    }

    /// Check value ranges serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.volume_step == 0 || self.volume_step > 100 {
            return Err(SoundError::Config(format!(
                "volume_step must be between 1 and 100, got {}",
                self.volume_step
            )));
        }
        if self.max_history == 0 {
            return Err(SoundError::Config(
                "max_history must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
