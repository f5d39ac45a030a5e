use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// JSON book file. The built-in edition is used when unset.
    pub book_path: Option<String>,

    #[serde(default = "default_speech_command")]
    pub speech_command: String,

    #[serde(default = "default_speech_lang")]
    pub speech_lang: String,

    #[serde(default = "default_playback_rate")]
    pub playback_rate: f32,

    #[serde(default = "default_controls_hide_delay")]
    pub controls_hide_delay_ms: u64,

    #[serde(default = "default_page_turn_delay")]
    pub page_turn_delay_ms: u64,

    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,

    #[serde(default = "default_sound_effects")]
    pub sound_effects: bool,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("essencial-reader");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("reader.db").to_string_lossy().to_string()
}

fn default_speech_command() -> String {
    "espeak-ng".to_string()
}

fn default_speech_lang() -> String {
    "pt-BR".to_string()
}

fn default_playback_rate() -> f32 {
    1.0
}

fn default_controls_hide_delay() -> u64 {
    3000
}

fn default_page_turn_delay() -> u64 {
    300
}

fn default_settle_delay() -> u64 {
    50
}

fn default_tick_rate() -> u64 {
    50
}

fn default_sound_effects() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            book_path: None,
            speech_command: default_speech_command(),
            speech_lang: default_speech_lang(),
            playback_rate: default_playback_rate(),
            controls_hide_delay_ms: default_controls_hide_delay(),
            page_turn_delay_ms: default_page_turn_delay(),
            settle_delay_ms: default_settle_delay(),
            tick_rate_ms: default_tick_rate(),
            sound_effects: default_sound_effects(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, config_path: &std::path::Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("essencial-reader")
            .join("config.toml")
    }

    pub fn controls_hide_delay(&self) -> Duration {
        Duration::from_millis(self.controls_hide_delay_ms)
    }

    pub fn page_turn_delay(&self) -> Duration {
        Duration::from_millis(self.page_turn_delay_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms)
    }
}
