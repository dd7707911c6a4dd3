use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::grammar::loader::DEFAULT_GRAMMAR;
use crate::ui::theme::DEFAULT_THEME;

pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "vi"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_grammar")]
    pub grammar: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default = "default_show_hint_by_default")]
    pub show_hint_by_default: bool,
    #[serde(default = "default_show_grammar_panel")]
    pub show_grammar_panel: bool,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}
fn default_grammar() -> String {
    DEFAULT_GRAMMAR.to_string()
}
fn default_language() -> String {
    "en".to_string()
}
fn default_feedback_delay_ms() -> u64 {
    1000
}
fn default_show_hint_by_default() -> bool {
    false
}
fn default_show_grammar_panel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            grammar: default_grammar(),
            language: default_language(),
            feedback_delay_ms: default_feedback_delay_ms(),
            show_hint_by_default: default_show_hint_by_default(),
            show_grammar_panel: default_show_grammar_panel(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Stores a new theme choice in the config file. Only `theme` changes;
    /// values overridden on the command line stay out of the file.
    pub fn save_theme(theme: &str) -> Result<()> {
        Self::save_theme_to(&Self::config_path(), theme)
    }

    pub fn save_theme_to(path: &Path, theme: &str) -> Result<()> {
        let mut on_disk = Self::load_from(path)?;
        on_disk.theme = theme.to_string();
        on_disk.save_to(path)
    }

    fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("earley-drill")
            .join("config.toml")
    }

    pub fn feedback_delay(&self) -> Duration {
        Duration::from_millis(self.feedback_delay_ms)
    }

    /// Resets `grammar` to the default when it names no known grammar.
    /// Call after deserialization so a deleted user grammar does not keep
    /// the drill from starting.
    pub fn normalize_grammar(&mut self, known: &[String]) {
        if !known.iter().any(|g| *g == self.grammar) {
            self.grammar = default_grammar();
        }
    }

    pub fn normalize_language(&mut self) {
        if !SUPPORTED_LANGUAGES.contains(&self.language.as_str()) {
            self.language = default_language();
        }
    }
}
