use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
#[cfg(not(target_arch = "wasm32"))]
use std::fs;
#[cfg(not(target_arch = "wasm32"))]
use std::path::Path;

use crate::core::model::{FormState, GenerationOptions, Section, DEFAULT_AUDIENCE, DEFAULT_TONE};
use crate::services::renderer::LeadingContent;

#[cfg(not(target_arch = "wasm32"))]
const CONFIG_FILE: &str = "config.yml";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default = "default_data_folder")]
    pub data_folder: String,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub form: FormConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RenderConfig {
    /// Heading level that starts a new result block.
    #[serde(default = "default_heading_level")]
    pub heading_level: u8,
    #[serde(default)]
    pub leading_content: LeadingContent,
    #[serde(default = "default_true")]
    pub key_metrics: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FormConfig {
    #[serde(default = "default_tones")]
    pub tones: Vec<String>,
    #[serde(default = "default_audiences")]
    pub audiences: Vec<String>,
    #[serde(default = "default_sections")]
    pub default_sections: Vec<Section>,
}

fn default_data_folder() -> String {
    "data".to_string()
}
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_timeout_seconds() -> u64 {
    120
}
fn default_heading_level() -> u8 {
    2
}
fn default_true() -> bool {
    true
}
fn default_tones() -> Vec<String> {
    vec![
        DEFAULT_TONE.to_string(),
        "Casual".to_string(),
        "Enthusiastic".to_string(),
        "Witty".to_string(),
    ]
}
fn default_audiences() -> Vec<String> {
    vec![
        DEFAULT_AUDIENCE.to_string(),
        "Customers".to_string(),
        "Partners".to_string(),
        "General Public".to_string(),
    ]
}
fn default_sections() -> Vec<Section> {
    vec![Section::ElevatorPitch, Section::Tagline]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data_folder: default_data_folder(),
            render: RenderConfig::default(),
            form: FormConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            heading_level: default_heading_level(),
            leading_content: LeadingContent::default(),
            key_metrics: default_true(),
        }
    }
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            tones: default_tones(),
            audiences: default_audiences(),
            default_sections: default_sections(),
        }
    }
}

impl FormConfig {
    /// Form contents before the user touches anything.
    pub fn initial_form(&self) -> FormState {
        FormState {
            idea: String::new(),
            options: GenerationOptions {
                tone: self
                    .tones
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_TONE.to_string()),
                audience: self
                    .audiences
                    .first()
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
                sections: self.default_sections.iter().copied().collect(),
            },
        }
    }
}

impl Config {
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml_ng::from_str(content).context("Failed to parse config.yml")
    }

    /// Loads `config.yml` from the working directory. When it is absent the
    /// defaults are written there so they can be edited.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self> {
        Self::load_or_init(Path::new(CONFIG_FILE))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }

        let config = Self::default();
        match config.save_to(path) {
            Ok(()) => log::info!("{} not found, wrote defaults", path.display()),
            Err(e) => log::warn!("{} not found, using defaults: {:#}", path.display(), e),
        }
        Ok(config)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let config = Config::from_yaml(
            "server:\n  base_url: https://pitch.example.com\nrender:\n  leading_content: drop\n",
        )?;

        assert_eq!(config.server.base_url, "https://pitch.example.com");
        assert_eq!(config.server.timeout_seconds, 120);
        assert_eq!(config.render.leading_content, LeadingContent::Drop);
        assert_eq!(config.render.heading_level, 2);
        assert!(config.render.key_metrics);
        assert_eq!(config.data_folder, "data");
        Ok(())
    }

    #[test]
    fn test_missing_file_yields_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let config = Config::load_from(&temp_dir.path().join("config.yml"))?;
        assert_eq!(config, Config::default());
        Ok(())
    }

    #[test]
    fn test_missing_file_is_written_with_defaults() -> Result<()> {
        let temp_dir = tempfile::tempdir()?;
        let path = temp_dir.path().join("config.yml");

        let config = Config::load_or_init(&path)?;
        assert_eq!(config, Config::default());
        assert!(path.exists());

        fs::write(
            &path,
            fs::read_to_string(&path)?.replace("http://127.0.0.1:5000", "https://pitch.example.com"),
        )?;
        let edited = Config::load_or_init(&path)?;
        assert_eq!(edited.server.base_url, "https://pitch.example.com");
        assert_eq!(edited.form, Config::default().form);
        Ok(())
    }

    #[test]
    fn test_unknown_section_is_rejected() {
        let result = Config::from_yaml("form:\n  default_sections: [problem]\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_initial_form_uses_first_choices() {
        let form = FormConfig::default().initial_form();
        assert_eq!(form.idea, "");
        assert_eq!(form.options.tone, "Professional");
        assert_eq!(form.options.audience, "Investors");
        assert_eq!(
            form.options.sections.into_iter().collect::<Vec<_>>(),
            vec![Section::ElevatorPitch, Section::Tagline]
        );
    }
}
