use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Editor settings. Every section has defaults so a partial file is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// TOML file with `[[reference]]` entries offered by citation autocomplete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references_path: Option<PathBuf>,
    pub placeholders: PlaceholderConfig,
    pub citation: CitationConfig,
    pub suggestion: SuggestionConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderConfig {
    pub empty_paragraph: String,
    pub empty_collapsible: String,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            empty_paragraph: "You can start writing here".to_string(),
            empty_collapsible: "Empty collapsible. Click or drop blocks inside.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Shown between references, never stored in the document.
    pub separator: String,
    /// Seeded into a new citation to start reference lookup.
    pub reference_trigger: String,
}

impl Default for CitationConfig {
    fn default() -> Self {
        Self {
            separator: "; ".to_string(),
            reference_trigger: "@".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    pub enabled: bool,
    pub pending_text: String,
    pub no_result_text: String,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pending_text: " ...".to_string(),
            no_result_text: "Sentence completion returned no result".to_string(),
        }
    }
}

/// One entry of a reference library file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ReferenceFile {
    #[serde(default, rename = "reference")]
    references: Vec<ReferenceEntry>,
}

impl EditorConfig {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: EditorConfig =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the references path
        config.references_path = config
            .references_path
            .map(|p| Self::expand_path(&p).unwrap_or(p));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/quire");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Reads the reference library named by `references_path`. Empty when
    /// no library is configured or the file does not exist.
    pub fn load_references(&self) -> Result<Vec<ReferenceEntry>, ConfigError> {
        let Some(path) = &self.references_path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
                config_path: path.clone(),
                source,
            })?;
        let file: ReferenceFile =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: path.clone(),
                source,
            })?;
        Ok(file.references)
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
