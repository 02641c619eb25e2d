//! Configuration management for Lucid.
//!
//! Parses `lucid.toml` with serde and discovers the file in the current
//! directory or any parent. CLI flags are layered on top through
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String settings support `${VAR}` and `${VAR:-default}`. Expanded fields:
//! - `default_id`
//! - `storage.root`
//! - `modules.url`
//! - `book.templates.*`

mod expand;

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "lucid.toml";

/// CLI settings that override configuration file values.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override the storage root directory.
    pub root: Option<PathBuf>,
    /// Override the error mode.
    pub error_mode: Option<ErrorMode>,
    /// Override the default page id.
    pub default_id: Option<String>,
}

/// How failures during expansion are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Any reported failure halts the render.
    #[default]
    Strict,
    /// Failures are logged and the failing branch is skipped.
    Lenient,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Error handling mode.
    pub error_mode: ErrorMode,
    /// Page shown when the location carries no id.
    pub default_id: Option<String>,
    /// Storage section as written in the file.
    storage: StorageConfigRaw,
    /// Engine limits.
    pub engine: EngineConfig,
    /// Book module settings.
    pub book: BookConfig,
    /// Modules in load order.
    pub modules: Vec<ModuleConfig>,

    /// Resolved storage configuration (set after loading).
    #[serde(skip)]
    pub storage_resolved: StorageConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StorageConfigRaw {
    root: Option<String>,
}

/// Resolved storage configuration.
#[derive(Debug, Default)]
pub struct StorageConfig {
    /// Directory fragment URLs are resolved against.
    pub root: PathBuf,
}

/// Block expansion engine limits.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum nesting of expansion steps before a branch is abandoned.
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

/// Book module settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BookConfig {
    /// Maximum characters of body text in a search snippet.
    pub snippet_length: usize,
    /// Page template URLs per node kind.
    pub templates: BookTemplates,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            snippet_length: 500,
            templates: BookTemplates::default(),
        }
    }
}

/// Template URLs for the three book page kinds.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BookTemplates {
    pub book: String,
    pub section: String,
    pub page: String,
}

impl Default for BookTemplates {
    fn default() -> Self {
        Self {
            book: "modules/book/templates/book_page.html".to_owned(),
            section: "modules/book/templates/section_page.html".to_owned(),
            page: "modules/book/templates/page_page.html".to_owned(),
        }
    }
}

/// A module entry in `[[modules]]`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ModuleConfig {
    /// Module name (`core`, `book`, `menu`, `template`).
    pub name: String,
    /// Disabled modules are skipped during load.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Source database the module loads at startup, if any.
    #[serde(default)]
    pub url: Option<String>,
}

fn default_enabled() -> bool {
    true
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`storage.root`").
        field: String,
        /// Error message (e.g., "${`SITE_ROOT`} not set").
        message: String,
    },
}

fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `lucid.toml` in the current directory and its parents, falling
    /// back to defaults rooted at the working directory.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Parse configuration from a TOML string, resolving paths against `base`.
    pub fn from_toml(content: &str, base: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.expand_env_vars()?;
        config.resolve_paths(base);
        config.validate()?;
        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(root) = &settings.root {
            self.storage_resolved.root.clone_from(root);
        }
        if let Some(mode) = settings.error_mode {
            self.error_mode = mode;
        }
        if let Some(id) = &settings.default_id {
            self.default_id = Some(id.clone());
        }
    }

    /// Module entries that are enabled, in declaration order.
    ///
    /// An empty `[[modules]]` list means every built-in module with no
    /// source database.
    pub fn enabled_modules(&self) -> Vec<ModuleConfig> {
        if self.modules.is_empty() {
            return ["core", "book", "menu", "template"]
                .into_iter()
                .map(|name| ModuleConfig {
                    name: name.to_owned(),
                    enabled: true,
                    url: None,
                })
                .collect();
        }
        self.modules.iter().filter(|m| m.enabled).cloned().collect()
    }

    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        cwd.ancestors()
            .map(|dir| dir.join(CONFIG_FILENAME))
            .find(|candidate| candidate.is_file())
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            error_mode: ErrorMode::default(),
            default_id: None,
            storage: StorageConfigRaw::default(),
            engine: EngineConfig::default(),
            book: BookConfig::default(),
            modules: Vec::new(),
            storage_resolved: StorageConfig {
                root: base.join("site"),
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config_dir = path.parent().unwrap_or(Path::new("."));
        let mut config = Self::from_toml(&content, config_dir)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(id) = &self.default_id {
            require_non_empty(id, "default_id")?;
        }
        if self.engine.max_depth == 0 {
            return Err(ConfigError::Validation(
                "engine.max_depth must be greater than 0".to_owned(),
            ));
        }
        if self.book.snippet_length == 0 {
            return Err(ConfigError::Validation(
                "book.snippet_length must be greater than 0".to_owned(),
            ));
        }
        self.validate_modules()
    }

    fn validate_modules(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            require_non_empty(&module.name, "modules.name")?;
            if !seen.insert(module.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "module '{}' is listed twice",
                    module.name
                )));
            }
            if let Some(url) = &module.url {
                require_non_empty(url, "modules.url")?;
            }
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_opt(&mut self.default_id, "default_id")?;
        expand::expand_opt(&mut self.storage.root, "storage.root")?;
        for module in &mut self.modules {
            expand::expand_opt(&mut module.url, "modules.url")?;
        }
        let templates = &mut self.book.templates;
        templates.book = expand::expand_env(&templates.book, "book.templates.book")?;
        templates.section = expand::expand_env(&templates.section, "book.templates.section")?;
        templates.page = expand::expand_env(&templates.page, "book.templates.page")?;
        Ok(())
    }

    fn resolve_paths(&mut self, config_dir: &Path) {
        self.storage_resolved = StorageConfig {
            root: config_dir.join(self.storage.root.as_deref().unwrap_or("site")),
        };
    }
}
