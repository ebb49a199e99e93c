//! Core configuration loaded from TOML.
//!
//! # Responsibility
//! - Provide defaults for every setting so an empty file is valid.
//! - Reject values the storage and listing layers cannot honor.
//!
//! # Invariants
//! - `page_size >= 1` and `preview_max_px >= 1`.
//! - `use_memory_db` and `db_path` never disagree.

use crate::picture::DEFAULT_PREVIEW_MAX_PX;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Rows per list page when the config does not say otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 15;
/// SQLite path marker for a private in-memory database.
pub const MEMORY_DB_PATH: &str = ":memory:";

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config file `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file, or `:memory:` together with `use_memory_db`.
    pub db_path: PathBuf,
    pub use_memory_db: bool,
    /// One of trace|debug|info|warn|error.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// Longest side of generated picture previews.
    pub preview_max_px: u32,
    /// Default rows per list page.
    pub page_size: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("basement.db"),
            use_memory_db: false,
            log_level: crate::logging::default_log_level().to_string(),
            log_dir: None,
            preview_max_px: DEFAULT_PREVIEW_MAX_PX,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CoreConfig {
    /// Reads and validates a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size < 1 {
            return Err(ConfigError::Invalid(format!(
                "page_size must be at least 1, got {}",
                self.page_size
            )));
        }
        if self.preview_max_px < 1 {
            return Err(ConfigError::Invalid(
                "preview_max_px must be at least 1".to_string(),
            ));
        }

        let memory_path = self.db_path == Path::new(MEMORY_DB_PATH);
        if self.use_memory_db != memory_path {
            return Err(ConfigError::Invalid(format!(
                "use_memory_db={} does not match db_path `{}`",
                self.use_memory_db,
                self.db_path.display()
            )));
        }
        if !self.use_memory_db && self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("db_path cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_PAGE_SIZE};
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn empty_document_uses_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.preview_max_px, 50);
    }

    #[test]
    fn overrides_are_applied() {
        let config = CoreConfig::from_toml_str(
            r#"
            db_path = "/var/lib/basement/inventory.db"
            log_level = "warn"
            log_dir = "/var/log/basement"
            page_size = 25
            "#,
        )
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/var/lib/basement/inventory.db"));
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/basement")));
        assert_eq!(config.page_size, 25);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let err = CoreConfig::from_toml_str("page_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(message) if message.contains("page_size")));
    }

    #[test]
    fn memory_flag_must_match_path() {
        let err = CoreConfig::from_toml_str("use_memory_db = true").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config =
            CoreConfig::from_toml_str("use_memory_db = true\ndb_path = \":memory:\"").unwrap();
        assert!(config.use_memory_db);
    }

    #[test]
    fn unknown_keys_fail_to_parse() {
        let err = CoreConfig::from_toml_str("colour = \"blue\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "preview_max_px = 64").unwrap();
        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.preview_max_px, 64);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            CoreConfig::load(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
