use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Html,
    /// man(7) ROFF.
    Man,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document attributes applied to every conversion.
    pub attributes: BTreeMap<String, String>,
    pub backend: Backend,
    /// Emit body markup only.
    pub embedded: bool,
    pub max_includes: Option<usize>,
    pub column_width_precision: Option<usize>,
    /// Directory converted files are written to, instead of next to the source.
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Reads `path`; a missing file is `Ok(None)`, not an error.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(None);
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ConfigReadError {
            config_path: path.to_path_buf(),
            source,
        })?;
        let mut config: Config = toml::from_str(&text).map_err(|source| {
            ConfigError::ConfigParseError {
                config_path: path.to_path_buf(),
                source,
            }
        })?;

        // Shell variables and `~` in the output directory
        if let Some(dir) = config.output_dir.take() {
            config.output_dir = Some(Self::expand_path(&dir).unwrap_or(dir));
        }
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// `~/.config/adoc/config.toml`
    pub fn config_path() -> PathBuf {
        let home = shellexpand::tilde("~/.config/adoc");
        Path::new(home.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        shellexpand::full(&path.to_string_lossy())
            .ok()
            .map(|expanded| PathBuf::from(expanded.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        let path = path.to_string_lossy();
        assert!(!path.starts_with('~'));
        assert!(path.ends_with(".config/adoc/config.toml"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_from_path(dir.path().join("config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            "backend = \"man\"\n\n[attributes]\nproduct = \"Widget\"\n",
        )
        .unwrap();

        let config = Config::load_from_path(&config_path).unwrap().unwrap();
        assert_eq!(config.backend, Backend::Man);
        assert_eq!(config.attributes.get("product").map(String::as_str), Some("Widget"));
        assert!(!config.embedded);
        assert_eq!(config.max_includes, None);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "backend = [").unwrap();

        let result = Config::load_from_path(&config_path);
        assert!(matches!(result, Err(ConfigError::ConfigParseError { .. })));
    }

    #[test]
    fn test_unknown_backend_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "backend = \"pdf\"").unwrap();

        assert!(Config::load_from_path(&config_path).is_err());
    }

    #[test]
    fn test_output_dir_env_var_is_expanded() {
        unsafe {
            env::set_var("ADOC_TEST_OUT", "/test/env/out");
        }
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(&config_path, "output_dir = \"$ADOC_TEST_OUT/site\"").unwrap();

        let config = Config::load_from_path(&config_path).unwrap().unwrap();
        assert_eq!(config.output_dir, Some(PathBuf::from("/test/env/out/site")));

        unsafe {
            env::remove_var("ADOC_TEST_OUT");
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("nested/config.toml");
        let original = Config {
            backend: Backend::Man,
            embedded: true,
            column_width_precision: Some(2),
            ..Config::default()
        };

        original.save_to_path(&config_path).unwrap();
        let loaded = Config::load_from_path(&config_path).unwrap().unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_output_dir_tilde_expands() {
        let expanded = Config::expand_path(Path::new("~/docs/out")).unwrap();
        let expanded = expanded.to_string_lossy();
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("docs/out"));
    }
}
