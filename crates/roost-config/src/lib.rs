//! Project configuration for roost modules.
//!
//! A module is described by a `roost.json` or `roost.yml` file in the
//! project root. Every field is optional at parse time; commands validate
//! the pieces they need.

pub mod files;
pub mod ignore;

// Re-export commonly used types
pub use files::{check_entry, match_files, read_pieces, MatchedFile};
pub use ignore::{default_ignore, parse_ignore, read_ignore, Ignore};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use roost_core::error::{RoostError, RoostResult};

/// Module configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlisted: Option<bool>,
    /// Globs of files to publish; when absent, the project tree is walked
    /// and filtered through the ignore rules instead
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    /// Inline ignore patterns, used when no ignore file is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore: Option<Vec<String>>,
}

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

/// Filenames probed by [`default_config`], in priority order
pub const DEFAULT_CONFIGS: [&str; 3] = ["roost.json", "roost.yaml", "roost.yml"];

/// Find the default config file in `dir`, if any
pub fn default_config(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIGS
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Config format for a given path, by extension
pub fn config_format(path: &Path) -> ConfigFormat {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("yml") | Some("yaml") => ConfigFormat::Yaml,
        _ => ConfigFormat::Json,
    }
}

/// Parse configuration text in the given format
pub fn parse_config(data: &str, format: ConfigFormat) -> RoostResult<Config> {
    match format {
        ConfigFormat::Json => serde_json::from_str(data).map_err(|e| RoostError::ConfigParse {
            message: e.to_string(),
        }),
        ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(|e| RoostError::ConfigParse {
            message: e.to_string(),
        }),
    }
}

/// Serialize configuration in the given format
pub fn serialize_config(config: &Config, format: ConfigFormat) -> RoostResult<String> {
    match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map(|mut data| {
                data.push('\n');
                data
            })
            .map_err(|e| RoostError::ConfigParse {
                message: e.to_string(),
            }),
        ConfigFormat::Yaml => serde_yaml::to_string(config).map_err(|e| RoostError::ConfigParse {
            message: e.to_string(),
        }),
    }
}

/// Read and parse the config file at `path`
pub async fn read_config(path: &Path) -> RoostResult<Config> {
    let data = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| RoostError::io(format!("failed to read {}", path.display()), e))?;
    parse_config(&data, config_format(path))
}

/// Write `config` into `dir` in the given format, returning the new path
pub async fn write_config(
    dir: &Path,
    config: &Config,
    format: ConfigFormat,
) -> RoostResult<PathBuf> {
    let path = match format {
        ConfigFormat::Json => dir.join("roost.json"),
        ConfigFormat::Yaml => dir.join("roost.yml"),
    };
    let data = serialize_config(config, format)?;
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| RoostError::io(format!("failed to write {}", path.display()), e))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            name: Some("wren".to_string()),
            entry: Some("mod.ts".to_string()),
            description: Some("tiny test module".to_string()),
            version: Some("0.2.0".to_string()),
            stable: Some(true),
            files: Some(vec!["src/**/*.ts".to_string(), "README.md".to_string()]),
            ..Default::default()
        }
    }

    #[test]
    fn test_json_round_trip() {
        let config = sample();
        let data = serialize_config(&config, ConfigFormat::Json).unwrap();
        assert_eq!(parse_config(&data, ConfigFormat::Json).unwrap(), config);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = sample();
        let data = serialize_config(&config, ConfigFormat::Yaml).unwrap();
        assert_eq!(parse_config(&data, ConfigFormat::Yaml).unwrap(), config);
    }

    #[test]
    fn test_unset_fields_are_omitted() {
        let data = serialize_config(&Config::default(), ConfigFormat::Json).unwrap();
        assert_eq!(data.trim(), "{}");
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(config_format(Path::new("roost.json")), ConfigFormat::Json);
        assert_eq!(config_format(Path::new("roost.yml")), ConfigFormat::Yaml);
        assert_eq!(config_format(Path::new("roost.yaml")), ConfigFormat::Yaml);
        assert_eq!(config_format(Path::new("odd.config")), ConfigFormat::Json);
    }

    #[test]
    fn test_default_config_discovery_order() {
        let dir = tempfile::tempdir().unwrap();
        assert!(default_config(dir.path()).is_none());

        std::fs::write(dir.path().join("roost.yml"), "name: wren\n").unwrap();
        assert_eq!(
            default_config(dir.path()).unwrap(),
            dir.path().join("roost.yml")
        );

        std::fs::write(dir.path().join("roost.json"), "{}").unwrap();
        assert_eq!(
            default_config(dir.path()).unwrap(),
            dir.path().join("roost.json")
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!(parse_config("{not json", ConfigFormat::Json).is_err());
        assert!(parse_config("[1, 2", ConfigFormat::Yaml).is_err());
    }
}
