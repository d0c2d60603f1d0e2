//! Configuration module for the lineage analyzer.
//!
//! Provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `FLOWLENS_` and use double
//! underscores to separate nested levels:
//! - `FLOWLENS_ANALYSIS__INTERPROCEDURAL=false` sets `analysis.interprocedural`
//! - `FLOWLENS_EXPORT__OUTPUT=out.json` sets `export.output`

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Analysis behavior
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Language-specific settings
    #[serde(default)]
    pub languages: HashMap<String, LanguageConfig>,

    /// Graph export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Logging verbosity
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AnalysisConfig {
    /// Markers that identify a project root (spec §6): presence of any one
    /// of these files in a directory marks it as a package root.
    #[serde(default = "default_root_markers")]
    pub project_root_markers: Vec<String>,

    /// Glob patterns excluded from the file walk, on top of .gitignore.
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,

    /// Whether CALL edges additionally synthesize an interprocedural XFER
    /// edge from each argument identifier to the matching parameter
    /// identifier of the callee's `FuncSummary` (spec §4.3, §9).
    #[serde(default = "default_true")]
    pub interprocedural: bool,

    /// Number of parallel worker threads used to analyze packages.
    /// Defaults to the available parallelism, same as the teacher's
    /// indexing thread pool.
    #[serde(default = "default_parallel_threads")]
    pub parallel_threads: usize,

    /// Upper bound on files analyzed in one run; `0` means unbounded.
    #[serde(default)]
    pub max_files: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LanguageConfig {
    /// Whether this language is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// File extensions for this language
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Per-module log level overrides, read by [`crate::logging`].
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub default: String,
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExportConfig {
    /// Output path for the exported IR graph.
    #[serde(default = "default_export_output")]
    pub output: PathBuf,

    /// Service name stamped onto every IR node/edge (spec §3's
    /// `(language, service)` qualification).
    #[serde(default = "default_service_name")]
    pub service: String,
}

fn default_version() -> u32 {
    1
}
fn default_true() -> bool {
    true
}
fn default_parallel_threads() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}
fn default_root_markers() -> Vec<String> {
    vec!["go.mod".to_string(), "pom.xml".to_string(), "package.json".to_string()]
}
fn default_ignore_patterns() -> Vec<String> {
    vec![
        "vendor/**".to_string(),
        "target/**".to_string(),
        "node_modules/**".to_string(),
        ".git/**".to_string(),
    ]
}
fn default_export_output() -> PathBuf {
    PathBuf::from("flowlens-graph.json")
}
fn default_service_name() -> String {
    "default".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            analysis: AnalysisConfig::default(),
            languages: default_languages(),
            export: ExportConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            project_root_markers: default_root_markers(),
            ignore_patterns: default_ignore_patterns(),
            interprocedural: true,
            parallel_threads: default_parallel_threads(),
            max_files: 0,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: default_export_output(),
            service: default_service_name(),
        }
    }
}

fn default_languages() -> HashMap<String, LanguageConfig> {
    let mut langs = HashMap::new();
    langs.insert(
        "go".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["go".to_string()],
        },
    );
    langs.insert(
        "java".to_string(),
        LanguageConfig {
            enabled: true,
            extensions: vec!["java".to_string()],
        },
    );
    langs
}

impl Settings {
    /// Loads configuration from all sources: defaults, then
    /// `flowlens.toml` discovered by walking up from the current
    /// directory, then `FLOWLENS_`-prefixed environment variables.
    pub fn load() -> Result<Self, figment::Error> {
        let config_path = Self::find_config_file().unwrap_or_else(|| PathBuf::from("flowlens.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::prefixed("FLOWLENS_").map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
    }

    /// Loads configuration from a specific file, still layered over
    /// defaults and environment overrides. Used by tests and by `--config`.
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(
                Env::prefixed("FLOWLENS_").map(|key| key.as_str().to_lowercase().replace("__", ".").into()),
            )
            .extract()
    }

    /// Searches `flowlens.toml` from the current directory up to the
    /// filesystem root.
    fn find_config_file() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        for ancestor in current.ancestors() {
            let candidate = ancestor.join("flowlens.toml");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    /// Writes the current settings to `path`, creating parent directories
    /// as needed.
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Writes a default `flowlens.toml` at `path`, refusing to overwrite
    /// an existing file unless `force` is set.
    pub fn init_config_file(path: impl AsRef<std::path::Path>, force: bool) -> Result<(), Box<dyn std::error::Error>> {
        let path = path.as_ref();
        if !force && path.exists() {
            return Err("configuration file already exists, use --force to overwrite".into());
        }
        Settings::default().save(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_enable_both_shipped_languages() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.languages["go"].enabled);
        assert!(settings.languages["java"].enabled);
        assert!(settings.analysis.interprocedural);
    }

    #[test]
    fn load_from_toml_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("flowlens.toml");

        let toml_content = r#"
version = 2

[analysis]
interprocedural = false
max_files = 500

[export]
service = "checkout-svc"

[languages.go]
enabled = false
"#;
        fs::write(&config_path, toml_content).unwrap();

        let settings = Settings::load_from(&config_path).unwrap();
        assert_eq!(settings.version, 2);
        assert!(!settings.analysis.interprocedural);
        assert_eq!(settings.analysis.max_files, 500);
        assert_eq!(settings.export.service, "checkout-svc");
        assert!(!settings.languages["go"].enabled);
        // Untouched default survives alongside overrides.
        assert!(settings.languages["java"].enabled);
    }

    #[test]
    fn save_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("flowlens.toml");

        let mut settings = Settings::default();
        settings.analysis.max_files = 42;
        settings.export.service = "orders".to_string();
        settings.save(&config_path).unwrap();

        let loaded = Settings::load_from(&config_path).unwrap();
        assert_eq!(loaded.analysis.max_files, 42);
        assert_eq!(loaded.export.service, "orders");
    }

    #[test]
    fn env_override_takes_precedence_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("flowlens.toml");
        fs::write(&config_path, "[export]\nservice = \"from-file\"\n").unwrap();

        unsafe {
            std::env::set_var("FLOWLENS_EXPORT__SERVICE", "from-env");
        }
        let settings = Settings::load_from(&config_path).unwrap();
        unsafe {
            std::env::remove_var("FLOWLENS_EXPORT__SERVICE");
        }

        assert_eq!(settings.export.service, "from-env");
    }

    #[test]
    fn init_config_file_refuses_overwrite_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("flowlens.toml");
        Settings::init_config_file(&path, false).unwrap();
        assert!(Settings::init_config_file(&path, false).is_err());
        assert!(Settings::init_config_file(&path, true).is_ok());
    }
}
