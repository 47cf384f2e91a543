//! Application configuration for slrkit.
//!
//! Config lives at `./slrkit.toml` in the repository being curated.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlrError};

/// Default configuration file name, resolved against the working directory.
pub const CONFIG_FILE_NAME: &str = "slrkit.toml";

// ---------------------------------------------------------------------------
// Config structs (matching slrkit.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Locations of the dataset, category stores, and generated template.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Where the issue body is read from.
    #[serde(default)]
    pub input: InputConfig,

    /// Top-level metadata of the generated issue form.
    #[serde(default)]
    pub form: FormConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// CSV dataset the entries are appended to.
    #[serde(default = "default_dataset")]
    pub dataset: PathBuf,

    /// JSON array of known domains.
    #[serde(default = "default_domains")]
    pub domains: PathBuf,

    /// JSON array of known fault-injection types (`T<n> (<name>)`).
    #[serde(default = "default_fault_injections")]
    pub fault_injections: PathBuf,

    /// Issue-form YAML regenerated when a taxonomy grows.
    #[serde(default = "default_template")]
    pub template: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            domains: default_domains(),
            fault_injections: default_fault_injections(),
            template: default_template(),
        }
    }
}

fn default_dataset() -> PathBuf {
    "slr.csv".into()
}
fn default_domains() -> PathBuf {
    "config/domains.json".into()
}
fn default_fault_injections() -> PathBuf {
    "config/fault_injections.json".into()
}
fn default_template() -> PathBuf {
    ".github/ISSUE_TEMPLATE/add_slr_entry.yml".into()
}

/// `[input]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Env var holding the issue body (set by the CI workflow).
    #[serde(default = "default_body_env")]
    pub body_env: String,

    /// Fallback file read when the env var is unset or empty.
    #[serde(default = "default_body_file")]
    pub body_file: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            body_env: default_body_env(),
            body_file: default_body_file(),
        }
    }
}

fn default_body_env() -> String {
    "ISSUE_BODY".into()
}
fn default_body_file() -> PathBuf {
    "issue_body.txt".into()
}

/// `[form]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Form name shown in the issue template chooser.
    #[serde(default = "default_form_name")]
    pub name: String,

    /// Form description shown in the template chooser.
    #[serde(default = "default_form_description")]
    pub description: String,

    /// Pre-filled issue title.
    #[serde(default = "default_form_title")]
    pub title: String,

    /// Labels applied to issues opened with the form.
    #[serde(default = "default_form_labels")]
    pub labels: Vec<String>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            name: default_form_name(),
            description: default_form_description(),
            title: default_form_title(),
            labels: default_form_labels(),
        }
    }
}

fn default_form_name() -> String {
    "Add SLR Entry".into()
}
fn default_form_description() -> String {
    "Submit a new study for inclusion in the SLR".into()
}
fn default_form_title() -> String {
    "[SLR Entry] ".into()
}
fn default_form_labels() -> Vec<String> {
    vec!["slr-entry".into()]
}

impl PathsConfig {
    /// Resolve every relative path against `root`.
    pub fn resolved_against(&self, root: &Path) -> Self {
        Self {
            dataset: root.join(&self.dataset),
            domains: root.join(&self.domains),
            fault_injections: root.join(&self.fault_injections),
            template: root.join(&self.template),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config file in `dir` (`<dir>/slrkit.toml`).
pub fn config_file_path(dir: &Path) -> PathBuf {
    dir.join(CONFIG_FILE_NAME)
}

/// Load the config from `dir`. Returns defaults if the file does not exist.
pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let path = config_file_path(dir);

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SlrError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| SlrError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file into `dir`. Refuses to overwrite an existing one.
/// Returns the path to the created file.
pub fn init_config(dir: &Path) -> Result<PathBuf> {
    let path = config_file_path(dir);
    if path.exists() {
        return Err(SlrError::config(format!(
            "{} already exists",
            path.display()
        )));
    }

    std::fs::create_dir_all(dir).map_err(|e| SlrError::io(dir, e))?;

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SlrError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SlrError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("slrkit-config-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("slr.csv"));
        assert!(toml_str.contains("ISSUE_BODY"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.input.body_env, "ISSUE_BODY");
        assert_eq!(parsed.form.labels, vec!["slr-entry".to_string()]);
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let toml_str = r#"
[paths]
dataset = "data/papers.csv"

[form]
labels = ["slr-entry", "triage"]
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.paths.dataset, PathBuf::from("data/papers.csv"));
        assert_eq!(config.paths.domains, PathBuf::from("config/domains.json"));
        assert_eq!(config.form.labels.len(), 2);
        assert_eq!(config.form.name, "Add SLR Entry");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = temp_dir();
        let config = load_config(&dir).expect("defaults");
        assert_eq!(config.paths.dataset, PathBuf::from("slr.csv"));
    }

    #[test]
    fn init_then_load() {
        let dir = temp_dir();
        let path = init_config(&dir).expect("init");
        assert!(path.exists());

        let config = load_config(&dir).expect("load");
        assert_eq!(config.input.body_file, PathBuf::from("issue_body.txt"));

        let again = init_config(&dir);
        assert!(again.is_err());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = temp_dir();
        std::fs::write(config_file_path(&dir), "[paths\n").unwrap();
        let err = load_config(&dir).unwrap_err();
        assert!(err.to_string().starts_with("config error"));
    }

    #[test]
    fn paths_resolve_against_root() {
        let paths = PathsConfig::default().resolved_against(Path::new("/repo"));
        assert_eq!(paths.dataset, PathBuf::from("/repo/slr.csv"));
        assert_eq!(
            paths.template,
            PathBuf::from("/repo/.github/ISSUE_TEMPLATE/add_slr_entry.yml")
        );
    }
}
