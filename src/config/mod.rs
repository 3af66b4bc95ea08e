//! Configuration management for `issue_metrics`.
//!
//! Configuration sources and precedence (highest wins):
//! 1. CLI overrides
//! 2. Environment variables (`ISSUE_METRICS_*`)
//! 3. Project config (`issue-metrics.yaml`, or the file given with `--config`)
//! 4. User config (`~/.config/issue-metrics/config.yaml`)
//! 5. Defaults
//!
//! Every layer is a flat string map with normalized keys (lowercase, `-`
//! separated, nested YAML joined with `.`). Alias keys such as
//! `cutoffs.distribution` or `issues-file` are folded onto their canonical
//! name as each layer is built, so precedence holds across spellings. Typed
//! values are parsed once by [`Settings::from_layer`].

use crate::aggregate::{CATEGORY_TOP_K, DEFAULT_CREATOR_LIMIT, DEFAULT_RANKING_LIMIT, LABEL_TOP_K};
use crate::bucketing::CutoffFraction;
use crate::error::{MetricsError, Result};
use crate::model::DEFAULT_LABEL_SEPARATOR;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Project config filename looked up in the working directory.
pub const PROJECT_CONFIG_FILENAME: &str = "issue-metrics.yaml";
/// Prefix of recognized environment variables.
pub const ENV_PREFIX: &str = "ISSUE_METRICS_";

/// Alternate spellings and their canonical key.
const KEY_ALIASES: &[(&str, &str)] = &[
    ("issues-file", "data-path"),
    ("issues-path", "data-path"),
    ("data-file", "data-path"),
    ("labels.separator", "label-separator"),
    ("cutoffs.distribution", "distribution-cutoff"),
    ("cutoffs.census", "census-cutoff"),
    ("trend.category-top-k", "category-top-k"),
    ("trend.label-top-k", "label-top-k"),
];

/// One configuration source as normalized key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    /// Set `key` to `value`, stored under its normalized canonical name.
    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(canonical_key(key), value.into());
    }

    /// Insert pairs from one source. Within a source the canonical spelling
    /// beats an alias for the same key.
    fn extend_from_source<I>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut pairs: Vec<(String, String)> = pairs.into_iter().collect();
        pairs.sort_by_key(|(key, _)| !is_alias(key));
        for (key, value) in pairs {
            self.insert(&key, value);
        }
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge multiple layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// Build a layer from a YAML file path. Missing files return empty config.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|err| {
            MetricsError::Config(format!("cannot read {}: {err}", path.display()))
        })?;
        let layer = Self::from_yaml_str(&contents)?;
        debug!(path = %path.display(), keys = layer.values.len(), "Loaded config file");
        Ok(layer)
    }

    /// Build a layer from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Yaml`] if the text is not valid YAML.
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(contents)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        layer.extend_from_source(flat);
        Ok(layer)
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(env::vars())
    }

    /// Build a layer from `ISSUE_METRICS_*` pairs; other names are ignored.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        layer.extend_from_source(vars.into_iter().filter_map(|(key, value)| {
            key.strip_prefix(ENV_PREFIX)
                .filter(|stripped| !stripped.is_empty())
                .map(|stripped| (stripped.to_string(), value))
        }));
        layer
    }

    /// Non-blank value for `key`, looked up by its canonical name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(&canonical_key(key))
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub data_path: Option<PathBuf>,
    pub label_separator: Option<String>,
    pub category: Option<String>,
    pub distribution_cutoff: Option<f64>,
    pub census_cutoff: Option<f64>,
    pub category_top_k: Option<usize>,
    pub label_top_k: Option<usize>,
    pub ranking_limit: Option<usize>,
    pub creator_limit: Option<usize>,
    pub year: Option<String>,
    pub user: Option<String>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();

        if let Some(path) = &self.data_path {
            layer.insert("data-path", path.to_string_lossy());
        }
        if let Some(separator) = &self.label_separator {
            layer.insert("label-separator", separator.clone());
        }
        if let Some(category) = &self.category {
            layer.insert("category", category.clone());
        }
        if let Some(cutoff) = self.distribution_cutoff {
            layer.insert("distribution-cutoff", cutoff.to_string());
        }
        if let Some(cutoff) = self.census_cutoff {
            layer.insert("census-cutoff", cutoff.to_string());
        }
        if let Some(k) = self.category_top_k {
            layer.insert("category-top-k", k.to_string());
        }
        if let Some(k) = self.label_top_k {
            layer.insert("label-top-k", k.to_string());
        }
        if let Some(limit) = self.ranking_limit {
            layer.insert("ranking-limit", limit.to_string());
        }
        if let Some(limit) = self.creator_limit {
            layer.insert("creator-limit", limit.to_string());
        }
        if let Some(year) = &self.year {
            layer.insert("year", year.clone());
        }
        if let Some(user) = &self.user {
            layer.insert("user", user.clone());
        }

        layer
    }
}

/// Load the project config: `explicit` if given, else `issue-metrics.yaml`
/// in `project_dir`.
///
/// # Errors
///
/// Returns an error if an explicitly named file is missing, or if the file
/// exists but cannot be read or parsed.
pub fn load_project_config(project_dir: &Path, explicit: Option<&Path>) -> Result<ConfigLayer> {
    match explicit {
        Some(path) if !path.exists() => Err(MetricsError::Config(format!(
            "config file {} does not exist",
            path.display()
        ))),
        Some(path) => ConfigLayer::from_yaml(path),
        None => ConfigLayer::from_yaml(&project_dir.join(PROJECT_CONFIG_FILENAME)),
    }
}

/// Load user config (`~/.config/issue-metrics/config.yaml`).
///
/// An unset `HOME` yields an empty layer.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<ConfigLayer> {
    let Ok(home) = env::var("HOME") else {
        return Ok(ConfigLayer::default());
    };
    let path = Path::new(&home)
        .join(".config")
        .join("issue-metrics")
        .join("config.yaml");
    ConfigLayer::from_yaml(&path)
}

/// Default config layer (lowest precedence).
#[must_use]
pub fn default_config_layer() -> ConfigLayer {
    let mut layer = ConfigLayer::default();
    layer.insert("label-separator", DEFAULT_LABEL_SEPARATOR);
    layer.insert(
        "distribution-cutoff",
        CutoffFraction::DISTRIBUTION.to_string(),
    );
    layer.insert("census-cutoff", CutoffFraction::CENSUS.to_string());
    layer.insert("category-top-k", CATEGORY_TOP_K.to_string());
    layer.insert("label-top-k", LABEL_TOP_K.to_string());
    layer.insert("ranking-limit", DEFAULT_RANKING_LIMIT.to_string());
    layer.insert("creator-limit", DEFAULT_CREATOR_LIMIT.to_string());
    layer
}

/// Load configuration with the full precedence order.
///
/// # Errors
///
/// Returns an error if any config file cannot be read or parsed.
pub fn load_config(
    project_dir: &Path,
    explicit_config: Option<&Path>,
    cli: &CliOverrides,
) -> Result<ConfigLayer> {
    let defaults = default_config_layer();
    let user = load_user_config()?;
    let project = load_project_config(project_dir, explicit_config)?;
    let env_layer = ConfigLayer::from_env();
    let cli_layer = cli.as_layer();

    Ok(ConfigLayer::merge_layers(&[
        defaults, user, project, env_layer, cli_layer,
    ]))
}

/// Typed configuration used by the analyses.
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct Settings {
    pub data_path: Option<PathBuf>,
    pub label_separator: String,
    pub category: Option<String>,
    pub distribution_cutoff: CutoffFraction,
    pub census_cutoff: CutoffFraction,
    pub category_top_k: usize,
    pub label_top_k: usize,
    pub ranking_limit: usize,
    pub creator_limit: usize,
    pub year: Option<String>,
    pub user: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_path: None,
            label_separator: DEFAULT_LABEL_SEPARATOR.to_string(),
            category: None,
            distribution_cutoff: CutoffFraction::DISTRIBUTION,
            census_cutoff: CutoffFraction::CENSUS,
            category_top_k: CATEGORY_TOP_K,
            label_top_k: LABEL_TOP_K,
            ranking_limit: DEFAULT_RANKING_LIMIT,
            creator_limit: DEFAULT_CREATOR_LIMIT,
            year: None,
            user: None,
        }
    }
}

impl Settings {
    /// Parse typed settings from a merged layer.
    ///
    /// Keys absent from the layer keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Config`] for an empty label separator, a
    /// cutoff outside (0, 1), or a count that is not a positive integer.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = Self::default();

        let label_separator = match layer.values.get("label-separator") {
            Some(value) if value.is_empty() => {
                return Err(MetricsError::Config(
                    "label-separator must not be empty".to_string(),
                ));
            }
            Some(value) => value.clone(),
            None => defaults.label_separator,
        };

        Ok(Self {
            data_path: layer.get("data-path").map(PathBuf::from),
            label_separator,
            category: owned(layer.get("category")),
            distribution_cutoff: parse_cutoff(layer, "distribution-cutoff")?
                .unwrap_or(defaults.distribution_cutoff),
            census_cutoff: parse_cutoff(layer, "census-cutoff")?
                .unwrap_or(defaults.census_cutoff),
            category_top_k: parse_count(layer, "category-top-k")?
                .unwrap_or(defaults.category_top_k),
            label_top_k: parse_count(layer, "label-top-k")?.unwrap_or(defaults.label_top_k),
            ranking_limit: parse_count(layer, "ranking-limit")?
                .unwrap_or(defaults.ranking_limit),
            creator_limit: parse_count(layer, "creator-limit")?
                .unwrap_or(defaults.creator_limit),
            year: owned(layer.get("year")),
            user: owned(layer.get("user")),
        })
    }

    /// The snapshot path.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::MissingParameter`] if no source set it.
    pub fn require_data_path(&self) -> Result<&Path> {
        self.data_path
            .as_deref()
            .ok_or_else(|| MetricsError::MissingParameter {
                name: "data-path",
                valid: Vec::new(),
            })
    }
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

fn parse_cutoff(layer: &ConfigLayer, key: &str) -> Result<Option<CutoffFraction>> {
    layer
        .get(key)
        .map(|raw| {
            raw.parse::<CutoffFraction>().map_err(|_| {
                MetricsError::Config(format!(
                    "{key} must be a fraction strictly between 0 and 1, got '{raw}'"
                ))
            })
        })
        .transpose()
}

fn parse_count(layer: &ConfigLayer, key: &str) -> Result<Option<usize>> {
    layer
        .get(key)
        .map(|raw| match raw.trim().parse::<usize>() {
            Ok(value) if value > 0 => Ok(value),
            _ => Err(MetricsError::Config(format!(
                "{key} must be a positive integer, got '{raw}'"
            ))),
        })
        .transpose()
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn is_alias(key: &str) -> bool {
    let normalized = normalize_key(key);
    KEY_ALIASES.iter().any(|(alias, _)| *alias == normalized)
}

fn canonical_key(key: &str) -> String {
    let normalized = normalize_key(key);
    KEY_ALIASES
        .iter()
        .find(|(alias, _)| *alias == normalized)
        .map_or(normalized, |(_, canonical)| (*canonical).to_string())
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn layer(pairs: &[(&str, &str)]) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        for (key, value) in pairs {
            layer.insert(key, *value);
        }
        layer
    }

    #[test]
    fn merge_precedence_order() {
        let defaults = default_config_layer();
        let user = layer(&[("category", "user")]);
        let project = layer(&[("category", "project")]);
        let env_layer = layer(&[("category", "env")]);
        let cli = CliOverrides {
            category: Some("cli".to_string()),
            ..CliOverrides::default()
        }
        .as_layer();

        let merged = ConfigLayer::merge_layers(&[defaults, user, project, env_layer, cli]);
        assert_eq!(merged.get("category"), Some("cli"));
        assert_eq!(merged.get("label-separator"), Some(":"));
    }

    #[test]
    fn yaml_is_flattened_and_normalized() {
        let yaml = r"
issues_file: data/issues.json
cutoffs:
  distribution: 0.1
  census: 0.01
Category-Top-K: 4
";
        let layer = ConfigLayer::from_yaml_str(yaml).unwrap();
        let settings = Settings::from_layer(&layer).unwrap();
        assert_eq!(settings.data_path, Some(PathBuf::from("data/issues.json")));
        assert!((settings.distribution_cutoff.value() - 0.1).abs() < 1e-12);
        assert!((settings.census_cutoff.value() - 0.01).abs() < 1e-12);
        assert_eq!(settings.category_top_k, 4);
        assert_eq!(settings.label_top_k, LABEL_TOP_K);
    }

    #[test]
    fn nested_aliases_override_defaults() {
        let project =
            ConfigLayer::from_yaml_str("cutoffs:\n  distribution: 0.1\nlabels:\n  separator: /\n")
                .unwrap();
        let merged = ConfigLayer::merge_layers(&[default_config_layer(), project]);
        let settings = Settings::from_layer(&merged).unwrap();
        assert!((settings.distribution_cutoff.value() - 0.1).abs() < 1e-12);
        assert_eq!(settings.label_separator, "/");
        assert_eq!(settings.census_cutoff, CutoffFraction::CENSUS);
    }

    #[test]
    fn env_alias_beats_project_canonical_key() {
        let project = ConfigLayer::from_yaml_str("data-path: project.json\n").unwrap();
        let env_layer = ConfigLayer::from_vars(vec![(
            "ISSUE_METRICS_ISSUES_FILE".to_string(),
            "env.json".to_string(),
        )]);
        let merged = ConfigLayer::merge_layers(&[default_config_layer(), project, env_layer]);
        let settings = Settings::from_layer(&merged).unwrap();
        assert_eq!(settings.data_path, Some(PathBuf::from("env.json")));
    }

    #[test]
    fn canonical_spelling_wins_within_one_file() {
        let layer =
            ConfigLayer::from_yaml_str("issues_file: alias.json\ndata-path: canonical.json\n")
                .unwrap();
        assert_eq!(layer.get("data-path"), Some("canonical.json"));
        assert_eq!(layer.get("issues-file"), Some("canonical.json"));
        assert_eq!(layer.values.len(), 1);
    }

    #[test]
    fn unreadable_config_is_config_error() {
        let temp = TempDir::new().unwrap();
        let dir_as_file = temp.path().join(PROJECT_CONFIG_FILENAME);
        fs::create_dir(&dir_as_file).unwrap();
        let err = ConfigLayer::from_yaml(&dir_as_file).unwrap_err();
        assert!(matches!(err, MetricsError::Config(_)));
        assert_eq!(err.code().exit_code(), 1);
    }

    #[test]
    fn env_vars_are_prefixed() {
        let layer = ConfigLayer::from_vars(vec![
            ("ISSUE_METRICS_DATA_PATH".to_string(), "/tmp/x.json".to_string()),
            ("ISSUE_METRICS_LABEL_TOP_K".to_string(), "3".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);
        assert_eq!(layer.values.len(), 2);
        let settings = Settings::from_layer(&layer).unwrap();
        assert_eq!(settings.require_data_path().unwrap(), Path::new("/tmp/x.json"));
        assert_eq!(settings.label_top_k, 3);
    }

    #[test]
    fn malformed_values_are_config_errors() {
        for (key, value) in [
            ("distribution-cutoff", "1.5"),
            ("census-cutoff", "abc"),
            ("label-top-k", "0"),
            ("ranking-limit", "-1"),
            ("label-separator", ""),
        ] {
            let err = Settings::from_layer(&layer(&[(key, value)])).unwrap_err();
            assert!(matches!(err, MetricsError::Config(_)), "{key}={value}");
        }
    }

    #[test]
    fn missing_data_path_is_reported() {
        let settings = Settings::from_layer(&default_config_layer()).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(matches!(
            settings.require_data_path(),
            Err(MetricsError::MissingParameter { name: "data-path", .. })
        ));
    }

    #[test]
    fn project_config_from_directory_or_explicit_file() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(PROJECT_CONFIG_FILENAME),
            "category: kind\n",
        )
        .unwrap();
        let other = temp.path().join("other.yaml");
        fs::write(&other, "category: area\n").unwrap();

        let from_dir = load_project_config(temp.path(), None).unwrap();
        assert_eq!(from_dir.get("category"), Some("kind"));

        let explicit = load_project_config(temp.path(), Some(&other)).unwrap();
        assert_eq!(explicit.get("category"), Some("area"));

        let missing = load_project_config(temp.path(), Some(&temp.path().join("nope.yaml")));
        assert!(matches!(missing, Err(MetricsError::Config(_))));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(PROJECT_CONFIG_FILENAME);
        fs::write(&path, "category: [unclosed\n").unwrap();
        assert!(matches!(
            ConfigLayer::from_yaml(&path),
            Err(MetricsError::Yaml(_))
        ));
    }
}
