use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_max_per_term")]
    pub max_per_term: usize,

    #[serde(default = "default_max_total")]
    pub max_total: usize,

    #[serde(default = "default_skip_tags")]
    pub skip_tags: Vec<String>,

    #[serde(default = "default_skip_attribute")]
    pub skip_attribute: String,

    #[serde(default = "default_term_class")]
    pub term_class: String,

    #[serde(default = "default_flip_threshold")]
    pub flip_threshold: f64,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_max_per_term() -> usize {
    20
}

fn default_max_total() -> usize {
    1000
}

fn default_skip_tags() -> Vec<String> {
    [
        "script", "style", "noscript", "code", "pre", "textarea", "input", "kbd", "samp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_skip_attribute() -> String {
    "data-glossary-skip".to_string()
}

fn default_term_class() -> String {
    "glossary-term".to_string()
}

fn default_flip_threshold() -> f64 {
    120.0
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: None,
            max_per_term: default_max_per_term(),
            max_total: default_max_total(),
            skip_tags: default_skip_tags(),
            skip_attribute: default_skip_attribute(),
            term_class: default_term_class(),
            flip_threshold: default_flip_threshold(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Load configuration with priority: CLI args > local config > global config > defaults
    pub fn load(
        endpoint: Option<String>,
        max_per_term: Option<usize>,
        max_total: Option<usize>,
    ) -> Result<Self> {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global_config = Self::from_file(&global_path)?;
                config = config.merge(global_config);
            }
        }

        let local_path = PathBuf::from(".glosstip.toml");
        if local_path.exists() {
            let local_config = Self::from_file(&local_path)?;
            config = config.merge(local_config);
        }

        if endpoint.is_some() {
            config.endpoint = endpoint;
        }
        if let Some(n) = max_per_term {
            config.max_per_term = n;
        }
        if let Some(n) = max_total {
            config.max_total = n;
        }

        tracing::debug!(?config, "configuration resolved");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn merge(mut self, other: Self) -> Self {
        // other's values override self's where they differ from defaults
        if other.endpoint.is_some() {
            self.endpoint = other.endpoint;
        }
        if other.max_per_term != default_max_per_term() {
            self.max_per_term = other.max_per_term;
        }
        if other.max_total != default_max_total() {
            self.max_total = other.max_total;
        }
        if other.skip_tags != default_skip_tags() {
            self.skip_tags = other.skip_tags;
        }
        if other.skip_attribute != default_skip_attribute() {
            self.skip_attribute = other.skip_attribute;
        }
        if other.term_class != default_term_class() {
            self.term_class = other.term_class;
        }
        if other.flip_threshold != default_flip_threshold() {
            self.flip_threshold = other.flip_threshold;
        }
        if other.request_timeout_secs != default_request_timeout() {
            self.request_timeout_secs = other.request_timeout_secs;
        }
        self
    }

    pub fn is_skip_tag(&self, name: &str) -> bool {
        self.skip_tags.iter().any(|t| t.eq_ignore_ascii_case(name))
    }

    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "glosstip").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn cache_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "glosstip").map(|dirs| dirs.cache_dir().to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.max_per_term, 20);
        assert_eq!(config.max_total, 1000);
        assert_eq!(config.skip_attribute, "data-glossary-skip");
        assert!(config.is_skip_tag("SCRIPT"));
        assert!(config.is_skip_tag("pre"));
        assert!(!config.is_skip_tag("p"));
    }

    #[test]
    fn test_merge_configs() {
        let base = Config::default();
        let override_config = Config {
            max_total: 50,
            endpoint: Some("https://example.org/glossary.json".to_string()),
            ..Default::default()
        };

        let merged = base.merge(override_config);
        assert_eq!(merged.max_total, 50);
        assert_eq!(merged.max_per_term, 20);
        assert_eq!(
            merged.endpoint.as_deref(),
            Some("https://example.org/glossary.json")
        );
    }

    #[test]
    fn test_partial_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".glosstip.toml");
        fs::write(&path, "max_per_term = 3\nskip_tags = [\"aside\"]\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.max_per_term, 3);
        assert_eq!(config.max_total, 1000);
        assert!(config.is_skip_tag("aside"));
        assert!(!config.is_skip_tag("script"));
    }
}
