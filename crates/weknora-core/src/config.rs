//! Console configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::CoreError;
use crate::Result;

pub const ENV_API_BASE_URL: &str = "WEKNORA_API_BASE_URL";
pub const ENV_DATA_DIR: &str = "WEKNORA_DATA_DIR";
pub const ENV_VALIDATE_TOKENS: &str = "WEKNORA_VALIDATE_TOKENS";
pub const ENV_IS_DOCKER: &str = "WEKNORA_IS_DOCKER";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding both realms' credential slots
    pub storage_path: PathBuf,
    /// Backend origin. Left empty in Docker mode, where it has to be given
    /// explicitly through `WEKNORA_API_BASE_URL`.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    /// Revalidate end-user tokens with the backend on protected navigations
    pub validate_tokens: bool,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            storage_path: data_dir.join("weknora.db"),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 30,
            validate_tokens: false,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("WeKnora"))
            .unwrap_or_else(|| PathBuf::from(".weknora"))
    }

    /// Defaults overridden by `WEKNORA_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|d| !d.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(Self::data_dir);
        let mut config = Self::new(data_dir);

        // No localhost default inside a container
        if lookup(ENV_IS_DOCKER).is_some_and(|v| !v.is_empty()) {
            config.api_base_url = String::new();
        }

        if let Some(url) = lookup(ENV_API_BASE_URL) {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(flag) = lookup(ENV_VALIDATE_TOKENS) {
            config.validate_tokens = parse_flag(&flag).ok_or_else(|| {
                CoreError::Config(format!(
                    "{} must be a boolean, got {:?}",
                    ENV_VALIDATE_TOKENS, flag
                ))
            })?;
        }

        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[(ENV_DATA_DIR, "/tmp/weknora")])).unwrap();

        assert_eq!(config.storage_path, PathBuf::from("/tmp/weknora/weknora.db"));
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.request_timeout_secs, 30);
        assert!(!config.validate_tokens);
    }

    #[test]
    fn test_data_dir_is_namespaced() {
        let dir = Config::data_dir();
        assert!(dir.ends_with("WeKnora") || dir == PathBuf::from(".weknora"));
        assert_eq!(Config::default().storage_path, dir.join("weknora.db"));
    }

    #[test]
    fn test_docker_leaves_base_url_unset() {
        let config = Config::from_lookup(lookup(&[(ENV_IS_DOCKER, "true")])).unwrap();
        assert_eq!(config.api_base_url, "");
    }

    #[test]
    fn test_explicit_base_url_wins() {
        let config = Config::from_lookup(lookup(&[
            (ENV_IS_DOCKER, "1"),
            (ENV_API_BASE_URL, "https://kb.example.com/"),
            (ENV_VALIDATE_TOKENS, "yes"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "https://kb.example.com");
        assert!(config.validate_tokens);
    }

    #[test]
    fn test_bad_flag_rejected() {
        let err = Config::from_lookup(lookup(&[(ENV_VALIDATE_TOKENS, "maybe")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }
}
