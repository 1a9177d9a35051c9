use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:33322";
pub const DEFAULT_MODEL: &str = "default";

/// Where the edgen server lives and which model the calls ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub model: String,
    /// Working tree of the edgen server, used to ask the build system for its version.
    pub source_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            source_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads `EDGEN_BASE_URL`, `EDGEN_MODEL` and `EDGEN_SOURCE_DIR`, falling
    /// back to the defaults for unset or blank variables.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            base_url: var_or("EDGEN_BASE_URL", defaults.base_url),
            model: var_or("EDGEN_MODEL", defaults.model),
            source_dir: PathBuf::from(var_or(
                "EDGEN_SOURCE_DIR",
                defaults.source_dir.to_string_lossy().into_owned(),
            )),
        }
        .normalized()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.normalized()
    }

    /// Full URL of an API path, e.g. `endpoint("misc/version")`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Like [`Config::endpoint`], with `segment` appended as a single
    /// percent-encoded path segment. Model ids such as `TheBloke/neural-chat`
    /// end up as `TheBloke%2Fneural-chat`.
    pub fn endpoint_with_segment(&self, path: &str, segment: &str) -> Result<String> {
        let endpoint = self.endpoint(path);
        let mut url = reqwest::Url::parse(&endpoint)
            .map_err(|e| Error::InvalidUrl(format!("{}: {}", endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot take path segments", endpoint)))?
            .push(segment);
        Ok(url.into())
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        self.base_url = trimmed.to_string();
        self
    }
}

fn var_or(key: &str, default: String) -> String {
    non_blank_or(env::var(key).ok(), default)
}

fn non_blank_or(value: Option<String>, default: String) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => default,
    }
}
