use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tokio::process::Command;

use crate::error::{Error, Result};

/// Version reported by `GET /v1/misc/version`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    #[serde(default, deserialize_with = "build_ids")]
    pub build: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Build {
    One(String),
    Many(Vec<String>),
}

// edgen sends the build as one string, empty when there is none
fn build_ids<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<String>, D::Error> {
    Ok(match Option::<Build>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(Build::One(build)) if build.is_empty() => Vec::new(),
        Some(Build::One(build)) => vec![build],
        Some(Build::Many(ids)) => ids,
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.build.is_empty() {
            write!(f, "-{}", self.build.join("-"))?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    /// Parses `MAJOR.MINOR.PATCH` with an optional `-BUILD` suffix.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s.split('.').collect::<Vec<&str>>();
        if parts.len() < 3 {
            return Err(Error::InvalidVersion("incomplete version number".to_string()));
        } else if parts.len() > 3 {
            return Err(Error::InvalidVersion(
                "too many components in version number".to_string(),
            ));
        }

        let (patch, build) = match parts[2].split_once('-') {
            Some((patch, build)) => (patch, vec![build.to_string()]),
            None => (parts[2], Vec::new()),
        };

        Ok(Version {
            major: number(parts[0], "major")?,
            minor: number(parts[1], "minor")?,
            patch: number(patch, "patch")?,
            build,
        })
    }
}

fn number(s: &str, what: &str) -> Result<u32> {
    s.parse::<u32>()
        .map_err(|_| Error::InvalidVersion(format!("{} is not a number", what)))
}

/// Asks the edgen build system for its version by running `cargo run version`
/// in `source_dir`. Line breaks in the output are dropped.
pub async fn build_system_version(source_dir: &Path) -> Result<String> {
    log::debug!("running `cargo run version` in {}", source_dir.display());
    let output = Command::new("cargo")
        .args(["run", "version"])
        .current_dir(source_dir)
        .output()
        .await?;

    if !output.status.success() {
        return Err(Error::Io(std::io::Error::other(format!(
            "`cargo run version` exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ))));
    }

    Ok(String::from_utf8_lossy(&output.stdout).lines().collect())
}
