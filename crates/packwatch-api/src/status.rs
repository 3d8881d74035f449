//! Check cycle status

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Terminal outcome of one check cycle, persisted as `last_status`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckStatus {
    /// No installed version could be read
    LocalManifestMissing,
    /// The release source could not be queried
    RemoteQueryFailed,
    /// Installed version matches the latest release
    UpToDate,
    /// A newer release exists
    UpdateAvailable,
}

impl CheckStatus {
    /// Wire representation used in the state file
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::LocalManifestMissing => "local-manifest-missing",
            CheckStatus::RemoteQueryFailed => "remote-query-failed",
            CheckStatus::UpToDate => "up-to-date",
            CheckStatus::UpdateAvailable => "update-available",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown status string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown check status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for CheckStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local-manifest-missing" => Ok(CheckStatus::LocalManifestMissing),
            "remote-query-failed" => Ok(CheckStatus::RemoteQueryFailed),
            "up-to-date" => Ok(CheckStatus::UpToDate),
            "update-available" => Ok(CheckStatus::UpdateAvailable),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_matches_display() {
        for status in [
            CheckStatus::LocalManifestMissing,
            CheckStatus::RemoteQueryFailed,
            CheckStatus::UpToDate,
            CheckStatus::UpdateAvailable,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<CheckStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert!("stale".parse::<CheckStatus>().is_err());
    }
}
