//! CLI session file discovery and parsing
//!
//! The companion CLI caches its login in `.sitecore/user.json` inside a
//! project directory. This module only ever reads it.

use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::session;
use crate::error::{ClientError, Result};

/// Contents of `.sitecore/user.json`
#[derive(Deserialize, Debug, Default, Clone)]
pub struct SessionFile {
    #[serde(default)]
    pub endpoints: SessionEndpoints,
}

#[derive(Deserialize, Debug, Default, Clone)]
pub struct SessionEndpoints {
    #[serde(default, rename = "xmCloud")]
    pub xm_cloud: SessionEndpoint,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SessionEndpoint {
    pub host: Option<String>,
    pub authority: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl SessionFile {
    /// API host recorded by the CLI
    pub fn host(&self) -> Option<&str> {
        non_empty(self.endpoints.xm_cloud.host.as_deref())
    }

    /// OAuth authority recorded by the CLI
    pub fn authority(&self) -> Option<&str> {
        non_empty(self.endpoints.xm_cloud.authority.as_deref())
    }

    pub fn access_token(&self) -> Option<&str> {
        non_empty(self.endpoints.xm_cloud.access_token.as_deref())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(self.endpoints.xm_cloud.refresh_token.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Relative location of the session file inside a directory
pub fn session_relative_path() -> PathBuf {
    Path::new(session::DIR_NAME).join(session::FILE_NAME)
}

/// Walk from `start_dir` up to the filesystem root looking for the session file.
///
/// Absence is an expected outcome and yields `None`.
pub fn discover_cli_session_path(start_dir: &Path) -> Option<PathBuf> {
    let relative = session_relative_path();

    for dir in start_dir.ancestors() {
        let candidate = dir.join(&relative);
        debug!("Checking for CLI session at: {}", candidate.display());
        if candidate.is_file() {
            debug!("Found CLI session at: {}", candidate.display());
            return Some(candidate);
        }
    }

    debug!(
        "No CLI session found above {} (searched up to the filesystem root)",
        start_dir.display()
    );
    None
}

/// Read and parse a CLI session file
pub fn read_cli_session(path: &Path) -> Result<SessionFile> {
    let content = fs::read_to_string(path).map_err(|e| {
        ClientError::Configuration(format!(
            "Failed to read CLI session file {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        ClientError::Configuration(format!(
            "Could not parse CLI session file {}: {}",
            path.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const USER_JSON: &str = r#"{
        "endpoints": {
            "xmCloud": {
                "host": "https://test-api.sitecorecloud.io/",
                "authority": "https://test-auth.sitecorecloud.io/",
                "accessToken": "test-access-token",
                "refreshToken": "test-refresh-token"
            }
        },
        "defaultEndpoint": "xmCloud"
    }"#;

    fn write_session(dir: &Path, content: &str) -> PathBuf {
        let session_dir = dir.join(session::DIR_NAME);
        fs::create_dir_all(&session_dir).unwrap();
        let path = session_dir.join(session::FILE_NAME);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_discover_in_start_dir() {
        let tmp = TempDir::new().unwrap();
        let expected = write_session(tmp.path(), USER_JSON);

        assert_eq!(discover_cli_session_path(tmp.path()), Some(expected));
    }

    #[test]
    fn test_discover_two_levels_up() {
        let tmp = TempDir::new().unwrap();
        let expected = write_session(tmp.path(), USER_JSON);
        let nested = tmp.path().join("src").join("rendering");
        fs::create_dir_all(&nested).unwrap();

        let found = discover_cli_session_path(&nested);
        assert_eq!(found, Some(expected));
    }

    #[test]
    fn test_discover_prefers_nearest_ancestor() {
        let tmp = TempDir::new().unwrap();
        write_session(tmp.path(), USER_JSON);
        let project = tmp.path().join("project");
        let nearer = write_session(&project, USER_JSON);
        let nested = project.join("deep");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_cli_session_path(&nested), Some(nearer));
    }

    #[test]
    fn test_discover_not_found() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        // Nothing in the temp tree; the walk continues to the root. A stray
        // session file above the temp dir would be a legitimate find.
        let found = discover_cli_session_path(&nested);
        if let Some(path) = found {
            assert!(!path.starts_with(tmp.path()));
        }
    }

    #[test]
    fn test_discover_ignores_directory_named_like_file() {
        let tmp = TempDir::new().unwrap();
        let bogus = tmp.path().join(session::DIR_NAME).join(session::FILE_NAME);
        fs::create_dir_all(&bogus).unwrap();

        let found = discover_cli_session_path(tmp.path());
        assert_ne!(found, Some(bogus));
    }

    #[test]
    fn test_read_cli_session() {
        let tmp = TempDir::new().unwrap();
        let path = write_session(tmp.path(), USER_JSON);

        let session = read_cli_session(&path).unwrap();
        assert_eq!(session.access_token(), Some("test-access-token"));
        assert_eq!(session.refresh_token(), Some("test-refresh-token"));
        assert_eq!(session.host(), Some("https://test-api.sitecorecloud.io/"));
        assert_eq!(
            session.authority(),
            Some("https://test-auth.sitecorecloud.io/")
        );
    }

    #[test]
    fn test_read_cli_session_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = read_cli_session(&tmp.path().join("nope.json")).unwrap_err();
        match err {
            ClientError::Configuration(msg) => assert!(msg.contains("nope.json")),
            _ => panic!("Expected ClientError::Configuration"),
        }
    }

    #[test]
    fn test_read_cli_session_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = write_session(tmp.path(), "{ not json");
        let err = read_cli_session(&path).unwrap_err();
        match err {
            ClientError::Configuration(msg) => assert!(msg.contains("Could not parse")),
            _ => panic!("Expected ClientError::Configuration"),
        }
    }

    #[test]
    fn test_read_cli_session_wrong_shape() {
        let tmp = TempDir::new().unwrap();
        let path = write_session(tmp.path(), r#"{"endpoints": "nope"}"#);
        assert!(matches!(
            read_cli_session(&path),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn test_empty_fields_read_as_absent() {
        let session: SessionFile = serde_json::from_str(
            r#"{"endpoints":{"xmCloud":{"host":"","accessToken":"  "}}}"#,
        )
        .unwrap();
        assert!(session.host().is_none());
        assert!(session.access_token().is_none());
        assert!(session.authority().is_none());
    }
}
