//! GitHub release document model

use serde::Deserialize;

use crate::error::{Result, resolve as resolve_error};

/// The subset of a GitHub "latest release" response the installer reads
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub assets: Vec<GitHubAsset>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GitHubAsset {
    #[serde(default)]
    pub name: Option<String>,
    pub browser_download_url: String,
    /// `sha256:<hex>` on newer API responses
    #[serde(default)]
    pub digest: Option<String>,
}

impl GitHubAsset {
    /// Asset filename, from `name` or the last URL path segment
    pub fn file_name(&self) -> Option<&str> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name);
        }
        self.browser_download_url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').next())
            .filter(|segment| !segment.is_empty())
    }

    /// Expected sha256 hex digest, when the metadata publishes one
    pub fn sha256(&self) -> Option<String> {
        self.digest
            .as_deref()
            .and_then(|d| d.strip_prefix("sha256:"))
            .filter(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
            .map(str::to_ascii_lowercase)
    }
}

/// Parse a release document, failing closed on missing or mistyped fields
pub fn parse_release(body: &str) -> Result<GitHubRelease> {
    let release: GitHubRelease = serde_json::from_str(body)
        .map_err(|e| resolve_error::malformed(format!("invalid release document: {e}")))?;
    if release.tag_name.trim().is_empty() {
        return Err(resolve_error::malformed("tag_name is empty"));
    }
    Ok(release)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_release() {
        let release = parse_release(
            r#"{"tag_name":"v1.2.3-deb","assets":[{"browser_download_url":"https://h/d/softether-common_1.2.3_amd64.deb"}]}"#,
        )
        .unwrap();
        assert_eq!(release.tag_name, "v1.2.3-deb");
        assert_eq!(
            release.assets[0].file_name(),
            Some("softether-common_1.2.3_amd64.deb")
        );
    }

    #[test]
    fn test_missing_tag_name_is_malformed() {
        let err = parse_release(r#"{"assets":[]}"#).unwrap_err();
        assert!(err.to_string().contains("tag_name"));
    }

    #[test]
    fn test_missing_download_url_is_malformed() {
        assert!(parse_release(r#"{"tag_name":"v1-deb","assets":[{"name":"x.deb"}]}"#).is_err());
    }

    #[test]
    fn test_file_name_prefers_name_field() {
        let asset = GitHubAsset {
            name: Some("real.deb".to_string()),
            browser_download_url: "https://h/download?id=1".to_string(),
            digest: None,
        };
        assert_eq!(asset.file_name(), Some("real.deb"));
    }

    #[test]
    fn test_file_name_strips_query() {
        let asset = GitHubAsset {
            name: None,
            browser_download_url: "https://h/a/pkg_1_all.deb?raw=1".to_string(),
            digest: None,
        };
        assert_eq!(asset.file_name(), Some("pkg_1_all.deb"));
    }

    #[test]
    fn test_sha256_digest_is_validated() {
        let mut asset = GitHubAsset {
            name: None,
            browser_download_url: "https://h/x.deb".to_string(),
            digest: Some(format!("sha256:{}", "AB".repeat(32))),
        };
        assert_eq!(asset.sha256(), Some("ab".repeat(32)));

        asset.digest = Some("sha1:abc".to_string());
        assert_eq!(asset.sha256(), None);
    }
}
