//! Release resolution
//!
//! Fetches the latest-release metadata, extracts the version from the tag and
//! maps every catalog component to exactly one downloadable asset. A release
//! missing any component asset is rejected as a whole.

pub mod github;

use std::collections::BTreeMap;

use reqwest::blocking::Client;

use crate::catalog::Catalog;
use crate::config::InstallerConfig;
use crate::error::{InstallerError, Result, resolve as resolve_error};
use github::GitHubRelease;

/// A downloadable asset and the URLs it can be fetched from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    pub filename: String,
    /// Highest priority first, never empty
    pub mirror_urls: Vec<String>,
    /// Package version from `<package>_<version>_<arch>.deb`
    pub version: Option<String>,
    pub sha256: Option<String>,
}

/// Resolved release: version plus one asset per component name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    pub tag: String,
    pub version: String,
    pub assets: BTreeMap<String, AssetRef>,
}

impl ReleaseInfo {
    pub fn asset(&self, component: &str) -> Option<&AssetRef> {
        self.assets.get(component)
    }
}

/// Extract `<version>` from a `v<version>-<suffix>` tag
pub fn parse_tag_version(tag: &str) -> Result<String> {
    let malformed = || resolve_error::malformed(format!("tag '{tag}' does not match v<version>-<suffix>"));

    let rest = tag.strip_prefix('v').ok_or_else(malformed)?;
    let (version, suffix) = rest.split_once('-').ok_or_else(malformed)?;
    if version.is_empty() || suffix.is_empty() {
        return Err(malformed());
    }
    Ok(version.to_string())
}

/// Version segment of a Debian package filename, if it has one
fn asset_version(filename: &str, asset_prefix: &str) -> Option<String> {
    filename
        .strip_prefix(asset_prefix)
        .and_then(|rest| rest.split('_').next())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Map a parsed release document onto the catalog.
///
/// When several assets share a component prefix the first one listed wins.
pub fn build_release_info(
    release: &GitHubRelease,
    catalog: &Catalog,
    config: &InstallerConfig,
) -> Result<ReleaseInfo> {
    let version = parse_tag_version(&release.tag_name)?;
    let mut assets = BTreeMap::new();

    for component in catalog.components() {
        let prefix = component.asset_prefix();
        let mut matches = release
            .assets
            .iter()
            .filter_map(|asset| asset.file_name().map(|name| (name, asset)))
            .filter(|(name, _)| name.starts_with(&prefix));

        let Some((filename, asset)) = matches.next() else {
            return Err(resolve_error::asset_missing(
                &release.tag_name,
                component.name,
                &prefix,
            ));
        };

        let duplicates = matches.count();
        if duplicates > 0 {
            tracing::warn!(
                component = component.name,
                asset_key = component.asset_key,
                chosen = filename,
                ignored = duplicates,
                "multiple release assets match; using the first listed"
            );
        }

        assets.insert(
            component.name.to_string(),
            AssetRef {
                filename: filename.to_string(),
                mirror_urls: config.mirror_urls(&asset.browser_download_url),
                version: asset_version(filename, &prefix),
                sha256: asset.sha256(),
            },
        );
    }

    Ok(ReleaseInfo {
        tag: release.tag_name.clone(),
        version,
        assets,
    })
}

/// Looks up the latest release over HTTP
pub struct ReleaseResolver<'a> {
    client: &'a Client,
    catalog: &'a Catalog,
    config: &'a InstallerConfig,
}

impl<'a> ReleaseResolver<'a> {
    pub fn new(client: &'a Client, catalog: &'a Catalog, config: &'a InstallerConfig) -> Self {
        Self {
            client,
            catalog,
            config,
        }
    }

    /// Fetch and validate the latest release
    pub fn resolve(&self) -> Result<ReleaseInfo> {
        let url = self.config.release_url.as_str();
        tracing::debug!(url, "fetching release metadata");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .map_err(|e| resolve_error::unreachable(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::ReleaseStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| resolve_error::unreachable(url, e))?;
        let release = github::parse_release(&body)?;
        let info = build_release_info(&release, self.catalog, self.config)?;

        tracing::info!(tag = %info.tag, version = %info.version, "resolved release");
        Ok(info)
    }
}
