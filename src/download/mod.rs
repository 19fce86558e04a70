//! Mirrored downloads
//!
//! An asset is fetched from its mirror list in priority order. Each attempt
//! streams into a temporary file next to the destination and is renamed onto
//! the final name only after the body was read completely (and matched the
//! published digest, when there is one). A failed attempt is logged and the
//! next mirror is tried; the download fails only once every mirror has.

use std::fmt;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{InstallerError, Result, download as download_error};
use crate::progress;

/// Fetches a named file from an ordered list of sources into a directory
pub trait AssetFetcher {
    fn fetch(
        &self,
        dest_name: &str,
        mirror_urls: &[String],
        expected_sha256: Option<&str>,
        dir: &Path,
    ) -> Result<PathBuf>;
}

/// Why one mirror attempt failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorFailureKind {
    Dns,
    Connect,
    Timeout,
    Status(u16),
    Request,
    Body,
    Digest,
    Io,
}

impl fmt::Display for MirrorFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dns => f.write_str("dns"),
            Self::Connect => f.write_str("connect"),
            Self::Timeout => f.write_str("timeout"),
            Self::Status(code) => write!(f, "status {code}"),
            Self::Request => f.write_str("request"),
            Self::Body => f.write_str("body"),
            Self::Digest => f.write_str("digest"),
            Self::Io => f.write_str("io"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorFailure {
    pub url: String,
    pub kind: MirrorFailureKind,
    pub detail: String,
}

impl MirrorFailure {
    fn new(url: &str, kind: MirrorFailureKind, detail: impl fmt::Display) -> Self {
        Self {
            url: url.to_string(),
            kind,
            detail: detail.to_string(),
        }
    }
}

impl fmt::Display for MirrorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.url, self.kind, self.detail)
    }
}

/// Result of a successful download
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub path: PathBuf,
    /// Mirror that served the file
    pub url: String,
    /// Failed attempts before the successful one, in order
    pub failures: Vec<MirrorFailure>,
}

impl DownloadOutcome {
    pub fn attempts(&self) -> usize {
        self.failures.len() + 1
    }
}

/// HTTP downloader with mirror fallback
pub struct MirroredDownloader<'a> {
    client: &'a Client,
    show_progress: bool,
}

impl<'a> MirroredDownloader<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Download `dest_name` into `dir`, trying `mirror_urls` in order
    pub fn download(
        &self,
        dest_name: &str,
        mirror_urls: &[String],
        expected_sha256: Option<&str>,
        dir: &Path,
    ) -> Result<DownloadOutcome> {
        if mirror_urls.is_empty() {
            return Err(InstallerError::NoMirrors {
                asset: dest_name.to_string(),
            });
        }

        let dest = dir.join(dest_name);
        let mut failures = Vec::new();

        for (index, url) in mirror_urls.iter().enumerate() {
            tracing::debug!(asset = dest_name, url = %url, attempt = index + 1, "downloading");
            match self.try_mirror(dest_name, url, expected_sha256, dir, &dest) {
                Ok(()) => {
                    tracing::info!(asset = dest_name, url = %url, "downloaded");
                    return Ok(DownloadOutcome {
                        path: dest,
                        url: url.clone(),
                        failures,
                    });
                }
                Err(failure) => {
                    tracing::warn!(
                        asset = dest_name,
                        url = %failure.url,
                        kind = %failure.kind,
                        detail = %failure.detail,
                        "mirror failed"
                    );
                    failures.push(failure);
                }
            }
        }

        let last = failures
            .last()
            .map(ToString::to_string)
            .unwrap_or_default();
        Err(download_error::exhausted(dest_name, failures.len(), last))
    }

    fn try_mirror(
        &self,
        dest_name: &str,
        url: &str,
        expected_sha256: Option<&str>,
        dir: &Path,
        dest: &Path,
    ) -> std::result::Result<(), MirrorFailure> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| MirrorFailure::new(url, classify_request_error(&e), &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MirrorFailure::new(
                url,
                MirrorFailureKind::Status(status.as_u16()),
                status,
            ));
        }

        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| MirrorFailure::new(url, MirrorFailureKind::Io, e))?;
        let bar = progress::download_bar(dest_name, response.content_length(), self.show_progress);
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; 64 * 1024];

        loop {
            let read = match response.read(&mut buf) {
                Ok(0) => break,
                Ok(read) => read,
                Err(e) => {
                    bar.abandon();
                    let kind = if e.kind() == std::io::ErrorKind::TimedOut {
                        MirrorFailureKind::Timeout
                    } else {
                        MirrorFailureKind::Body
                    };
                    return Err(MirrorFailure::new(url, kind, e));
                }
            };
            hasher.update(&buf[..read]);
            tmp.write_all(&buf[..read])
                .map_err(|e| MirrorFailure::new(url, MirrorFailureKind::Io, e))?;
            bar.inc(read as u64);
        }
        bar.finish_and_clear();

        if let Some(expected) = expected_sha256 {
            let actual = format!("{:x}", hasher.finalize());
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(MirrorFailure::new(
                    url,
                    MirrorFailureKind::Digest,
                    format!("expected sha256 {expected}, got {actual}"),
                ));
            }
        }

        tmp.as_file()
            .sync_all()
            .map_err(|e| MirrorFailure::new(url, MirrorFailureKind::Io, e))?;
        tmp.persist(dest)
            .map_err(|e| MirrorFailure::new(url, MirrorFailureKind::Io, e.error))?;
        Ok(())
    }
}

impl AssetFetcher for MirroredDownloader<'_> {
    fn fetch(
        &self,
        dest_name: &str,
        mirror_urls: &[String],
        expected_sha256: Option<&str>,
        dir: &Path,
    ) -> Result<PathBuf> {
        let outcome = self.download(dest_name, mirror_urls, expected_sha256, dir)?;
        if !outcome.failures.is_empty() {
            tracing::info!(
                asset = dest_name,
                url = %outcome.url,
                attempts = outcome.attempts(),
                "downloaded from fallback mirror"
            );
        }
        Ok(outcome.path)
    }
}

fn classify_request_error(err: &reqwest::Error) -> MirrorFailureKind {
    if err.is_timeout() {
        MirrorFailureKind::Timeout
    } else if err.is_connect() {
        if chain_mentions_dns(err) {
            MirrorFailureKind::Dns
        } else {
            MirrorFailureKind::Connect
        }
    } else {
        MirrorFailureKind::Request
    }
}

// reqwest reports resolver failures as connect errors; the resolver's own error sits in the source chain
fn chain_mentions_dns(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if e.to_string().to_ascii_lowercase().contains("dns error") {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::InstallerConfig;
    use httpmock::{Method::GET, MockServer};
    use std::time::Duration;

    fn client() -> Client {
        crate::http::build_client(&InstallerConfig {
            connect_timeout_secs: 2,
            total_timeout_secs: 2,
            ..InstallerConfig::default()
        })
        .unwrap()
    }

    fn sha256_hex(data: &[u8]) -> String {
        format!("{:x}", Sha256::digest(data))
    }

    #[test]
    fn test_falls_back_until_last_mirror_succeeds() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path("/m1/pkg.deb");
            then.status(500);
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/m2/pkg.deb");
            then.status(404);
        });
        let third = server.mock(|when, then| {
            when.method(GET).path("/m3/pkg.deb");
            then.status(200).body("package-bytes");
        });

        let mirrors = vec![
            server.url("/m1/pkg.deb"),
            server.url("/m2/pkg.deb"),
            server.url("/m3/pkg.deb"),
        ];
        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let outcome = MirroredDownloader::new(&client)
            .download("pkg.deb", &mirrors, None, scratch.path())
            .unwrap();

        first.assert_calls(1);
        second.assert_calls(1);
        third.assert_calls(1);
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.url, mirrors[2]);
        let kinds: Vec<_> = outcome.failures.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![MirrorFailureKind::Status(500), MirrorFailureKind::Status(404)]
        );
        assert_eq!(outcome.failures[0].url, mirrors[0]);
        assert_eq!(outcome.failures[1].url, mirrors[1]);
        assert_eq!(
            std::fs::read_to_string(scratch.path().join("pkg.deb")).unwrap(),
            "package-bytes"
        );
    }

    #[test]
    fn test_first_mirror_success_makes_one_attempt() {
        let server = MockServer::start();
        let primary = server.mock(|when, then| {
            when.method(GET).path("/a.deb");
            then.status(200).body("a");
        });
        let fallback = server.mock(|when, then| {
            when.method(GET).path("/fallback/a.deb");
            then.status(200).body("b");
        });

        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let outcome = MirroredDownloader::new(&client)
            .download(
                "a.deb",
                &[server.url("/a.deb"), server.url("/fallback/a.deb")],
                None,
                scratch.path(),
            )
            .unwrap();

        primary.assert_calls(1);
        fallback.assert_calls(0);
        assert_eq!(outcome.attempts(), 1);
    }

    #[test]
    fn test_all_mirrors_fail_leaves_no_file() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/x.deb");
            then.status(404);
        });
        server.mock(|when, then| {
            when.method(GET).path("/y.deb");
            then.status(502);
        });

        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let err = MirroredDownloader::new(&client)
            .download(
                "pkg.deb",
                &[server.url("/x.deb"), server.url("/y.deb")],
                None,
                scratch.path(),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            InstallerError::DownloadFailed { attempts: 2, .. }
        ));
        assert!(!scratch.path().join("pkg.deb").exists());
        assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_digest_mismatch_falls_back() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/tampered/pkg.deb");
            then.status(200).body("tampered");
        });
        server.mock(|when, then| {
            when.method(GET).path("/good/pkg.deb");
            then.status(200).body("genuine");
        });

        let expected = sha256_hex(b"genuine");
        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let outcome = MirroredDownloader::new(&client)
            .download(
                "pkg.deb",
                &[server.url("/tampered/pkg.deb"), server.url("/good/pkg.deb")],
                Some(&expected),
                scratch.path(),
            )
            .unwrap();

        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, MirrorFailureKind::Digest);
        assert_eq!(
            std::fs::read_to_string(&outcome.path).unwrap(),
            "genuine"
        );
    }

    #[test]
    fn test_connection_refused_is_connect_failure() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/pkg.deb");
            then.status(200).body("ok");
        });

        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let outcome = MirroredDownloader::new(&client)
            .download(
                "pkg.deb",
                &["http://127.0.0.1:9/pkg.deb".to_string(), server.url("/pkg.deb")],
                None,
                scratch.path(),
            )
            .unwrap();

        assert_eq!(outcome.failures[0].kind, MirrorFailureKind::Connect);
    }

    #[test]
    fn test_slow_mirror_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow.deb");
            then.status(200).delay(Duration::from_secs(4)).body("late");
        });

        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let err = MirroredDownloader::new(&client)
            .download("slow.deb", &[server.url("/slow.deb")], None, scratch.path())
            .unwrap_err();

        match err {
            InstallerError::DownloadFailed { last, .. } => assert!(last.contains("timeout")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!scratch.path().join("slow.deb").exists());
    }

    #[test]
    fn test_empty_mirror_list_is_rejected() {
        let scratch = tempfile::TempDir::new().unwrap();
        let client = client();
        let err = MirroredDownloader::new(&client)
            .download("pkg.deb", &[], None, scratch.path())
            .unwrap_err();
        assert!(matches!(err, InstallerError::NoMirrors { .. }));
    }

    #[test]
    fn test_chain_mentions_dns() {
        let err = std::io::Error::other("dns error: failed to lookup address information");
        assert!(chain_mentions_dns(&err));
        let err = std::io::Error::other("connection refused");
        assert!(!chain_mentions_dns(&err));
    }
}
