// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! GitHub release checking module
//!
//! Resolves the newest upstream release of a client, the archive for this
//! machine and the material to verify it with.

use crate::adapter::{Arch, Distribution, adapter_for};
use crate::config::{GithubConfig, RetryPolicy};
use crate::downloader::download_and_verify;
use crate::error::{ActionError, ReleaseError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ethwizard_types::{ClientKind, Version, parse_version, version_from_tag};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("ethwizard-maintenance/", env!("CARGO_PKG_VERSION"));
const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// How a downloaded archive is verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// Lowercase hex SHA-256 of the archive
    Sha256(String),
    /// Detached PGP signature
    Signature { url: String },
}

#[derive(Debug, Clone)]
pub struct ReleaseArtifact {
    pub kind: ClientKind,
    pub tag: String,
    pub version: Version,
    pub file_name: String,
    pub download_url: String,
    /// `None` when upstream published nothing to verify against
    pub integrity: Option<Integrity>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GithubRelease {
    tag_name: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    assets: Vec<GithubAsset>,
}

#[derive(Debug, Deserialize, Serialize)]
struct GithubAsset {
    name: String,
    browser_download_url: String,
}

/// Where release artifacts come from
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    /// Newest upstream release version
    async fn latest_version(&self, kind: ClientKind) -> Result<Version, ReleaseError>;

    /// The newest release's archive for this machine
    async fn fetch_latest_release(&self, kind: ClientKind)
    -> Result<ReleaseArtifact, ReleaseError>;

    /// Download `artifact` into `dest_dir` and verify it.
    ///
    /// The returned file exists only when verification passed.
    async fn download(
        &self,
        artifact: &ReleaseArtifact,
        dest_dir: &Path,
    ) -> Result<PathBuf, ActionError>;
}

#[derive(Debug, Clone)]
pub struct GithubReleaseSource {
    client: reqwest::Client,
    api_base_url: String,
    token: Option<String>,
    arch: Arch,
    retry: RetryPolicy,
}

impl GithubReleaseSource {
    pub fn new(config: &GithubConfig, retry: RetryPolicy) -> Result<Self, ReleaseError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ReleaseError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base_url: config
                .api_base_url
                .as_deref()
                .unwrap_or(DEFAULT_API_BASE_URL)
                .trim_end_matches('/')
                .to_owned(),
            token: config.token.clone(),
            arch: Arch::current(),
            retry,
        })
    }

    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    /// Run `request` under the retry policy, repeating transient failures only
    async fn with_retry<T, F, Fut>(&self, what: &str, mut request: F) -> Result<T, ReleaseError>
    where
        F: FnMut(Duration) -> Fut,
        Fut: Future<Output = Result<T, ReleaseError>>,
    {
        let mut last_error = None;

        for attempt in 0..self.retry.attempts {
            let timeout = self.retry.timeout_for(attempt);
            if attempt > 0 {
                warn!(
                    "Retrying {what} (attempt {}/{}, timeout {}s)",
                    attempt + 1,
                    self.retry.attempts,
                    timeout.as_secs()
                );
            }

            match request(timeout).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => {
                    warn!("{what} failed: {e}");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ReleaseError::Request(format!("{what}: no attempt made"))))
    }

    async fn latest_release(&self, repo: &str) -> Result<GithubRelease, ReleaseError> {
        self.with_retry(&format!("latest release of {repo}"), move |timeout| {
            self.latest_release_once(repo, timeout)
        })
        .await
    }

    async fn latest_release_once(
        &self,
        repo: &str,
        timeout: Duration,
    ) -> Result<GithubRelease, ReleaseError> {
        let url = format!("{}/repos/{repo}/releases/latest", self.api_base_url);
        let mut request = self.client.get(&url).timeout(timeout);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ReleaseError::Request(format!("{url}: {e}")))?;

        // Check rate limit
        if let Some(remaining) = response.headers().get("x-ratelimit-remaining")
            && let Ok(remaining_str) = remaining.to_str()
            && let Ok(remaining_int) = remaining_str.parse::<u32>()
            && remaining_int < 10
        {
            warn!("GitHub rate limit low: {remaining_int} remaining");
        }

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ReleaseError::NoRelease(repo.to_owned()));
        }
        if status.is_client_error() || status.is_server_error() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_owned());
            return Err(ReleaseError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ReleaseError::Parse(format!("{repo}: {e}")))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, ReleaseError> {
        self.with_retry(url, move |timeout| self.fetch_text_once(url, timeout))
            .await
    }

    async fn fetch_text_once(&self, url: &str, timeout: Duration) -> Result<String, ReleaseError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| ReleaseError::Request(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ReleaseError::Api {
                status: status.as_u16(),
                body: format!("fetching {url}"),
            });
        }

        response
            .text()
            .await
            .map_err(|e| ReleaseError::Request(format!("{url}: {e}")))
    }

    /// Find something to verify `file_name` with, strongest source first
    async fn resolve_integrity(
        &self,
        release: &GithubRelease,
        file_name: &str,
    ) -> Result<Option<Integrity>, ReleaseError> {
        if let Some(list) = release.assets.iter().find(|a| is_checksum_list(&a.name)) {
            let content = self.fetch_text(&list.browser_download_url).await?;
            if let Some(hash) = parse_sha256sums(&content, file_name) {
                debug!("{file_name}: checksum from {}", list.name);
                return Ok(Some(Integrity::Sha256(hash)));
            }
        }

        let sidecars = [format!("{file_name}.sha256"), format!("{file_name}.sha256sum")];
        if let Some(sidecar) = release.assets.iter().find(|a| sidecars.contains(&a.name)) {
            let content = self.fetch_text(&sidecar.browser_download_url).await?;
            if let Some(hash) = content.split_whitespace().next().filter(|t| is_sha256(t)) {
                debug!("{file_name}: checksum from {}", sidecar.name);
                return Ok(Some(Integrity::Sha256(hash.to_lowercase())));
            }
        }

        if let Some(hash) = release
            .body
            .as_deref()
            .and_then(|body| checksum_from_body(body, file_name))
        {
            debug!("{file_name}: checksum from release notes");
            return Ok(Some(Integrity::Sha256(hash)));
        }

        let signatures = [format!("{file_name}.asc"), format!("{file_name}.sig")];
        if let Some(signature) = release.assets.iter().find(|a| signatures.contains(&a.name)) {
            debug!("{file_name}: detached signature {}", signature.name);
            return Ok(Some(Integrity::Signature {
                url: signature.browser_download_url.clone(),
            }));
        }

        warn!(
            "Release {} publishes no checksum or signature for {file_name}",
            release.tag_name
        );
        Ok(None)
    }
}

#[async_trait]
impl ArtifactSource for GithubReleaseSource {
    async fn latest_version(&self, kind: ClientKind) -> Result<Version, ReleaseError> {
        let release = self.latest_release(adapter_for(kind).repository()).await?;
        parse_version(version_from_tag(&release.tag_name))
            .map_err(|e| ReleaseError::Parse(format!("tag {}: {e}", release.tag_name)))
    }

    async fn fetch_latest_release(
        &self,
        kind: ClientKind,
    ) -> Result<ReleaseArtifact, ReleaseError> {
        let adapter = adapter_for(kind);
        if let Distribution::Package { name } = adapter.distribution() {
            return Err(ReleaseError::NotDistributed(format!(
                "{kind} (installed from the {name} package)"
            )));
        }

        let release = self.latest_release(adapter.repository()).await?;
        let version = parse_version(version_from_tag(&release.tag_name))
            .map_err(|e| ReleaseError::Parse(format!("tag {}: {e}", release.tag_name)))?;

        let (file_name, download_url) = match adapter.download_url(&version, self.arch) {
            Some(url) => (file_name_from_url(&url).to_owned(), url),
            None => {
                let asset = release
                    .assets
                    .iter()
                    .find(|a| adapter.asset_matches(&a.name, self.arch))
                    .ok_or_else(|| ReleaseError::NoAsset {
                        asset: format!("{kind} {:?}", self.arch),
                        tag: release.tag_name.clone(),
                    })?;
                (asset.name.clone(), asset.browser_download_url.clone())
            }
        };

        let integrity = self.resolve_integrity(&release, &file_name).await?;

        Ok(ReleaseArtifact {
            kind,
            tag: release.tag_name.clone(),
            version,
            file_name,
            download_url,
            integrity,
            published_at: release.published_at,
        })
    }

    async fn download(
        &self,
        artifact: &ReleaseArtifact,
        dest_dir: &Path,
    ) -> Result<PathBuf, ActionError> {
        download_and_verify(&self.client, artifact, dest_dir, &self.retry).await
    }
}

fn is_sha256(token: &str) -> bool {
    token.len() == 64 && token.chars().all(|c| c.is_ascii_hexdigit())
}

fn is_checksum_list(name: &str) -> bool {
    let name = name.to_lowercase();
    (name.contains("sha256sums") || name.contains("checksums"))
        && !name.ends_with(".asc")
        && !name.ends_with(".sig")
}

fn file_name_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Find the hash for `file_name` in `sha256sum`-style output
fn parse_sha256sums(content: &str, file_name: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let hash = parts.next()?;
        let name = parts.next()?.trim_start_matches('*');
        let name = name.rsplit('/').next().unwrap_or(name);
        (name == file_name && is_sha256(hash)).then(|| hash.to_lowercase())
    })
}

/// Find a hash written next to `file_name` in release notes
fn checksum_from_body(body: &str, file_name: &str) -> Option<String> {
    let lines: Vec<&str> = body.lines().collect();
    lines.iter().enumerate().find_map(|(index, line)| {
        if !line.contains(file_name) {
            return None;
        }
        lines[index..lines.len().min(index + 3)]
            .iter()
            .flat_map(|l| l.split(|c: char| !c.is_ascii_alphanumeric()))
            .find(|token| is_sha256(token))
            .map(str::to_lowercase)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Server, ServerGuard};
    use serde_json::json;

    const HASH_A: &str = "3f9a0c1e7b2d4f6a8c0e2b4d6f8a0c2e4b6d8f0a2c4e6b8d0f2a4c6e8b0d2f4a";
    const HASH_B: &str = "b1c2d3e4f5a6b7c8d9e0f1a2b3c4d5e6f7a8b9c0d1e2f3a4b5c6d7e8f9a0b1c2";

    fn source(server: &ServerGuard, token: Option<&str>) -> GithubReleaseSource {
        let config = GithubConfig {
            api_base_url: Some(server.url()),
            token: token.map(str::to_owned),
        };
        let retry = RetryPolicy {
            attempts: 3,
            base_timeout_secs: 5,
            timeout_step_secs: 1,
        };
        GithubReleaseSource::new(&config, retry)
            .unwrap()
            .with_arch(Arch::X86_64)
    }

    fn release_json(server: &ServerGuard, tag: &str, assets: &[&str], body: &str) -> String {
        let assets: Vec<GithubAsset> = assets
            .iter()
            .map(|name| GithubAsset {
                name: (*name).to_owned(),
                browser_download_url: format!("{}/download/{name}", server.url()),
            })
            .collect();
        serde_json::to_string(&GithubRelease {
            tag_name: tag.to_owned(),
            body: Some(body.to_owned()),
            published_at: Some(Utc::now()),
            assets,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_version() {
        let mut server = Server::new_async().await;
        let body = release_json(&server, "v3.1.0", &[], "");
        let mock = server
            .mock("GET", "/repos/sigp/lighthouse/releases/latest")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let version = source(&server, None)
            .latest_version(ClientKind::Lighthouse)
            .await
            .unwrap();
        assert_eq!(version, Version::new(3, 1, 0));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_latest_version_for_package_client() {
        let mut server = Server::new_async().await;
        let body = release_json(&server, "v1.10.25", &[], "");
        let mock = server
            .mock("GET", "/repos/ethereum/go-ethereum/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let source = source(&server, None);
        assert_eq!(
            source.latest_version(ClientKind::Geth).await.unwrap(),
            Version::new(1, 10, 25)
        );
        assert!(matches!(
            source.fetch_latest_release(ClientKind::Geth).await,
            Err(ReleaseError::NotDistributed(_))
        ));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_release_with_checksums_asset() {
        let mut server = Server::new_async().await;
        let body = release_json(
            &server,
            "v1.3.2",
            &[
                "mev-boost_1.3.2_linux_amd64.tar.gz",
                "mev-boost_1.3.2_linux_arm64.tar.gz",
                "checksums.txt",
            ],
            "",
        );
        let release_mock = server
            .mock("GET", "/repos/flashbots/mev-boost/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let checksums_mock = server
            .mock("GET", "/download/checksums.txt")
            .with_status(200)
            .with_body(format!(
                "{HASH_A}  mev-boost_1.3.2_linux_amd64.tar.gz\n{HASH_B}  mev-boost_1.3.2_linux_arm64.tar.gz\n"
            ))
            .create_async()
            .await;

        let artifact = source(&server, None)
            .fetch_latest_release(ClientKind::MevBoost)
            .await
            .unwrap();
        assert_eq!(artifact.version, Version::new(1, 3, 2));
        assert_eq!(artifact.file_name, "mev-boost_1.3.2_linux_amd64.tar.gz");
        assert!(artifact.download_url.ends_with("/download/mev-boost_1.3.2_linux_amd64.tar.gz"));
        assert_eq!(artifact.integrity, Some(Integrity::Sha256(HASH_A.to_owned())));

        release_mock.assert_async().await;
        checksums_mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_release_with_signature_only() {
        let mut server = Server::new_async().await;
        let body = release_json(
            &server,
            "v3.1.0",
            &[
                "lighthouse-v3.1.0-x86_64-unknown-linux-gnu-portable.tar.gz",
                "lighthouse-v3.1.0-x86_64-unknown-linux-gnu.tar.gz",
                "lighthouse-v3.1.0-x86_64-unknown-linux-gnu.tar.gz.asc",
            ],
            "## Binaries\n| x86_64 | lighthouse-v3.1.0-x86_64-unknown-linux-gnu.tar.gz | PGP Signature |",
        );
        let mock = server
            .mock("GET", "/repos/sigp/lighthouse/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let artifact = source(&server, None)
            .fetch_latest_release(ClientKind::Lighthouse)
            .await
            .unwrap();
        assert_eq!(
            artifact.file_name,
            "lighthouse-v3.1.0-x86_64-unknown-linux-gnu.tar.gz"
        );
        match artifact.integrity {
            Some(Integrity::Signature { url }) => assert!(url.ends_with(".tar.gz.asc")),
            other => panic!("expected a signature, got {other:?}"),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_teku_release_with_checksum_in_body() {
        let mut server = Server::new_async().await;
        let notes = format!(
            "# 22.9.0\n\n## Downloads\n- tar.gz: https://artifacts.consensys.net/public/teku/raw/names/teku.tar.gz/versions/22.9.0/teku-22.9.0.tar.gz\n  sha256: `{HASH_B}`\n- zip: teku-22.9.0.zip\n  sha256: `{HASH_A}`\n"
        );
        let body = release_json(&server, "22.9.0", &[], &notes);
        let mock = server
            .mock("GET", "/repos/ConsenSys/teku/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let artifact = source(&server, None)
            .fetch_latest_release(ClientKind::Teku)
            .await
            .unwrap();
        assert_eq!(artifact.file_name, "teku-22.9.0.tar.gz");
        assert_eq!(artifact.integrity, Some(Integrity::Sha256(HASH_B.to_owned())));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_release_without_verification_material() {
        let mut server = Server::new_async().await;
        let body = release_json(
            &server,
            "1.14.1",
            &["nethermind-1.14.1-a4d1e4b3-linux-x64.zip"],
            "Release notes without hashes",
        );
        let mock = server
            .mock("GET", "/repos/NethermindEth/nethermind/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let artifact = source(&server, None)
            .fetch_latest_release(ClientKind::Nethermind)
            .await
            .unwrap();
        assert!(artifact.integrity.is_none());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_release_no_matching_asset() {
        let mut server = Server::new_async().await;
        let body = release_json(&server, "v22.9.1", &["nimbus-eth2_Windows_amd64_22.9.1.zip"], "");
        let mock = server
            .mock("GET", "/repos/status-im/nimbus-eth2/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let result = source(&server, None)
            .fetch_latest_release(ClientKind::Nimbus)
            .await;
        assert!(matches!(result, Err(ReleaseError::NoAsset { .. })));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/sigp/lighthouse/releases/latest")
            .with_status(403)
            .with_header("x-ratelimit-remaining", "0")
            .with_body(json!({"message": "API rate limit exceeded"}).to_string())
            .create_async()
            .await;

        let result = source(&server, None)
            .latest_version(ClientKind::Lighthouse)
            .await;
        assert!(matches!(result, Err(ReleaseError::Api { status: 403, .. })));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let mut server = Server::new_async().await;
        let body = release_json(&server, "v3.1.0", &[], "");
        let failing = server
            .mock("GET", "/repos/sigp/lighthouse/releases/latest")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;
        let healthy = server
            .mock("GET", "/repos/sigp/lighthouse/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let version = source(&server, None)
            .latest_version(ClientKind::Lighthouse)
            .await
            .unwrap();
        assert_eq!(version, Version::new(3, 1, 0));

        failing.assert_async().await;
        healthy.assert_async().await;
    }

    #[tokio::test]
    async fn test_checksum_list_fetch_is_retried() {
        let mut server = Server::new_async().await;
        let body = release_json(
            &server,
            "v1.3.2",
            &["mev-boost_1.3.2_linux_amd64.tar.gz", "checksums.txt"],
            "",
        );
        let release_mock = server
            .mock("GET", "/repos/flashbots/mev-boost/releases/latest")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;
        let unavailable = server
            .mock("GET", "/download/checksums.txt")
            .with_status(503)
            .create_async()
            .await;
        let checksums = server
            .mock("GET", "/download/checksums.txt")
            .with_status(200)
            .with_body(format!("{HASH_A}  mev-boost_1.3.2_linux_amd64.tar.gz\n"))
            .create_async()
            .await;

        let artifact = source(&server, None)
            .fetch_latest_release(ClientKind::MevBoost)
            .await
            .unwrap();
        assert_eq!(artifact.integrity, Some(Integrity::Sha256(HASH_A.to_owned())));

        release_mock.assert_async().await;
        unavailable.assert_async().await;
        checksums.assert_async().await;
    }

    #[tokio::test]
    async fn test_persistent_server_error_gives_up() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/flashbots/mev-boost/releases/latest")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let result = source(&server, None)
            .latest_version(ClientKind::MevBoost)
            .await;
        assert!(matches!(result, Err(ReleaseError::Api { status: 500, .. })));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_is_sent() {
        let mut server = Server::new_async().await;
        let body = release_json(&server, "v22.9.1", &[], "");
        let mock = server
            .mock("GET", "/repos/status-im/nimbus-eth2/releases/latest")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(body)
            .create_async()
            .await;

        let result = source(&server, Some("test-token"))
            .latest_version(ClientKind::Nimbus)
            .await;
        assert!(result.is_ok());

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_release_published() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/flashbots/mev-boost/releases/latest")
            .with_status(404)
            .create_async()
            .await;

        let result = source(&server, None)
            .latest_version(ClientKind::MevBoost)
            .await;
        assert!(matches!(result, Err(ReleaseError::NoRelease(_))));

        mock.assert_async().await;
    }

    #[test]
    fn test_parse_sha256sums() {
        let content = format!("{HASH_A}  teku-22.9.0.tar.gz\n{HASH_B} *dist/teku-22.9.0.zip\n");
        assert_eq!(
            parse_sha256sums(&content, "teku-22.9.0.zip"),
            Some(HASH_B.to_owned())
        );
        assert_eq!(
            parse_sha256sums(&content, "teku-22.9.0.tar.gz"),
            Some(HASH_A.to_owned())
        );
        assert_eq!(parse_sha256sums(&content, "teku-22.8.1.tar.gz"), None);
    }

    #[test]
    fn test_parse_sha256sums_rejects_short_hash() {
        assert_eq!(parse_sha256sums("abc123  geth.tar.gz", "geth.tar.gz"), None);
    }

    #[test]
    fn test_checksum_from_body_same_line() {
        let body = format!("| nimbus-eth2_Linux_amd64_22.9.1.tar.gz | {} |", HASH_A.to_uppercase());
        assert_eq!(
            checksum_from_body(&body, "nimbus-eth2_Linux_amd64_22.9.1.tar.gz"),
            Some(HASH_A.to_owned())
        );
    }

    #[test]
    fn test_checksum_lists() {
        assert!(is_checksum_list("SHA256SUMS"));
        assert!(is_checksum_list("checksums.txt"));
        assert!(!is_checksum_list("SHA256SUMS.asc"));
        assert!(!is_checksum_list("geth-linux-amd64.tar.gz"));
    }
}
