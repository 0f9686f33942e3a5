// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Archive downloader with SHA256 and signature verification module

use crate::config::RetryPolicy;
use crate::error::{ActionError, Result};
use crate::release_checker::{Integrity, ReleaseArtifact};
use futures_util::StreamExt;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{info, warn};

/// Download a release archive and verify it before returning its path.
///
/// Nothing outside `dest_dir` is touched, and a file that fails
/// verification is removed again.
pub async fn download_and_verify(
    client: &reqwest::Client,
    artifact: &ReleaseArtifact,
    dest_dir: &Path,
    retry: &RetryPolicy,
) -> Result<PathBuf> {
    let integrity = artifact
        .integrity
        .as_ref()
        .ok_or_else(|| ActionError::MissingChecksum(artifact.file_name.clone()))?;

    let path = dest_dir.join(&artifact.file_name);
    info!("Downloading {} {}", artifact.kind, artifact.version);
    let actual_hash = download_with_retry(client, &artifact.download_url, &path, retry).await?;

    match integrity {
        Integrity::Sha256(expected) => {
            if !actual_hash.eq_ignore_ascii_case(expected) {
                std::fs::remove_file(&path)?;
                return Err(ActionError::ChecksumMismatch {
                    file: artifact.file_name.clone(),
                    expected: expected.clone(),
                    actual: actual_hash,
                });
            }
        }
        Integrity::Signature { url } => {
            let signature_path = dest_dir.join(format!("{}.asc", artifact.file_name));
            download_with_retry(client, url, &signature_path, retry).await?;
            if let Err(e) = verify_signature(&path, &signature_path).await {
                std::fs::remove_file(&path)?;
                return Err(e);
            }
        }
    }

    info!("{} verified", artifact.file_name);
    Ok(path)
}

/// Download `url` to `path`, returning the SHA-256 of what was written.
///
/// Each attempt gets a longer timeout than the last.
pub async fn download_with_retry(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    retry: &RetryPolicy,
) -> Result<String> {
    let mut last_error = None;

    for attempt in 0..retry.attempts {
        let timeout = retry.timeout_for(attempt);
        if attempt > 0 {
            warn!(
                "Retrying download (attempt {}/{}, timeout {}s)",
                attempt + 1,
                retry.attempts,
                timeout.as_secs()
            );
        }

        match download_once(client, url, path, timeout).await {
            Ok(hash) => return Ok(hash),
            Err(e) => {
                warn!("Download of {url} failed: {e}");
                if path.exists() {
                    let _ = std::fs::remove_file(path);
                }
                last_error = Some(e);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ActionError::Download("No download attempted".to_owned())))
}

async fn download_once(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    timeout: Duration,
) -> Result<String> {
    let response = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| ActionError::Download(format!("Request failed: {e}")))?;

    if !response.status().is_success() {
        return Err(ActionError::Download(format!(
            "Download failed with status: {}",
            response.status()
        )));
    }

    let mut file = tokio::fs::File::create(path).await?;
    let mut hasher = Sha256::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk =
            chunk.map_err(|e| ActionError::Download(format!("Failed to read body: {e}")))?;
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
    }
    file.flush().await?;

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a detached signature against the operator's keyring
async fn verify_signature(file: &Path, signature: &Path) -> Result<()> {
    let file_name = file
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());

    let gpg = which::which("gpg").map_err(|_| ActionError::SignatureInvalid {
        file: file_name.clone(),
        message: "gpg is not installed".to_owned(),
    })?;

    let output = Command::new(gpg)
        .arg("--batch")
        .arg("--verify")
        .arg(signature)
        .arg(file)
        .output()
        .await?;

    if !output.status.success() {
        return Err(ActionError::SignatureInvalid {
            file: file_name,
            message: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        });
    }

    Ok(())
}
