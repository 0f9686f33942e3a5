// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Error types for the maintenance crate
//!
//! Unknown probe values are not errors; they are `VersionValue::Unknown`.
//! Only the probe's environment check and the executor produce errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("service manager tool not found: {0}")]
    ToolMissing(String),

    #[error("service {service}: `{command}` failed: {message}")]
    Command {
        service: String,
        command: String,
        message: String,
    },

    #[error("service {0} is not registered")]
    NotFound(String),

    #[error("service manager I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("release request failed: {0}")]
    Request(String),

    #[error("GitHub API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse release: {0}")]
    Parse(String),

    #[error("no published release for {0}")]
    NoRelease(String),

    #[error("no {asset} asset in release {tag}")]
    NoAsset { asset: String, tag: String },

    #[error("{0} is not distributed through GitHub releases")]
    NotDistributed(String),
}

impl ReleaseError {
    /// Failures worth another attempt: transport errors, rate limiting and 5xx
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Request(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Fatal probe failure. Everything else degrades to unknown values.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("environment failure: {0}")]
    Environment(#[source] ServiceError),
}

#[derive(Debug, Error)]
pub enum ContextError {
    #[error("context persistence error: {0}")]
    Io(#[from] std::io::Error),

    #[error("context serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Release(#[from] ReleaseError),

    #[error("download failed: {0}")]
    Download(String),

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("no published checksum or signature for {0}")]
    MissingChecksum(String),

    #[error("signature check failed for {file}: {message}")]
    SignatureInvalid { file: String, message: String },

    #[error("package manager error: {0}")]
    Package(String),

    #[error("install failed: {0}")]
    Install(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ActionError {
    /// Integrity failures abort before anything on disk is touched
    pub fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::ChecksumMismatch { .. }
                | Self::MissingChecksum(_)
                | Self::SignatureInvalid { .. }
        )
    }

    /// A missing service manager is fatal to the whole run, not just a step
    pub fn is_environment_failure(&self) -> bool {
        matches!(self, Self::Service(ServiceError::ToolMissing(_)))
    }
}

/// Failures that end the dashboard loop itself rather than one action
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("confirmation prompt failed: {0}")]
    Prompt(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T, E = ActionError> = std::result::Result<T, E>;
