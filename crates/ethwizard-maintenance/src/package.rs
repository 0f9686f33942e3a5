// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! OS package source for clients installed from a package repository

use crate::error::{ActionError, Result};
use async_trait::async_trait;
use ethwizard_types::{Version, VersionValue};
use tokio::process::Command;
use tracing::info;

#[async_trait]
pub trait PackageSource: Send + Sync {
    /// Newest version the repository can install right now
    async fn candidate_version(&self, package: &str) -> Result<Option<Version>>;

    /// Upgrade an installed package in place
    async fn upgrade(&self, package: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AptPackageSource;

impl AptPackageSource {
    async fn run(program: &str, args: &[&str]) -> Result<String> {
        let tool =
            which::which(program).map_err(|_| ActionError::Package(format!("{program} not found")))?;

        let output = Command::new(tool)
            .args(args)
            .env("DEBIAN_FRONTEND", "noninteractive")
            .output()
            .await?;

        if !output.status.success() {
            return Err(ActionError::Package(format!(
                "{program} {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl PackageSource for AptPackageSource {
    async fn candidate_version(&self, package: &str) -> Result<Option<Version>> {
        let stdout = Self::run("apt-cache", &["policy", package]).await?;
        Ok(parse_candidate(&stdout))
    }

    async fn upgrade(&self, package: &str) -> Result<()> {
        info!("Refreshing package lists");
        Self::run("apt-get", &["update"]).await?;
        info!("Upgrading {package}");
        Self::run("apt-get", &["install", "--only-upgrade", "-y", package]).await?;
        Ok(())
    }
}

/// The `Candidate:` line of `apt-cache policy`
fn parse_candidate(policy: &str) -> Option<Version> {
    policy
        .lines()
        .find_map(|line| line.trim().strip_prefix("Candidate:"))
        .map(str::trim)
        .filter(|candidate| *candidate != "(none)")
        .and_then(|candidate| VersionValue::parse(candidate).known())
}
