// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Installed version: ask the on-disk binary

use crate::adapter::ClientAdapter;
use ethwizard_types::{Version, VersionValue};
use regex::Regex;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Run `binary` with the client's version arguments and parse what it prints.
///
/// Any failure (missing binary, non-zero exit, unmatched output, timeout)
/// is `Unknown`.
pub async fn installed_version(
    adapter: &dyn ClientAdapter,
    binary: &Path,
    timeout: Duration,
) -> VersionValue {
    let kind = adapter.kind();
    let command = Command::new(binary)
        .args(adapter.version_args())
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, command).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!("{kind}: could not run {}: {e}", binary.display());
            return VersionValue::Unknown;
        }
        Err(_) => {
            warn!("{kind}: {} did not report a version in time", binary.display());
            return VersionValue::Unknown;
        }
    };

    // Some clients print their version banner to stderr
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push('\n');
    text.push_str(&String::from_utf8_lossy(&output.stderr));

    let version = match_version(adapter.version_pattern(), &text);
    if version.is_none() {
        warn!("{kind}: no version in output of {}", binary.display());
        debug!("{kind} version output: {text}");
    }
    version.into()
}

/// Apply a client version pattern whose first capture group is `X.Y.Z`
pub fn match_version(pattern: &str, text: &str) -> Option<Version> {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Invalid version pattern {pattern}: {e}");
            return None;
        }
    };

    let captured = re.captures(text)?.get(1)?.as_str();
    VersionValue::parse(captured).known()
}
