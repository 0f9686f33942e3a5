// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Engine API JWT secret

use rand::RngCore;
use std::path::Path;
use tracing::info;

const SECRET_BYTES: usize = 32;

/// Create the shared JWT secret if it does not exist yet.
///
/// Returns `true` when a new secret was written. An existing file is never
/// touched: both layers authenticate with it.
pub fn ensure_jwt_secret(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret = hex::encode(bytes);

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, secret)?;
    restrict_permissions(&temp_path)?;
    std::fs::rename(&temp_path, path)?;

    info!("Created JWT secret at {}", path.display());
    Ok(true)
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
