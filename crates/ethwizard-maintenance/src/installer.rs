// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Archive extraction and in-place replacement of installed clients
//!
//! The new payload is staged as a `.new` sibling of the install target and
//! swapped in with renames. The previous install is kept as `.bak` until the
//! swap succeeded and is moved back if it did not.

use crate::adapter::{ArchiveFormat, InstallLayout};
use crate::error::{ActionError, Result};
use flate2::read::GzDecoder;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Unpack `archive` into `dest` on the blocking pool
pub async fn extract(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || unpack(&archive, format, &dest))
        .await
        .map_err(|e| ActionError::Install(format!("Extraction task failed: {e}")))?
}

fn unpack(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest)?;
    let file = fs::File::open(archive)?;

    let result = match format {
        ArchiveFormat::TarGz => tar::Archive::new(GzDecoder::new(file))
            .unpack(dest)
            .map_err(|e| e.to_string()),
        ArchiveFormat::Zip => zip::ZipArchive::new(file)
            .and_then(|mut zip| zip.extract(dest))
            .map_err(|e| e.to_string()),
    };

    result.map_err(|message| {
        ActionError::Install(format!("Failed to extract {}: {message}", archive.display()))
    })
}

/// Find what should be installed inside an extracted archive
pub fn locate_payload(staging: &Path, layout: InstallLayout) -> Result<PathBuf> {
    match layout {
        InstallLayout::SingleBinary { binary_name } => find_file(staging, binary_name)?
            .ok_or_else(|| {
                ActionError::Install(format!("archive does not contain {binary_name}"))
            }),
        InstallLayout::Directory => {
            // Archives usually wrap everything in one top-level directory
            let entries: Vec<PathBuf> = fs::read_dir(staging)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<_>>()?;
            match entries.as_slice() {
                [] => Err(ActionError::Install("archive is empty".to_owned())),
                [single] if single.is_dir() => Ok(single.clone()),
                _ => Ok(staging.to_path_buf()),
            }
        }
    }
}

fn find_file(dir: &Path, name: &str) -> Result<Option<PathBuf>> {
    let mut subdirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.file_name().is_some_and(|n| n == name) {
            return Ok(Some(path));
        }
    }
    for subdir in subdirs {
        if let Some(found) = find_file(&subdir, name)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

/// Install `payload` at `target` according to `layout`
pub fn install(payload: &Path, target: &Path, layout: InstallLayout) -> Result<()> {
    match layout {
        InstallLayout::SingleBinary { .. } => replace_binary(payload, target),
        InstallLayout::Directory => replace_directory(payload, target),
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
    path.with_file_name(format!("{name}.{suffix}"))
}

/// Replace one executable
pub fn replace_binary(new_binary: &Path, target: &Path) -> Result<()> {
    let staged = sibling(target, "new");
    fs::copy(new_binary, &staged)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&staged)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&staged, perms)?;
    }

    swap_into_place(&staged, target)?;
    info!("Replaced {}", target.display());
    Ok(())
}

/// Replace a whole install directory
pub fn replace_directory(new_dir: &Path, target: &Path) -> Result<()> {
    let staged = sibling(target, "new");
    if staged.exists() {
        fs::remove_dir_all(&staged)?;
    }
    copy_dir(new_dir, &staged)?;

    swap_into_place(&staged, target)?;
    info!("Replaced {}", target.display());
    Ok(())
}

fn swap_into_place(staged: &Path, target: &Path) -> Result<()> {
    let backup = sibling(target, "bak");
    remove_path(&backup)?;

    let had_previous = target.exists();
    if had_previous {
        fs::rename(target, &backup)?;
    }

    if let Err(e) = fs::rename(staged, target) {
        if had_previous {
            warn!("Install failed, restoring {}", target.display());
            fs::rename(&backup, target)?;
        }
        let _ = remove_path(staged);
        return Err(ActionError::Install(format!(
            "could not move new files to {}: {e}",
            target.display()
        )));
    }

    if had_previous && let Err(e) = remove_path(&backup) {
        warn!("Could not remove {}: {e}", backup.display());
    }
    Ok(())
}

fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)?;
    } else if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
