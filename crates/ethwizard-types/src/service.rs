// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Observed state of one supervised service

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A service registration as reported by the service manager.
///
/// `arguments` is the exact argument vector the service is configured with.
/// Order matters: clients let a later duplicate flag override an earlier one,
/// and reconfiguration must leave unrelated flags where they are.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceState {
    pub name: String,
    pub found: bool,
    pub running: bool,
    pub binary_path: Option<PathBuf>,
    pub arguments: Vec<String>,
}

impl ServiceState {
    /// State of a service the manager has no registration for
    pub fn not_found(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
