// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Maintenance actions

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single next maintenance step for a managed unit.
///
/// Actions are derived fresh on every dashboard refresh and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceAction {
    DoNothing,
    StartService,
    RestartService,
    ConfigureMergeSettings,
    UpgradeClient,
    UpgradeAndConfigureMergeSettings,
    CheckAgainSoon,
    ReinstallClient,
    ImproveShutdownTimeout,
}

impl MaintenanceAction {
    /// Whether executing this action mutates anything.
    ///
    /// The dashboard only asks the operator for confirmation when at least
    /// one unit has an actionable step.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::DoNothing | Self::CheckAgainSoon)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::DoNothing => "Nothing to do",
            Self::StartService => "Start the service",
            Self::RestartService => "Restart the service to load the installed version",
            Self::ConfigureMergeSettings => "Configure the client for the merge",
            Self::UpgradeClient => "Upgrade the client",
            Self::UpgradeAndConfigureMergeSettings => {
                "Configure the client for the merge and upgrade it"
            }
            Self::CheckAgainSoon => "New release not available yet, check again soon",
            Self::ReinstallClient => "Service is missing, the client must be reinstalled",
            Self::ImproveShutdownTimeout => "Raise the graceful shutdown timeout",
        }
    }
}

impl fmt::Display for MaintenanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_actionable() {
        assert!(!MaintenanceAction::DoNothing.is_actionable());
        assert!(!MaintenanceAction::CheckAgainSoon.is_actionable());
        assert!(MaintenanceAction::StartService.is_actionable());
        assert!(MaintenanceAction::ReinstallClient.is_actionable());
        assert!(MaintenanceAction::UpgradeAndConfigureMergeSettings.is_actionable());
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&MaintenanceAction::ImproveShutdownTimeout).unwrap();
        assert_eq!(json, "\"improve_shutdown_timeout\"");
    }
}
