// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Maintenance decision engine
//!
//! An ordered rule table. Every rule whose predicate holds overwrites the
//! action of the rules before it, so the last matching rule decides. Later
//! rules are stronger prerequisites or safety gaps that must not hide behind
//! a routine upgrade.
//!
//! The engine never fails. Unknown versions make every comparison false, so
//! rules that depend on them simply do not fire.

use crate::context::PersistedContext;
use crate::probe::UnitSnapshot;
use ethwizard_types::{ClientKind, MaintenanceAction, MergeReadinessPolicy, Network, VersionSet};

/// Everything a decision depends on
#[derive(Debug, Clone, Copy)]
pub struct DecisionInput<'a> {
    pub kind: ClientKind,
    pub network: Network,
    /// Every service of the unit is registered
    pub found: bool,
    /// Every service of the unit is running
    pub running: bool,
    pub versions: VersionSet,
    pub merge_configured: bool,
    pub shutdown_timeout_improved: bool,
    pub policy: &'a MergeReadinessPolicy,
}

impl<'a> DecisionInput<'a> {
    pub fn from_snapshot(
        snapshot: &UnitSnapshot,
        context: &PersistedContext,
        policy: &'a MergeReadinessPolicy,
    ) -> Self {
        let kind = snapshot.unit.kind;
        Self {
            kind,
            network: snapshot.unit.network,
            found: snapshot.found(),
            running: snapshot.running(),
            versions: snapshot.versions,
            merge_configured: snapshot.merge_configured,
            // Clients without on-disk state have nothing to flush
            shutdown_timeout_improved: !kind.needs_graceful_shutdown()
                || context.shutdown_timeout_improved(kind),
            policy,
        }
    }

    fn installed_merge_ready(&self) -> bool {
        self.policy
            .is_merge_ready(self.network, self.kind, &self.versions.installed)
    }

    fn upgrade_pending(&self) -> bool {
        self.versions
            .installed
            .is_known_less_than(&self.versions.upgrade_target())
    }

    fn target_merge_ready(&self) -> bool {
        self.policy
            .is_merge_ready(self.network, self.kind, &self.versions.upgrade_target())
    }
}

/// One entry of the cascade
pub struct Rule {
    pub name: &'static str,
    pub action: MaintenanceAction,
    applies: fn(&DecisionInput<'_>) -> bool,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub fn applies(&self, input: &DecisionInput<'_>) -> bool {
        (self.applies)(input)
    }
}

/// The cascade, weakest first
pub static RULES: [Rule; 9] = [
    Rule {
        name: "default",
        action: MaintenanceAction::DoNothing,
        applies: |_| true,
    },
    Rule {
        name: "release not yet in distribution channel",
        action: MaintenanceAction::CheckAgainSoon,
        applies: |input| {
            input
                .versions
                .available
                .is_known_less_than(&input.versions.latest)
        },
    },
    Rule {
        name: "service stopped",
        action: MaintenanceAction::StartService,
        applies: |input| !input.running,
    },
    Rule {
        name: "running version behind installed",
        action: MaintenanceAction::RestartService,
        applies: |input| {
            input
                .versions
                .running
                .is_known_less_than(&input.versions.installed)
        },
    },
    Rule {
        name: "merge ready but not configured",
        action: MaintenanceAction::ConfigureMergeSettings,
        applies: |input| input.installed_merge_ready() && !input.merge_configured,
    },
    Rule {
        name: "upgrade available",
        action: MaintenanceAction::UpgradeClient,
        applies: |input| input.upgrade_pending(),
    },
    Rule {
        name: "upgrade reaches merge readiness unconfigured",
        action: MaintenanceAction::UpgradeAndConfigureMergeSettings,
        applies: |input| {
            input.upgrade_pending() && input.target_merge_ready() && !input.merge_configured
        },
    },
    Rule {
        name: "shutdown timeout not improved",
        action: MaintenanceAction::ImproveShutdownTimeout,
        applies: |input| !input.shutdown_timeout_improved,
    },
    Rule {
        name: "service not registered",
        action: MaintenanceAction::ReinstallClient,
        applies: |input| !input.found,
    },
];

/// The next maintenance action for a unit
pub fn decide(input: &DecisionInput<'_>) -> MaintenanceAction {
    RULES
        .iter()
        .rev()
        .find(|rule| rule.applies(input))
        .map_or(MaintenanceAction::DoNothing, |rule| rule.action)
}

/// Names of every rule that matched, in cascade order
pub fn matched_rules(input: &DecisionInput<'_>) -> Vec<&'static str> {
    RULES
        .iter()
        .filter(|rule| rule.applies(input))
        .map(|rule| rule.name)
        .collect()
}
