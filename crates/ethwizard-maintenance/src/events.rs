// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Structured maintenance events
//!
//! Every pass and every executed action is reported as one JSON line in the
//! log, so an operator can reconstruct what a run did from the journal.

use ethwizard_types::{ClientKind, MaintenanceAction};
use serde::Serialize;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize)]
pub enum MaintenanceEvent {
    PassStarted {
        pass: u32,
        pending: usize,
    },
    ActionStarted {
        unit: String,
        client: ClientKind,
        action: MaintenanceAction,
    },
    ActionCompleted {
        unit: String,
        client: ClientKind,
        action: MaintenanceAction,
        duration_secs: u64,
    },
    ActionFailed {
        unit: String,
        client: ClientKind,
        action: MaintenanceAction,
        error: String,
        verification: bool,
    },
    ActionUnimplemented {
        unit: String,
        client: ClientKind,
        action: MaintenanceAction,
    },
    PassAborted {
        pass: u32,
        unit: String,
    },
    PassCompleted {
        pass: u32,
        executed: usize,
    },
}

/// Write `event` to the log at a level matching its severity
pub fn report_event(event: &MaintenanceEvent) {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!("Could not serialize maintenance event: {e}");
            return;
        }
    };

    match event {
        MaintenanceEvent::ActionFailed { .. } | MaintenanceEvent::PassAborted { .. } => {
            error!("Maintenance event: {json}");
        }
        MaintenanceEvent::ActionUnimplemented { .. } => warn!("Maintenance event: {json}"),
        _ => info!("Maintenance event: {json}"),
    }
}
