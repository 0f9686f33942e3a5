// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Maintenance dashboard loop
//!
//! Displaying: probe every unit, decide, render, ask once for the whole
//! batch. Executing: run the approved actions unit by unit, stopping at the
//! first failure, then go back to displaying with a fresh probe.

use crate::context::PersistedContext;
use crate::engine::{DecisionInput, decide, matched_rules};
use crate::error::{ActionError, DashboardError, ProbeError};
use crate::events::{MaintenanceEvent, report_event};
use crate::executor::Executor;
use crate::probe::{Prober, UnitSnapshot};
use crate::unit::ManagedUnit;
use chrono::Utc;
use comfy_table::{Attribute, Cell, Color, Table, presets::UTF8_FULL};
use ethwizard_types::{MaintenanceAction, MergeReadinessPolicy};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One unit's probe result and the action decided for it
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub snapshot: UnitSnapshot,
    pub action: MaintenanceAction,
    /// Cascade rules that matched, last one decided
    pub matched: Vec<&'static str>,
}

/// How a dashboard run ended
#[derive(Debug)]
pub enum DashboardOutcome {
    /// No unit has an actionable step
    UpToDate,
    /// The operator declined the batch
    Declined,
    /// An action failed; nothing after it in the pass was attempted
    Aborted {
        unit: String,
        action: MaintenanceAction,
        error: ActionError,
    },
    /// A pass completed but the re-probe asks for exactly the same batch again
    Stalled,
}

/// Operator approval of a batch of actions
pub trait Confirm {
    fn confirm(&mut self, pending: &[&Evaluation]) -> std::io::Result<bool>;
}

/// Ask on stdin, default no
#[derive(Debug, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, pending: &[&Evaluation]) -> std::io::Result<bool> {
        println!();
        println!("Pending maintenance:");
        for evaluation in pending {
            println!(
                "  {}: {}",
                evaluation.snapshot.unit.label(),
                evaluation.action
            );
        }
        println!();

        print!("Proceed? [y/N]: ");
        std::io::stdout().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        Ok(input.trim().eq_ignore_ascii_case("y"))
    }
}

/// Approve every batch (`run --yes`)
#[derive(Debug, Default)]
pub struct AutoApprove;

impl Confirm for AutoApprove {
    fn confirm(&mut self, pending: &[&Evaluation]) -> std::io::Result<bool> {
        info!("Auto-approving {} maintenance action(s)", pending.len());
        Ok(true)
    }
}

/// Summary table of every unit
pub fn render(evaluations: &[Evaluation]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(
        [
            "Unit",
            "Client",
            "Installed",
            "Running",
            "Available",
            "Latest",
            "Service",
            "Merge",
            "Action",
        ]
        .into_iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold)),
    );

    for evaluation in evaluations {
        let snapshot = &evaluation.snapshot;
        let versions = &snapshot.versions;

        let action = Cell::new(evaluation.action.description());
        let action = match evaluation.action {
            MaintenanceAction::DoNothing => action.fg(Color::Green),
            MaintenanceAction::CheckAgainSoon => action.fg(Color::Yellow),
            _ => action.fg(Color::Red),
        };

        table.add_row(vec![
            Cell::new(snapshot.unit.role()),
            Cell::new(snapshot.unit.kind),
            Cell::new(versions.installed),
            Cell::new(versions.running),
            Cell::new(versions.available),
            Cell::new(versions.latest),
            Cell::new(snapshot.service_summary()),
            Cell::new(if snapshot.merge_configured { "yes" } else { "no" }),
            action,
        ]);
    }

    table
}

pub struct Dashboard<'a> {
    prober: Prober<'a>,
    executor: Executor<'a>,
    policy: MergeReadinessPolicy,
    context: PersistedContext,
    units: Vec<ManagedUnit>,
}

impl std::fmt::Debug for Dashboard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("executor", &self.executor)
            .field("policy", &self.policy)
            .field("units", &self.units)
            .finish_non_exhaustive()
    }
}

impl<'a> Dashboard<'a> {
    /// `units` must already be in maintenance order
    pub fn new(
        prober: Prober<'a>,
        executor: Executor<'a>,
        policy: MergeReadinessPolicy,
        context: PersistedContext,
        units: Vec<ManagedUnit>,
    ) -> Self {
        Self {
            prober,
            executor,
            policy,
            context,
            units,
        }
    }

    pub fn context(&self) -> &PersistedContext {
        &self.context
    }

    /// Probe every unit and decide its next action
    pub async fn evaluate(&self) -> Result<Vec<Evaluation>, ProbeError> {
        let mut evaluations = Vec::with_capacity(self.units.len());
        for unit in &self.units {
            let snapshot = self.prober.probe(unit).await?;
            let input = DecisionInput::from_snapshot(&snapshot, &self.context, &self.policy);
            let action = decide(&input);
            let matched = matched_rules(&input);
            debug!("{}: rules {matched:?} -> {action:?}", unit.label());
            evaluations.push(Evaluation {
                snapshot,
                action,
                matched,
            });
        }
        Ok(evaluations)
    }

    /// Probe and print the table without asking anything
    pub async fn show_status(&self) -> Result<Vec<Evaluation>, DashboardError> {
        let evaluations = self.evaluate().await?;
        println!("{}", render(&evaluations));
        if let Some(at) = self.context.last_maintenance_at() {
            println!("Last maintenance: {}", at.to_rfc3339());
        }
        Ok(evaluations)
    }

    /// Run the display/confirm/execute loop until nothing is left to do,
    /// the operator declines or an action fails.
    pub async fn run(&mut self, confirm: &mut dyn Confirm) -> Result<DashboardOutcome, DashboardError> {
        let mut previous_plan: Option<Vec<(String, MaintenanceAction)>> = None;
        let mut pass = 0u32;

        loop {
            let evaluations = self.show_status().await?;
            let pending: Vec<&Evaluation> = evaluations
                .iter()
                .filter(|evaluation| evaluation.action.is_actionable())
                .collect();

            if pending.is_empty() {
                info!("All clients are up to date");
                return Ok(DashboardOutcome::UpToDate);
            }

            let plan: Vec<(String, MaintenanceAction)> = pending
                .iter()
                .map(|evaluation| (evaluation.snapshot.unit.label(), evaluation.action))
                .collect();
            if previous_plan.as_ref() == Some(&plan) {
                warn!("The last pass changed nothing; stopping to avoid repeating it");
                return Ok(DashboardOutcome::Stalled);
            }

            if !confirm.confirm(&pending)? {
                info!("Maintenance declined");
                return Ok(DashboardOutcome::Declined);
            }

            pass += 1;
            report_event(&MaintenanceEvent::PassStarted {
                pass,
                pending: pending.len(),
            });

            for evaluation in &pending {
                if let Err(error) = self.execute(evaluation).await {
                    let unit = evaluation.snapshot.unit.label();
                    report_event(&MaintenanceEvent::PassAborted {
                        pass,
                        unit: unit.clone(),
                    });
                    return Ok(DashboardOutcome::Aborted {
                        unit,
                        action: evaluation.action,
                        error,
                    });
                }
            }

            self.context.set_last_maintenance_at(Utc::now());
            self.context.save()?;
            report_event(&MaintenanceEvent::PassCompleted {
                pass,
                executed: pending.len(),
            });

            previous_plan = Some(plan);
        }
    }

    async fn execute(&mut self, evaluation: &Evaluation) -> Result<(), ActionError> {
        let unit = evaluation.snapshot.unit.label();
        let client = evaluation.snapshot.unit.kind;
        let action = evaluation.action;

        report_event(&MaintenanceEvent::ActionStarted {
            unit: unit.clone(),
            client,
            action,
        });
        if action == MaintenanceAction::ReinstallClient {
            report_event(&MaintenanceEvent::ActionUnimplemented {
                unit: unit.clone(),
                client,
                action,
            });
        }

        let started = Instant::now();
        match self.executor.execute(&evaluation.snapshot, action).await {
            Ok(delta) => {
                if !delta.is_empty() {
                    self.context.apply(&delta);
                    self.context.save()?;
                }
                report_event(&MaintenanceEvent::ActionCompleted {
                    unit,
                    client,
                    action,
                    duration_secs: started.elapsed().as_secs(),
                });
                Ok(())
            }
            Err(error) => {
                report_event(&MaintenanceEvent::ActionFailed {
                    unit,
                    client,
                    action,
                    error: error.to_string(),
                    verification: error.is_verification_failure(),
                });
                Err(error)
            }
        }
    }
}
