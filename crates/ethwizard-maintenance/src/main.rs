// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! ethwizard-maintain - entry point for the maintenance dashboard

use anyhow::Context;
use clap::{Parser, Subcommand};
use ethwizard_maintenance::probe::running::StatusClient;
use ethwizard_maintenance::release_checker::GithubReleaseSource;
use ethwizard_maintenance::service::{NssmServiceControl, ServiceControl, SystemdServiceControl};
use ethwizard_maintenance::package::AptPackageSource;
use ethwizard_maintenance::{
    AutoApprove, Confirm, DEFAULT_CONFIG_PATH, Dashboard, DashboardOutcome, Executor,
    ExecutorSettings, LiveVersionQuery, PersistedContext, Prober, ServiceManagerKind, StdinConfirm,
    load_config, units_from_config,
};
use ethwizard_types::MergeReadinessPolicy;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};

/// Time a client binary gets to print its version
const VERSION_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser)]
#[command(name = "ethwizard-maintain")]
#[command(author, version, about = "Keep ethwizard-installed Ethereum clients maintained")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe every client and show what maintenance is pending
    Status,

    /// Show pending maintenance and run it after confirmation
    Run {
        /// Approve every batch without asking
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries the dashboard
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("ethwizard_maintenance=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    if !nix::unistd::Uid::effective().is_root() {
        warn!("Not running as root; service control and installs will likely fail");
    }

    let config = load_config(&cli.config)?;
    info!(
        "Maintaining {} unit(s) on {:?} via {:?}",
        config.units.len(),
        config.network,
        config.service_manager
    );

    let services: Box<dyn ServiceControl> = match config.service_manager {
        ServiceManagerKind::Systemd => Box::new(SystemdServiceControl::new()?),
        ServiceManagerKind::Nssm => Box::new(NssmServiceControl::new()?),
    };
    let artifacts = GithubReleaseSource::new(&config.github, config.retry)?;
    let packages = AptPackageSource;
    let versions = LiveVersionQuery::new(
        StatusClient::new(&config.endpoints).context("Failed to build status client")?,
        VERSION_COMMAND_TIMEOUT,
    );
    let context = PersistedContext::load(&config.context_path).with_context(|| {
        format!(
            "Failed to load context from {}",
            config.context_path.display()
        )
    })?;

    let prober = Prober::new(services.as_ref(), &artifacts, &packages, &versions);
    let executor = Executor::new(
        services.as_ref(),
        &artifacts,
        &packages,
        ExecutorSettings::from_config(&config),
    );
    let mut dashboard = Dashboard::new(
        prober,
        executor,
        MergeReadinessPolicy::new(),
        context,
        units_from_config(&config),
    );

    match cli.command {
        Commands::Status => {
            dashboard.show_status().await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run { yes } => {
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(AutoApprove)
            } else {
                Box::new(StdinConfirm)
            };

            match dashboard.run(confirm.as_mut()).await? {
                DashboardOutcome::UpToDate => {
                    println!("All clients are up to date.");
                    Ok(ExitCode::SUCCESS)
                }
                DashboardOutcome::Declined => {
                    println!("No changes made.");
                    Ok(ExitCode::SUCCESS)
                }
                DashboardOutcome::Stalled => {
                    println!("Pending maintenance could not be completed; see the log above.");
                    Ok(ExitCode::FAILURE)
                }
                DashboardOutcome::Aborted {
                    unit,
                    action,
                    error,
                } => {
                    error!("{unit}: '{action}' failed: {error}");
                    if error.is_verification_failure() {
                        println!("{unit}: download verification failed, the installed client was left untouched.");
                    } else if error.is_environment_failure() {
                        println!("{unit}: the service manager is not available.");
                    } else {
                        println!("{unit}: '{action}' failed: {error}");
                    }
                    println!("Maintenance stopped; later units were not touched.");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}
