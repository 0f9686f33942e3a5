// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Action executor
//!
//! Performs one decided action against the service manager, the artifact
//! source and the package source. Success here only means the commands were
//! accepted; the next probe observes their effect.

use crate::adapter::{ClientAdapter, Distribution, InstallLayout, MergeContext};
use crate::config::MaintenanceConfig;
use crate::context::{ContextDelta, ContextKey};
use crate::error::{Result, ServiceError};
use crate::installer;
use crate::jwt::ensure_jwt_secret;
use crate::package::PackageSource;
use crate::probe::UnitSnapshot;
use crate::release_checker::ArtifactSource;
use crate::service::{ServiceControl, ServiceParameter};
use ethwizard_types::{FlagList, MaintenanceAction, ServiceState};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Machine-wide values the executor writes into service configuration
#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub jwt_secret_path: PathBuf,
    pub engine_api_url: String,
    pub fee_recipient: Option<String>,
    pub shutdown_timeout: Duration,
    /// Parent of the per-upgrade staging directory; system temp dir when unset
    pub staging_dir: Option<PathBuf>,
}

impl ExecutorSettings {
    pub fn from_config(config: &MaintenanceConfig) -> Self {
        Self {
            jwt_secret_path: config.jwt_secret_path.clone(),
            engine_api_url: config.endpoints.engine_api_url.clone(),
            fee_recipient: config.fee_recipient.clone(),
            shutdown_timeout: config.shutdown_timeout(),
            staging_dir: None,
        }
    }
}

pub struct Executor<'a> {
    services: &'a dyn ServiceControl,
    artifacts: &'a dyn ArtifactSource,
    packages: &'a dyn PackageSource,
    settings: ExecutorSettings,
}

impl std::fmt::Debug for Executor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<'a> Executor<'a> {
    pub fn new(
        services: &'a dyn ServiceControl,
        artifacts: &'a dyn ArtifactSource,
        packages: &'a dyn PackageSource,
        settings: ExecutorSettings,
    ) -> Self {
        Self {
            services,
            artifacts,
            packages,
            settings,
        }
    }

    /// Execute `action` for the unit described by `snapshot`.
    ///
    /// The returned delta lists the context keys to record as done.
    pub async fn execute(
        &self,
        snapshot: &UnitSnapshot,
        action: MaintenanceAction,
    ) -> Result<ContextDelta> {
        let unit = &snapshot.unit;
        info!("{}: {}", unit.label(), action.description());

        match action {
            MaintenanceAction::DoNothing | MaintenanceAction::CheckAgainSoon => {}
            MaintenanceAction::StartService => {
                for (_, state) in &snapshot.services {
                    if state.found && !state.running {
                        self.services.start(&state.name).await?;
                    }
                }
            }
            MaintenanceAction::RestartService => {
                for (_, state) in &snapshot.services {
                    self.services.restart(&state.name).await?;
                }
            }
            MaintenanceAction::ConfigureMergeSettings => {
                self.configure_merge(snapshot, true).await?;
            }
            MaintenanceAction::UpgradeClient => {
                self.upgrade(snapshot).await?;
            }
            MaintenanceAction::UpgradeAndConfigureMergeSettings => {
                // The upgrade restarts the services, which picks up the new arguments
                self.configure_merge(snapshot, false).await?;
                self.upgrade(snapshot).await?;
            }
            MaintenanceAction::ImproveShutdownTimeout => {
                let timeout = ServiceParameter::ShutdownTimeout(self.settings.shutdown_timeout);
                for (_, state) in &snapshot.services {
                    self.services.set_parameter(&state.name, &timeout).await?;
                }
                return Ok(ContextDelta::completed(ContextKey::ShutdownTimeoutImproved(
                    unit.kind,
                )));
            }
            MaintenanceAction::ReinstallClient => {
                warn!(
                    "{}: service is not registered and reinstalling is not supported; \
                     reinstall it with the setup wizard",
                    unit.label()
                );
            }
        }

        Ok(ContextDelta::none())
    }

    /// Rewrite every service's arguments with the client's merge settings
    async fn configure_merge(&self, snapshot: &UnitSnapshot, restart: bool) -> Result<()> {
        let adapter = snapshot.adapter();

        // The consensus layer reads the secret the execution layer creates
        if adapter.creates_jwt_secret() {
            ensure_jwt_secret(&self.settings.jwt_secret_path)?;
        }

        let ctx = MergeContext {
            jwt_secret_path: &self.settings.jwt_secret_path,
            engine_api_url: &self.settings.engine_api_url,
            fee_recipient: self.settings.fee_recipient.as_deref(),
        };

        // Resolve every service's new arguments before touching any of them
        let mut updates = Vec::new();
        for (slot, state) in &snapshot.services {
            let mut flags = FlagList::parse(&state.arguments);
            for (flag, value) in adapter.merge_settings(*slot, &ctx)? {
                flags.set(flag, value);
            }

            let arguments = flags.to_args();
            if arguments == state.arguments {
                debug!("{}: arguments already configured", state.name);
                continue;
            }
            updates.push((state, arguments));
        }

        for (state, arguments) in updates {
            let bounce = restart && state.running;
            if bounce {
                self.services.stop(&state.name).await?;
            }
            self.services
                .set_parameter(&state.name, &ServiceParameter::Arguments(arguments))
                .await?;
            if bounce {
                self.services.start(&state.name).await?;
            }
            info!("{}: merge settings written", state.name);
        }

        Ok(())
    }

    async fn upgrade(&self, snapshot: &UnitSnapshot) -> Result<()> {
        let adapter = snapshot.adapter();
        match adapter.distribution() {
            Distribution::Package { name } => {
                self.stop_running(snapshot).await?;
                let upgraded = self.packages.upgrade(name).await;
                self.start_after_replace(snapshot, upgraded).await
            }
            Distribution::GithubRelease => self.upgrade_from_release(snapshot, adapter).await,
        }
    }

    async fn upgrade_from_release(
        &self,
        snapshot: &UnitSnapshot,
        adapter: &dyn ClientAdapter,
    ) -> Result<()> {
        let artifact = self.artifacts.fetch_latest_release(adapter.kind()).await?;
        info!(
            "{}: upgrading to {} ({})",
            snapshot.unit.label(),
            artifact.version,
            artifact.file_name
        );

        let mut builder = tempfile::Builder::new();
        builder.prefix("ethwizard-upgrade-");
        let staging = match &self.settings.staging_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                builder.tempdir_in(dir)?
            }
            None => builder.tempdir()?,
        };

        // Download, verify and unpack before any service is stopped
        let archive = self.artifacts.download(&artifact, staging.path()).await?;
        let extracted = staging.path().join("extracted");
        installer::extract(&archive, adapter.archive_format(), &extracted).await?;

        let layout = adapter.install_layout();
        let payload = installer::locate_payload(&extracted, layout)?;
        let binary_path = snapshot.binary_path();
        let target = match layout {
            InstallLayout::SingleBinary { .. } => binary_path,
            InstallLayout::Directory => adapter.install_root(&binary_path),
        };

        self.stop_running(snapshot).await?;
        let installed = installer::install(&payload, &target, layout);
        self.start_after_replace(snapshot, installed).await?;

        info!(
            "{}: installed {} at {}",
            snapshot.unit.label(),
            artifact.version,
            target.display()
        );
        Ok(())
    }

    async fn stop_running(&self, snapshot: &UnitSnapshot) -> Result<(), ServiceError> {
        for (_, state) in &snapshot.services {
            if state.running {
                self.services.stop(&state.name).await?;
            }
        }
        Ok(())
    }

    /// Start every service again whether or not the replacement worked.
    ///
    /// A failed replacement left the previous install in place, so the unit
    /// comes back on its old version and the replacement error is returned.
    async fn start_after_replace(&self, snapshot: &UnitSnapshot, replaced: Result<()>) -> Result<()> {
        let services: Vec<&ServiceState> = snapshot
            .services
            .iter()
            .map(|(_, state)| state)
            .filter(|state| state.found)
            .collect();

        if let Err(e) = replaced {
            for state in services {
                if let Err(start_error) = self.services.start(&state.name).await {
                    error!("{}: could not start after failed upgrade: {start_error}", state.name);
                }
            }
            return Err(e);
        }

        for state in services {
            self.services.start(&state.name).await?;
        }
        Ok(())
    }
}
