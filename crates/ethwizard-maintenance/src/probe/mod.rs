// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Version & service probe
//!
//! Read-only. Every source that cannot answer degrades to an unknown value
//! or a not-found service; only a missing service manager fails the probe.

pub mod installed;
pub mod merge;
pub mod running;

use crate::adapter::{ClientAdapter, Distribution, adapter_for};
use crate::error::{ProbeError, ServiceError};
use crate::package::PackageSource;
use crate::release_checker::ArtifactSource;
use crate::service::ServiceControl;
use crate::unit::{ManagedUnit, ServiceSlot};
use async_trait::async_trait;
use ethwizard_types::{ClientKind, ServiceState, VersionSet, VersionValue};
use running::StatusClient;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Source of installed and running versions
#[async_trait]
pub trait VersionQuery: Send + Sync {
    async fn installed_version(&self, kind: ClientKind, binary: &Path) -> VersionValue;

    async fn running_version(&self, kind: ClientKind) -> VersionValue;
}

/// Runs the installed binary and queries the live status endpoint
#[derive(Debug, Clone)]
pub struct LiveVersionQuery {
    status: StatusClient,
    command_timeout: Duration,
}

impl LiveVersionQuery {
    pub fn new(status: StatusClient, command_timeout: Duration) -> Self {
        Self {
            status,
            command_timeout,
        }
    }
}

#[async_trait]
impl VersionQuery for LiveVersionQuery {
    async fn installed_version(&self, kind: ClientKind, binary: &Path) -> VersionValue {
        installed::installed_version(adapter_for(kind), binary, self.command_timeout).await
    }

    async fn running_version(&self, kind: ClientKind) -> VersionValue {
        self.status.running_version(adapter_for(kind)).await
    }
}

/// Everything observed about one managed unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitSnapshot {
    pub unit: ManagedUnit,
    /// One entry per service, primary first
    pub services: Vec<(ServiceSlot, ServiceState)>,
    pub versions: VersionSet,
    pub merge_configured: bool,
}

impl UnitSnapshot {
    pub fn adapter(&self) -> &'static dyn ClientAdapter {
        adapter_for(self.unit.kind)
    }

    /// Every service of the unit is registered
    pub fn found(&self) -> bool {
        !self.services.is_empty() && self.services.iter().all(|(_, s)| s.found)
    }

    /// Every service of the unit is up; one stopped service counts as stopped
    pub fn running(&self) -> bool {
        !self.services.is_empty() && self.services.iter().all(|(_, s)| s.running)
    }

    pub fn primary(&self) -> Option<&ServiceState> {
        self.services
            .iter()
            .find(|(slot, _)| *slot == ServiceSlot::Primary)
            .map(|(_, state)| state)
    }

    /// Binary the primary service runs, or the client's default location
    pub fn binary_path(&self) -> PathBuf {
        self.primary()
            .and_then(|state| state.binary_path.clone())
            .unwrap_or_else(|| self.adapter().default_binary_path())
    }

    /// Short service state for the dashboard
    pub fn service_summary(&self) -> &'static str {
        if !self.services.iter().any(|(_, s)| s.found) {
            "missing"
        } else if !self.found() {
            "partially installed"
        } else if self.running() {
            "running"
        } else if self.services.iter().any(|(_, s)| s.running) {
            "partially running"
        } else {
            "stopped"
        }
    }
}

pub struct Prober<'a> {
    services: &'a dyn ServiceControl,
    artifacts: &'a dyn ArtifactSource,
    packages: &'a dyn PackageSource,
    versions: &'a dyn VersionQuery,
}

impl std::fmt::Debug for Prober<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prober").finish_non_exhaustive()
    }
}

impl<'a> Prober<'a> {
    pub fn new(
        services: &'a dyn ServiceControl,
        artifacts: &'a dyn ArtifactSource,
        packages: &'a dyn PackageSource,
        versions: &'a dyn VersionQuery,
    ) -> Self {
        Self {
            services,
            artifacts,
            packages,
            versions,
        }
    }

    pub async fn probe(&self, unit: &ManagedUnit) -> Result<UnitSnapshot, ProbeError> {
        let adapter = adapter_for(unit.kind);

        let mut services = Vec::new();
        for (slot, name) in unit.services() {
            services.push((slot, self.query_service(name).await?));
        }

        let mut snapshot = UnitSnapshot {
            unit: unit.clone(),
            merge_configured: merge::merge_configured(adapter, &services),
            services,
            versions: VersionSet::default(),
        };

        snapshot.versions.installed = if snapshot.found() {
            self.versions
                .installed_version(unit.kind, &snapshot.binary_path())
                .await
        } else {
            VersionValue::Unknown
        };

        // The status endpoint only answers while the primary service runs
        snapshot.versions.running = if snapshot.primary().is_some_and(|s| s.running) {
            self.versions.running_version(unit.kind).await
        } else {
            VersionValue::Unknown
        };

        snapshot.versions.latest = match self.artifacts.latest_version(unit.kind).await {
            Ok(version) => version.into(),
            Err(e) => {
                warn!("{}: latest release unknown: {e}", unit.kind);
                VersionValue::Unknown
            }
        };

        snapshot.versions.available = match adapter.distribution() {
            Distribution::Package { name } => match self.packages.candidate_version(name).await {
                Ok(version) => version.into(),
                Err(e) => {
                    warn!("{}: package candidate unknown: {e}", unit.kind);
                    VersionValue::Unknown
                }
            },
            Distribution::GithubRelease => VersionValue::Unknown,
        };

        debug!(
            "{}: installed={} running={} available={} latest={} merge_configured={}",
            unit.kind,
            snapshot.versions.installed,
            snapshot.versions.running,
            snapshot.versions.available,
            snapshot.versions.latest,
            snapshot.merge_configured
        );

        Ok(snapshot)
    }

    async fn query_service(&self, name: &str) -> Result<ServiceState, ProbeError> {
        match self.services.query(name).await {
            Ok(Some(state)) => Ok(state),
            Ok(None) => {
                debug!("Service {name} is not registered");
                Ok(ServiceState::not_found(name))
            }
            Err(e @ ServiceError::ToolMissing(_)) => Err(ProbeError::Environment(e)),
            Err(e) => {
                warn!("Could not query service {name}: {e}");
                Ok(ServiceState::not_found(name))
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{ActionError, ReleaseError};
    use crate::release_checker::ReleaseArtifact;
    use crate::service::ServiceParameter;
    use ethwizard_types::{Network, Version};
    use std::collections::HashMap;

    #[derive(Debug, Default)]
    pub(crate) struct StaticServices {
        pub states: HashMap<String, ServiceState>,
        pub tool_missing: bool,
    }

    #[async_trait]
    impl ServiceControl for StaticServices {
        async fn query(&self, service: &str) -> Result<Option<ServiceState>, ServiceError> {
            if self.tool_missing {
                return Err(ServiceError::ToolMissing("systemctl".to_owned()));
            }
            Ok(self.states.get(service).cloned())
        }

        async fn start(&self, _service: &str) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn stop(&self, _service: &str) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn restart(&self, _service: &str) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn set_parameter(
            &self,
            _service: &str,
            _parameter: &ServiceParameter,
        ) -> Result<(), ServiceError> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct StaticReleases {
        pub latest: HashMap<ClientKind, Version>,
    }

    #[async_trait]
    impl ArtifactSource for StaticReleases {
        async fn latest_version(&self, kind: ClientKind) -> Result<Version, ReleaseError> {
            self.latest
                .get(&kind)
                .copied()
                .ok_or_else(|| ReleaseError::NoRelease(kind.to_string()))
        }

        async fn fetch_latest_release(
            &self,
            kind: ClientKind,
        ) -> Result<ReleaseArtifact, ReleaseError> {
            Err(ReleaseError::NoRelease(kind.to_string()))
        }

        async fn download(
            &self,
            artifact: &ReleaseArtifact,
            _dest_dir: &Path,
        ) -> Result<PathBuf, ActionError> {
            Err(ActionError::MissingChecksum(artifact.file_name.clone()))
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct StaticPackages {
        pub candidate: Option<Version>,
    }

    #[async_trait]
    impl PackageSource for StaticPackages {
        async fn candidate_version(&self, _package: &str) -> Result<Option<Version>, ActionError> {
            Ok(self.candidate)
        }

        async fn upgrade(&self, _package: &str) -> Result<(), ActionError> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct StaticVersions {
        pub installed: HashMap<ClientKind, Version>,
        pub running: HashMap<ClientKind, Version>,
    }

    #[async_trait]
    impl VersionQuery for StaticVersions {
        async fn installed_version(&self, kind: ClientKind, _binary: &Path) -> VersionValue {
            self.installed.get(&kind).copied().into()
        }

        async fn running_version(&self, kind: ClientKind) -> VersionValue {
            self.running.get(&kind).copied().into()
        }
    }

    fn service(name: &str, running: bool, args: &[&str]) -> ServiceState {
        ServiceState {
            name: name.to_owned(),
            found: true,
            running,
            binary_path: Some(PathBuf::from(format!("/usr/local/bin/{name}"))),
            arguments: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    #[tokio::test]
    async fn test_probe_split_unit() {
        let mut services = StaticServices::default();
        services.states.insert(
            "lighthousebeacon".to_owned(),
            service(
                "lighthousebeacon",
                true,
                &["bn", "--execution-endpoint", "http://127.0.0.1:8551", "--execution-jwt", "/jwt"],
            ),
        );
        services.states.insert(
            "lighthousevalidator".to_owned(),
            service("lighthousevalidator", false, &["vc"]),
        );

        let releases = StaticReleases {
            latest: HashMap::from([(ClientKind::Lighthouse, Version::new(3, 1, 0))]),
        };
        let versions = StaticVersions {
            installed: HashMap::from([(ClientKind::Lighthouse, Version::new(3, 0, 0))]),
            running: HashMap::from([(ClientKind::Lighthouse, Version::new(3, 0, 0))]),
        };
        let packages = StaticPackages::default();
        let prober = Prober::new(&services, &releases, &packages, &versions);

        let unit = ManagedUnit::split(
            ClientKind::Lighthouse,
            Network::Mainnet,
            "lighthousebeacon",
            "lighthousevalidator",
        );
        let snapshot = prober.probe(&unit).await.unwrap();

        assert!(snapshot.found());
        assert!(!snapshot.running());
        assert_eq!(snapshot.service_summary(), "partially running");
        assert!(!snapshot.merge_configured);
        assert_eq!(snapshot.versions.installed, Version::new(3, 0, 0).into());
        assert_eq!(snapshot.versions.running, Version::new(3, 0, 0).into());
        assert_eq!(snapshot.versions.latest, Version::new(3, 1, 0).into());
        assert_eq!(snapshot.versions.available, VersionValue::Unknown);
        assert_eq!(
            snapshot.binary_path(),
            PathBuf::from("/usr/local/bin/lighthousebeacon")
        );
    }

    #[tokio::test]
    async fn test_probe_package_client_reports_available() {
        let mut services = StaticServices::default();
        services
            .states
            .insert("geth".to_owned(), service("geth", false, &["--mainnet"]));
        let releases = StaticReleases::default();
        let packages = StaticPackages {
            candidate: Some(Version::new(1, 10, 25)),
        };
        let versions = StaticVersions {
            installed: HashMap::from([(ClientKind::Geth, Version::new(1, 10, 23))]),
            running: HashMap::from([(ClientKind::Geth, Version::new(1, 10, 23))]),
        };
        let prober = Prober::new(&services, &releases, &packages, &versions);

        let snapshot = prober
            .probe(&ManagedUnit::new(ClientKind::Geth, Network::Mainnet, "geth"))
            .await
            .unwrap();

        assert_eq!(snapshot.versions.available, Version::new(1, 10, 25).into());
        // Failed release lookup degrades to unknown
        assert_eq!(snapshot.versions.latest, VersionValue::Unknown);
        // Stopped service is never asked for its running version
        assert_eq!(snapshot.versions.running, VersionValue::Unknown);
        assert_eq!(snapshot.service_summary(), "stopped");
    }

    #[tokio::test]
    async fn test_probe_missing_service() {
        let services = StaticServices::default();
        let releases = StaticReleases::default();
        let packages = StaticPackages::default();
        let versions = StaticVersions {
            installed: HashMap::from([(ClientKind::Teku, Version::new(22, 9, 0))]),
            ..Default::default()
        };
        let prober = Prober::new(&services, &releases, &packages, &versions);

        let snapshot = prober
            .probe(&ManagedUnit::new(ClientKind::Teku, Network::Mainnet, "teku"))
            .await
            .unwrap();

        assert!(!snapshot.found());
        assert_eq!(snapshot.service_summary(), "missing");
        assert_eq!(snapshot.versions.installed, VersionValue::Unknown);
    }

    #[tokio::test]
    async fn test_missing_service_manager_is_fatal() {
        let services = StaticServices {
            tool_missing: true,
            ..Default::default()
        };
        let releases = StaticReleases::default();
        let packages = StaticPackages::default();
        let versions = StaticVersions::default();
        let prober = Prober::new(&services, &releases, &packages, &versions);

        let result = prober
            .probe(&ManagedUnit::new(ClientKind::Nimbus, Network::Mainnet, "nimbus"))
            .await;
        assert!(matches!(result, Err(ProbeError::Environment(_))));
    }
}
