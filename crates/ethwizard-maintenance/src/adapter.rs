// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Per-client capabilities
//!
//! Everything that differs between clients lives behind [`ClientAdapter`]:
//! how to ask a binary for its version, which flags wire up Engine API
//! authentication, where releases come from and how an install is laid out.
//! The probe and executor are written once against this trait.

use crate::error::ActionError;
use crate::unit::ServiceSlot;
use ethwizard_types::{ClientKind, Version};
use std::path::{Path, PathBuf};

/// CPU architecture used to pick release assets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arch {
    X86_64,
    Aarch64,
}

impl Arch {
    pub fn current() -> Self {
        match std::env::consts::ARCH {
            "aarch64" => Self::Aarch64,
            _ => Self::X86_64,
        }
    }
}

/// Where the live process reports its version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusEndpoint {
    /// `web3_clientVersion` over JSON-RPC
    JsonRpc,
    /// `GET /eth/v1/node/version` on the beacon API
    BeaconNodeVersion,
    /// No version endpoint
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distribution {
    /// OS package repository
    Package { name: &'static str },
    /// Archive attached to (or linked from) a GitHub release
    GithubRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallLayout {
    /// One executable replaced in place
    SingleBinary { binary_name: &'static str },
    /// A whole distribution directory replaced at once
    Directory,
}

/// Values merge settings are derived from
#[derive(Debug, Clone, Copy)]
pub struct MergeContext<'a> {
    pub jwt_secret_path: &'a Path,
    pub engine_api_url: &'a str,
    pub fee_recipient: Option<&'a str>,
}

pub trait ClientAdapter: Send + Sync {
    fn kind(&self) -> ClientKind;

    /// Arguments that make the binary print its version
    fn version_args(&self) -> &'static [&'static str] {
        &["--version"]
    }

    /// Regex with one capture group around the `X.Y.Z` version
    fn version_pattern(&self) -> &'static str;

    fn status_endpoint(&self) -> StatusEndpoint;

    fn default_binary_path(&self) -> PathBuf;

    /// Flags that must all be present for Engine API auth to be wired up
    fn merge_flags(&self, slot: ServiceSlot) -> &'static [&'static str];

    /// `(flag, value)` pairs written by merge configuration
    fn merge_settings(
        &self,
        slot: ServiceSlot,
        ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError>;

    /// GitHub `owner/repo` the upstream project publishes releases in
    fn repository(&self) -> &'static str;

    fn distribution(&self) -> Distribution;

    fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::TarGz
    }

    /// Whether a release asset name is the archive for `arch`
    fn asset_matches(&self, _name: &str, _arch: Arch) -> bool {
        false
    }

    /// Download location for clients that link archives instead of attaching them
    fn download_url(&self, _version: &Version, _arch: Arch) -> Option<String> {
        None
    }

    fn install_layout(&self) -> InstallLayout;

    /// Directory replaced on upgrade, derived from the service's binary path
    fn install_root(&self, binary_path: &Path) -> PathBuf {
        binary_path
            .parent()
            .map_or_else(|| PathBuf::from("/"), Path::to_path_buf)
    }

    /// The execution client owns the JWT secret and creates it when missing
    fn creates_jwt_secret(&self) -> bool {
        false
    }
}

fn jwt(ctx: &MergeContext<'_>) -> String {
    ctx.jwt_secret_path.display().to_string()
}

#[derive(Debug)]
pub struct GethAdapter;

impl ClientAdapter for GethAdapter {
    fn kind(&self) -> ClientKind {
        ClientKind::Geth
    }

    fn version_args(&self) -> &'static [&'static str] {
        &["version"]
    }

    fn version_pattern(&self) -> &'static str {
        r"(?m)^Version:\s*v?(\d+\.\d+\.\d+)"
    }

    fn status_endpoint(&self) -> StatusEndpoint {
        StatusEndpoint::JsonRpc
    }

    fn default_binary_path(&self) -> PathBuf {
        PathBuf::from("/usr/bin/geth")
    }

    fn merge_flags(&self, _slot: ServiceSlot) -> &'static [&'static str] {
        &["--authrpc.jwtsecret"]
    }

    fn merge_settings(
        &self,
        _slot: ServiceSlot,
        ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError> {
        Ok(vec![("--authrpc.jwtsecret", jwt(ctx))])
    }

    fn repository(&self) -> &'static str {
        "ethereum/go-ethereum"
    }

    fn distribution(&self) -> Distribution {
        Distribution::Package { name: "geth" }
    }

    fn install_layout(&self) -> InstallLayout {
        InstallLayout::SingleBinary {
            binary_name: "geth",
        }
    }

    fn creates_jwt_secret(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct NethermindAdapter;

impl ClientAdapter for NethermindAdapter {
    fn kind(&self) -> ClientKind {
        ClientKind::Nethermind
    }

    fn version_pattern(&self) -> &'static str {
        r"Version:\s*v?(\d+\.\d+\.\d+)"
    }

    fn status_endpoint(&self) -> StatusEndpoint {
        StatusEndpoint::JsonRpc
    }

    fn default_binary_path(&self) -> PathBuf {
        PathBuf::from("/usr/local/bin/nethermind/Nethermind.Runner")
    }

    fn merge_flags(&self, _slot: ServiceSlot) -> &'static [&'static str] {
        &["--JsonRpc.JwtSecretFile", "--JsonRpc.EnginePort"]
    }

    fn merge_settings(
        &self,
        _slot: ServiceSlot,
        ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError> {
        let url = reqwest::Url::parse(ctx.engine_api_url).map_err(|e| {
            ActionError::Configuration(format!("engine API URL {}: {e}", ctx.engine_api_url))
        })?;
        let host = url.host_str().unwrap_or("127.0.0.1").to_owned();
        let port = url.port_or_known_default().unwrap_or(8551);

        Ok(vec![
            ("--JsonRpc.JwtSecretFile", jwt(ctx)),
            ("--JsonRpc.EngineHost", host),
            ("--JsonRpc.EnginePort", port.to_string()),
        ])
    }

    fn repository(&self) -> &'static str {
        "NethermindEth/nethermind"
    }

    fn distribution(&self) -> Distribution {
        Distribution::GithubRelease
    }

    fn archive_format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn asset_matches(&self, name: &str, arch: Arch) -> bool {
        let platform = match arch {
            Arch::X86_64 => "linux-x64",
            Arch::Aarch64 => "linux-arm64",
        };
        name.contains(platform) && name.ends_with(".zip")
    }

    fn install_layout(&self) -> InstallLayout {
        InstallLayout::Directory
    }

    fn creates_jwt_secret(&self) -> bool {
        true
    }
}

#[derive(Debug)]
pub struct TekuAdapter;

impl ClientAdapter for TekuAdapter {
    fn kind(&self) -> ClientKind {
        ClientKind::Teku
    }

    fn version_pattern(&self) -> &'static str {
        r"teku/v?(\d+\.\d+\.\d+)"
    }

    fn status_endpoint(&self) -> StatusEndpoint {
        StatusEndpoint::BeaconNodeVersion
    }

    fn default_binary_path(&self) -> PathBuf {
        PathBuf::from("/usr/local/bin/teku/bin/teku")
    }

    fn merge_flags(&self, _slot: ServiceSlot) -> &'static [&'static str] {
        &["--ee-endpoint", "--ee-jwt-secret-file"]
    }

    fn merge_settings(
        &self,
        _slot: ServiceSlot,
        ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError> {
        let mut settings = vec![
            ("--ee-endpoint", ctx.engine_api_url.to_owned()),
            ("--ee-jwt-secret-file", jwt(ctx)),
        ];
        if let Some(address) = ctx.fee_recipient {
            settings.push((
                "--validators-proposer-default-fee-recipient",
                address.to_owned(),
            ));
        }
        Ok(settings)
    }

    fn repository(&self) -> &'static str {
        "ConsenSys/teku"
    }

    fn distribution(&self) -> Distribution {
        Distribution::GithubRelease
    }

    fn download_url(&self, version: &Version, _arch: Arch) -> Option<String> {
        // Teku ships one JVM archive for every platform
        Some(format!(
            "https://artifacts.consensys.net/public/teku/raw/names/teku.tar.gz/versions/{version}/teku-{version}.tar.gz"
        ))
    }

    fn install_layout(&self) -> InstallLayout {
        InstallLayout::Directory
    }

    fn install_root(&self, binary_path: &Path) -> PathBuf {
        // <root>/bin/teku
        binary_path
            .parent()
            .and_then(Path::parent)
            .map_or_else(|| PathBuf::from("/usr/local/bin/teku"), Path::to_path_buf)
    }
}

#[derive(Debug)]
pub struct NimbusAdapter;

impl ClientAdapter for NimbusAdapter {
    fn kind(&self) -> ClientKind {
        ClientKind::Nimbus
    }

    fn version_pattern(&self) -> &'static str {
        r"Nimbus beacon node v?(\d+\.\d+\.\d+)"
    }

    fn status_endpoint(&self) -> StatusEndpoint {
        StatusEndpoint::BeaconNodeVersion
    }

    fn default_binary_path(&self) -> PathBuf {
        PathBuf::from("/usr/local/bin/nimbus_beacon_node")
    }

    fn merge_flags(&self, _slot: ServiceSlot) -> &'static [&'static str] {
        &["--web3-url", "--jwt-secret"]
    }

    fn merge_settings(
        &self,
        _slot: ServiceSlot,
        ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError> {
        let mut settings = vec![
            ("--web3-url", ctx.engine_api_url.to_owned()),
            ("--jwt-secret", jwt(ctx)),
        ];
        if let Some(address) = ctx.fee_recipient {
            settings.push(("--suggested-fee-recipient", address.to_owned()));
        }
        Ok(settings)
    }

    fn repository(&self) -> &'static str {
        "status-im/nimbus-eth2"
    }

    fn distribution(&self) -> Distribution {
        Distribution::GithubRelease
    }

    fn asset_matches(&self, name: &str, arch: Arch) -> bool {
        let platform = match arch {
            Arch::X86_64 => "_Linux_amd64_",
            Arch::Aarch64 => "_Linux_arm64v8_",
        };
        name.starts_with("nimbus-eth2") && name.contains(platform) && name.ends_with(".tar.gz")
    }

    fn install_layout(&self) -> InstallLayout {
        InstallLayout::SingleBinary {
            binary_name: "nimbus_beacon_node",
        }
    }
}

#[derive(Debug)]
pub struct LighthouseAdapter;

impl ClientAdapter for LighthouseAdapter {
    fn kind(&self) -> ClientKind {
        ClientKind::Lighthouse
    }

    fn version_pattern(&self) -> &'static str {
        r"Lighthouse v?(\d+\.\d+\.\d+)"
    }

    fn status_endpoint(&self) -> StatusEndpoint {
        StatusEndpoint::BeaconNodeVersion
    }

    fn default_binary_path(&self) -> PathBuf {
        PathBuf::from("/usr/local/bin/lighthouse")
    }

    fn merge_flags(&self, slot: ServiceSlot) -> &'static [&'static str] {
        match slot {
            ServiceSlot::Primary => &["--execution-endpoint", "--execution-jwt"],
            ServiceSlot::Validator => &["--suggested-fee-recipient"],
        }
    }

    fn merge_settings(
        &self,
        slot: ServiceSlot,
        ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError> {
        match slot {
            ServiceSlot::Primary => {
                let mut settings = vec![
                    ("--execution-endpoint", ctx.engine_api_url.to_owned()),
                    ("--execution-jwt", jwt(ctx)),
                ];
                if let Some(address) = ctx.fee_recipient {
                    settings.push(("--suggested-fee-recipient", address.to_owned()));
                }
                Ok(settings)
            }
            ServiceSlot::Validator => {
                let address = ctx.fee_recipient.ok_or_else(|| {
                    ActionError::Configuration(
                        "the Lighthouse validator client needs a fee recipient address".to_owned(),
                    )
                })?;
                Ok(vec![("--suggested-fee-recipient", address.to_owned())])
            }
        }
    }

    fn repository(&self) -> &'static str {
        "sigp/lighthouse"
    }

    fn distribution(&self) -> Distribution {
        Distribution::GithubRelease
    }

    fn asset_matches(&self, name: &str, arch: Arch) -> bool {
        let target = match arch {
            Arch::X86_64 => "-x86_64-unknown-linux-gnu.tar.gz",
            Arch::Aarch64 => "-aarch64-unknown-linux-gnu.tar.gz",
        };
        name.starts_with("lighthouse-") && name.ends_with(target) && !name.contains("portable")
    }

    fn install_layout(&self) -> InstallLayout {
        InstallLayout::SingleBinary {
            binary_name: "lighthouse",
        }
    }
}

#[derive(Debug)]
pub struct MevBoostAdapter;

impl ClientAdapter for MevBoostAdapter {
    fn kind(&self) -> ClientKind {
        ClientKind::MevBoost
    }

    fn version_args(&self) -> &'static [&'static str] {
        &["-version"]
    }

    fn version_pattern(&self) -> &'static str {
        r"mev-boost v?(\d+\.\d+\.\d+)"
    }

    fn status_endpoint(&self) -> StatusEndpoint {
        StatusEndpoint::None
    }

    fn default_binary_path(&self) -> PathBuf {
        PathBuf::from("/usr/local/bin/mev-boost")
    }

    fn merge_flags(&self, _slot: ServiceSlot) -> &'static [&'static str] {
        &[]
    }

    fn merge_settings(
        &self,
        _slot: ServiceSlot,
        _ctx: &MergeContext<'_>,
    ) -> Result<Vec<(&'static str, String)>, ActionError> {
        Ok(Vec::new())
    }

    fn repository(&self) -> &'static str {
        "flashbots/mev-boost"
    }

    fn distribution(&self) -> Distribution {
        Distribution::GithubRelease
    }

    fn asset_matches(&self, name: &str, arch: Arch) -> bool {
        let platform = match arch {
            Arch::X86_64 => "_linux_amd64.tar.gz",
            Arch::Aarch64 => "_linux_arm64.tar.gz",
        };
        name.starts_with("mev-boost_") && name.ends_with(platform)
    }

    fn install_layout(&self) -> InstallLayout {
        InstallLayout::SingleBinary {
            binary_name: "mev-boost",
        }
    }
}

pub fn adapter_for(kind: ClientKind) -> &'static dyn ClientAdapter {
    match kind {
        ClientKind::Geth => &GethAdapter,
        ClientKind::Nethermind => &NethermindAdapter,
        ClientKind::Teku => &TekuAdapter,
        ClientKind::Nimbus => &NimbusAdapter,
        ClientKind::Lighthouse => &LighthouseAdapter,
        ClientKind::MevBoost => &MevBoostAdapter,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn ctx(fee_recipient: Option<&str>) -> MergeContext<'_> {
        MergeContext {
            jwt_secret_path: Path::new("/var/lib/ethereum/jwttoken"),
            engine_api_url: "http://127.0.0.1:8551",
            fee_recipient,
        }
    }

    fn capture(kind: ClientKind, output: &str) -> Option<String> {
        let re = Regex::new(adapter_for(kind).version_pattern()).unwrap();
        re.captures(output)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
    }

    #[test]
    fn test_adapter_kinds_match() {
        for kind in ClientKind::all() {
            assert_eq!(adapter_for(*kind).kind(), *kind);
        }
    }

    #[test]
    fn test_version_patterns() {
        assert_eq!(
            capture(
                ClientKind::Geth,
                "Geth\nVersion: 1.10.23-stable\nGit Commit: d901d853\nArchitecture: amd64"
            ),
            Some("1.10.23".to_owned())
        );
        assert_eq!(
            capture(
                ClientKind::Teku,
                "teku/v22.9.0/linux-x86_64/-eclipseadoptium-openjdk64bitservervm-java-17"
            ),
            Some("22.9.0".to_owned())
        );
        assert_eq!(
            capture(
                ClientKind::Lighthouse,
                "Lighthouse v3.1.0-aa022f4\nBLS library: blst-modern"
            ),
            Some("3.1.0".to_owned())
        );
        assert_eq!(
            capture(
                ClientKind::Nimbus,
                "Nimbus beacon node v22.9.1-f3a2d8-stateofus\nCopyright (c) 2019-2022 Status Research"
            ),
            Some("22.9.1".to_owned())
        );
        assert_eq!(
            capture(ClientKind::MevBoost, "mev-boost v1.3.2"),
            Some("1.3.2".to_owned())
        );
        assert_eq!(
            capture(
                ClientKind::Nethermind,
                "Version: 1.14.1+a4d1e4b3\nCommit: a4d1e4b3"
            ),
            Some("1.14.1".to_owned())
        );
    }

    #[test]
    fn test_merge_settings_geth() {
        let settings = GethAdapter
            .merge_settings(ServiceSlot::Primary, &ctx(None))
            .unwrap();
        assert_eq!(
            settings,
            vec![("--authrpc.jwtsecret", "/var/lib/ethereum/jwttoken".to_owned())]
        );
    }

    #[test]
    fn test_merge_settings_nethermind_port() {
        let settings = NethermindAdapter
            .merge_settings(ServiceSlot::Primary, &ctx(None))
            .unwrap();
        assert!(settings.contains(&("--JsonRpc.EnginePort", "8551".to_owned())));
        assert!(settings.contains(&("--JsonRpc.EngineHost", "127.0.0.1".to_owned())));
    }

    #[test]
    fn test_merge_settings_cover_required_flags() {
        let address = "0x8d3C28E2Da2A3C6fB3A5d6a3a4F1e0E6bE2fC4a1";
        for kind in ClientKind::all() {
            let adapter = adapter_for(*kind);
            for slot in [ServiceSlot::Primary, ServiceSlot::Validator] {
                let settings = adapter.merge_settings(slot, &ctx(Some(address))).unwrap();
                for flag in adapter.merge_flags(slot) {
                    assert!(
                        settings.iter().any(|(name, _)| name == flag),
                        "{kind} {slot:?} does not set {flag}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_lighthouse_validator_needs_fee_recipient() {
        let result = LighthouseAdapter.merge_settings(ServiceSlot::Validator, &ctx(None));
        assert!(matches!(result, Err(ActionError::Configuration(_))));
    }

    #[test]
    fn test_asset_matching() {
        assert!(LighthouseAdapter.asset_matches(
            "lighthouse-v3.1.0-x86_64-unknown-linux-gnu.tar.gz",
            Arch::X86_64
        ));
        assert!(!LighthouseAdapter.asset_matches(
            "lighthouse-v3.1.0-x86_64-unknown-linux-gnu-portable.tar.gz",
            Arch::X86_64
        ));
        assert!(!LighthouseAdapter.asset_matches(
            "lighthouse-v3.1.0-x86_64-unknown-linux-gnu.tar.gz.asc",
            Arch::X86_64
        ));
        assert!(MevBoostAdapter.asset_matches("mev-boost_1.3.2_linux_arm64.tar.gz", Arch::Aarch64));
        assert!(NimbusAdapter.asset_matches(
            "nimbus-eth2_Linux_amd64_22.9.1_f3a2d8.tar.gz",
            Arch::X86_64
        ));
        assert!(NethermindAdapter.asset_matches(
            "nethermind-1.14.1-a4d1e4b3-linux-x64.zip",
            Arch::X86_64
        ));
        assert!(!NethermindAdapter.asset_matches(
            "nethermind-1.14.1-a4d1e4b3-windows-x64.zip",
            Arch::X86_64
        ));
    }

    #[test]
    fn test_install_roots() {
        assert_eq!(
            TekuAdapter.install_root(Path::new("/usr/local/bin/teku/bin/teku")),
            PathBuf::from("/usr/local/bin/teku")
        );
        assert_eq!(
            NethermindAdapter.install_root(Path::new("/usr/local/bin/nethermind/Nethermind.Runner")),
            PathBuf::from("/usr/local/bin/nethermind")
        );
    }

    #[test]
    fn test_teku_download_url() {
        let url = TekuAdapter
            .download_url(&Version::new(22, 9, 0), Arch::X86_64)
            .unwrap();
        assert!(url.ends_with("/versions/22.9.0/teku-22.9.0.tar.gz"));
    }
}
