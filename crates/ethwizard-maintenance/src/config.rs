// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Configuration module for the maintenance tool

use crate::error::ConfigError;
use ethwizard_types::{ClientKind, Network, UnitRole};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ethwizard/maintenance.toml";

fn default_units() -> Vec<UnitConfig> {
    vec![
        UnitConfig {
            client: ClientKind::Geth,
            service: "geth".to_owned(),
            validator_service: None,
        },
        UnitConfig {
            client: ClientKind::Lighthouse,
            service: "lighthousebeacon".to_owned(),
            validator_service: Some("lighthousevalidator".to_owned()),
        },
        UnitConfig {
            client: ClientKind::MevBoost,
            service: "mevboost".to_owned(),
            validator_service: None,
        },
    ]
}

fn default_jwt_secret_path() -> PathBuf {
    PathBuf::from("/var/lib/ethereum/jwttoken")
}

fn default_context_path() -> PathBuf {
    PathBuf::from("/var/lib/ethwizard/context.json")
}

fn default_180() -> u64 {
    180
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintenanceConfig {
    /// Network the node follows
    #[serde(default)]
    pub network: Network,

    /// Service manager the clients are registered with
    #[serde(default)]
    pub service_manager: ServiceManagerKind,

    /// Managed units, at most one per role
    #[serde(default = "default_units")]
    pub units: Vec<UnitConfig>,

    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Shared execution/consensus JWT secret
    #[serde(default = "default_jwt_secret_path")]
    pub jwt_secret_path: PathBuf,

    /// Fee recipient address set on consensus clients during merge configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fee_recipient: Option<String>,

    #[serde(default)]
    pub github: GithubConfig,

    /// Persisted wizard context (shutdown timeout flags)
    #[serde(default = "default_context_path")]
    pub context_path: PathBuf,

    #[serde(default)]
    pub retry: RetryPolicy,

    /// Graceful stop window before the service manager kills a client
    #[serde(default = "default_180")]
    pub shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ServiceManagerKind {
    #[default]
    Systemd,
    Nssm,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitConfig {
    pub client: ClientKind,

    /// Service name (the beacon node service for split clients)
    pub service: String,

    /// Separate validator client service, Lighthouse only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_service: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EndpointConfig {
    /// Execution client JSON-RPC endpoint (`web3_clientVersion`)
    pub execution_rpc_url: String,
    /// Authenticated Engine API endpoint consensus clients connect to
    pub engine_api_url: String,
    /// Beacon node REST API (`/eth/v1/node/version`)
    pub beacon_api_url: String,
    /// Timeout for live status queries
    pub status_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            execution_rpc_url: "http://127.0.0.1:8545".to_owned(),
            engine_api_url: "http://127.0.0.1:8551".to_owned(),
            beacon_api_url: "http://127.0.0.1:5052".to_owned(),
            status_timeout_secs: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GithubConfig {
    /// Custom API base URL for testing (overrides default GitHub API)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,

    /// Token to lift the anonymous rate limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Bounded retries with a linearly growing per-attempt timeout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub base_timeout_secs: u64,
    pub timeout_step_secs: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 6,
            base_timeout_secs: 30,
            timeout_step_secs: 10,
        }
    }
}

impl RetryPolicy {
    /// Timeout for a zero-based attempt
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        Duration::from_secs(self.base_timeout_secs + self.timeout_step_secs * u64::from(attempt))
    }
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            service_manager: ServiceManagerKind::default(),
            units: default_units(),
            endpoints: EndpointConfig::default(),
            jwt_secret_path: default_jwt_secret_path(),
            fee_recipient: None,
            github: GithubConfig::default(),
            context_path: default_context_path(),
            retry: RetryPolicy::default(),
            shutdown_timeout_secs: default_180(),
        }
    }
}

impl MaintenanceConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn status_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoints.status_timeout_secs)
    }

    /// Apply environment overrides on top of file values
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(network) = std::env::var("ETHWIZARD_NETWORK") {
            self.network = network
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("ETHWIZARD_NETWORK: {e}")))?;
        }
        if let Ok(address) = std::env::var("ETHWIZARD_FEE_RECIPIENT") {
            self.fee_recipient = Some(address);
        }
        if let Ok(token) = std::env::var("ETHWIZARD_GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Ok(path) = std::env::var("ETHWIZARD_CONTEXT_PATH") {
            self.context_path = PathBuf::from(path);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut roles: Vec<UnitRole> = Vec::new();
        for unit in &self.units {
            let role = unit.client.role();
            if roles.contains(&role) {
                return Err(ConfigError::Invalid(format!(
                    "more than one {role} configured"
                )));
            }
            roles.push(role);

            if unit.service.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{} has an empty service name",
                    unit.client
                )));
            }

            if unit.validator_service.is_some() && unit.client != ClientKind::Lighthouse {
                return Err(ConfigError::Invalid(format!(
                    "{} does not run a separate validator service",
                    unit.client
                )));
            }
        }

        if let Some(ref address) = self.fee_recipient
            && !is_address(address)
        {
            return Err(ConfigError::Invalid(format!(
                "fee recipient {address} is not a 0x-prefixed 20-byte hex address"
            )));
        }

        if self.retry.attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.attempts must be at least 1".to_owned(),
            ));
        }

        Ok(())
    }
}

fn is_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Load the config file at `path`, falling back to defaults when it is absent
pub fn load_config(path: &Path) -> Result<MaintenanceConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: MaintenanceConfig = toml::from_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        config
    } else {
        warn!(
            "No configuration file at {}, using defaults with environment overrides",
            path.display()
        );
        MaintenanceConfig::default()
    };

    config.apply_env()?;
    config.validate()?;
    Ok(config)
}
