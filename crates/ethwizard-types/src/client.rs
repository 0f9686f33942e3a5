// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Client kinds, unit roles and networks

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {what}: '{value}'. Supported values: {supported}")]
pub struct UnknownNameError {
    what: &'static str,
    value: String,
    supported: String,
}

/// Supported client software the maintenance engine can manage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClientKind {
    Geth,
    Nethermind,
    Teku,
    Nimbus,
    Lighthouse,
    MevBoost,
}

impl ClientKind {
    /// Human-readable name for the dashboard
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Geth => "Geth",
            Self::Nethermind => "Nethermind",
            Self::Teku => "Teku",
            Self::Nimbus => "Nimbus",
            Self::Lighthouse => "Lighthouse",
            Self::MevBoost => "MEV-Boost",
        }
    }

    /// Config string value (kebab-case), also used in persisted context keys
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::Geth => "geth",
            Self::Nethermind => "nethermind",
            Self::Teku => "teku",
            Self::Nimbus => "nimbus",
            Self::Lighthouse => "lighthouse",
            Self::MevBoost => "mev-boost",
        }
    }

    /// The role this client plays in a node setup
    pub fn role(&self) -> UnitRole {
        match self {
            Self::Geth | Self::Nethermind => UnitRole::Execution,
            Self::Teku | Self::Nimbus | Self::Lighthouse => UnitRole::Consensus,
            Self::MevBoost => UnitRole::RelayBoost,
        }
    }

    /// Whether a forced kill of this client can corrupt its on-disk state.
    ///
    /// Clients that keep a database need a long graceful shutdown window.
    pub fn needs_graceful_shutdown(&self) -> bool {
        !matches!(self, Self::MevBoost)
    }

    pub fn all() -> &'static [ClientKind] {
        &[
            Self::Geth,
            Self::Nethermind,
            Self::Teku,
            Self::Nimbus,
            Self::Lighthouse,
            Self::MevBoost,
        ]
    }
}

impl fmt::Display for ClientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for ClientKind {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geth" => Ok(Self::Geth),
            "nethermind" => Ok(Self::Nethermind),
            "teku" => Ok(Self::Teku),
            "nimbus" => Ok(Self::Nimbus),
            "lighthouse" => Ok(Self::Lighthouse),
            "mev-boost" | "mevboost" => Ok(Self::MevBoost),
            _ => Err(UnknownNameError {
                what: "client",
                value: s.to_owned(),
                supported: Self::all()
                    .iter()
                    .map(ClientKind::to_config_value)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

/// Role of a managed unit. The declaration order is the execution order of a
/// maintenance pass: the consensus client reads the JWT secret the execution
/// client writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitRole {
    Execution,
    Consensus,
    RelayBoost,
}

impl UnitRole {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Execution => "Execution client",
            Self::Consensus => "Consensus client",
            Self::RelayBoost => "Relay boost",
        }
    }
}

impl fmt::Display for UnitRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Ethereum network the node follows
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Goerli,
    Sepolia,
}

impl Network {
    pub fn to_config_value(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Goerli => "goerli",
            Self::Sepolia => "sepolia",
        }
    }

    pub fn all() -> &'static [Network] {
        &[Self::Mainnet, Self::Goerli, Self::Sepolia]
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_config_value())
    }
}

impl FromStr for Network {
    type Err = UnknownNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Self::Mainnet),
            "goerli" | "prater" => Ok(Self::Goerli),
            "sepolia" => Ok(Self::Sepolia),
            _ => Err(UnknownNameError {
                what: "network",
                value: s.to_owned(),
                supported: "mainnet, goerli, sepolia".to_owned(),
            }),
        }
    }
}
