// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Minimum client versions that support the JWT-authenticated Engine API

use crate::client::{ClientKind, Network};
use crate::version::{Version, VersionValue};
use std::collections::BTreeMap;

/// Merge-readiness table keyed by `(network, client)`.
///
/// Lookups are total: the built-in table is an exhaustive match, so adding a
/// client or network without a minimum version fails to compile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReadinessPolicy {
    overrides: BTreeMap<(Network, ClientKind), Version>,
}

impl MergeReadinessPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the minimum version of one entry
    pub fn with_minimum(mut self, network: Network, kind: ClientKind, version: Version) -> Self {
        self.overrides.insert((network, kind), version);
        self
    }

    pub fn minimum_version(&self, network: Network, kind: ClientKind) -> Version {
        if let Some(version) = self.overrides.get(&(network, kind)) {
            return *version;
        }
        builtin_minimum(network, kind)
    }

    /// A known version at or above the minimum. Unknown is never merge-ready.
    pub fn is_merge_ready(&self, network: Network, kind: ClientKind, version: &VersionValue) -> bool {
        version.is_known_at_least(&VersionValue::Known(self.minimum_version(network, kind)))
    }
}

fn builtin_minimum(network: Network, kind: ClientKind) -> Version {
    use ClientKind::{Geth, Lighthouse, MevBoost, Nethermind, Nimbus, Teku};
    use Network::{Goerli, Mainnet, Sepolia};

    match (network, kind) {
        (Mainnet, Geth) => Version::new(1, 10, 23),
        (Mainnet, Nethermind) => Version::new(1, 14, 0),
        (Mainnet, Teku) => Version::new(22, 8, 1),
        (Mainnet, Nimbus) => Version::new(22, 8, 0),
        (Mainnet, Lighthouse) => Version::new(3, 0, 0),

        (Goerli, Geth) => Version::new(1, 10, 21),
        (Goerli, Nethermind) => Version::new(1, 13, 6),
        (Goerli, Teku) => Version::new(22, 7, 0),
        (Goerli, Nimbus) => Version::new(22, 7, 0),
        (Goerli, Lighthouse) => Version::new(2, 5, 1),

        (Sepolia, Geth) => Version::new(1, 10, 18),
        (Sepolia, Nethermind) => Version::new(1, 13, 1),
        (Sepolia, Teku) => Version::new(22, 6, 0),
        (Sepolia, Nimbus) => Version::new(22, 6, 0),
        (Sepolia, Lighthouse) => Version::new(2, 3, 0),

        // Every MEV-Boost release postdates the Engine API
        (_, MevBoost) => Version::new(1, 0, 0),
    }
}
