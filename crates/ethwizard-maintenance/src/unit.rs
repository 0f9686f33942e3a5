// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Managed units: one client (or client pair) tracked by the engine

use crate::config::{MaintenanceConfig, UnitConfig};
use ethwizard_types::{ClientKind, Network, UnitRole};

/// Which service of a unit an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceSlot {
    /// The only service, or the beacon node of a split client
    Primary,
    /// The validator client of a split client
    Validator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitServices {
    Single(String),
    Split { beacon: String, validator: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedUnit {
    pub kind: ClientKind,
    pub network: Network,
    pub services: UnitServices,
}

impl ManagedUnit {
    pub fn new(kind: ClientKind, network: Network, service: impl Into<String>) -> Self {
        Self {
            kind,
            network,
            services: UnitServices::Single(service.into()),
        }
    }

    pub fn split(
        kind: ClientKind,
        network: Network,
        beacon: impl Into<String>,
        validator: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            network,
            services: UnitServices::Split {
                beacon: beacon.into(),
                validator: validator.into(),
            },
        }
    }

    pub fn from_config(unit: &UnitConfig, network: Network) -> Self {
        match unit.validator_service {
            Some(ref validator) => Self::split(unit.client, network, &unit.service, validator),
            None => Self::new(unit.client, network, &unit.service),
        }
    }

    pub fn role(&self) -> UnitRole {
        self.kind.role()
    }

    pub fn primary_service(&self) -> &str {
        match self.services {
            UnitServices::Single(ref name) | UnitServices::Split { beacon: ref name, .. } => name,
        }
    }

    /// Services in stop/start order: the primary service first
    pub fn services(&self) -> Vec<(ServiceSlot, &str)> {
        match self.services {
            UnitServices::Single(ref name) => vec![(ServiceSlot::Primary, name.as_str())],
            UnitServices::Split {
                ref beacon,
                ref validator,
            } => vec![
                (ServiceSlot::Primary, beacon.as_str()),
                (ServiceSlot::Validator, validator.as_str()),
            ],
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.role(), self.kind)
    }
}

/// Units from config in maintenance order: execution, consensus, relay boost
pub fn units_from_config(config: &MaintenanceConfig) -> Vec<ManagedUnit> {
    let mut units: Vec<ManagedUnit> = config
        .units
        .iter()
        .map(|unit| ManagedUnit::from_config(unit, config.network))
        .collect();
    units.sort_by_key(ManagedUnit::role);
    units
}
