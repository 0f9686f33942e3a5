// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Merge configuration detection

use crate::adapter::ClientAdapter;
use crate::unit::ServiceSlot;
use ethwizard_types::{ServiceState, contains_all_flags};

/// Whether Engine API authentication is wired up on every service of a unit
pub fn merge_configured(adapter: &dyn ClientAdapter, services: &[(ServiceSlot, ServiceState)]) -> bool {
    !services.is_empty()
        && services
            .iter()
            .all(|(slot, state)| contains_all_flags(&state.arguments, adapter.merge_flags(*slot)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{GethAdapter, LighthouseAdapter, MevBoostAdapter, TekuAdapter};

    fn state(name: &str, args: &[&str]) -> ServiceState {
        ServiceState {
            name: name.to_owned(),
            found: true,
            running: true,
            binary_path: None,
            arguments: args.iter().map(|a| (*a).to_owned()).collect(),
        }
    }

    #[test]
    fn test_single_flag_client() {
        let configured = [(
            ServiceSlot::Primary,
            state("geth", &["--mainnet", "--AuthRPC.JWTSecret=/var/lib/ethereum/jwttoken"]),
        )];
        assert!(merge_configured(&GethAdapter, &configured));

        let unconfigured = [(ServiceSlot::Primary, state("geth", &["--mainnet", "--http"]))];
        assert!(!merge_configured(&GethAdapter, &unconfigured));
    }

    #[test]
    fn test_both_flags_required() {
        let half = [(
            ServiceSlot::Primary,
            state("teku", &["--ee-endpoint", "http://127.0.0.1:8551"]),
        )];
        assert!(!merge_configured(&TekuAdapter, &half));

        let full = [(
            ServiceSlot::Primary,
            state(
                "teku",
                &[
                    "--ee-endpoint",
                    "http://127.0.0.1:8551",
                    "--ee-jwt-secret-file=/var/lib/ethereum/jwttoken",
                ],
            ),
        )];
        assert!(merge_configured(&TekuAdapter, &full));
    }

    #[test]
    fn test_split_unit_needs_both_services() {
        let beacon = state(
            "lighthousebeacon",
            &[
                "bn",
                "--execution-endpoint",
                "http://127.0.0.1:8551",
                "--execution-jwt",
                "/var/lib/ethereum/jwttoken",
            ],
        );
        let validator = state("lighthousevalidator", &["vc", "--network", "mainnet"]);

        let services = [
            (ServiceSlot::Primary, beacon.clone()),
            (ServiceSlot::Validator, validator),
        ];
        assert!(!merge_configured(&LighthouseAdapter, &services));

        let validator = state(
            "lighthousevalidator",
            &["vc", "--suggested-fee-recipient", "0x8d3C28E2Da2A3C6fB3A5d6a3a4F1e0E6bE2fC4a1"],
        );
        let services = [
            (ServiceSlot::Primary, beacon),
            (ServiceSlot::Validator, validator),
        ];
        assert!(merge_configured(&LighthouseAdapter, &services));
    }

    #[test]
    fn test_client_without_merge_flags() {
        let services = [(ServiceSlot::Primary, state("mevboost", &["-mainnet"]))];
        assert!(merge_configured(&MevBoostAdapter, &services));
    }
}
