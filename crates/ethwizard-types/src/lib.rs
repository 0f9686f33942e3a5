// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Shared data model for ethwizard maintenance.
//!
//! Everything in this crate is pure: no I/O, no clocks, no processes. The
//! maintenance crate fills these values from the machine and the engine
//! reasons over them.

pub mod action;
pub mod client;
pub mod flags;
pub mod policy;
pub mod service;
pub mod version;

pub use action::MaintenanceAction;
pub use client::{ClientKind, Network, UnitRole, UnknownNameError};
pub use flags::{FlagList, contains_all_flags};
pub use policy::MergeReadinessPolicy;
pub use service::ServiceState;
pub use version::{Version, VersionError, VersionSet, VersionValue, parse_version, version_from_tag};
