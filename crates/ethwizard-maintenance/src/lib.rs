// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! ethwizard maintenance - keeps an ethwizard-installed node current
//!
//! Probes the execution client, the consensus client and MEV-Boost, decides
//! one maintenance action per unit with an ordered rule cascade, and runs the
//! approved actions through the service manager, GitHub releases and apt.

pub mod adapter;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod downloader;
pub mod engine;
pub mod error;
pub mod events;
pub mod executor;
pub mod installer;
pub mod jwt;
pub mod package;
pub mod probe;
pub mod release_checker;
pub mod service;
pub mod unit;

pub use config::{DEFAULT_CONFIG_PATH, MaintenanceConfig, ServiceManagerKind, load_config};
pub use context::{ContextDelta, ContextKey, PersistedContext};
pub use dashboard::{AutoApprove, Confirm, Dashboard, DashboardOutcome, Evaluation, StdinConfirm};
pub use engine::{DecisionInput, decide, matched_rules};
pub use error::{ActionError, ConfigError, DashboardError, ProbeError};
pub use executor::{Executor, ExecutorSettings};
pub use probe::{LiveVersionQuery, Prober, UnitSnapshot, VersionQuery};
pub use unit::{ManagedUnit, units_from_config};
