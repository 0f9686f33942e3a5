// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Persisted wizard context
//!
//! A small JSON key-value document that survives restarts. The maintenance
//! core reads and writes a fixed set of keys; a missing key means "not yet
//! done".

use crate::error::ContextError;
use chrono::{DateTime, Utc};
use ethwizard_types::ClientKind;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Keys the maintenance core owns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKey {
    ShutdownTimeoutImproved(ClientKind),
    LastMaintenanceAt,
}

impl ContextKey {
    pub fn as_key(&self) -> String {
        match self {
            Self::ShutdownTimeoutImproved(kind) => {
                format!("shutdown_timeout_improved.{}", kind.to_config_value())
            }
            Self::LastMaintenanceAt => "last_maintenance_at".to_owned(),
        }
    }
}

/// Context changes produced by executing an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextDelta {
    /// Flags to record as done
    pub completed: Vec<ContextKey>,
}

impl ContextDelta {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn completed(key: ContextKey) -> Self {
        Self {
            completed: vec![key],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PersistedContext {
    path: Option<PathBuf>,
    values: BTreeMap<String, Value>,
}

impl PersistedContext {
    /// Context that is never written to disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the context at `path`; a missing file is an empty context
    pub fn load(path: &Path) -> Result<Self, ContextError> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    pub fn save(&self) -> Result<(), ContextError> {
        let Some(ref path) = self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(&self.values)?;

        // Atomic write
        std::fs::write(&temp_path, content)?;
        std::fs::rename(&temp_path, path)?;

        Ok(())
    }

    pub fn flag(&self, key: ContextKey) -> bool {
        self.values
            .get(&key.as_key())
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn set_flag(&mut self, key: ContextKey, value: bool) {
        self.values.insert(key.as_key(), Value::Bool(value));
    }

    pub fn shutdown_timeout_improved(&self, kind: ClientKind) -> bool {
        self.flag(ContextKey::ShutdownTimeoutImproved(kind))
    }

    pub fn last_maintenance_at(&self) -> Option<DateTime<Utc>> {
        self.values
            .get(&ContextKey::LastMaintenanceAt.as_key())
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn set_last_maintenance_at(&mut self, at: DateTime<Utc>) {
        self.values.insert(
            ContextKey::LastMaintenanceAt.as_key(),
            Value::String(at.to_rfc3339()),
        );
    }

    pub fn apply(&mut self, delta: &ContextDelta) {
        for key in &delta.completed {
            self.set_flag(*key, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absent_key_is_not_done() {
        let context = PersistedContext::in_memory();
        assert!(!context.shutdown_timeout_improved(ClientKind::Geth));
        assert!(context.last_maintenance_at().is_none());
    }

    #[test]
    fn test_key_names() {
        assert_eq!(
            ContextKey::ShutdownTimeoutImproved(ClientKind::MevBoost).as_key(),
            "shutdown_timeout_improved.mev-boost"
        );
    }

    #[test]
    fn test_apply_delta() {
        let mut context = PersistedContext::in_memory();
        context.apply(&ContextDelta::completed(ContextKey::ShutdownTimeoutImproved(
            ClientKind::Teku,
        )));
        assert!(context.shutdown_timeout_improved(ClientKind::Teku));
        assert!(!context.shutdown_timeout_improved(ClientKind::Geth));
    }

    #[test]
    fn test_context_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("context.json");

        let mut context = PersistedContext::load(&path).unwrap();
        context.set_flag(ContextKey::ShutdownTimeoutImproved(ClientKind::Geth), true);
        let now = Utc::now();
        context.set_last_maintenance_at(now);
        context.save().unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = PersistedContext::load(&path).unwrap();
        assert!(loaded.shutdown_timeout_improved(ClientKind::Geth));
        assert_eq!(
            loaded.last_maintenance_at().map(|t| t.timestamp()),
            Some(now.timestamp())
        );
    }

    #[test]
    fn test_unrelated_keys_survive() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("context.json");
        std::fs::write(&path, r#"{"step": "install_geth", "geth_installed": true}"#).unwrap();

        let mut context = PersistedContext::load(&path).unwrap();
        context.set_flag(ContextKey::ShutdownTimeoutImproved(ClientKind::Nimbus), true);
        context.save().unwrap();

        let raw: BTreeMap<String, Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("step"), Some(&Value::String("install_geth".to_owned())));
        assert_eq!(raw.len(), 3);
    }

    #[test]
    fn test_corrupt_context_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("context.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            PersistedContext::load(&path),
            Err(ContextError::Json(_))
        ));
    }
}
