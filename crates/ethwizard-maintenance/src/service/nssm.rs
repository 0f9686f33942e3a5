// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! NSSM service control for Windows installs

use super::{
    ServiceControl, ServiceParameter, join_command_line, locate_tool, run_checked, run_tool,
    split_command_line,
};
use crate::error::ServiceError;
use async_trait::async_trait;
use ethwizard_types::ServiceState;
use std::path::PathBuf;
use tracing::info;

/// Stop methods NSSM waits on before escalating to the next one
const STOP_METHODS: [&str; 3] = [
    "AppStopMethodConsole",
    "AppStopMethodWindow",
    "AppStopMethodThreads",
];

#[derive(Debug, Clone)]
pub struct NssmServiceControl {
    nssm: PathBuf,
}

impl NssmServiceControl {
    pub fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            nssm: locate_tool("nssm")?,
        })
    }

    async fn nssm(&self, service: &str, args: &[&str]) -> Result<String, ServiceError> {
        let output = run_checked(&self.nssm, service, args).await?;
        Ok(decode_output(&output.stdout))
    }

    async fn get(&self, service: &str, key: &str) -> Result<String, ServiceError> {
        self.nssm(service, &["get", service, key]).await
    }

    async fn set(&self, service: &str, key: &str, value: &str) -> Result<(), ServiceError> {
        self.nssm(service, &["set", service, key, value]).await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceControl for NssmServiceControl {
    async fn query(&self, service: &str) -> Result<Option<ServiceState>, ServiceError> {
        let output = run_tool(&self.nssm, &["status", service]).await?;
        let stdout = decode_output(&output.stdout);
        if !output.status.success() {
            let stderr = decode_output(&output.stderr);
            if is_missing_service(&stderr) || is_missing_service(&stdout) {
                return Ok(None);
            }
            return Err(ServiceError::Command {
                service: service.to_owned(),
                command: format!("status {service}"),
                message: stderr,
            });
        }

        let application = self.get(service, "Application").await?;
        let parameters = self.get(service, "AppParameters").await?;

        Ok(Some(ServiceState {
            name: service.to_owned(),
            found: true,
            running: stdout == "SERVICE_RUNNING",
            binary_path: (!application.is_empty()).then(|| PathBuf::from(application)),
            arguments: split_command_line(&parameters),
        }))
    }

    async fn start(&self, service: &str) -> Result<(), ServiceError> {
        info!("Starting {service}");
        self.nssm(service, &["start", service]).await?;
        Ok(())
    }

    async fn stop(&self, service: &str) -> Result<(), ServiceError> {
        info!("Stopping {service}");
        self.nssm(service, &["stop", service]).await?;
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<(), ServiceError> {
        info!("Restarting {service}");
        self.nssm(service, &["restart", service]).await?;
        Ok(())
    }

    async fn set_parameter(
        &self,
        service: &str,
        parameter: &ServiceParameter,
    ) -> Result<(), ServiceError> {
        match parameter {
            ServiceParameter::Arguments(arguments) => {
                self.set(service, "AppParameters", &join_command_line(arguments))
                    .await
            }
            ServiceParameter::ShutdownTimeout(timeout) => {
                let millis = timeout.as_millis().to_string();
                for method in STOP_METHODS {
                    self.set(service, method, &millis).await?;
                }
                Ok(())
            }
        }
    }
}

/// NSSM writes UTF-16LE when its output is redirected
fn decode_output(bytes: &[u8]) -> String {
    let looks_utf16 = bytes.len() >= 2
        && bytes.len() % 2 == 0
        && bytes.iter().skip(1).step_by(2).all(|b| *b == 0);

    let text = if looks_utf16 {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    text.trim_start_matches('\u{feff}').trim().to_owned()
}

fn is_missing_service(message: &str) -> bool {
    message.contains("Can't open service") || message.contains("does not exist")
}
