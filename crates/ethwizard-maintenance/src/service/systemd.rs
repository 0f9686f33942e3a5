// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! systemd service control
//!
//! State comes from `systemctl show`, the command line from `systemctl cat`
//! because `show` prints arguments without their quoting. Settings are written
//! as drop-in files next to the unit so the wizard-generated unit file itself
//! stays untouched.

use super::{
    ServiceControl, ServiceParameter, join_command_line, locate_tool, run_checked,
    split_command_line,
};
use crate::error::ServiceError;
use async_trait::async_trait;
use ethwizard_types::ServiceState;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
const EXEC_DROP_IN: &str = "10-ethwizard-exec.conf";
const TIMEOUT_DROP_IN: &str = "20-ethwizard-timeout.conf";

#[derive(Debug, Clone)]
pub struct SystemdServiceControl {
    systemctl: PathBuf,
    unit_dir: PathBuf,
}

impl SystemdServiceControl {
    pub fn new() -> Result<Self, ServiceError> {
        Ok(Self {
            systemctl: locate_tool("systemctl")?,
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
        })
    }

    /// Write drop-ins somewhere other than `/etc/systemd/system`
    pub fn with_unit_dir(mut self, unit_dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = unit_dir.into();
        self
    }

    async fn systemctl(&self, service: &str, args: &[&str]) -> Result<String, ServiceError> {
        let output = run_checked(&self.systemctl, service, args).await?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn daemon_reload(&self, service: &str) -> Result<(), ServiceError> {
        self.systemctl(service, &["daemon-reload"]).await?;
        Ok(())
    }
}

#[async_trait]
impl ServiceControl for SystemdServiceControl {
    async fn query(&self, service: &str) -> Result<Option<ServiceState>, ServiceError> {
        let unit = format!("{service}.service");
        let stdout = self
            .systemctl(
                service,
                &[
                    "show",
                    &unit,
                    "--no-pager",
                    "--property=LoadState,ActiveState,SubState,ExecStart",
                ],
            )
            .await?;
        let Some(mut state) = parse_show(service, &stdout) else {
            return Ok(None);
        };

        match self.systemctl(service, &["cat", &unit]).await {
            Ok(cat) => {
                if let Some(mut command) = exec_start_from_cat(&cat).map(|line| exec_command(&line))
                    && !command.is_empty()
                {
                    state.binary_path = Some(PathBuf::from(command.remove(0)));
                    state.arguments = command;
                }
            }
            Err(e) => debug!("{service}: falling back to `systemctl show` arguments: {e}"),
        }

        Ok(Some(state))
    }

    async fn start(&self, service: &str) -> Result<(), ServiceError> {
        info!("Starting {service}");
        self.systemctl(service, &["start", service]).await?;
        Ok(())
    }

    async fn stop(&self, service: &str) -> Result<(), ServiceError> {
        info!("Stopping {service}");
        self.systemctl(service, &["stop", service]).await?;
        Ok(())
    }

    async fn restart(&self, service: &str) -> Result<(), ServiceError> {
        info!("Restarting {service}");
        self.systemctl(service, &["restart", service]).await?;
        Ok(())
    }

    async fn set_parameter(
        &self,
        service: &str,
        parameter: &ServiceParameter,
    ) -> Result<(), ServiceError> {
        let (file_name, content) = match parameter {
            ServiceParameter::Arguments(arguments) => {
                let state = self
                    .query(service)
                    .await?
                    .ok_or_else(|| ServiceError::NotFound(service.to_owned()))?;
                let binary = state
                    .binary_path
                    .ok_or_else(|| ServiceError::Command {
                        service: service.to_owned(),
                        command: "show".to_owned(),
                        message: "unit has no ExecStart".to_owned(),
                    })?;
                (EXEC_DROP_IN, exec_drop_in(&binary, arguments))
            }
            ServiceParameter::ShutdownTimeout(timeout) => {
                (TIMEOUT_DROP_IN, timeout_drop_in(*timeout))
            }
        };

        let path = write_drop_in(&self.unit_dir, service, file_name, &content)?;
        info!("Wrote {}", path.display());
        self.daemon_reload(service).await
    }
}

/// Parse `systemctl show` output; `None` when the unit is not loaded
fn parse_show(service: &str, stdout: &str) -> Option<ServiceState> {
    let properties: HashMap<&str, &str> = stdout
        .lines()
        .filter_map(|line| line.split_once('='))
        .collect();

    match properties.get("LoadState") {
        Some(&"loaded") => {}
        _ => return None,
    }

    let running = matches!(
        properties.get("ActiveState"),
        Some(&"active" | &"reloading")
    );

    let mut argv = properties
        .get("ExecStart")
        .and_then(|exec| exec_argv(exec))
        .unwrap_or_default()
        .into_iter();
    let binary_path = argv.next().map(PathBuf::from);

    Some(ServiceState {
        name: service.to_owned(),
        found: true,
        running,
        binary_path,
        arguments: argv.collect(),
    })
}

/// Pull the argument vector out of an `ExecStart={ path=... ; argv[]=... ; ... }` value
fn exec_argv(exec: &str) -> Option<Vec<String>> {
    let start = exec.find("argv[]=")? + "argv[]=".len();
    let rest = &exec[start..];
    let end = rest.find(" ;").unwrap_or(rest.len());
    Some(split_command_line(&rest[..end]))
}

/// The effective `ExecStart=` line of `systemctl cat` output.
///
/// Drop-ins are printed after the unit file, so the last assignment wins and
/// an empty assignment clears what came before.
fn exec_start_from_cat(cat: &str) -> Option<String> {
    let mut exec_start = None;
    let mut lines = cat.lines();

    while let Some(line) = lines.next() {
        let Some(value) = line.trim_start().strip_prefix("ExecStart=") else {
            continue;
        };

        let mut value = value.trim().to_owned();
        while value.ends_with('\\') {
            value.pop();
            let Some(next) = lines.next() else {
                break;
            };
            value.push(' ');
            value.push_str(next.trim());
        }

        exec_start = (!value.trim().is_empty()).then_some(value);
    }

    exec_start
}

/// Split an `ExecStart=` command line into the binary and its arguments
fn exec_command(line: &str) -> Vec<String> {
    // `-`, `@`, `:`, `+` and `!` prefixes change how systemd runs the binary
    let line = line.trim_start_matches(['-', '@', ':', '+', '!']);
    split_command_line(line)
        .into_iter()
        .map(|arg| arg.replace("%%", "%"))
        .collect()
}

fn exec_drop_in(binary: &Path, arguments: &[String]) -> String {
    let mut command = vec![binary.display().to_string()];
    command.extend(arguments.iter().cloned());
    // `%` starts a unit specifier
    let line = join_command_line(&command).replace('%', "%%");
    format!("[Service]\nExecStart=\nExecStart={line}\n")
}

fn timeout_drop_in(timeout: Duration) -> String {
    format!("[Service]\nTimeoutStopSec={}\n", timeout.as_secs())
}

fn write_drop_in(
    unit_dir: &Path,
    service: &str,
    file_name: &str,
    content: &str,
) -> Result<PathBuf, ServiceError> {
    let dir = unit_dir.join(format!("{service}.service.d"));
    std::fs::create_dir_all(&dir)?;

    let path = dir.join(file_name);
    let temp_path = path.with_extension("conf.tmp");
    std::fs::write(&temp_path, content)?;
    std::fs::rename(&temp_path, &path)?;
    Ok(path)
}
