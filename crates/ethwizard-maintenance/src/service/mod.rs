// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Service control
//!
//! The maintenance core talks to the OS service manager only through
//! [`ServiceControl`]. Two implementations ship: systemd on Linux and NSSM
//! for Windows installs.

pub mod nssm;
pub mod systemd;

use crate::error::ServiceError;
use async_trait::async_trait;
use ethwizard_types::ServiceState;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

pub use nssm::NssmServiceControl;
pub use systemd::SystemdServiceControl;

/// A setting written to a service registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceParameter {
    /// The full argument vector passed to the client binary
    Arguments(Vec<String>),
    /// How long the manager waits for a graceful stop before killing
    ShutdownTimeout(Duration),
}

#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// Current registration and run state, `None` when not registered
    async fn query(&self, service: &str) -> Result<Option<ServiceState>, ServiceError>;

    async fn start(&self, service: &str) -> Result<(), ServiceError>;

    async fn stop(&self, service: &str) -> Result<(), ServiceError>;

    async fn restart(&self, service: &str) -> Result<(), ServiceError>;

    async fn set_parameter(
        &self,
        service: &str,
        parameter: &ServiceParameter,
    ) -> Result<(), ServiceError>;
}

/// Resolve a service manager executable on `PATH`
pub(crate) fn locate_tool(name: &str) -> Result<PathBuf, ServiceError> {
    which::which(name).map_err(|_| ServiceError::ToolMissing(name.to_owned()))
}

/// Run a service manager command and capture its output.
///
/// A non-zero exit is returned as output, not as an error; callers decide
/// what a failure means for their command.
pub(crate) async fn run_tool(tool: &Path, args: &[&str]) -> Result<Output, ServiceError> {
    debug!("Running {} {}", tool.display(), args.join(" "));

    Command::new(tool).args(args).output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ServiceError::ToolMissing(tool.display().to_string())
        } else {
            ServiceError::Io(e)
        }
    })
}

/// Like [`run_tool`], but a non-zero exit becomes [`ServiceError::Command`]
pub(crate) async fn run_checked(
    tool: &Path,
    service: &str,
    args: &[&str],
) -> Result<Output, ServiceError> {
    let output = run_tool(tool, args).await?;
    if output.status.success() {
        return Ok(output);
    }

    let message = String::from_utf8_lossy(&output.stderr).trim().to_owned();
    Err(ServiceError::Command {
        service: service.to_owned(),
        command: args.join(" "),
        message: if message.is_empty() {
            format!("exit status {}", output.status)
        } else {
            message
        },
    })
}

/// Join arguments into one command line, quoting those with whitespace
pub fn join_command_line<S: AsRef<str>>(args: &[S]) -> String {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                format!("\"{}\"", arg.replace('"', "\\\""))
            } else {
                arg.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a command line on whitespace, honouring double quotes
pub fn split_command_line(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
                has_token = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }
    if has_token {
        args.push(current);
    }

    args
}
