// Copyright (c) 2025 The ethwizard contributors
//
// This file is part of ethwizard.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.

//! Running version: ask the live process over its API

use crate::adapter::{ClientAdapter, StatusEndpoint};
use crate::config::EndpointConfig;
use ethwizard_types::{Version, VersionValue, parse_version};
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::sync::LazyLock;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct RpcResponse {
    result: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NodeVersionResponse {
    data: NodeVersion,
}

#[derive(Debug, Deserialize)]
struct NodeVersion {
    version: String,
}

#[derive(Debug, Clone)]
pub struct StatusClient {
    client: reqwest::Client,
    execution_rpc_url: String,
    beacon_api_url: String,
}

impl StatusClient {
    pub fn new(endpoints: &EndpointConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(endpoints.status_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            execution_rpc_url: endpoints.execution_rpc_url.clone(),
            beacon_api_url: endpoints.beacon_api_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Version the live process reports; unreachable or unparseable is `Unknown`
    pub async fn running_version(&self, adapter: &dyn ClientAdapter) -> VersionValue {
        let kind = adapter.kind();
        let agent = match adapter.status_endpoint() {
            StatusEndpoint::JsonRpc => self.client_version().await,
            StatusEndpoint::BeaconNodeVersion => self.node_version().await,
            StatusEndpoint::None => return VersionValue::Unknown,
        };

        match agent {
            Ok(agent) => {
                debug!("{kind} reports {agent}");
                let version = parse_agent_version(&agent);
                if version.is_none() {
                    warn!("{kind}: no version in agent string {agent}");
                }
                version.into()
            }
            Err(e) => {
                warn!("{kind}: status endpoint unavailable: {e}");
                VersionValue::Unknown
            }
        }
    }

    async fn client_version(&self) -> Result<String, String> {
        let request = json!({
            "jsonrpc": "2.0",
            "method": "web3_clientVersion",
            "params": [],
            "id": 1,
        });

        let response = self
            .client
            .post(&self.execution_rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let body: RpcResponse = response.json().await.map_err(|e| e.to_string())?;
        body.result
            .ok_or_else(|| "web3_clientVersion returned no result".to_owned())
    }

    async fn node_version(&self) -> Result<String, String> {
        let url = format!("{}/eth/v1/node/version", self.beacon_api_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let body: NodeVersionResponse = response.json().await.map_err(|e| e.to_string())?;
        Ok(body.data.version)
    }
}

/// First `X.Y.Z` run in free-form text such as `Lighthouse/v3.1.0-aa022f4`
static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\D)(\d+\.\d+\.\d+)").expect("version token pattern is valid")
});

fn find_version(text: &str) -> Option<Version> {
    VERSION_TOKEN
        .captures(text)
        .and_then(|caps| parse_version(&caps[1]).ok())
}

/// Version from an agent string like `Geth/v1.10.23-stable-d901d853/linux-amd64/go1.18.5`
pub fn parse_agent_version(agent: &str) -> Option<Version> {
    agent
        .split('/')
        .nth(1)
        .and_then(|segment| parse_version(segment).ok())
        .or_else(|| find_version(agent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{GethAdapter, LighthouseAdapter, MevBoostAdapter, NethermindAdapter};
    use mockito::{Matcher, Server, ServerGuard};

    fn status_client(server: &ServerGuard) -> StatusClient {
        StatusClient::new(&EndpointConfig {
            execution_rpc_url: server.url(),
            engine_api_url: "http://127.0.0.1:8551".to_owned(),
            beacon_api_url: server.url(),
            status_timeout_secs: 2,
        })
        .unwrap()
    }

    #[test]
    fn test_find_version() {
        assert_eq!(
            find_version("Lighthouse v3.1.0-aa022f4\nBLS library: blst"),
            Some(Version::new(3, 1, 0))
        );
        assert_eq!(
            find_version("Nimbus beacon node v22.9.1-f3a2d8-stateofus"),
            Some(Version::new(22, 9, 1))
        );
        assert_eq!(
            find_version("Version: 1.10.23."),
            Some(Version::new(1, 10, 23))
        );
        assert_eq!(find_version("no version here 1.2"), None);
    }

    #[test]
    fn test_parse_agent_versions() {
        assert_eq!(
            parse_agent_version("Geth/v1.10.23-stable-d901d853/linux-amd64/go1.18.5"),
            Some(Version::new(1, 10, 23))
        );
        assert_eq!(
            parse_agent_version("Nethermind/v1.14.1+a4d1e4b3/linux-x64/dotnet6.0.8"),
            Some(Version::new(1, 14, 1))
        );
        assert_eq!(
            parse_agent_version("teku/v22.9.0/linux-x86_64/-eclipseadoptium-openjdk64bitservervm-java-17"),
            Some(Version::new(22, 9, 0))
        );
        assert_eq!(
            parse_agent_version("Nimbus/v22.9.1-f3a2d8-stateofus"),
            Some(Version::new(22, 9, 1))
        );
        assert_eq!(
            parse_agent_version("Geth/mynode/v1.10.23-stable/linux-amd64"),
            Some(Version::new(1, 10, 23))
        );
        assert_eq!(parse_agent_version("unknown agent"), None);
    }

    #[tokio::test]
    async fn test_execution_client_version() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({"method": "web3_clientVersion"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": "Nethermind/v1.14.1+a4d1e4b3/linux-x64/dotnet6.0.8"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let version = status_client(&server)
            .running_version(&NethermindAdapter)
            .await;
        assert_eq!(version, VersionValue::Known(Version::new(1, 14, 1)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_beacon_node_version() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/eth/v1/node/version")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({"data": {"version": "Lighthouse/v3.1.0-aa022f4/x86_64-linux"}}).to_string())
            .create_async()
            .await;

        let version = status_client(&server)
            .running_version(&LighthouseAdapter)
            .await;
        assert_eq!(version, VersionValue::Known(Version::new(3, 1, 0)));

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_response_is_unknown() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(500)
            .create_async()
            .await;

        let version = status_client(&server).running_version(&GethAdapter).await;
        assert_eq!(version, VersionValue::Unknown);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unknown() {
        let client = StatusClient::new(&EndpointConfig {
            execution_rpc_url: "http://127.0.0.1:1".to_owned(),
            status_timeout_secs: 1,
            ..EndpointConfig::default()
        })
        .unwrap();
        assert_eq!(
            client.running_version(&GethAdapter).await,
            VersionValue::Unknown
        );
    }

    #[tokio::test]
    async fn test_no_endpoint_is_unknown() {
        let server = Server::new_async().await;
        let version = status_client(&server)
            .running_version(&MevBoostAdapter)
            .await;
        assert_eq!(version, VersionValue::Unknown);
    }
}
