// This file is part of Setcode.
//
// Setcode is free software: you can redistribute it and/or modify it under the
// terms of the GNU Lesser General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later version.
//
// Setcode is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with Setcode.
// If not, see https://www.gnu.org/licenses/.

use std::time::Duration;

use alloy_provider::RootProvider;
use alloy_rpc_client::ClientBuilder;
use alloy_transport_http::Http;
use anyhow::Context;
use evm::AlloyEvmProvider;
use provider_retry::RateLimitRetryLayer;
use reqwest::Client;
use setcode_utils::retry::BackoffOpts;
use url::Url;

use crate::Connect;

pub(crate) mod evm;
pub(crate) mod provider_retry;

/// Settings for the HTTP client behind every provider
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProviderSettings {
    /// Per request timeout
    pub timeout: Duration,
    /// Backoff applied to rate limited requests
    pub backoff: BackoffOpts,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            backoff: BackoffOpts::default(),
        }
    }
}

/// Create a new alloy evm provider from a given RPC URL
pub fn new_alloy_evm_provider(
    rpc_url: &str,
    settings: ProviderSettings,
) -> anyhow::Result<AlloyEvmProvider<RootProvider>> {
    let provider = new_alloy_provider(rpc_url, settings)?;
    Ok(AlloyEvmProvider::new(provider))
}

/// Create a new alloy provider from a given RPC URL
///
/// Every request goes through the rate limit retry layer, so callers see a rate limit error
/// only once the backoff schedule is exhausted.
pub fn new_alloy_provider(
    rpc_url: &str,
    settings: ProviderSettings,
) -> anyhow::Result<RootProvider> {
    let url = Url::parse(rpc_url).context("invalid rpc url")?;
    let http_client = Client::builder()
        .timeout(settings.timeout)
        .build()
        .context("failed to build http client")?;
    let is_local = alloy_transport::utils::guess_local_url(&url);
    let transport = Http::with_client(http_client, url);
    let client = ClientBuilder::default()
        .layer(RateLimitRetryLayer::new(settings.backoff))
        .transport(transport, is_local);
    Ok(RootProvider::new(client))
}

/// Connects to RPC endpoints with the alloy HTTP stack
#[derive(Clone, Copy, Debug, Default)]
pub struct AlloyConnector {
    settings: ProviderSettings,
}

impl AlloyConnector {
    /// Create a connector that applies `settings` to every provider it opens
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }
}

impl Connect for AlloyConnector {
    type Provider = AlloyEvmProvider<RootProvider>;

    fn connect(&self, rpc_url: &str) -> anyhow::Result<Self::Provider> {
        new_alloy_evm_provider(rpc_url, self.settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_rejects_bad_url() {
        let connector = AlloyConnector::default();
        assert!(connector.connect("not a url").is_err());
    }

    #[test]
    fn test_connect_builds_provider() {
        let connector = AlloyConnector::new(ProviderSettings {
            timeout: Duration::from_secs(5),
            backoff: BackoffOpts::default(),
        });
        assert!(connector.connect("http://localhost:8545").is_ok());
    }
}
