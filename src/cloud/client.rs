//! ScyllaDB Cloud REST client.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::types::{
    CloudAccountsResponse, ClustersResponse, CreateClusterRequest, DeleteClusterRequest,
    InstancesResponse, RegionsResponse,
};
use crate::config::CloudConfig;
use crate::error::{KitError, Result};

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Authenticated client for one ScyllaDB Cloud account.
#[derive(Debug, Clone)]
pub struct CloudClient {
    base_url: String,
    token: String,
    account_id: String,
    client: Client,
}

impl CloudClient {
    /// Creates a client from resolved configuration.
    pub fn new(config: &CloudConfig) -> Result<Self> {
        let base_url = config.base_url()?.as_str().trim_end_matches('/').to_string();
        let token = config.require_token()?.to_string();
        let account_id = config.require_account()?.to_string();

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| KitError::api(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            token,
            account_id,
            client,
        })
    }

    /// Returns the account this client operates on.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Lists the account's clusters.
    pub async fn list_clusters(&self) -> Result<ClustersResponse> {
        let path = format!("/account/{}/clusters", self.account_id);
        self.get(&path).await
    }

    /// Fetches one cluster's full description.
    pub async fn get_cluster(&self, cluster_id: &str) -> Result<serde_json::Value> {
        let path = format!("/account/{}/cluster/{cluster_id}", self.account_id);
        self.get(&path).await
    }

    /// Requests deletion; the API wants the cluster name as confirmation.
    pub async fn delete_cluster(
        &self,
        cluster_id: &str,
        cluster_name: &str,
    ) -> Result<serde_json::Value> {
        let path = format!("/account/{}/cluster/{cluster_id}/delete", self.account_id);
        let body = DeleteClusterRequest {
            cluster_name: cluster_name.to_string(),
        };
        self.post(&path, &body).await
    }

    pub async fn cloud_accounts(&self) -> Result<CloudAccountsResponse> {
        let path = format!("/account/{}/cloud-account", self.account_id);
        self.get(&path).await
    }

    pub async fn regions(&self, provider_id: i64) -> Result<RegionsResponse> {
        let path = format!("/deployment/cloud-provider/{provider_id}/regions");
        self.get(&path).await
    }

    pub async fn instances(&self, provider_id: i64, region_id: i64) -> Result<InstancesResponse> {
        let path = format!("/deployment/cloud-provider/{provider_id}/region/{region_id}");
        self.get(&path).await
    }

    /// Submits a cluster creation request.
    pub async fn create_cluster(
        &self,
        request: &CreateClusterRequest,
    ) -> Result<serde_json::Value> {
        let path = format!("/account/{}/cluster", self.account_id);
        self.post(&path, request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(&self.token)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(map_request_error)?;

        Self::read_json(response).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| KitError::api(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(parse_error(status, &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| KitError::api(format!("Failed to parse response: {e}")))
    }
}

fn map_request_error(e: reqwest::Error) -> KitError {
    if e.is_timeout() {
        KitError::api("Request timed out. Try again.")
    } else if e.is_connect() {
        KitError::api("Failed to connect to the ScyllaDB Cloud API. Check your network.")
    } else {
        KitError::api(format!("Request failed: {e}"))
    }
}

/// Parses an API error response.
fn parse_error(status: StatusCode, body: &str) -> KitError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return KitError::api("Authentication failed. Check your SC_TOKEN.");
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        return KitError::api("Rate limited. Please wait and try again.");
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        let message = value
            .get("error")
            .and_then(|e| e.get("message").or(Some(e)))
            .or_else(|| value.get("message"))
            .and_then(|m| m.as_str());
        if let Some(message) = message {
            return KitError::api(format!("HTTP {}: {message}", status.as_u16()));
        }
    }

    KitError::api(format!("HTTP {}: {}", status.as_u16(), body.trim()))
}
