//! Request and response payloads of the ScyllaDB Cloud REST API.
//!
//! Only the fields scylla-kit reads are modelled; everything else is ignored
//! on deserialization.

use serde::{Deserialize, Serialize};

/// `GET /account/{account}/clusters`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClustersResponse {
    #[serde(default)]
    pub data: Option<ClustersData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClustersData {
    #[serde(default)]
    pub clusters: Vec<ClusterSummary>,
}

/// One entry of the cluster list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusterSummary {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "clusterName", default)]
    pub cluster_name: String,
}

impl ClustersResponse {
    /// Returns the listed clusters, empty when the payload has none.
    pub fn clusters(&self) -> &[ClusterSummary] {
        self.data
            .as_ref()
            .map(|d| d.clusters.as_slice())
            .unwrap_or_default()
    }
}

/// `GET /account/{account}/cloud-account`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CloudAccountsResponse {
    #[serde(default)]
    pub data: Option<Vec<CloudAccount>>,
}

/// A cloud credential registered on the account.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CloudAccount {
    pub id: i64,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(rename = "cloudProviderId", default)]
    pub cloud_provider_id: Option<i64>,
}

/// `GET /deployment/cloud-provider/{provider}/regions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionsResponse {
    #[serde(default)]
    pub data: Option<RegionsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegionsData {
    #[serde(default)]
    pub regions: Vec<Region>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    pub id: i64,
    #[serde(rename = "externalId", default)]
    pub external_id: String,
}

/// `GET /deployment/cloud-provider/{provider}/region/{region}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstancesResponse {
    #[serde(default)]
    pub data: Option<InstancesData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstancesData {
    #[serde(default)]
    pub instances: Vec<InstanceType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InstanceType {
    pub id: i64,
    #[serde(rename = "externalId", default)]
    pub external_id: String,
    #[serde(rename = "localDiskCount", default)]
    pub local_disk_count: Option<i64>,
}

/// `POST /account/{account}/cluster/{id}/delete`.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteClusterRequest {
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
}

/// `POST /account/{account}/cluster`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub account_credential_id: i64,
    pub broadcast_type: String,
    pub cidr_block: String,
    #[serde(rename = "rackCIDRSize")]
    pub rack_cidr_size: u32,
    pub cloud_provider_id: i64,
    pub region_id: i64,
    pub cluster_name: String,
    pub replication_factor: u32,
    pub scylla_version: String,
    pub user_api_interface: String,
    pub tablets: String,
    pub free_tier: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_of_nodes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling: Option<Scaling>,
}

/// Autoscaling block for xcloud clusters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scaling {
    pub mode: String,
    #[serde(rename = "instanceTypeIDs")]
    pub instance_type_ids: Vec<i64>,
    pub policies: ScalingPolicies,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingPolicies {
    pub storage: StoragePolicy,
    pub vcpu: VcpuPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoragePolicy {
    pub min: u32,
    pub target_utilization: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VcpuPolicy {
    pub min: u32,
}
