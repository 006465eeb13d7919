//! Cluster creation planning.
//!
//! Turns a provider choice into the ids the create endpoint needs and the
//! request body itself. Lookups work on already-fetched responses so the
//! selection rules are testable without the network.

use super::types::{
    CloudAccountsResponse, CreateClusterRequest, InstancesResponse, RegionsResponse, Scaling,
    ScalingPolicies, StoragePolicy, VcpuPolicy,
};
use crate::error::{KitError, Result};
use std::fmt;
use std::str::FromStr;

/// Credential owner the create flow looks for.
const CREDENTIAL_OWNER: &str = "Account";

/// Private CIDR block for the cluster VPC.
const CIDR_BLOCK: &str = "172.29.0.0/24";

/// Default ScyllaDB version for new clusters.
pub const DEFAULT_SCYLLA_VERSION: &str = "2025.3.3";

/// Supported cloud providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudProvider {
    Gcp,
    Aws,
}

impl CloudProvider {
    /// Returns the API's cloud provider id.
    pub fn provider_id(&self) -> i64 {
        match self {
            Self::Aws => 1,
            Self::Gcp => 2,
        }
    }

    /// Returns the default instance type.
    pub fn default_instance_type(&self) -> &'static str {
        match self {
            Self::Gcp => "n2-highmem-8",
            Self::Aws => "i4i.large",
        }
    }

    /// Returns the default region external id.
    pub fn default_region(&self) -> &'static str {
        match self {
            Self::Gcp => "us-west1",
            Self::Aws => "us-west-2",
        }
    }

    /// GCP instance types come in several local-disk variants; AWS ones don't.
    pub fn local_disk_count(&self) -> Option<i64> {
        match self {
            Self::Gcp => Some(1),
            Self::Aws => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcp => "gcp",
            Self::Aws => "aws",
        }
    }
}

impl FromStr for CloudProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gcp" => Ok(Self::Gcp),
            "aws" => Ok(Self::Aws),
            _ => Err(format!("Invalid cloud provider: {s}. Expected: gcp or aws")),
        }
    }
}

impl fmt::Display for CloudProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity model of the new cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingMode {
    /// Autoscaled X Cloud cluster.
    #[default]
    Xcloud,
    /// Fixed three-node cluster.
    Standard,
}

impl FromStr for ScalingMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xcloud" => Ok(Self::Xcloud),
            "standard" => Ok(Self::Standard),
            _ => Err(format!(
                "Invalid scaling mode: {s}. Expected: xcloud or standard"
            )),
        }
    }
}

/// Everything needed to create a cluster, before id resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPlan {
    pub provider: CloudProvider,
    pub mode: ScalingMode,
    pub instance_type: String,
    pub region: String,
    pub cluster_name: String,
    pub scylla_version: String,
}

impl ClusterPlan {
    /// Creates a plan from provider presets.
    pub fn new(provider: CloudProvider, mode: ScalingMode, name_prefix: &str) -> Self {
        let instance_type = provider.default_instance_type().to_string();
        Self {
            provider,
            mode,
            cluster_name: cluster_name(name_prefix, provider, &instance_type),
            instance_type,
            region: provider.default_region().to_string(),
            scylla_version: DEFAULT_SCYLLA_VERSION.to_string(),
        }
    }

    /// Overrides the instance type; the cluster name follows it.
    pub fn with_instance_type(mut self, instance_type: &str, name_prefix: &str) -> Self {
        self.instance_type = instance_type.to_string();
        self.cluster_name = cluster_name(name_prefix, self.provider, instance_type);
        self
    }

    pub fn with_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    pub fn with_scylla_version(mut self, version: &str) -> Self {
        self.scylla_version = version.to_string();
        self
    }

    /// Builds the create request from resolved ids.
    pub fn build_request(
        &self,
        credential_id: i64,
        region_id: i64,
        instance_id: i64,
    ) -> CreateClusterRequest {
        let mut request = CreateClusterRequest {
            account_credential_id: credential_id,
            broadcast_type: "PRIVATE".to_string(),
            cidr_block: CIDR_BLOCK.to_string(),
            rack_cidr_size: 26,
            cloud_provider_id: self.provider.provider_id(),
            region_id,
            cluster_name: self.cluster_name.clone(),
            replication_factor: 3,
            scylla_version: self.scylla_version.clone(),
            user_api_interface: "CQL".to_string(),
            tablets: "enforced".to_string(),
            free_tier: false,
            number_of_nodes: None,
            instance_id: None,
            scaling: None,
        };

        match self.mode {
            ScalingMode::Standard => {
                request.number_of_nodes = Some(3);
                request.instance_id = Some(instance_id);
            }
            ScalingMode::Xcloud => {
                request.scaling = Some(Scaling {
                    mode: "xcloud".to_string(),
                    instance_type_ids: vec![instance_id],
                    policies: ScalingPolicies {
                        storage: StoragePolicy {
                            min: 0,
                            target_utilization: 0.8,
                        },
                        vcpu: VcpuPolicy { min: 0 },
                    },
                });
            }
        }

        request
    }
}

/// Builds `{prefix}-{provider}-{instance}` with dots replaced by dashes.
pub fn cluster_name(prefix: &str, provider: CloudProvider, instance_type: &str) -> String {
    format!("{prefix}-{provider}-{instance_type}").replace('.', "-")
}

/// Picks the account-owned credential for the provider.
pub fn find_credential_id(accounts: &CloudAccountsResponse, provider: CloudProvider) -> Result<i64> {
    accounts
        .data
        .iter()
        .flatten()
        .find(|a| {
            a.owner.as_deref() == Some(CREDENTIAL_OWNER)
                && a.cloud_provider_id == Some(provider.provider_id())
        })
        .map(|a| a.id)
        .ok_or_else(|| {
            KitError::api(format!(
                "No {CREDENTIAL_OWNER}-owned cloud credential for provider {provider}"
            ))
        })
}

/// Picks the region by its external id (e.g. `us-west-2`).
pub fn find_region_id(regions: &RegionsResponse, region: &str) -> Result<i64> {
    regions
        .data
        .iter()
        .flat_map(|d| d.regions.iter())
        .find(|r| r.external_id == region)
        .map(|r| r.id)
        .ok_or_else(|| KitError::api(format!("Region '{region}' not offered")))
}

/// Picks the instance type, also matching the local disk count when given.
pub fn find_instance_id(
    instances: &InstancesResponse,
    instance_type: &str,
    local_disk_count: Option<i64>,
) -> Result<i64> {
    instances
        .data
        .iter()
        .flat_map(|d| d.instances.iter())
        .find(|i| {
            i.external_id == instance_type
                && local_disk_count.map_or(true, |n| i.local_disk_count == Some(n))
        })
        .map(|i| i.id)
        .ok_or_else(|| {
            KitError::api(format!(
                "Instance type '{instance_type}' not available in this region"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_cluster_name_replaces_dots() {
        assert_eq!(
            cluster_name("scylla-kit", CloudProvider::Aws, "i4i.large"),
            "scylla-kit-aws-i4i-large"
        );
        assert_eq!(
            cluster_name("demo", CloudProvider::Gcp, "n2-highmem-8"),
            "demo-gcp-n2-highmem-8"
        );
    }

    #[test]
    fn test_parse_provider_and_mode() {
        assert_eq!("GCP".parse::<CloudProvider>().unwrap(), CloudProvider::Gcp);
        assert_eq!("aws".parse::<CloudProvider>().unwrap(), CloudProvider::Aws);
        assert!("azure".parse::<CloudProvider>().is_err());
        assert_eq!(
            "standard".parse::<ScalingMode>().unwrap(),
            ScalingMode::Standard
        );
        assert!("serverless".parse::<ScalingMode>().is_err());
    }

    #[test]
    fn test_find_credential_id() {
        let accounts: CloudAccountsResponse = serde_json::from_value(json!({
            "data": [
                {"id": 1, "owner": "Scylla", "cloudProviderId": 1},
                {"id": 2, "owner": "Account", "cloudProviderId": 2},
                {"id": 3, "owner": "Account", "cloudProviderId": 1}
            ]
        }))
        .unwrap();

        assert_eq!(find_credential_id(&accounts, CloudProvider::Aws).unwrap(), 3);
        assert_eq!(find_credential_id(&accounts, CloudProvider::Gcp).unwrap(), 2);
        assert!(find_credential_id(&CloudAccountsResponse::default(), CloudProvider::Aws).is_err());
    }

    #[test]
    fn test_find_region_id() {
        let regions: RegionsResponse = serde_json::from_value(json!({
            "data": {"regions": [
                {"id": 10, "externalId": "us-east-1"},
                {"id": 11, "externalId": "us-west-2"}
            ]}
        }))
        .unwrap();

        assert_eq!(find_region_id(&regions, "us-west-2").unwrap(), 11);
        let err = find_region_id(&regions, "eu-west-1").unwrap_err();
        assert!(err.to_string().contains("eu-west-1"));
    }

    #[test]
    fn test_find_instance_id_matches_disk_count() {
        let instances: InstancesResponse = serde_json::from_value(json!({
            "data": {"instances": [
                {"id": 40, "externalId": "n2-highmem-8", "localDiskCount": 2},
                {"id": 41, "externalId": "n2-highmem-8", "localDiskCount": 1},
                {"id": 50, "externalId": "i4i.large"}
            ]}
        }))
        .unwrap();

        assert_eq!(
            find_instance_id(&instances, "n2-highmem-8", Some(1)).unwrap(),
            41
        );
        assert_eq!(find_instance_id(&instances, "n2-highmem-8", None).unwrap(), 40);
        assert_eq!(find_instance_id(&instances, "i4i.large", None).unwrap(), 50);
        assert!(find_instance_id(&instances, "i4i.large", Some(1)).is_err());
    }

    #[test]
    fn test_build_request_xcloud() {
        let plan = ClusterPlan::new(CloudProvider::Aws, ScalingMode::Xcloud, "kit");
        let body = serde_json::to_value(plan.build_request(3, 11, 50)).unwrap();

        assert_eq!(
            body,
            json!({
                "accountCredentialId": 3,
                "broadcastType": "PRIVATE",
                "cidrBlock": "172.29.0.0/24",
                "rackCIDRSize": 26,
                "cloudProviderId": 1,
                "regionId": 11,
                "clusterName": "kit-aws-i4i-large",
                "replicationFactor": 3,
                "scyllaVersion": "2025.3.3",
                "userApiInterface": "CQL",
                "tablets": "enforced",
                "freeTier": false,
                "scaling": {
                    "mode": "xcloud",
                    "instanceTypeIDs": [50],
                    "policies": {
                        "storage": {"min": 0, "targetUtilization": 0.8},
                        "vcpu": {"min": 0}
                    }
                }
            })
        );
    }

    #[test]
    fn test_build_request_standard() {
        let plan = ClusterPlan::new(CloudProvider::Gcp, ScalingMode::Standard, "kit")
            .with_region("europe-west1")
            .with_scylla_version("2025.1.0");
        let request = plan.build_request(2, 7, 41);

        assert_eq!(request.number_of_nodes, Some(3));
        assert_eq!(request.instance_id, Some(41));
        assert_eq!(request.scaling, None);
        assert_eq!(request.cloud_provider_id, 2);
        assert_eq!(request.scylla_version, "2025.1.0");
        assert_eq!(plan.region, "europe-west1");
    }

    #[test]
    fn test_instance_override_renames_cluster() {
        let plan = ClusterPlan::new(CloudProvider::Aws, ScalingMode::Xcloud, "kit")
            .with_instance_type("i4i.xlarge", "kit");
        assert_eq!(plan.instance_type, "i4i.xlarge");
        assert_eq!(plan.cluster_name, "kit-aws-i4i-xlarge");
    }
}
