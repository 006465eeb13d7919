//! `cloud`: ScyllaDB Cloud cluster management.

use super::write_json;
use crate::cli::{CloudAction, CreateArgs};
use crate::cloud::plan::{find_credential_id, find_instance_id, find_region_id};
use crate::cloud::types::ClustersResponse;
use crate::cloud::{CloudClient, ClusterPlan};
use crate::config::Config;
use crate::error::{KitError, Result};
use std::io::{BufRead, Write};
use tracing::info;

/// Runs one cloud action against the configured account.
pub async fn run(action: &CloudAction, config: &Config, out: &mut impl Write) -> Result<()> {
    let mut cloud = config.cloud.clone();
    cloud.apply_env_defaults();
    let client = CloudClient::new(&cloud)?;

    match action {
        CloudAction::List => {
            let clusters = client.list_clusters().await?;
            write_cluster_list(client.account_id(), &clusters, out)
        }
        CloudAction::Show { cluster_id } => {
            let cluster = client.get_cluster(cluster_id).await?;
            write_json(&cluster, out)
        }
        CloudAction::Delete {
            cluster_id,
            cluster_name,
            yes,
        } => {
            if !yes {
                let prompt =
                    format!("Deleting cluster {cluster_name} ({cluster_id}). Are you sure? (y/N) ");
                let stdin = std::io::stdin();
                if !confirm(&prompt, &mut stdin.lock(), out)? {
                    writeln!(out, "Aborting.")?;
                    return Err(KitError::input("Cluster deletion aborted"));
                }
            }
            let response = client.delete_cluster(cluster_id, cluster_name).await?;
            write_json(&response, out)
        }
        CloudAction::Create(args) => create(&client, args, out).await,
    }
}

/// Writes the cluster table printed by `cloud list`.
pub fn write_cluster_list(
    account_id: &str,
    clusters: &ClustersResponse,
    out: &mut impl Write,
) -> Result<()> {
    writeln!(out, "Listing clusters for account {account_id}:")?;
    writeln!(out, "   ID Cluster Name")?;
    for cluster in clusters.clusters() {
        let id = cluster
            .id
            .map_or_else(|| "-".to_string(), |id| id.to_string());
        writeln!(out, "{id} {}", cluster.cluster_name)?;
    }
    Ok(())
}

/// Asks a yes/no question; only `y` or `Y` confirms.
pub fn confirm(prompt: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "{prompt}")?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

async fn create(client: &CloudClient, args: &CreateArgs, out: &mut impl Write) -> Result<()> {
    let mut plan = ClusterPlan::new(args.provider, args.mode, &args.name_prefix)
        .with_scylla_version(&args.scylla_version);
    if let Some(instance_type) = &args.instance_type {
        plan = plan.with_instance_type(instance_type, &args.name_prefix);
    }
    if let Some(region) = &args.region {
        plan = plan.with_region(region);
    }
    let provider_id = plan.provider.provider_id();

    let accounts = client.cloud_accounts().await?;
    let credential_id = find_credential_id(&accounts, plan.provider)?;
    writeln!(out, "Cloud Credential ID: {credential_id}")?;

    let regions = client.regions(provider_id).await?;
    let region_id = find_region_id(&regions, &plan.region)?;
    writeln!(out, "Region ID: {region_id}")?;

    let instances = client.instances(provider_id, region_id).await?;
    let instance_id = find_instance_id(
        &instances,
        &plan.instance_type,
        plan.provider.local_disk_count(),
    )?;
    writeln!(out, "Instance ID: {instance_id}")?;

    let request = plan.build_request(credential_id, region_id, instance_id);
    write_json(&request, out)?;

    if args.dry_run {
        info!("Dry run: cluster {} not submitted", plan.cluster_name);
        return Ok(());
    }

    info!("Creating cluster {}", plan.cluster_name);
    let response = client.create_cluster(&request).await?;
    write_json(&response, out)
}
