//! ScyllaDB Cloud API integration.
//!
//! A thin REST client plus the selection rules used when creating clusters.

mod client;
pub mod plan;
pub mod types;

pub use client::CloudClient;
pub use plan::{CloudProvider, ClusterPlan, ScalingMode};
