use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::ci::workspace::Workspace;
use crate::core::traits::CloudProvider;
use crate::dto::Cluster;
use crate::error::{AppError, Result};

pub const KUBECONFIG_FILE: &str = "kubeconfig";

/// Kubeconfig for the resolved cluster, materialized inside the workspace
#[derive(Debug, Clone)]
pub struct KubeCredential {
    pub cluster: Cluster,
    pub path: PathBuf,
}

/// Finds the requested cluster and writes its kubeconfig into the workspace
pub struct ClusterResolver {
    provider: Arc<dyn CloudProvider>,
}

impl ClusterResolver {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self { provider }
    }

    /// Exact, case-sensitive name match
    pub async fn find_cluster(&self, name: &str) -> Result<Cluster> {
        let clusters = self.provider.list_clusters().await?;
        debug!("🔍 Looking for cluster {} among {} clusters", name, clusters.len());

        clusters
            .into_iter()
            .find(|cluster| cluster.name == name)
            .ok_or_else(|| AppError::ClusterNotFound(name.to_string()))
    }

    pub async fn resolve(&self, name: &str, workspace: &Workspace) -> Result<KubeCredential> {
        let cluster = self.find_cluster(name).await?;
        info!("☸️ Cluster {} ({})", cluster.name, cluster.id);

        let kubeconfig = self.provider.get_kubeconfig(&cluster.id).await?;
        let path = workspace.write_private_file(KUBECONFIG_FILE, &kubeconfig).await?;
        info!("🔑 LOADED kubeconfig");

        Ok(KubeCredential { cluster, path })
    }
}
