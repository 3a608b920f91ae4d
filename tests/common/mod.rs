// Test utilities and common setup
pub mod mocks;

pub use mocks::*;

use std::path::PathBuf;
use std::sync::Arc;

use RustAutoDeploy::ci::{DeployOrchestrator, DeploymentInvoker};
use RustAutoDeploy::config::{RepositoryRef, RunInputs};
use RustAutoDeploy::services::CommitNotifier;

pub const CHART_PATH: &str = "/action/k8s/helm";

/// Orchestrator wired against the supplied doubles
pub fn orchestrator(
    provider: Arc<MockCloudProvider>,
    commenter: Option<Arc<MockCommitCommenter>>,
    runner: Arc<RecordingRunner>,
) -> DeployOrchestrator {
    let notifier = match commenter {
        Some(commenter) => CommitNotifier::new(
            true,
            Some(commenter),
            Some(RepositoryRef {
                owner: "octo".to_string(),
                name: "hello".to_string(),
            }),
            Some("0123abcd".to_string()),
        ),
        None => CommitNotifier::disabled(),
    };
    let invoker = DeploymentInvoker::new(runner, "helm", PathBuf::from(CHART_PATH));
    DeployOrchestrator::new(provider, notifier, invoker)
}

/// Inputs for a deploy of `image` to the `prod` cluster
pub fn deploy_inputs(image: &str) -> RunInputs {
    RunInputs {
        digitalocean_token: Some("do-token".to_string()),
        digitalocean_cluster: Some("prod".to_string()),
        image: image.to_string(),
        port: 80,
        ..Default::default()
    }
}
