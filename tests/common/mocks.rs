use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

use RustAutoDeploy::config::RepositoryRef;
use RustAutoDeploy::core::traits::{CloudProvider, CommandRunner, CommitCommenter, ToolInvocation};
use RustAutoDeploy::dto::{Account, Cluster, CommitComment};
use RustAutoDeploy::{AppError, Result};

pub const KUBECONFIG_CONTENT: &str = "apiVersion: v1\nkind: Config\n";

/// Mock cloud provider with a fixed cluster list
pub struct MockCloudProvider {
    clusters: Vec<Cluster>,
    unauthorized: bool,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockCloudProvider {
    pub fn new(cluster_names: &[&str]) -> Arc<Self> {
        let clusters = cluster_names
            .iter()
            .enumerate()
            .map(|(i, name)| Cluster {
                id: format!("cluster-{}", i),
                name: name.to_string(),
                region: Some("fra1".to_string()),
                version: None,
            })
            .collect();
        Arc::new(Self {
            clusters,
            unauthorized: false,
            calls: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub fn unauthorized() -> Arc<Self> {
        Arc::new(Self {
            clusters: Vec::new(),
            unauthorized: true,
            calls: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.write().await.push(call.into());
    }
}

#[async_trait]
impl CloudProvider for MockCloudProvider {
    async fn get_account(&self) -> Result<Account> {
        self.record("account").await;
        if self.unauthorized {
            return Err(AppError::AuthenticationError(
                "Unable to authenticate you".to_string(),
            ));
        }
        Ok(Account {
            email: "ops@example.com".to_string(),
            uuid: None,
            status: Some("active".to_string()),
            email_verified: true,
        })
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.record("clusters").await;
        Ok(self.clusters.clone())
    }

    async fn get_kubeconfig(&self, cluster_id: &str) -> Result<String> {
        self.record(format!("kubeconfig:{}", cluster_id)).await;
        Ok(KUBECONFIG_CONTENT.to_string())
    }
}

/// Mock commit comment API
pub struct MockCommitCommenter {
    should_fail: bool,
    bodies: Arc<RwLock<Vec<String>>>,
}

impl MockCommitCommenter {
    pub fn new(should_fail: bool) -> Arc<Self> {
        Arc::new(Self {
            should_fail,
            bodies: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub async fn bodies(&self) -> Vec<String> {
        self.bodies.read().await.clone()
    }
}

#[async_trait]
impl CommitCommenter for MockCommitCommenter {
    async fn create_commit_comment(
        &self,
        _repository: &RepositoryRef,
        sha: &str,
        body: &str,
    ) -> Result<CommitComment> {
        self.bodies.write().await.push(body.to_string());
        if self.should_fail {
            return Err(AppError::NotificationError(
                "GitHub returned 403 Forbidden".to_string(),
            ));
        }
        Ok(CommitComment {
            id: 7,
            html_url: format!("https://github.com/octo/hello/commit/{}#commitcomment-7", sha),
            body: body.to_string(),
            commit_id: Some(sha.to_string()),
            user: None,
        })
    }
}

/// A recorded tool call plus what the kubeconfig looked like at that moment
#[derive(Debug, Clone)]
pub struct RecordedInvocation {
    pub invocation: ToolInvocation,
    pub kubeconfig: Option<String>,
}

/// Command runner that records invocations instead of spawning processes
pub struct RecordingRunner {
    exit_code: Option<i32>,
    delay: Duration,
    started: Arc<Notify>,
    invocations: Arc<RwLock<Vec<RecordedInvocation>>>,
}

impl RecordingRunner {
    pub fn new(exit_code: Option<i32>) -> Arc<Self> {
        Self::with_delay(exit_code, Duration::ZERO)
    }

    /// Runner whose calls take `delay` before they are recorded as finished
    pub fn with_delay(exit_code: Option<i32>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            exit_code,
            delay,
            started: Arc::new(Notify::new()),
            invocations: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Notified as soon as a call starts
    pub fn started(&self) -> Arc<Notify> {
        self.started.clone()
    }

    pub async fn invocations(&self) -> Vec<RecordedInvocation> {
        self.invocations.read().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.invocations.read().await.len()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &ToolInvocation) -> Result<Option<i32>> {
        self.started.notify_one();
        let kubeconfig = invocation
            .env_value("KUBECONFIG")
            .and_then(|path| std::fs::read_to_string(PathBuf::from(path)).ok());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.invocations.write().await.push(RecordedInvocation {
            invocation: invocation.clone(),
            kubeconfig,
        });
        Ok(self.exit_code)
    }
}
