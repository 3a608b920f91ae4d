//! Seams between the orchestration sequence and the outside world
//!
//! The cloud API, the commit comment API and process execution are each
//! behind a trait so the sequence can run against test doubles.

use async_trait::async_trait;
use std::ffi::OsString;

use crate::config::RepositoryRef;
use crate::dto::{Account, Cluster, CommitComment};
use crate::error::Result;

/// Managed Kubernetes provider API
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Fetch the account the bearer token belongs to
    async fn get_account(&self) -> Result<Account>;

    /// List every managed cluster in the account
    async fn list_clusters(&self) -> Result<Vec<Cluster>>;

    /// Fetch the raw kubeconfig for a cluster
    async fn get_kubeconfig(&self, cluster_id: &str) -> Result<String>;
}

/// Source hosting API that can comment on a commit
#[async_trait]
pub trait CommitCommenter: Send + Sync {
    async fn create_commit_comment(
        &self,
        repository: &RepositoryRef,
        sha: &str,
        body: &str,
    ) -> Result<CommitComment>;
}

/// A fully specified external process call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub program: String,
    pub args: Vec<String>,
    /// Variables set on the child only
    pub env: Vec<(String, OsString)>,
}

impl ToolInvocation {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env: Vec::new(),
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn env_value(&self, key: &str) -> Option<&OsString> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

/// Runs external tools to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Returns the exit code, or `None` when the process was killed by a signal
    async fn run(&self, invocation: &ToolInvocation) -> Result<Option<i32>>;
}
