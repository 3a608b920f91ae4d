use std::sync::Arc;

use tracing::{info, warn};

use crate::ci::helm::HelmOperation;
use crate::ci::parameters::DeploymentTarget;
use crate::config::RepositoryRef;
use crate::core::traits::CommitCommenter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    Posted { comment_id: u64, url: String },
    Skipped(String),
    Failed(String),
}

/// Posts the deployment link on the triggering commit.
///
/// Never fails the run: every error is logged and reported as
/// [`NotificationOutcome::Failed`].
pub struct CommitNotifier {
    enabled: bool,
    commenter: Option<Arc<dyn CommitCommenter>>,
    repository: Option<RepositoryRef>,
    sha: Option<String>,
}

impl CommitNotifier {
    pub fn new(
        enabled: bool,
        commenter: Option<Arc<dyn CommitCommenter>>,
        repository: Option<RepositoryRef>,
        sha: Option<String>,
    ) -> Self {
        Self {
            enabled,
            commenter,
            repository,
            sha,
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, None, None, None)
    }

    pub fn comment_body(target: &DeploymentTarget, operation: HelmOperation) -> Option<String> {
        let url = target.url()?;
        let body = match operation {
            HelmOperation::Upgrade => {
                format!("🚀 Deploying `{}` to {}", target.release_name(), url)
            }
            HelmOperation::Delete => {
                format!("🗑️ Removing deployment `{}` from {}", target.release_name(), url)
            }
        };
        Some(body)
    }

    pub async fn notify(&self, target: &DeploymentTarget, operation: HelmOperation) -> NotificationOutcome {
        if !self.enabled {
            return skip("commit comment disabled");
        }
        let Some(commenter) = &self.commenter else {
            return skip("commit comment enabled but no github_token supplied");
        };
        let (Some(repository), Some(sha)) = (&self.repository, &self.sha) else {
            return skip("commit comment enabled but GITHUB_REPOSITORY/GITHUB_SHA are not set");
        };
        let Some(body) = Self::comment_body(target, operation) else {
            return skip("commit comment enabled but no host to link to");
        };

        match commenter.create_commit_comment(repository, sha, &body).await {
            Ok(comment) => {
                info!("💬 Commented on {}/{}@{}", repository.owner, repository.name, sha);
                NotificationOutcome::Posted {
                    comment_id: comment.id,
                    url: comment.html_url,
                }
            }
            Err(e) => {
                warn!("⚠️ Commit comment failed, continuing: {}", e);
                NotificationOutcome::Failed(e.to_string())
            }
        }
    }
}

fn skip(reason: &str) -> NotificationOutcome {
    warn!("⚠️ Skipping commit comment: {}", reason);
    NotificationOutcome::Skipped(reason.to_string())
}
