use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::config::RepositoryRef;
use crate::core::traits::CommitCommenter;
use crate::dto::{CommitComment, CommitCommentRequest};
use crate::error::{AppError, Result};

pub struct GitHubClient {
    client: Client,
    api_url: String,
    access_token: String,
}

impl GitHubClient {
    pub fn new(api_url: &Url, access_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: api_url.as_str().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
        })
    }
}

#[async_trait]
impl CommitCommenter for GitHubClient {
    /// Create a comment on a commit
    async fn create_commit_comment(
        &self,
        repository: &RepositoryRef,
        sha: &str,
        body: &str,
    ) -> Result<CommitComment> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}/comments",
            self.api_url,
            urlencoding::encode(&repository.owner),
            urlencoding::encode(&repository.name),
            urlencoding::encode(sha)
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "RustAutoDeploy/0.1")
            .json(&CommitCommentRequest {
                body: body.to_string(),
            })
            .send()
            .await
            .map_err(|e| AppError::NotificationError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::NotificationError(format!(
                "GitHub returned {}: {}",
                status, error_text
            )));
        }

        response
            .json::<CommitComment>()
            .await
            .map_err(|e| AppError::NotificationError(format!("Unexpected comment response: {}", e)))
    }
}
