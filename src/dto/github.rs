use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct CommitCommentRequest {
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitComment {
    pub id: u64,
    pub html_url: String,
    pub body: String,
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub user: Option<GitHubCommentAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubCommentAuthor {
    pub login: String,
}
