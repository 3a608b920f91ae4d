use serde::{Deserialize, Serialize};

/// Error body the DigitalOcean API returns instead of the requested resource
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    pub id: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ApiErrorBody {
    pub const UNAUTHORIZED: &'static str = "unauthorized";

    pub fn is_unauthorized(&self) -> bool {
        self.id == Self::UNAUTHORIZED
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub email: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterListResponse {
    pub kubernetes_clusters: Vec<Cluster>,
    #[serde(default)]
    pub links: Option<Links>,
}

impl ClusterListResponse {
    pub fn next_page(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.pages.as_ref())
            .and_then(|p| p.next.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    #[serde(default)]
    pub pages: Option<Pages>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pages {
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub last: Option<String>,
}
