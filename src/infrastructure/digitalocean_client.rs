use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::core::traits::CloudProvider;
use crate::dto::{Account, AccountResponse, ApiErrorBody, Cluster, ClusterListResponse};
use crate::error::{AppError, Result};

const USER_AGENT: &str = "RustAutoDeploy/0.1";
const CLUSTERS_PER_PAGE: u32 = 100;

/// DigitalOcean REST API client authenticated with a bearer token
pub struct DigitalOceanClient {
    client: Client,
    api_url: Url,
    base_url: String,
    token: String,
}

impl DigitalOceanClient {
    pub fn new(base_url: &Url, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: base_url.clone(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Pagination links are only followed on the API origin the token belongs to
    fn check_page_link(&self, link: &str) -> Result<()> {
        let url = Url::parse(link).map_err(|e| AppError::DecodeError {
            endpoint: link.to_string(),
            message: format!("invalid pagination link: {}", e),
        })?;
        if url.origin() != self.api_url.origin() {
            return Err(AppError::ExternalServiceError(format!(
                "refusing to follow pagination link to foreign host {}",
                url.origin().ascii_serialization()
            )));
        }
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("🌐 GET {}", url);
        let response = self.client.get(url).bearer_auth(&self.token).send().await?;

        let status = response.status();
        let body = response.text().await?;
        parse_api_body(url, status, &body)
    }
}

/// Classifies a provider response body.
///
/// An error body with id `unauthorized` (or a bare 401) is an authentication
/// failure; any other error body or non-success status is an upstream
/// failure; a success body that does not match `T` is a decode failure.
pub fn parse_api_body<T: DeserializeOwned>(endpoint: &str, status: StatusCode, body: &str) -> Result<T> {
    if let Ok(err) = serde_json::from_str::<ApiErrorBody>(body) {
        if err.is_unauthorized() {
            return Err(AppError::AuthenticationError(err.message));
        }
        return Err(AppError::ExternalServiceError(format!(
            "{} returned {}: {}",
            endpoint, err.id, err.message
        )));
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::AuthenticationError(format!(
            "{} rejected the token",
            endpoint
        )));
    }

    if !status.is_success() {
        return Err(AppError::ExternalServiceError(format!(
            "{} returned HTTP {}",
            endpoint, status
        )));
    }

    serde_json::from_str(body).map_err(|e| AppError::DecodeError {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl CloudProvider for DigitalOceanClient {
    async fn get_account(&self) -> Result<Account> {
        let response: AccountResponse = self.get_json(&self.endpoint("/account")).await?;
        Ok(response.account)
    }

    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        let mut clusters = Vec::new();
        let mut next = Some(self.endpoint(&format!(
            "/kubernetes/clusters?per_page={}",
            CLUSTERS_PER_PAGE
        )));

        let mut fetched = HashSet::new();

        while let Some(url) = next.take() {
            if !fetched.insert(url.clone()) {
                warn!("⚠️ Pagination link {} repeats, stopping", url);
                break;
            }
            let page: ClusterListResponse = self.get_json(&url).await?;
            if let Some(link) = page.next_page() {
                self.check_page_link(link)?;
                next = Some(link.to_string());
            }
            clusters.extend(page.kubernetes_clusters);
        }

        debug!("📋 Found {} clusters", clusters.len());
        Ok(clusters)
    }

    async fn get_kubeconfig(&self, cluster_id: &str) -> Result<String> {
        let url = self.endpoint(&format!(
            "/kubernetes/clusters/{}/kubeconfig",
            urlencoding::encode(cluster_id)
        ));
        debug!("🌐 GET {}", url);

        let response = self.client.get(&url).bearer_auth(&self.token).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Error bodies are JSON even on this text endpoint.
            return match parse_api_body::<serde_json::Value>(&url, status, &body) {
                Err(e) => Err(e),
                Ok(_) => Err(AppError::ExternalServiceError(format!(
                    "{} returned HTTP {}",
                    url, status
                ))),
            };
        }

        Ok(body)
    }
}
