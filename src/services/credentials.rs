use std::sync::Arc;

use tracing::info;

use crate::core::traits::CloudProvider;
use crate::dto::Account;
use crate::error::Result;

/// Confirms the provider token belongs to a live account
pub struct CredentialValidator {
    provider: Arc<dyn CloudProvider>,
}

impl CredentialValidator {
    pub fn new(provider: Arc<dyn CloudProvider>) -> Self {
        Self { provider }
    }

    /// Any error here is fatal: an unauthorized token surfaces as
    /// `AuthenticationError`, transport and decode failures as themselves.
    pub async fn validate(&self) -> Result<Account> {
        let account = self.provider.get_account().await?;
        info!("👤 USER {}", account.email);
        Ok(account)
    }
}
