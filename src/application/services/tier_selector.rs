use std::future::Future;

use tracing::{debug, info, instrument, warn};

use super::provider_outcome::{ProviderOutcome, Served};
use crate::application::ports::ApiCredential;
use crate::domain::{ApiTier, Operation};

pub const NO_CREDENTIALS_MESSAGE: &str = "no credentials configured";

/// Ordered free-then-paid credential fallback for one provider.
///
/// Tiers are tried strictly one after another; the paid tier is only
/// contacted once the free tier has produced a failure outcome.
#[derive(Debug, Clone, Default)]
pub struct TierSelector {
    free: Option<ApiCredential>,
    paid: Option<ApiCredential>,
}

impl TierSelector {
    /// Blank keys count as unset.
    pub fn new(free_key: Option<String>, paid_key: Option<String>) -> Self {
        Self {
            free: credential(ApiTier::Free, free_key),
            paid: credential(ApiTier::Paid, paid_key),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.free.is_some() || self.paid.is_some()
    }

    pub fn configured_tiers(&self) -> Vec<ApiTier> {
        self.credentials().map(|c| c.tier).collect()
    }

    fn credentials(&self) -> impl Iterator<Item = &ApiCredential> {
        self.free.iter().chain(self.paid.iter())
    }

    #[instrument(skip(self, attempt), fields(operation = %operation))]
    pub async fn invoke<T, F, Fut>(&self, operation: Operation, mut attempt: F) -> ProviderOutcome<T>
    where
        F: FnMut(ApiCredential) -> Fut,
        Fut: Future<Output = ProviderOutcome<T>>,
    {
        let mut last_error = None;

        for credential in self.credentials() {
            let tier = credential.tier;
            debug!(tier = %tier, "Attempting provider call");

            match attempt(credential.clone()).await {
                ProviderOutcome::Success(served) => {
                    debug!(tier = %tier, "Provider call served");
                    // attribution always follows the credential that was used
                    return ProviderOutcome::Success(Served { tier, ..served });
                }
                ProviderOutcome::Failure(message) => {
                    if tier == ApiTier::Free && self.paid.is_some() {
                        info!(error = %message, "Free tier failed, falling back to paid tier");
                    } else {
                        warn!(tier = %tier, error = %message, "Provider call failed");
                    }
                    last_error = Some(message);
                }
            }
        }

        ProviderOutcome::Failure(last_error.unwrap_or_else(|| NO_CREDENTIALS_MESSAGE.to_string()))
    }
}

fn credential(tier: ApiTier, key: Option<String>) -> Option<ApiCredential> {
    key.filter(|k| !k.trim().is_empty())
        .map(|k| ApiCredential::new(tier, k))
}
