use std::fmt;

use crate::domain::ApiTier;

/// API key bound to the tier it bills against.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential {
    pub tier: ApiTier,
    pub api_key: String,
}

impl ApiCredential {
    pub fn new(tier: ApiTier, api_key: impl Into<String>) -> Self {
        Self {
            tier,
            api_key: api_key.into(),
        }
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("tier", &self.tier)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
