use crate::domain::{ApiTier, InlineImage, TokenUsage};

/// Payload of a served provider call together with what it cost to serve.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub payload: T,
    pub usage: TokenUsage,
    pub tier: ApiTier,
}

/// Normalized result of one provider call.
///
/// A failure never carries usage; only served calls are billed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome<T> {
    Success(Served<T>),
    Failure(String),
}

impl<T> ProviderOutcome<T> {
    pub fn success(payload: T, usage: TokenUsage, tier: ApiTier) -> Self {
        ProviderOutcome::Success(Served {
            payload,
            usage,
            tier,
        })
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ProviderOutcome::Failure(message.into())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }

    pub fn tier(&self) -> ApiTier {
        match self {
            ProviderOutcome::Success(served) => served.tier,
            ProviderOutcome::Failure(_) => ApiTier::None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ProviderOutcome::Success(_) => None,
            ProviderOutcome::Failure(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<Served<T>, String> {
        match self {
            ProviderOutcome::Success(served) => Ok(served),
            ProviderOutcome::Failure(message) => Err(message),
        }
    }
}

/// Image extracted from a generate-content response.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedImage {
    pub image: InlineImage,
    pub text: Option<String>,
    pub continuation_token: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub duration_seconds: f64,
}
