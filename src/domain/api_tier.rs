use std::fmt;
use std::str::FromStr;

/// Credential bucket that served a provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiTier {
    Free,
    Paid,
    None,
}

impl ApiTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiTier::Free => "free",
            ApiTier::Paid => "paid",
            ApiTier::None => "none",
        }
    }
}

impl FromStr for ApiTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(ApiTier::Free),
            "paid" => Ok(ApiTier::Paid),
            "none" => Ok(ApiTier::None),
            _ => Err(format!("Invalid api tier: {}", s)),
        }
    }
}

impl fmt::Display for ApiTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
