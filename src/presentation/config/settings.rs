use std::path::PathBuf;

use config::{Config, File};
use serde::Deserialize;

use super::Environment;
use crate::application::services::{
    DEFAULT_DISPLAY_CURRENCY, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_USD_EXCHANGE_RATE,
    GEMINI_IMAGE_MODEL, GEMINI_TEXT_MODEL, WHISPER_MODEL,
};
use crate::infrastructure::audio::DEFAULT_OPENAI_BASE_URL;
use crate::infrastructure::llm::DEFAULT_GEMINI_BASE_URL;

pub const ENV_PREFIX: &str = "DIKTAT";
pub const ENV_SEPARATOR: &str = "__";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("invalid setting {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub whisper: WhisperSettings,
    pub gemini: GeminiSettings,
    pub pricing: PricingSettings,
    pub uploads: UploadSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// An empty `url` selects the in-memory store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            run_migrations: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WhisperSettings {
    pub model: String,
    pub language: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_key_free: Option<String>,
    pub api_key_paid: Option<String>,
}

impl Default for WhisperSettings {
    fn default() -> Self {
        Self {
            model: WHISPER_MODEL.to_string(),
            language: "da".to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            api_key: None,
            api_key_free: None,
            api_key_paid: None,
        }
    }
}

impl WhisperSettings {
    /// A shared OpenAI key is a billed key: it fills only the paid tier.
    pub fn tier_keys(&self) -> TierKeys {
        TierKeys {
            free: non_blank(&self.api_key_free),
            paid: non_blank(&self.api_key_paid).or_else(|| non_blank(&self.api_key)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub api_key: Option<String>,
    pub api_key_free: Option<String>,
    pub api_key_paid: Option<String>,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            text_model: GEMINI_TEXT_MODEL.to_string(),
            image_model: GEMINI_IMAGE_MODEL.to_string(),
            api_key: None,
            api_key_free: None,
            api_key_paid: None,
        }
    }
}

impl GeminiSettings {
    pub fn tier_keys(&self) -> TierKeys {
        TierKeys::resolve(&self.api_key, &self.api_key_free, &self.api_key_paid)
    }
}

/// Per-tier keys after the shared key has filled the tiers it may fill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierKeys {
    pub free: Option<String>,
    pub paid: Option<String>,
}

impl TierKeys {
    fn resolve(shared: &Option<String>, free: &Option<String>, paid: &Option<String>) -> Self {
        let shared = non_blank(shared);
        Self {
            free: non_blank(free).or_else(|| shared.clone()),
            paid: non_blank(paid).or(shared),
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    pub display_currency: String,
    pub usd_exchange_rate: f64,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            display_currency: DEFAULT_DISPLAY_CURRENCY.to_string(),
            usd_exchange_rate: DEFAULT_USD_EXCHANGE_RATE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UploadSettings {
    pub audio_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            audio_dir: PathBuf::from("data/audio"),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: Option<String>,
    pub enable_json: bool,
}

impl Settings {
    /// Layers `appsettings.{environment}.toml` and `DIKTAT__*` variables over
    /// the built-in defaults. A `.env` file is loaded first when present.
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        let configuration = Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = configuration.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let rate = self.pricing.usd_exchange_rate;
        if !rate.is_finite() || rate <= 0.0 {
            return Err(SettingsError::Invalid {
                field: "pricing.usd_exchange_rate",
                message: format!("must be a positive number, got {}", rate),
            });
        }
        if self.pricing.display_currency.trim().is_empty() {
            return Err(SettingsError::Invalid {
                field: "pricing.display_currency",
                message: "must not be empty".to_string(),
            });
        }
        if self.uploads.max_upload_bytes == 0 {
            return Err(SettingsError::Invalid {
                field: "uploads.max_upload_bytes",
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
