mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, ENV_PREFIX, ENV_SEPARATOR, GeminiSettings, LoggingSettings,
    PricingSettings, ServerSettings, Settings, SettingsError, TierKeys, UploadSettings,
    WhisperSettings,
};
