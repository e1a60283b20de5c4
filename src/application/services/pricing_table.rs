use std::collections::HashMap;

pub const WHISPER_MODEL: &str = "whisper-1";
pub const GEMINI_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const GEMINI_IMAGE_MODEL: &str = "gemini-3-pro-image-preview";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioRate {
    pub usd_per_minute: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenRate {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageRate {
    pub tokens: TokenRate,
    /// Per-image price shared by `1k` and `2k` output.
    pub per_image_standard: f64,
    pub per_image_4k: f64,
}

/// Rates for one kind of model, with a baseline used for unknown model names.
#[derive(Debug, Clone)]
pub struct ModelRates<R> {
    baseline_model: String,
    baseline: R,
    rates: HashMap<String, R>,
}

impl<R: Copy> ModelRates<R> {
    pub fn new(baseline_model: impl Into<String>, baseline: R) -> Self {
        let baseline_model = baseline_model.into();
        let mut rates = HashMap::new();
        rates.insert(baseline_model.clone(), baseline);
        Self {
            baseline_model,
            baseline,
            rates,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>, rate: R) -> Self {
        self.rates.insert(model.into(), rate);
        self
    }

    pub fn baseline_model(&self) -> &str {
        &self.baseline_model
    }

    pub fn is_known(&self, model: &str) -> bool {
        self.rates.contains_key(model)
    }

    /// Rate for `model`, falling back to the baseline model's rate.
    pub fn lookup(&self, model: &str) -> R {
        self.rates.get(model).copied().unwrap_or(self.baseline)
    }
}

/// Static (provider, model) price table. Read-only once built.
#[derive(Debug, Clone)]
pub struct PricingTable {
    pub audio: ModelRates<AudioRate>,
    pub text: ModelRates<TokenRate>,
    pub image: ModelRates<ImageRate>,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            audio: ModelRates::new(
                WHISPER_MODEL,
                AudioRate {
                    usd_per_minute: 0.006,
                },
            ),
            text: ModelRates::new(
                GEMINI_TEXT_MODEL,
                TokenRate {
                    input_per_million: 0.10,
                    output_per_million: 0.40,
                },
            )
            .with_model(
                "gemini-2.5-flash",
                TokenRate {
                    input_per_million: 0.30,
                    output_per_million: 2.50,
                },
            ),
            image: ModelRates::new(
                GEMINI_IMAGE_MODEL,
                ImageRate {
                    tokens: TokenRate {
                        input_per_million: 2.00,
                        output_per_million: 12.00,
                    },
                    per_image_standard: 0.134,
                    per_image_4k: 0.24,
                },
            ),
        }
    }
}
