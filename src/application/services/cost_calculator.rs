use crate::domain::{ImageResolution, UsageQuantities};

use super::pricing_table::{PricingTable, TokenRate};

pub const DEFAULT_DISPLAY_CURRENCY: &str = "DKK";
pub const DEFAULT_USD_EXCHANGE_RATE: f64 = 7.0;

#[derive(Debug, thiserror::Error)]
pub enum CostCalculatorError {
    #[error("exchange rate must be a positive finite number, got {0}")]
    InvalidExchangeRate(f64),
}

/// Currency costs are shown in, with its fixed rate per USD.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayCurrency {
    code: String,
    usd_rate: f64,
}

impl DisplayCurrency {
    pub fn new(code: impl Into<String>, usd_rate: f64) -> Result<Self, CostCalculatorError> {
        if !usd_rate.is_finite() || usd_rate <= 0.0 {
            return Err(CostCalculatorError::InvalidExchangeRate(usd_rate));
        }
        Ok(Self {
            code: code.into(),
            usd_rate,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn usd_rate(&self) -> f64 {
        self.usd_rate
    }
}

impl Default for DisplayCurrency {
    fn default() -> Self {
        Self {
            code: DEFAULT_DISPLAY_CURRENCY.to_string(),
            usd_rate: DEFAULT_USD_EXCHANGE_RATE,
        }
    }
}

/// Pure pricing of usage quantities in USD.
///
/// Negative or non-finite quantities are clamped to zero and unknown model
/// names are priced as the baseline model of their kind, so pricing never
/// fails.
#[derive(Debug, Clone, Default)]
pub struct CostCalculator {
    pricing: PricingTable,
    currency: DisplayCurrency,
}

impl CostCalculator {
    pub fn new(pricing: PricingTable, currency: DisplayCurrency) -> Self {
        Self { pricing, currency }
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    pub fn whisper_cost(&self, duration_seconds: f64, model: &str) -> f64 {
        let rate = self.pricing.audio.lookup(model);
        clamp_seconds(duration_seconds) / 60.0 * rate.usd_per_minute
    }

    pub fn text_generation_cost(&self, input_tokens: i64, output_tokens: i64, model: &str) -> f64 {
        token_cost(self.pricing.text.lookup(model), input_tokens, output_tokens)
    }

    pub fn image_generation_cost(
        &self,
        input_tokens: i64,
        output_tokens: i64,
        images_generated: i32,
        resolution: ImageResolution,
        model: &str,
    ) -> f64 {
        let rate = self.pricing.image.lookup(model);
        let per_image = match resolution {
            ImageResolution::OneK | ImageResolution::TwoK => rate.per_image_standard,
            ImageResolution::FourK => rate.per_image_4k,
        };
        token_cost(rate.tokens, input_tokens, output_tokens)
            + f64::from(images_generated.max(0)) * per_image
    }

    /// Prices a usage record for the given model.
    pub fn price(&self, model: &str, quantities: &UsageQuantities) -> f64 {
        match *quantities {
            UsageQuantities::Audio { seconds } => self.whisper_cost(seconds, model),
            UsageQuantities::Tokens {
                input_tokens,
                output_tokens,
            } => self.text_generation_cost(input_tokens, output_tokens, model),
            UsageQuantities::Image {
                input_tokens,
                output_tokens,
                images_generated,
                resolution,
            } => self.image_generation_cost(
                input_tokens,
                output_tokens,
                images_generated,
                resolution,
                model,
            ),
        }
    }

    pub fn to_display_currency(&self, usd: f64) -> f64 {
        usd * self.currency.usd_rate()
    }

    pub fn exchange_rate(&self) -> f64 {
        self.currency.usd_rate()
    }

    pub fn display_currency(&self) -> &str {
        self.currency.code()
    }
}

fn clamp_seconds(seconds: f64) -> f64 {
    if seconds.is_finite() { seconds.max(0.0) } else { 0.0 }
}

fn token_cost(rate: TokenRate, input_tokens: i64, output_tokens: i64) -> f64 {
    let input = input_tokens.max(0) as f64;
    let output = output_tokens.max(0) as f64;
    input / 1_000_000.0 * rate.input_per_million + output / 1_000_000.0 * rate.output_per_million
}
