use std::fmt;

/// Output size class for generated images.
///
/// `1k` and `2k` share a per-image price; `4k` is billed at a higher rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageResolution {
    OneK,
    #[default]
    TwoK,
    FourK,
}

impl ImageResolution {
    /// Lenient parse used for request input: unknown values fall back to `2k`.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "1k" => ImageResolution::OneK,
            "2k" => ImageResolution::TwoK,
            "4k" => ImageResolution::FourK,
            _ => ImageResolution::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResolution::OneK => "1k",
            ImageResolution::TwoK => "2k",
            ImageResolution::FourK => "4k",
        }
    }

    /// Size label expected by the image provider.
    pub fn provider_size(&self) -> &'static str {
        match self {
            ImageResolution::OneK => "1K",
            ImageResolution::TwoK => "2K",
            ImageResolution::FourK => "4K",
        }
    }
}

impl fmt::Display for ImageResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
