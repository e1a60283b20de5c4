use crate::domain::InlineImage;

/// Raw generate-content response as returned by a generation provider,
/// before normalization. Binary fields are already base64-decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentResponse {
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
    pub usage: Option<UsageMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub parts: Vec<ContentPart>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentPart {
    pub text: Option<String>,
    pub inline_data: Option<InlineImage>,
    pub thought_signature: Option<Vec<u8>>,
    pub thought: bool,
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn image(image: InlineImage, thought_signature: Option<Vec<u8>>) -> Self {
        Self {
            inline_data: Some(image),
            thought_signature,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UsageMetadata {
    pub prompt_token_count: Option<i64>,
    pub candidates_token_count: Option<i64>,
}
