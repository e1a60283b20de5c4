//! Converts raw provider responses into [`ProviderOutcome`]s.
//!
//! Every provider quirk ends here: transport errors, safety blocks, empty
//! candidates and missing usage counters all become either a served payload
//! or a single failure message. Nothing in this module panics on malformed
//! input.

use super::provider_outcome::{GeneratedImage, ProviderOutcome, Transcript};
use crate::application::ports::{Candidate, ContentResponse, ProviderError, RawTranscript};
use crate::domain::{ApiTier, InlineImage, TokenUsage};

pub const SAFETY_BLOCKED_PREFIX: &str = "blocked by safety filters";
pub const NO_IMAGE_MESSAGE: &str = "no image in response";
pub const EMPTY_RESPONSE_MESSAGE: &str = "empty response from provider";
pub const EMPTY_TRANSCRIPT_MESSAGE: &str = "empty transcription";

const SAFETY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "IMAGE_SAFETY",
];

pub fn normalize_text(
    result: Result<ContentResponse, ProviderError>,
    tier: ApiTier,
) -> ProviderOutcome<String> {
    let response = match result {
        Ok(response) => response,
        Err(e) => return transport_failure(e),
    };

    if let Some(reason) = safety_block(&response) {
        return ProviderOutcome::failure(format!("{SAFETY_BLOCKED_PREFIX}: {reason}"));
    }

    let text = response
        .candidates
        .first()
        .map(candidate_text)
        .unwrap_or_default();
    let text = text.trim();

    if text.is_empty() {
        return ProviderOutcome::failure(EMPTY_RESPONSE_MESSAGE);
    }

    ProviderOutcome::success(text.to_string(), usage_of(&response, 0), tier)
}

pub fn normalize_image(
    result: Result<ContentResponse, ProviderError>,
    tier: ApiTier,
) -> ProviderOutcome<GeneratedImage> {
    let response = match result {
        Ok(response) => response,
        Err(e) => return transport_failure(e),
    };

    let mut image: Option<InlineImage> = None;
    let mut text: Option<String> = None;
    let mut continuation_token: Option<Vec<u8>> = None;
    let mut images_generated = 0;

    let parts = response
        .candidates
        .first()
        .map(|c| c.parts.as_slice())
        .unwrap_or_default();

    for part in parts.iter().filter(|p| !p.thought) {
        if let Some(data) = part.inline_data.as_ref().filter(|d| !d.is_empty()) {
            images_generated += 1;
            image = Some(data.clone());
            // the image's own signature wins over one seen on a text part
            if part.thought_signature.is_some() {
                continuation_token = part.thought_signature.clone();
            }
        } else if let Some(t) = part.text.as_deref().filter(|t| !t.trim().is_empty()) {
            text = Some(t.to_string());
            if continuation_token.is_none() {
                continuation_token = part.thought_signature.clone();
            }
        }
    }

    let Some(image) = image else {
        if let Some(reason) = safety_block(&response) {
            return ProviderOutcome::failure(format!("{SAFETY_BLOCKED_PREFIX}: {reason}"));
        }
        return ProviderOutcome::failure(NO_IMAGE_MESSAGE);
    };

    ProviderOutcome::success(
        GeneratedImage {
            image,
            text,
            continuation_token,
        },
        usage_of(&response, images_generated),
        tier,
    )
}

pub fn normalize_transcript(
    result: Result<RawTranscript, ProviderError>,
    tier: ApiTier,
) -> ProviderOutcome<Transcript> {
    let raw = match result {
        Ok(raw) => raw,
        Err(e) => return transport_failure(e),
    };

    let text = raw.text.trim();
    if text.is_empty() {
        return ProviderOutcome::failure(EMPTY_TRANSCRIPT_MESSAGE);
    }

    let duration_seconds = raw
        .duration_seconds
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(0.0);

    ProviderOutcome::success(
        Transcript {
            text: text.to_string(),
            duration_seconds,
        },
        TokenUsage::default(),
        tier,
    )
}

fn transport_failure<T>(error: ProviderError) -> ProviderOutcome<T> {
    ProviderOutcome::failure(error.to_string())
}

fn candidate_text(candidate: &Candidate) -> String {
    candidate
        .parts
        .iter()
        .filter(|p| !p.thought)
        .filter_map(|p| p.text.as_deref())
        .collect::<Vec<_>>()
        .join("")
}

fn safety_block(response: &ContentResponse) -> Option<String> {
    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        return Some(reason);
    }

    let candidate = response.candidates.first()?;
    let reason = candidate.finish_reason.as_deref()?;
    let has_text = !candidate_text(candidate).trim().is_empty();

    (SAFETY_FINISH_REASONS.contains(&reason) && !has_text).then(|| reason.to_string())
}

fn usage_of(response: &ContentResponse, images_generated: i32) -> TokenUsage {
    let usage = response.usage.unwrap_or_default();
    TokenUsage {
        input_tokens: usage.prompt_token_count.unwrap_or(0).max(0),
        output_tokens: usage.candidates_token_count.unwrap_or(0).max(0),
        images_generated,
    }
}
