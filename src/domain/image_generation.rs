use chrono::{DateTime, Utc};

use super::{ImageGenerationId, InlineImage, TranscriptionId, UserId};

/// One persisted turn of an image conversation.
///
/// Turns form a singly-linked list through `parent_id`, rooted at
/// `turn_number == 1`.
#[derive(Debug, Clone)]
pub struct ImageGenerationRecord {
    pub id: ImageGenerationId,
    pub user_id: UserId,
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub continuation_token: Option<Vec<u8>>,
    pub text_response: Option<String>,
    pub turn_number: i32,
    pub parent_id: Option<ImageGenerationId>,
    pub transcription_id: Option<TranscriptionId>,
    pub created_at: DateTime<Utc>,
}

impl ImageGenerationRecord {
    pub fn new(user_id: UserId, prompt: String, parent: Option<&ImageGenerationRecord>) -> Self {
        Self {
            id: ImageGenerationId::new(),
            user_id,
            prompt,
            image: None,
            continuation_token: None,
            text_response: None,
            turn_number: parent.map(|p| p.turn_number + 1).unwrap_or(1),
            parent_id: parent.map(|p| p.id),
            transcription_id: None,
            created_at: Utc::now(),
        }
    }
}
