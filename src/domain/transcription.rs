use chrono::{DateTime, Utc};

use super::{StoragePath, TranscriptionId, UserId};

#[derive(Debug, Clone)]
pub struct Transcription {
    pub id: TranscriptionId,
    pub user_id: UserId,
    pub filename: Option<String>,
    pub duration_seconds: f64,
    pub raw_text: String,
    pub instruction: Option<String>,
    pub processed_text: Option<String>,
    pub audio_path: Option<StoragePath>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transcription {
    pub fn new(
        user_id: UserId,
        filename: Option<String>,
        duration_seconds: f64,
        raw_text: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: TranscriptionId::new(),
            user_id,
            filename,
            duration_seconds: duration_seconds.max(0.0),
            raw_text,
            instruction: None,
            processed_text: None,
            audio_path: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Duration as `M:SS`.
    pub fn duration_formatted(&self) -> String {
        let total = self.duration_seconds.max(0.0) as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}
