use std::fmt;

use super::{TranscriptionId, UserId};

/// Object key of a stored audio upload: `{user_id}/{transcription_id}{suffix}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn for_audio(user_id: &UserId, transcription_id: &TranscriptionId, suffix: &str) -> Self {
        Self(format!(
            "{}/{}{}",
            user_id.as_uuid(),
            transcription_id.as_uuid(),
            suffix
        ))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File suffix including the dot, e.g. `.m4a`.
    pub fn suffix(&self) -> Option<&str> {
        let file_name = self.0.rsplit('/').next()?;
        file_name.rfind('.').map(|idx| &file_name[idx..])
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
