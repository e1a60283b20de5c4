use chrono::{DateTime, Utc};

use super::{StyleGuideId, UserId};

#[derive(Debug, Clone)]
pub struct StyleGuide {
    pub id: StyleGuideId,
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub examples: Option<String>,
    pub guide_content: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StyleGuide {
    pub fn new(
        user_id: UserId,
        name: String,
        description: Option<String>,
        examples: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: StyleGuideId::new(),
            user_id,
            name,
            description,
            examples,
            guide_content: None,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Generated or hand-written guide text, if it has any content.
    pub fn usable_content(&self) -> Option<&str> {
        self.guide_content
            .as_deref()
            .map(str::trim)
            .filter(|content| !content.is_empty())
    }
}
