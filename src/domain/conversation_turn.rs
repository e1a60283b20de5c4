use super::{InlineImage, TurnRole};

/// One message of an image-editing dialogue, rebuilt for every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub text: Option<String>,
    pub image: Option<InlineImage>,
    /// Opaque provider token; must be replayed verbatim with a model-authored image.
    pub continuation_token: Option<Vec<u8>>,
}

impl ConversationTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: Some(text.into()),
            image: None,
            continuation_token: None,
        }
    }

    pub fn model_image(image: InlineImage, continuation_token: Option<Vec<u8>>) -> Self {
        Self {
            role: TurnRole::Model,
            text: None,
            image: Some(image),
            continuation_token,
        }
    }
}
