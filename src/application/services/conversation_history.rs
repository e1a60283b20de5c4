use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::ports::{ImageGenerationRepository, RepositoryError};
use crate::domain::{ConversationTurn, ImageGenerationId, ImageGenerationRecord, UserId};

/// Upper bound on parent hops walked from a leaf turn.
pub const MAX_HISTORY_HOPS: usize = 64;

/// Rebuilds the provider-facing dialogue for an image conversation by
/// walking parent pointers from a leaf turn back to its root.
///
/// A parent that is missing, owned by someone else, or already visited ends
/// the walk; the turns collected so far are still returned.
pub struct ConversationHistory {
    repository: Arc<dyn ImageGenerationRepository>,
    max_hops: usize,
}

impl ConversationHistory {
    pub fn new(repository: Arc<dyn ImageGenerationRepository>) -> Self {
        Self {
            repository,
            max_hops: MAX_HISTORY_HOPS,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    #[instrument(skip(self), fields(leaf = %leaf, owner = %owner))]
    pub async fn reconstruct(
        &self,
        leaf: ImageGenerationId,
        owner: UserId,
    ) -> Result<Vec<ConversationTurn>, RepositoryError> {
        let chain = self.walk(leaf, owner).await?;
        debug!(records = chain.len(), "Conversation chain loaded");
        Ok(linearize(&chain))
    }

    /// Records from root to leaf.
    async fn walk(
        &self,
        leaf: ImageGenerationId,
        owner: UserId,
    ) -> Result<Vec<ImageGenerationRecord>, RepositoryError> {
        let mut chain = Vec::new();
        let mut visited = HashSet::new();
        let mut next = Some(leaf);

        while let Some(id) = next {
            if chain.len() >= self.max_hops {
                warn!(max_hops = self.max_hops, "Conversation chain truncated at hop limit");
                break;
            }
            if !visited.insert(id) {
                warn!(record = %id, "Cycle in conversation chain, truncating");
                break;
            }
            match self.repository.get(id, owner).await? {
                Some(record) => {
                    next = record.parent_id;
                    chain.push(record);
                }
                None => {
                    if !chain.is_empty() {
                        warn!(record = %id, "Parent turn missing or not owned, truncating");
                    }
                    break;
                }
            }
        }

        chain.reverse();
        Ok(chain)
    }
}

/// Flattens root-first records into alternating turns: the user prompt of
/// each record, followed by the model image when one was stored.
pub fn linearize(chain: &[ImageGenerationRecord]) -> Vec<ConversationTurn> {
    let mut turns = Vec::with_capacity(chain.len() * 2);
    for record in chain {
        turns.push(ConversationTurn::user(record.prompt.clone()));
        if let Some(image) = record.image.as_ref().filter(|i| !i.is_empty()) {
            turns.push(ConversationTurn::model_image(
                image.clone(),
                record.continuation_token.clone(),
            ));
        }
    }
    turns
}
