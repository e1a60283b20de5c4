use std::sync::Arc;

use super::cost_calculator::CostCalculator;
use super::service_error::ServiceError;
use super::usage_aggregator::{UsageAggregator, UsageSummary};
use crate::application::ports::UsageRepository;
use crate::domain::{UsageEvent, UserId};

pub struct UsageService {
    repository: Arc<dyn UsageRepository>,
    aggregator: UsageAggregator,
}

impl UsageService {
    pub fn new(repository: Arc<dyn UsageRepository>, calculator: Arc<CostCalculator>) -> Self {
        Self {
            repository,
            aggregator: UsageAggregator::new(calculator),
        }
    }

    pub fn calculator(&self) -> &CostCalculator {
        self.aggregator.calculator()
    }

    pub async fn list(
        &self,
        user_id: UserId,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<UsageEvent>, ServiceError> {
        Ok(self
            .repository
            .list(user_id, skip.max(0), limit.max(0))
            .await?)
    }

    pub async fn summary(&self, user_id: UserId) -> Result<UsageSummary, ServiceError> {
        let events = self.repository.all_for_user(user_id).await?;
        Ok(self.aggregator.summarize(&events))
    }
}
