use std::collections::BTreeMap;
use std::sync::Arc;

use super::cost_calculator::CostCalculator;
use crate::domain::{Operation, UsageEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct CostGroup<K> {
    pub key: K,
    pub count: usize,
    pub total_cost_usd: f64,
    pub total_cost_display: f64,
}

/// Totals over a user's usage events, in USD and the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub total_cost_usd: f64,
    pub total_cost_display: f64,
    pub display_currency: String,
    pub exchange_rate: f64,
    pub total_requests: usize,
    /// Ordered by operation name.
    pub by_operation: Vec<CostGroup<Operation>>,
    /// Keyed `YYYY-MM`, newest month first.
    pub by_month: Vec<CostGroup<String>>,
}

pub struct UsageAggregator {
    calculator: Arc<CostCalculator>,
}

impl UsageAggregator {
    pub fn new(calculator: Arc<CostCalculator>) -> Self {
        Self { calculator }
    }

    pub fn calculator(&self) -> &CostCalculator {
        &self.calculator
    }

    /// Sums stored event costs; events are never re-priced. The result does
    /// not depend on the order of `events`.
    pub fn summarize(&self, events: &[UsageEvent]) -> UsageSummary {
        let mut ordered: Vec<&UsageEvent> = events.iter().collect();
        ordered.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.as_uuid().cmp(&b.id.as_uuid()))
        });

        let mut by_operation: BTreeMap<&'static str, (Operation, usize, f64)> = BTreeMap::new();
        let mut by_month: BTreeMap<String, (usize, f64)> = BTreeMap::new();
        let mut total_cost_usd = 0.0;

        for event in &ordered {
            total_cost_usd += event.cost_usd;

            let op = by_operation
                .entry(event.operation.as_str())
                .or_insert((event.operation, 0, 0.0));
            op.1 += 1;
            op.2 += event.cost_usd;

            let month = by_month
                .entry(event.created_at.format("%Y-%m").to_string())
                .or_insert((0, 0.0));
            month.0 += 1;
            month.1 += event.cost_usd;
        }

        let by_operation = by_operation
            .into_values()
            .map(|(operation, count, cost)| self.group(operation, count, cost))
            .collect();
        let by_month = by_month
            .into_iter()
            .rev()
            .map(|(month, (count, cost))| self.group(month, count, cost))
            .collect();

        UsageSummary {
            total_cost_usd,
            total_cost_display: self.calculator.to_display_currency(total_cost_usd),
            display_currency: self.calculator.display_currency().to_string(),
            exchange_rate: self.calculator.exchange_rate(),
            total_requests: ordered.len(),
            by_operation,
            by_month,
        }
    }

    fn group<K>(&self, key: K, count: usize, cost: f64) -> CostGroup<K> {
        CostGroup {
            key,
            count,
            total_cost_usd: cost,
            total_cost_display: self.calculator.to_display_currency(cost),
        }
    }
}
