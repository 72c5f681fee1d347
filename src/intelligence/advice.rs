use crate::journal::JournalStore;
use crate::models::DayEntry;

use super::streak::rule_fires;
use super::types::{AdviceResult, AdviceRule};

/// Evaluate `rules` against one entry.
///
/// Activated rules come back sorted by priority, highest first. The sort is
/// stable, so equal priorities keep table order. `store` must already
/// contain `entry`.
pub fn evaluate(entry: &DayEntry, store: &JournalStore, rules: &[AdviceRule]) -> Vec<AdviceResult> {
    let mut results: Vec<AdviceResult> = rules
        .iter()
        .filter(|rule| rule_fires(entry, store, &rule.trigger_symptom, rule.trigger_days_gte))
        .map(AdviceResult::from)
        .collect();

    results.sort_by(|a, b| b.priority.cmp(&a.priority));

    tracing::debug!(date = %entry.date, count = results.len(), "Advice evaluated");
    results
}
