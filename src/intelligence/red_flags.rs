use crate::journal::JournalStore;
use crate::models::DayEntry;

use super::streak::rule_fires;
use super::types::{RedFlagHit, RedFlagRule};

/// Evaluate the red-flag table against one entry.
///
/// Hits are returned in table order, unsorted: the list is meant to be read
/// in full. `store` must already contain `entry`.
pub fn evaluate(entry: &DayEntry, store: &JournalStore, rules: &[RedFlagRule]) -> Vec<RedFlagHit> {
    rules
        .iter()
        .filter(|rule| rule_fires(entry, store, &rule.symptom, rule.days_gte))
        .map(|rule| {
            tracing::warn!(
                symptom = %rule.symptom,
                action = rule.action.as_str(),
                "Red flag rule fired"
            );
            RedFlagHit {
                rule: rule.clone(),
                date: entry.date,
            }
        })
        .collect()
}
