//! Consecutive-day counting over the journal.

use chrono::NaiveDate;

use crate::journal::JournalStore;
use crate::models::DayEntry;

/// Number of unbroken calendar days, ending at and including `reference`,
/// on which `symptom` was recorded.
///
/// Walks backward one day at a time and stops at the first day without the
/// symptom, so the result never depends on how far back the store reaches.
/// Date-only arithmetic: month/year boundaries and DST shifts are irrelevant.
pub fn consecutive_days(store: &JournalStore, symptom: &str, reference: NaiveDate) -> u32 {
    let mut count = 0;
    let mut day = Some(reference);

    while let Some(current) = day {
        if !store.get(current).is_some_and(|e| e.has_symptom(symptom)) {
            break;
        }
        count += 1;
        day = current.pred_opt();
    }

    count
}

/// Shared activation check for advice and red-flag rules.
///
/// The entry must carry the symptom itself; the optional threshold is
/// checked against the store, which must already contain `entry`.
pub fn rule_fires(
    entry: &DayEntry,
    store: &JournalStore,
    symptom: &str,
    days_gte: Option<u32>,
) -> bool {
    if !entry.has_symptom(symptom) {
        return false;
    }
    match days_gte {
        Some(min) => consecutive_days(store, symptom, entry.date) >= min,
        None => true,
    }
}
