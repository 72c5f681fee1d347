//! Day-entry journal: the in-memory store, its queries, and the submission
//! protocol that merges an entry and runs the rule engine against it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::intelligence::{advice, red_flags, vitals, AdviceResult, RedFlagHit, RuleTables, VitalAlert};
use crate::models::{DayEntry, VitalKind};

/// Shown under every advice list.
pub const DISCLAIMER: &str = "本工具非醫療診斷，急重症請就醫。";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum JournalError {
    #[error("Entry needs at least one symptom, need, or note")]
    EmptyEntry,

    #[error("Invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
}

// ═══════════════════════════════════════════
// JournalStore
// ═══════════════════════════════════════════

/// Day-entries keyed by date. At most one entry per date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<DayEntry>", into = "Vec<DayEntry>")]
pub struct JournalStore {
    entries: BTreeMap<NaiveDate, DayEntry>,
}

impl From<Vec<DayEntry>> for JournalStore {
    /// Later entries for the same date replace earlier ones.
    fn from(entries: Vec<DayEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            store.upsert(entry);
        }
        store
    }
}

impl From<JournalStore> for Vec<DayEntry> {
    fn from(store: JournalStore) -> Self {
        store.entries.into_values().collect()
    }
}

impl JournalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&DayEntry> {
        self.entries.get(&date)
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &DayEntry> {
        self.entries.values()
    }

    /// Insert or replace the entry for its date. Returns the replaced entry.
    pub fn upsert(&mut self, entry: DayEntry) -> Option<DayEntry> {
        self.entries.insert(entry.date, entry)
    }

    /// Store-wide wipe; entries are never removed individually.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The last `n` entries by date, newest first.
    pub fn recent(&self, n: usize) -> Vec<&DayEntry> {
        self.entries.values().rev().take(n).collect()
    }

    /// Dates in the given month that have an entry. Empty for an invalid month.
    pub fn marked_days(&self, year: i32, month: u32) -> Vec<NaiveDate> {
        let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
            return Vec::new();
        };
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };

        match next {
            Some(next) => self.entries.range(first..next).map(|(d, _)| *d).collect(),
            None => self.entries.range(first..).map(|(d, _)| *d).collect(),
        }
    }

    /// Values of one vital across the last `window` entries, oldest first.
    /// Entries without the value are skipped.
    pub fn vital_series(&self, kind: VitalKind, window: usize) -> Vec<f64> {
        let skip = self.entries.len().saturating_sub(window);
        self.entries
            .values()
            .skip(skip)
            .filter_map(|e| e.vitals.get(kind))
            .collect()
    }

    /// Most recent value of one vital within the trend window.
    pub fn latest_vital(&self, kind: VitalKind) -> Option<f64> {
        self.vital_series(kind, config::TREND_WINDOW).last().copied()
    }
}

// ═══════════════════════════════════════════
// Submission
// ═══════════════════════════════════════════

/// Everything the presentation layer needs after a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub date: NaiveDate,
    /// Whether an existing entry for the same date was replaced.
    pub replaced: bool,
    pub advice: Vec<AdviceResult>,
    pub red_flags: Vec<RedFlagHit>,
    pub vital_alerts: Vec<VitalAlert>,
    pub needs_reminder: Option<String>,
}

/// Validate, merge, then evaluate.
///
/// The merge happens before evaluation so that today's entry counts toward
/// its own streaks. On `EmptyEntry` the store is untouched.
pub fn submit(
    store: &mut JournalStore,
    entry: DayEntry,
    tables: &RuleTables,
) -> Result<Submission, JournalError> {
    if !entry.carries_signal() {
        tracing::debug!(date = %entry.date, "Rejected entry without symptoms, needs, or note");
        return Err(JournalError::EmptyEntry);
    }

    let replaced = store.upsert(entry.clone()).is_some();
    let store: &JournalStore = store;

    let submission = Submission {
        date: entry.date,
        replaced,
        advice: advice::evaluate(&entry, store, &tables.advice),
        red_flags: red_flags::evaluate(&entry, store, &tables.red_flags),
        vital_alerts: vitals::check(&entry.vitals),
        needs_reminder: needs_reminder(&entry),
    };

    tracing::info!(
        date = %submission.date,
        replaced,
        advice = submission.advice.len(),
        red_flags = submission.red_flags.len(),
        vital_alerts = submission.vital_alerts.len(),
        "Journal entry submitted"
    );
    Ok(submission)
}

/// Reminder listing the needs marked today, if any.
pub fn needs_reminder(entry: &DayEntry) -> Option<String> {
    if entry.needs.is_empty() {
        return None;
    }
    let needs: Vec<&str> = entry.needs.iter().map(String::as_str).collect();
    Some(format!("你今天標記的需求：{}（完成 1〜2 項即可）", needs.join("、")))
}

// ═══════════════════════════════════════════
// Test support
// ═══════════════════════════════════════════

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn entry_on(date: &str, symptoms: &[&str]) -> DayEntry {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("valid test date");
        let mut entry = DayEntry::new(date, date.and_hms_opt(8, 0, 0).expect("valid time"));
        entry.symptoms = symptoms.iter().map(|s| s.to_string()).collect();
        entry
    }

    pub fn store_with(entries: Vec<DayEntry>) -> JournalStore {
        JournalStore::from(entries)
    }
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
