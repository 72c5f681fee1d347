use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::enums::VitalKind;
use crate::journal::JournalError;
use crate::vocabulary::normalize_term;

/// Optional numeric vitals. Each field is a finite number or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub bp_sys: Option<f64>,
    pub bp_dia: Option<f64>,
    pub heart_rate: Option<f64>,
    pub weight: Option<f64>,
    pub steps: Option<f64>,
}

impl Vitals {
    pub fn get(&self, kind: VitalKind) -> Option<f64> {
        match kind {
            VitalKind::Systolic => self.bp_sys,
            VitalKind::Diastolic => self.bp_dia,
            VitalKind::HeartRate => self.heart_rate,
            VitalKind::Weight => self.weight,
            VitalKind::Steps => self.steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        VitalKind::ALL.iter().all(|k| self.get(*k).is_none())
    }
}

/// One journal record. The date is the natural key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayEntry {
    pub date: NaiveDate,
    pub symptoms: BTreeSet<String>,
    pub needs: BTreeSet<String>,
    pub mood: u8,
    pub note: String,
    /// Locally stored image references (data URLs or file names), in upload order.
    pub photos: Vec<String>,
    #[serde(flatten)]
    pub vitals: Vitals,
    pub created_at: NaiveDateTime,
}

impl DayEntry {
    pub const DEFAULT_MOOD: u8 = 2;

    /// Empty entry for `date`; fill in the public fields afterwards.
    pub fn new(date: NaiveDate, created_at: NaiveDateTime) -> Self {
        Self {
            date,
            symptoms: BTreeSet::new(),
            needs: BTreeSet::new(),
            mood: Self::DEFAULT_MOOD,
            note: String::new(),
            photos: Vec::new(),
            vitals: Vitals::default(),
            created_at,
        }
    }

    pub fn has_symptom(&self, symptom: &str) -> bool {
        self.symptoms.contains(symptom)
    }

    /// At least one symptom, need, or non-blank note.
    pub fn carries_signal(&self) -> bool {
        !self.symptoms.is_empty() || !self.needs.is_empty() || !self.note.trim().is_empty()
    }
}

/// Raw form input, vitals exactly as typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: String, // YYYY-MM-DD
    pub symptoms: Vec<String>,
    pub needs: Vec<String>,
    pub mood: Option<u8>,
    pub note: String,
    pub photos: Vec<String>,
    pub bp_sys: String,
    pub bp_dia: String,
    pub heart_rate: String,
    pub weight: String,
    pub steps: String,
}

impl EntryDraft {
    /// Parse into a `DayEntry`. Only a malformed date is an error; unusable
    /// vitals and blank names are dropped.
    pub fn into_entry(self, created_at: NaiveDateTime) -> Result<DayEntry, JournalError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| JournalError::InvalidDate(self.date.clone()))?;

        Ok(DayEntry {
            date,
            symptoms: self.symptoms.iter().filter_map(|s| normalize_term(s)).collect(),
            needs: self.needs.iter().filter_map(|n| normalize_term(n)).collect(),
            mood: self.mood.unwrap_or(DayEntry::DEFAULT_MOOD),
            note: self.note,
            photos: self.photos,
            vitals: Vitals {
                bp_sys: parse_vital(&self.bp_sys),
                bp_dia: parse_vital(&self.bp_dia),
                heart_rate: parse_vital(&self.heart_rate),
                weight: parse_vital(&self.weight),
                steps: parse_vital(&self.steps),
            },
            created_at,
        })
    }
}

/// Empty, non-numeric, and non-finite input all mean "absent".
pub fn parse_vital(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}
