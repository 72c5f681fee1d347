//! Symptom and need vocabulary.
//!
//! The canonical lists ship with the app; users may add their own terms,
//! which are trimmed and must be unique across canonical and custom lists.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::TermKind;

// ═══════════════════════════════════════════
// Canonical vocabulary
// ═══════════════════════════════════════════

pub const SYMPTOMS: &[&str] = &[
    "頭痛", "頭暈", "鼻塞", "喉嚨痛", "咳嗽", "呼吸急促",
    "胸悶", "胸痛", "胃痛", "腹瀉", "便秘", "噁心",
    "腰痠背痛", "關節痛", "皮疹", "失眠", "焦慮", "經痛",
];

pub const NEEDS: &[&str] = &[
    "多喝水", "多休息", "避免刺激", "清淡飲食", "放鬆伸展", "適度運動", "日照/散步",
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("Term must not be empty")]
    EmptyTerm,

    #[error("{kind} already exists: {term}")]
    Duplicate { kind: &'static str, term: String },
}

/// Trimmed term, or `None` when nothing is left.
pub fn normalize_term(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// User-added symptoms and needs, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomVocabulary {
    pub symptoms: Vec<String>,
    pub needs: Vec<String>,
}

impl CustomVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom symptom and returns the stored (trimmed) form.
    pub fn add_symptom(&mut self, raw: &str) -> Result<String, VocabularyError> {
        self.add(TermKind::Symptom, raw)
    }

    /// Adds a custom need and returns the stored (trimmed) form.
    pub fn add_need(&mut self, raw: &str) -> Result<String, VocabularyError> {
        self.add(TermKind::Need, raw)
    }

    /// Returns whether the term was present.
    pub fn remove_symptom(&mut self, term: &str) -> bool {
        remove_from(&mut self.symptoms, term)
    }

    pub fn remove_need(&mut self, term: &str) -> bool {
        remove_from(&mut self.needs, term)
    }

    /// Canonical symptoms followed by custom ones.
    pub fn all_symptoms(&self) -> Vec<&str> {
        SYMPTOMS
            .iter()
            .copied()
            .chain(self.symptoms.iter().map(String::as_str))
            .collect()
    }

    /// Canonical needs followed by custom ones.
    pub fn all_needs(&self) -> Vec<&str> {
        NEEDS
            .iter()
            .copied()
            .chain(self.needs.iter().map(String::as_str))
            .collect()
    }

    pub fn knows_symptom(&self, term: &str) -> bool {
        SYMPTOMS.contains(&term) || self.symptoms.iter().any(|s| s == term)
    }

    pub fn is_empty(&self) -> bool {
        self.symptoms.is_empty() && self.needs.is_empty()
    }

    fn add(&mut self, kind: TermKind, raw: &str) -> Result<String, VocabularyError> {
        let term = normalize_term(raw).ok_or(VocabularyError::EmptyTerm)?;
        let (canonical, custom) = match kind {
            TermKind::Symptom => (SYMPTOMS, &mut self.symptoms),
            TermKind::Need => (NEEDS, &mut self.needs),
        };
        if canonical.contains(&term.as_str()) || custom.contains(&term) {
            return Err(VocabularyError::Duplicate {
                kind: kind.as_str(),
                term,
            });
        }
        custom.push(term.clone());
        Ok(term)
    }
}

fn remove_from(list: &mut Vec<String>, term: &str) -> bool {
    let before = list.len();
    list.retain(|t| t != term);
    list.len() != before
}
