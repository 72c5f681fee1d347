use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{AdviceCategory, RedFlagAction};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Symptom (+ optional streak threshold) → prioritized recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceRule {
    pub trigger_symptom: String,
    /// Minimum consecutive-day streak, inclusive, ending at the entry's date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_days_gte: Option<u32>,
    pub category: AdviceCategory,
    pub content: String,
    /// Higher = more urgent.
    pub priority: i32,
}

impl AdviceRule {
    /// Identity of the advice: category + trigger symptom.
    pub fn key(&self) -> String {
        format!("{}:{}", self.category.as_str(), self.trigger_symptom)
    }
}

/// Symptom (+ optional streak threshold) → urgent-care action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagRule {
    pub symptom: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_gte: Option<u32>,
    pub action: RedFlagAction,
    pub notes: String,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// One activated advice rule, recomputed on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceResult {
    pub category: AdviceCategory,
    pub content: String,
    pub priority: i32,
    pub key: String,
}

impl From<&AdviceRule> for AdviceResult {
    fn from(rule: &AdviceRule) -> Self {
        Self {
            category: rule.category,
            content: rule.content.clone(),
            priority: rule.priority,
            key: rule.key(),
        }
    }
}

/// A matched red-flag rule and the entry (by date) that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlagHit {
    pub rule: RedFlagRule,
    pub date: NaiveDate,
}

impl RedFlagHit {
    pub fn action_label(&self) -> &'static str {
        self.rule.action.label()
    }
}

// ---------------------------------------------------------------------------
// RuleError
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Rule table load failed ({0}): {1}")]
    Load(String, String),

    #[error("Rule table parse failed ({0}): {1}")]
    Parse(String, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constipation_rule() -> AdviceRule {
        AdviceRule {
            trigger_symptom: "便秘".into(),
            trigger_days_gte: Some(2),
            category: AdviceCategory::TraditionalCare,
            content: "按摩腹部".into(),
            priority: 30,
        }
    }

    #[test]
    fn key_combines_category_and_trigger() {
        assert_eq!(constipation_rule().key(), "traditional_care:便秘");
    }

    #[test]
    fn result_copies_rule_fields() {
        let rule = constipation_rule();
        let result = AdviceResult::from(&rule);
        assert_eq!(result.category, AdviceCategory::TraditionalCare);
        assert_eq!(result.priority, 30);
        assert_eq!(result.content, rule.content);
        assert_eq!(result.key, rule.key());
    }

    #[test]
    fn missing_threshold_deserializes_as_none() {
        let rule: RedFlagRule = serde_json::from_str(
            r#"{"symptom":"胸痛","action":"seek_care_immediately","notes":""}"#,
        )
        .unwrap();
        assert_eq!(rule.days_gte, None);
        assert_eq!(rule.action, RedFlagAction::SeekCareImmediately);
    }

    #[test]
    fn hit_exposes_action_label() {
        let hit = RedFlagHit {
            rule: RedFlagRule {
                symptom: "胸痛".into(),
                days_gte: None,
                action: RedFlagAction::SeekCareImmediately,
                notes: String::new(),
            },
            date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        };
        assert_eq!(hit.action_label(), "seek care immediately");
    }
}
