//! Advice and red-flag rule tables.
//!
//! The built-in tables are the canonical policy and are built once per
//! process. Overrides can be loaded from `advice_rules.json` and
//! `red_flag_rules.json` in a rules directory.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use super::types::{AdviceRule, RedFlagRule, RuleError};
use crate::models::{AdviceCategory, RedFlagAction};
use crate::vocabulary::CustomVocabulary;

const ADVICE_FILE: &str = "advice_rules.json";
const RED_FLAG_FILE: &str = "red_flag_rules.json";

static BUILTIN: LazyLock<RuleTables> = LazyLock::new(|| RuleTables {
    advice: builtin_advice(),
    red_flags: builtin_red_flags(),
});

/// Both rule tables, read-only after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTables {
    pub advice: Vec<AdviceRule>,
    pub red_flags: Vec<RedFlagRule>,
}

impl RuleTables {
    /// The canonical tables, built on first use.
    pub fn builtin() -> &'static RuleTables {
        &BUILTIN
    }

    /// Parse both tables from JSON arrays.
    pub fn from_json(advice_json: &str, red_flag_json: &str) -> Result<Self, RuleError> {
        let advice: Vec<AdviceRule> = serde_json::from_str(advice_json)
            .map_err(|e| RuleError::Parse(ADVICE_FILE.into(), e.to_string()))?;
        let red_flags: Vec<RedFlagRule> = serde_json::from_str(red_flag_json)
            .map_err(|e| RuleError::Parse(RED_FLAG_FILE.into(), e.to_string()))?;
        Ok(Self { advice, red_flags })
    }

    /// Load both tables from `dir`.
    pub fn load(dir: &Path) -> Result<Self, RuleError> {
        let advice_json = read_table(&dir.join(ADVICE_FILE))?;
        let red_flag_json = read_table(&dir.join(RED_FLAG_FILE))?;
        let tables = Self::from_json(&advice_json, &red_flag_json)?;

        // Rules naming unknown symptoms never fire. Report, don't reject.
        for symptom in tables.unknown_symptoms(&CustomVocabulary::new()) {
            tracing::warn!(symptom, "Rule references a symptom outside the vocabulary");
        }
        tracing::info!(
            advice = tables.advice.len(),
            red_flags = tables.red_flags.len(),
            dir = %dir.display(),
            "Loaded rule tables"
        );
        Ok(tables)
    }

    /// Load overrides when `dir` has an advice table, else the built-in tables.
    pub fn load_or_builtin(dir: &Path) -> Result<Self, RuleError> {
        if dir.join(ADVICE_FILE).exists() {
            Self::load(dir)
        } else {
            Ok(Self::builtin().clone())
        }
    }

    /// Trigger symptoms that `vocab` (canonical + custom) does not know,
    /// in table order, without repeats.
    pub fn unknown_symptoms<'a>(&'a self, vocab: &CustomVocabulary) -> Vec<&'a str> {
        let triggers = self
            .advice
            .iter()
            .map(|r| r.trigger_symptom.as_str())
            .chain(self.red_flags.iter().map(|r| r.symptom.as_str()));

        let mut unknown: Vec<&str> = Vec::new();
        for symptom in triggers {
            if !vocab.knows_symptom(symptom) && !unknown.contains(&symptom) {
                unknown.push(symptom);
            }
        }
        unknown
    }
}

fn read_table(path: &Path) -> Result<String, RuleError> {
    std::fs::read_to_string(path)
        .map_err(|e| RuleError::Load(path.display().to_string(), e.to_string()))
}

// ── Built-in tables ─────────────────────────────────────────

fn advice(
    trigger: &str,
    days_gte: Option<u32>,
    category: AdviceCategory,
    priority: i32,
    content: &str,
) -> AdviceRule {
    AdviceRule {
        trigger_symptom: trigger.into(),
        trigger_days_gte: days_gte,
        category,
        content: content.into(),
        priority,
    }
}

fn red_flag(symptom: &str, days_gte: Option<u32>, action: RedFlagAction, notes: &str) -> RedFlagRule {
    RedFlagRule {
        symptom: symptom.into(),
        days_gte,
        action,
        notes: notes.into(),
    }
}

fn builtin_advice() -> Vec<AdviceRule> {
    use AdviceCategory::*;

    vec![
        advice("胸悶", None, SpecialistReferral, 95,
            "胸悶：若伴隨冒冷汗、噁心、放射性疼痛，請立刻就醫（急診）。"),
        advice("呼吸急促", None, SpecialistReferral, 95,
            "呼吸急促：若休息後仍未緩解或伴隨嘴唇發紫，請立刻就醫（急診）。"),
        advice("喉嚨痛", None, Dietary, 40,
            "喉嚨痛：多補充溫開水、多休息，避免辛辣與油炸等刺激性飲食。"),
        advice("咳嗽", None, Dietary, 40,
            "咳嗽：補水、休息，避免冰品與刺激性飲食。"),
        advice("咳嗽", Some(7), SpecialistReferral, 70,
            "咳嗽已持續 7 天以上，建議至胸腔內科或耳鼻喉科就醫評估。"),
        advice("鼻塞", None, TraditionalCare, 20,
            "鼻塞：可熱敷鼻樑、按壓迎香穴，並保持室內濕度。"),
        advice("腹瀉", None, Dietary, 50,
            "腹瀉：口服補液、清淡飲食，留意脫水。"),
        advice("腹瀉", Some(3), SpecialistReferral, 80,
            "腹瀉已超過 3 天，或伴隨便血、高燒，建議就醫。"),
        advice("便秘", None, Dietary, 40,
            "便秘：增加蔬果與水份攝取，規律運動。"),
        advice("便秘", Some(2), TraditionalCare, 30,
            "便秘已連續 2 天以上：可順時針按摩腹部、按壓天樞穴，早晨空腹喝一杯溫開水。"),
        advice("便秘", Some(7), SpecialistReferral, 70,
            "便秘已持續一週，或伴隨嚴重腹痛、黑便，請就醫。"),
        advice("胃痛", None, Dietary, 40,
            "胃痛：少量多餐，避免咖啡、酒精與辛辣食物。"),
        advice("噁心", None, Dietary, 35,
            "噁心：少量多次補充水分，可嘗試溫薑茶。"),
        advice("頭痛", None, Lifestyle, 30,
            "頭痛：充足休息、減少螢幕時間並補充水分。"),
        advice("頭痛", Some(3), SpecialistReferral, 70,
            "頭痛已持續 3 天以上，建議至神經內科評估。"),
        advice("頭暈", None, Lifestyle, 30,
            "頭暈：起身放慢動作、補充水分，避免獨自從事危險活動。"),
        advice("失眠", None, Lifestyle, 30,
            "睡眠：規律作息、睡前減少藍光。"),
        advice("失眠", Some(3), TraditionalCare, 35,
            "連續失眠：睡前溫水泡腳、按壓神門穴，嘗試 5 分鐘呼吸冥想。"),
        advice("焦慮", None, Lifestyle, 30,
            "壓力：嘗試 5 分鐘呼吸冥想，維持規律作息與適度運動。"),
        advice("焦慮", Some(14), SpecialistReferral, 60,
            "焦慮已持續兩週以上，建議尋求身心科或心理諮商協助。"),
        advice("腰痠背痛", None, Lifestyle, 25,
            "腰痠背痛：放鬆伸展，避免久坐與長時間維持同一姿勢。"),
        advice("關節痛", None, Lifestyle, 25,
            "關節痛：適度活動、避免過度負重，急性腫痛可冰敷。"),
        advice("皮疹", None, Lifestyle, 30,
            "皮疹：避免抓搔，保持皮膚清潔乾燥。"),
        advice("皮疹", Some(3), SpecialistReferral, 60,
            "皮疹持續 3 天以上或範圍擴大，建議至皮膚科就醫。"),
        advice("經痛", None, TraditionalCare, 30,
            "經痛：熱敷下腹、飲用溫熱飲品，避免生冷食物。"),
    ]
}

fn builtin_red_flags() -> Vec<RedFlagRule> {
    use RedFlagAction::*;

    vec![
        red_flag("胸痛", None, SeekCareImmediately,
            "胸痛可能是心肌梗塞等急症，尤其伴隨冒冷汗、噁心或放射到左臂、下顎的疼痛。"),
        red_flag("呼吸急促", None, SeekCareImmediately,
            "休息時仍呼吸困難、無法說完整句子或嘴唇發紫。"),
        red_flag("胸悶", Some(2), SeekCareSoon,
            "胸悶連續兩天以上，需排除心肺問題。"),
        red_flag("腹瀉", Some(3), SeekCareSoon,
            "腹瀉超過 3 天容易脫水，若伴隨便血或高燒更需盡快就醫。"),
        red_flag("頭暈", Some(3), BookAppointment,
            "反覆頭暈需評估血壓、血糖與內耳問題。"),
        red_flag("頭痛", Some(7), BookAppointment,
            "頭痛持續一週以上，需評估是否有其他潛在原因。"),
        red_flag("咳嗽", Some(14), BookAppointment,
            "咳嗽超過兩週屬慢性咳嗽，需進一步檢查。"),
    ]
}
