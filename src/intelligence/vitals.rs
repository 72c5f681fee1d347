//! Threshold checks on the entry's vital signs.

use serde::{Deserialize, Serialize};

use crate::models::Vitals;

pub const SYSTOLIC_CRITICAL: f64 = 180.0;
pub const DIASTOLIC_CRITICAL: f64 = 120.0;
pub const HEART_RATE_LOW: f64 = 45.0;
pub const HEART_RATE_HIGH: f64 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalAlertKind {
    VeryHighBloodPressure,
    AbnormalHeartRate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalAlert {
    pub kind: VitalAlertKind,
    pub message: String,
}

/// Absent values never trigger. A heart rate of zero counts as absent.
pub fn check(vitals: &Vitals) -> Vec<VitalAlert> {
    let mut alerts = Vec::new();

    let very_high = vitals.bp_sys.is_some_and(|s| s >= SYSTOLIC_CRITICAL)
        || vitals.bp_dia.is_some_and(|d| d >= DIASTOLIC_CRITICAL);
    if very_high {
        alerts.push(VitalAlert {
            kind: VitalAlertKind::VeryHighBloodPressure,
            message: "血壓非常高（≥180/120），請儘速就醫。".into(),
        });
    }

    if vitals
        .heart_rate
        .filter(|hr| *hr > 0.0)
        .is_some_and(|hr| hr < HEART_RATE_LOW || hr > HEART_RATE_HIGH)
    {
        alerts.push(VitalAlert {
            kind: VitalAlertKind::AbnormalHeartRate,
            message: "心率過低或過高，建議就醫評估。".into(),
        });
    }

    if !alerts.is_empty() {
        tracing::warn!(count = alerts.len(), "Vital sign thresholds exceeded");
    }
    alerts
}
