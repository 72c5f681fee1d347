//! Rule engine: advice, red flags, vital thresholds, and the streak query
//! they share. Every function here is pure over its inputs.

pub mod advice;
pub mod red_flags;
pub mod rules;
pub mod streak;
pub mod types;
pub mod vitals;

pub use rules::RuleTables;
pub use streak::consecutive_days;
pub use types::*;
pub use vitals::{VitalAlert, VitalAlertKind};
