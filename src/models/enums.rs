use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(AdviceCategory {
    Dietary => "dietary",
    Lifestyle => "lifestyle",
    SpecialistReferral => "specialist_referral",
    TraditionalCare => "traditional_care",
});

str_enum!(RedFlagAction {
    SeekCareImmediately => "seek_care_immediately",
    SeekCareSoon => "seek_care_soon",
    BookAppointment => "book_appointment",
});

impl RedFlagAction {
    /// Urgency label shown next to the warning.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SeekCareImmediately => "seek care immediately",
            Self::SeekCareSoon => "seek care within 24 hours",
            Self::BookAppointment => "book a doctor visit",
        }
    }
}

str_enum!(VitalKind {
    Systolic => "systolic",
    Diastolic => "diastolic",
    HeartRate => "heart_rate",
    Weight => "weight",
    Steps => "steps",
});

impl VitalKind {
    pub const ALL: [VitalKind; 5] = [
        VitalKind::Systolic,
        VitalKind::Diastolic,
        VitalKind::HeartRate,
        VitalKind::Weight,
        VitalKind::Steps,
    ];

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Systolic | Self::Diastolic => "mmHg",
            Self::HeartRate => "bpm",
            Self::Weight => "kg",
            Self::Steps => "步",
        }
    }
}

str_enum!(TermKind {
    Symptom => "symptom",
    Need => "need",
});
