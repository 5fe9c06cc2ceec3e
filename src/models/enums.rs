use serde::{Deserialize, Serialize};

/// Generates a closed string enum with `as_str`, `Display`, a serde
/// representation equal to the string form, and a default variant.
macro_rules! str_enum {
    ($name:ident default $default:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(VitalStatus default Unknown {
    Stable => "stable",
    Elevated => "elevated",
    Critical => "critical",
    Unknown => "unknown",
});

str_enum!(TimelineCategory default Note {
    Appointment => "appointment",
    Lab => "lab",
    Imaging => "imaging",
    Note => "note",
    Medication => "medication",
});

str_enum!(Adherence default OnTrack {
    OnTrack => "on track",
    NeedsReview => "needs review",
    Paused => "paused",
});

str_enum!(MedicationForm default Pill {
    Pill => "pill",
    Bottle => "bottle",
    Spray => "spray",
    Cream => "cream",
    Injection => "injection",
});

impl MedicationForm {
    /// Dosage form implied by an administration route.
    /// Routes without a dedicated form fall back to `Pill`.
    pub fn from_route(route: &str) -> Self {
        match route.trim().to_lowercase().as_str() {
            "injection" => Self::Injection,
            "topical" => Self::Cream,
            _ => Self::Pill,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vital_status_round_trip() {
        for (variant, s) in [
            (VitalStatus::Stable, "stable"),
            (VitalStatus::Elevated, "elevated"),
            (VitalStatus::Critical, "critical"),
            (VitalStatus::Unknown, "unknown"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(variant.to_string(), s);
            let parsed: VitalStatus = serde_json::from_value(serde_json::json!(s)).unwrap();
            assert_eq!(parsed, variant);
        }
    }

    #[test]
    fn adherence_serializes_with_spaces() {
        let json = serde_json::to_string(&Adherence::NeedsReview).unwrap();
        assert_eq!(json, "\"needs review\"");
        let parsed: Adherence = serde_json::from_str("\"on track\"").unwrap();
        assert_eq!(parsed, Adherence::OnTrack);
    }

    #[test]
    fn defaults_match_schema() {
        assert_eq!(VitalStatus::default(), VitalStatus::Unknown);
        assert_eq!(TimelineCategory::default(), TimelineCategory::Note);
        assert_eq!(Adherence::default(), Adherence::OnTrack);
        assert_eq!(MedicationForm::default(), MedicationForm::Pill);
    }

    #[test]
    fn route_maps_to_form() {
        assert_eq!(MedicationForm::from_route("oral"), MedicationForm::Pill);
        assert_eq!(MedicationForm::from_route("Injection"), MedicationForm::Injection);
        assert_eq!(MedicationForm::from_route("topical"), MedicationForm::Cream);
        assert_eq!(MedicationForm::from_route("inhaled"), MedicationForm::Pill);
    }

    #[test]
    fn invalid_enum_returns_error() {
        assert!(serde_json::from_str::<TimelineCategory>("\"surgery\"").is_err());
        assert!(serde_json::from_str::<MedicationForm>("\"patch\"").is_err());
        assert!(serde_json::from_str::<Adherence>("\"\"").is_err());
    }
}
