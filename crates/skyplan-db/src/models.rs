use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Error returned when a string is not one of an enum's stored spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseEnumError {
    /// Human-readable name of the enum being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Declares a closed set of values stored as `TEXT`.
///
/// Each variant carries its exact stored spelling, which is shared by
/// `Display`, `FromStr`, serde and sqlx so the four can never drift apart.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
        #[sqlx(type_name = "text")]
        pub enum $name {
            $(
                #[sqlx(rename = $text)]
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored spelling of this variant.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseEnumError {
                        kind: $kind,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

text_enum! {
    /// Workflow status of a science plan.
    PlanStatus, "plan status" {
        Draft => "DRAFT",
        Invalid => "INVALID",
        Valid => "VALID",
        Submitted => "SUBMITTED",
    }
}

text_enum! {
    /// Execution status of an observing program.
    ProgramStatus, "program status" {
        PendingReview => "Pending Review",
        Completed => "Completed",
    }
}

text_enum! {
    /// Observatory site.
    TelescopeLocation, "telescope location" {
        Hawaii => "Hawaii",
        Chile => "Chile",
    }
}

text_enum! {
    FileType, "file type" {
        Png => "PNG",
        Jpeg => "JPEG",
        Raw => "RAW",
    }
}

text_enum! {
    FileQuality, "file quality" {
        Low => "Low",
        Fine => "Fine",
    }
}

text_enum! {
    ImageMode, "image mode" {
        BlackAndWhite => "B&W",
        Color => "Color",
    }
}

text_enum! {
    /// Arc lamp used to calibrate the spectrograph.
    CalibrationUnit, "calibration unit" {
        Argon => "Argon",
        CuAr => "CuAr",
        ThAr => "ThAr",
        Xenon => "Xenon",
    }
}

text_enum! {
    LightType, "light type" {
        CerroPachonSkyEmission => "CerroPachonSkyEmission",
        MaunaKeaSkyEmission => "MaunaKeaSkyEmission",
    }
}

text_enum! {
    FoldMirrorType, "fold mirror type" {
        CassegrainFocus => "CASSEGRAIN_FOCUS",
        ReflectiveConvergingBeam => "REFLECTIVE_CONVERGING_BEAM",
    }
}

text_enum! {
    /// Compass direction of the telescope position.
    Direction, "teleposition direction" {
        North => "North",
        East => "East",
        West => "West",
        South => "South",
    }
}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A constellation from the reference catalog.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StarSystem {
    pub id: Uuid,
    pub name: String,
    pub meaning: String,
    pub area_sq_deg: f64,
    pub quadrant: String,
    pub latitude_max: i32,
    pub latitude_min: i32,
}

/// A proposed observation awaiting approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct SciencePlan {
    pub id: Uuid,
    pub creator: String,
    pub submitter: String,
    pub funding: f64,
    pub objective: String,
    pub star_system_id: Uuid,
    pub schedule_start: DateTime<Utc>,
    pub schedule_end: DateTime<Utc>,
    pub telescope_location: TelescopeLocation,
    pub file_type: FileType,
    pub file_quality: FileQuality,
    pub image_mode: ImageMode,
    pub exposure: i32,
    pub contrast: i32,
    pub brightness: i32,
    pub saturation: i32,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One audit log entry. `is_valid` is only set by official validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ValidationResult {
    pub id: i64,
    pub plan_id: Uuid,
    pub is_valid: Option<bool>,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// The executable artifact derived from a submitted plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ObservingProgram {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub calibration_unit: CalibrationUnit,
    pub light_type: LightType,
    pub fold_mirror_type: FoldMirrorType,
    pub teleposition_degree: f64,
    pub teleposition_direction: Direction,
    pub status: ProgramStatus,
    pub submitted_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_status_display_roundtrip() {
        for v in PlanStatus::ALL {
            let parsed: PlanStatus = v.to_string().parse().expect("should parse");
            assert_eq!(*v, parsed);
        }
    }

    #[test]
    fn plan_status_uses_uppercase_spelling() {
        assert_eq!(PlanStatus::Draft.to_string(), "DRAFT");
        assert_eq!(PlanStatus::Submitted.to_string(), "SUBMITTED");
        assert!("draft".parse::<PlanStatus>().is_err());
    }

    #[test]
    fn program_status_spelling_has_space() {
        assert_eq!(ProgramStatus::PendingReview.as_str(), "Pending Review");
        assert_eq!(
            "Pending Review".parse::<ProgramStatus>().unwrap(),
            ProgramStatus::PendingReview
        );
        assert!("PendingReview".parse::<ProgramStatus>().is_err());
    }

    #[test]
    fn image_mode_black_and_white() {
        assert_eq!("B&W".parse::<ImageMode>().unwrap(), ImageMode::BlackAndWhite);
        assert!("BW".parse::<ImageMode>().is_err());
    }

    #[test]
    fn fold_mirror_screaming_snake() {
        assert_eq!(
            "REFLECTIVE_CONVERGING_BEAM".parse::<FoldMirrorType>().unwrap(),
            FoldMirrorType::ReflectiveConvergingBeam
        );
        assert_eq!(FoldMirrorType::CassegrainFocus.as_str(), "CASSEGRAIN_FOCUS");
    }

    #[test]
    fn parse_error_names_the_kind() {
        let err = "Mars".parse::<TelescopeLocation>().unwrap_err();
        assert_eq!(err.kind, "telescope location");
        assert_eq!(err.to_string(), "invalid telescope location: \"Mars\"");
    }

    #[test]
    fn parsing_is_case_sensitive() {
        assert!("png".parse::<FileType>().is_err());
        assert!("argon".parse::<CalibrationUnit>().is_err());
        assert!("north".parse::<Direction>().is_err());
    }

    #[test]
    fn serde_uses_stored_spelling() {
        let json = serde_json::to_string(&ImageMode::BlackAndWhite).unwrap();
        assert_eq!(json, "\"B&W\"");
        let back: ProgramStatus = serde_json::from_str("\"Pending Review\"").unwrap();
        assert_eq!(back, ProgramStatus::PendingReview);
    }

    #[test]
    fn all_lists_every_variant() {
        assert_eq!(CalibrationUnit::ALL.len(), 4);
        assert_eq!(Direction::ALL.len(), 4);
        assert_eq!(LightType::ALL.len(), 2);
        assert_eq!(FileType::ALL.len(), 3);
    }
}
