//! Field validation for plan and program payloads.
//!
//! Payloads arrive as loosely typed string maps, the way a form or a TOML
//! file submits them. Validation runs every check regardless of earlier
//! failures and reports violations in check order. A payload with no
//! violations can be parsed into typed fields for persistence.

mod plan;
mod program;

use std::fmt;

use serde::{Deserializer, Serialize, Serializer};

pub use plan::{PlanFields, PlanPayload, parse_plan_fields, validate_plan_fields};
pub use program::{ProgramFields, ProgramPayload, parse_program_fields, validate_program_fields};

/// The four image dials, each an integer in `[0, 50]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dial {
    Exposure,
    Contrast,
    Brightness,
    Saturation,
}

impl Dial {
    pub const ALL: [Dial; 4] = [
        Dial::Exposure,
        Dial::Contrast,
        Dial::Brightness,
        Dial::Saturation,
    ];

    pub const MIN: i64 = 0;
    pub const MAX: i64 = 50;
}

impl fmt::Display for Dial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exposure => "Exposure",
            Self::Contrast => "Contrast",
            Self::Brightness => "Brightness",
            Self::Saturation => "Saturation",
        };
        f.write_str(s)
    }
}

/// A single field-level rule failure. `Display` is the user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldViolation {
    #[error("Missing required field: {0}")]
    Missing(&'static str),
    #[error("Objective must be <= 500 characters.")]
    ObjectiveTooLong,
    #[error("Invalid telescope location.")]
    InvalidTelescopeLocation,
    #[error("Invalid file type.")]
    InvalidFileType,
    #[error("Invalid file quality.")]
    InvalidFileQuality,
    #[error("Invalid image mode.")]
    InvalidImageMode,
    #[error("Invalid schedule format.")]
    InvalidScheduleFormat,
    #[error("Schedule start must be before schedule end.")]
    ScheduleOutOfOrder,
    #[error("{0} must be an integer.")]
    DialNotInteger(Dial),
    #[error("{0} must be between 0 and 50.")]
    DialOutOfRange(Dial),
    #[error("Funding must be a decimal number.")]
    FundingNotDecimal,
    #[error("Funding must not be negative.")]
    FundingNegative,
    #[error("Invalid calibration unit.")]
    InvalidCalibrationUnit,
    #[error("Invalid light type.")]
    InvalidLightType,
    #[error("Invalid fold mirror type.")]
    InvalidFoldMirrorType,
    #[error("Invalid teleposition direction.")]
    InvalidTelepositionDirection,
    #[error("Teleposition degree must be numeric.")]
    DegreeNotNumeric,
    #[error("Teleposition degree must be between 0 and 360.")]
    DegreeOutOfRange,
}

impl Serialize for FieldViolation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Trimmed value of a payload field, or `None` if absent or blank.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse `value` as one of a closed enum set, pushing `violation` on failure.
pub(crate) fn check_enum<T: std::str::FromStr>(
    value: &Option<String>,
    violation: FieldViolation,
    violations: &mut Vec<FieldViolation>,
) -> Option<T> {
    let parsed = present(value).and_then(|s| s.parse().ok());
    if parsed.is_none() {
        violations.push(violation);
    }
    parsed
}

/// Accept a string, number or boolean as the string form of a field.
///
/// JSON bodies and TOML payload files carry numbers natively, while HTML
/// forms send everything as text. Validation works on the text either way.
pub(crate) fn lenient_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl<'de> serde::de::Visitor<'de> for ScalarVisitor {
        type Value = Option<String>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a string, number or boolean")
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(Some(v.to_owned()))
        }

        fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Self::Value, E> {
            Ok(Some(v.to_string()))
        }

        fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
            d.deserialize_any(self)
        }
    }

    deserializer.deserialize_option(ScalarVisitor)
}
