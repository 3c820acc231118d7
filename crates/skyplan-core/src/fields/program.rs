use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use skyplan_db::models::{CalibrationUnit, Direction, FoldMirrorType, LightType};
use skyplan_db::queries::programs::NewObservingProgram;

use super::{FieldViolation, check_enum, lenient_scalar, present};

pub const DEGREE_MAX: f64 = 360.0;

/// Raw observing program fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgramPayload {
    #[serde(default, alias = "calibrationUnit", deserialize_with = "lenient_scalar")]
    pub calibration_unit: Option<String>,
    #[serde(default, alias = "lightType", deserialize_with = "lenient_scalar")]
    pub light_type: Option<String>,
    #[serde(default, alias = "foldMirrorType", deserialize_with = "lenient_scalar")]
    pub fold_mirror_type: Option<String>,
    #[serde(default, alias = "telepositionDegree", deserialize_with = "lenient_scalar")]
    pub teleposition_degree: Option<String>,
    #[serde(default, alias = "telepositionDirection", deserialize_with = "lenient_scalar")]
    pub teleposition_direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgramFields {
    pub calibration_unit: CalibrationUnit,
    pub light_type: LightType,
    pub fold_mirror_type: FoldMirrorType,
    pub teleposition_degree: f64,
    pub teleposition_direction: Direction,
}

impl ProgramFields {
    pub fn into_new_program(self, plan_id: Uuid) -> NewObservingProgram {
        NewObservingProgram {
            plan_id,
            calibration_unit: self.calibration_unit,
            light_type: self.light_type,
            fold_mirror_type: self.fold_mirror_type,
            teleposition_degree: self.teleposition_degree,
            teleposition_direction: self.teleposition_direction,
        }
    }
}

pub fn validate_program_fields(payload: &ProgramPayload) -> Vec<FieldViolation> {
    match parse_program_fields(payload) {
        Ok(_) => Vec::new(),
        Err(violations) => violations,
    }
}

pub fn parse_program_fields(
    payload: &ProgramPayload,
) -> Result<ProgramFields, Vec<FieldViolation>> {
    let mut violations = Vec::new();

    let required = [
        ("calibration_unit", &payload.calibration_unit),
        ("light_type", &payload.light_type),
        ("fold_mirror_type", &payload.fold_mirror_type),
        ("teleposition_degree", &payload.teleposition_degree),
        ("teleposition_direction", &payload.teleposition_direction),
    ];
    for (name, value) in required {
        if present(value).is_none() {
            violations.push(FieldViolation::Missing(name));
        }
    }

    let calibration_unit = check_enum::<CalibrationUnit>(
        &payload.calibration_unit,
        FieldViolation::InvalidCalibrationUnit,
        &mut violations,
    );
    let light_type = check_enum::<LightType>(
        &payload.light_type,
        FieldViolation::InvalidLightType,
        &mut violations,
    );
    let fold_mirror_type = check_enum::<FoldMirrorType>(
        &payload.fold_mirror_type,
        FieldViolation::InvalidFoldMirrorType,
        &mut violations,
    );
    let direction = check_enum::<Direction>(
        &payload.teleposition_direction,
        FieldViolation::InvalidTelepositionDirection,
        &mut violations,
    );

    let degree = match present(&payload.teleposition_degree)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|d| d.is_finite())
    {
        Some(d) if (0.0..=DEGREE_MAX).contains(&d) => Some(d),
        Some(_) => {
            violations.push(FieldViolation::DegreeOutOfRange);
            None
        }
        None => {
            violations.push(FieldViolation::DegreeNotNumeric);
            None
        }
    };

    match (calibration_unit, light_type, fold_mirror_type, degree, direction) {
        (Some(cu), Some(lt), Some(fm), Some(deg), Some(dir)) if violations.is_empty() => {
            Ok(ProgramFields {
                calibration_unit: cu,
                light_type: lt,
                fold_mirror_type: fm,
                teleposition_degree: deg,
                teleposition_direction: dir,
            })
        }
        _ => {
            debug!(count = violations.len(), "program payload rejected");
            Err(violations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> ProgramPayload {
        ProgramPayload {
            calibration_unit: Some("ThAr".into()),
            light_type: Some("MaunaKeaSkyEmission".into()),
            fold_mirror_type: Some("CASSEGRAIN_FOCUS".into()),
            teleposition_degree: Some("123.5".into()),
            teleposition_direction: Some("East".into()),
        }
    }

    fn messages(payload: &ProgramPayload) -> Vec<String> {
        validate_program_fields(payload)
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn valid_payload_parses() {
        let fields = parse_program_fields(&valid_payload()).unwrap();
        assert_eq!(fields.calibration_unit, CalibrationUnit::ThAr);
        assert_eq!(fields.fold_mirror_type, FoldMirrorType::CassegrainFocus);
        assert_eq!(fields.teleposition_degree, 123.5);
        assert_eq!(fields.teleposition_direction, Direction::East);

        let plan_id = Uuid::new_v4();
        assert_eq!(fields.into_new_program(plan_id).plan_id, plan_id);
    }

    #[test]
    fn empty_payload_reports_missing_then_types() {
        assert_eq!(
            messages(&ProgramPayload::default()),
            [
                "Missing required field: calibration_unit",
                "Missing required field: light_type",
                "Missing required field: fold_mirror_type",
                "Missing required field: teleposition_degree",
                "Missing required field: teleposition_direction",
                "Invalid calibration unit.",
                "Invalid light type.",
                "Invalid fold mirror type.",
                "Invalid teleposition direction.",
                "Teleposition degree must be numeric.",
            ]
        );
    }

    #[test]
    fn degree_bounds_are_inclusive() {
        let mut payload = valid_payload();
        for ok in ["0", "360", "0.0", "359.999"] {
            payload.teleposition_degree = Some(ok.into());
            assert!(validate_program_fields(&payload).is_empty(), "{ok}");
        }

        payload.teleposition_degree = Some("360.5".into());
        assert_eq!(messages(&payload), ["Teleposition degree must be between 0 and 360."]);

        payload.teleposition_degree = Some("-1".into());
        assert_eq!(messages(&payload), ["Teleposition degree must be between 0 and 360."]);
    }

    #[test]
    fn non_finite_degree_is_not_numeric() {
        let mut payload = valid_payload();
        for bad in ["NaN", "inf", "-infinity", "north"] {
            payload.teleposition_degree = Some(bad.into());
            assert_eq!(messages(&payload), ["Teleposition degree must be numeric."], "{bad}");
        }
    }

    #[test]
    fn enum_values_must_match_exactly() {
        let mut payload = valid_payload();
        payload.calibration_unit = Some("Neon".into());
        payload.teleposition_direction = Some("north".into());
        assert_eq!(
            messages(&payload),
            ["Invalid calibration unit.", "Invalid teleposition direction."]
        );
    }

    #[test]
    fn payload_accepts_numeric_degree() {
        let payload: ProgramPayload = toml::from_str(
            r#"
            calibration_unit = "Xenon"
            light_type = "CerroPachonSkyEmission"
            fold_mirror_type = "REFLECTIVE_CONVERGING_BEAM"
            teleposition_degree = 90
            teleposition_direction = "South"
            "#,
        )
        .unwrap();
        let fields = parse_program_fields(&payload).unwrap();
        assert_eq!(fields.teleposition_degree, 90.0);
        assert_eq!(fields.light_type, LightType::CerroPachonSkyEmission);
    }
}
