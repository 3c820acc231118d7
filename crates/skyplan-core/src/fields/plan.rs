use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use skyplan_db::models::{FileQuality, FileType, ImageMode, SciencePlan, TelescopeLocation};
use skyplan_db::queries::plans::NewSciencePlan;

use super::{Dial, FieldViolation, check_enum, lenient_scalar, present};

pub const OBJECTIVE_MAX_CHARS: usize = 500;

/// Raw science plan fields as submitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanPayload {
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub submitter: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub funding: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub objective: Option<String>,
    /// Star system name or id.
    #[serde(default, alias = "starSystem", deserialize_with = "lenient_scalar")]
    pub star_system: Option<String>,
    #[serde(default, alias = "scheduleStart", deserialize_with = "lenient_scalar")]
    pub schedule_start: Option<String>,
    #[serde(default, alias = "scheduleEnd", deserialize_with = "lenient_scalar")]
    pub schedule_end: Option<String>,
    #[serde(default, alias = "telescopeLocation", deserialize_with = "lenient_scalar")]
    pub telescope_location: Option<String>,
    #[serde(default, alias = "fileType", deserialize_with = "lenient_scalar")]
    pub file_type: Option<String>,
    #[serde(default, alias = "fileQuality", deserialize_with = "lenient_scalar")]
    pub file_quality: Option<String>,
    #[serde(default, alias = "imageMode", deserialize_with = "lenient_scalar")]
    pub image_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub exposure: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub contrast: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub brightness: Option<String>,
    #[serde(default, deserialize_with = "lenient_scalar")]
    pub saturation: Option<String>,
}

impl PlanPayload {
    /// Required fields in scan order.
    fn required(&self) -> [(&'static str, &Option<String>); 15] {
        [
            ("creator", &self.creator),
            ("submitter", &self.submitter),
            ("funding", &self.funding),
            ("objective", &self.objective),
            ("star_system", &self.star_system),
            ("schedule_start", &self.schedule_start),
            ("schedule_end", &self.schedule_end),
            ("telescope_location", &self.telescope_location),
            ("file_type", &self.file_type),
            ("file_quality", &self.file_quality),
            ("image_mode", &self.image_mode),
            ("exposure", &self.exposure),
            ("contrast", &self.contrast),
            ("brightness", &self.brightness),
            ("saturation", &self.saturation),
        ]
    }

    fn dial(&self, dial: Dial) -> &Option<String> {
        match dial {
            Dial::Exposure => &self.exposure,
            Dial::Contrast => &self.contrast,
            Dial::Brightness => &self.brightness,
            Dial::Saturation => &self.saturation,
        }
    }
}

impl From<&SciencePlan> for PlanPayload {
    fn from(plan: &SciencePlan) -> Self {
        Self {
            creator: Some(plan.creator.clone()),
            submitter: Some(plan.submitter.clone()),
            funding: Some(plan.funding.to_string()),
            objective: Some(plan.objective.clone()),
            star_system: Some(plan.star_system_id.to_string()),
            schedule_start: Some(plan.schedule_start.to_rfc3339()),
            schedule_end: Some(plan.schedule_end.to_rfc3339()),
            telescope_location: Some(plan.telescope_location.to_string()),
            file_type: Some(plan.file_type.to_string()),
            file_quality: Some(plan.file_quality.to_string()),
            image_mode: Some(plan.image_mode.to_string()),
            exposure: Some(plan.exposure.to_string()),
            contrast: Some(plan.contrast.to_string()),
            brightness: Some(plan.brightness.to_string()),
            saturation: Some(plan.saturation.to_string()),
        }
    }
}

/// Typed plan fields from a payload with no violations.
///
/// `star_system` is still the caller's reference; resolving it against the
/// catalog needs the store.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanFields {
    pub creator: String,
    pub submitter: String,
    pub funding: f64,
    pub objective: String,
    pub star_system: String,
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
}

impl PlanFields {
    pub fn into_new_plan(self, star_system_id: Uuid) -> NewSciencePlan {
        NewSciencePlan {
            creator: self.creator,
            submitter: self.submitter,
            funding: self.funding,
            objective: self.objective,
            star_system_id,
            schedule_start: self.schedule_start,
            schedule_end: self.schedule_end,
            telescope_location: self.telescope_location,
            file_type: self.file_type,
            file_quality: self.file_quality,
            image_mode: self.image_mode,
            exposure: self.exposure,
            contrast: self.contrast,
            brightness: self.brightness,
            saturation: self.saturation,
        }
    }
}

/// Every rule violation in `payload`, in check order. Empty means valid.
pub fn validate_plan_fields(payload: &PlanPayload) -> Vec<FieldViolation> {
    check(payload).0
}

/// Validate `payload` and return its typed fields, or every violation.
pub fn parse_plan_fields(payload: &PlanPayload) -> Result<PlanFields, Vec<FieldViolation>> {
    match check(payload) {
        (violations, Some(fields)) if violations.is_empty() => Ok(fields),
        (violations, _) => Err(violations),
    }
}

fn check(payload: &PlanPayload) -> (Vec<FieldViolation>, Option<PlanFields>) {
    let mut violations = Vec::new();

    for (name, value) in payload.required() {
        if present(value).is_none() {
            violations.push(FieldViolation::Missing(name));
        }
    }

    let objective = present(&payload.objective);
    if objective.is_some_and(|o| o.chars().count() > OBJECTIVE_MAX_CHARS) {
        violations.push(FieldViolation::ObjectiveTooLong);
    }

    let location = check_enum::<TelescopeLocation>(
        &payload.telescope_location,
        FieldViolation::InvalidTelescopeLocation,
        &mut violations,
    );
    let file_type =
        check_enum::<FileType>(&payload.file_type, FieldViolation::InvalidFileType, &mut violations);
    let file_quality = check_enum::<FileQuality>(
        &payload.file_quality,
        FieldViolation::InvalidFileQuality,
        &mut violations,
    );
    let image_mode = check_enum::<ImageMode>(
        &payload.image_mode,
        FieldViolation::InvalidImageMode,
        &mut violations,
    );

    let start = present(&payload.schedule_start).and_then(parse_timestamp);
    let end = present(&payload.schedule_end).and_then(parse_timestamp);
    match (start, end) {
        (Some(s), Some(e)) if s >= e => violations.push(FieldViolation::ScheduleOutOfOrder),
        (Some(_), Some(_)) => {}
        _ => violations.push(FieldViolation::InvalidScheduleFormat),
    }

    let mut dials = [0i32; 4];
    let mut dials_ok = true;
    for (slot, dial) in dials.iter_mut().zip(Dial::ALL) {
        match present(payload.dial(dial)).map(|s| s.parse::<i64>()) {
            Some(Ok(v)) if (Dial::MIN..=Dial::MAX).contains(&v) => {
                // Range-checked above.
                *slot = v as i32;
            }
            Some(Ok(_)) => {
                violations.push(FieldViolation::DialOutOfRange(dial));
                dials_ok = false;
            }
            _ => {
                violations.push(FieldViolation::DialNotInteger(dial));
                dials_ok = false;
            }
        }
    }

    let funding = match present(&payload.funding).and_then(parse_decimal) {
        Some(f) if f < 0.0 => {
            violations.push(FieldViolation::FundingNegative);
            None
        }
        Some(f) => Some(f),
        None => {
            violations.push(FieldViolation::FundingNotDecimal);
            None
        }
    };

    if !violations.is_empty() {
        debug!(count = violations.len(), "plan payload rejected");
        return (violations, None);
    }

    let text = |v: &Option<String>| present(v).unwrap_or_default().to_owned();
    let fields = match (location, file_type, file_quality, image_mode, start, end, funding) {
        (Some(loc), Some(ft), Some(fq), Some(mode), Some(s), Some(e), Some(f)) if dials_ok => {
            Some(PlanFields {
                creator: text(&payload.creator),
                submitter: text(&payload.submitter),
                funding: f,
                objective: text(&payload.objective),
                star_system: text(&payload.star_system),
                schedule_start: s,
                schedule_end: e,
                telescope_location: loc,
                file_type: ft,
                file_quality: fq,
                image_mode: mode,
                exposure: dials[0],
                contrast: dials[1],
                brightness: dials[2],
                saturation: dials[3],
            })
        }
        _ => None,
    };
    (violations, fields)
}

/// Parse a finite decimal number.
fn parse_decimal(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse RFC 3339, a zone-less `datetime-local` form, or a bare date.
/// Zone-less values are read as UTC; a bare date is midnight.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .map(|naive| naive.and_utc())
}
