use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;
use validator::Validate;

use crate::models::experience::{Experience, MAX_EXPERIENCE_MONTHS, MAX_EXPERIENCE_YEARS};
use crate::models::slot::{InterviewMode, InterviewSlot, ResumeReference, SlotStatus};
use crate::utils::time;

/// Outbound payload for slot creation. Dates go as `YYYY-MM-DD`, times as
/// 24-hour `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSlotRequest {
    #[validate(length(min = 1, message = "Job role cannot be empty"))]
    pub job_role: String,
    pub experience_years: u8,
    pub experience_months: u8,
    #[validate(length(min = 1, message = "At least one skill is required"))]
    pub skills: Vec<String>,
    #[validate(length(min = 1, message = "Resume reference cannot be empty"))]
    pub resume_url: String,
    #[validate(length(min = 1, message = "Date must be provided"))]
    pub date: String,
    #[validate(length(min = 1, message = "Time must be provided"))]
    pub time: String,
    pub mode: InterviewMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatedSlot {
    #[serde(
        alias = "slotId",
        alias = "id",
        alias = "_id",
        deserialize_with = "deserialize_string_flexible"
    )]
    pub slot_id: String,
}

/// Error body shapes seen from the scheduling backend. Some endpoints send
/// `{"error": "..."}`, others `{"code": "...", "message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiErrorBody {
    pub code: Option<String>,
    #[serde(alias = "error", alias = "msg")]
    pub message: Option<String>,
}

/// Slot record as the backend actually returns it. Field names and types
/// vary between endpoints, so everything is optional here and collapsed into
/// the canonical [`InterviewSlot`] by [`normalize_slot`] in one place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSlotRecord {
    #[serde(
        alias = "_id",
        alias = "slotId",
        alias = "slot_id",
        deserialize_with = "deserialize_opt_string_flexible"
    )]
    pub id: Option<String>,
    #[serde(alias = "start_utc", alias = "startTime", alias = "start")]
    pub start_time: Option<String>,
    #[serde(alias = "end_utc", alias = "endTime", alias = "end")]
    pub end_time: Option<String>,
    #[serde(alias = "jobRole", alias = "role")]
    pub job_role: Option<String>,
    #[serde(
        alias = "experienceYears",
        alias = "years",
        deserialize_with = "deserialize_opt_int_flexible"
    )]
    pub experience_years: Option<i64>,
    #[serde(
        alias = "experienceMonths",
        alias = "months",
        deserialize_with = "deserialize_opt_int_flexible"
    )]
    pub experience_months: Option<i64>,
    pub skills: Option<Vec<String>>,
    #[serde(alias = "resumeUrl", alias = "resume")]
    pub resume_url: Option<String>,
    pub mode: Option<String>,
    #[serde(
        alias = "paymentDone",
        alias = "paid",
        deserialize_with = "deserialize_opt_bool_flexible"
    )]
    pub payment_done: Option<bool>,
    pub status: Option<String>,
    #[serde(alias = "interviewCode", alias = "code")]
    pub interview_code: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Collapses a raw backend record into the canonical slot shape. Unparseable
/// values degrade to safe defaults instead of failing the whole listing.
pub fn normalize_slot(raw: RawSlotRecord) -> InterviewSlot {
    let start_utc = parse_timestamp_field(raw.start_time.as_deref(), "start")
        .or_else(|| compose_start(raw.date.as_deref(), raw.time.as_deref()));
    let end_utc = parse_timestamp_field(raw.end_time.as_deref(), "end");

    let status = match raw.status.as_deref() {
        Some(s) => SlotStatus::parse(s).unwrap_or_else(|| {
            warn!("Unknown slot status '{}' from backend, treating as open", s);
            SlotStatus::Open
        }),
        None => SlotStatus::Open,
    };

    let experience = Experience {
        years: clamp_component(raw.experience_years, MAX_EXPERIENCE_YEARS),
        months: clamp_component(raw.experience_months, MAX_EXPERIENCE_MONTHS),
    };

    let mut skills: Vec<String> = Vec::new();
    for skill in raw.skills.unwrap_or_default() {
        let trimmed = skill.trim();
        if !trimmed.is_empty() && !skills.iter().any(|s| s == trimmed) {
            skills.push(trimmed.to_string());
        }
    }

    InterviewSlot {
        id: raw.id.map(|s| s.trim().to_string()).unwrap_or_default(),
        start_utc,
        end_utc,
        job_role: raw.job_role.map(|s| s.trim().to_string()).unwrap_or_default(),
        experience,
        skills,
        resume_reference: raw
            .resume_url
            .as_deref()
            .map(ResumeReference::from_wire)
            .unwrap_or(ResumeReference::Default),
        mode: raw
            .mode
            .as_deref()
            .and_then(InterviewMode::parse)
            .unwrap_or_default(),
        payment_done: raw.payment_done.unwrap_or(false),
        status,
        interview_code: raw.interview_code.and_then(|c| {
            let trimmed = c.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }),
    }
}

fn parse_timestamp_field(raw: Option<&str>, field: &'static str) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = time::parse_instant(raw);
    if parsed.is_none() {
        warn!("Ignoring unparseable slot {} timestamp '{}'", field, raw);
    }
    parsed
}

// Some endpoints echo the booking's date/time pair instead of a combined
// timestamp. The pair is treated as UTC; no end instant is invented.
fn compose_start(date: Option<&str>, time_of_day: Option<&str>) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date?.trim(), "%Y-%m-%d").ok()?;
    let time_of_day = NaiveTime::parse_from_str(time_of_day?.trim(), "%H:%M").ok()?;
    Some(date.and_time(time_of_day).and_utc())
}

fn clamp_component(value: Option<i64>, max: u8) -> u8 {
    value.unwrap_or(0).clamp(0, max as i64) as u8
}

// Ids arrive as strings from some endpoints and numbers from others.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Uint(u64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Uint(u) => u.to_string(),
        }
    }
}

fn deserialize_string_flexible<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrNumber::deserialize(deserializer)?.into_string())
}

fn deserialize_opt_string_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(value.map(StringOrNumber::into_string))
}

fn deserialize_opt_int_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IntOrString {
        Int(i64),
        String(String),
    }

    match Option::<IntOrString>::deserialize(deserializer)? {
        Some(IntOrString::Int(i)) => Ok(Some(i)),
        Some(IntOrString::String(s)) => Ok(s.trim().parse().ok()),
        None => Ok(None),
    }
}

fn deserialize_opt_bool_flexible<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrInt {
        Bool(bool),
        Int(i64),
        String(String),
    }

    match Option::<BoolOrInt>::deserialize(deserializer)? {
        Some(BoolOrInt::Bool(b)) => Ok(Some(b)),
        Some(BoolOrInt::Int(i)) => Ok(Some(i != 0)),
        Some(BoolOrInt::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(Some(true)),
            "false" | "0" | "no" | "" => Ok(Some(false)),
            _ => Ok(None),
        },
        None => Ok(None),
    }
}
