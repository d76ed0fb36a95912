use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::experience::Experience;

/// Wire marker the backend stores when the user books with their default
/// resume instead of a template or an uploaded file.
pub const DEFAULT_RESUME_MARKER: &str = "DEFAULT_RESUME_0";

/// Server-authoritative slot status. Distinct from the client-derived
/// [`DisplayStatus`], which folds timestamps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Open,
    Waiting,
    Confirmed,
    Cancelled,
    Completed,
}

impl SlotStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotStatus::Open => "open",
            SlotStatus::Waiting => "waiting",
            SlotStatus::Confirmed => "confirmed",
            SlotStatus::Cancelled => "cancelled",
            SlotStatus::Completed => "completed",
        }
    }

    /// Parses a status string from the backend, which is not consistent
    /// about casing and uses both spellings of "cancelled".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Some(SlotStatus::Open),
            "waiting" => Some(SlotStatus::Waiting),
            "confirmed" => Some(SlotStatus::Confirmed),
            "cancelled" | "canceled" => Some(SlotStatus::Cancelled),
            "completed" => Some(SlotStatus::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SlotStatus::Cancelled | SlotStatus::Completed)
    }
}

/// Status shown on slot cards: the server status plus the derived
/// `Expired` value for slots that elapsed before reaching a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayStatus {
    Open,
    Waiting,
    Confirmed,
    Cancelled,
    Completed,
    Expired,
}

impl DisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayStatus::Open => "open",
            DisplayStatus::Waiting => "waiting",
            DisplayStatus::Confirmed => "confirmed",
            DisplayStatus::Cancelled => "cancelled",
            DisplayStatus::Completed => "completed",
            DisplayStatus::Expired => "expired",
        }
    }

    /// Capitalized form for status chips.
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::Open => "Open",
            DisplayStatus::Waiting => "Waiting",
            DisplayStatus::Confirmed => "Confirmed",
            DisplayStatus::Cancelled => "Cancelled",
            DisplayStatus::Completed => "Completed",
            DisplayStatus::Expired => "Expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DisplayStatus::Cancelled | DisplayStatus::Completed | DisplayStatus::Expired
        )
    }
}

impl From<SlotStatus> for DisplayStatus {
    fn from(status: SlotStatus) -> Self {
        match status {
            SlotStatus::Open => DisplayStatus::Open,
            SlotStatus::Waiting => DisplayStatus::Waiting,
            SlotStatus::Confirmed => DisplayStatus::Confirmed,
            SlotStatus::Cancelled => DisplayStatus::Cancelled,
            SlotStatus::Completed => DisplayStatus::Completed,
        }
    }
}

/// Purely time-derived position of a slot relative to "now". Combined with
/// the server status for display, never shown on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleLabel {
    Upcoming,
    Ongoing,
    Ended,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    #[default]
    Online,
    Offline,
}

impl InterviewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewMode::Online => "online",
            InterviewMode::Offline => "offline",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Some(InterviewMode::Online),
            "offline" => Some(InterviewMode::Offline),
            _ => None,
        }
    }
}

/// Which resume backs the booking. Exactly one is authoritative; on the wire
/// all three collapse into a single string field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ResumeReference {
    /// Identifier of a resume built from one of the site templates.
    Template(String),
    /// URL of a file the user uploaded.
    Upload(String),
    /// The account's default resume.
    Default,
}

impl ResumeReference {
    pub fn as_wire(&self) -> String {
        match self {
            ResumeReference::Template(id) => id.clone(),
            ResumeReference::Upload(url) => url.clone(),
            ResumeReference::Default => DEFAULT_RESUME_MARKER.to_string(),
        }
    }

    pub fn from_wire(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("DEFAULT_RESUME_") {
            ResumeReference::Default
        } else if trimmed.contains("://") || trimmed.starts_with("/uploads") {
            ResumeReference::Upload(trimmed.to_string())
        } else {
            ResumeReference::Template(trimmed.to_string())
        }
    }
}

impl From<String> for ResumeReference {
    fn from(raw: String) -> Self {
        ResumeReference::from_wire(&raw)
    }
}

impl From<ResumeReference> for String {
    fn from(reference: ResumeReference) -> Self {
        reference.as_wire()
    }
}

/// Canonical slot shape after normalization. The scheduling backend owns the
/// record; this is the client's read-through copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSlot {
    pub id: String,
    pub start_utc: Option<DateTime<Utc>>,
    pub end_utc: Option<DateTime<Utc>>,
    pub job_role: String,
    pub experience: Experience,
    pub skills: Vec<String>,
    pub resume_reference: ResumeReference,
    pub mode: InterviewMode,
    pub payment_done: bool,
    pub status: SlotStatus,
    pub interview_code: Option<String>,
}

impl InterviewSlot {
    pub fn has_started(&self, now: DateTime<Utc>) -> bool {
        self.start_utc.map_or(false, |start| start <= now)
    }

    /// Whether the slot window has elapsed. Falls back to the start time when
    /// the end is missing; a slot with no timestamps never reads as ended.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        match (self.end_utc, self.start_utc) {
            (Some(end), _) => end < now,
            (None, Some(start)) => start < now,
            (None, None) => false,
        }
    }

    pub fn lifecycle_label(&self, now: DateTime<Utc>) -> LifecycleLabel {
        match (self.start_utc, self.end_utc) {
            (Some(start), Some(end)) => {
                if now >= end {
                    LifecycleLabel::Ended
                } else if now >= start {
                    LifecycleLabel::Ongoing
                } else {
                    LifecycleLabel::Upcoming
                }
            }
            (Some(start), None) => {
                if now >= start {
                    LifecycleLabel::Ongoing
                } else {
                    LifecycleLabel::Upcoming
                }
            }
            _ => LifecycleLabel::Upcoming,
        }
    }
}
