use chrono::NaiveDate;

use crate::models::experience::ExperienceSelector;
use crate::models::slot::{InterviewMode, ResumeReference};

/// In-progress booking form state. Nothing here is validated until the draft
/// is submitted.
#[derive(Debug, Clone, Default)]
pub struct BookingDraft {
    pub job_role: String,
    pub date: Option<NaiveDate>,
    pub time_label: Option<String>,
    pub skills: Vec<String>,
    pub experience: ExperienceSelector,
    pub resume: Option<ResumeReference>,
    pub mode: InterviewMode,
}

impl BookingDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the skill if absent, removes it if present. Matching ignores
    /// surrounding whitespace but keeps the original casing.
    pub fn toggle_skill(&mut self, skill: &str) {
        let skill = skill.trim();
        if skill.is_empty() {
            return;
        }
        match self.skills.iter().position(|s| s == skill) {
            Some(idx) => {
                self.skills.remove(idx);
            }
            None => self.skills.push(skill.to_string()),
        }
    }
}
