use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::dto::scheduling_dto::CreateSlotRequest;
use crate::error::{Error, Result, ValidationReport};
use crate::models::draft::BookingDraft;
use crate::models::session::SessionContext;
use crate::models::slot::SlotStatus;
use crate::services::notification_service::RefreshNotifier;
use crate::services::schedule_service;
use crate::services::scheduling_service::SchedulingApi;
use crate::utils::time;

/// Placeholder the role picker falls back to when the profile lookup found
/// nothing. Never a bookable role.
pub const ROLE_NOT_FOUND_SENTINEL: &str = "Role not found";

/// Error code newer backend deployments attach to slot conflicts.
pub const SLOT_CONFLICT_CODE: &str = "SLOT_CONFLICT";

/// Where one booking currently is. Request-scoped data rides inside the
/// variant, so a payment confirmation without a created slot cannot be
/// expressed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Form,
    Submitting,
    AwaitingPayment { slot_id: String },
    Confirming { slot_id: String },
    Confirmed { slot_id: String },
    Cancelled,
}

impl LifecycleState {
    /// A request is in flight; every other call is swallowed until it lands.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            LifecycleState::Submitting | LifecycleState::Confirming { .. }
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            LifecycleState::Confirmed { .. } | LifecycleState::Cancelled
        )
    }

    pub fn slot_id(&self) -> Option<&str> {
        match self {
            LifecycleState::AwaitingPayment { slot_id }
            | LifecycleState::Confirming { slot_id }
            | LifecycleState::Confirmed { slot_id } => Some(slot_id),
            _ => None,
        }
    }
}

/// One booking flow for one user session: create, pay, confirm, cancel.
/// Exclusive access through `&mut self` keeps at most one request in flight.
pub struct BookingSession {
    ctx: SessionContext,
    api: Arc<dyn SchedulingApi>,
    notifier: RefreshNotifier,
    booking_fee: Decimal,
    state: LifecycleState,
}

impl BookingSession {
    pub fn new(
        ctx: SessionContext,
        api: Arc<dyn SchedulingApi>,
        notifier: RefreshNotifier,
        booking_fee: Decimal,
    ) -> Self {
        Self {
            ctx,
            api,
            notifier,
            booking_fee,
            state: LifecycleState::Form,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn slot_id(&self) -> Option<&str> {
        self.state.slot_id()
    }

    /// Checks every rule and reports all failures at once, so the form can
    /// mark each missing field in a single pass.
    pub fn validate_draft(
        draft: &BookingDraft,
        today: NaiveDate,
        now_time: NaiveTime,
    ) -> ValidationReport {
        let mut report = ValidationReport::new();

        let role = draft.job_role.trim();
        if role.is_empty() || role == ROLE_NOT_FOUND_SENTINEL {
            report.push("Please select a job role");
        }
        if draft.date.is_none() {
            report.push("Please select an interview date");
        }
        let label = draft.time_label.as_deref().map(str::trim).unwrap_or("");
        if label.is_empty() {
            report.push("Please select a time slot");
        }
        if let Some(day) = draft.date {
            if !label.is_empty()
                && !schedule_service::is_time_selectable(day, label, today, now_time)
            {
                report.push("Selected time is no longer available. Please choose an upcoming slot.");
            }
        }
        if draft.skills.iter().all(|s| s.trim().is_empty()) {
            report.push("Please select at least one skill");
        }
        if !draft.experience.is_explicit() {
            report.push("Please select your experience");
        }
        if draft.resume.is_none() {
            report.push("Please select a resume");
        }
        report
    }

    /// Validates the draft and creates the slot. On success the machine
    /// advances to `AwaitingPayment`; on failure it returns to `Form` with
    /// the draft untouched so the user can correct and resubmit.
    pub async fn submit(&mut self, draft: &BookingDraft) -> Result<()> {
        match &self.state {
            LifecycleState::Form => {}
            state if state.is_busy() => {
                warn!("Submit ignored while a request is in flight");
                return Ok(());
            }
            state => {
                warn!("Submit ignored in state {:?}", state);
                return Ok(());
            }
        }

        let (today, now_time) = time::local_date_and_time();
        Self::validate_draft(draft, today, now_time).into_result()?;
        let payload = build_create_request(draft)?;

        self.state = LifecycleState::Submitting;
        info!("Submitting interview booking for user {}", self.ctx.user_id);

        match self.api.create_slot(&self.ctx, &payload).await {
            Ok(created) => {
                info!("Slot {} created, awaiting payment", created.slot_id);
                self.notifier.booking_created(&created.slot_id);
                self.state = LifecycleState::AwaitingPayment {
                    slot_id: created.slot_id,
                };
                Ok(())
            }
            Err(err) => {
                self.state = LifecycleState::Form;
                Err(map_scheduling_error(err))
            }
        }
    }

    /// Confirms payment for the created slot. Failure keeps the machine in
    /// `AwaitingPayment` so the user can retry.
    pub async fn confirm_payment(&mut self) -> Result<()> {
        let slot_id = match &self.state {
            LifecycleState::AwaitingPayment { slot_id } => slot_id.clone(),
            state if state.is_busy() => {
                warn!("Payment confirmation ignored while a request is in flight");
                return Ok(());
            }
            state => {
                warn!("Payment confirmation ignored in state {:?}", state);
                return Ok(());
            }
        };

        self.state = LifecycleState::Confirming {
            slot_id: slot_id.clone(),
        };

        match self
            .api
            .confirm_payment(&self.ctx, &slot_id, Some(self.booking_fee))
            .await
        {
            Ok(()) => {
                info!("Payment confirmed for slot {}", slot_id);
                self.state = LifecycleState::Confirmed { slot_id };
                Ok(())
            }
            Err(err) => {
                self.state = LifecycleState::AwaitingPayment { slot_id };
                Err(map_scheduling_error(err))
            }
        }
    }

    /// Abandons the booking. Before anything was created this is purely
    /// local; with a created slot the backend is told first, and a failure
    /// there leaves the state untouched for a retry.
    pub async fn cancel(&mut self) -> Result<()> {
        if self.state.is_busy() {
            warn!("Cancel ignored while a request is in flight");
            return Ok(());
        }

        match self.state.clone() {
            LifecycleState::Form => {
                self.state = LifecycleState::Cancelled;
                Ok(())
            }
            LifecycleState::AwaitingPayment { slot_id } => {
                self.api
                    .update_slot_status(&self.ctx, &slot_id, SlotStatus::Cancelled)
                    .await
                    .map_err(map_scheduling_error)?;
                info!("Booking {} cancelled before payment", slot_id);
                self.notifier.booking_cancelled(&slot_id);
                self.state = LifecycleState::Cancelled;
                Ok(())
            }
            LifecycleState::Cancelled => Ok(()),
            state => {
                warn!("Cancel ignored in state {:?}", state);
                Ok(())
            }
        }
    }

    #[cfg(test)]
    fn force_state(&mut self, state: LifecycleState) {
        self.state = state;
    }
}

fn build_create_request(draft: &BookingDraft) -> Result<CreateSlotRequest> {
    let day = draft
        .date
        .ok_or_else(|| Error::BadRequest("Booking draft has no date".to_string()))?;
    let label = draft
        .time_label
        .as_deref()
        .ok_or_else(|| Error::BadRequest("Booking draft has no time".to_string()))?;
    let wire_time = schedule_service::label_to_wire(label)
        .ok_or_else(|| Error::BadRequest(format!("Unrecognized time label '{}'", label)))?;
    let resume = draft
        .resume
        .clone()
        .ok_or_else(|| Error::BadRequest("Booking draft has no resume".to_string()))?;

    let experience = draft.experience.experience();
    let skills = draft
        .skills
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    Ok(CreateSlotRequest {
        job_role: draft.job_role.trim().to_string(),
        experience_years: experience.years,
        experience_months: experience.months,
        skills,
        resume_url: resume.as_wire(),
        date: day.format("%Y-%m-%d").to_string(),
        time: wire_time,
        mode: draft.mode,
    })
}

/// Folds backend failures into the booking error taxonomy. Conflicts are
/// recognized by the structured code when present, otherwise by the known
/// message shapes (including the backend's misspelled "alredy booked").
pub fn map_scheduling_error(err: Error) -> Error {
    if let Error::Api { code, message, .. } = &err {
        let coded = code.as_deref() == Some(SLOT_CONFLICT_CODE);
        if coded || is_conflict_message(message) {
            return Error::SlotConflict {
                server_message: message.clone(),
            };
        }
    }
    err
}

fn is_conflict_message(message: &str) -> bool {
    let m = message.to_ascii_lowercase();
    m.contains("slot") && (m.contains("already") || m.contains("alredy") || m.contains("overlap"))
}

/// Fixed booking fee the way the payment sheet prints it.
pub fn display_amount(amount: Decimal) -> String {
    format!("₹{:.2}", amount)
}
