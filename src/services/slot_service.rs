use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::models::session::SessionContext;
use crate::models::slot::{DisplayStatus, InterviewSlot, LifecycleLabel, SlotStatus};
use crate::services::notification_service::RefreshNotifier;
use crate::services::scheduling_service::SchedulingApi;
use crate::utils::time;

/// Derives the status shown on slot cards. Terminal server statuses win over
/// timestamps; everything else that has elapsed reads as expired.
pub fn classify(slot: &InterviewSlot, now: DateTime<Utc>) -> DisplayStatus {
    if slot.status.is_terminal() {
        return slot.status.into();
    }
    if slot.has_ended(now) {
        return DisplayStatus::Expired;
    }
    slot.status.into()
}

/// Actions a slot card offers. `WaitingForConfirmation` renders as a label,
/// not a button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotAction {
    Pay,
    Cancel,
    ViewDetails,
    JoinNow,
    WaitingForConfirmation,
}

/// Deterministic action table over `(payment_done, status, started, ended)`.
/// Cancelled and completed slots only offer details, regardless of payment
/// or timestamps.
pub fn action_set(slot: &InterviewSlot, now: DateTime<Utc>) -> Vec<SlotAction> {
    if slot.status.is_terminal() {
        return vec![SlotAction::ViewDetails];
    }

    let started = slot.has_started(now);
    let ended = slot.has_ended(now);

    if !slot.payment_done {
        // An elapsed unpaid slot can still be paid for, but no longer cancelled.
        return if ended {
            vec![SlotAction::Pay]
        } else {
            vec![SlotAction::Pay, SlotAction::Cancel]
        };
    }
    if ended {
        return vec![SlotAction::ViewDetails];
    }
    match slot.status {
        SlotStatus::Confirmed if started => {
            vec![SlotAction::JoinNow, SlotAction::ViewDetails, SlotAction::Cancel]
        }
        SlotStatus::Confirmed => vec![SlotAction::ViewDetails, SlotAction::Cancel],
        // Open and waiting slots sit in the matching queue.
        _ => vec![SlotAction::WaitingForConfirmation, SlotAction::Cancel],
    }
}

/// A slot bundled with everything a card needs, derived once per render.
#[derive(Debug, Clone)]
pub struct SlotView {
    pub slot: InterviewSlot,
    pub display_status: DisplayStatus,
    pub lifecycle: LifecycleLabel,
    pub actions: Vec<SlotAction>,
}

impl SlotView {
    pub fn derive(slot: InterviewSlot, now: DateTime<Utc>) -> Self {
        let display_status = classify(&slot, now);
        let lifecycle = slot.lifecycle_label(now);
        let actions = action_set(&slot, now);
        Self {
            slot,
            display_status,
            lifecycle,
            actions,
        }
    }
}

/// Splits a fetched list into the upcoming and past collections. Upcoming
/// holds non-terminal slots that start strictly later than now, soonest
/// first; everything else lands in past, most recently concluded first.
pub fn partition_slots(
    slots: Vec<InterviewSlot>,
    now: DateTime<Utc>,
) -> (Vec<SlotView>, Vec<SlotView>) {
    let mut upcoming = Vec::new();
    let mut past = Vec::new();

    for slot in slots {
        let view = SlotView::derive(slot, now);
        let starts_later = view.slot.start_utc.map_or(false, |start| start > now);
        if !view.display_status.is_terminal() && starts_later {
            upcoming.push(view);
        } else {
            past.push(view);
        }
    }

    upcoming.sort_by_key(|v| v.slot.start_utc);
    past.sort_by_key(|v| std::cmp::Reverse(v.slot.end_utc.or(v.slot.start_utc)));
    (upcoming, past)
}

/// Histogram of display statuses for list badges.
pub fn status_counts(views: &[SlotView]) -> HashMap<DisplayStatus, usize> {
    let mut counts = HashMap::new();
    for view in views {
        *counts.entry(view.display_status).or_insert(0) += 1;
    }
    counts
}

#[derive(Clone)]
pub struct SlotService {
    api: Arc<dyn SchedulingApi>,
    notifier: RefreshNotifier,
}

impl SlotService {
    pub fn new(api: Arc<dyn SchedulingApi>, notifier: RefreshNotifier) -> Self {
        Self { api, notifier }
    }

    pub async fn upcoming_and_past(
        &self,
        ctx: &SessionContext,
    ) -> Result<(Vec<SlotView>, Vec<SlotView>)> {
        let slots = self.api.slots_by_user(ctx).await?;
        Ok(partition_slots(slots, time::now()))
    }

    pub async fn slot_view(&self, ctx: &SessionContext, slot_id: &str) -> Result<SlotView> {
        let slot = self.api.slot_by_id(ctx, slot_id).await?;
        Ok(SlotView::derive(slot, time::now()))
    }

    /// Cancels a slot from the list views. Slots that already elapsed or
    /// reached a terminal status are refused; the card would not have offered
    /// the action, so a request like that means the view went stale.
    pub async fn cancel_slot(&self, ctx: &SessionContext, slot_id: &str) -> Result<()> {
        if slot_id.trim().is_empty() {
            warn!("Cancel requested without a slot id, ignoring");
            return Ok(());
        }

        let slot = self.api.slot_by_id(ctx, slot_id).await?;
        let now = time::now();
        let status = classify(&slot, now);
        if status.is_terminal() {
            return Err(Error::BadRequest(format!(
                "Cannot cancel a slot with status '{}'",
                status.as_str()
            )));
        }

        self.api
            .update_slot_status(ctx, slot_id, SlotStatus::Cancelled)
            .await?;
        info!("Interview slot {} cancelled", slot_id);
        self.notifier.booking_cancelled(slot_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::experience::Experience;
    use crate::models::slot::{InterviewMode, ResumeReference};
    use chrono::Duration;

    fn base_slot(id: &str) -> InterviewSlot {
        InterviewSlot {
            id: id.to_string(),
            start_utc: None,
            end_utc: None,
            job_role: "QA Engineer".to_string(),
            experience: Experience { years: 2, months: 0 },
            skills: vec!["Selenium".to_string()],
            resume_reference: ResumeReference::Default,
            mode: InterviewMode::Online,
            payment_done: false,
            status: SlotStatus::Open,
            interview_code: None,
        }
    }

    fn slot_at(id: &str, status: SlotStatus, start_offset_min: i64, now: DateTime<Utc>) -> InterviewSlot {
        let start = now + Duration::minutes(start_offset_min);
        InterviewSlot {
            start_utc: Some(start),
            end_utc: Some(start + Duration::hours(1)),
            status,
            ..base_slot(id)
        }
    }

    #[test]
    fn terminal_statuses_win_over_timestamps() {
        let now = time::now();
        // Cancelled with an end an hour in the future stays cancelled.
        let cancelled = slot_at("a", SlotStatus::Cancelled, 1, now);
        assert_eq!(classify(&cancelled, now), DisplayStatus::Cancelled);

        let completed = slot_at("b", SlotStatus::Completed, -120, now);
        assert_eq!(classify(&completed, now), DisplayStatus::Completed);
    }

    #[test]
    fn elapsed_non_terminal_slots_read_as_expired() {
        let now = time::now();
        for status in [SlotStatus::Open, SlotStatus::Waiting, SlotStatus::Confirmed] {
            let slot = slot_at("a", status, -180, now);
            assert_eq!(classify(&slot, now), DisplayStatus::Expired);
        }

        // End missing: the start alone decides.
        let mut slot = base_slot("b");
        slot.status = SlotStatus::Confirmed;
        slot.start_utc = Some(now - Duration::minutes(5));
        assert_eq!(classify(&slot, now), DisplayStatus::Expired);

        // No timestamps at all never expires.
        let bare = base_slot("c");
        assert_eq!(classify(&bare, now), DisplayStatus::Open);
    }

    #[test]
    fn future_slots_keep_their_server_status() {
        let now = time::now();
        let slot = slot_at("a", SlotStatus::Waiting, 60, now);
        assert_eq!(classify(&slot, now), DisplayStatus::Waiting);
    }

    #[test]
    fn unpaid_slots_offer_pay_and_conditionally_cancel() {
        let now = time::now();
        let mut upcoming = slot_at("a", SlotStatus::Open, 60, now);
        upcoming.payment_done = false;
        assert_eq!(
            action_set(&upcoming, now),
            vec![SlotAction::Pay, SlotAction::Cancel]
        );

        let mut elapsed = slot_at("b", SlotStatus::Open, -120, now);
        elapsed.payment_done = false;
        assert_eq!(action_set(&elapsed, now), vec![SlotAction::Pay]);
    }

    #[test]
    fn paid_slots_follow_the_status_rows() {
        let now = time::now();

        let mut waiting = slot_at("a", SlotStatus::Waiting, 60, now);
        waiting.payment_done = true;
        assert_eq!(
            action_set(&waiting, now),
            vec![SlotAction::WaitingForConfirmation, SlotAction::Cancel]
        );

        let mut confirmed = slot_at("b", SlotStatus::Confirmed, 60, now);
        confirmed.payment_done = true;
        assert_eq!(
            action_set(&confirmed, now),
            vec![SlotAction::ViewDetails, SlotAction::Cancel]
        );

        let mut ongoing = slot_at("c", SlotStatus::Confirmed, -10, now);
        ongoing.payment_done = true;
        assert_eq!(
            action_set(&ongoing, now),
            vec![SlotAction::JoinNow, SlotAction::ViewDetails, SlotAction::Cancel]
        );

        let mut ended = slot_at("d", SlotStatus::Confirmed, -180, now);
        ended.payment_done = true;
        assert_eq!(action_set(&ended, now), vec![SlotAction::ViewDetails]);

        let mut cancelled = slot_at("e", SlotStatus::Cancelled, 60, now);
        cancelled.payment_done = true;
        assert_eq!(action_set(&cancelled, now), vec![SlotAction::ViewDetails]);
    }

    #[test]
    fn terminal_slots_collapse_to_details_regardless_of_payment() {
        let now = time::now();

        // Cancelled before payment: the server status is terminal while the
        // start still lies a day ahead.
        let mut cancelled_unpaid = slot_at("a", SlotStatus::Cancelled, 24 * 60, now);
        cancelled_unpaid.payment_done = false;
        assert_eq!(
            action_set(&cancelled_unpaid, now),
            vec![SlotAction::ViewDetails]
        );

        let mut completed_unpaid = slot_at("b", SlotStatus::Completed, -180, now);
        completed_unpaid.payment_done = false;
        assert_eq!(
            action_set(&completed_unpaid, now),
            vec![SlotAction::ViewDetails]
        );
    }

    #[test]
    fn partitions_split_and_order_by_time() {
        let now = time::now();
        let slots = vec![
            slot_at("soon", SlotStatus::Open, 60, now),
            slot_at("later", SlotStatus::Confirmed, 24 * 60, now),
            slot_at("done", SlotStatus::Completed, -5 * 60, now),
            slot_at("old", SlotStatus::Open, -48 * 60, now),
            slot_at("cancelled", SlotStatus::Cancelled, 90, now),
        ];

        let (upcoming, past) = partition_slots(slots, now);

        let upcoming_ids: Vec<&str> = upcoming.iter().map(|v| v.slot.id.as_str()).collect();
        assert_eq!(upcoming_ids, vec!["soon", "later"]);

        // Most recently concluded first; the cancelled future slot sorts by
        // its end and therefore leads.
        let past_ids: Vec<&str> = past.iter().map(|v| v.slot.id.as_str()).collect();
        assert_eq!(past_ids, vec!["cancelled", "done", "old"]);
        assert_eq!(past[1].display_status, DisplayStatus::Completed);
        assert_eq!(past[2].display_status, DisplayStatus::Expired);
    }

    #[test]
    fn ongoing_slots_land_in_past_with_join_now() {
        let now = time::now();
        let mut ongoing = slot_at("live", SlotStatus::Confirmed, -10, now);
        ongoing.payment_done = true;

        let (upcoming, past) = partition_slots(vec![ongoing], now);
        assert!(upcoming.is_empty());
        assert_eq!(past.len(), 1);
        assert_eq!(past[0].lifecycle, LifecycleLabel::Ongoing);
        assert!(past[0].actions.contains(&SlotAction::JoinNow));
    }

    #[test]
    fn status_counts_builds_a_histogram() {
        let now = time::now();
        let slots = vec![
            slot_at("a", SlotStatus::Open, 60, now),
            slot_at("b", SlotStatus::Open, 120, now),
            slot_at("c", SlotStatus::Completed, -300, now),
        ];
        let views: Vec<SlotView> = slots
            .into_iter()
            .map(|s| SlotView::derive(s, now))
            .collect();

        let counts = status_counts(&views);
        assert_eq!(counts.get(&DisplayStatus::Open), Some(&2));
        assert_eq!(counts.get(&DisplayStatus::Completed), Some(&1));
        assert_eq!(counts.get(&DisplayStatus::Expired), None);
    }
}
