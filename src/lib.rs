pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::models::session::SessionContext;
use crate::models::slot::InterviewSlot;
use crate::services::booking_service::BookingSession;
use crate::services::countdown_service::{CountdownHandle, CountdownTimer};
use crate::services::notification_service::{RefreshEvent, RefreshNotifier};
use crate::services::schedule_service::{self, DateSlotCandidate};
use crate::services::scheduling_service::{HttpSchedulingApi, SchedulingApi};
use crate::services::slot_service::SlotService;
use crate::utils::time;

/// Everything a host needs to run the booking flow: the scheduling
/// collaborator, slot list views, booking sessions, and the refresh bus.
#[derive(Clone)]
pub struct BookingEngine {
    api: Arc<dyn SchedulingApi>,
    slot_service: SlotService,
    notifier: RefreshNotifier,
    booking_fee: Decimal,
    booking_window_days: usize,
}

impl BookingEngine {
    /// Builds the engine from the initialized configuration, with a shared
    /// HTTP client talking to the real scheduling backend.
    pub fn new() -> Result<Self> {
        let config = crate::config::get_config();
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;
        let api: Arc<dyn SchedulingApi> = Arc::new(HttpSchedulingApi::new(
            client,
            config.scheduling_api_url.clone(),
        ));
        Ok(Self::with_api(
            api,
            config.booking_fee,
            config.booking_window_days,
        ))
    }

    /// Wires the engine around any collaborator; hosts and tests inject
    /// their own implementations here.
    pub fn with_api(
        api: Arc<dyn SchedulingApi>,
        booking_fee: Decimal,
        booking_window_days: usize,
    ) -> Self {
        let notifier = RefreshNotifier::new();
        let slot_service = SlotService::new(api.clone(), notifier.clone());
        Self {
            api,
            slot_service,
            notifier,
            booking_fee,
            booking_window_days,
        }
    }

    /// Starts one booking flow for the given user.
    pub fn start_session(&self, ctx: SessionContext) -> BookingSession {
        BookingSession::new(
            ctx,
            self.api.clone(),
            self.notifier.clone(),
            self.booking_fee,
        )
    }

    pub fn slots(&self) -> &SlotService {
        &self.slot_service
    }

    pub fn subscribe_refresh(&self) -> broadcast::Receiver<RefreshEvent> {
        self.notifier.subscribe()
    }

    /// The offerable days of the rolling window, computed from the local
    /// clock right now.
    pub fn date_candidates(&self) -> Vec<DateSlotCandidate> {
        let (today, now_time) = time::local_date_and_time();
        schedule_service::date_candidates(today, now_time, self.booking_window_days)
    }

    pub fn countdown_for(&self, slot: &InterviewSlot) -> CountdownHandle {
        CountdownTimer::start(slot.start_utc, slot.end_utc)
    }

    pub fn booking_fee(&self) -> Decimal {
        self.booking_fee
    }
}
