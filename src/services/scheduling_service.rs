use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};
use validator::Validate;

#[cfg(test)]
use mockall::automock;

use crate::dto::scheduling_dto::{
    normalize_slot, ApiErrorBody, CreateSlotRequest, CreatedSlot, RawSlotRecord,
};
use crate::error::{Error, Result};
use crate::models::session::SessionContext;
use crate::models::slot::{InterviewSlot, SlotStatus};

/// The scheduling backend as the engine sees it. One implementation talks
/// HTTP; tests substitute their own.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SchedulingApi: Send + Sync {
    async fn create_slot(
        &self,
        ctx: &SessionContext,
        payload: &CreateSlotRequest,
    ) -> Result<CreatedSlot>;

    async fn confirm_payment(
        &self,
        ctx: &SessionContext,
        slot_id: &str,
        amount: Option<Decimal>,
    ) -> Result<()>;

    async fn update_slot_status(
        &self,
        ctx: &SessionContext,
        slot_id: &str,
        status: SlotStatus,
    ) -> Result<()>;

    async fn slots_by_user(&self, ctx: &SessionContext) -> Result<Vec<InterviewSlot>>;

    async fn slot_by_id(&self, ctx: &SessionContext, slot_id: &str) -> Result<InterviewSlot>;
}

#[derive(Clone)]
pub struct HttpSchedulingApi {
    client: Client,
    base_url: String,
}

impl HttpSchedulingApi {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn slots_url(&self, ctx: &SessionContext) -> String {
        format!("{}/api/users/{}/slots", self.base_url, ctx.user_id)
    }

    async fn error_from_response(response: Response) -> Error {
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => Error::Api {
                status,
                code: body.code,
                message: body.message.unwrap_or(text),
            },
            Err(_) => Error::Api {
                status,
                code: None,
                message: text,
            },
        }
    }
}

#[async_trait]
impl SchedulingApi for HttpSchedulingApi {
    async fn create_slot(
        &self,
        ctx: &SessionContext,
        payload: &CreateSlotRequest,
    ) -> Result<CreatedSlot> {
        payload.validate()?;
        info!(
            "Creating interview slot for user {} on {} at {}",
            ctx.user_id, payload.date, payload.time
        );

        let response = self
            .client
            .post(self.slots_url(ctx))
            .bearer_auth(&ctx.token)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = Self::error_from_response(response).await;
            warn!("Slot creation rejected: {}", err);
            return Err(err);
        }
        Ok(response.json::<CreatedSlot>().await?)
    }

    async fn confirm_payment(
        &self,
        ctx: &SessionContext,
        slot_id: &str,
        amount: Option<Decimal>,
    ) -> Result<()> {
        let url = format!("{}/{}/payment", self.slots_url(ctx), slot_id);
        let response = self
            .client
            .post(url)
            .bearer_auth(&ctx.token)
            .json(&json!({ "amount": amount }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        info!("Payment confirmed for slot {}", slot_id);
        Ok(())
    }

    async fn update_slot_status(
        &self,
        ctx: &SessionContext,
        slot_id: &str,
        status: SlotStatus,
    ) -> Result<()> {
        let url = format!("{}/{}/status", self.slots_url(ctx), slot_id);
        let response = self
            .client
            .patch(url)
            .bearer_auth(&ctx.token)
            .json(&json!({ "status": status.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    async fn slots_by_user(&self, ctx: &SessionContext) -> Result<Vec<InterviewSlot>> {
        let response = self
            .client
            .get(self.slots_url(ctx))
            .bearer_auth(&ctx.token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let records = response.json::<Vec<RawSlotRecord>>().await?;
        Ok(records.into_iter().map(normalize_slot).collect())
    }

    async fn slot_by_id(&self, ctx: &SessionContext, slot_id: &str) -> Result<InterviewSlot> {
        let url = format!("{}/{}", self.slots_url(ctx), slot_id);
        let response = self
            .client
            .get(url)
            .bearer_auth(&ctx.token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(format!("Slot {} not found", slot_id)));
        }
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        let record = response.json::<RawSlotRecord>().await?;
        Ok(normalize_slot(record))
    }
}
