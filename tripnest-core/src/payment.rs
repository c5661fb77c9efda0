use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tripnest_booking::{Order, PaymentMethod};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    RequiresPaymentMethod,
    Processing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub order_id: Uuid,
    /// Minor units (cents)
    pub amount: i64,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait PaymentAdapter: Send + Sync {
    /// Open a payment for an order with the provider
    async fn create_intent(
        &self,
        order_id: Uuid,
        amount: i64,
        currency: &str,
        method: PaymentMethod,
    ) -> CoreResult<PaymentIntent>;

    /// Charge a previously opened intent
    async fn process_payment(&self, intent: &PaymentIntent) -> CoreResult<PaymentStatus>;
}

pub struct PaymentOrchestrator {
    adapter: Arc<dyn PaymentAdapter>,
}

impl PaymentOrchestrator {
    pub fn new(adapter: Arc<dyn PaymentAdapter>) -> Self {
        Self { adapter }
    }

    /// Charge the order total. Returns the settled intent, or
    /// `CoreError::Payment` when the provider does not report success.
    pub async fn charge(&self, order: &Order) -> CoreResult<PaymentIntent> {
        let amount = (order.total * 100.0).round() as i64;
        let mut intent = self
            .adapter
            .create_intent(order.id, amount, &order.currency, order.payment_method)
            .await?;

        let status = self.adapter.process_payment(&intent).await?;
        intent.status = status;

        if status != PaymentStatus::Succeeded {
            tracing::warn!("Payment {} for order {} ended as {:?}", intent.id, order.id, status);
            return Err(CoreError::Payment(format!("payment ended with status {:?}", status)));
        }

        tracing::info!("Payment {} captured for order {}: {} {}", intent.id, order.id, order.total, order.currency);
        Ok(intent)
    }
}

/// Stand-in provider: every payment succeeds after `delay`.
pub struct SimulatedPaymentAdapter {
    delay: Duration,
}

impl SimulatedPaymentAdapter {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl PaymentAdapter for SimulatedPaymentAdapter {
    async fn create_intent(
        &self,
        order_id: Uuid,
        amount: i64,
        currency: &str,
        method: PaymentMethod,
    ) -> CoreResult<PaymentIntent> {
        Ok(PaymentIntent {
            id: format!("sim_{}_{}", method, order_id.simple()),
            order_id,
            amount,
            currency: currency.to_string(),
            method,
            status: PaymentStatus::RequiresPaymentMethod,
            created_at: Utc::now(),
        })
    }

    async fn process_payment(&self, _intent: &PaymentIntent) -> CoreResult<PaymentStatus> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(PaymentStatus::Succeeded)
    }
}
