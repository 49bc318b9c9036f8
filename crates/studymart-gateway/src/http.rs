//! HTTP gateway client
//!
//! Thin reqwest wrapper over the gateway's REST API. Holds are created
//! with manual capture (`"capture": false`) so funds stay reserved until
//! the buyer confirms delivery.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{GatewayError, GatewayHold, GatewayResult, PaymentGateway};

/// Gateway API credentials and endpoint
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the gateway REST API
    pub base_url: String,
    /// API key id
    pub key_id: String,
    /// API key secret
    pub key_secret: String,
}

/// reqwest-backed gateway client
pub struct HttpGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn check(&self, response: reqwest::Response) -> GatewayResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GatewayError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    async fn create_hold(
        &self,
        amount_minor: i64,
        currency: &str,
        reference: &str,
    ) -> GatewayResult<GatewayHold> {
        debug!(amount_minor, currency, reference, "Creating gateway hold");

        let response = self
            .client
            .post(self.url("/v1/orders"))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": currency,
                "capture": false,
                "notes": { "reference": reference },
            }))
            .send()
            .await?;

        let order: OrderResponse = self
            .check(response)
            .await?
            .json()
            .await
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;

        Ok(GatewayHold {
            order_id: order.id,
            amount_minor: order.amount,
            currency: order.currency,
        })
    }

    async fn capture(&self, capture_id: &str, amount_minor: i64) -> GatewayResult<()> {
        debug!(capture_id, amount_minor, "Finalizing gateway capture");

        let response = self
            .client
            .post(self.url(&format!("/v1/payments/{}/capture", capture_id)))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&json!({ "amount": amount_minor }))
            .send()
            .await?;

        self.check(response).await?;
        Ok(())
    }

    async fn refund(&self, capture_id: &str) -> GatewayResult<()> {
        debug!(capture_id, "Refunding gateway capture");

        let response = self
            .client
            .post(self.url(&format!("/v1/payments/{}/refund", capture_id)))
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&json!({}))
            .send()
            .await?;

        self.check(response).await?;
        Ok(())
    }
}
