use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, error};

use crate::{
    config::config_model::Razorpay,
    domain::{
        gateways::payment_provider::PaymentProviderGateway,
        value_objects::payment_webhook::InvoiceEntity,
    },
};

const API_BASE_URL: &str = "https://api.razorpay.com/v1";

const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Razorpay REST client authenticated with the key pair via basic auth.
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(config: &Razorpay) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "razorpay api request failed"
        );

        anyhow::bail!(
            "Razorpay API request failed: {} (status {})",
            context,
            status
        );
    }
}

#[async_trait]
impl PaymentProviderGateway for RazorpayClient {
    async fn fetch_invoice(&self, invoice_id: &str) -> Result<InvoiceEntity> {
        // https://razorpay.com/docs/api/payments/invoices/fetch-invoice-id/
        let resp = self
            .http
            .get(format!("{}/invoices/{}", API_BASE_URL, invoice_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "fetch invoice").await?;

        let parsed: InvoiceEntity = resp.json().await?;
        debug!(invoice_id = %invoice_id, "razorpay invoice fetched");
        Ok(parsed)
    }
}
