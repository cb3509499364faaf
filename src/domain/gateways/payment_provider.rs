use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::payment_webhook::InvoiceEntity;

/// Outbound boundary to the payment gateway's own API, used to recover
/// references that a webhook event did not carry inline.
#[automock]
#[async_trait]
pub trait PaymentProviderGateway: Send + Sync {
    async fn fetch_invoice(&self, invoice_id: &str) -> Result<InvoiceEntity>;
}
