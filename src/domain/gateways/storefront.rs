use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::storefront::{
    CustomerPayload, CustomerResponse, OrderPayload, OrderRecord, OrderResponse,
};

/// Outbound boundary to the storefront platform's admin API. Responses keep
/// their shape variance; interpreting them is the usecases' job.
// automock has to run before async_trait desugars the methods, so the mocks
// take plain Result-returning closures.
#[automock]
#[async_trait]
pub trait StorefrontGateway: Send + Sync {
    async fn search_customers_by_email(&self, email: &str) -> Result<CustomerResponse>;
    async fn search_customers_by_phone(&self, phone: &str) -> Result<CustomerResponse>;
    async fn create_customer(&self, payload: CustomerPayload) -> Result<CustomerResponse>;
    async fn create_order(&self, payload: OrderPayload) -> Result<OrderResponse>;
    async fn find_order_by_tag(&self, tag: &str) -> Result<Option<OrderRecord>>;
}
