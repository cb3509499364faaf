use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, error};

use crate::{
    config::config_model::Shopify,
    domain::{
        gateways::storefront::StorefrontGateway,
        value_objects::storefront::{
            CustomerPayload, CustomerResponse, OrderLookupResponse, OrderPayload, OrderRecord,
            OrderResponse,
        },
    },
};

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

// The REST order endpoints cannot filter by tag, so the existing-order
// lookup goes through the admin GraphQL API instead.
const EXISTING_ORDER_QUERY: &str = r#"
query ExistingOrder($query: String!) {
  orders(first: 1, query: $query) {
    edges {
      node {
        id
        name
      }
    }
  }
}"#;

// Remote calls hang forever without this; a timed-out call is treated as
// "not found" by the usecases, same as any other transport failure.
const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Minimal Shopify Admin REST client built on reqwest.
pub struct ShopifyClient {
    http: reqwest::Client,
    admin_url: String,
    access_token: String,
}

impl ShopifyClient {
    pub fn new(config: &Shopify) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            admin_url: format!(
                "https://{}/admin/api/{}",
                config.domain, config.api_version
            ),
            access_token: config.admin_access_token.clone(),
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
            "shopify api request failed"
        );

        anyhow::bail!("Shopify API request failed: {} (status {})", context, status);
    }

    async fn search_customers(&self, query: String) -> Result<CustomerResponse> {
        // https://shopify.dev/docs/api/admin-rest/latest/resources/customer#get-customers-search
        let resp = self
            .http
            .get(format!("{}/customers/search.json", self.admin_url))
            .query(&[("query", query.as_str())])
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "search customers").await?;

        let parsed: CustomerResponse = resp.json().await?;
        debug!(query = %query, "shopify customer search completed");
        Ok(parsed)
    }
}

#[async_trait]
impl StorefrontGateway for ShopifyClient {
    async fn search_customers_by_email(&self, email: &str) -> Result<CustomerResponse> {
        self.search_customers(format!("email:{}", email)).await
    }

    async fn search_customers_by_phone(&self, phone: &str) -> Result<CustomerResponse> {
        self.search_customers(format!("phone:{}", phone)).await
    }

    async fn create_customer(&self, payload: CustomerPayload) -> Result<CustomerResponse> {
        // https://shopify.dev/docs/api/admin-rest/latest/resources/customer#post-customers
        let resp = self
            .http
            .post(format!("{}/customers.json", self.admin_url))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create customer").await?;

        let parsed: CustomerResponse = resp.json().await?;
        Ok(parsed)
    }

    async fn create_order(&self, payload: OrderPayload) -> Result<OrderResponse> {
        // https://shopify.dev/docs/api/admin-rest/latest/resources/order#post-orders
        let resp = self
            .http
            .post(format!("{}/orders.json", self.admin_url))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create order").await?;

        let parsed: OrderResponse = resp.json().await?;
        Ok(parsed)
    }

    async fn find_order_by_tag(&self, tag: &str) -> Result<Option<OrderRecord>> {
        // https://shopify.dev/docs/api/admin-graphql/latest/queries/orders
        let body = serde_json::json!({
            "query": EXISTING_ORDER_QUERY,
            "variables": { "query": format!("tag:\"{}\"", tag) },
        });

        let resp = self
            .http
            .post(format!("{}/graphql.json", self.admin_url))
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "find order by tag").await?;

        let parsed: OrderLookupResponse = resp.json().await?;
        let record = parsed.into_first_record();
        debug!(tag = %tag, found = record.is_some(), "shopify order lookup completed");
        Ok(record)
    }
}
