use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    application::usercases::reconciliation::ReconciliationUseCase,
    config::config_model::Razorpay,
    domain::{
        gateways::{payment_provider::PaymentProviderGateway, storefront::StorefrontGateway},
        value_objects::{
            buyers::PlanType,
            payment_webhook::{CustomerDetails, PaymentReference, RazorpayWebhook},
        },
    },
    infrastructure::{
        axum_http::error_responses::WebhookError,
        razorpay::{razorpay_client::RazorpayClient, webhook_verifier},
        shopify::shopify_client::ShopifyClient,
    },
};

const SIGNATURE_HEADER: &str = "x-razorpay-signature";

// Every other Razorpay event is acknowledged and dropped.
const HANDLED_EVENTS: [&str; 3] = ["invoice.paid", "subscription.charged", "payment.captured"];

pub struct PaymentWebhookState<G, R>
where
    G: StorefrontGateway + Send + Sync + 'static,
    R: PaymentProviderGateway + Send + Sync + 'static,
{
    pub reconciliation: ReconciliationUseCase<G>,
    pub payment_provider: Arc<R>,
    pub razorpay: Razorpay,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub ok: bool,
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignored: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<i64>,
}

impl WebhookAck {
    fn processed(event: String, customer_id: Option<i64>, order_id: Option<i64>) -> Self {
        Self {
            ok: true,
            event,
            ignored: None,
            skipped: None,
            customer_id,
            order_id,
        }
    }

    fn ignored(event: String) -> Self {
        Self {
            ok: true,
            event,
            ignored: Some(true),
            skipped: None,
            customer_id: None,
            order_id: None,
        }
    }

    fn skipped(event: String, reason: &'static str) -> Self {
        Self {
            ok: true,
            event,
            ignored: None,
            skipped: Some(reason),
            customer_id: None,
            order_id: None,
        }
    }
}

pub fn routes(
    razorpay: Razorpay,
    shopify_client: Arc<ShopifyClient>,
    razorpay_client: Arc<RazorpayClient>,
) -> Router {
    let state = Arc::new(PaymentWebhookState {
        reconciliation: ReconciliationUseCase::new(shopify_client),
        payment_provider: razorpay_client,
        razorpay,
    });

    Router::new()
        .route(
            "/razorpay",
            post(handle_razorpay_webhook::<ShopifyClient, RazorpayClient>),
        )
        .with_state(state)
}

pub async fn handle_razorpay_webhook<G, R>(
    State(state): State<Arc<PaymentWebhookState<G, R>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    G: StorefrontGateway + Send + Sync + 'static,
    R: PaymentProviderGateway + Send + Sync + 'static,
{
    if state.razorpay.webhook_secret.is_empty() {
        return WebhookError::MissingSecret.into_response();
    }

    let signature = match headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(signature) => signature,
        None => {
            warn!("payment_webhook: request without signature header");
            return WebhookError::MissingSignature.into_response();
        }
    };

    let webhook = match webhook_verifier::verify_webhook_signature(
        &body,
        signature,
        &state.razorpay.webhook_secret,
    ) {
        Ok(webhook) => webhook,
        Err(err) => {
            warn!(error = %err, "payment_webhook: signature verification failed");
            return WebhookError::InvalidSignature.into_response();
        }
    };

    let event = webhook.event.clone().unwrap_or_default();
    if !HANDLED_EVENTS.contains(&event.as_str()) {
        info!(event = %event, "payment_webhook: unhandled event acknowledged");
        return (StatusCode::OK, Json(WebhookAck::ignored(event))).into_response();
    }

    let reference = match resolve_reference(&state, &webhook).await {
        Some(reference) => reference,
        None => {
            warn!(
                event = %event,
                "payment_webhook: missing payment or subscription reference"
            );
            return (
                StatusCode::OK,
                Json(WebhookAck::skipped(
                    event,
                    "missing_payment_or_subscription_reference",
                )),
            )
                .into_response();
        }
    };

    let plan_type = classify_plan(
        &state.razorpay,
        reference.plan_id.as_deref(),
        reference.customer.as_ref(),
    );

    let buyer = match reference
        .customer
        .as_ref()
        .and_then(|details| details.to_buyer(plan_type))
    {
        Some(buyer) => buyer,
        None => {
            warn!(
                event = %event,
                subscription_id = %reference.subscription_id,
                "payment_webhook: event carries no usable buyer details"
            );
            return (
                StatusCode::OK,
                Json(WebhookAck::skipped(event, "missing_buyer_details")),
            )
                .into_response();
        }
    };

    let amount_minor = reference
        .amount_minor
        .unwrap_or_else(|| plan_type.fallback_amount_minor());

    info!(
        event = %event,
        payment_id = %reference.payment_id,
        subscription_id = %reference.subscription_id,
        plan_type = %plan_type,
        amount_minor,
        "payment_webhook: reconciling payment event"
    );

    let outcome = state
        .reconciliation
        .reconcile_and_order(&buyer, &reference.subscription_id, amount_minor)
        .await;

    (
        StatusCode::OK,
        Json(WebhookAck::processed(
            event,
            outcome.customer.map(|customer| customer.id),
            outcome.order.map(|order| order.id),
        )),
    )
        .into_response()
}

/// Extracts the payment reference from the event itself, falling back to a
/// Razorpay invoice fetch: `payment.captured` names only the payment entity,
/// and the subscription id and buyer details live on the invoice it points at.
async fn resolve_reference<G, R>(
    state: &PaymentWebhookState<G, R>,
    webhook: &RazorpayWebhook,
) -> Option<PaymentReference>
where
    G: StorefrontGateway + Send + Sync + 'static,
    R: PaymentProviderGateway + Send + Sync + 'static,
{
    if let Some(reference) = webhook.payment_reference() {
        return Some(reference);
    }

    let invoice_id = webhook.payment_invoice_id()?;
    match state.payment_provider.fetch_invoice(invoice_id).await {
        Ok(invoice) => {
            info!(
                invoice_id = %invoice_id,
                "payment_webhook: recovered reference from fetched invoice"
            );
            webhook.payment_reference_with_invoice(&invoice)
        }
        Err(err) => {
            warn!(
                invoice_id = %invoice_id,
                error = ?err,
                "payment_webhook: invoice fetch failed"
            );
            None
        }
    }
}

/// Classifies the plan from the configured plan ids, falling back to address
/// presence: only print-edition checkouts collect a delivery address.
fn classify_plan(
    razorpay: &Razorpay,
    plan_id: Option<&str>,
    customer: Option<&CustomerDetails>,
) -> PlanType {
    if let (Some(plan_id), Some(print_plan_id)) = (plan_id, razorpay.print_plan_id.as_deref()) {
        if plan_id == print_plan_id {
            return PlanType::PrintEdition;
        }
    }
    if let (Some(plan_id), Some(digital_plan_id)) = (plan_id, razorpay.digital_plan_id.as_deref()) {
        if plan_id == digital_plan_id {
            return PlanType::DigitalExplorer;
        }
    }

    let has_address = customer
        .map(|details| {
            details.billing_address.is_some() || details.shipping_address.is_some()
        })
        .unwrap_or(false);

    if has_address {
        PlanType::PrintEdition
    } else {
        PlanType::DigitalExplorer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        gateways::{
            payment_provider::MockPaymentProviderGateway, storefront::MockStorefrontGateway,
        },
        value_objects::{
            payment_webhook::{InvoiceEntity, WebhookAddress},
            storefront::{CustomerRecord, CustomerResponse, OrderRecord, OrderResponse},
        },
    };
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    const SECRET: &str = "whsec_test";

    fn sign(payload: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }

    fn razorpay_config() -> Razorpay {
        Razorpay {
            key_id: "rzp_test_key".to_string(),
            key_secret: "rzp_test_secret".to_string(),
            webhook_secret: SECRET.to_string(),
            digital_plan_id: Some("plan_digital".to_string()),
            print_plan_id: Some("plan_print".to_string()),
        }
    }

    fn state_with(
        storefront: MockStorefrontGateway,
    ) -> Arc<PaymentWebhookState<MockStorefrontGateway, MockPaymentProviderGateway>> {
        state_with_provider(storefront, MockPaymentProviderGateway::new())
    }

    fn state_with_provider(
        storefront: MockStorefrontGateway,
        payment_provider: MockPaymentProviderGateway,
    ) -> Arc<PaymentWebhookState<MockStorefrontGateway, MockPaymentProviderGateway>> {
        Arc::new(PaymentWebhookState {
            reconciliation: ReconciliationUseCase::new(Arc::new(storefront)),
            payment_provider: Arc::new(payment_provider),
            razorpay: razorpay_config(),
        })
    }

    fn signed_headers(payload: &[u8]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, sign(payload).parse().unwrap());
        headers
    }

    const CHARGED_PAYLOAD: &str = r#"{
        "event": "subscription.charged",
        "payload": {
            "payment": {"entity": {"id": "pay_1", "status": "captured", "amount": 150000}},
            "subscription": {"entity": {"id": "sub_9", "plan_id": "plan_digital"}},
            "invoice": {"entity": {
                "payment_id": "pay_1",
                "subscription_id": "sub_9",
                "customer_details": {
                    "customer_name": "Asha Iyer",
                    "customer_email": "a@x.com",
                    "customer_contact": "9876543210"
                }
            }}
        }
    }"#;

    #[tokio::test]
    async fn missing_signature_is_unauthorized() {
        let mut storefront = MockStorefrontGateway::new();
        storefront.expect_search_customers_by_email().never();
        let state = state_with(storefront);

        let response = handle_razorpay_webhook(
            State(state),
            HeaderMap::new(),
            Bytes::from_static(b"{}"),
        )
        .await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn forged_signature_is_unauthorized() {
        let mut storefront = MockStorefrontGateway::new();
        storefront.expect_search_customers_by_email().never();
        let state = state_with(storefront);

        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, sign(b"other body").parse().unwrap());

        let response =
            handle_razorpay_webhook(State(state), headers, Bytes::from_static(b"{}")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unhandled_event_is_acknowledged_without_reconciliation() {
        let mut storefront = MockStorefrontGateway::new();
        storefront.expect_search_customers_by_email().never();
        storefront.expect_create_customer().never();
        let state = state_with(storefront);

        let payload = br#"{"event": "subscription.cancelled", "payload": {}}"#;
        let response = handle_razorpay_webhook(
            State(state),
            signed_headers(payload),
            Bytes::from_static(payload),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn charged_event_reconciles_customer_and_order() {
        let mut storefront = MockStorefrontGateway::new();
        storefront.expect_search_customers_by_email().returning(|_| {
            Ok(CustomerResponse::Single {
                customer: CustomerRecord {
                    id: 77,
                    email: Some("a@x.com".to_string()),
                    phone: None,
                    first_name: None,
                    last_name: None,
                    tags: None,
                },
            })
        });
        storefront
            .expect_find_order_by_tag()
            .returning(|_| Ok(None));
        storefront
            .expect_create_order()
            .withf(|payload| payload.order.line_items[0].price == "1500.00")
            .times(1)
            .returning(|_| {
                Ok(OrderResponse::Single {
                    order: OrderRecord {
                        id: 900,
                        total_price: Some("1500.00".to_string()),
                    },
                })
            });
        let state = state_with(storefront);

        let payload = CHARGED_PAYLOAD.as_bytes();
        let response = handle_razorpay_webhook(
            State(state),
            signed_headers(payload),
            Bytes::copy_from_slice(payload),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn captured_event_recovers_reference_from_fetched_invoice() {
        let mut storefront = MockStorefrontGateway::new();
        storefront.expect_search_customers_by_email().returning(|_| {
            Ok(CustomerResponse::Single {
                customer: CustomerRecord {
                    id: 77,
                    email: Some("a@x.com".to_string()),
                    phone: None,
                    first_name: None,
                    last_name: None,
                    tags: None,
                },
            })
        });
        storefront
            .expect_find_order_by_tag()
            .returning(|_| Ok(None));
        storefront
            .expect_create_order()
            .withf(|payload| payload.order.note == "Razorpay Subscription ID: sub_9")
            .times(1)
            .returning(|_| {
                Ok(OrderResponse::Single {
                    order: OrderRecord {
                        id: 901,
                        total_price: Some("1500.00".to_string()),
                    },
                })
            });

        let mut payment_provider = MockPaymentProviderGateway::new();
        payment_provider
            .expect_fetch_invoice()
            .with(mockall::predicate::eq("inv_5"))
            .times(1)
            .returning(|_| {
                Ok(serde_json::from_str::<InvoiceEntity>(
                    r#"{
                        "id": "inv_5",
                        "payment_id": "pay_1",
                        "subscription_id": "sub_9",
                        "customer_details": {
                            "customer_name": "Asha Iyer",
                            "customer_email": "a@x.com",
                            "customer_contact": "9876543210"
                        }
                    }"#,
                )
                .unwrap())
            });

        let state = state_with_provider(storefront, payment_provider);

        let payload = br#"{
            "event": "payment.captured",
            "payload": {"payment": {"entity": {"id": "pay_1", "status": "captured", "amount": 150000, "invoice_id": "inv_5"}}}
        }"#;
        let response = handle_razorpay_webhook(
            State(state),
            signed_headers(payload),
            Bytes::from_static(payload),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn captured_event_without_invoice_reference_is_skipped() {
        let mut storefront = MockStorefrontGateway::new();
        storefront.expect_search_customers_by_email().never();
        let mut payment_provider = MockPaymentProviderGateway::new();
        payment_provider.expect_fetch_invoice().never();
        let state = state_with_provider(storefront, payment_provider);

        let payload = br#"{"event": "payment.captured", "payload": {"payment": {"entity": {"id": "pay_1"}}}}"#;
        let response = handle_razorpay_webhook(
            State(state),
            signed_headers(payload),
            Bytes::from_static(payload),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn plan_classification_prefers_configured_ids() {
        let razorpay = razorpay_config();
        assert_eq!(
            classify_plan(&razorpay, Some("plan_print"), None),
            PlanType::PrintEdition
        );
        assert_eq!(
            classify_plan(&razorpay, Some("plan_digital"), None),
            PlanType::DigitalExplorer
        );
    }

    #[test]
    fn unknown_plan_falls_back_to_address_presence() {
        let razorpay = razorpay_config();
        let with_address = CustomerDetails {
            billing_address: Some(WebhookAddress {
                line1: Some("12 MG Road".to_string()),
                line2: None,
                city: None,
                state: None,
                zipcode: None,
                country: None,
            }),
            ..CustomerDetails::default()
        };

        assert_eq!(
            classify_plan(&razorpay, Some("plan_other"), Some(&with_address)),
            PlanType::PrintEdition
        );
        assert_eq!(
            classify_plan(&razorpay, None, None),
            PlanType::DigitalExplorer
        );
    }
}
