use serde::Deserialize;

use crate::domain::value_objects::buyers::{BuyerData, PlanType};

const TEXT_LIMIT: usize = 120;

/// Razorpay webhook envelope. Every field is optional because the gateway
/// ships different entity combinations per event type.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayWebhook {
    pub event: Option<String>,
    pub payload: Option<WebhookEntities>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEntities {
    pub invoice: Option<EntityWrapper<InvoiceEntity>>,
    pub payment: Option<EntityWrapper<PaymentEntity>>,
    pub subscription: Option<EntityWrapper<SubscriptionEntity>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntityWrapper<T> {
    pub entity: Option<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceEntity {
    pub id: Option<String>,
    pub status: Option<String>,
    pub payment_id: Option<String>,
    pub subscription_id: Option<String>,
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEntity {
    pub id: Option<String>,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub invoice_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionEntity {
    pub id: Option<String>,
    pub plan_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_contact: Option<String>,
    pub billing_address: Option<WebhookAddress>,
    pub shipping_address: Option<WebhookAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub country: Option<String>,
}

/// References the handler needs before reconciliation can start.
#[derive(Debug, Clone)]
pub struct PaymentReference {
    pub payment_id: String,
    pub subscription_id: String,
    pub plan_id: Option<String>,
    pub amount_minor: Option<i64>,
    pub customer: Option<CustomerDetails>,
}

fn sanitize(value: Option<&str>) -> String {
    let trimmed = value.unwrap_or("").trim();
    trimmed.chars().take(TEXT_LIMIT).collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl RazorpayWebhook {
    /// Pulls the payment/subscription references out of whichever entities the
    /// event carries. Returns `None` when either reference is missing; the
    /// handler acknowledges such events without reconciling.
    pub fn payment_reference(&self) -> Option<PaymentReference> {
        self.reference_with(None)
    }

    /// Same extraction, with a separately fetched invoice filling the gaps.
    /// `payment.captured` events name only the payment entity, so the
    /// subscription id and buyer details come from that invoice.
    pub fn payment_reference_with_invoice(
        &self,
        fetched: &InvoiceEntity,
    ) -> Option<PaymentReference> {
        self.reference_with(Some(fetched))
    }

    /// Invoice id the payment entity points at, if the event carries one.
    pub fn payment_invoice_id(&self) -> Option<&str> {
        self.payload
            .as_ref()?
            .payment
            .as_ref()?
            .entity
            .as_ref()?
            .invoice_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    fn reference_with(&self, fetched: Option<&InvoiceEntity>) -> Option<PaymentReference> {
        let entities = self.payload.as_ref()?;
        let invoice = entities
            .invoice
            .as_ref()
            .and_then(|wrapper| wrapper.entity.as_ref());
        let payment = entities
            .payment
            .as_ref()
            .and_then(|wrapper| wrapper.entity.as_ref());
        let subscription = entities
            .subscription
            .as_ref()
            .and_then(|wrapper| wrapper.entity.as_ref());

        let payment_id = non_empty(sanitize(
            invoice
                .and_then(|entity| entity.payment_id.as_deref())
                .or(payment.and_then(|entity| entity.id.as_deref()))
                .or(fetched.and_then(|entity| entity.payment_id.as_deref())),
        ))?;
        let subscription_id = non_empty(sanitize(
            invoice
                .and_then(|entity| entity.subscription_id.as_deref())
                .or(subscription.and_then(|entity| entity.id.as_deref()))
                .or(fetched.and_then(|entity| entity.subscription_id.as_deref())),
        ))?;

        Some(PaymentReference {
            payment_id,
            subscription_id,
            plan_id: subscription
                .and_then(|entity| entity.plan_id.as_deref())
                .map(|plan_id| sanitize(Some(plan_id))),
            amount_minor: payment.and_then(|entity| entity.amount),
            customer: invoice
                .and_then(|entity| entity.customer_details.clone())
                .or_else(|| fetched.and_then(|entity| entity.customer_details.clone())),
        })
    }
}

impl CustomerDetails {
    pub fn effective_name(&self) -> String {
        sanitize(self.name.as_deref().or(self.customer_name.as_deref()))
    }

    pub fn effective_email(&self) -> String {
        sanitize(self.email.as_deref().or(self.customer_email.as_deref())).to_lowercase()
    }

    pub fn effective_contact(&self) -> String {
        sanitize(self.contact.as_deref().or(self.customer_contact.as_deref()))
    }

    /// Builds the workflow input for a classified plan. Returns `None` when
    /// the gateway gave us no email or no phone; the resolver cannot match a
    /// buyer without either of its two keys filled in.
    pub fn to_buyer(&self, plan_type: PlanType) -> Option<BuyerData> {
        let email = non_empty(self.effective_email())?;
        let phone = non_empty(self.effective_contact())?;
        let address = self
            .billing_address
            .as_ref()
            .or(self.shipping_address.as_ref());

        Some(BuyerData {
            name: self.effective_name(),
            email,
            phone,
            plan_type,
            address: address.and_then(|a| non_empty(sanitize(a.line1.as_deref()))),
            city: address.and_then(|a| non_empty(sanitize(a.city.as_deref()))),
            state: address.and_then(|a| non_empty(sanitize(a.state.as_deref()))),
            pincode: address.and_then(|a| non_empty(sanitize(a.zipcode.as_deref()))),
        })
    }
}
