use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::value_objects::{
    buyers::BuyerData, phones::format_phone_for_storefront, provinces::province_code,
};

const ORDER_VENDOR: &str = "Subscriptions";

/// Customer record owned by the storefront platform. The workflow only ever
/// reads these or asks the platform to create one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerRecord {
    pub id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub id: i64,
    pub total_price: Option<String>,
}

/// The platform answers customer endpoints with either a single object or a
/// list, and creation may answer with a list meaning "already exists". The
/// three documented shapes are decoded explicitly instead of probing fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CustomerResponse {
    Single { customer: CustomerRecord },
    Many { customers: Vec<CustomerRecord> },
    Unrecognized(Value),
}

impl CustomerResponse {
    /// First customer the platform reported, whatever the response shape.
    /// Only valid for search responses, where the platform has already
    /// filtered by the exact query.
    pub fn into_first(self) -> Option<CustomerRecord> {
        match self {
            CustomerResponse::Single { customer } => Some(customer),
            CustomerResponse::Many { customers } => customers.into_iter().next(),
            CustomerResponse::Unrecognized(_) => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderResponse {
    Single { order: OrderRecord },
    Many { orders: Vec<OrderRecord> },
    Unrecognized(Value),
}

/// GraphQL response for the existing-order-by-tag lookup. The admin GraphQL
/// API names orders with `gid://shopify/Order/{id}` globals.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLookupResponse {
    pub data: Option<OrderLookupData>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLookupData {
    pub orders: Option<OrderConnection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderConnection {
    #[serde(default)]
    pub edges: Vec<OrderEdge>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderEdge {
    pub node: OrderNode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderNode {
    pub id: String,
    pub name: Option<String>,
}

/// Numeric id from a `gid://shopify/Order/{id}` global; bare numeric strings
/// pass through too.
pub fn order_id_from_gid(gid: &str) -> Option<i64> {
    gid.rsplit('/').next()?.parse().ok()
}

impl OrderLookupResponse {
    pub fn into_first_record(self) -> Option<OrderRecord> {
        let edge = self.data?.orders?.edges.into_iter().next()?;
        Some(OrderRecord {
            id: order_id_from_gid(&edge.node.id)?,
            total_price: None,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerPayload {
    pub customer: NewCustomer,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewCustomer {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub tags: String,
    pub note: String,
    pub verified_email: bool,
    pub accepts_marketing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<CustomerAddress>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CustomerAddress {
    pub address1: String,
    pub address2: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: String,
    pub country_code: String,
    pub province_code: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub company: String,
    pub default: bool,
}

impl CustomerPayload {
    pub fn from_buyer(buyer: &BuyerData) -> Self {
        let phone = format_phone_for_storefront(&buyer.phone);

        let addresses = buyer.address.as_ref().map(|address| {
            vec![CustomerAddress {
                address1: address.clone(),
                address2: String::new(),
                city: buyer.city.clone(),
                province: buyer.state.clone(),
                zip: buyer.pincode.clone(),
                country: "India".to_string(),
                country_code: "IN".to_string(),
                province_code: province_code(buyer.state.as_deref().unwrap_or("")),
                first_name: buyer.first_name(),
                last_name: buyer.last_name(),
                phone: phone.clone(),
                company: String::new(),
                default: true,
            }]
        });

        Self {
            customer: NewCustomer {
                first_name: buyer.first_name(),
                last_name: buyer.last_name(),
                email: buyer.email.clone(),
                phone,
                tags: format!("subscription,razorpay,{}", buyer.plan_type),
                note: format!("Subscribed to {} via Razorpay", buyer.plan_type),
                verified_email: true,
                accepts_marketing: false,
                addresses,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderPayload {
    pub order: NewOrder,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewOrder {
    pub customer: OrderCustomerRef,
    pub line_items: Vec<OrderLineItem>,
    pub currency: String,
    pub financial_status: String,
    pub fulfillment_status: String,
    pub tags: String,
    pub note: String,
    pub note_attributes: Vec<NoteAttribute>,
    pub transactions: Vec<OrderTransaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_address: Option<OrderAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_address: Option<OrderAddress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_lines: Option<Vec<ShippingLine>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderCustomerRef {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderLineItem {
    pub title: String,
    pub price: String,
    pub quantity: u32,
    pub requires_shipping: bool,
    pub taxable: bool,
    pub product_exists: bool,
    pub variant_title: String,
    pub vendor: String,
    pub name: String,
    pub custom: bool,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NoteAttribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderTransaction {
    pub kind: String,
    pub status: String,
    pub amount: String,
    pub currency: String,
    pub gateway: String,
    pub source_name: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderAddress {
    pub first_name: String,
    pub last_name: String,
    pub address1: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub zip: Option<String>,
    pub country: String,
    pub country_code: String,
    pub province_code: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ShippingLine {
    pub title: String,
    pub price: u32,
    pub code: String,
    pub source: String,
}

/// Formats a paise amount as a rupee string the platform accepts, without
/// going through floating point.
pub fn rupees_from_paise(amount_minor: i64) -> String {
    format!("{}.{:02}", amount_minor / 100, amount_minor % 100)
}

impl OrderPayload {
    pub fn from_buyer(
        buyer: &BuyerData,
        customer_id: i64,
        subscription_id: &str,
        amount_minor: i64,
    ) -> Self {
        let phone = format_phone_for_storefront(&buyer.phone);
        let amount = rupees_from_paise(amount_minor);
        let product_title = buyer.plan_type.product_title();
        let requires_shipping = buyer.plan_type.requires_shipping();

        let order_address = |email: Option<String>| OrderAddress {
            first_name: buyer.first_name(),
            last_name: buyer.last_name(),
            address1: buyer.address.clone().unwrap_or_default(),
            city: buyer.city.clone(),
            province: buyer.state.clone(),
            zip: buyer.pincode.clone(),
            country: "India".to_string(),
            country_code: "IN".to_string(),
            province_code: province_code(buyer.state.as_deref().unwrap_or("")),
            phone: phone.clone(),
            email,
        };

        // Shipping and billing addresses only make sense for the print plan,
        // and only when the buyer actually supplied an address.
        let with_addresses = requires_shipping && buyer.address.is_some();

        Self {
            order: NewOrder {
                customer: OrderCustomerRef { id: customer_id },
                line_items: vec![OrderLineItem {
                    title: product_title.to_string(),
                    price: amount.clone(),
                    quantity: 1,
                    requires_shipping,
                    taxable: false,
                    product_exists: false,
                    variant_title: buyer.plan_type.to_string(),
                    vendor: ORDER_VENDOR.to_string(),
                    name: product_title.to_string(),
                    custom: true,
                }],
                currency: "INR".to_string(),
                financial_status: "paid".to_string(),
                fulfillment_status: if requires_shipping {
                    "unfulfilled".to_string()
                } else {
                    "fulfilled".to_string()
                },
                tags: format!(
                    "subscription,razorpay,{},{}",
                    buyer.plan_type, subscription_id
                ),
                note: format!("Razorpay Subscription ID: {}", subscription_id),
                note_attributes: vec![
                    NoteAttribute {
                        name: "Razorpay Subscription ID".to_string(),
                        value: subscription_id.to_string(),
                    },
                    NoteAttribute {
                        name: "Plan Type".to_string(),
                        value: buyer.plan_type.to_string(),
                    },
                    NoteAttribute {
                        name: "Payment Method".to_string(),
                        value: "Razorpay".to_string(),
                    },
                ],
                transactions: vec![OrderTransaction {
                    kind: "sale".to_string(),
                    status: "success".to_string(),
                    amount,
                    currency: "INR".to_string(),
                    gateway: "Razorpay".to_string(),
                    source_name: "web".to_string(),
                }],
                shipping_address: with_addresses.then(|| order_address(None)),
                billing_address: with_addresses
                    .then(|| order_address(Some(buyer.email.clone()))),
                shipping_lines: with_addresses.then(|| {
                    vec![ShippingLine {
                        title: "Standard Shipping".to_string(),
                        price: 0,
                        code: "STANDARD".to_string(),
                        source: "web".to_string(),
                    }]
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::buyers::PlanType;

    fn print_buyer() -> BuyerData {
        BuyerData {
            name: "Asha Iyer".to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            plan_type: PlanType::PrintEdition,
            address: Some("12 MG Road".to_string()),
            city: Some("Bengaluru".to_string()),
            state: Some("Karnataka".to_string()),
            pincode: Some("560001".to_string()),
        }
    }

    #[test]
    fn rupee_formatting_avoids_floating_point() {
        assert_eq!(rupees_from_paise(240_000), "2400.00");
        assert_eq!(rupees_from_paise(150_005), "1500.05");
        assert_eq!(rupees_from_paise(99), "0.99");
    }

    #[test]
    fn customer_payload_carries_canonical_phone_everywhere() {
        let payload = CustomerPayload::from_buyer(&print_buyer());
        assert_eq!(payload.customer.phone, "+919876543210");
        let addresses = payload.customer.addresses.expect("print buyer has address");
        assert_eq!(addresses[0].phone, "+919876543210");
        assert_eq!(addresses[0].province_code, "KA");
        assert!(addresses[0].default);
    }

    #[test]
    fn digital_order_has_no_shipping_sections() {
        let mut buyer = print_buyer();
        buyer.plan_type = PlanType::DigitalExplorer;
        buyer.address = None;

        let payload = OrderPayload::from_buyer(&buyer, 42, "sub_123", 150_000);
        assert!(payload.order.shipping_address.is_none());
        assert!(payload.order.billing_address.is_none());
        assert!(payload.order.shipping_lines.is_none());
        assert_eq!(payload.order.fulfillment_status, "fulfilled");
        assert!(!payload.order.line_items[0].requires_shipping);
    }

    #[test]
    fn print_order_ties_customer_subscription_and_canonical_phone() {
        let payload = OrderPayload::from_buyer(&print_buyer(), 42, "sub_123", 240_000);

        assert_eq!(payload.order.customer.id, 42);
        assert_eq!(payload.order.line_items[0].price, "2400.00");
        assert_eq!(payload.order.note, "Razorpay Subscription ID: sub_123");

        let shipping = payload.order.shipping_address.expect("print order ships");
        let billing = payload.order.billing_address.expect("billing present");
        assert_eq!(shipping.phone, "+919876543210");
        assert_eq!(billing.phone, "+919876543210");
        assert_eq!(billing.email.as_deref(), Some("asha@example.com"));
        assert_eq!(payload.order.fulfillment_status, "unfulfilled");
    }

    #[test]
    fn order_lookup_decodes_gid_into_numeric_id() {
        let response: OrderLookupResponse = serde_json::from_str(
            r##"{"data":{"orders":{"edges":[{"node":{"id":"gid://shopify/Order/900","name":"#1042"}}]}}}"##,
        )
        .unwrap();
        assert_eq!(response.into_first_record().map(|o| o.id), Some(900));

        let empty: OrderLookupResponse =
            serde_json::from_str(r#"{"data":{"orders":{"edges":[]}}}"#).unwrap();
        assert!(empty.into_first_record().is_none());

        assert_eq!(order_id_from_gid("gid://shopify/Order/7"), Some(7));
        assert_eq!(order_id_from_gid("7"), Some(7));
        assert_eq!(order_id_from_gid("gid://shopify/Order/x"), None);
    }

    #[test]
    fn decodes_single_and_list_customer_shapes() {
        let single: CustomerResponse =
            serde_json::from_str(r#"{"customer":{"id":7,"email":"a@x.com"}}"#).unwrap();
        assert!(matches!(single, CustomerResponse::Single { .. }));

        let many: CustomerResponse =
            serde_json::from_str(r#"{"customers":[{"id":7},{"id":8}]}"#).unwrap();
        assert_eq!(many.into_first().map(|c| c.id), Some(7));

        let odd: CustomerResponse =
            serde_json::from_str(r#"{"errors":{"phone":["has already been taken"]}}"#).unwrap();
        assert!(matches!(odd, CustomerResponse::Unrecognized(_)));
    }
}
