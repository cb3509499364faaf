use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    gateways::storefront::StorefrontGateway,
    value_objects::{
        buyers::BuyerData,
        phones::format_phone_for_storefront,
        storefront::{CustomerPayload, CustomerRecord, CustomerResponse},
    },
};

/// Turns buyer data into at most one platform customer record via
/// search-then-create. Every failure mode resolves to `None`; the caller
/// decides what absence means for the payment flow.
pub struct CustomerResolver<G>
where
    G: StorefrontGateway + Send + Sync + 'static,
{
    storefront: Arc<G>,
}

impl<G> CustomerResolver<G>
where
    G: StorefrontGateway + Send + Sync + 'static,
{
    pub fn new(storefront: Arc<G>) -> Self {
        Self { storefront }
    }

    pub async fn resolve(&self, buyer: &BuyerData) -> Option<CustomerRecord> {
        // Email is the primary key, so a search hit is trusted as-is.
        match self.storefront.search_customers_by_email(&buyer.email).await {
            Ok(response) => {
                if let Some(customer) = response.into_first() {
                    info!(
                        customer_id = customer.id,
                        email = %buyer.email,
                        "customer_resolver: customer found by email"
                    );
                    return Some(customer);
                }
            }
            Err(err) => {
                // Search failure is "not found for this step", not fatal.
                warn!(
                    email = %buyer.email,
                    error = ?err,
                    "customer_resolver: email search failed, continuing"
                );
            }
        }

        let canonical_phone = format_phone_for_storefront(&buyer.phone);
        match self
            .storefront
            .search_customers_by_phone(&canonical_phone)
            .await
        {
            Ok(response) => {
                if let Some(customer) = response.into_first() {
                    info!(
                        customer_id = customer.id,
                        phone = %canonical_phone,
                        "customer_resolver: customer found by phone"
                    );
                    return Some(customer);
                }
            }
            Err(err) => {
                warn!(
                    phone = %canonical_phone,
                    error = ?err,
                    "customer_resolver: phone search failed, continuing"
                );
            }
        }

        info!(
            email = %buyer.email,
            "customer_resolver: no existing customer, creating one"
        );

        let payload = CustomerPayload::from_buyer(buyer);
        match self.storefront.create_customer(payload).await {
            Ok(CustomerResponse::Single { customer }) => {
                info!(
                    customer_id = customer.id,
                    "customer_resolver: customer created"
                );
                Some(customer)
            }
            Ok(CustomerResponse::Many { customers }) => {
                // The platform answered creation with a list, which means the
                // customer already exists. Only an exact email or canonical
                // phone match may be adopted; picking an arbitrary entry would
                // attach the order to another buyer's account.
                let matching = customers.into_iter().find(|candidate| {
                    candidate.email.as_deref() == Some(buyer.email.as_str())
                        || candidate.phone.as_deref() == Some(canonical_phone.as_str())
                });
                match matching {
                    Some(customer) => {
                        info!(
                            customer_id = customer.id,
                            "customer_resolver: creation reported existing customer, using exact match"
                        );
                        Some(customer)
                    }
                    None => {
                        warn!(
                            email = %buyer.email,
                            phone = %canonical_phone,
                            "customer_resolver: creation returned a list with no exact email/phone match, treating as not found"
                        );
                        None
                    }
                }
            }
            Ok(CustomerResponse::Unrecognized(body)) => {
                warn!(
                    response_body = %body,
                    "customer_resolver: unexpected creation response shape"
                );
                None
            }
            Err(err) => {
                error!(
                    email = %buyer.email,
                    error = ?err,
                    "customer_resolver: customer creation failed"
                );
                None
            }
        }
    }
}
