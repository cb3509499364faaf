use std::sync::Arc;

use tracing::{error, info, warn};

use crate::domain::{
    gateways::storefront::StorefrontGateway,
    value_objects::{
        buyers::BuyerData,
        storefront::{CustomerRecord, OrderPayload, OrderRecord, OrderResponse},
    },
};

/// Creates the storefront order for one paid subscription period. The guard
/// against a missing customer lives here so no caller can produce an orphan
/// order by accident.
pub struct OrderCreator<G>
where
    G: StorefrontGateway + Send + Sync + 'static,
{
    storefront: Arc<G>,
}

impl<G> OrderCreator<G>
where
    G: StorefrontGateway + Send + Sync + 'static,
{
    pub fn new(storefront: Arc<G>) -> Self {
        Self { storefront }
    }

    pub async fn create_order(
        &self,
        buyer: &BuyerData,
        customer: Option<&CustomerRecord>,
        subscription_id: &str,
        amount_minor: i64,
    ) -> Option<OrderRecord> {
        // Hard gate: without a usable customer id nothing goes on the wire.
        let customer = match customer {
            Some(customer) if customer.id > 0 => customer,
            _ => {
                error!(
                    %subscription_id,
                    "order_creator: cannot create order, no valid customer provided"
                );
                return None;
            }
        };

        // Orders are tagged with the subscription id, so a redelivered event
        // finds the order the first delivery created instead of making a new
        // one. A failed lookup is "not found" and falls through to creation.
        match self.storefront.find_order_by_tag(subscription_id).await {
            Ok(Some(order)) => {
                info!(
                    order_id = order.id,
                    customer_id = customer.id,
                    %subscription_id,
                    "order_creator: order already exists for subscription, reusing it"
                );
                return Some(order);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    customer_id = customer.id,
                    %subscription_id,
                    error = ?err,
                    "order_creator: existing-order lookup failed, proceeding to create"
                );
            }
        }

        let payload = OrderPayload::from_buyer(buyer, customer.id, subscription_id, amount_minor);
        match self.storefront.create_order(payload).await {
            Ok(OrderResponse::Single { order }) => {
                info!(
                    order_id = order.id,
                    customer_id = customer.id,
                    %subscription_id,
                    total_price = ?order.total_price,
                    "order_creator: order created"
                );
                Some(order)
            }
            Ok(OrderResponse::Many { orders }) => match orders.into_iter().next() {
                Some(order) => {
                    info!(
                        order_id = order.id,
                        customer_id = customer.id,
                        %subscription_id,
                        "order_creator: order returned in list shape, using first entry"
                    );
                    Some(order)
                }
                None => {
                    warn!(
                        customer_id = customer.id,
                        %subscription_id,
                        "order_creator: order list response was empty"
                    );
                    None
                }
            },
            Ok(OrderResponse::Unrecognized(body)) => {
                warn!(
                    customer_id = customer.id,
                    %subscription_id,
                    response_body = %body,
                    "order_creator: unexpected order response shape"
                );
                None
            }
            Err(err) => {
                error!(
                    customer_id = customer.id,
                    %subscription_id,
                    error = ?err,
                    "order_creator: order creation failed"
                );
                None
            }
        }
    }
}
