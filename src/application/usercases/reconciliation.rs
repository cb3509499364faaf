use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    application::usercases::{customer_resolver::CustomerResolver, order_creator::OrderCreator},
    domain::{
        gateways::storefront::StorefrontGateway,
        value_objects::{
            buyers::BuyerData,
            storefront::{CustomerRecord, OrderRecord},
        },
    },
};

/// What reconciliation produced for one payment event. Both sides may be
/// absent; the payment itself already succeeded upstream and is never rolled
/// back because a fulfillment record could not be written.
#[derive(Debug, Clone)]
pub struct ReconciliationOutcome {
    pub customer: Option<CustomerRecord>,
    pub order: Option<OrderRecord>,
}

/// Sequences customer resolution and order creation for one payment event.
pub struct ReconciliationUseCase<G>
where
    G: StorefrontGateway + Send + Sync + 'static,
{
    customer_resolver: CustomerResolver<G>,
    order_creator: OrderCreator<G>,
}

impl<G> ReconciliationUseCase<G>
where
    G: StorefrontGateway + Send + Sync + 'static,
{
    pub fn new(storefront: Arc<G>) -> Self {
        Self {
            customer_resolver: CustomerResolver::new(Arc::clone(&storefront)),
            order_creator: OrderCreator::new(storefront),
        }
    }

    pub async fn reconcile_and_order(
        &self,
        buyer: &BuyerData,
        subscription_id: &str,
        amount_minor: i64,
    ) -> ReconciliationOutcome {
        info!(
            %subscription_id,
            email = %buyer.email,
            plan_type = %buyer.plan_type,
            amount_minor,
            "reconciliation: started for payment event"
        );

        let customer = self.customer_resolver.resolve(buyer).await;

        let order = match customer.as_ref() {
            Some(customer) => {
                self.order_creator
                    .create_order(buyer, Some(customer), subscription_id, amount_minor)
                    .await
            }
            None => {
                warn!(
                    %subscription_id,
                    email = %buyer.email,
                    "reconciliation: skipping order creation, customer resolution failed"
                );
                None
            }
        };

        info!(
            %subscription_id,
            customer_id = customer.as_ref().map(|c| c.id),
            order_id = order.as_ref().map(|o| o.id),
            "reconciliation: finished"
        );

        ReconciliationOutcome { customer, order }
    }
}
