pub mod customer_resolver;
pub mod order_creator;
pub mod reconciliation;
