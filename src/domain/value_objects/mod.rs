pub mod buyers;
pub mod payment_webhook;
pub mod phones;
pub mod provinces;
pub mod storefront;
