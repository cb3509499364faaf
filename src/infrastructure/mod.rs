pub mod axum_http;
pub mod razorpay;
pub mod shopify;
