pub mod razorpay_client;
pub mod webhook_verifier;
