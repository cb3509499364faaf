use anyhow::Result;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::value_objects::payment_webhook::RazorpayWebhook;

type HmacSha256 = Hmac<Sha256>;

/// Verifies the `x-razorpay-signature` header (hex-encoded HMAC-SHA256 over
/// the raw body) and parses the payload.
/// https://razorpay.com/docs/webhooks/validate-test/
pub fn verify_webhook_signature(
    payload: &[u8],
    signature_header: &str,
    webhook_secret: &str,
) -> Result<RazorpayWebhook> {
    let mut mac = HmacSha256::new_from_slice(webhook_secret.as_bytes())?;
    mac.update(payload);
    let provided = hex::decode(signature_header.trim())?;

    // verify_slice is constant-time, so a forged signature cannot be probed
    // byte by byte.
    mac.verify_slice(&provided)
        .map_err(|_| anyhow::anyhow!("invalid webhook signature"))?;

    let webhook: RazorpayWebhook = serde_json::from_slice(payload)?;
    Ok(webhook)
}
