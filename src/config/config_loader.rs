use anyhow::Result;

use super::config_model::DotEnvyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let server = super::config_model::Server {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let shopify = super::config_model::Shopify {
        domain: std::env::var("SHOPIFY_DOMAIN").expect("SHOPIFY_DOMAIN is invalid"),
        api_version: std::env::var("SHOPIFY_API_VERSION").expect("SHOPIFY_API_VERSION is invalid"),
        admin_access_token: std::env::var("SHOPIFY_ADMIN_ACCESS_TOKEN")
            .expect("SHOPIFY_ADMIN_ACCESS_TOKEN is invalid"),
    };

    let razorpay = super::config_model::Razorpay {
        key_id: std::env::var("RAZORPAY_KEY_ID").expect("RAZORPAY_KEY_ID is invalid"),
        key_secret: std::env::var("RAZORPAY_KEY_SECRET").expect("RAZORPAY_KEY_SECRET is invalid"),
        webhook_secret: std::env::var("RAZORPAY_WEBHOOK_SECRET")
            .expect("RAZORPAY_WEBHOOK_SECRET is invalid"),
        digital_plan_id: std::env::var("RAZORPAY_DIGITAL_PLAN_ID").ok(),
        print_plan_id: std::env::var("RAZORPAY_PRINT_PLAN_ID").ok(),
    };

    Ok(DotEnvyConfig {
        server,
        shopify,
        razorpay,
    })
}
