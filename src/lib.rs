pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

use std::sync::Arc;

use anyhow::Result;
use infrastructure::razorpay::razorpay_client::RazorpayClient;
use infrastructure::shopify::shopify_client::ShopifyClient;
use tracing::info;
use tracing_subscriber::EnvFilter;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let shopify_client = ShopifyClient::new(&dotenvy_env.shopify)?;
    info!("Shopify admin client is ready");

    let razorpay_client = RazorpayClient::new(&dotenvy_env.razorpay)?;
    info!("Razorpay client is ready");

    infrastructure::axum_http::http_serve::start(
        Arc::new(dotenvy_env),
        Arc::new(shopify_client),
        Arc::new(razorpay_client),
    )
    .await?;

    Ok(())
}
