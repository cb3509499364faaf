use tracing::error;

#[tokio::main]
async fn main() {
    if let Err(error) = storefront_sync::run().await {
        error!("storefront-sync exited with error: {}", error);
        std::process::exit(1);
    }
}
