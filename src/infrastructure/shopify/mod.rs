pub mod shopify_client;
