#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub server: Server,
    pub shopify: Shopify,
    pub razorpay: Razorpay,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Shopify {
    pub domain: String,
    pub api_version: String,
    pub admin_access_token: String,
}

#[derive(Debug, Clone)]
pub struct Razorpay {
    pub key_id: String,
    pub key_secret: String,
    pub webhook_secret: String,
    pub digital_plan_id: Option<String>,
    pub print_plan_id: Option<String>,
}
