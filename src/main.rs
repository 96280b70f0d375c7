use dotenv::dotenv;
use tracing::{error, info, warn};

use fieldworks_backend::app::App;
use fieldworks_backend::util::logger::Logger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before the logger reads LOG_DIR and RUST_LOG
    let env_loaded = dotenv();
    let _logger = Logger::new()?;

    info!("🚀 Starting Fieldworks Backend");
    match env_loaded {
        Ok(_) => info!("✅ Successfully loaded .env file"),
        Err(e) => warn!("⚠️ Failed to load .env file: {} (using system env vars)", e),
    }

    let app = App::new().await.map_err(|e| {
        error!("Failed to initialise application: {}", e);
        e
    })?;
    app.start().await
}
