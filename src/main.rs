use shipdesk_backend::app::app::App;
use shipdesk_backend::util::logger::Logger;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // .env first, it may carry the log levels
    let dotenv_result = dotenv::dotenv();

    let _logger = Logger::new()
        .map_err(|e| {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .init();
            warn!("File logging disabled: {}", e);
        })
        .ok();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting shipdesk backend");
    if let Err(e) = dotenv_result {
        warn!("No .env file loaded ({}), using process environment", e);
    }

    let app = match App::new().await {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialise application: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = app.start().await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
