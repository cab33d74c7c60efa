#![cfg(not(tarpaulin_include))]

use env_logger::Env;
use service_dashboard::app;
use service_dashboard::config::AppConfig;

/// Main entry point for the dashboard web server
///
/// Configuration comes from the environment: `PORT` (default 8080),
/// `DASHBOARD_STORE` (`memory`, `session`, `sqlite` or `file`),
/// `DATABASE_URL` for the sqlite store and `DASHBOARD_SNAPSHOT` for the file
/// store. Logging follows `RUST_LOG`, defaulting to `info`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AppConfig::from_env()?;
    app::run(config).await
}
