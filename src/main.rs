//! Entry point for the Attendance Engine binary.
//!
//! Running this binary will start an HTTP server that exposes the
//! summary engine and roster analytics.  Configuration is read from the
//! environment (see [`attendance_engine::config`]); log verbosity is
//! controlled with `RUST_LOG`.

use attendance_engine::config::Config;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {:#}", err);
            std::process::exit(1);
        }
    };
    if let Err(err) = attendance_engine::api::serve(config).await {
        error!("Error running server: {:#}", err);
        std::process::exit(1);
    }
}
