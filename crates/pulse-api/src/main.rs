//! Binary entrypoint for the Pulse API server.
use pulse_api::run;
use pulse_data::DEFAULT_SEED;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Listen address and dataset seed can be overridden with
    // PULSE_ADDR and PULSE_SEED.
    let addr = std::env::var("PULSE_ADDR").unwrap_or_else(|_| "0.0.0.0:8788".to_string());
    let seed = std::env::var("PULSE_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    run(&addr, seed).await;
}
