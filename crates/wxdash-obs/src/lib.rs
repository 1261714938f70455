use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging.
/// - JSON logs on stdout
/// - RUST_LOG respected; default to "info,wxdash=debug"
pub fn init(service_name: &str) {
    let default_filter = "info,wxdash=debug";
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.to_string());

    // A second init (tests, embedding) keeps the first subscriber
    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %service_name, "Logging initialized");
    }
}
