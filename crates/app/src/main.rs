//! Demonstration entry point.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use app::config::Config;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire the commander
    let commander = app::build_commander(&config);
    tracing::info!(default_rules = ?config.default_rules, "commander ready");

    // 4. Drive the demo
    match app::run_demo(&commander, config.demo_widgets).await {
        Ok(summary) => tracing::info!(
            succeeded = summary.succeeded,
            rejected = summary.rejected,
            "demo finished"
        ),
        Err(error) => {
            tracing::error!(%error, event_raised = error.event_raised(), "demo aborted");
            std::process::exit(1);
        }
    }

    tracing::info!(metrics = %metrics_handle.render(), "metrics snapshot");
}
