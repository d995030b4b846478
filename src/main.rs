use std::sync::Arc;
use std::time::Duration;

use bmi_assist::chart::InMemoryChartStore;
use bmi_assist::chat::{ChatRouteState, SessionStore, chat_routes, cli, spawn_expiry_task};
use bmi_assist::config::{AppConfig, RunMode};
use bmi_assist::error::Result;
use bmi_assist::intake::IntakeMachine;
use bmi_assist::percentile::JsonFileTableProvider;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("📏 BMI Assist v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Percentile table: {}", config.table_path.display());

    let tables = Arc::new(JsonFileTableProvider::new(config.table_path.clone()));
    let charts = Arc::new(InMemoryChartStore::new(config.max_charts));
    let machine = Arc::new(
        IntakeMachine::new(tables, charts.clone()).with_limits(config.limits.clone()),
    );

    match config.mode {
        RunMode::Cli => {
            eprintln!("   Mode: cli (type /quit to exit)\n");
            cli::run(&machine).await?;
        }
        RunMode::Server => {
            let sessions = SessionStore::new();
            let _expiry_handle = spawn_expiry_task(
                Arc::clone(&sessions),
                config.session_idle_timeout,
                Duration::from_secs(60),
            );

            let app = chat_routes(ChatRouteState {
                machine,
                sessions,
                charts,
            });

            let listener =
                tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
            eprintln!("   Chat API: http://0.0.0.0:{}/api/message", config.port);
            eprintln!(
                "   Session idle timeout: {}s\n",
                config.session_idle_timeout.as_secs()
            );
            tracing::info!(port = config.port, "Chat server started");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
