use khazaana::config::{Config, Repositories};
use khazaana::services::{mailer::build_mailer, server::bind_with_retry};
use khazaana::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    khazaana::init_tracing();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;

    let repositories = Repositories::connect(&config).await?;
    let mailer = build_mailer(&config)?;
    tracing::info!(delivery = ?config.otp_delivery, "OTP delivery configured");

    let state = AppState::new(repositories, mailer, &config);
    let app = khazaana::create_app(state, &config);

    let listener = bind_with_retry(&config.host, config.port).await?;
    let addr = listener.local_addr()?;
    tracing::info!("Server running on port {}", addr.port());
    tracing::info!("Environment: {}", config.environment.as_str());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
