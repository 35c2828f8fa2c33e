//! Serve command - runs the Squad dashboard server.

use std::{sync::Arc, time::Duration};

use tokio::signal::unix::{SignalKind, signal};

use squad::{
    SystemClock,
    config::{BackendConfig, CacheConfig, Config, retry_policy},
    server::{ServerState, router},
};

use super::session_settings;
use crate::cli::ServeArgs;

/// Run the Squad server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (session, allow_list) = session_settings(&args.session)?;
    let backend = BackendConfig::parse(
        &args.backend_url,
        Duration::from_secs(args.backend_timeout),
    )?;
    let cache = CacheConfig {
        stale_after: Duration::from_secs(args.stale_after),
        retry: retry_policy(args.max_retries)?,
        ..CacheConfig::default()
    };
    let config = Config {
        session,
        allow_list,
        backend,
        cache,
    };

    tracing::info!(
        backend = %config.backend.base_url,
        allowed = %config.allow_list,
        stale_after_secs = args.stale_after,
        max_retries = args.max_retries,
        secure_cookies = config.session.secure_cookies,
        "Starting Squad server"
    );

    let state = ServerState::connect(config, Arc::new(SystemClock))?;
    let app = router(state);

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("Squad server listening on http://localhost:{}", local_addr.port());
    println!();
    println!("Available endpoints:");
    println!("  GET  /                 - Landing page");
    println!("  GET  /dashboard        - Incentive dashboard (requires sign-in)");
    println!("  GET  /leaderboard      - Team leaderboard (requires sign-in)");
    println!("  GET  /rules            - Incentive rules (requires sign-in)");
    println!("  GET  /achieved-logs    - Achieved deals (requires sign-in)");
    println!("  GET  /refund-logs      - Refunds (requires sign-in)");
    println!("  GET  /api/{{operation}}  - Backend data proxy (requires sign-in)");
    println!("  GET  /api/auth/session - Current session");
    println!("  GET  /health           - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}
