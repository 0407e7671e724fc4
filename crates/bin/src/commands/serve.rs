//! Serve command - runs the ScholarAI HTTP server.

use std::time::Duration;

use tokio::signal::unix::{SignalKind, signal};

use scholarai::{
    ScholarService,
    config::{Provider, ProviderConfig, RetryPolicy},
    server::{self, API_PATH, AppState},
};

use crate::cli::ServeArgs;

/// Apply command-line overrides to the provider config.
fn configure(mut config: ProviderConfig, args: &ServeArgs) -> scholarai::Result<ProviderConfig> {
    if let Some(url) = &args.provider_url {
        config = config.with_base_url(url)?;
    }
    if let Some(model) = &args.fast_model {
        config = config.with_fast_model(model);
    }
    if let Some(model) = &args.reasoning_model {
        config = config.with_reasoning_model(model);
    }
    Ok(config)
}

/// Run the ScholarAI server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let provider: Provider = args.provider.into();
    let policy = RetryPolicy::new(args.max_attempts, Duration::from_millis(args.backoff_ms));

    // Without a credential the server still starts and answers every
    // operation with configuration guidance.
    let state = match ProviderConfig::from_env(provider) {
        Ok(config) => {
            let config = configure(config, args)?;
            tracing::info!(
                %provider,
                base_url = %config.base_url,
                fast = %config.fast.model,
                reasoning = %config.reasoning.model,
                max_attempts = policy.max_attempts,
                "Provider configured"
            );
            AppState::new(ScholarService::from_config(config, policy)?)
        }
        Err(e) => {
            tracing::warn!("{e}");
            AppState::unconfigured(provider)
        }
    };
    let configured = state.is_configured();

    // Bind server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("ScholarAI server listening on http://{local_addr}");
    println!("Provider: {provider}{}", if configured { "" } else { " (no API key configured)" });
    println!();
    println!("Available endpoints:");
    println!("  POST {API_PATH}  - Tutoring operations (chat, notes, doubt, quiz, career, plan)");
    println!("  POST /api         - Alias of {API_PATH}");
    println!("  GET  /health      - Health check");
    println!();
    println!("Press Ctrl+C to shutdown");

    server::serve(listener, state, shutdown_signal()).await?;

    println!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let (mut sigterm, mut sigint) =
        match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                tracing::error!("Failed to set up signal handlers: {e}");
                std::future::pending::<()>().await;
                return;
            }
        };

    tokio::select! {
        _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
        _ = sigint.recv() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
    }
}
