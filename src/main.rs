use clap::Parser;
use frigo::{
    api::{routes, AppState},
    cli::{Cli, Commands},
    store::HttpRecipeStore,
    Error, IndexMaintainer, IngredientIndex, Readiness, Result, Settings,
};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if it exists
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,frigo=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    settings.validate()?;

    match cli.command {
        Commands::Serve { port, host } => {
            serve(settings, port, host).await?;
        }
        Commands::Search {
            ingredients,
            strict,
            server,
        } => {
            let server_url = server.unwrap_or_else(|| {
                format!("http://{}:{}", settings.server.host, settings.server.port)
            });
            frigo::cli::commands::search(&server_url, &ingredients, strict).await?;
        }
    }

    Ok(())
}

async fn serve(mut settings: Settings, port: Option<u16>, host: Option<String>) -> Result<()> {
    if let Some(port) = port {
        settings.server.port = port;
    }
    if let Some(host) = host {
        settings.server.host = host;
    }

    info!("Starting Frigo server");
    info!("Recipe store: {}", settings.store.base_url);

    let index = Arc::new(IngredientIndex::new());
    let maintainer = IndexMaintainer::new(index.clone());
    let readiness = Arc::new(Readiness::new());

    // Events arriving during bootstrap wait in the queue
    let (events, receiver) = IndexMaintainer::channel(settings.matching.event_queue_capacity);

    let store = HttpRecipeStore::new(&settings.store)?;

    let state = AppState {
        index,
        events,
        readiness: readiness.clone(),
        settings: settings.clone(),
    };

    let app = routes::create_router(state, &settings);

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    info!("Server listening on {}", addr);

    // Serve store notifications and health checks while the index bootstraps
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    });

    let bootstrap = maintainer
        .bootstrap_and_start(
            &store,
            settings.store.bootstrap_concurrency,
            shutdown_signal(),
            receiver,
            &readiness,
        )
        .await;

    let _consumer = match bootstrap {
        Ok(handle) => handle,
        Err(e) => {
            server.abort();
            return Err(e);
        }
    };

    server
        .await
        .map_err(|e| Error::Internal(format!("Server task failed: {e}")))?
        .map_err(|e| Error::Internal(format!("Server error: {e}")))?;

    info!("Shutting down...");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
