//! OpenID Connect Dynamic Client Registration server binary.
//!
//! Loads configuration from the environment, builds the client store and
//! registration service, and serves the registration endpoints with graceful
//! shutdown.

use anyhow::Result;
use oidc_registration::{
    config::Config,
    http::{AppState, build_router},
    oauth::clients::{
        ClientRegistrationService, MetadataValidator, RandomCredentialGenerator,
        RegistrationEvents, TracingObserver,
    },
    storage::{ClientStore, create_storage_backend, parse_storage_backend},
};
use std::{env, sync::Arc};

use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "oidc_registration=debug,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().pretty())
        .init();

    let version = oidc_registration::config::version()?;

    env::args().for_each(|arg| {
        if arg == "--version" {
            println!("{version}");
            std::process::exit(0);
        }
    });

    tracing::info!(?version, "Starting oidc-registration");

    let config = Config::new()?;

    let backend = parse_storage_backend(&config.storage_backend, config.database_url.as_deref())?;
    tracing::info!(backend = %config.storage_backend, "Initializing client storage");
    let adapter = create_storage_backend(backend).await?;
    let store = Arc::new(ClientStore::new(adapter));

    let validator = MetadataValidator::new(Arc::new(config.algorithm_registry()))
        .reject_unknown_fields(*config.reject_unknown_metadata.as_ref());

    let events = RegistrationEvents::new().with_observer(Arc::new(TracingObserver));

    let registration_service = Arc::new(
        ClientRegistrationService::new(
            store,
            validator,
            Arc::new(RandomCredentialGenerator),
            config.external_base.as_ref(),
        )
        .with_events(events),
    );

    // Build the router
    let app = build_router(AppState::new(registration_service));

    // Setup graceful shutdown
    let tracker = TaskTracker::new();
    let token = CancellationToken::new();

    {
        let tracker = tracker.clone();
        let inner_token = token.clone();

        let ctrl_c = async {
            if let Err(err) = signal::ctrl_c().await {
                tracing::error!("failed to install Ctrl+C handler: {}", err);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(err) => {
                    tracing::error!("failed to install signal handler: {}", err);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::spawn(async move {
            tokio::select! {
                () = inner_token.cancelled() => { },
                _ = terminate => {},
                _ = ctrl_c => {},
            }

            tracker.close();
            inner_token.cancel();
        });
    }

    // Start HTTP server
    {
        let http_port = *config.http_port.as_ref();
        let bind_address = format!("0.0.0.0:{http_port}");
        let listener = TcpListener::bind(&bind_address).await?;
        tracing::info!("Starting server on {bind_address}");

        let inner_token = token.clone();
        tracker.spawn(async move {
            let shutdown_token = inner_token.clone();
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    tokio::select! {
                        () = shutdown_token.cancelled() => { }
                    }
                    tracing::info!("axum graceful shutdown complete");
                })
                .await;
            if let Err(err) = result {
                tracing::error!("axum task failed: {}", err);
            }

            inner_token.cancel();
        });
    }

    tracker.wait().await;

    Ok(())
}
