use anyhow::{Context, Result};
use clap::Parser;
use student_directory::{
    api, config,
    directory::{StudentDirectory, seed},
    logging,
};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the student directory over HTTP.
#[derive(Parser)]
#[command(name = "student-directory", version, about)]
struct Cli {
    /// Listen on this port instead of SERVER_PORT or the first free port in 8000-8099.
    #[arg(long)]
    port: Option<u16>,
    /// Start with an empty directory instead of the sample students.
    #[arg(long)]
    no_seed: bool,
    /// Let create overwrite an existing student with the same id.
    #[arg(long)]
    allow_upsert: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::init_config()
        .context("failed to load configuration")?
        .apply_overrides(cli.port, cli.no_seed, cli.allow_upsert);
    logging::init_tracing(&config);
    tracing::debug!(
        server_port = ?config.server_port,
        seed_sample_data = config.seed_sample_data,
        allow_upsert = config.allow_upsert,
        "Loaded configuration"
    );

    tracing::info!("Starting application...");
    let directory = StudentDirectory::new().with_create_policy(config.create_policy());
    if config.seed_sample_data {
        seed::load_samples(&directory).context("failed to load sample students")?;
    }
    let app = api::create_router(Arc::new(directory));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    tracing::info!("Shutting down application...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Received shutdown signal");
}

async fn bind_listener(server_port: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
