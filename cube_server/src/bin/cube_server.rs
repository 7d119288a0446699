use anyhow::Result;
use cube_server::config::ServerConfig;
use cube_server::server;
use cube_server::source::SyntheticSource;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::oneshot;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut signal = signal(SignalKind::interrupt())?;

    let config = ServerConfig::from_env()?;
    let source = Arc::new(SyntheticSource::new(config.cnode_count));

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let (terminate_tx, terminate_rx) = oneshot::channel::<()>();
    let server_task = tokio::spawn(server::run(listener, source, terminate_rx));

    signal.recv().await;
    tracing::info!("Received process signal.");

    terminate_tx.send(()).ok();
    server_task.await??;

    Ok(())
}
