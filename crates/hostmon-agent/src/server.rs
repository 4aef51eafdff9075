use crate::data_source::KeyProcessor;
use crate::handler::RequestHandler;
use hostmon_collector::provider::HostStatsProvider;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, Duration, MissedTickBehavior};

/// Accepts connections forever, servicing each on its own task.
///
/// # Errors
///
/// Returns an error only if accepting on the listener fails.
pub async fn serve(
    listener: TcpListener,
    processor: Arc<dyn KeyProcessor>,
    io_timeout: Duration,
) -> anyhow::Result<()> {
    tracing::info!(addr = %listener.local_addr()?, "Listening for requests");

    loop {
        let (stream, peer) = listener.accept().await?;
        let processor = Arc::clone(&processor);
        tokio::spawn(async move {
            serve_connection(stream, peer, processor, io_timeout).await;
        });
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    peer: SocketAddr,
    processor: Arc<dyn KeyProcessor>,
    io_timeout: Duration,
) {
    let handler = RequestHandler::new(processor);
    match timeout(io_timeout, handler.handle(&mut stream)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::warn!(peer = %peer, error = %e, "Request aborted"),
        Err(_) => tracing::warn!(peer = %peer, timeout_secs = io_timeout.as_secs(), "Request timed out"),
    }
    if let Err(e) = stream.shutdown().await {
        tracing::debug!(peer = %peer, error = %e, "Shutdown after request failed");
    }
}

/// Spawns the periodic sampling of windowed counters.
pub fn spawn_collection(provider: Arc<dyn HostStatsProvider>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(every);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval_secs = every.as_secs(), "Starting collection loop");

        loop {
            tick.tick().await;
            let provider = Arc::clone(&provider);
            if let Err(e) = tokio::task::spawn_blocking(move || provider.collect()).await {
                tracing::error!(error = %e, "Collection task failed");
            }
        }
    })
}
