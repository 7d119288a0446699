use cube_network::request::{
    receive_request_header, send_error_response, CallpathTreeValuesRequest, TreeValuesSource,
};
use cube_network::transport::Transport;
use cube_network::{Connection, NetworkError};
use std::net::TcpStream;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub type SharedSource = Arc<dyn TreeValuesSource + Send + Sync>;

/// Reads one request and sends its response.
pub fn handle_request<T: Transport>(
    conn: &Connection<T>,
    source: &dyn TreeValuesSource,
) -> cube_network::Result<()> {
    let (header, request) = {
        let mut rx = conn.receiver()?;
        let header = receive_request_header(&mut rx)?;
        if header.id != CallpathTreeValuesRequest::ID {
            drop(rx);
            // The payload length is unknown, so the stream cannot be resynchronized.
            let err = NetworkError::unrecoverable(format!("Unsupported request id {}", *header.id));
            send_error_response(conn, header.seq, &err)?;
            return Err(err);
        }
        (header, CallpathTreeValuesRequest::receive(&mut rx)?)
    };
    tracing::debug!(
        seq = header.seq,
        metrics = request.metrics.len(),
        sysres = request.sysres.len(),
        "Callpath tree values requested."
    );
    request.respond(conn, header.seq, source)
}

/// Serves requests on one connection until the client leaves or the connection is stopped.
pub fn serve_connection<T: Transport>(
    conn: &Connection<T>,
    source: &dyn TreeValuesSource,
) -> cube_network::Result<()> {
    conn.handshake_server()?;
    conn.read_until_stopped(|conn| handle_request(conn, source))
}

struct Session {
    conn: Arc<Connection<TcpStream>>,
    task: JoinHandle<()>,
}

/// Accepts clients until `terminate` fires, then disconnects every client and waits for its
/// session to end.
pub async fn run(
    listener: TcpListener,
    source: SharedSource,
    mut terminate: oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let mut sessions: Vec<Session> = vec![];
    loop {
        tokio::select! {
            _ = &mut terminate => break,
            accepted = listener.accept() => {
                let (stream, peer) = accepted?;
                sessions.retain(|session| !session.task.is_finished());

                let stream = stream.into_std()?;
                stream.set_nonblocking(false)?;
                let conn = Arc::new(Connection::new(stream)?);
                let task = {
                    let conn = Arc::clone(&conn);
                    let source = Arc::clone(&source);
                    tokio::task::spawn_blocking(move || {
                        tracing::info!(%peer, "Client connected.");
                        match serve_connection(conn.as_ref(), source.as_ref()) {
                            Ok(()) => tracing::info!(%peer, "Client left."),
                            Err(e) => tracing::warn!(%peer, "Session ended: {e}"),
                        }
                        if let Err(e) = conn.disconnect() {
                            tracing::debug!(%peer, "Disconnect failed: {e}");
                        }
                    })
                };
                sessions.push(Session { conn, task });
            }
        }
    }

    tracing::info!("Disconnecting {} clients.", sessions.len());
    // Disconnecting waits on each send lock, which a busy session may hold.
    let conns = sessions
        .iter()
        .map(|session| Arc::clone(&session.conn))
        .collect::<Vec<_>>();
    tokio::task::spawn_blocking(move || {
        for conn in conns {
            if let Err(e) = conn.disconnect() {
                tracing::debug!("Disconnect failed: {e}");
            }
        }
    })
    .await?;
    for session in sessions {
        session.task.await?;
    }
    Ok(())
}
