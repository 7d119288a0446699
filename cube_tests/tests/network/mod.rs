pub mod requests;
pub mod shutdown;

use anyhow::Result;
use cube_network::Connection;
use cube_server::server;
use cube_server::source::SyntheticSource;
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub struct TestServer {
    pub addr: SocketAddr,
    terminate_tx: oneshot::Sender<()>,
    task: JoinHandle<Result<()>>,
}

impl TestServer {
    pub async fn start(cnode_count: usize) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (terminate_tx, terminate_rx) = oneshot::channel::<()>();
        let source = Arc::new(SyntheticSource::new(cnode_count));
        let task = tokio::spawn(server::run(listener, source, terminate_rx));
        Ok(Self {
            addr,
            terminate_tx,
            task,
        })
    }

    pub async fn stop(self) -> Result<()> {
        self.terminate_tx.send(()).ok();
        self.task.await?
    }
}

pub fn connect(addr: SocketAddr) -> Result<Connection<TcpStream>> {
    let conn = Connection::new(TcpStream::connect(addr)?)?;
    conn.handshake_client()?;
    Ok(conn)
}
