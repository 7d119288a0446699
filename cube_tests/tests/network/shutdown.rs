use super::{connect, TestServer};
use crate::CNODE_COUNT;
use anyhow::Result;
use cube_network::request::{CalculationFlavour, CallpathTreeValuesRequest, Selection};
use cube_types::serde::FieldReader;
use cube_types::values::ValueFactory;
use std::time::Duration;

pub async fn test_shutdown_with_idle_client() -> Result<()> {
    let server = TestServer::start(CNODE_COUNT).await?;
    let addr = server.addr;

    let conn = tokio::task::spawn_blocking(move || -> Result<_> {
        let conn = connect(addr)?;
        let request = CallpathTreeValuesRequest::new(
            vec![Selection::new(0, CalculationFlavour::Same)],
            vec![],
        );
        request.call(&conn, 1, &ValueFactory::default())?;
        Ok(conn)
    })
    .await??;

    server.stop().await?;

    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut received = 0;
        conn.read_until_stopped(|conn| {
            conn.receiver()?.get::<u32>()?;
            received += 1;
            Ok(())
        })?;
        assert_eq!(0, received);
        assert!(!conn.is_established());
        Ok(())
    })
    .await?
}

/// Shutdown must not stall the runtime that drives the accept loop.
pub async fn test_shutdown_with_many_idle_clients() -> Result<()> {
    let server = TestServer::start(CNODE_COUNT).await?;
    let addr = server.addr;

    let conns = tokio::task::spawn_blocking(move || -> Result<Vec<_>> {
        let mut conns = vec![];
        for seq in 0..3 {
            let conn = connect(addr)?;
            let request = CallpathTreeValuesRequest::new(
                vec![Selection::new(1, CalculationFlavour::Exclusive)],
                vec![],
            );
            request.call(&conn, seq, &ValueFactory::default())?;
            conns.push(conn);
        }
        Ok(conns)
    })
    .await??;

    tokio::time::timeout(Duration::from_secs(10), server.stop()).await??;

    tokio::task::spawn_blocking(move || -> Result<()> {
        for conn in conns {
            conn.read_until_stopped(|conn| {
                conn.receiver()?.get::<u32>()?;
                Ok(())
            })?;
            assert!(!conn.is_established());
        }
        Ok(())
    })
    .await?
}
