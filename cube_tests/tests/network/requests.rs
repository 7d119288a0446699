use super::connect;
use crate::CNODE_COUNT;
use anyhow::Result;
use cube_network::request::{
    receive_response, send_request, CalculationFlavour, CallpathTreeValuesRequest,
    RequestHeader, RequestId, Selection, TreeValuesSource,
};
use cube_network::{Connection, NetworkError, ENDIANNESS_MARKER};
use cube_server::source::{SyntheticSource, METRIC_COUNT};
use cube_types::serde::DataType;
use cube_types::values::{ValueFactory, ValueOps};
use itertools::Itertools;
use rand::prelude::*;
use std::io::Write;
use std::net::{SocketAddr, TcpStream};
use std::thread;

fn verify(
    conn: &Connection<TcpStream>,
    seq: u32,
    request: &CallpathTreeValuesRequest,
) -> Result<()> {
    let values = request.call(conn, seq, &ValueFactory::default())?;
    let (inclusive, exclusive) =
        SyntheticSource::new(CNODE_COUNT).tree_values(&request.metrics, &request.sysres)?;
    assert_eq!(inclusive, values.inclusive, "{request:?}");
    assert_eq!(exclusive, values.exclusive, "{request:?}");
    Ok(())
}

pub fn test_requests(addr: SocketAddr) -> Result<()> {
    let conn = connect(addr)?;
    let factory = ValueFactory::default();

    let request = CallpathTreeValuesRequest::new(
        vec![
            Selection::new(1, CalculationFlavour::Inclusive),
            Selection::new(2, CalculationFlavour::Exclusive),
        ],
        vec![],
    );
    let values = request.call(&conn, 1, &factory)?;
    assert_eq!(CNODE_COUNT, values.len());
    assert_eq!(DataType::Double, values.data_type()?);
    // 2 * (1 + 2 + .. + 7) inclusive at the root, plus 3 * 1.
    assert_eq!(59., values.inclusive[0].as_f64());
    assert_eq!(5., values.exclusive[0].as_f64());

    let unknown = CallpathTreeValuesRequest::new(
        vec![Selection::new(METRIC_COUNT, CalculationFlavour::Inclusive)],
        vec![],
    );
    let err = unknown.call(&conn, 2, &factory).unwrap_err();
    assert!(err.is_recoverable(), "{err:?}");

    let nothing_selected = CallpathTreeValuesRequest::default();
    let values = nothing_selected.call(&conn, 3, &factory)?;
    assert_eq!(CNODE_COUNT, values.len());
    assert!(values.inclusive.iter().all(|v| v.is_zero()));

    verify(&conn, 4, &request)?;

    conn.disconnect()?;
    Ok(())
}

pub fn test_foreign_byte_order(addr: SocketAddr) -> Result<()> {
    let mut stream = TcpStream::connect(addr)?;
    stream.write_all(&ENDIANNESS_MARKER.swap_bytes().to_ne_bytes())?;
    let conn = Connection::new(stream)?;
    conn.set_byte_swap(true);

    let request = CallpathTreeValuesRequest::new(
        vec![Selection::new(4, CalculationFlavour::Inclusive)],
        vec![Selection::new(1, CalculationFlavour::None)],
    );
    verify(&conn, 0x0102, &request)?;

    conn.disconnect()?;
    Ok(())
}

fn random_request(rng: &mut impl Rng) -> CallpathTreeValuesRequest {
    let flavours = [
        CalculationFlavour::Inclusive,
        CalculationFlavour::Exclusive,
        CalculationFlavour::Same,
        CalculationFlavour::None,
    ];
    let mut selections = |max_id: u32| {
        (0..rng.gen_range(0..4))
            .map(|_| {
                let flavour = *flavours.choose(rng).unwrap_or(&CalculationFlavour::None);
                Selection::new(rng.gen_range(0..max_id), flavour)
            })
            .collect_vec()
    };
    let metrics = selections(METRIC_COUNT);
    let sysres = selections(3);
    CallpathTreeValuesRequest::new(metrics, sysres)
}

pub fn test_concurrent_clients(addr: SocketAddr) -> Result<()> {
    thread::scope(|s| {
        let clients = (0..4)
            .map(|_| {
                s.spawn(move || -> Result<()> {
                    let conn = connect(addr)?;
                    let mut rng = thread_rng();
                    for seq in 0..8 {
                        verify(&conn, seq, &random_request(&mut rng))?;
                    }
                    conn.disconnect()?;
                    Ok(())
                })
            })
            .collect_vec();
        for client in clients {
            match client.join() {
                Ok(res) => res?,
                Err(_) => anyhow::bail!("client panicked"),
            }
        }
        Ok(())
    })
}

pub fn test_unsupported_request(addr: SocketAddr) -> Result<()> {
    let conn = connect(addr)?;
    let header = RequestHeader {
        id: RequestId::from(99),
        seq: 1,
    };
    send_request(&conn, header, |_| Ok(()))?;

    let err = receive_response(&conn, 1, |_| Ok(())).unwrap_err();
    assert!(matches!(err, NetworkError::Unrecoverable(_)), "{err:?}");

    // The server gave up on the session.
    let err = receive_response(&conn, 2, |_| Ok(())).unwrap_err();
    assert!(err.is_disconnect(), "{err:?}");
    Ok(())
}
