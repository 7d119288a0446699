//! Request/response envelopes.
//!
//! ```text
//! request:  START  id:u32    seq:u32  END  payload                PAYLOAD_END
//! response: START  code:u32  seq:u32  END  payload | error:string  PAYLOAD_END
//! ```

mod callpath_tree_values;
mod selection;


pub use callpath_tree_values::*;
pub use selection::*;

use crate::connection::{Connection, Receiver, Sender};
use crate::error::{NetworkError, Result};
use crate::transport::Transport;
use cube_types::serde::{FieldReader, FieldWriter};
use derive_more::{Deref, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;
use std::io::{Read, Write};

pub const REQUEST_HEADER_START: u32 = 0x4355_4245;
pub const REQUEST_HEADER_END: u32 = 0x2d43_432d;
pub const REQUEST_PAYLOAD_END: u32 = 0x4542_3543;

#[derive(From, Deref, PartialEq, Eq, Clone, Copy, Debug)]
pub struct RequestId(u32);

impl RequestId {
    pub const CALLPATH_TREE_VALUES: RequestId = RequestId(20);
}

#[derive(FromPrimitive, ToPrimitive, PartialEq, Eq, Clone, Copy, Debug)]
#[repr(u32)]
pub enum ResponseCode {
    Ok = 0,
    ErrorRecoverable = 1,
    ErrorUnrecoverable = 2,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct RequestHeader {
    pub id: RequestId,
    pub seq: u32,
}

fn expect_marker<R: Read>(rx: &mut Receiver<'_, R>, expected: u32, what: &str) -> Result<()> {
    let actual = rx.get::<u32>()?;
    if actual != expected {
        return Err(NetworkError::unrecoverable(format!(
            "Expected {what} marker {expected:#010x}, got {actual:#010x}"
        )));
    }
    Ok(())
}

pub fn send_request<T, F>(conn: &Connection<T>, header: RequestHeader, write_payload: F) -> Result<()>
where
    T: Transport,
    F: FnOnce(&mut Sender<'_, T::Writer>) -> Result<()>,
{
    tracing::debug!(id = *header.id, seq = header.seq, "Sending request.");
    let mut tx = conn.sender()?;
    tx.put(REQUEST_HEADER_START)?;
    tx.put(*header.id)?;
    tx.put(header.seq)?;
    tx.put(REQUEST_HEADER_END)?;
    write_payload(&mut tx)?;
    tx.put(REQUEST_PAYLOAD_END)?;
    tx.flush()
}

pub fn receive_request_header<R: Read>(rx: &mut Receiver<'_, R>) -> Result<RequestHeader> {
    expect_marker(rx, REQUEST_HEADER_START, "request start")?;
    let id = RequestId(rx.get()?);
    let seq = rx.get()?;
    expect_marker(rx, REQUEST_HEADER_END, "request header end")?;
    Ok(RequestHeader { id, seq })
}

pub fn receive_payload_end<R: Read>(rx: &mut Receiver<'_, R>) -> Result<()> {
    expect_marker(rx, REQUEST_PAYLOAD_END, "payload end")
}

fn put_response_header<W: Write>(tx: &mut Sender<'_, W>, code: ResponseCode, seq: u32) -> Result<()> {
    tx.put(REQUEST_HEADER_START)?;
    tx.put(code as u32)?;
    tx.put(seq)?;
    tx.put(REQUEST_HEADER_END)?;
    Ok(())
}

pub fn send_response<T, F>(conn: &Connection<T>, seq: u32, write_payload: F) -> Result<()>
where
    T: Transport,
    F: FnOnce(&mut Sender<'_, T::Writer>) -> Result<()>,
{
    let mut tx = conn.sender()?;
    put_response_header(&mut tx, ResponseCode::Ok, seq)?;
    write_payload(&mut tx)?;
    tx.put(REQUEST_PAYLOAD_END)?;
    tx.flush()
}

pub fn send_error_response<T: Transport>(
    conn: &Connection<T>,
    seq: u32,
    err: &NetworkError,
) -> Result<()> {
    let code = if err.is_recoverable() {
        ResponseCode::ErrorRecoverable
    } else {
        ResponseCode::ErrorUnrecoverable
    };
    let mut tx = conn.sender()?;
    put_response_header(&mut tx, code, seq)?;
    let msg = match err {
        NetworkError::Recoverable(msg) | NetworkError::Unrecoverable(msg) => msg.clone(),
        other => other.to_string(),
    };
    tx.put_str(&msg)?;
    tx.put(REQUEST_PAYLOAD_END)?;
    tx.flush()
}

/// Reads one response. An error response surfaces as `Err` with the peer's message, after the
/// whole envelope has been consumed.
pub fn receive_response<T, F, Out>(conn: &Connection<T>, seq: u32, read_payload: F) -> Result<Out>
where
    T: Transport,
    F: FnOnce(&mut Receiver<'_, T::Reader>) -> Result<Out>,
{
    let mut rx = conn.receiver()?;
    expect_marker(&mut rx, REQUEST_HEADER_START, "response start")?;
    let code = rx.get::<u32>()?;
    let code = ResponseCode::from_u32(code)
        .ok_or_else(|| NetworkError::unrecoverable(format!("Unknown response code {code}")))?;
    let actual_seq = rx.get::<u32>()?;
    expect_marker(&mut rx, REQUEST_HEADER_END, "response header end")?;
    if actual_seq != seq {
        return Err(NetworkError::unrecoverable(format!(
            "Response to request {actual_seq} while awaiting {seq}"
        )));
    }
    match code {
        ResponseCode::Ok => {
            let out = read_payload(&mut rx)?;
            receive_payload_end(&mut rx)?;
            Ok(out)
        }
        ResponseCode::ErrorRecoverable => {
            let msg = rx.get_str()?;
            receive_payload_end(&mut rx)?;
            Err(NetworkError::Recoverable(msg))
        }
        ResponseCode::ErrorUnrecoverable => {
            let msg = rx.get_str()?;
            receive_payload_end(&mut rx)?;
            Err(NetworkError::Unrecoverable(msg))
        }
    }
}
