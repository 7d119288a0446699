use crate::error::{NetworkError, Result};
use crate::transport::{Transport, TransportWriter};
use cube_types::serde::{Field, FieldReader, FieldWriter, Framing, Padding};
use cube_types::values::{Value, ValueOps};
use cube_types::ValueError;
use std::io::{BufReader, BufWriter, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// The first field a client sends. A server reading it byte-reversed talks to a client of the
/// other endianness.
pub const ENDIANNESS_MARKER: u32 = 0x0102_0304;

/// A message-oriented stream over which values travel in self-describing framing.
///
/// Sending and receiving are independently serialized: a message is written while holding the
/// [`Sender`] guard and read while holding the [`Receiver`] guard, so concurrent senders never
/// interleave their fields.
pub struct Connection<T: Transport> {
    receive: Mutex<BufReader<T::Reader>>,
    send: Mutex<BufWriter<T::Writer>>,
    byte_swap: AtomicBool,
    stop_reading: AtomicBool,
    established: AtomicBool,
}

impl<T: Transport> Connection<T> {
    pub fn new(transport: T) -> Result<Self> {
        let (reader, writer) = transport.split()?;
        Ok(Self {
            receive: Mutex::new(BufReader::new(reader)),
            send: Mutex::new(BufWriter::new(writer)),
            byte_swap: AtomicBool::new(false),
            stop_reading: AtomicBool::new(false),
            established: AtomicBool::new(true),
        })
    }

    pub fn set_byte_swap(&self, swap: bool) {
        self.byte_swap.store(swap, Ordering::SeqCst);
    }

    pub fn byte_swap(&self) -> bool {
        self.byte_swap.load(Ordering::SeqCst)
    }

    pub fn sender(&self) -> Result<Sender<'_, T::Writer>> {
        let out = self
            .send
            .lock()
            .map_err(|_| NetworkError::unrecoverable("send half poisoned"))?;
        Ok(Sender {
            out,
            swap: self.byte_swap(),
            scratch: Vec::with_capacity(8),
        })
    }

    pub fn receiver(&self) -> Result<Receiver<'_, T::Reader>> {
        let input = self
            .receive
            .lock()
            .map_err(|_| NetworkError::unrecoverable("receive half poisoned"))?;
        Ok(Receiver {
            input,
            swap: self.byte_swap(),
            scratch: Vec::with_capacity(8),
        })
    }

    /// Announces this end's byte order.
    pub fn handshake_client(&self) -> Result<()> {
        let mut tx = self.sender()?;
        tx.swap = false;
        tx.put(ENDIANNESS_MARKER)?;
        tx.flush()
    }

    /// Reads the client's byte order announcement and enables byte swapping if it differs.
    pub fn handshake_server(&self) -> Result<()> {
        let marker = {
            let mut rx = self.receiver()?;
            rx.swap = false;
            rx.get::<u32>()?
        };
        if marker == ENDIANNESS_MARKER {
            self.set_byte_swap(false);
        } else if marker == ENDIANNESS_MARKER.swap_bytes() {
            tracing::debug!("Peer has the other byte order. Swapping.");
            self.set_byte_swap(true);
        } else {
            return Err(NetworkError::unrecoverable(format!(
                "Unexpected endianness marker {marker:#010x}"
            )));
        }
        Ok(())
    }

    /// Makes [`Self::read_until_stopped`] return before its next message.
    pub fn stop_reading(&self) {
        self.stop_reading.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_reading.load(Ordering::SeqCst)
    }

    pub fn is_established(&self) -> bool {
        self.established.load(Ordering::SeqCst)
    }

    /// Calls `on_message` once per incoming message, until stopped or until the peer closes the
    /// stream. Errors other than a disconnect end the loop and are returned.
    pub fn read_until_stopped<F>(&self, mut on_message: F) -> Result<()>
    where
        F: FnMut(&Self) -> Result<()>,
    {
        while !self.is_stopped() {
            match on_message(self) {
                Ok(()) => {}
                Err(e) if e.is_disconnect() => {
                    tracing::debug!("Peer disconnected.");
                    self.established.store(false, Ordering::SeqCst);
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn disconnect(&self) -> Result<()> {
        self.stop_reading();
        self.established.store(false, Ordering::SeqCst);
        let mut out = self
            .send
            .lock()
            .map_err(|_| NetworkError::unrecoverable("send half poisoned"))?;
        out.flush()?;
        out.get_mut().shutdown()?;
        Ok(())
    }
}

/// Exclusive access to the sending half for the duration of one message.
pub struct Sender<'c, W: Write> {
    out: MutexGuard<'c, BufWriter<W>>,
    swap: bool,
    scratch: Vec<u8>,
}

impl<'c, W: Write> Sender<'c, W> {
    pub fn send_value(&mut self, value: &Value) -> Result<()> {
        value.encode(self)?;
        Ok(())
    }

    /// Pushes buffered fields to the peer. Call once the message is complete.
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

impl<'c, W: Write> FieldWriter for Sender<'c, W> {
    fn framing(&self) -> Framing {
        Framing::SelfDescribing
    }
    fn put<F: Field>(&mut self, field: F) -> cube_types::Result<()> {
        self.scratch.clear();
        if self.swap {
            field.swap_bytes().put_ne(&mut self.scratch);
        } else {
            field.put_ne(&mut self.scratch);
        }
        self.out.write_all(&self.scratch)?;
        Ok(())
    }
    fn put_bytes(&mut self, bytes: &[u8]) -> cube_types::Result<()> {
        self.out.write_all(bytes)?;
        Ok(())
    }
    fn pad(&mut self, _padding: Padding) -> cube_types::Result<()> {
        Ok(())
    }
}

/// Exclusive access to the receiving half for the duration of one message.
pub struct Receiver<'c, R: Read> {
    input: MutexGuard<'c, BufReader<R>>,
    swap: bool,
    scratch: Vec<u8>,
}

impl<'c, R: Read> Receiver<'c, R> {
    /// Overwrites `value` with the incoming one of the same variant.
    pub fn receive_value(&mut self, value: &mut Value) -> Result<()> {
        value.decode(self)?;
        Ok(())
    }
}

impl<'c, R: Read> FieldReader for Receiver<'c, R> {
    fn framing(&self) -> Framing {
        Framing::SelfDescribing
    }
    fn get<F: Field>(&mut self) -> cube_types::Result<F> {
        self.scratch.resize(F::WIDTH, 0);
        self.input.read_exact(&mut self.scratch)?;
        let field = F::get_ne(&self.scratch);
        Ok(if self.swap { field.swap_bytes() } else { field })
    }
    fn get_bytes(&mut self, len: usize) -> cube_types::Result<Vec<u8>> {
        // Grows as bytes arrive, so a corrupt length cannot allocate up front.
        let mut bytes = vec![];
        (&mut *self.input).take(len as u64).read_to_end(&mut bytes)?;
        if bytes.len() < len {
            return Err(ValueError::Truncated {
                needed: len,
                available: bytes.len(),
            });
        }
        Ok(bytes)
    }
    fn skip(&mut self, _padding: Padding) -> cube_types::Result<()> {
        Ok(())
    }
}
