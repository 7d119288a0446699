//! Reliable byte streams a [`Connection`](crate::Connection) can run over.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};

pub trait TransportWriter: Write + Send {
    /// Closes the stream for both directions. The peer reads end-of-stream.
    fn shutdown(&mut self) -> io::Result<()>;
}

/// A duplex byte stream that can be split into independently owned halves.
pub trait Transport {
    type Reader: Read + Send;
    type Writer: TransportWriter;

    fn split(self) -> io::Result<(Self::Reader, Self::Writer)>;
}

/* tcp */

impl TransportWriter for TcpStream {
    fn shutdown(&mut self) -> io::Result<()> {
        match TcpStream::shutdown(self, Shutdown::Both) {
            Err(e) if e.kind() == io::ErrorKind::NotConnected => Ok(()),
            res => res,
        }
    }
}

impl Transport for TcpStream {
    type Reader = TcpStream;
    type Writer = TcpStream;

    fn split(self) -> io::Result<(TcpStream, TcpStream)> {
        self.set_nodelay(true)?;
        let reader = self.try_clone()?;
        Ok((reader, self))
    }
}

/* in-memory */

/// Creates two connected in-memory stream ends.
pub fn pipe() -> (PipeEnd, PipeEnd) {
    let (a_tx, a_rx) = mpsc::channel();
    let (b_tx, b_rx) = mpsc::channel();
    let a = PipeEnd {
        reader: PipeReader::new(b_rx),
        writer: PipeWriter { tx: Some(a_tx) },
    };
    let b = PipeEnd {
        reader: PipeReader::new(a_rx),
        writer: PipeWriter { tx: Some(b_tx) },
    };
    (a, b)
}

pub struct PipeEnd {
    pub reader: PipeReader,
    pub writer: PipeWriter,
}

impl Transport for PipeEnd {
    type Reader = PipeReader;
    type Writer = PipeWriter;

    fn split(self) -> io::Result<(PipeReader, PipeWriter)> {
        Ok((self.reader, self.writer))
    }
}

pub struct PipeReader {
    rx: Receiver<Vec<u8>>,
    chunk: Vec<u8>,
    pos: usize,
}

impl PipeReader {
    fn new(rx: Receiver<Vec<u8>>) -> Self {
        Self {
            rx,
            chunk: vec![],
            pos: 0,
        }
    }
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos == self.chunk.len() {
            match self.rx.recv() {
                Ok(chunk) => {
                    self.chunk = chunk;
                    self.pos = 0;
                }
                // Every writer is gone.
                Err(_) => return Ok(0),
            }
        }
        let len = buf.len().min(self.chunk.len() - self.pos);
        buf[..len].copy_from_slice(&self.chunk[self.pos..self.pos + len]);
        self.pos += len;
        Ok(len)
    }
}

pub struct PipeWriter {
    tx: Option<Sender<Vec<u8>>>,
}

impl Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotConnected))?;
        tx.send(buf.to_vec())
            .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl TransportWriter for PipeWriter {
    fn shutdown(&mut self) -> io::Result<()> {
        self.tx = None;
        Ok(())
    }
}
