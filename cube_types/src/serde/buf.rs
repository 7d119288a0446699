use crate::error::{Result, ValueError};
use crate::serde::{DataType, Field, FieldReader, FieldWriter, Framing, Padding};

/* byte buffer */

/// Appends fields to a buffer in host byte order, or in the opposite order for a reader of the
/// other endianness.
pub struct ByteWriter<'b> {
    out: &'b mut Vec<u8>,
    swap: bool,
}
impl<'b> ByteWriter<'b> {
    pub fn new(out: &'b mut Vec<u8>) -> Self {
        Self::with_byte_swap(out, false)
    }
    pub fn with_byte_swap(out: &'b mut Vec<u8>, swap: bool) -> Self {
        Self { out, swap }
    }
}
impl<'b> FieldWriter for ByteWriter<'b> {
    fn framing(&self) -> Framing {
        Framing::Fixed
    }
    fn put<F: Field>(&mut self, field: F) -> Result<()> {
        if self.swap {
            field.swap_bytes().put_ne(self.out);
        } else {
            field.put_ne(self.out);
        }
        Ok(())
    }
    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.extend_from_slice(bytes);
        Ok(())
    }
    fn pad(&mut self, padding: Padding) -> Result<()> {
        self.out.resize(self.out.len() + padding.bytes, 0);
        Ok(())
    }
}

/// Reads fields in host byte order, or in the opposite order when the buffer was written on a
/// machine of the other endianness.
pub struct ByteReader<'b> {
    buf: &'b [u8],
    pos: usize,
    swap: bool,
}
impl<'b> ByteReader<'b> {
    pub fn new(buf: &'b [u8]) -> Self {
        Self::with_byte_swap(buf, false)
    }
    pub fn with_byte_swap(buf: &'b [u8], swap: bool) -> Self {
        Self { buf, pos: 0, swap }
    }
    pub fn position(&self) -> usize {
        self.pos
    }
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'b [u8]> {
        if self.remaining() < len {
            return Err(ValueError::Truncated {
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }
}
impl<'b> FieldReader for ByteReader<'b> {
    fn framing(&self) -> Framing {
        Framing::Fixed
    }
    fn get<F: Field>(&mut self) -> Result<F> {
        let field = F::get_ne(self.take(F::WIDTH)?);
        if self.swap {
            Ok(field.swap_bytes())
        } else {
            Ok(field)
        }
    }
    fn get_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        Ok(self.take(len)?.to_vec())
    }
    fn skip(&mut self, padding: Padding) -> Result<()> {
        self.take(padding.bytes)?;
        Ok(())
    }
}

/* array of doubles */

/// Writes each field into its own `f64` slot.
pub struct DoublesWriter<'b> {
    out: &'b mut Vec<f64>,
}
impl<'b> DoublesWriter<'b> {
    pub fn new(out: &'b mut Vec<f64>) -> Self {
        Self { out }
    }
}
impl<'b> FieldWriter for DoublesWriter<'b> {
    fn framing(&self) -> Framing {
        Framing::Fixed
    }
    fn put<F: Field>(&mut self, field: F) -> Result<()> {
        self.out.push(field.to_f64());
        Ok(())
    }
    fn put_bytes(&mut self, _bytes: &[u8]) -> Result<()> {
        Err(ValueError::UnsupportedEncoding {
            typ: DataType::String,
            encoding: "array of doubles",
        })
    }
    fn pad(&mut self, padding: Padding) -> Result<()> {
        self.out.resize(self.out.len() + padding.slots, 0.);
        Ok(())
    }
}

/// Reads each field from one `f64` slot, casting it to the field's type.
pub struct DoublesReader<'b> {
    buf: &'b [f64],
    pos: usize,
}
impl<'b> DoublesReader<'b> {
    pub fn new(buf: &'b [f64]) -> Self {
        Self { buf, pos: 0 }
    }
    pub fn position(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, slots: usize) -> Result<usize> {
        let available = self.buf.len() - self.pos;
        if available < slots {
            return Err(ValueError::Truncated {
                needed: slots,
                available,
            });
        }
        let at = self.pos;
        self.pos += slots;
        Ok(at)
    }
}
impl<'b> FieldReader for DoublesReader<'b> {
    fn framing(&self) -> Framing {
        Framing::Fixed
    }
    fn get<F: Field>(&mut self) -> Result<F> {
        let at = self.advance(1)?;
        Ok(F::from_f64(self.buf[at]))
    }
    fn get_bytes(&mut self, _len: usize) -> Result<Vec<u8>> {
        Err(ValueError::UnsupportedEncoding {
            typ: DataType::String,
            encoding: "array of doubles",
        })
    }
    fn skip(&mut self, padding: Padding) -> Result<()> {
        self.advance(padding.slots)?;
        Ok(())
    }
}
