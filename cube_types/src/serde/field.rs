use crate::error::{Result, ValueError};
use crate::serde::DataType;
use std::mem;

/// A fixed-width primitive that every codec path knows how to move.
pub trait Field: Copy + Sized {
    const WIDTH: usize;

    fn put_ne(self, dst: &mut Vec<u8>);

    /// `src` is exactly `WIDTH` bytes long.
    fn get_ne(src: &[u8]) -> Self;

    fn swap_bytes(self) -> Self;

    fn from_f64(d: f64) -> Self;

    fn to_f64(self) -> f64;
}

macro_rules! impl_int_field {
    ($($t:ty),*) => {
        $(
            impl Field for $t {
                const WIDTH: usize = mem::size_of::<$t>();

                fn put_ne(self, dst: &mut Vec<u8>) {
                    dst.extend_from_slice(&self.to_ne_bytes());
                }
                fn get_ne(src: &[u8]) -> Self {
                    let mut arr = [0u8; mem::size_of::<$t>()];
                    arr.copy_from_slice(src);
                    <$t>::from_ne_bytes(arr)
                }
                fn swap_bytes(self) -> Self {
                    <$t>::swap_bytes(self)
                }
                fn from_f64(d: f64) -> Self {
                    d as $t
                }
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}
impl_int_field!(i8, u8, i16, u16, i32, u32, i64, u64);

impl Field for f64 {
    const WIDTH: usize = mem::size_of::<f64>();

    fn put_ne(self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(&self.to_ne_bytes());
    }
    fn get_ne(src: &[u8]) -> Self {
        let mut arr = [0u8; mem::size_of::<f64>()];
        arr.copy_from_slice(src);
        f64::from_ne_bytes(arr)
    }
    fn swap_bytes(self) -> Self {
        f64::from_bits(self.to_bits().swap_bytes())
    }
    fn from_f64(d: f64) -> Self {
        d
    }
    fn to_f64(self) -> f64 {
        self
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Framing {
    /// Lengths known to the receiving instance are omitted; fixed-capacity types are padded.
    Fixed,
    /// Every variable length is sent ahead of its elements; nothing is padded.
    SelfDescribing,
}

/// Unused capacity of a fixed-capacity layout, in both units a fixed-framing path may count in.
#[derive(Clone, Copy, Debug)]
pub struct Padding {
    pub bytes: usize,
    pub slots: usize,
}

pub trait FieldWriter {
    fn framing(&self) -> Framing;

    fn put<F: Field>(&mut self, field: F) -> Result<()>;

    fn put_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    fn pad(&mut self, padding: Padding) -> Result<()>;

    /// `u64` length counting the terminator, then the bytes, then NUL.
    fn put_str(&mut self, s: &str) -> Result<()> {
        let len = s.len() as u64 + 1;
        self.put(len)?;
        self.put_bytes(s.as_bytes())?;
        self.put_bytes(&[0])
    }
}

pub trait FieldReader {
    fn framing(&self) -> Framing;

    fn get<F: Field>(&mut self) -> Result<F>;

    fn get_bytes(&mut self, len: usize) -> Result<Vec<u8>>;

    fn skip(&mut self, padding: Padding) -> Result<()>;

    fn get_str(&mut self) -> Result<String> {
        let len = self.get::<u64>()?;
        let len = usize::try_from(len)
            .map_err(|_| ValueError::malformed(DataType::String, format!("length {len}")))?;
        let mut bytes = self.get_bytes(len)?;
        if bytes.last() == Some(&0) {
            bytes.pop();
        }
        String::from_utf8(bytes)
            .map_err(|e| ValueError::malformed(DataType::String, e.to_string()))
    }
}
