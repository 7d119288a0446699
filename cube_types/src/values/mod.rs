mod complex;
mod factory;
mod histogram;
mod min_max;
mod ndoubles;
mod ops;
mod rate;
mod scalar;
mod scale_func;
mod stat_level;
mod string;
mod tau_atomic;

mod codec_test;

pub use complex::*;
pub use factory::*;
pub use histogram::*;
pub use min_max::*;
pub use ndoubles::{NDoublesConfig, NDoublesValue, ShrinkPolicy};
pub use ops::*;
pub use rate::*;
pub use scalar::*;
pub use scale_func::*;
pub use stat_level::*;
pub use string::*;
pub use tau_atomic::*;

use crate::error::{Result, ValueError};
use crate::serde::{
    ByteReader, ByteWriter, DataType, DoublesReader, DoublesWriter, FieldReader, FieldWriter,
};
use derive_more::From;
use std::fmt;

/// One performance measurement of any kind.
///
/// Binary operations require both operands to be the same variant and fail with
/// [`ValueError::TypeMismatch`] otherwise.
#[derive(From, PartialEq, Clone, Debug)]
pub enum Value {
    Double(DoubleValue),
    MinDouble(MinDoubleValue),
    MaxDouble(MaxDoubleValue),
    Char(CharValue),
    UnsignedChar(UnsignedCharValue),
    SignedShort(SignedShortValue),
    UnsignedShort(UnsignedShortValue),
    Signed(SignedValue),
    Unsigned(UnsignedValue),
    SignedLong(SignedLongValue),
    UnsignedLong(UnsignedLongValue),
    Complex(ComplexValue),
    Rate(RateValue),
    StatLevel1(StatLevel1Value),
    StatLevel2(StatLevel2Value),
    StatLevel3(StatLevel3Value),
    StatLevel4(StatLevel4Value),
    TauAtomic(TauAtomicValue),
    Histogram(HistogramValue),
    NDoubles(NDoublesValue),
    ScaleFunc(ScaleFuncValue),
    String(StringValue),
}

macro_rules! for_each_variant {
    ($value:expr, $v:ident => $body:expr) => {
        match $value {
            Value::Double($v) => $body,
            Value::MinDouble($v) => $body,
            Value::MaxDouble($v) => $body,
            Value::Char($v) => $body,
            Value::UnsignedChar($v) => $body,
            Value::SignedShort($v) => $body,
            Value::UnsignedShort($v) => $body,
            Value::Signed($v) => $body,
            Value::Unsigned($v) => $body,
            Value::SignedLong($v) => $body,
            Value::UnsignedLong($v) => $body,
            Value::Complex($v) => $body,
            Value::Rate($v) => $body,
            Value::StatLevel1($v) => $body,
            Value::StatLevel2($v) => $body,
            Value::StatLevel3($v) => $body,
            Value::StatLevel4($v) => $body,
            Value::TauAtomic($v) => $body,
            Value::Histogram($v) => $body,
            Value::NDoubles($v) => $body,
            Value::ScaleFunc($v) => $body,
            Value::String($v) => $body,
        }
    };
}

macro_rules! for_each_pair {
    ($lhs:expr, $rhs:expr, ($l:ident, $r:ident) => $body:expr) => {
        match ($lhs, $rhs) {
            (Value::Double($l), Value::Double($r)) => $body,
            (Value::MinDouble($l), Value::MinDouble($r)) => $body,
            (Value::MaxDouble($l), Value::MaxDouble($r)) => $body,
            (Value::Char($l), Value::Char($r)) => $body,
            (Value::UnsignedChar($l), Value::UnsignedChar($r)) => $body,
            (Value::SignedShort($l), Value::SignedShort($r)) => $body,
            (Value::UnsignedShort($l), Value::UnsignedShort($r)) => $body,
            (Value::Signed($l), Value::Signed($r)) => $body,
            (Value::Unsigned($l), Value::Unsigned($r)) => $body,
            (Value::SignedLong($l), Value::SignedLong($r)) => $body,
            (Value::UnsignedLong($l), Value::UnsignedLong($r)) => $body,
            (Value::Complex($l), Value::Complex($r)) => $body,
            (Value::Rate($l), Value::Rate($r)) => $body,
            (Value::StatLevel1($l), Value::StatLevel1($r)) => $body,
            (Value::StatLevel2($l), Value::StatLevel2($r)) => $body,
            (Value::StatLevel3($l), Value::StatLevel3($r)) => $body,
            (Value::StatLevel4($l), Value::StatLevel4($r)) => $body,
            (Value::TauAtomic($l), Value::TauAtomic($r)) => $body,
            (Value::Histogram($l), Value::Histogram($r)) => $body,
            (Value::NDoubles($l), Value::NDoubles($r)) => $body,
            (Value::ScaleFunc($l), Value::ScaleFunc($r)) => $body,
            (Value::String($l), Value::String($r)) => $body,
            (lhs, rhs) => Err(ValueError::TypeMismatch {
                lhs: lhs.data_type(),
                rhs: rhs.data_type(),
            }),
        }
    };
}

macro_rules! impl_from_primitive {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(x: $t) -> Self {
                    Value::from(ScalarValue(x))
                }
            }
        )*
    };
}
impl_from_primitive!(f64, i8, u8, i16, u16, i32, u32, i64, u64);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(StringValue::new(s))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for_each_variant!(self, v => fmt::Display::fmt(v, f))
    }
}

impl ValueOps for Value {
    fn data_type(&self) -> DataType {
        for_each_variant!(self, v => v.data_type())
    }
    fn byte_size(&self) -> usize {
        for_each_variant!(self, v => v.byte_size())
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        for_each_variant!(self, v => v.encode(w))
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        for_each_variant!(self, v => v.decode(r))
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        for_each_pair!(self, rhs, (l, r) => l.try_add_assign(r))
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        for_each_pair!(self, rhs, (l, r) => l.try_sub_assign(r))
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        for_each_variant!(self, v => v.try_mul_assign(d))
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        for_each_variant!(self, v => v.try_div_assign(d))
    }
    fn assign_f64(&mut self, d: f64) -> Result<()> {
        for_each_variant!(self, v => v.assign_f64(d))
    }
    fn assign(&mut self, rhs: &Self) -> Result<()> {
        for_each_pair!(self, rhs, (l, r) => l.assign(r))
    }

    fn is_zero(&self) -> bool {
        for_each_variant!(self, v => v.is_zero())
    }
    fn zero_like(&self) -> Self {
        for_each_variant!(self, v => Value::from(v.zero_like()))
    }

    fn as_f64(&self) -> f64 {
        for_each_variant!(self, v => v.as_f64())
    }
    fn as_i64(&self) -> i64 {
        for_each_variant!(self, v => v.as_i64())
    }
    fn as_u64(&self) -> u64 {
        for_each_variant!(self, v => v.as_u64())
    }
    fn as_char(&self) -> u8 {
        for_each_variant!(self, v => v.as_char())
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        for_each_variant!(self, v => v.normalize_with_cluster_count(count))
    }

    fn is_single_value(&self) -> bool {
        for_each_variant!(self, v => v.is_single_value())
    }
    fn as_inclusive_metric(&self) -> bool {
        for_each_variant!(self, v => v.as_inclusive_metric())
    }
}

impl Value {
    pub fn as_u16(&self) -> u16 {
        self.as_u64() as u16
    }
    pub fn as_i16(&self) -> i16 {
        self.as_i64() as i16
    }
    pub fn as_u32(&self) -> u32 {
        self.as_u64() as u32
    }
    pub fn as_i32(&self) -> i32 {
        self.as_i64() as i32
    }

    pub fn as_exclusive_metric(&self) -> bool {
        true
    }

    /* byte buffer */

    pub fn write_bytes(&self, out: &mut Vec<u8>) -> Result<()> {
        self.encode(&mut ByteWriter::new(out))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.byte_size());
        self.write_bytes(&mut out)?;
        Ok(out)
    }

    /// Returns the number of bytes consumed.
    pub fn read_bytes(&mut self, buf: &[u8]) -> Result<usize> {
        let mut r = ByteReader::new(buf);
        self.decode(&mut r)?;
        Ok(r.position())
    }

    /* array of doubles */

    pub fn write_doubles(&self, out: &mut Vec<f64>) -> Result<()> {
        self.encode(&mut DoublesWriter::new(out))
    }

    /// Returns the number of slots consumed.
    pub fn read_doubles(&mut self, buf: &[f64]) -> Result<usize> {
        let mut r = DoublesReader::new(buf);
        self.decode(&mut r)?;
        Ok(r.position())
    }

    /// Reverses the byte order of every field of one serialized value at the start of `buf`,
    /// following this value's layout. Returns the number of bytes transformed.
    pub fn transform_endianness(&self, buf: &mut [u8]) -> Result<usize> {
        let mut foreign = self.zero_like();
        let consumed = {
            let mut r = ByteReader::with_byte_swap(buf, true);
            foreign.decode(&mut r)?;
            r.position()
        };
        let native = foreign.to_bytes()?;
        if native.len() != consumed {
            return Err(ValueError::malformed(
                self.data_type(),
                format!("re-encoded {} bytes out of {}", native.len(), consumed),
            ));
        }
        buf[..consumed].copy_from_slice(&native);
        Ok(consumed)
    }
}
