use crate::error::{Result, ValueError};
use crate::serde::{DataType, Field, FieldReader, FieldWriter};
use crate::values::ValueOps;
use num_traits::AsPrimitive;
use std::fmt;

/// A primitive that can back a [`ScalarValue`].
pub trait Scalar:
    Field + PartialEq + Default + fmt::Debug + fmt::Display + AsPrimitive<i64> + AsPrimitive<u64>
{
    const DATA_TYPE: DataType;

    fn combine_add(self, rhs: Self) -> Self;

    fn combine_sub(self, rhs: Self) -> Self;
}

macro_rules! impl_int_scalar {
    ($($t:ty => $dtype:ident),*) => {
        $(
            impl Scalar for $t {
                const DATA_TYPE: DataType = DataType::$dtype;

                fn combine_add(self, rhs: Self) -> Self {
                    self.wrapping_add(rhs)
                }
                fn combine_sub(self, rhs: Self) -> Self {
                    self.wrapping_sub(rhs)
                }
            }
        )*
    };
}
impl_int_scalar!(
    i8 => Int8,
    u8 => Uint8,
    i16 => Int16,
    u16 => Uint16,
    i32 => Int32,
    u32 => Uint32,
    i64 => Int64,
    u64 => Uint64
);

impl Scalar for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn combine_add(self, rhs: Self) -> Self {
        self + rhs
    }
    fn combine_sub(self, rhs: Self) -> Self {
        self - rhs
    }
}

#[derive(PartialEq, Default, Clone, Copy, Debug)]
pub struct ScalarValue<T>(pub T);

pub type DoubleValue = ScalarValue<f64>;
pub type CharValue = ScalarValue<i8>;
pub type UnsignedCharValue = ScalarValue<u8>;
pub type SignedShortValue = ScalarValue<i16>;
pub type UnsignedShortValue = ScalarValue<u16>;
pub type SignedValue = ScalarValue<i32>;
pub type UnsignedValue = ScalarValue<u32>;
pub type SignedLongValue = ScalarValue<i64>;
pub type UnsignedLongValue = ScalarValue<u64>;

impl<T: Scalar> ScalarValue<T> {
    pub fn get(&self) -> T {
        self.0
    }
}

impl<T: Scalar> fmt::Display for ScalarValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Scalar> ValueOps for ScalarValue<T> {
    fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }
    fn byte_size(&self) -> usize {
        T::WIDTH
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put(self.0)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        self.0 = r.get()?;
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.0 = self.0.combine_add(rhs.0);
        Ok(())
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.0 = self.0.combine_sub(rhs.0);
        Ok(())
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.0 = T::from_f64(self.0.to_f64() * d);
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(T::DATA_TYPE));
        }
        self.0 = T::from_f64(self.0.to_f64() / d);
        Ok(())
    }
    fn assign_f64(&mut self, d: f64) -> Result<()> {
        self.0 = T::from_f64(d);
        Ok(())
    }
    fn assign(&mut self, rhs: &Self) -> Result<()> {
        self.0 = rhs.0;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.0 == T::default()
    }
    fn zero_like(&self) -> Self {
        Self::default()
    }

    fn as_f64(&self) -> f64 {
        self.0.to_f64()
    }
    fn as_i64(&self) -> i64 {
        AsPrimitive::<i64>::as_(self.0)
    }
    fn as_u64(&self) -> u64 {
        AsPrimitive::<u64>::as_(self.0)
    }
    /// The first byte of the in-memory representation.
    fn as_char(&self) -> u8 {
        let mut raw = Vec::with_capacity(T::WIDTH);
        self.0.put_ne(&mut raw);
        raw.first().copied().unwrap_or(b' ')
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count != 0 {
            self.0 = T::from_f64(self.0.to_f64() / count as f64);
        }
    }

    fn is_single_value(&self) -> bool {
        true
    }
}
