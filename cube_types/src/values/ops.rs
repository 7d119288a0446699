use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use std::fmt;

/// The behavior every concrete value variant provides.
///
/// Binary operations take `&Self`, so mismatched variants are rejected one level up, in
/// [`Value`](crate::values::Value), before they reach an implementation.
pub trait ValueOps: Clone + fmt::Debug + fmt::Display {
    fn data_type(&self) -> DataType;

    /// Length in the byte-buffer layout.
    fn byte_size(&self) -> usize;

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()>;

    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()>;

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()>;

    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()>;

    fn try_mul_assign(&mut self, d: f64) -> Result<()>;

    fn try_div_assign(&mut self, d: f64) -> Result<()>;

    fn assign_f64(&mut self, _d: f64) -> Result<()> {
        Err(ValueError::invalid_op(self.data_type(), "assign from double"))
    }

    fn assign(&mut self, _rhs: &Self) -> Result<()> {
        Err(ValueError::invalid_op(self.data_type(), "assign from value"))
    }

    /// True for the identity element of `try_add_assign`.
    fn is_zero(&self) -> bool;

    /// The identity element, carrying this instance's shape and configuration.
    fn zero_like(&self) -> Self;

    fn as_f64(&self) -> f64;

    fn as_i64(&self) -> i64 {
        self.as_f64() as i64
    }

    fn as_u64(&self) -> u64 {
        self.as_f64() as u64
    }

    fn as_char(&self) -> u8 {
        b' '
    }

    fn normalize_with_cluster_count(&mut self, count: u64);

    fn is_single_value(&self) -> bool {
        false
    }

    fn as_inclusive_metric(&self) -> bool {
        true
    }
}
