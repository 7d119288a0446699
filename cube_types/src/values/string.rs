use crate::error::Result;
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::ValueOps;
use std::fmt;
use std::mem;

/// Free text attached to a call path. It takes no part in aggregation.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct StringValue(pub String);

impl StringValue {
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }
}

impl fmt::Display for StringValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ValueOps for StringValue {
    fn data_type(&self) -> DataType {
        DataType::String
    }
    fn byte_size(&self) -> usize {
        mem::size_of::<u64>() + self.0.len() + 1
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put_str(&self.0)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        self.0 = r.get_str()?;
        Ok(())
    }

    fn try_add_assign(&mut self, _rhs: &Self) -> Result<()> {
        Ok(())
    }
    fn try_sub_assign(&mut self, _rhs: &Self) -> Result<()> {
        Ok(())
    }
    fn try_mul_assign(&mut self, _d: f64) -> Result<()> {
        Ok(())
    }
    fn try_div_assign(&mut self, _d: f64) -> Result<()> {
        Ok(())
    }
    fn assign_f64(&mut self, d: f64) -> Result<()> {
        self.0 = d.to_string();
        Ok(())
    }
    fn assign(&mut self, rhs: &Self) -> Result<()> {
        self.0.clone_from(&rhs.0);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.0.is_empty()
    }
    fn zero_like(&self) -> Self {
        Self::default()
    }

    fn as_f64(&self) -> f64 {
        self.0.trim().parse().unwrap_or(0.)
    }
    fn as_char(&self) -> u8 {
        self.0.bytes().next().unwrap_or(b' ')
    }

    fn normalize_with_cluster_count(&mut self, _count: u64) {}
}
