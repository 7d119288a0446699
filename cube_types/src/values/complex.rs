use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::ValueOps;
use std::fmt;

#[derive(PartialEq, Default, Clone, Copy, Debug)]
pub struct ComplexValue {
    pub re: f64,
    pub im: f64,
}

impl ComplexValue {
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl fmt::Display for ComplexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.re, self.im)
    }
}

impl ValueOps for ComplexValue {
    fn data_type(&self) -> DataType {
        DataType::Complex
    }
    fn byte_size(&self) -> usize {
        2 * std::mem::size_of::<f64>()
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put(self.re)?;
        w.put(self.im)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        let re = r.get()?;
        self.im = r.get()?;
        self.re = re;
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.re += rhs.re;
        self.im += rhs.im;
        Ok(())
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.re -= rhs.re;
        self.im -= rhs.im;
        Ok(())
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.re *= d;
        self.im *= d;
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(DataType::Complex));
        }
        self.re /= d;
        self.im /= d;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.re == 0. && self.im == 0.
    }
    fn zero_like(&self) -> Self {
        Self::default()
    }

    /// The magnitude.
    fn as_f64(&self) -> f64 {
        self.re.hypot(self.im)
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count != 0 {
            self.re /= count as f64;
            self.im /= count as f64;
        }
    }
}
