use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::ValueOps;
use std::fmt;

/// An unreduced fraction. Sums are taken over a common denominator and never reduced.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct RateValue {
    pub numerator: f64,
    pub denominator: f64,
}

impl Default for RateValue {
    fn default() -> Self {
        Self {
            numerator: 0.,
            denominator: 1.,
        }
    }
}

impl RateValue {
    pub fn new(numerator: f64, denominator: f64) -> Self {
        Self {
            numerator,
            denominator,
        }
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl ValueOps for RateValue {
    fn data_type(&self) -> DataType {
        DataType::Rate
    }
    fn byte_size(&self) -> usize {
        2 * std::mem::size_of::<f64>()
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put(self.numerator)?;
        w.put(self.denominator)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        let numerator = r.get()?;
        self.denominator = r.get()?;
        self.numerator = numerator;
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.numerator = self.numerator * rhs.denominator + rhs.numerator * self.denominator;
        self.denominator *= rhs.denominator;
        Ok(())
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.numerator = self.numerator * rhs.denominator - rhs.numerator * self.denominator;
        self.denominator *= rhs.denominator;
        Ok(())
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.numerator *= d;
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(DataType::Rate));
        }
        self.denominator *= d;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.numerator == 0. && self.denominator == 1.
    }
    fn zero_like(&self) -> Self {
        Self::default()
    }

    fn as_f64(&self) -> f64 {
        if self.denominator == 0. {
            0.
        } else {
            self.numerator / self.denominator
        }
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count != 0 {
            self.denominator *= count as f64;
        }
    }
}
