use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::{MaxDoubleValue, MinDoubleValue, ValueOps};
use std::fmt;
use std::mem;

/// Below this relative spread, the variance is treated as cancelled out to zero.
pub const TAU_CANCELLATION_EPSILON: f64 = 1e-14;

/// Which statistic stands in for the value when a single double is asked for.
#[repr(u8)]
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum TauPivot {
    #[default]
    Avg = 0,
    Dev = 1,
    N = 2,
    Min = 3,
    Max = 4,
    Sum = 5,
    Sum2 = 6,
}

#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct TauAtomicConfig {
    pub pivot: TauPivot,
}

/// Summary of an atomic event as collected by TAU.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct TauAtomicValue {
    pub n: u32,
    pub min: MinDoubleValue,
    pub max: MaxDoubleValue,
    pub sum: f64,
    pub sum2: f64,
    pub config: TauAtomicConfig,
}

impl Default for TauAtomicValue {
    fn default() -> Self {
        Self::with_config(TauAtomicConfig::default())
    }
}

impl TauAtomicValue {
    pub fn new(n: u32, min: f64, max: f64, sum: f64, sum2: f64) -> Self {
        Self {
            n,
            min: MinDoubleValue(min),
            max: MaxDoubleValue(max),
            sum,
            sum2,
            config: TauAtomicConfig::default(),
        }
    }

    pub fn with_config(config: TauAtomicConfig) -> Self {
        Self {
            n: 0,
            min: MinDoubleValue::default(),
            max: MaxDoubleValue::default(),
            sum: 0.,
            sum2: 0.,
            config,
        }
    }

    pub fn calc_avg(&self) -> f64 {
        if self.n == 0 {
            0.
        } else {
            self.sum / self.n as f64
        }
    }

    pub fn calc_var(&self) -> f64 {
        if self.n == 0 {
            return 0.;
        }
        let avg = self.calc_avg();
        (self.sum2 / self.n as f64 - avg * avg).max(0.)
    }

    /// Standard deviation, guarded against the cancellation in `sum2/n - avg^2` when all
    /// samples are (nearly) equal.
    pub fn calc_deviation(&self) -> f64 {
        if self.n == 0 || self.sum2 == 0. {
            return 0.;
        }
        let spread = 1. - (self.sum * self.sum) / (self.n as f64 * self.sum2);
        if spread < TAU_CANCELLATION_EPSILON {
            return 0.;
        }
        self.calc_var().sqrt()
    }
}

impl fmt::Display for TauAtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({},{},{},{},{})",
            self.n, self.min, self.max, self.sum, self.sum2
        )
    }
}

impl ValueOps for TauAtomicValue {
    fn data_type(&self) -> DataType {
        DataType::TauAtomic
    }
    fn byte_size(&self) -> usize {
        mem::size_of::<u32>() + 4 * mem::size_of::<f64>()
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put(self.n)?;
        self.min.encode(w)?;
        self.max.encode(w)?;
        w.put(self.sum)?;
        w.put(self.sum2)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        let n = r.get()?;
        let mut min = MinDoubleValue::default();
        min.decode(r)?;
        let mut max = MaxDoubleValue::default();
        max.decode(r)?;
        let sum = r.get()?;
        let sum2 = r.get()?;
        *self = Self {
            n,
            min,
            max,
            sum,
            sum2,
            config: self.config,
        };
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.n = self.n.wrapping_add(rhs.n);
        self.min.try_add_assign(&rhs.min)?;
        self.max.try_add_assign(&rhs.max)?;
        self.sum += rhs.sum;
        self.sum2 += rhs.sum2;
        Ok(())
    }
    /// Extrema cannot be taken back out of a summary.
    fn try_sub_assign(&mut self, _rhs: &Self) -> Result<()> {
        Err(ValueError::invalid_op(DataType::TauAtomic, "subtract"))
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.n = (self.n as f64 * d) as u32;
        self.min.try_mul_assign(d)?;
        self.max.try_mul_assign(d)?;
        self.sum *= d;
        self.sum2 *= d;
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(DataType::TauAtomic));
        }
        self.n = (self.n as f64 / d) as u32;
        self.min.try_div_assign(d)?;
        self.max.try_div_assign(d)?;
        self.sum /= d;
        self.sum2 /= d;
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.n == 0
            && self.min.is_zero()
            && self.max.is_zero()
            && self.sum == 0.
            && self.sum2 == 0.
    }
    fn zero_like(&self) -> Self {
        Self::with_config(self.config)
    }

    fn as_f64(&self) -> f64 {
        match self.config.pivot {
            TauPivot::Avg => self.calc_avg(),
            TauPivot::Dev => self.calc_deviation(),
            TauPivot::N => self.n as f64,
            TauPivot::Min => self.min.0,
            TauPivot::Max => self.max.0,
            TauPivot::Sum => self.sum,
            TauPivot::Sum2 => self.sum2,
        }
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count == 0 {
            return;
        }
        self.n = (self.n as u64 / count) as u32;
        self.sum /= count as f64;
        self.sum2 /= count as f64;
    }

    fn as_inclusive_metric(&self) -> bool {
        false
    }
}
