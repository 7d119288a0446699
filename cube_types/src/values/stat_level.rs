use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::ValueOps;
use itertools::Itertools;
use std::fmt;
use std::mem;

/// A sample count and the first `L` power sums of the samples: `sums[k]` is the sum of `x^(k+1)`.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct StatLevelValue<const L: usize> {
    pub n: u32,
    pub sums: [f64; L],
}

pub type StatLevel1Value = StatLevelValue<1>;
pub type StatLevel2Value = StatLevelValue<2>;
pub type StatLevel3Value = StatLevelValue<3>;
pub type StatLevel4Value = StatLevelValue<4>;

impl<const L: usize> Default for StatLevelValue<L> {
    fn default() -> Self {
        Self {
            n: 0,
            sums: [0.; L],
        }
    }
}

impl<const L: usize> StatLevelValue<L> {
    const DATA_TYPE: DataType = match L {
        1 => DataType::StatLevel1,
        2 => DataType::StatLevel2,
        3 => DataType::StatLevel3,
        4 => DataType::StatLevel4,
        _ => panic!("power sums are kept up to the fourth"),
    };

    pub fn new(n: u32, sums: [f64; L]) -> Self {
        Self { n, sums }
    }

    /// Statistics of one sample `x`.
    pub fn from_sample(x: f64) -> Self {
        let mut sums = [0.; L];
        let mut pow = 1.;
        for sum in sums.iter_mut() {
            pow *= x;
            *sum = pow;
        }
        Self { n: 1, sums }
    }

    fn power_sum(&self, k: usize) -> Option<f64> {
        self.sums.get(k - 1).copied()
    }

    pub fn calc_avg(&self) -> f64 {
        let s = self.sums[0];
        if self.n == 0 {
            0.
        } else {
            s / self.n as f64
        }
    }

    pub fn calc_var(&self) -> Option<f64> {
        let s2 = self.power_sum(2)?;
        let (dn, s) = (self.n as f64, self.sums[0]);
        if self.n <= 1 {
            return Some(0.);
        }
        Some(1. / (dn - 1.) * (s2 - 1. / dn * s * s).sqrt())
    }

    pub fn calc_skew(&self) -> Option<f64> {
        let s3 = self.power_sum(3)?;
        let var = self.calc_var()?;
        let (dn, s, s2) = (self.n as f64, self.sums[0], self.sums[1]);
        if self.n <= 1 {
            return Some(0.);
        }
        let central3 = 1. / dn * (s3 - 3. / dn * s2 * s + 2. / (dn * dn) * s * s * s);
        Some(central3 / (var * var * var))
    }

    pub fn calc_kur(&self) -> Option<f64> {
        let s4 = self.power_sum(4)?;
        let var = self.calc_var()?;
        let (dn, s, s2, s3) = (self.n as f64, self.sums[0], self.sums[1], self.sums[2]);
        if self.n <= 1 {
            return Some(0.);
        }
        let central4 = 1. / dn
            * (s4 - 4. / dn * s3 * s + 6. / (dn * dn) * s2 * s * s
                - 3. / (dn * dn * dn) * s * s * s * s);
        Some(central4 / (var * var * var * var) - 3.)
    }
}

impl<const L: usize> fmt::Display for StatLevelValue<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let moments = [
            Some(self.calc_avg()),
            self.calc_var(),
            self.calc_skew(),
            self.calc_kur(),
        ];
        write!(f, "({})", moments.iter().flatten().join(","))
    }
}

impl<const L: usize> ValueOps for StatLevelValue<L> {
    fn data_type(&self) -> DataType {
        Self::DATA_TYPE
    }
    fn byte_size(&self) -> usize {
        mem::size_of::<u32>() + L * mem::size_of::<f64>()
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put(self.n)?;
        for sum in self.sums {
            w.put(sum)?;
        }
        Ok(())
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        let n = r.get()?;
        let mut sums = [0.; L];
        for sum in sums.iter_mut() {
            *sum = r.get()?;
        }
        self.n = n;
        self.sums = sums;
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.n = self.n.wrapping_add(rhs.n);
        for (sum, rhs_sum) in self.sums.iter_mut().zip(rhs.sums) {
            *sum += rhs_sum;
        }
        Ok(())
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.n = self.n.wrapping_sub(rhs.n);
        for (sum, rhs_sum) in self.sums.iter_mut().zip(rhs.sums) {
            *sum -= rhs_sum;
        }
        Ok(())
    }
    /// Scales the samples: the k-th power sum scales by `d^k`.
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        let mut factor = 1.;
        for sum in self.sums.iter_mut() {
            factor *= d;
            *sum *= factor;
        }
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(Self::DATA_TYPE));
        }
        self.try_mul_assign(1. / d)
    }

    fn is_zero(&self) -> bool {
        self.n == 0 && self.sums.iter().all(|sum| *sum == 0.)
    }
    fn zero_like(&self) -> Self {
        Self::default()
    }

    /// Moments are exposed through the `calc_*` family instead.
    fn as_f64(&self) -> f64 {
        0.
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count == 0 {
            return;
        }
        self.n = (self.n as u64 / count) as u32;
        for sum in self.sums.iter_mut() {
            *sum /= count as f64;
        }
    }
}
