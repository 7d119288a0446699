use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::ndoubles::{check_same_len, decode_array, encode_array, resize_grow_only};
use crate::values::{ShrinkPolicy, ValueOps};
use itertools::Itertools;
use std::fmt;
use std::mem;

/// Equal-width bins spanning `[min, max]`.
///
/// A histogram whose bounds are still the identity pair (`f64::MAX`, `-f64::MAX`) is invalid:
/// it has not seen a sample and adopts the bounds of whatever is added to it.
#[derive(PartialEq, Clone, Debug)]
pub struct HistogramValue {
    pub min: f64,
    pub max: f64,
    bins: Vec<f64>,
    pub shrink_policy: ShrinkPolicy,
}

impl Default for HistogramValue {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HistogramValue {
    pub fn new(bins_count: usize) -> Self {
        Self {
            min: f64::MAX,
            max: -f64::MAX,
            bins: vec![0.; bins_count],
            shrink_policy: ShrinkPolicy::default(),
        }
    }

    pub fn with_bins(min: f64, max: f64, bins: Vec<f64>) -> Self {
        Self {
            min,
            max,
            bins,
            shrink_policy: ShrinkPolicy::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min != f64::MAX && self.max != -f64::MAX
    }

    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn mass(&self) -> f64 {
        self.bins.iter().sum()
    }

    pub fn resize(&mut self, bins_count: usize) -> Result<()> {
        resize_grow_only(
            DataType::Histogram,
            &mut self.bins,
            bins_count,
            self.shrink_policy,
        )
    }
}

/// Adds the mass of each source bin over `[lo, hi]` to the target bins over `[t_lo, t_hi]`,
/// in proportion to how much of the source bin each target bin covers.
///
/// The target range must contain the source range. Total mass is preserved: whatever rounding
/// leaves unassigned goes to the last target bin the source bin touches.
fn rebin_onto(src: &[f64], lo: f64, hi: f64, dst: &mut [f64], t_lo: f64, t_hi: f64) {
    let Some(last) = dst.len().checked_sub(1) else {
        return;
    };
    let t_width = (t_hi - t_lo) / dst.len() as f64;
    let target_index = |x: f64| -> usize {
        if t_width <= 0. {
            return 0;
        }
        let i = ((x - t_lo) / t_width).floor();
        if i <= 0. {
            0
        } else {
            (i as usize).min(last)
        }
    };

    let width = (hi - lo) / src.len() as f64;
    for (i, mass) in src.iter().copied().enumerate() {
        if mass == 0. {
            continue;
        }
        let a = lo + i as f64 * width;
        let b = if i + 1 == src.len() { hi } else { a + width };
        let (first, end) = (target_index(a), target_index(b));
        if width <= 0. || first == end {
            dst[first] += mass;
            continue;
        }

        let mut assigned = 0.;
        for (j, slot) in dst.iter_mut().enumerate().take(end).skip(first) {
            let ta = t_lo + j as f64 * t_width;
            let tb = ta + t_width;
            let overlap = (b.min(tb) - a.max(ta)).max(0.);
            let share = mass * overlap / (b - a);
            *slot += share;
            assigned += share;
        }
        dst[end] += mass - assigned;
    }
}

impl fmt::Display for HistogramValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:({}):{}",
            self.min,
            self.bins.iter().join(", "),
            self.max
        )
    }
}

impl ValueOps for HistogramValue {
    fn data_type(&self) -> DataType {
        DataType::Histogram
    }
    fn byte_size(&self) -> usize {
        (2 + self.bins.len()) * mem::size_of::<f64>()
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        w.put(self.min)?;
        w.put(self.max)?;
        encode_array(w, &self.bins)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        let min = r.get()?;
        let max = r.get()?;
        if decode_array(DataType::Histogram, r, &mut self.bins, self.shrink_policy)? {
            self.min = min;
            self.max = max;
        }
        Ok(())
    }

    /// Re-bins both operands onto the union of their ranges and sums them.
    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        check_same_len(DataType::Histogram, &self.bins, &rhs.bins)?;
        if !rhs.is_valid() {
            return Ok(());
        }
        if !self.is_valid() {
            self.min = rhs.min;
            self.max = rhs.max;
            self.bins.copy_from_slice(&rhs.bins);
            return Ok(());
        }

        let (lo, hi) = (self.min.min(rhs.min), self.max.max(rhs.max));
        let mut merged = vec![0.; self.bins.len()];
        rebin_onto(&self.bins, self.min, self.max, &mut merged, lo, hi);
        rebin_onto(&rhs.bins, rhs.min, rhs.max, &mut merged, lo, hi);
        self.bins = merged;
        self.min = lo;
        self.max = hi;
        Ok(())
    }
    fn try_sub_assign(&mut self, _rhs: &Self) -> Result<()> {
        Err(ValueError::invalid_op(DataType::Histogram, "subtract"))
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.bins.iter_mut().for_each(|v| *v *= d);
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(DataType::Histogram));
        }
        self.bins.iter_mut().for_each(|v| *v /= d);
        Ok(())
    }

    /// Only a histogram with no range yet is zero; a ranged one with empty bins still records
    /// where its samples fell.
    fn is_zero(&self) -> bool {
        !self.is_valid() && self.bins.iter().all(|v| *v == 0.)
    }
    fn zero_like(&self) -> Self {
        Self {
            shrink_policy: self.shrink_policy,
            ..Self::new(self.bins.len())
        }
    }

    fn as_f64(&self) -> f64 {
        self.mass()
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count != 0 {
            self.bins.iter_mut().for_each(|v| *v /= count as f64);
        }
    }
}
