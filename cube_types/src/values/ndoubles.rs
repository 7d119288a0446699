use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter, Framing};
use crate::values::ValueOps;
use itertools::Itertools;
use std::fmt;
use std::mem;

/// What happens when an array-backed value is asked to hold fewer elements than it has.
#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub enum ShrinkPolicy {
    /// Fail with [`ValueError::ShrinkRejected`], leaving the value untouched.
    #[default]
    Reject,
    /// Log a warning and leave the value untouched.
    WarnAndIgnore,
}

const DECODE_CAPACITY_HINT: usize = 1 << 16;

/// Grows `values`, zero-filling the new tail. Never shrinks.
pub(crate) fn resize_grow_only(
    typ: DataType,
    values: &mut Vec<f64>,
    len: usize,
    policy: ShrinkPolicy,
) -> Result<()> {
    if len >= values.len() {
        values.resize(len, 0.);
        return Ok(());
    }
    match policy {
        ShrinkPolicy::Reject => Err(ValueError::ShrinkRejected {
            typ,
            from: values.len(),
            to: len,
        }),
        ShrinkPolicy::WarnAndIgnore => {
            tracing::warn!(?typ, from = values.len(), to = len, "Ignored request to shrink");
            Ok(())
        }
    }
}

/// Reads an array whose element count may or may not precede it, depending on the framing.
///
/// The incoming elements are always consumed so the stream stays aligned. They replace `values`
/// only when the whole array arrived and is at least as long; otherwise `values` is untouched and
/// a shorter array goes to the shrink policy. Returns whether the incoming array was adopted.
pub(crate) fn decode_array<R: FieldReader>(
    typ: DataType,
    r: &mut R,
    values: &mut Vec<f64>,
    policy: ShrinkPolicy,
) -> Result<bool> {
    let incoming = match r.framing() {
        Framing::Fixed => values.len(),
        Framing::SelfDescribing => {
            let count = r.get::<u64>()?;
            usize::try_from(count)
                .map_err(|_| ValueError::malformed(typ, format!("element count {count}")))?
        }
    };
    // Grows as elements arrive, so a corrupt count cannot allocate up front.
    let mut decoded = Vec::with_capacity(incoming.min(DECODE_CAPACITY_HINT));
    for _ in 0..incoming {
        decoded.push(r.get::<f64>()?);
    }
    if decoded.len() < values.len() {
        resize_grow_only(typ, values, decoded.len(), policy)?;
        return Ok(false);
    }
    *values = decoded;
    Ok(true)
}

pub(crate) fn encode_array<W: FieldWriter>(w: &mut W, values: &[f64]) -> Result<()> {
    if w.framing() == Framing::SelfDescribing {
        w.put(values.len() as u64)?;
    }
    for v in values {
        w.put(*v)?;
    }
    Ok(())
}

pub(crate) fn check_same_len(typ: DataType, lhs: &[f64], rhs: &[f64]) -> Result<()> {
    if lhs.len() != rhs.len() {
        return Err(ValueError::malformed(
            typ,
            format!("{} elements combined with {}", lhs.len(), rhs.len()),
        ));
    }
    Ok(())
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Default)]
pub struct NDoublesConfig {
    /// Index of the element that stands in for the whole value.
    pub pivot: usize,
    pub shrink_policy: ShrinkPolicy,
}

/// A fixed number of doubles, combined elementwise.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct NDoublesValue {
    values: Vec<f64>,
    pub config: NDoublesConfig,
}

impl NDoublesValue {
    pub fn new(len: usize) -> Self {
        Self::with_config(len, NDoublesConfig::default())
    }

    pub fn with_config(len: usize, config: NDoublesConfig) -> Self {
        Self {
            values: vec![0.; len],
            config,
        }
    }

    pub fn with_values(values: Vec<f64>) -> Self {
        Self {
            values,
            config: NDoublesConfig::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get_value(&self, index: usize) -> Result<f64> {
        self.values
            .get(index)
            .copied()
            .ok_or(ValueError::IndexOutOfRange {
                typ: DataType::NDoubles,
                index,
                len: self.values.len(),
            })
    }

    pub fn set_value(&mut self, index: usize, value: f64) -> Result<()> {
        let len = self.values.len();
        let slot = self.values.get_mut(index).ok_or(ValueError::IndexOutOfRange {
            typ: DataType::NDoubles,
            index,
            len,
        })?;
        *slot = value;
        Ok(())
    }

    pub fn resize(&mut self, len: usize) -> Result<()> {
        resize_grow_only(
            DataType::NDoubles,
            &mut self.values,
            len,
            self.config.shrink_policy,
        )
    }
}

impl fmt::Display for NDoublesValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.values.iter().join(", "))
    }
}

impl ValueOps for NDoublesValue {
    fn data_type(&self) -> DataType {
        DataType::NDoubles
    }
    fn byte_size(&self) -> usize {
        self.values.len() * mem::size_of::<f64>()
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        encode_array(w, &self.values)
    }
    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        decode_array(
            DataType::NDoubles,
            r,
            &mut self.values,
            self.config.shrink_policy,
        )?;
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        check_same_len(DataType::NDoubles, &self.values, &rhs.values)?;
        for (v, rhs_v) in self.values.iter_mut().zip(&rhs.values) {
            *v += rhs_v;
        }
        Ok(())
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        check_same_len(DataType::NDoubles, &self.values, &rhs.values)?;
        for (v, rhs_v) in self.values.iter_mut().zip(&rhs.values) {
            *v -= rhs_v;
        }
        Ok(())
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.values.iter_mut().for_each(|v| *v *= d);
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(DataType::NDoubles));
        }
        self.values.iter_mut().for_each(|v| *v /= d);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.)
    }
    fn zero_like(&self) -> Self {
        Self::with_config(self.values.len(), self.config)
    }

    fn as_f64(&self) -> f64 {
        self.values.get(self.config.pivot).copied().unwrap_or(0.)
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count != 0 {
            self.values.iter_mut().for_each(|v| *v /= count as f64);
        }
    }
}
