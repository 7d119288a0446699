use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter, Framing, Padding};
use crate::values::ValueOps;
use itertools::Itertools;
use std::cmp::Ordering;
use std::fmt;

pub const MAX_TERMS: usize = 30;
pub const MAX_MEASUREMENTS: usize = 10;

/// Fixed-framing capacity. Report files reserve this much per value regardless of content.
pub const SCALE_FUNC_BYTE_SIZE: usize = 2 * 4 + MAX_TERMS * 20 + MAX_MEASUREMENTS * 24;
const SCALE_FUNC_SLOTS: usize = 2 + MAX_TERMS * 4 + MAX_MEASUREMENTS * 3;

const TERM_BYTES: usize = 8 + 4 + 4 + 4;
const MEASUREMENT_BYTES: usize = 4 + 8 + 8;

/// One summand `a * x^(b/c) * log2(x)^d`.
#[derive(PartialEq, Clone, Copy, Debug)]
pub struct Term {
    pub a: f64,
    pub b: i32,
    pub c: u32,
    pub d: i32,
}

impl Term {
    pub fn new(a: f64, b: i32, c: u32, d: i32) -> Self {
        Self { a, b, c, d }
    }

    pub fn exponent(&self) -> f64 {
        self.b as f64 / self.c as f64
    }

    /// Terms of the same shape differ only in their coefficient and can be merged.
    pub fn same_shape(&self, other: &Term) -> bool {
        self.b == other.b && self.c == other.c && self.d == other.d
    }

    pub fn calculate_value(&self, x: f64) -> f64 {
        self.a * x.powf(self.exponent()) * x.log2().powi(self.d)
    }

    /// Asymptotic growth order: vanishing terms first, then by polynomial exponent, then by log
    /// exponent, then by coefficient.
    pub fn dominance_cmp(&self, other: &Term) -> Ordering {
        if self.a == 0. && other.a > 0. {
            return Ordering::Less;
        }
        if self.a > 0. && other.a == 0. {
            return Ordering::Greater;
        }
        self.exponent()
            .total_cmp(&other.exponent())
            .then(self.d.cmp(&other.d))
            .then(self.a.total_cmp(&other.a))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.a)?;
        if self.b != 0 {
            if self.b as i64 == self.c as i64 {
                write!(f, "*x")?;
            } else {
                write!(f, "*x**({}/{})", self.b, self.c)?;
            }
        }
        match self.d {
            0 => Ok(()),
            1 => write!(f, "*log(x)"),
            d => write!(f, "*log(x)**({})", d),
        }
    }
}

/// A data point the function was fitted against.
#[derive(PartialEq, Clone, Copy, Debug, Default)]
pub struct Measurement {
    pub num_processes: u32,
    pub mean: f64,
    pub width: f64,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct ScaleFuncConfig {
    /// Rank by the dominant term instead of evaluating at `core_count`.
    pub asymptotic: bool,
    pub core_count: u64,
}

impl Default for ScaleFuncConfig {
    fn default() -> Self {
        Self {
            asymptotic: true,
            core_count: 1,
        }
    }
}

/// A symbolic scaling function: a sum of terms kept sorted from most to least dominant.
#[derive(Clone, Debug, Default)]
pub struct ScaleFuncValue {
    terms: Vec<Term>,
    measurements: Vec<Measurement>,
    pub config: ScaleFuncConfig,
    max_log_exp: i32,
}

/// Equality ignores `max_log_exp`, which records history rather than content.
impl PartialEq for ScaleFuncValue {
    fn eq(&self, other: &Self) -> bool {
        self.terms == other.terms
            && self.measurements == other.measurements
            && self.config == other.config
    }
}

impl ScaleFuncValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ScaleFuncConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Builds the function from `(a, b, c, d)` quadruples.
    pub fn from_coefficients(coefficients: &[f64]) -> Result<Self> {
        if coefficients.len() % 4 != 0 {
            return Err(ValueError::malformed(
                DataType::ScaleFunc,
                format!("{} coefficients do not form terms", coefficients.len()),
            ));
        }
        let mut sfv = Self::new();
        for chunk in coefficients.chunks_exact(4) {
            let term = Term::new(chunk[0], chunk[1] as i32, chunk[2] as u32, chunk[3] as i32);
            sfv.add_term(term, false)?;
        }
        sfv.sort_terms();
        Ok(sfv)
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn dominant_term(&self) -> Option<&Term> {
        self.terms.first()
    }

    /// Highest log exponent seen on a dominant term of this instance.
    pub fn max_log_exp(&self) -> i32 {
        self.max_log_exp
    }

    /// Merges `term` into an existing term of the same shape, or appends it.
    ///
    /// A merge that cancels the coefficient removes the term.
    pub fn add_term(&mut self, term: Term, sort: bool) -> Result<()> {
        if term.c == 0 {
            return Err(ValueError::malformed(
                DataType::ScaleFunc,
                "term exponent has a zero denominator",
            ));
        }
        if term.a == 0. {
            return Ok(());
        }

        match self.terms.iter().position(|t| t.same_shape(&term)) {
            Some(i) => {
                self.terms[i].a += term.a;
                if self.terms[i].a == 0. {
                    self.terms.remove(i);
                }
            }
            None => {
                if self.terms.len() == MAX_TERMS {
                    return Err(ValueError::malformed(
                        DataType::ScaleFunc,
                        format!("more than {MAX_TERMS} terms"),
                    ));
                }
                self.terms.push(term);
            }
        }

        if sort {
            self.sort_terms();
        }
        Ok(())
    }

    pub fn sort_terms(&mut self) {
        self.terms.sort_by(|x, y| y.dominance_cmp(x));
        if let Some(dominant) = self.terms.first() {
            self.max_log_exp = self.max_log_exp.max(dominant.d);
        }
    }

    pub fn add_measurement(&mut self, measurement: Measurement) -> Result<()> {
        if self.measurements.len() == MAX_MEASUREMENTS {
            return Err(ValueError::malformed(
                DataType::ScaleFunc,
                format!("more than {MAX_MEASUREMENTS} measurements"),
            ));
        }
        self.measurements.push(measurement);
        Ok(())
    }

    pub fn calculate_value(&self, x: f64) -> f64 {
        self.terms.iter().map(|t| t.calculate_value(x)).sum()
    }

    pub fn calculate_values(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|x| self.calculate_value(*x)).collect()
    }

    /// Packs the dominant term into one sortable number. Only good for ranking.
    pub fn asymptotic_value(&self) -> f64 {
        match self.dominant_term() {
            None => 0.,
            Some(t) => t.exponent() * 1000. + t.d as f64 + t.a / 1000.,
        }
    }

    /// Orders two functions by their dominant terms. An empty function ranks lowest.
    pub fn dominance_cmp(&self, other: &Self) -> Ordering {
        match (self.dominant_term(), other.dominant_term()) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.dominance_cmp(y),
        }
    }

    fn merge_terms(&mut self, rhs: &Self, sign: f64) -> Result<()> {
        let mut merged = self.clone();
        for term in &rhs.terms {
            merged.add_term(
                Term {
                    a: term.a * sign,
                    ..*term
                },
                false,
            )?;
        }
        merged.sort_terms();
        *self = merged;
        Ok(())
    }

    /// Drops terms whose coefficient reached zero and restores the dominance order, which a
    /// negative or tiny factor can upset.
    fn rescaled(&mut self, f: impl Fn(f64) -> f64) {
        self.terms.iter_mut().for_each(|t| t.a = f(t.a));
        self.terms.retain(|t| t.a != 0.);
        self.sort_terms();
    }

    fn padding(&self) -> Padding {
        padding_for(self.terms.len(), self.measurements.len())
    }
}

fn padding_for(terms_count: usize, measurements_count: usize) -> Padding {
    Padding {
        bytes: SCALE_FUNC_BYTE_SIZE
            - 8
            - terms_count * TERM_BYTES
            - measurements_count * MEASUREMENT_BYTES,
        slots: SCALE_FUNC_SLOTS - 2 - terms_count * 4 - measurements_count * 3,
    }
}

impl fmt::Display for ScaleFuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.measurements {
            write!(f, "({},{})", m.num_processes, m.mean)?;
        }
        if !self.config.asymptotic {
            return write!(f, "{}", self.calculate_value(self.config.core_count as f64));
        }
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        write!(f, "{}", self.terms.iter().take(3).join(" + "))
    }
}

impl ValueOps for ScaleFuncValue {
    fn data_type(&self) -> DataType {
        DataType::ScaleFunc
    }
    fn byte_size(&self) -> usize {
        SCALE_FUNC_BYTE_SIZE
    }

    fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
        /* counts */
        w.put(self.terms.len() as u32)?;
        w.put(self.measurements.len() as u32)?;

        /* terms */
        for t in &self.terms {
            w.put(t.a)?;
            w.put(t.b)?;
            w.put(t.c)?;
            w.put(t.d)?;
        }

        /* measurements */
        for m in &self.measurements {
            w.put(m.num_processes)?;
            w.put(m.mean)?;
            w.put(m.width)?;
        }

        if w.framing() == Framing::Fixed {
            w.pad(self.padding())?;
        }
        Ok(())
    }

    fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
        let terms_count = r.get::<u32>()? as usize;
        let measurements_count = r.get::<u32>()? as usize;
        if terms_count > MAX_TERMS || measurements_count > MAX_MEASUREMENTS {
            return Err(ValueError::malformed(
                DataType::ScaleFunc,
                format!("{terms_count} terms and {measurements_count} measurements"),
            ));
        }

        let mut decoded = Self {
            config: self.config,
            max_log_exp: self.max_log_exp,
            ..Self::default()
        };
        for _ in 0..terms_count {
            let term = Term {
                a: r.get()?,
                b: r.get()?,
                c: r.get()?,
                d: r.get()?,
            };
            decoded.add_term(term, false)?;
        }
        decoded.sort_terms();

        for _ in 0..measurements_count {
            decoded.add_measurement(Measurement {
                num_processes: r.get()?,
                mean: r.get()?,
                width: r.get()?,
            })?;
        }

        // Padding follows the counts on the wire, not what survived merging.
        if r.framing() == Framing::Fixed {
            r.skip(padding_for(terms_count, measurements_count))?;
        }
        *self = decoded;
        Ok(())
    }

    fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
        self.merge_terms(rhs, 1.)
    }
    fn try_sub_assign(&mut self, rhs: &Self) -> Result<()> {
        self.merge_terms(rhs, -1.)
    }
    fn try_mul_assign(&mut self, d: f64) -> Result<()> {
        self.rescaled(|a| a * d);
        Ok(())
    }
    fn try_div_assign(&mut self, d: f64) -> Result<()> {
        if d == 0. {
            return Err(ValueError::division_by_zero(DataType::ScaleFunc));
        }
        self.rescaled(|a| a / d);
        Ok(())
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.measurements.is_empty()
    }
    fn zero_like(&self) -> Self {
        Self::with_config(self.config)
    }

    fn as_f64(&self) -> f64 {
        if self.config.asymptotic {
            self.asymptotic_value()
        } else {
            self.calculate_value(self.config.core_count as f64)
        }
    }

    fn normalize_with_cluster_count(&mut self, count: u64) {
        if count != 0 {
            self.rescaled(|a| a / count as f64);
        }
    }
}
