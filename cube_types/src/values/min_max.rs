use crate::error::{Result, ValueError};
use crate::serde::{DataType, FieldReader, FieldWriter};
use crate::values::ValueOps;
use std::fmt;

macro_rules! extremum_value {
    ($(#[$meta:meta])* $name:ident, $dtype:ident, $identity:expr, $pick:path) => {
        $(#[$meta])*
        #[derive(PartialEq, Clone, Copy, Debug)]
        pub struct $name(pub f64);

        impl Default for $name {
            fn default() -> Self {
                Self($identity)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl ValueOps for $name {
            fn data_type(&self) -> DataType {
                DataType::$dtype
            }
            fn byte_size(&self) -> usize {
                std::mem::size_of::<f64>()
            }

            fn encode<W: FieldWriter>(&self, w: &mut W) -> Result<()> {
                w.put(self.0)
            }
            fn decode<R: FieldReader>(&mut self, r: &mut R) -> Result<()> {
                self.0 = r.get()?;
                Ok(())
            }

            fn try_add_assign(&mut self, rhs: &Self) -> Result<()> {
                self.0 = $pick(self.0, rhs.0);
                Ok(())
            }
            fn try_sub_assign(&mut self, _rhs: &Self) -> Result<()> {
                Err(ValueError::invalid_op(DataType::$dtype, "subtract"))
            }
            fn try_mul_assign(&mut self, d: f64) -> Result<()> {
                self.0 *= d;
                Ok(())
            }
            fn try_div_assign(&mut self, d: f64) -> Result<()> {
                if d == 0. {
                    return Err(ValueError::division_by_zero(DataType::$dtype));
                }
                self.0 /= d;
                Ok(())
            }
            fn assign_f64(&mut self, d: f64) -> Result<()> {
                self.0 = d;
                Ok(())
            }
            fn assign(&mut self, rhs: &Self) -> Result<()> {
                self.0 = rhs.0;
                Ok(())
            }

            fn is_zero(&self) -> bool {
                self.0 == $identity
            }
            fn zero_like(&self) -> Self {
                Self::default()
            }

            fn as_f64(&self) -> f64 {
                self.0
            }
            fn as_char(&self) -> u8 {
                self.0.to_ne_bytes()[0]
            }

            /// An extremum over processes does not scale with their count.
            fn normalize_with_cluster_count(&mut self, _count: u64) {}

            fn is_single_value(&self) -> bool {
                true
            }
        }
    };
}

extremum_value!(
    /// Running minimum. The identity is `f64::MAX`.
    MinDoubleValue,
    MinDouble,
    f64::MAX,
    f64::min
);
extremum_value!(
    /// Running maximum. The identity is `-f64::MAX`.
    MaxDoubleValue,
    MaxDouble,
    -f64::MAX,
    f64::max
);
