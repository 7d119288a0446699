use crate::error::{Result, ValueError};
use derive_more::{Deref, From};
use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::FromPrimitive;

/// The integer that precedes a homogeneous run of values on the wire.
#[derive(From, Deref, PartialEq, Eq, Clone, Copy, Debug)]
pub struct DataTypeInt(u32);
impl From<DataType> for DataTypeInt {
    fn from(typ: DataType) -> Self {
        Self(typ as u32)
    }
}

/// Tags 0 through 17 are the historical report-file tags and must not move.
/// Variants that never had a tag are appended after them.
#[repr(u32)]
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, FromPrimitive, ToPrimitive, Debug)]
pub enum DataType {
    None = 0,
    Double = 1,
    Int8 = 2,
    Uint8 = 3,
    Int16 = 4,
    Uint16 = 5,
    Int32 = 6,
    Uint32 = 7,
    Int64 = 8,
    Uint64 = 9,
    Complex = 10,
    TauAtomic = 11,
    Rate = 12,
    MinDouble = 13,
    MaxDouble = 14,
    ScaleFunc = 15,
    Histogram = 16,
    NDoubles = 17,
    StatLevel1 = 18,
    StatLevel2 = 19,
    StatLevel3 = 20,
    StatLevel4 = 21,
    String = 22,
}
impl TryFrom<DataTypeInt> for DataType {
    type Error = ValueError;
    fn try_from(int: DataTypeInt) -> Result<Self> {
        DataType::from_u32(int.0).ok_or(ValueError::UnknownDataType(int.0))
    }
}
impl DataType {
    pub fn is_scalar(self) -> bool {
        matches!(
            self,
            DataType::Double
                | DataType::Int8
                | DataType::Uint8
                | DataType::Int16
                | DataType::Uint16
                | DataType::Int32
                | DataType::Uint32
                | DataType::Int64
                | DataType::Uint64
                | DataType::MinDouble
                | DataType::MaxDouble
        )
    }
}
