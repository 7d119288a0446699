use crate::error::{Result, ValueError};
use crate::serde::{DataType, DataTypeInt};
use crate::values::{
    CharValue, ComplexValue, DoubleValue, HistogramValue, MaxDoubleValue, MinDoubleValue,
    NDoublesConfig, NDoublesValue, RateValue, ScaleFuncConfig, ScaleFuncValue, ShrinkPolicy,
    SignedLongValue, SignedShortValue, SignedValue, StatLevel1Value, StatLevel2Value,
    StatLevel3Value, StatLevel4Value, StringValue, TauAtomicConfig, TauAtomicValue,
    UnsignedCharValue, UnsignedLongValue, UnsignedShortValue, UnsignedValue, Value,
};

/// Materializes identity values of a runtime-chosen variant.
///
/// The shape parameters apply to every value created for one metric: how many elements the
/// array-backed variants hold, and the per-variant configuration they carry.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueFactory {
    pub ndoubles_len: usize,
    pub ndoubles: NDoublesConfig,
    pub histogram_bins: usize,
    pub histogram_shrink_policy: ShrinkPolicy,
    pub scale_func: ScaleFuncConfig,
    pub tau_atomic: TauAtomicConfig,
}

impl ValueFactory {
    pub fn create(&self, typ: DataType) -> Result<Value> {
        let value = match typ {
            DataType::None => return Err(ValueError::UnknownDataType(typ as u32)),
            DataType::Double => DoubleValue::default().into(),
            DataType::Int8 => CharValue::default().into(),
            DataType::Uint8 => UnsignedCharValue::default().into(),
            DataType::Int16 => SignedShortValue::default().into(),
            DataType::Uint16 => UnsignedShortValue::default().into(),
            DataType::Int32 => SignedValue::default().into(),
            DataType::Uint32 => UnsignedValue::default().into(),
            DataType::Int64 => SignedLongValue::default().into(),
            DataType::Uint64 => UnsignedLongValue::default().into(),
            DataType::Complex => ComplexValue::default().into(),
            DataType::TauAtomic => TauAtomicValue::with_config(self.tau_atomic).into(),
            DataType::Rate => RateValue::default().into(),
            DataType::MinDouble => MinDoubleValue::default().into(),
            DataType::MaxDouble => MaxDoubleValue::default().into(),
            DataType::ScaleFunc => ScaleFuncValue::with_config(self.scale_func).into(),
            DataType::Histogram => {
                let mut histogram = HistogramValue::new(self.histogram_bins);
                histogram.shrink_policy = self.histogram_shrink_policy;
                histogram.into()
            }
            DataType::NDoubles => NDoublesValue::with_config(self.ndoubles_len, self.ndoubles).into(),
            DataType::StatLevel1 => StatLevel1Value::default().into(),
            DataType::StatLevel2 => StatLevel2Value::default().into(),
            DataType::StatLevel3 => StatLevel3Value::default().into(),
            DataType::StatLevel4 => StatLevel4Value::default().into(),
            DataType::String => StringValue::default().into(),
        };
        Ok(value)
    }

    pub fn create_from_tag(&self, tag: DataTypeInt) -> Result<Value> {
        self.create(DataType::try_from(tag)?)
    }
}

/// Identity value of `typ`, with array-backed variants empty.
pub fn new_value(typ: DataType) -> Result<Value> {
    ValueFactory::default().create(typ)
}
