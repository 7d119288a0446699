use crate::serde::DataType;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Type mismatch: cannot combine {lhs:?} with {rhs:?}")]
    TypeMismatch { lhs: DataType, rhs: DataType },

    #[error("Unsupported operation on {typ:?}: {op}")]
    InvalidOperation { typ: DataType, op: &'static str },

    #[error("Numeric error on {typ:?}: {msg}")]
    Numeric { typ: DataType, msg: &'static str },

    #[error("Refused to shrink {typ:?} from {from} to {to} elements")]
    ShrinkRejected {
        typ: DataType,
        from: usize,
        to: usize,
    },

    #[error("Unknown data type tag {0}")]
    UnknownDataType(u32),

    #[error("Index {index} out of range for {typ:?} of length {len}")]
    IndexOutOfRange {
        typ: DataType,
        index: usize,
        len: usize,
    },

    #[error("Buffer exhausted: needed {needed} more, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("Malformed {typ:?}: {msg}")]
    Malformed { typ: DataType, msg: String },

    #[error("{typ:?} cannot be encoded as {encoding}")]
    UnsupportedEncoding {
        typ: DataType,
        encoding: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = ValueError> = std::result::Result<T, E>;

impl ValueError {
    pub fn invalid_op(typ: DataType, op: &'static str) -> Self {
        Self::InvalidOperation { typ, op }
    }

    pub fn division_by_zero(typ: DataType) -> Self {
        Self::Numeric {
            typ,
            msg: "division by zero",
        }
    }

    pub fn malformed<S: Into<String>>(typ: DataType, msg: S) -> Self {
        Self::Malformed {
            typ,
            msg: msg.into(),
        }
    }
}
