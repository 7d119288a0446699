//! # Serialization format
//!
//! Every [`Value`](crate::values::Value) describes its layout once, as an ordered list of
//! fields written through a [`FieldWriter`] and read back through a [`FieldReader`].
//! Three paths consume that description:
//!
//! - The byte buffer ([`ByteWriter`], [`ByteReader`]): each field's bytes verbatim, in host order.
//!   This is the report-file layout.
//! - The array of doubles ([`DoublesWriter`], [`DoublesReader`]): each field occupies one `f64`
//!   slot and is cast to and from the field's type.
//! - The network connection (`cube_network::Connection`): each field's bytes, swapped when the
//!   peer has the other endianness.
//!
//! The first two use [`Framing::Fixed`]: element counts the receiving instance already knows are
//! not written, and fixed-capacity layouts are padded. The connection uses
//! [`Framing::SelfDescribing`].
//!
//! The below pseudocode depicts the composite layouts. Scalars are a single field.
//!
//! ```text
//! struct Complex      { re: f64, im: f64 }
//! struct Rate         { numerator: f64, denominator: f64 }
//! struct StatLevelL   { n: u32, sum: f64, sum2: f64, .. sum_L: f64 }
//! struct TauAtomic    { n: u32, min: f64, max: f64, sum: f64, sum2: f64 }
//!
//! struct Histogram {
//!     min:            f64,
//!     max:            f64,
//!     bins_count:     u64,            // SelfDescribing only.
//!     bins:           [f64; bins_count],
//! }
//!
//! struct NDoubles {
//!     values_count:   u64,            // SelfDescribing only.
//!     values:         [f64; values_count],
//! }
//!
//! struct ScaleFunc {
//!     terms_count:            u32,
//!     measurements_count:     u32,
//!     terms:                  [{ a: f64, b: i32, c: u32, d: i32 }; terms_count],
//!     measurements:           [{ num_processes: u32, mean: f64, width: f64 }; measurements_count],
//!     padding:                // Fixed only. Up to 848 bytes, or 152 slots.
//! }
//!
//! struct String {
//!     len:            u64,            // Counts the trailing NUL.
//!     bytes:          [u8; len],      // Not representable as doubles.
//! }
//! ```

mod buf;
mod data_type;
mod field;

pub use buf::*;
pub use data_type::*;
pub use field::*;
