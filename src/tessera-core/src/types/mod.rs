//! Record types for Tessera blocks.
//!
//! `Value` is the element type of sequence blocks. `Row` is the record type
//! of columnar blocks: named values in column order.

mod row;
mod value;

pub use row::Row;
pub use value::Value;
