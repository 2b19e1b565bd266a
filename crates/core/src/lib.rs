//! Core types for sheetbatch: range notation and cell values.
//!
//! Nothing here talks to the network.

pub mod address;
pub mod value;

pub use address::{
    decode_column, encode_column, format_qualified, parse, parse_qualified, parse_rect,
    AddressError, Axis, LinearRange, Range, RectRange, TabId,
};
pub use value::{Channel, Kind, Number, TypedCell, Value, ValueError};
