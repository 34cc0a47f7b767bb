//! Frame assembly pipeline
//!
//! Turns normalized rows grouped by series id into columnar frames.

mod alias;
mod assemble;
mod frame;
mod wide;

pub use alias::format_alias;
pub use assemble::{EmptySeriesPolicy, FrameOptions, assemble, frame_from_rows};
pub use frame::{Field, FieldConfig, FieldType, FieldValue, Frame};
pub use wide::to_wide;
