//! Field-level rules shared by the extraction strategies and the normalizer.

pub mod amounts;
pub mod dates;
pub mod description;
pub mod patterns;

pub use amounts::{format_amount, parse_amount, split_marker};
pub use dates::{DateFormat, DateParser};
pub use description::clean_description;
