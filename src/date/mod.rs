//! Date Expressions
//!
//! Parses and prints granularity-aware calendar expressions:
//!
//! - **Granularity**: day / week / month / year descriptors
//! - **Format**: text ⇄ [`DateValue`] with round-trip printing
//!
//! # Accepted Expressions
//!
//! ```text
//! today | yesterday | tomorrow | monday | tue
//! this week | last month | next year | week 12
//! 15 Mar 2024 | 2024-03-15 | March 2024 | 2024-03 | 2024 | 24
//! 14:30 | 2:30 pm
//! 2024-03-15T10:00:00Z | Fri, 15 Mar 2024 10:00:00 +0000
//! ```
//!
//! # Example
//!
//! ```rust
//! use searchql::date::{self, Granularity};
//!
//! let value = date::parse("last month").unwrap();
//! assert_eq!(value.granularity(), Some(Granularity::Month));
//! assert_eq!(date::print(&value, None), "last month");
//! ```

mod error;
mod format;
mod granularity;

pub use error::{DateParseError, DateResult};
pub use format::{parse, parse_at, print, print_at, print_iso8601, DateValue};
pub use granularity::Granularity;
