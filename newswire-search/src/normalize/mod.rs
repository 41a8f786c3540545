//! Shared, stateless parsing utilities used by every source adapter.
//!
//! - [`text`]: markup/entity cleanup and snippet truncation
//! - [`date`]: ordered, total date-parsing strategies
//! - [`feed`]: RSS/Atom item extraction

pub mod date;
pub mod feed;
pub mod text;

pub use date::{parse_feed_date, parse_generic_date, parse_iso_timestamp};
pub use feed::parse_feed_items;
pub use text::{clean_opt, clean_snippet, clean_text};
