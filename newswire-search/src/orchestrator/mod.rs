//! Search orchestrator: staggered concurrent fan-out, merge, sort, dedup.
//!
//! This module fans a query out to every configured source adapter,
//! bounds each one by a per-source timeout and the whole call by an overall
//! deadline, merges what came back in adapter order, sorts by recency, and
//! drops duplicate URLs.

pub mod dedup;
pub mod search;
pub mod url_normalize;

pub use search::{merge_contributions, Orchestrator};
