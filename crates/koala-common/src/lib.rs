//! Common utilities for the Koala HTML parser.
//!
//! This crate provides shared infrastructure used by the parser components:
//! - **Source Locations** - line/column/offset spans attached to tokens and nodes
//! - **Warning System** - deduplicated diagnostics for API misuse

pub mod location;
pub mod warning;
