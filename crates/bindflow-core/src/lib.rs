//! Bindflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by the bindflow
//! pipeline. It performs no I/O. It includes:
//!
//! - **Records**: Routing-binding documents and the match results derived
//!   from them ([`record`] module)
//! - **Identifiers**: Sanitization of graph node ids and artifact names
//!   ([`identifier`] module)
//! - **Versions**: Numeric, dot-separated version keys used for ordering
//!   ([`version::VersionKey`])

pub mod identifier;
pub mod record;
pub mod version;
