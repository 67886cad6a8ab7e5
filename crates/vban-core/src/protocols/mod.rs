//! Protocol codecs.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets, ranges and masks (source of truth)
//! - `reader`: bounds-checked byte access
//! - per-variant modules: domain-level decoding and encoding
//! - `error`: explicit, actionable errors
//!
//! Codecs are pure and contain no I/O; sources and analysis layers handle
//! file access and aggregation.

pub mod common;
pub mod vban;
