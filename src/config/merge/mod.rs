//! Merge layer: defaults, then sources, then deserialization.

pub mod merge_policy;
pub mod service;
