//! Merge of configuration sources.

pub mod merge_policy;
pub mod service;
