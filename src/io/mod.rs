//! File-format plumbing shared by the sources and sinks.

pub mod compression;
pub mod csv;
pub mod jsonl;
