//! Reference tokens: recognizing `{fileID: ..., guid: ...}` occurrences in text.
//!
//! Two forms share one grammar:
//! - the generic scan (`find_all`) yields every well-formed token with its identity
//! - the targeted matcher (`TargetedMatcher`) recognizes one identity only

mod grammar;
mod matcher;

pub use grammar::{declared_dependencies, extract_identity, find_all, Occurrence, ReferenceToken};
pub use matcher::{matches, TargetedMatcher};
