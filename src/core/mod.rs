// Public modules
pub mod asset;
pub mod corpus;
pub mod error;
pub mod identity;
pub mod index;
pub mod output;
pub mod progress;
pub mod reference;
pub mod rewrite;

// Internal modules - not part of public API
pub(crate) mod paths;

// Public modules for CLI access
pub mod defaults;
pub mod local_files;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use identity::ObjectIdentity;
pub use output::{BulkResult, BulkSummary, ItemOutcome};
