//! Reference rewriting.
//!
//! `replace_dependency` is a pure text transform: every token whose identity equals the
//! original is rebuilt with the replacement's fields, and all other bytes are copied
//! through unchanged. `RewriteEngine` drives it over files of a corpus.

mod engine;

use serde::Serialize;

use crate::error::Result;
use crate::identity::ObjectIdentity;
use crate::reference::find_all;

pub use engine::{FileRewrite, RewriteEngine, SkippedCandidate, UsageRecord, UsageReport};

/// Text after a rewrite, with the number of tokens substituted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub content: String,
    pub replacements: usize,
}

impl Rewrite {
    pub fn changed(&self) -> bool {
        self.replacements > 0
    }
}

/// Substitute `replacement` for every token in `text` that carries `original`.
///
/// Both identities are validated first. When nothing matches, the content is the input
/// unchanged.
pub fn rewrite_references(
    text: &str,
    original: &ObjectIdentity,
    replacement: &ObjectIdentity,
) -> Result<Rewrite> {
    original.validate()?;
    replacement.validate()?;

    let mut content = String::with_capacity(text.len());
    let mut replacements = 0;
    let mut cursor = 0;

    for token in find_all(text) {
        if token.identity() != original {
            continue;
        }
        content.push_str(&text[cursor..token.start()]);
        content.push_str(&token.rewrite(replacement));
        cursor = token.end();
        replacements += 1;
    }
    content.push_str(&text[cursor..]);

    Ok(Rewrite {
        content,
        replacements,
    })
}

/// `rewrite_references` without the count.
pub fn replace_dependency(
    text: &str,
    original: &ObjectIdentity,
    replacement: &ObjectIdentity,
) -> Result<String> {
    rewrite_references(text, original, replacement).map(|rewrite| rewrite.content)
}
