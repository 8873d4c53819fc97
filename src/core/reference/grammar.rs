//! Reference token grammar.
//!
//! A reference token is the flow mapping the asset serializer writes for an object
//! reference:
//!
//! ```text
//! {fileID: 2941741086030567527, guid: 845e14e3d06d247fb9c79560f3a335e9, type: 3}
//! ```
//!
//! The serializer wraps long lines, so any run of whitespace between fields (line
//! breaks included) is accepted. Only the `fileID` and `guid` fields are captured; the
//! rest of the mapping is never consumed beyond the terminator that ends the guid.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::Serialize;

use crate::identity::ObjectIdentity;

/// Opening keyword, up to and excluding the whitespace before the local id.
pub(crate) const HEAD_KEYWORD: &str = r"\{fileID:";
/// Keyword between the separator after the local id and the container id.
pub(crate) const GUID_KEYWORD: &str = r"guid:";
/// A local id written the way `i64` formats it: no leading zeros, no `-0`.
pub(crate) const CANONICAL_LOCAL_ID: &str = r"0|-?[1-9][0-9]*";
/// Characters that may end the container id field.
pub(crate) const TERMINATOR: &str = r"[,}]";

fn generic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let source = format!(
            r"(?P<head>{head}\s+)(?P<local>{local})(?P<mid>,\s+{guid}\s+)(?P<container>[0-9A-Za-z]+)(?P<tail>{term})",
            head = HEAD_KEYWORD,
            local = CANONICAL_LOCAL_ID,
            guid = GUID_KEYWORD,
            term = TERMINATOR,
        );
        Regex::new(&source).expect("reference token grammar compiles")
    })
}

/// One reference token found in a text.
///
/// Borrows the scanned text; the literal fragments around the two identity fields are
/// kept so the token can be rebuilt with only those fields swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceToken<'t> {
    span: Range<usize>,
    identity: ObjectIdentity,
    head: &'t str,
    mid: &'t str,
    tail: &'t str,
    raw: &'t str,
}

impl<'t> ReferenceToken<'t> {
    fn from_captures(caps: Captures<'t>) -> Option<Self> {
        let whole = caps.get(0)?;
        // An integer that does not fit in i64 is not a well-formed token.
        let local_id = caps.name("local")?.as_str().parse::<i64>().ok()?;
        let container = caps.name("container")?.as_str();

        Some(Self {
            span: whole.range(),
            identity: ObjectIdentity::new(local_id, container),
            head: caps.name("head")?.as_str(),
            mid: caps.name("mid")?.as_str(),
            tail: caps.name("tail")?.as_str(),
            raw: whole.as_str(),
        })
    }

    pub fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }

    /// Byte range of the token in the scanned text.
    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// The exact matched text.
    pub fn as_str(&self) -> &'t str {
        self.raw
    }

    /// Rebuild the token with `replacement` in place of the identity fields.
    ///
    /// Whitespace, line breaks and the terminator are copied from the original match.
    pub fn rewrite(&self, replacement: &ObjectIdentity) -> String {
        let local = replacement.local_id.to_string();
        let mut out = String::with_capacity(
            self.head.len()
                + local.len()
                + self.mid.len()
                + replacement.container_id.len()
                + self.tail.len(),
        );
        out.push_str(self.head);
        out.push_str(&local);
        out.push_str(self.mid);
        out.push_str(&replacement.container_id);
        out.push_str(self.tail);
        out
    }
}

/// Every well-formed reference token in `text`, in document order.
///
/// The iterator is lazy; calling this again on the same text yields the same sequence.
pub fn find_all(text: &str) -> impl Iterator<Item = ReferenceToken<'_>> + '_ {
    generic_pattern()
        .captures_iter(text)
        .filter_map(ReferenceToken::from_captures)
}

pub fn extract_identity(token: &ReferenceToken<'_>) -> ObjectIdentity {
    token.identity.clone()
}

/// Container ids referenced anywhere in `text`.
pub fn declared_dependencies(text: &str) -> BTreeSet<String> {
    find_all(text)
        .map(|token| token.identity.container_id)
        .collect()
}

/// Position of a token in its file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// Line number (1-indexed) of the token's opening brace.
    pub line: usize,
    /// Column number (1-indexed, in bytes).
    pub column: usize,
}

impl Occurrence {
    pub fn at(text: &str, offset: usize) -> Self {
        let before = &text[..offset];
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        Self {
            line: before.matches('\n').count() + 1,
            column: offset - line_start + 1,
        }
    }
}
