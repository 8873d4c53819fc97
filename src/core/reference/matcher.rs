//! Targeted matcher: recognizes only tokens carrying one specific identity.

use regex::Regex;

use super::grammar::{Occurrence, GUID_KEYWORD, HEAD_KEYWORD, TERMINATOR};
use crate::error::{Error, Result};
use crate::identity::ObjectIdentity;

/// A compiled pattern bound to one identity pair.
///
/// Both fields are embedded as escaped literals and anchored on each side (whitespace
/// before, separator or terminator after), so a field that merely contains the queried
/// value as a substring never matches.
#[derive(Debug, Clone)]
pub struct TargetedMatcher {
    identity: ObjectIdentity,
    pattern: Regex,
}

impl TargetedMatcher {
    /// Fails with `identity.malformed` before any text is scanned.
    pub fn new(identity: &ObjectIdentity) -> Result<Self> {
        identity.validate()?;

        let source = format!(
            r"{head}\s+{local},\s+{guid}\s+{container}{term}",
            head = HEAD_KEYWORD,
            local = regex::escape(&identity.local_id.to_string()),
            guid = GUID_KEYWORD,
            container = regex::escape(&identity.container_id),
            term = TERMINATOR,
        );
        let pattern = Regex::new(&source).map_err(|e| {
            Error::identity_malformed(identity.local_id, &identity.container_id, e.to_string())
        })?;

        Ok(Self {
            identity: identity.clone(),
            pattern,
        })
    }

    pub fn identity(&self) -> &ObjectIdentity {
        &self.identity
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    pub fn count(&self, text: &str) -> usize {
        self.pattern.find_iter(text).count()
    }

    /// Line/column of every occurrence, in document order.
    pub fn occurrences(&self, text: &str) -> Vec<Occurrence> {
        self.pattern
            .find_iter(text)
            .map(|m| Occurrence::at(text, m.start()))
            .collect()
    }
}

/// True iff `text` holds at least one token with exactly `identity`.
pub fn matches(text: &str, identity: &ObjectIdentity) -> Result<bool> {
    Ok(TargetedMatcher::new(identity)?.is_match(text))
}
