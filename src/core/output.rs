//! Public output types for multi-item operations.

use serde::Serialize;

use crate::error::Result;

/// Standardized bulk execution result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkResult<T: Serialize> {
    pub action: String,
    pub results: Vec<ItemOutcome<T>>,
    pub summary: BulkSummary,
}

/// Outcome for a single item in a bulk operation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemOutcome<T: Serialize> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub result: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of bulk operation results.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl<T: Serialize> BulkResult<T> {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            results: Vec::new(),
            summary: BulkSummary::default(),
        }
    }

    /// Record one item; an error is kept as its message and never aborts the batch.
    pub fn record(&mut self, id: impl Into<String>, outcome: Result<T>) {
        self.summary.total += 1;
        match outcome {
            Ok(result) => {
                self.summary.succeeded += 1;
                self.results.push(ItemOutcome {
                    id: id.into(),
                    result: Some(result),
                    error: None,
                });
            }
            Err(e) => {
                self.summary.failed += 1;
                self.results.push(ItemOutcome {
                    id: id.into(),
                    result: None,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn record_tallies_successes_and_failures() {
        let mut bulk: BulkResult<u32> = BulkResult::new("replace");
        bulk.record("a.prefab", Ok(2));
        bulk.record("b.prefab", Err(Error::other("disk full")));

        assert_eq!(bulk.summary.total, 2);
        assert_eq!(bulk.summary.succeeded, 1);
        assert_eq!(bulk.summary.failed, 1);
        assert!(bulk.has_failures());
        assert_eq!(bulk.results[1].error.as_deref(), Some("Unexpected error"));
    }
}
