//! Result types for bulk write operations.

/// Outcome of writing a single document within a bulk call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWriteResult {
    /// The document's `_id`.
    pub id: String,
    /// Whether the destination accepted the document.
    pub success: bool,
    /// Human-readable reason for a rejection.
    pub reason: Option<String>,
    /// Machine-readable error code for a rejection, e.g. `conflict`.
    pub error_code: Option<String>,
}

impl DocumentWriteResult {
    /// A successful write.
    pub fn ok(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            success: true,
            reason: None,
            error_code: None,
        }
    }

    /// A rejected write.
    pub fn rejected(
        id: impl Into<String>,
        error_code: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            success: false,
            reason: Some(reason.into()),
            error_code: Some(error_code.into()),
        }
    }
}

/// Summary of a bulk write: aggregate counts plus every individual result.
///
/// Partial failure is not an error at this level. Callers decide what to do
/// with the rejected documents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BulkWriteReport {
    /// Total number of documents in the call.
    pub total: usize,
    /// Number of documents accepted.
    pub succeeded: usize,
    /// Number of documents rejected.
    pub failed: usize,
    /// Individual results in request order.
    pub results: Vec<DocumentWriteResult>,
}

impl BulkWriteReport {
    /// Build a report from per-document results.
    pub fn from_results(results: Vec<DocumentWriteResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Results for documents the destination rejected.
    pub fn rejected(&self) -> impl Iterator<Item = &DocumentWriteResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}
