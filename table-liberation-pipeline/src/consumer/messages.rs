//! Message types for the consumer.
//!
//! Defines what flows from the fetch loop to the record stream, and the
//! states the fetch loop moves through.

use table_liberation_repository::StoreError;
use table_liberation_shared::RecordBatch;

/// Messages sent by the fetch loop.
///
/// Every stream ends with exactly one of `End`, `Cancelled` or `Error`,
/// unless the receiving side went away first.
#[derive(Debug)]
pub enum FetchMessage {
    /// One page of records, possibly empty.
    Batch(RecordBatch),
    /// The last page has been published.
    End,
    /// Cancellation was requested; no further pages will be fetched.
    Cancelled,
    /// The store failed. Pages published before it stand.
    Error(StoreError),
}

/// States of the fetch loop.
///
/// `Idle -> Fetching -> {Publishing -> Fetching | Completed | Failed}`, with
/// `Cancelled` reachable from `Idle` and `Publishing`. The last three are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    Fetching,
    Publishing,
    Completed,
    Failed,
    Cancelled,
}

impl FetchState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchState::Completed | FetchState::Failed | FetchState::Cancelled
        )
    }
}

/// How a fetch loop ended, with the number of batches it published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Completed { batches: usize },
    Cancelled { batches: usize },
    Failed { batches: usize, error: StoreError },
}

impl FetchOutcome {
    pub fn batches(&self) -> usize {
        match self {
            FetchOutcome::Completed { batches }
            | FetchOutcome::Cancelled { batches }
            | FetchOutcome::Failed { batches, .. } => *batches,
        }
    }
}
