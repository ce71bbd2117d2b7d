//! Paged table store trait definition.

use async_trait::async_trait;
use std::num::NonZeroUsize;

use crate::errors::StoreError;
use table_liberation_shared::{ContinuationToken, RecordBatch, TableName};

/// Abstract interface for a schema-free table store that only serves rows in
/// bounded pages.
///
/// # Pagination contract
///
/// `fetch_next` performs exactly one round trip. The first call for a table
/// passes `None`; every later call must pass the token returned by the call
/// immediately before it. Passing any other token is undefined and left for
/// the store to detect. A returned batch without a token is the last page.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the fetch loop can own them on a
/// background task.
#[async_trait]
pub trait TableStore: Send + Sync {
    /// List the tables available in the store.
    async fn list_tables(&self) -> Result<Vec<TableName>, StoreError>;

    /// Fetch the page that follows `token`.
    ///
    /// # Arguments
    ///
    /// * `table` - The table to read
    /// * `token` - `None` for the first page, otherwise the previous page's token
    /// * `batch_size` - Requested page size; the store may cap it further
    ///
    /// # Returns
    ///
    /// * `Ok(RecordBatch)` - Zero or more rows, plus the token for the next page
    /// * `Err(StoreError)` - Transport, authorization or query failures, unretried
    async fn fetch_next(
        &self,
        table: &TableName,
        token: Option<&ContinuationToken>,
        batch_size: NonZeroUsize,
    ) -> Result<RecordBatch, StoreError>;
}
