//! In-memory paged table store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::StoreError;
use crate::interfaces::TableStore;
use table_liberation_shared::{ContinuationToken, RecordBatch, TableName, TableRecord};

/// A single `fetch_next` call as received by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCall {
    pub table: TableName,
    pub token: Option<ContinuationToken>,
    pub batch_size: usize,
}

/// Table store serving rows held in memory, in insertion order.
///
/// Tokens encode the resume position as `<empty pages served>:<row offset>`,
/// so a page is a pure function of the token and the requested size. Every
/// call is recorded, which lets tests assert that calls were sequential and
/// that each one carried the previous page's token.
#[derive(Debug, Default)]
pub struct InMemoryTableStore {
    tables: Vec<(TableName, Vec<TableRecord>)>,
    max_page_size: Option<usize>,
    leading_empty_pages: usize,
    failures: Mutex<HashMap<usize, StoreError>>,
    calls: Mutex<Vec<FetchCall>>,
}

impl InMemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table with the given rows.
    pub fn with_table(mut self, name: impl Into<TableName>, records: Vec<TableRecord>) -> Self {
        self.tables.push((name.into(), records));
        self
    }

    /// Cap page sizes the way a real store caps oversized requests.
    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = Some(max_page_size.max(1));
        self
    }

    /// Answer the first `pages` calls for each table with an empty page that
    /// still carries a token.
    pub fn with_leading_empty_pages(mut self, pages: usize) -> Self {
        self.leading_empty_pages = pages;
        self
    }

    /// Fail the `call`-th `fetch_next` call (1-based, counted across tables).
    pub fn fail_on_call(mut self, call: usize, error: StoreError) -> Self {
        self.failures.get_mut().insert(call, error);
        self
    }

    /// Every `fetch_next` call received so far, in order.
    pub async fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    fn rows(&self, table: &TableName) -> Result<&[TableRecord], StoreError> {
        self.tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, rows)| rows.as_slice())
            .ok_or_else(|| StoreError::table_not_found(table.as_str()))
    }

    fn encode_token(empty_pages: usize, offset: usize) -> ContinuationToken {
        ContinuationToken::new(format!("{}:{}", empty_pages, offset))
    }

    fn decode_token(token: &ContinuationToken) -> Result<(usize, usize), StoreError> {
        let invalid = || StoreError::query(format!("Invalid continuation token: {}", token));
        let (empty_pages, offset) = token.as_str().split_once(':').ok_or_else(invalid)?;
        let empty_pages = empty_pages.parse().map_err(|_| invalid())?;
        let offset = offset.parse().map_err(|_| invalid())?;
        Ok((empty_pages, offset))
    }
}

#[async_trait]
impl TableStore for InMemoryTableStore {
    async fn list_tables(&self) -> Result<Vec<TableName>, StoreError> {
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn fetch_next(
        &self,
        table: &TableName,
        token: Option<&ContinuationToken>,
        batch_size: NonZeroUsize,
    ) -> Result<RecordBatch, StoreError> {
        let call_number = {
            let mut calls = self.calls.lock().await;
            calls.push(FetchCall {
                table: table.clone(),
                token: token.cloned(),
                batch_size: batch_size.get(),
            });
            calls.len()
        };

        if let Some(error) = self.failures.lock().await.remove(&call_number) {
            return Err(error);
        }

        let rows = self.rows(table)?;
        let (empty_pages, offset) = match token {
            Some(token) => Self::decode_token(token)?,
            None => (0, 0),
        };

        if empty_pages < self.leading_empty_pages {
            debug!(table = %table, call = call_number, "Serving empty page");
            return Ok(RecordBatch::new(
                Vec::new(),
                Some(Self::encode_token(empty_pages + 1, offset)),
            ));
        }

        if offset > rows.len() {
            return Err(StoreError::query(format!(
                "Continuation token points past the end of {}",
                table
            )));
        }

        let page_size = self
            .max_page_size
            .map_or(batch_size.get(), |max| max.min(batch_size.get()));
        let end = offset.saturating_add(page_size).min(rows.len());
        let next_token = (end < rows.len()).then(|| Self::encode_token(empty_pages, end));

        debug!(
            table = %table,
            call = call_number,
            rows = end - offset,
            last = next_token.is_none(),
            "Serving page"
        );

        Ok(RecordBatch::new(rows[offset..end].to_vec(), next_token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn records(count: usize) -> Vec<TableRecord> {
        let ts = DateTime::parse_from_rfc3339("2014-03-01T10:00:00+00:00").unwrap();
        (0..count)
            .map(|i| TableRecord::new("P", format!("{:03}", i), ts, format!("etag-{}", i)))
            .collect()
    }

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    async fn drain(
        store: &InMemoryTableStore,
        table: &TableName,
        batch: usize,
    ) -> Vec<RecordBatch> {
        let mut pages = Vec::new();
        let mut token: Option<ContinuationToken> = None;
        loop {
            let page = store.fetch_next(table, token.as_ref(), size(batch)).await.unwrap();
            token = page.next_token().cloned();
            pages.push(page);
            if token.is_none() {
                return pages;
            }
        }
    }

    #[tokio::test]
    async fn test_pages_cover_table_in_order() {
        let table = TableName::from("Orders");
        let store = InMemoryTableStore::new().with_table(table.clone(), records(5));

        let pages = drain(&store, &table, 2).await;
        let sizes: Vec<usize> = pages.iter().map(RecordBatch::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);

        let keys: Vec<String> = pages
            .into_iter()
            .flatten()
            .map(|r| r.row_key().to_string())
            .collect();
        assert_eq!(keys, vec!["000", "001", "002", "003", "004"]);
    }

    #[tokio::test]
    async fn test_calls_chain_tokens() {
        let table = TableName::from("Orders");
        let store = InMemoryTableStore::new().with_table(table.clone(), records(2));

        drain(&store, &table, 1).await;

        let calls = store.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].token, None);
        assert_eq!(calls[1].token, Some(ContinuationToken::new("0:1")));
    }

    #[tokio::test]
    async fn test_max_page_size_caps_request() {
        let table = TableName::from("Orders");
        let store = InMemoryTableStore::new()
            .with_table(table.clone(), records(3))
            .with_max_page_size(1);

        let pages = drain(&store, &table, 100).await;
        assert_eq!(pages.len(), 3);
    }

    #[tokio::test]
    async fn test_huge_batch_size_after_first_page() {
        let table = TableName::from("Orders");
        let store = InMemoryTableStore::new().with_table(table.clone(), records(3));

        let first = store.fetch_next(&table, None, size(1)).await.unwrap();
        let rest = store
            .fetch_next(&table, first.next_token(), NonZeroUsize::MAX)
            .await
            .unwrap();
        assert_eq!(rest.len(), 2);
        assert!(rest.is_last());
    }

    #[tokio::test]
    async fn test_leading_empty_pages_carry_token() {
        let table = TableName::from("Orders");
        let store = InMemoryTableStore::new()
            .with_table(table.clone(), records(1))
            .with_leading_empty_pages(2);

        let pages = drain(&store, &table, 10).await;
        assert_eq!(pages.len(), 3);
        assert!(pages[0].is_empty() && !pages[0].is_last());
        assert!(pages[1].is_empty() && !pages[1].is_last());
        assert_eq!(pages[2].len(), 1);
    }

    #[tokio::test]
    async fn test_empty_table_is_single_last_page() {
        let table = TableName::from("Empty");
        let store = InMemoryTableStore::new().with_table(table.clone(), Vec::new());

        let pages = drain(&store, &table, 10).await;
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_empty() && pages[0].is_last());
    }

    #[tokio::test]
    async fn test_injected_failure() {
        let table = TableName::from("Orders");
        let store = InMemoryTableStore::new()
            .with_table(table.clone(), records(3))
            .fail_on_call(2, StoreError::connection("reset by peer"));

        let first = store.fetch_next(&table, None, size(1)).await.unwrap();
        let second = store.fetch_next(&table, first.next_token(), size(1)).await;
        assert_eq!(second, Err(StoreError::connection("reset by peer")));
    }

    #[tokio::test]
    async fn test_unknown_table_and_bad_token() {
        let store = InMemoryTableStore::new().with_table("Orders", records(1));

        let missing = store.fetch_next(&TableName::from("Nope"), None, size(1)).await;
        assert!(matches!(missing, Err(StoreError::TableNotFound(_))));

        let bogus = ContinuationToken::new("not-a-token");
        let bad = store
            .fetch_next(&TableName::from("Orders"), Some(&bogus), size(1))
            .await;
        assert!(matches!(bad, Err(StoreError::QueryError(_))));
    }

    #[tokio::test]
    async fn test_list_tables_in_insertion_order() {
        let store = InMemoryTableStore::new()
            .with_table("Orders", Vec::new())
            .with_table("Customers", Vec::new());

        let tables = store.list_tables().await.unwrap();
        assert_eq!(tables, vec![TableName::from("Orders"), TableName::from("Customers")]);
    }
}
