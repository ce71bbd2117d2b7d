//! Background fetch loop for one table.
//!
//! Pages through a table strictly sequentially: a page is requested only
//! after the previous page's token is known, and every page is handed to the
//! consumer in the order the store returned it.

use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::consumer::messages::{FetchMessage, FetchOutcome, FetchState};
use table_liberation_repository::TableStore;
use table_liberation_shared::{ContinuationToken, TableName};

/// Fetch loop that publishes the pages of a single table.
pub struct TableFetcher {
    store: Arc<dyn TableStore>,
    table: TableName,
    batch_size: NonZeroUsize,
    cancel: CancellationToken,
    state: watch::Sender<FetchState>,
}

impl TableFetcher {
    /// Create a new fetcher.
    ///
    /// # Arguments
    ///
    /// * `store` - The table store to page through
    /// * `table` - The table to fetch
    /// * `batch_size` - Page size requested on every call
    /// * `cancel` - Token checked before every round trip
    pub fn new(
        store: Arc<dyn TableStore>,
        table: TableName,
        batch_size: NonZeroUsize,
        cancel: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(FetchState::Idle);
        Self {
            store,
            table,
            batch_size,
            cancel,
            state,
        }
    }

    /// Watch the state of the fetch loop.
    pub fn subscribe_state(&self) -> watch::Receiver<FetchState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> FetchState {
        *self.state.borrow()
    }

    fn set_state(&self, state: FetchState) {
        self.state.send_replace(state);
    }

    /// Page through the table and publish every page through `sender`.
    ///
    /// Ends with exactly one terminal message: `End` after the last page,
    /// `Cancelled` when cancellation was observed before a round trip, or
    /// `Error` when the store failed. If the receiver is dropped the loop
    /// stops without a terminal message.
    ///
    /// # Arguments
    ///
    /// * `sender` - Channel to publish pages to
    ///
    /// # Returns
    ///
    /// How the loop ended and how many pages it published
    #[instrument(
        skip(self, sender),
        fields(table = %self.table, batch_size = self.batch_size.get())
    )]
    pub async fn run(self, sender: mpsc::Sender<FetchMessage>) -> FetchOutcome {
        let mut token: Option<ContinuationToken> = None;
        let mut batches = 0usize;

        info!("Starting table fetch");

        loop {
            if self.cancel.is_cancelled() {
                info!(batches = batches, "Table fetch cancelled");
                self.set_state(FetchState::Cancelled);
                let _ = sender.send(FetchMessage::Cancelled).await;
                return FetchOutcome::Cancelled { batches };
            }

            self.set_state(FetchState::Fetching);
            let batch = match self
                .store
                .fetch_next(&self.table, token.as_ref(), self.batch_size)
                .await
            {
                Ok(batch) => batch,
                Err(e) => {
                    error!(error = %e, batches = batches, "Failed to fetch page");
                    self.set_state(FetchState::Failed);
                    let _ = sender.send(FetchMessage::Error(e.clone())).await;
                    return FetchOutcome::Failed { batches, error: e };
                }
            };

            let next_token = batch.next_token().cloned();
            debug!(
                records = batch.len(),
                last = next_token.is_none(),
                "Fetched page"
            );

            self.set_state(FetchState::Publishing);
            if sender.send(FetchMessage::Batch(batch)).await.is_err() {
                warn!(batches = batches, "Record stream closed, stopping fetch");
                self.set_state(FetchState::Cancelled);
                return FetchOutcome::Cancelled { batches };
            }
            batches += 1;

            match next_token {
                Some(next) => token = Some(next),
                None => {
                    info!(batches = batches, "Table fetch completed");
                    self.set_state(FetchState::Completed);
                    let _ = sender.send(FetchMessage::End).await;
                    return FetchOutcome::Completed { batches };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use table_liberation_repository::{InMemoryTableStore, StoreError};
    use table_liberation_shared::TableRecord;

    fn records(count: usize) -> Vec<TableRecord> {
        let ts = DateTime::parse_from_rfc3339("2014-03-01T10:00:00+00:00").unwrap();
        (0..count)
            .map(|i| TableRecord::new("P", format!("{:03}", i), ts, "etag"))
            .collect()
    }

    fn fetcher(
        store: Arc<InMemoryTableStore>,
        batch: usize,
        cancel: CancellationToken,
    ) -> TableFetcher {
        TableFetcher::new(
            store,
            TableName::from("Orders"),
            NonZeroUsize::new(batch).unwrap(),
            cancel,
        )
    }

    async fn collect(mut rx: mpsc::Receiver<FetchMessage>) -> Vec<FetchMessage> {
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }
        messages
    }

    #[tokio::test]
    async fn test_publishes_pages_then_end() {
        let store = Arc::new(InMemoryTableStore::new().with_table("Orders", records(5)));
        let fetcher = fetcher(store.clone(), 2, CancellationToken::new());
        let state = fetcher.subscribe_state();
        let (tx, rx) = mpsc::channel(16);

        let outcome = fetcher.run(tx).await;
        assert_eq!(outcome, FetchOutcome::Completed { batches: 3 });
        assert_eq!(*state.borrow(), FetchState::Completed);

        let messages = collect(rx).await;
        assert_eq!(messages.len(), 4);
        assert!(matches!(&messages[0], FetchMessage::Batch(b) if b.len() == 2));
        assert!(matches!(&messages[2], FetchMessage::Batch(b) if b.is_last()));
        assert!(matches!(messages[3], FetchMessage::End));
        assert_eq!(store.call_count().await, 3);
    }

    #[tokio::test]
    async fn test_failure_keeps_earlier_pages() {
        let store = Arc::new(
            InMemoryTableStore::new()
                .with_table("Orders", records(5))
                .fail_on_call(2, StoreError::connection("reset by peer")),
        );
        let (tx, rx) = mpsc::channel(16);
        let fetcher = fetcher(store.clone(), 2, CancellationToken::new());
        let state = fetcher.subscribe_state();

        let outcome = fetcher.run(tx).await;
        assert_eq!(*state.borrow(), FetchState::Failed);
        assert_eq!(
            outcome,
            FetchOutcome::Failed {
                batches: 1,
                error: StoreError::connection("reset by peer"),
            }
        );

        let messages = collect(rx).await;
        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0], FetchMessage::Batch(_)));
        assert!(matches!(messages[1], FetchMessage::Error(_)));
        assert_eq!(store.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_makes_no_calls() {
        let store = Arc::new(InMemoryTableStore::new().with_table("Orders", records(3)));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let (tx, rx) = mpsc::channel(16);
        let fetcher = fetcher(store.clone(), 1, cancel);
        let state = fetcher.subscribe_state();
        assert_eq!(*state.borrow(), FetchState::Idle);

        let outcome = fetcher.run(tx).await;
        assert_eq!(outcome, FetchOutcome::Cancelled { batches: 0 });
        assert_eq!(*state.borrow(), FetchState::Cancelled);
        assert!(state.borrow().is_terminal());

        let messages = collect(rx).await;
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0], FetchMessage::Cancelled));
        assert_eq!(store.call_count().await, 0);
    }

    #[tokio::test]
    async fn test_full_buffer_suspends_producer() {
        let store = Arc::new(InMemoryTableStore::new().with_table("Orders", records(20)));
        let fetcher = fetcher(store.clone(), 1, CancellationToken::new());
        let state = fetcher.subscribe_state();
        let (tx, mut rx) = mpsc::channel(2);
        let handle = tokio::spawn(fetcher.run(tx));

        for _ in 0..50 {
            tokio::task::yield_now().await;
        }
        // Two pages buffered plus one waiting to be sent.
        assert_eq!(store.call_count().await, 3);
        assert_eq!(*state.borrow(), FetchState::Publishing);

        let mut batches = 0;
        while let Some(msg) = rx.recv().await {
            if matches!(msg, FetchMessage::Batch(_)) {
                batches += 1;
            }
        }
        assert_eq!(batches, 20);
        assert_eq!(handle.await.unwrap(), FetchOutcome::Completed { batches: 20 });
        assert_eq!(store.call_count().await, 20);
    }

    #[tokio::test]
    async fn test_stops_when_receiver_dropped() {
        let store = Arc::new(InMemoryTableStore::new().with_table("Orders", records(3)));
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let outcome = fetcher(store.clone(), 1, CancellationToken::new()).run(tx).await;
        assert_eq!(outcome, FetchOutcome::Cancelled { batches: 0 });
        assert_eq!(store.call_count().await, 1);
    }

    #[tokio::test]
    async fn test_each_call_carries_previous_token() {
        let store = Arc::new(
            InMemoryTableStore::new()
                .with_table("Orders", records(3))
                .with_leading_empty_pages(1),
        );
        let (tx, rx) = mpsc::channel(16);

        fetcher(store.clone(), 2, CancellationToken::new()).run(tx).await;
        let messages = collect(rx).await;
        // One empty page, two row pages, then End.
        assert_eq!(messages.len(), 4);

        let calls = store.calls().await;
        assert_eq!(calls[0].token, None);
        assert_eq!(calls[1].token, Some(ContinuationToken::new("1:0")));
        assert_eq!(calls[2].token, Some(ContinuationToken::new("1:2")));
    }
}
