//! Flattens published pages into a stream of individual records.

use futures::Stream;
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::consumer::messages::FetchMessage;
use crate::errors::PipelineError;
use table_liberation_shared::TableRecord;

/// Stream of records in store order, fed by a [`TableFetcher`](super::TableFetcher).
///
/// Records of a page are yielded before anything from the next page is
/// looked at. A store failure is yielded once, as the last item. Once
/// cancellation is requested the stream finishes the page it is on and ends
/// without taking further pages off the channel.
pub struct RecordStream {
    receiver: mpsc::Receiver<FetchMessage>,
    pending: std::vec::IntoIter<TableRecord>,
    cancel: CancellationToken,
    batches: usize,
    finished: bool,
}

impl RecordStream {
    pub fn new(receiver: mpsc::Receiver<FetchMessage>, cancel: CancellationToken) -> Self {
        Self {
            receiver,
            pending: Vec::new().into_iter(),
            cancel,
            batches: 0,
            finished: false,
        }
    }

    /// Pages received so far, empty ones included.
    pub fn batches_received(&self) -> usize {
        self.batches
    }

    fn finish(&mut self) {
        self.finished = true;
        self.receiver.close();
    }
}

impl Stream for RecordStream {
    type Item = Result<TableRecord, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(record) = this.pending.next() {
                return Poll::Ready(Some(Ok(record)));
            }
            if this.finished {
                return Poll::Ready(None);
            }
            if this.cancel.is_cancelled() {
                this.finish();
                return Poll::Ready(None);
            }

            match ready!(this.receiver.poll_recv(cx)) {
                Some(FetchMessage::Batch(batch)) => {
                    this.batches += 1;
                    this.pending = batch.into_iter();
                }
                Some(FetchMessage::End) | Some(FetchMessage::Cancelled) => {
                    this.finish();
                    return Poll::Ready(None);
                }
                Some(FetchMessage::Error(e)) => {
                    this.finish();
                    return Poll::Ready(Some(Err(e.into())));
                }
                None => {
                    this.finish();
                    return Poll::Ready(Some(Err(PipelineError::channel(
                        "Fetch loop stopped without a terminal message",
                    ))));
                }
            }
        }
    }
}
