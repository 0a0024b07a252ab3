use super::Row;

use std::{
    collections::VecDeque,
    fmt,
    pin::Pin,
    task::{Context, Poll},
};
use tokio_stream::{Stream, StreamExt};

/// Rows produced by one execution of a compiled statement.
///
/// A driver may hand rows back fully buffered or as a lazy stream; the
/// executor pulls them one at a time so it can observe cancellation between
/// rows.
#[derive(Default)]
pub struct RowStream {
    buffer: VecDeque<Row>,
    stream: Option<DynStream>,
}

#[derive(Debug)]
struct Iter<I> {
    iter: I,
}

type DynStream = Pin<Box<dyn Stream<Item = crate::Result<Row>> + Send + 'static>>;

impl RowStream {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_stream<T: Stream<Item = crate::Result<Row>> + Send + 'static>(stream: T) -> Self {
        Self {
            buffer: VecDeque::new(),
            stream: Some(Box::pin(stream)),
        }
    }

    pub fn from_vec(rows: Vec<Row>) -> Self {
        Self {
            buffer: rows.into(),
            stream: None,
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: Iterator<Item = crate::Result<Row>> + Send + 'static,
    {
        Self::from_stream(Iter { iter })
    }

    /// Returns the next row in the stream
    pub async fn next(&mut self) -> Option<crate::Result<Row>> {
        StreamExt::next(self).await
    }

    /// The stream will contain at least this number of rows
    pub fn min_len(&self) -> usize {
        let (ret, _) = self.size_hint();
        ret
    }

    pub async fn collect(mut self) -> crate::Result<Vec<Row>> {
        let mut ret = Vec::with_capacity(self.min_len());

        while let Some(res) = self.next().await {
            ret.push(res?);
        }

        Ok(ret)
    }
}

impl Stream for RowStream {
    type Item = crate::Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(next) = self.buffer.pop_front() {
            Poll::Ready(Some(Ok(next)))
        } else if let Some(stream) = self.stream.as_mut() {
            Pin::new(stream).poll_next(cx)
        } else {
            Poll::Ready(None)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (mut low, mut high) = match &self.stream {
            Some(stream) => stream.size_hint(),
            None => (0, Some(0)),
        };

        let buffered = self.buffer.len();
        low += buffered;

        if let Some(high) = high.as_mut() {
            *high += buffered;
        }

        (low, high)
    }
}

impl From<Vec<Row>> for RowStream {
    fn from(rows: Vec<Row>) -> Self {
        Self::from_vec(rows)
    }
}

impl<I> Unpin for Iter<I> {}

impl<I> Stream for Iter<I>
where
    I: Iterator<Item = crate::Result<Row>>,
{
    type Item = crate::Result<Row>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.iter.next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream")
            .field("buffered", &self.buffer.len())
            .field("streaming", &self.stream.is_some())
            .finish()
    }
}
