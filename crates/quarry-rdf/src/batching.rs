//! Decorator grouping statements into fixed-size flushes.

use oxrdf::Quad;

use crate::error::RdfError;
use crate::sink::StatementSink;

/// Buffers statements and hands them downstream `batch_size` at a time.
///
/// Order is preserved (FIFO). The remainder is flushed on [`end`]; an empty
/// remainder produces no downstream call. [`start`] discards anything left
/// over from a previous, unfinished stream.
///
/// [`start`]: StatementSink::start
/// [`end`]: StatementSink::end
#[derive(Debug)]
pub struct BatchingSink<S> {
    inner: S,
    batch_size: usize,
    buffer: Vec<Quad>,
}

impl<S: StatementSink> BatchingSink<S> {
    /// Wrap `inner`. A `batch_size` of 0 is treated as 1.
    pub fn new(inner: S, batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            inner,
            batch_size,
            buffer: Vec::with_capacity(batch_size),
        }
    }

    pub const fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Statements waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn flush(&mut self) -> Result<(), RdfError> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        self.inner.handle_batch(batch)
    }
}

impl<S: StatementSink> StatementSink for BatchingSink<S> {
    fn start(&mut self) -> Result<(), RdfError> {
        self.buffer.clear();
        self.inner.start()
    }

    fn handle(&mut self, quad: Quad) -> Result<(), RdfError> {
        self.buffer.push(quad);
        if self.buffer.len() >= self.batch_size {
            self.flush()?;
        }
        Ok(())
    }

    fn end(&mut self) -> Result<(), RdfError> {
        self.flush()?;
        self.inner.end()
    }
}
