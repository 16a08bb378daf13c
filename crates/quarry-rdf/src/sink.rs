//! The statement sink seam.

use oxrdf::Quad;

use crate::error::RdfError;

/// Push-style consumer of RDF statements.
///
/// A stream is bracketed by [`start`](Self::start) and [`end`](Self::end).
/// Decorators forward all three calls to the sink they wrap.
pub trait StatementSink {
    /// Begin a stream. Called once before the first statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying output cannot be prepared.
    fn start(&mut self) -> Result<(), RdfError> {
        Ok(())
    }

    /// Consume one statement.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement cannot be written.
    fn handle(&mut self, quad: Quad) -> Result<(), RdfError>;

    /// Consume a group of statements in order.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by [`handle`](Self::handle).
    fn handle_batch(&mut self, batch: Vec<Quad>) -> Result<(), RdfError> {
        for quad in batch {
            self.handle(quad)?;
        }
        Ok(())
    }

    /// End the stream, flushing anything buffered.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered output cannot be written.
    fn end(&mut self) -> Result<(), RdfError> {
        Ok(())
    }
}

impl<S: StatementSink + ?Sized> StatementSink for &mut S {
    fn start(&mut self) -> Result<(), RdfError> {
        (**self).start()
    }

    fn handle(&mut self, quad: Quad) -> Result<(), RdfError> {
        (**self).handle(quad)
    }

    fn handle_batch(&mut self, batch: Vec<Quad>) -> Result<(), RdfError> {
        (**self).handle_batch(batch)
    }

    fn end(&mut self) -> Result<(), RdfError> {
        (**self).end()
    }
}

impl<S: StatementSink + ?Sized> StatementSink for Box<S> {
    fn start(&mut self) -> Result<(), RdfError> {
        (**self).start()
    }

    fn handle(&mut self, quad: Quad) -> Result<(), RdfError> {
        (**self).handle(quad)
    }

    fn handle_batch(&mut self, batch: Vec<Quad>) -> Result<(), RdfError> {
        (**self).handle_batch(batch)
    }

    fn end(&mut self) -> Result<(), RdfError> {
        (**self).end()
    }
}

/// Sink that keeps everything in memory, recording how statements arrived.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub quads: Vec<Quad>,
    /// Size of every `handle_batch` call, in order.
    pub batches: Vec<usize>,
    pub starts: usize,
    pub ends: usize,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl StatementSink for CollectingSink {
    fn start(&mut self) -> Result<(), RdfError> {
        self.starts += 1;
        Ok(())
    }

    fn handle(&mut self, quad: Quad) -> Result<(), RdfError> {
        self.quads.push(quad);
        Ok(())
    }

    fn handle_batch(&mut self, batch: Vec<Quad>) -> Result<(), RdfError> {
        self.batches.push(batch.len());
        self.quads.extend(batch);
        Ok(())
    }

    fn end(&mut self) -> Result<(), RdfError> {
        self.ends += 1;
        Ok(())
    }
}
