//! Decorator assigning the per-file named graph.

use oxrdf::{GraphName, NamedNode, Quad};

use crate::error::RdfError;
use crate::sink::StatementSink;

/// Forces `context` onto statements in the default graph.
///
/// Statements that already name a graph pass through untouched, so every
/// statement leaving this sink carries exactly one graph: its own, or the
/// configured one. Each rewritten statement is a fresh value; nothing is
/// shared with statements still buffered downstream.
#[derive(Debug)]
pub struct FixedContextSink<S> {
    inner: S,
    context: GraphName,
}

impl<S: StatementSink> FixedContextSink<S> {
    pub fn new(inner: S, context: NamedNode) -> Self {
        Self {
            inner,
            context: GraphName::NamedNode(context),
        }
    }

    pub const fn context(&self) -> &GraphName {
        &self.context
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn assign(&self, quad: Quad) -> Quad {
        if quad.graph_name.is_default_graph() {
            Quad {
                graph_name: self.context.clone(),
                ..quad
            }
        } else {
            quad
        }
    }
}

impl<S: StatementSink> StatementSink for FixedContextSink<S> {
    fn start(&mut self) -> Result<(), RdfError> {
        self.inner.start()
    }

    fn handle(&mut self, quad: Quad) -> Result<(), RdfError> {
        let quad = self.assign(quad);
        self.inner.handle(quad)
    }

    fn handle_batch(&mut self, batch: Vec<Quad>) -> Result<(), RdfError> {
        let batch = batch.into_iter().map(|quad| self.assign(quad)).collect();
        self.inner.handle_batch(batch)
    }

    fn end(&mut self) -> Result<(), RdfError> {
        self.inner.end()
    }
}
