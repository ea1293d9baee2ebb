//! Projection emitter boundary
//!
//! The dashboard hands every recomputed projection to an emitter. Drawing is
//! the emitter's business; the dashboard only guarantees the payload shape.

use std::io::Write;
use tracing::warn;

use crate::chart::Projection;

/// Receives projections as charts are recomputed
pub trait ProjectionEmitter {
    fn emit(&mut self, projection: &Projection);
}

/// Discards every projection
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEmitter;

impl ProjectionEmitter for NullEmitter {
    fn emit(&mut self, _projection: &Projection) {}
}

/// Collects projections in emission order
impl ProjectionEmitter for Vec<Projection> {
    fn emit(&mut self, projection: &Projection) {
        self.push(projection.clone());
    }
}

/// Writes one JSON document per projection, one per line
pub struct JsonLinesEmitter<W: Write> {
    writer: W,
    failures: usize,
}

impl<W: Write> JsonLinesEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, failures: 0 }
    }

    /// Number of projections that could not be written
    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, projection: &Projection) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, projection)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<W: Write> ProjectionEmitter for JsonLinesEmitter<W> {
    fn emit(&mut self, projection: &Projection) {
        if let Err(e) = self.write_line(projection) {
            self.failures += 1;
            warn!(chart = %projection.chart, "Failed to write projection: {}", e);
        }
    }
}
