//! The shared block-construction capability.

use common_error::TesseraResult;

use super::Block;

/// Accumulates records and finalizes them into an immutable [`Block`].
///
/// `build` consumes the builder, so a builder cannot be added to once it
/// has produced its block.
pub trait BlockBuilder {
    /// The record type accepted by [`add`](Self::add).
    type Record;

    /// Append one record.
    fn add(&mut self, record: Self::Record) -> TesseraResult<()>;

    /// Number of records accumulated so far.
    fn len(&self) -> usize;

    /// Whether no records have been added.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append every record of an iterator, stopping at the first failure.
    fn extend<I>(&mut self, records: I) -> TesseraResult<()>
    where
        I: IntoIterator<Item = Self::Record>,
        Self: Sized,
    {
        for record in records {
            self.add(record)?;
        }
        Ok(())
    }

    /// Finalize the accumulated records.
    fn build(self) -> TesseraResult<Block>;
}
