//! Sequence blocks: ordered arbitrary-typed records.

use common_error::TesseraResult;

use super::{Block, BlockBuilder};
use crate::types::Value;

/// An ordered list of arbitrary values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceBlock {
    values: Vec<Value>,
}

impl SequenceBlock {
    /// Create a block from values, preserving their order.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Create a builder for a sequence block.
    pub fn builder() -> SequenceBlockBuilder {
        SequenceBlockBuilder::new()
    }

    /// The records of the block.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consume the block, yielding its records.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the block is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Approximate in-memory footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.values.iter().map(Value::estimated_size).sum()
    }
}

/// Builder for [`SequenceBlock`].
#[derive(Debug, Default)]
pub struct SequenceBlockBuilder {
    values: Vec<Value>,
}

impl SequenceBlockBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with room for `capacity` records.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }
}

impl BlockBuilder for SequenceBlockBuilder {
    type Record = Value;

    fn add(&mut self, record: Value) -> TesseraResult<()> {
        self.values.push(record);
        Ok(())
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn build(self) -> TesseraResult<Block> {
        Ok(Block::Sequence(SequenceBlock::new(self.values)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_order() {
        let mut builder = SequenceBlock::builder();
        builder
            .extend(vec![Value::from("b"), Value::from("a"), Value::Int64(3)])
            .unwrap();
        assert_eq!(builder.len(), 3);

        let block = builder.build().unwrap();
        let values = block.as_sequence().unwrap().values();
        assert_eq!(
            values,
            &[Value::from("b"), Value::from("a"), Value::Int64(3)]
        );
    }

    #[test]
    fn test_empty_builder() {
        let builder = SequenceBlockBuilder::with_capacity(4);
        assert!(builder.is_empty());

        let block = builder.build().unwrap();
        assert!(block.is_empty());
        assert_eq!(block.size_bytes(), 0);
    }
}
