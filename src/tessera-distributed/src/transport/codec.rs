//! Byte encoding of blocks.
//!
//! Layout: one tag byte followed by the payload.
//! - `0`: sequence block, payload is a JSON array of values.
//! - `1`: columnar block, payload is an Arrow IPC stream.
//!
//! Floats in sequence blocks are written in shortest round-trip form and
//! parsed exactly, so decoding returns the same bits that were encoded.

use std::io::Cursor;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use arrow_ipc::reader::StreamReader;
use arrow_ipc::writer::StreamWriter;
use bytes::Bytes;

use common_error::{TesseraError, TesseraResult};
use tessera_core::{Block, ColumnarBlock, SequenceBlock, Value};

const SEQUENCE_TAG: u8 = 0;
const COLUMNAR_TAG: u8 = 1;

/// Encodes blocks to bytes and back.
pub struct BlockCodec;

impl BlockCodec {
    /// Encode a block.
    pub fn encode(block: &Block) -> TesseraResult<Bytes> {
        let mut buffer = Vec::new();
        match block {
            Block::Sequence(block) => {
                buffer.push(SEQUENCE_TAG);
                serde_json::to_writer(&mut buffer, block.values())?;
            }
            Block::Columnar(block) => {
                buffer.push(COLUMNAR_TAG);
                write_table(&mut buffer, block.batch())?;
            }
        }
        Ok(Bytes::from(buffer))
    }

    /// Decode a block produced by [`encode`](Self::encode).
    pub fn decode(data: &[u8]) -> TesseraResult<Block> {
        let Some((tag, payload)) = data.split_first() else {
            return Err(TesseraError::internal("cannot decode an empty block buffer"));
        };

        match *tag {
            SEQUENCE_TAG => {
                let values: Vec<Value> = serde_json::from_slice(payload)?;
                Ok(Block::Sequence(SequenceBlock::new(values)))
            }
            COLUMNAR_TAG => Ok(Block::Columnar(ColumnarBlock::new(read_table(payload)?))),
            other => Err(TesseraError::internal(format!(
                "unknown block encoding tag {other}"
            ))),
        }
    }
}

fn write_table(buffer: &mut Vec<u8>, table: &RecordBatch) -> TesseraResult<()> {
    let mut writer = StreamWriter::try_new(buffer, &table.schema())
        .map_err(|e| TesseraError::internal(format!("failed to start block stream: {e}")))?;
    writer
        .write(table)
        .map_err(|e| TesseraError::internal(format!("failed to write block table: {e}")))?;
    writer
        .finish()
        .map_err(|e| TesseraError::internal(format!("failed to finish block stream: {e}")))
}

/// Read a columnar payload back into one table. A stream with several
/// batches is concatenated; a stream with none yields an empty table.
fn read_table(payload: &[u8]) -> TesseraResult<RecordBatch> {
    let reader = StreamReader::try_new(Cursor::new(payload), None)
        .map_err(|e| TesseraError::internal(format!("corrupt columnar block: {e}")))?;
    let schema = reader.schema();
    let mut batches = reader
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| TesseraError::internal(format!("corrupt columnar block: {e}")))?;

    match batches.len() {
        0 => Ok(RecordBatch::new_empty(schema)),
        1 => Ok(batches.remove(0)),
        _ => Ok(concat_batches(&schema, &batches)?),
    }
}
