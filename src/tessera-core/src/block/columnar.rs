//! Columnar blocks: named typed Arrow columns.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, BinaryArray, BooleanArray, Float64Array, Int64Array, NullArray,
    StringArray,
};
use arrow::compute::concat_batches;
use arrow::datatypes::{
    DataType, Field, Float32Type, Float64Type, Int32Type, Int64Type, Schema, SchemaRef,
};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};

use common_error::{TesseraError, TesseraResult};

use super::{Block, BlockBuilder};
use crate::types::{Row, Value};

// ============================================================================
// ColumnarBlock
// ============================================================================

/// A block of named, typed columns backed by one Arrow `RecordBatch`.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarBlock {
    batch: RecordBatch,
}

impl ColumnarBlock {
    /// Wrap a record batch.
    pub fn new(batch: RecordBatch) -> Self {
        Self { batch }
    }

    /// Create a row-at-a-time builder.
    pub fn builder() -> ColumnarBlockBuilder {
        ColumnarBlockBuilder::new()
    }

    /// Build a block from already-parsed tables, concatenated in the order
    /// given. Rows are never reordered.
    pub fn concat(tables: Vec<RecordBatch>) -> TesseraResult<Self> {
        let Some(first) = tables.first() else {
            return Err(TesseraError::value_error(
                "cannot build a columnar block from zero tables",
            ));
        };
        if tables.len() == 1 {
            return Ok(Self::new(first.clone()));
        }
        let schema = first.schema();
        let batch = concat_batches(&schema, &tables)?;
        Ok(Self::new(batch))
    }

    /// The underlying record batch.
    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    /// Consume the block, yielding the record batch.
    pub fn into_batch(self) -> RecordBatch {
        self.batch
    }

    /// The block schema.
    pub fn schema(&self) -> SchemaRef {
        self.batch.schema()
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    /// Number of rows.
    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Number of columns.
    pub fn num_columns(&self) -> usize {
        self.batch.num_columns()
    }

    /// Memory held by the column buffers.
    pub fn size_bytes(&self) -> usize {
        self.batch.get_array_memory_size()
    }

    /// Read one row back as a [`Row`].
    pub fn row(&self, index: usize) -> TesseraResult<Row> {
        if index >= self.num_rows() {
            return Err(TesseraError::value_error(format!(
                "row {index} out of bounds for block of {} rows",
                self.num_rows()
            )));
        }
        let schema = self.batch.schema();
        let mut row = Row::new();
        for (field, column) in schema.fields().iter().zip(self.batch.columns()) {
            row.push(field.name().clone(), value_at(column, index)?);
        }
        Ok(row)
    }

    /// Read every row back as [`Row`]s, in order.
    pub fn rows(&self) -> TesseraResult<Vec<Row>> {
        (0..self.num_rows()).map(|i| self.row(i)).collect()
    }
}

/// Convert one array element to a [`Value`].
fn value_at(array: &ArrayRef, index: usize) -> TesseraResult<Value> {
    if array.is_null(index) {
        return Ok(Value::Null);
    }
    let value = match array.data_type() {
        DataType::Null => Value::Null,
        DataType::Boolean => Value::Bool(array.as_boolean().value(index)),
        DataType::Int32 => Value::Int64(i64::from(array.as_primitive::<Int32Type>().value(index))),
        DataType::Int64 => Value::Int64(array.as_primitive::<Int64Type>().value(index)),
        DataType::Float32 => {
            Value::Float64(f64::from(array.as_primitive::<Float32Type>().value(index)))
        }
        DataType::Float64 => Value::Float64(array.as_primitive::<Float64Type>().value(index)),
        DataType::Utf8 => Value::String(array.as_string::<i32>().value(index).to_string()),
        DataType::LargeUtf8 => Value::String(array.as_string::<i64>().value(index).to_string()),
        DataType::Binary => Value::Binary(array.as_binary::<i32>().value(index).to_vec()),
        DataType::LargeBinary => Value::Binary(array.as_binary::<i64>().value(index).to_vec()),
        other => {
            return Err(TesseraError::type_error(format!(
                "cannot convert Arrow type {other} to a value"
            )));
        }
    };
    Ok(value)
}

// ============================================================================
// ColumnarBlockBuilder
// ============================================================================

/// Row-at-a-time builder for [`ColumnarBlock`].
///
/// The first row fixes the column names; later rows must carry the same
/// names in the same order. Column types are inferred at build time.
#[derive(Debug, Default)]
pub struct ColumnarBlockBuilder {
    names: Vec<String>,
    /// Column-major values.
    columns: Vec<Vec<Value>>,
    num_rows: usize,
}

impl ColumnarBlockBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Column names fixed by the first row.
    pub fn column_names(&self) -> &[String] {
        &self.names
    }
}

impl BlockBuilder for ColumnarBlockBuilder {
    type Record = Row;

    fn add(&mut self, record: Row) -> TesseraResult<()> {
        if self.num_rows == 0 {
            self.names = record.names().map(String::from).collect();
            self.columns = vec![Vec::new(); self.names.len()];
        } else if !record.names().eq(self.names.iter().map(String::as_str)) {
            return Err(TesseraError::schema_error(format!(
                "row {} has columns [{}], expected [{}]",
                self.num_rows,
                record.names().collect::<Vec<_>>().join(", "),
                self.names.join(", ")
            )));
        }

        for (column, value) in self.columns.iter_mut().zip(record.into_values()) {
            column.push(value);
        }
        self.num_rows += 1;
        Ok(())
    }

    fn len(&self) -> usize {
        self.num_rows
    }

    fn build(self) -> TesseraResult<Block> {
        if self.names.is_empty() {
            let options = RecordBatchOptions::new().with_row_count(Some(self.num_rows));
            let batch =
                RecordBatch::try_new_with_options(Arc::new(Schema::empty()), vec![], &options)?;
            return Ok(Block::Columnar(ColumnarBlock::new(batch)));
        }

        let mut fields = Vec::with_capacity(self.names.len());
        let mut arrays = Vec::with_capacity(self.names.len());
        for (name, values) in self.names.into_iter().zip(self.columns) {
            let data_type = infer_type(&name, &values)?;
            arrays.push(build_array(&data_type, values));
            fields.push(Field::new(name, data_type, true));
        }

        let batch = RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
            .map_err(|e| TesseraError::internal(format!("Failed to build columnar block: {e}")))?;
        Ok(Block::Columnar(ColumnarBlock::new(batch)))
    }
}

/// Infer one Arrow type for a column. Int64 widens to Float64.
fn infer_type(name: &str, values: &[Value]) -> TesseraResult<DataType> {
    let mut inferred = DataType::Null;
    for value in values {
        let data_type = match value {
            Value::Null => continue,
            Value::Bool(_) => DataType::Boolean,
            Value::Int64(_) => DataType::Int64,
            Value::Float64(_) => DataType::Float64,
            Value::String(_) => DataType::Utf8,
            Value::Binary(_) => DataType::Binary,
            Value::Array(_) | Value::Map(_) => {
                return Err(TesseraError::type_error(format!(
                    "column '{name}' holds a nested {} value, which columnar blocks do not support",
                    value.type_name()
                )));
            }
        };
        inferred = match (&inferred, &data_type) {
            (DataType::Null, _) => data_type,
            (a, b) if a == b => inferred,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            (a, b) => {
                return Err(TesseraError::type_error(format!(
                    "column '{name}' mixes {a} and {b} values"
                )));
            }
        };
    }
    Ok(inferred)
}

/// Build an array of an inferred type. Values are known to match it.
fn build_array(data_type: &DataType, values: Vec<Value>) -> ArrayRef {
    match data_type {
        DataType::Boolean => Arc::new(BooleanArray::from(
            values.iter().map(Value::as_bool).collect::<Vec<_>>(),
        )),
        DataType::Int64 => Arc::new(Int64Array::from(
            values.iter().map(Value::as_int64).collect::<Vec<_>>(),
        )),
        DataType::Float64 => Arc::new(Float64Array::from(
            values.iter().map(Value::as_float64).collect::<Vec<_>>(),
        )),
        DataType::Utf8 => Arc::new(StringArray::from(
            values.iter().map(Value::as_str).collect::<Vec<_>>(),
        )),
        DataType::Binary => Arc::new(BinaryArray::from(
            values.iter().map(Value::as_binary).collect::<Vec<_>>(),
        )),
        _ => Arc::new(NullArray::new(values.len())),
    }
}
