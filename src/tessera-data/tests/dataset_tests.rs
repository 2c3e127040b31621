//! Integration tests for dataset construction.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{Int64Array, RecordBatch, StringArray};
use arrow_ipc::writer::FileWriter;
use arrow_schema::{DataType, Field, Schema};

use tokio::runtime::Handle;

use common_config::TesseraConfig;
use common_error::TesseraError;
use tessera_core::{BlockKind, Value};
use tessera_data::{ColumnarReadOptions, DataContext, FileReadOptions};
use tessera_distributed::LocalRuntime;
use tessera_io::FileSystem;

fn context() -> DataContext {
    DataContext::new(TesseraConfig::default().with_num_workers(2)).unwrap()
}

/// Write one Arrow IPC file with `id` and `tag` columns.
fn write_fragment(path: &Path, ids: Vec<i64>) {
    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("tag", DataType::Utf8, false),
    ]));
    let tags: Vec<String> = ids.iter().map(|id| format!("t{id}")).collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(Int64Array::from(ids)), Arc::new(StringArray::from(tags))],
    )
    .unwrap();
    let mut writer = FileWriter::try_new(File::create(path).unwrap(), &schema).unwrap();
    writer.write(&batch).unwrap();
    writer.finish().unwrap();
}

fn ids_of(ctx: &DataContext, dataset: &tessera_data::Dataset) -> Vec<i64> {
    ctx.take_rows_sync(dataset, usize::MAX)
        .unwrap()
        .iter()
        .map(|row| row.get("id").and_then(Value::as_int64).unwrap())
        .collect()
}

// ============================================================================
// In-memory sources
// ============================================================================

#[test]
fn test_from_items_blocks() {
    let ctx = context();
    let dataset = ctx.from_items(vec![1i64, 2, 3, 4, 5], Some(2)).unwrap();

    assert_eq!(dataset.num_blocks(), 3);
    let blocks = ctx.get_blocks_sync(&dataset).unwrap();
    let values: Vec<Vec<Value>> = blocks
        .iter()
        .map(|block| block.as_sequence().unwrap().values().to_vec())
        .collect();
    assert_eq!(
        values,
        vec![
            vec![Value::Int64(1), Value::Int64(2)],
            vec![Value::Int64(3), Value::Int64(4)],
            vec![Value::Int64(5)],
        ]
    );
}

#[test]
fn test_from_items_mixed_values() {
    let ctx = context();
    let items = vec![Value::from("a"), Value::Int64(1), Value::Null, Value::Bool(true)];
    let dataset = ctx.from_items(items.clone(), Some(3)).unwrap();
    assert_eq!(ctx.take_values_sync(&dataset, 10).unwrap(), items);
}

#[test]
fn test_from_items_floats_keep_their_bits() {
    let mut state = 0x9E37_79B9_7F4A_7C15u64;
    let floats: Vec<f64> = (0..5000)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            f64::from_bits(state)
        })
        .filter(|f| f.is_finite())
        .collect();

    let ctx = context();
    let dataset = ctx.from_items(floats.clone(), Some(4)).unwrap();
    let bits: Vec<u64> = ctx
        .take_values_sync(&dataset, usize::MAX)
        .unwrap()
        .iter()
        .map(|value| value.as_float64().unwrap().to_bits())
        .collect();
    assert_eq!(bits, floats.iter().map(|f| f.to_bits()).collect::<Vec<_>>());
}

#[test]
fn test_range_block_sizes() {
    let ctx = context();
    let dataset = ctx.range(20, Some(10)).unwrap();
    assert_eq!(ctx.block_sizes_sync(&dataset).unwrap(), vec![2; 10]);
    assert_eq!(ctx.count_sync(&dataset).unwrap(), 20);
}

#[test]
fn test_range_uneven() {
    let ctx = context();
    let dataset = ctx.range(10, Some(3)).unwrap();
    assert_eq!(ctx.block_sizes_sync(&dataset).unwrap(), vec![3, 3, 3, 1]);

    let values = ctx.take_values_sync(&dataset, 100).unwrap();
    assert_eq!(values, (0..10).map(Value::Int64).collect::<Vec<_>>());
}

#[test]
fn test_range_columnar_values() {
    let ctx = context();
    let dataset = ctx.range_columnar(7, Some(3)).unwrap();
    assert_eq!(dataset.kind(), BlockKind::Columnar);

    let rows = ctx.take_rows_sync(&dataset, 100).unwrap();
    let values: Vec<Value> = rows
        .iter()
        .map(|row| row.get("value").cloned().unwrap())
        .collect();
    assert_eq!(values, (0..7).map(Value::Int64).collect::<Vec<_>>());
}

#[test]
fn test_zero_parallelism_rejected() {
    let ctx = context();
    let err = ctx.range_columnar(5, Some(0)).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(ctx.runtime().num_objects(), 0);
}

#[test]
fn test_config_default_parallelism() {
    let config = TesseraConfig::from_json_str(r#"{"execution": {"default_parallelism": 4}}"#)
        .unwrap()
        .with_num_workers(2);
    let ctx = DataContext::new(config).unwrap();
    assert_eq!(ctx.range(8, None).unwrap().num_blocks(), 4);
}

// ============================================================================
// Columnar files
// ============================================================================

#[test]
fn test_read_directory_round_robin() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..10i64 {
        write_fragment(&dir.path().join(format!("part-{i:02}.arrow")), vec![i * 10, i * 10 + 1]);
    }

    let ctx = context();
    let path = dir.path().to_string_lossy().into_owned();
    let dataset = ctx
        .read_columnar_files(path.as_str(), ColumnarReadOptions::default().with_parallelism(4))
        .unwrap();

    assert!(dataset.num_blocks() <= 4);
    assert_eq!(dataset.kind(), BlockKind::Columnar);
    // Buckets: {0,4,8}, {1,5,9}, {2,6}, {3,7}; two rows per fragment.
    assert_eq!(ctx.block_sizes_sync(&dataset).unwrap(), vec![6, 6, 4, 4]);

    let first = ctx.get_blocks_sync(&dataset).unwrap().remove(0);
    let ids: Vec<i64> = first
        .as_columnar()
        .unwrap()
        .rows()
        .unwrap()
        .iter()
        .map(|row| row.get("id").and_then(Value::as_int64).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 40, 41, 80, 81]);
}

#[test]
fn test_read_file_list_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.arrow");
    let b = dir.path().join("b.arrow");
    write_fragment(&a, vec![1, 2]);
    write_fragment(&b, vec![3]);

    let ctx = context();
    let paths = vec![
        b.to_string_lossy().into_owned(),
        a.to_string_lossy().into_owned(),
    ];
    let dataset = ctx
        .read_columnar_files(paths, ColumnarReadOptions::default().with_parallelism(1))
        .unwrap();

    assert_eq!(dataset.num_blocks(), 1);
    assert_eq!(ids_of(&ctx, &dataset), vec![3, 1, 2]);
}

#[test]
fn test_read_skips_hidden_and_filters_extension() {
    let dir = tempfile::tempdir().unwrap();
    write_fragment(&dir.path().join("part-0.arrow"), vec![1]);
    write_fragment(&dir.path().join(".part-1.arrow"), vec![2]);
    write_fragment(&dir.path().join("_part-2.arrow"), vec![3]);
    write_fragment(&dir.path().join("part-3.feather"), vec![4]);

    let ctx = context();
    let path = dir.path().to_string_lossy().into_owned();
    let dataset = ctx
        .read_columnar_files(
            path.as_str(),
            ColumnarReadOptions::default().with_file_extension("arrow"),
        )
        .unwrap();
    assert_eq!(ids_of(&ctx, &dataset), vec![1]);

    let everything = ctx
        .read_columnar_files(path.as_str(), ColumnarReadOptions::default())
        .unwrap();
    assert_eq!(ids_of(&ctx, &everything), vec![1, 4]);
}

#[test]
fn test_read_skips_hidden_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".staging")).unwrap();
    std::fs::create_dir(dir.path().join("_temporary")).unwrap();
    write_fragment(&dir.path().join("part-0.arrow"), vec![1]);
    write_fragment(&dir.path().join("_temporary").join("part-1.arrow"), vec![2]);
    write_fragment(&dir.path().join(".staging").join("part-2.arrow"), vec![3]);

    let ctx = context();
    let path = dir.path().to_string_lossy().into_owned();
    let dataset = ctx
        .read_columnar_files(path.as_str(), ColumnarReadOptions::default())
        .unwrap();
    assert_eq!(ids_of(&ctx, &dataset), vec![1]);
}

#[tokio::test]
async fn test_read_async_on_borrowed_runtime() {
    let dir = tempfile::tempdir().unwrap();
    write_fragment(&dir.path().join("part-0.arrow"), vec![0, 1]);
    write_fragment(&dir.path().join("part-1.arrow"), vec![2]);
    write_fragment(&dir.path().join("part-2.arrow"), vec![3, 4, 5]);

    let runtime = LocalRuntime::from_handle(Handle::current());
    let ctx = DataContext::with_runtime(TesseraConfig::default(), Arc::new(runtime));
    let path = dir.path().to_string_lossy().into_owned();
    let dataset = ctx
        .read_columnar_files_async(path.as_str(), ColumnarReadOptions::default().with_parallelism(2))
        .await
        .unwrap();

    // Buckets: {part-0, part-2}, {part-1}.
    assert_eq!(ctx.block_sizes(&dataset).await.unwrap(), vec![5, 1]);
    let ids: Vec<i64> = ctx
        .take_rows(&dataset, 10)
        .await
        .unwrap()
        .iter()
        .map(|row| row.get("id").and_then(Value::as_int64).unwrap())
        .collect();
    assert_eq!(ids, vec![0, 1, 3, 4, 5, 2]);
}

#[test]
fn test_release_dataset() {
    let dir = tempfile::tempdir().unwrap();
    write_fragment(&dir.path().join("part-0.arrow"), vec![1]);
    write_fragment(&dir.path().join("part-1.arrow"), vec![2]);

    let ctx = context();
    let path = dir.path().to_string_lossy().into_owned();
    let dataset = ctx
        .read_columnar_files(path.as_str(), ColumnarReadOptions::default())
        .unwrap();
    assert_eq!(ctx.runtime().num_objects(), 2);

    assert_eq!(ctx.release(dataset).unwrap(), 2);
    assert_eq!(ctx.runtime().num_objects(), 0);
}

#[test]
fn test_read_with_projection_and_explicit_filesystem() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("part-0.arrow");
    write_fragment(&file, vec![5, 6]);

    let ctx = context();
    let options = ColumnarReadOptions::default()
        .with_filesystem(FileSystem::local())
        .with_columns(["tag"]);
    let dataset = ctx
        .read_columnar_files(file.to_string_lossy().into_owned(), options)
        .unwrap();

    let rows = ctx.take_rows_sync(&dataset, 10).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 1);
    assert_eq!(rows[1].get("tag"), Some(&Value::from("t6")));
}

#[test]
fn test_read_missing_column_fails_on_resolution() {
    let dir = tempfile::tempdir().unwrap();
    write_fragment(&dir.path().join("part-0.arrow"), vec![1]);

    let ctx = context();
    let path = dir.path().to_string_lossy().into_owned();
    let dataset = ctx
        .read_columnar_files(
            path.as_str(),
            ColumnarReadOptions::default().with_columns(["nope"]),
        )
        .unwrap();

    let err = ctx.count_sync(&dataset).unwrap_err();
    assert!(matches!(err, TesseraError::SchemaError(_)));
}

#[test]
fn test_read_empty_directory_is_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context();
    let path = dir.path().to_string_lossy().into_owned();

    let err = ctx
        .read_columnar_files(path.as_str(), ColumnarReadOptions::default())
        .unwrap_err();
    assert!(err.is_configuration());
    assert!(err.to_string().contains("no data"));
    assert_eq!(ctx.runtime().num_objects(), 0);
}

#[test]
fn test_read_rejects_mixed_filesystems() {
    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().to_string_lossy().into_owned();

    let ctx = context();
    let err = ctx
        .read_columnar_files(
            vec![local, "s3://bucket/dir".to_string()],
            ColumnarReadOptions::default(),
        )
        .unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(ctx.runtime().num_objects(), 0);
}

#[test]
fn test_read_rejects_empty_path_list() {
    let ctx = context();
    let err = ctx
        .read_columnar_files(Vec::<String>::new(), ColumnarReadOptions::default())
        .unwrap_err();
    assert!(err.is_configuration());
}

// ============================================================================
// Unimplemented readers
// ============================================================================

#[test]
fn test_read_json_not_supported() {
    let ctx = context();
    let err = ctx
        .read_json("/data/records.json", FileReadOptions::default())
        .unwrap_err();
    assert!(err.is_not_supported());
    assert_eq!(ctx.runtime().num_objects(), 0);
}
