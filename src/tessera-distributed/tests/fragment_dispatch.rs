//! End-to-end fragment dispatch over the local runtime.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow_array::{Int64Array, RecordBatch};
use arrow_ipc::writer::FileWriter;
use arrow_schema::{DataType, Field, Schema};

use common_config::ExecutionConfig;
use tessera_core::Value;
use tessera_distributed::{Dispatcher, ExecutionRuntime, LocalRuntime, PartitionPlan};
use tessera_io::{DiscoveryOptions, FileSystem, discover_fragments};

fn write_fragment(path: &Path, values: Vec<i64>) {
    let schema = Arc::new(Schema::new(vec![Field::new("x", DataType::Int64, false)]));
    let batch =
        RecordBatch::try_new(schema.clone(), vec![Arc::new(Int64Array::from(values))]).unwrap();
    let mut writer = FileWriter::try_new(File::create(path).unwrap(), &schema).unwrap();
    writer.write(&batch).unwrap();
    writer.finish().unwrap();
}

#[test]
fn test_round_robin_fragment_blocks() {
    let dir = tempfile::tempdir().unwrap();
    // Fragment i holds i + 1 rows, all equal to i.
    for i in 0..10i64 {
        let rows = usize::try_from(i + 1).unwrap();
        write_fragment(&dir.path().join(format!("part-{i:02}.arrow")), vec![i; rows]);
    }

    let filesystem = FileSystem::local();
    let root = dir.path().to_string_lossy().into_owned();
    let fragments = common_runtime::block_on(discover_fragments(
        &filesystem,
        &[root],
        &DiscoveryOptions::default(),
    ))
    .unwrap()
    .unwrap();
    assert_eq!(fragments.len(), 10);

    let plan = PartitionPlan::round_robin(fragments.len(), 4).unwrap();
    let runtime = Arc::new(LocalRuntime::new(&ExecutionConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(runtime.clone());
    let refs = dispatcher
        .submit_fragments(&filesystem, &fragments, None, &plan)
        .unwrap();
    assert_eq!(refs.len(), 4);

    for (partition, block_ref) in plan.partitions().iter().zip(&refs) {
        let block = common_runtime::block_on(runtime.get(block_ref))
            .unwrap()
            .unwrap();
        let expected: Vec<Value> = partition
            .units
            .iter()
            .flat_map(|i| vec![Value::Int64(i as i64); i + 1])
            .collect();
        let actual: Vec<Value> = block
            .as_columnar()
            .unwrap()
            .rows()
            .unwrap()
            .into_iter()
            .map(|row| row.get("x").cloned().unwrap())
            .collect();
        assert_eq!(actual, expected);
    }
}

#[test]
fn test_missing_column_surfaces_on_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("only.arrow");
    write_fragment(&file, vec![1, 2]);

    let filesystem = FileSystem::local();
    let fragments = common_runtime::block_on(discover_fragments(
        &filesystem,
        &[file.to_string_lossy().into_owned()],
        &DiscoveryOptions::default(),
    ))
    .unwrap()
    .unwrap();

    let plan = PartitionPlan::round_robin(fragments.len(), 2).unwrap();
    let runtime = Arc::new(LocalRuntime::new(&ExecutionConfig::default()).unwrap());
    let dispatcher = Dispatcher::new(runtime.clone());
    let columns = vec!["missing".to_string()];
    let refs = dispatcher
        .submit_fragments(&filesystem, &fragments, Some(&columns), &plan)
        .unwrap();

    // Submission succeeds; the failure waits for resolution.
    assert_eq!(refs.len(), 1);
    let err = common_runtime::block_on(runtime.get(&refs[0]))
        .unwrap()
        .unwrap_err();
    assert!(err.to_string().contains("missing"));
}
