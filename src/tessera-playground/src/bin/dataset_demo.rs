//! Dataset Demo - build a dataset and show how it was partitioned
//!
//! # Usage
//!
//! ```bash
//! cargo run --package tessera-playground --bin dataset-demo -- range 20 -p 10
//! cargo run --package tessera-playground --bin dataset-demo -- items 1 2 3 4 5 -p 2
//! cargo run --package tessera-playground --bin dataset-demo -- read ./data --columns id name
//! ```

use clap::{Parser, Subcommand};
use log::info;
use tracing_subscriber::EnvFilter;

use common_config::TesseraConfig;
use common_error::TesseraResult;
use tessera_core::{BlockKind, Value};
use tessera_data::{ColumnarReadOptions, DataContext, Dataset};

use tessera_playground::{format_rows, format_values, print_header, print_plan_summary};

/// Dataset Demo CLI.
#[derive(Parser, Debug)]
#[command(name = "dataset-demo")]
#[command(about = "Build partitioned datasets and inspect their blocks")]
#[command(version)]
struct Args {
    /// Configuration as a JSON string, e.g. '{"execution": {"num_workers": 4}}'
    #[arg(long, global = true)]
    config: Option<String>,

    /// Number of records to print
    #[arg(short = 'n', long, global = true, default_value_t = 10)]
    show: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Integers 0..n
    Range {
        /// Number of integers
        n: usize,

        /// Target parallelism
        #[arg(short, long)]
        parallelism: Option<usize>,

        /// Produce columnar blocks with a single `value` column
        #[arg(long, default_value_t = false)]
        columnar: bool,
    },

    /// In-memory items; integers are parsed as such, anything else is a string
    Items {
        /// Items to load
        #[arg(num_args = 0..)]
        items: Vec<String>,

        /// Target parallelism
        #[arg(short, long)]
        parallelism: Option<usize>,
    },

    /// Arrow IPC files or directories
    Read {
        /// Paths or URIs (all on the same filesystem)
        #[arg(required = true, num_args = 1..)]
        paths: Vec<String>,

        /// Columns to keep
        #[arg(short, long, num_args = 1..)]
        columns: Option<Vec<String>>,

        /// Only read files with this extension
        #[arg(short, long)]
        extension: Option<String>,

        /// Target parallelism
        #[arg(short, long)]
        parallelism: Option<usize>,
    },
}

fn main() -> TesseraResult<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let config = match &args.config {
        Some(json) => TesseraConfig::from_json_str(json)?,
        None => TesseraConfig::default(),
    };
    info!("Default parallelism: {}", config.execution.default_parallelism);
    let ctx = DataContext::new(config)?;

    let (description, dataset) = match args.command {
        Commands::Range {
            n,
            parallelism,
            columnar,
        } => {
            let dataset = if columnar {
                ctx.range_columnar(n, parallelism)?
            } else {
                ctx.range(n, parallelism)?
            };
            (format!("range({n})"), dataset)
        }
        Commands::Items { items, parallelism } => {
            let values: Vec<Value> = items.iter().map(|item| parse_item(item)).collect();
            (
                format!("from_items({} items)", values.len()),
                ctx.from_items(values, parallelism)?,
            )
        }
        Commands::Read {
            paths,
            columns,
            extension,
            parallelism,
        } => {
            let options = ColumnarReadOptions {
                columns,
                parallelism,
                file_extension: extension,
                ..Default::default()
            };
            let description = format!("read_columnar_files({})", paths.join(", "));
            (description, ctx.read_columnar_files(paths, options)?)
        }
    };

    show_dataset(&ctx, &description, &dataset, args.show)
}

fn show_dataset(
    ctx: &DataContext,
    description: &str,
    dataset: &Dataset,
    show: usize,
) -> TesseraResult<()> {
    print_header(&dataset.to_string());
    let sizes = ctx.block_sizes_sync(dataset)?;
    print_plan_summary(description, &sizes);

    print_header("Records");
    match dataset.kind() {
        BlockKind::Sequence => {
            let values = ctx.take_values_sync(dataset, show)?;
            println!("{}", format_values(&values, show));
        }
        BlockKind::Columnar => {
            let rows = ctx.take_rows_sync(dataset, show)?;
            print!("{}", format_rows(&rows, show));
        }
    }
    Ok(())
}

fn parse_item(item: &str) -> Value {
    item.parse::<i64>()
        .map_or_else(|_| Value::from(item), Value::Int64)
}
