use std::process::ExitCode;

use clap::Parser;
use humansize::{DECIMAL, format_size};
use indicatif::ProgressBar;
use soa_bench::display::{DisplayFormat, print_measurements_json, render_table};
use soa_bench::measurements::Measurement;
use soa_bench::workload::{Workload, filled_store, store_size};
use soa_bench::{StoreLayout, default_env_filter, run_timed, setup_logger};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value_t = 1_000_000)]
    rows: usize,
    #[arg(short, long, default_value = "10")]
    iterations: usize,
    #[arg(long, value_delimiter = ',', value_enum, default_values_t = vec![
        StoreLayout::Columns,
        StoreLayout::Packed,
        StoreLayout::Rows,
        StoreLayout::PackedOdd,
    ])]
    layouts: Vec<StoreLayout>,
    #[arg(short, long)]
    verbose: bool,
    #[arg(short, long, default_value_t, value_enum)]
    display_format: DisplayFormat,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Capture `RUST_LOG` configuration
    let filter = default_env_filter(args.verbose);
    setup_logger(filter);

    match sum_columns(args.rows, args.iterations, &args.layouts, args.display_format) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn sum_columns(
    rows: usize,
    iterations: usize,
    layouts: &[StoreLayout],
    display_format: DisplayFormat,
) -> anyhow::Result<()> {
    let progress = ProgressBar::new((layouts.len() * Workload::ALL.len()) as u64);

    let mut measurements = Vec::with_capacity(layouts.len() * Workload::ALL.len());
    for &layout in layouts {
        tracing::info!(
            "{layout} ({}): {rows} rows in {}",
            layout.element_types(),
            format_size(store_size(layout, rows)?, DECIMAL)
        );
        let store = filled_store(layout, rows)?;

        for workload in Workload::ALL {
            let (time, checksum) = run_timed(iterations, || store.sum(workload))?;
            tracing::debug!("{workload}/{layout}: {time:?}, sum {checksum}");
            measurements.push(Measurement {
                workload,
                layout,
                rows,
                time,
                checksum,
            });
            progress.inc(1);
        }
    }
    progress.finish();

    match display_format {
        DisplayFormat::Table => render_table(&measurements, layouts),
        DisplayFormat::GhJson => print_measurements_json(&measurements),
    }
}
