use std::collections::HashMap;
use std::iter;

use clap::ValueEnum;
use itertools::Itertools;
use tabled::builder::Builder;
use tabled::settings::themes::Colorization;
use tabled::settings::{Color, Style};

use crate::StoreLayout;
use crate::measurements::{Measurement, ToJson};
use crate::workload::Workload;

#[derive(ValueEnum, Default, Clone, Debug)]
pub enum DisplayFormat {
    #[default]
    Table,
    GhJson,
}

/// Print one row per workload and one column per layout. The first layout is the baseline the
/// others are coloured against.
pub fn render_table(measurements: &[Measurement], layouts: &[StoreLayout]) -> anyhow::Result<()> {
    let Some(baseline_layout) = layouts.first() else {
        anyhow::bail!("no layouts to render");
    };

    let by_target: HashMap<(Workload, StoreLayout), &Measurement> = measurements
        .iter()
        .map(|m| ((m.workload, m.layout), m))
        .collect();
    let workloads = measurements.iter().map(|m| m.workload).unique().collect_vec();

    let mut table_builder = Builder::default();
    let mut colors = vec![];

    table_builder.push_record(
        iter::once("Benchmark".to_owned())
            .chain(
                layouts
                    .iter()
                    .map(|l| format!("{l} ({})", l.element_types())),
            )
            .collect::<Vec<String>>(),
    );

    for (idx, workload) in workloads.iter().enumerate() {
        let Some(baseline) = by_target.get(&(*workload, *baseline_layout)) else {
            anyhow::bail!("missing {workload} measurement for baseline {baseline_layout}");
        };
        let baseline_nanos = baseline.time.as_secs_f64() * 1e9;

        let mut row = vec![workload.to_string()];
        for (col_idx, layout) in layouts.iter().enumerate() {
            let Some(measurement) = by_target.get(&(*workload, *layout)) else {
                row.push("-".to_owned());
                continue;
            };
            let nanos = measurement.time.as_secs_f64() * 1e9;

            if layout != baseline_layout {
                colors.push(Colorization::exact(
                    vec![color(baseline_nanos, nanos)],
                    (idx + 1, col_idx + 1),
                ))
            }

            let ratio = nanos / baseline_nanos;
            row.push(format!(
                "{:.2} µs, {:.1} Mrows/s ({ratio:.2})",
                nanos / 1e3,
                measurement.mrows_per_sec()
            ));
        }
        table_builder.push_record(row);
    }

    let mut table = table_builder.build();
    table.with(Style::modern());

    for color in colors.into_iter() {
        table.with(color);
    }

    println!("{table}");

    Ok(())
}

pub fn print_measurements_json<T: ToJson>(all_measurements: &[T]) -> anyhow::Result<()> {
    for measurement in all_measurements {
        // This has to be `println!` and go to stdout, because we capture it from there.
        println!("{}", serde_json::to_string(&measurement.to_json())?)
    }

    Ok(())
}

fn color(baseline: f64, value: f64) -> Color {
    if value > (baseline + baseline / 2.0) {
        Color::BG_RED | Color::FG_BLACK
    } else if value > (baseline + baseline / 10.0) {
        Color::BG_YELLOW | Color::FG_BLACK
    } else {
        Color::BG_BRIGHT_GREEN | Color::FG_BLACK
    }
}
