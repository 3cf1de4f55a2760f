use std::fmt::Display;
use std::hint::black_box;
use std::time::{Duration, Instant};

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

pub mod display;
pub mod measurements;
pub mod workload;

/// The storage layouts the bench can time.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum StoreLayout {
    /// Column store of `(u8, u16, u32, u64)`.
    #[clap(name = "soa")]
    Columns,
    /// Column store of packed integers of widths 1, 2, 4 and 8.
    #[clap(name = "packed")]
    Packed,
    /// Row store of `(u8, u16, u32, u64)`.
    #[clap(name = "aos")]
    Rows,
    /// Column store of packed integers of widths 3, 5, 6 and 7.
    #[clap(name = "packed-odd")]
    PackedOdd,
}

impl StoreLayout {
    pub fn name(&self) -> &'static str {
        match self {
            StoreLayout::Columns => "soa",
            StoreLayout::Packed => "packed",
            StoreLayout::Rows => "aos",
            StoreLayout::PackedOdd => "packed-odd",
        }
    }

    /// The element types stored by this layout.
    pub fn element_types(&self) -> &'static str {
        match self {
            StoreLayout::Columns | StoreLayout::Rows => "u8, u16, u32, u64",
            StoreLayout::Packed => "u1, u2, u4, u8",
            StoreLayout::PackedOdd => "u3, u5, u6, u7",
        }
    }
}

impl Display for StoreLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

pub fn setup_logger(filter: EnvFilter) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_level(true)
        .with_line_number(true)
        .with_env_filter(filter)
        .init();
}

pub fn default_env_filter(is_verbose: bool) -> EnvFilter {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_e) => {
            let default_level = if is_verbose {
                LevelFilter::TRACE
            } else {
                LevelFilter::INFO
            };

            EnvFilter::builder()
                .with_default_directive(default_level.into())
                .from_env_lossy()
        }
    }
}

/// Run `routine` twice to warm up, then at least once more per iteration, returning the fastest
/// run and the output of the last one.
pub fn run_timed<O, R>(iterations: usize, mut routine: R) -> anyhow::Result<(Duration, O)>
where
    R: FnMut() -> anyhow::Result<O>,
{
    black_box(routine()?);
    let mut output = black_box(routine()?);

    let mut fastest_result = Duration::MAX;
    for _ in 0..iterations.max(1) {
        let start = Instant::now();
        let result = routine()?;
        fastest_result = fastest_result.min(start.elapsed());
        output = black_box(result);
    }

    Ok((fastest_result, output))
}
