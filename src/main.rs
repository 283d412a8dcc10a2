use anyhow::Context;
use clap::Parser;
use relnote_conv::{BundledDataset, Config, ConversionStats, Pipeline, TitleStyle};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "relnote-conv",
    version,
    author,
    about = "Convert JSON release notes to text files",
    long_about = "Convert JSON release notes to text files, one file per note.\n\n\
    Each note's HTML body is stripped to plain text and written to <Title>.txt, \
    where the title has its whitespace removed.\n\n\
    USAGE EXAMPLES:\n  \
      # Convert the bundled fall release notes into the current directory\n  \
      relnote-conv\n\n  \
      # Convert the bundled 2024 notes\n  \
      relnote-conv --dataset 2024 --output ./notes\n\n  \
      # Convert an export file with snake_case file names\n  \
      relnote-conv --input releaseNotes.json --title-style snake"
)]
struct Cli {
    /// JSON file of release notes (overrides --dataset)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Bundled dataset to convert when no input file is given
    #[arg(short, long, value_enum, default_value = "fall")]
    dataset: CliDataset,

    /// Directory to write the text files into
    #[arg(short, long, default_value = ".", value_name = "PATH")]
    output: PathBuf,

    /// How titles become file names
    #[arg(long, value_enum, default_value = "compact")]
    title_style: CliTitleStyle,

    /// Output file extension, without the dot
    #[arg(long, default_value = "txt")]
    ext: String,

    /// Keep " x" tokens instead of removing them from bodies
    #[arg(long)]
    keep_artifacts: bool,

    /// Dry run (don't write files)
    #[arg(long)]
    dry_run: bool,

    /// Also write summary.json into the output directory
    #[arg(long)]
    summary: bool,

    /// Dispatch all writes concurrently
    #[cfg(feature = "async")]
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliDataset {
    /// Fall release notes
    Fall,
    /// 2024 release notes
    #[value(name = "2024")]
    Y2024,
}

impl From<CliDataset> for BundledDataset {
    fn from(d: CliDataset) -> Self {
        match d {
            CliDataset::Fall => Self::FallReleaseNotes,
            CliDataset::Y2024 => Self::ReleaseNotes2024,
        }
    }
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliTitleStyle {
    /// Remove all whitespace: "Q3 Update" -> Q3Update
    Compact,
    /// Snake case: "Q3 Update" -> Q3_Update
    Snake,
}

impl From<CliTitleStyle> for TitleStyle {
    fn from(s: CliTitleStyle) -> Self {
        match s {
            CliTitleStyle::Compact => Self::Compact,
            CliTitleStyle::Snake => Self::Snake,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = Config::builder()
        .dataset(cli.dataset.into())
        .output_dir(cli.output)
        .extension(cli.ext)
        .title_style(cli.title_style.into())
        .remove_artifacts(!cli.keep_artifacts)
        .dry_run(cli.dry_run)
        .write_summary(cli.summary);

    if let Some(input) = cli.input {
        builder = builder.input_file(input);
    }

    let config = builder.build().context("Failed to build configuration")?;
    let pipeline = Pipeline::new(config).context("Failed to create pipeline")?;

    #[cfg(feature = "async")]
    let stats = if cli.parallel {
        run_parallel(pipeline)?
    } else {
        pipeline.run().context("Conversion failed")?
    };

    #[cfg(not(feature = "async"))]
    let stats = pipeline.run().context("Conversion failed")?;

    report(&stats);
    Ok(())
}

#[cfg(feature = "async")]
fn run_parallel(pipeline: Pipeline) -> anyhow::Result<ConversionStats> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime
        .block_on(pipeline.run_async())
        .context("Conversion failed")
}

fn report(stats: &ConversionStats) {
    if stats.total_records == 0 {
        eprintln!("Warning: No release notes were found or converted.");
        return;
    }

    stats.print_summary();
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("relnote_conv=warn"),
        1 => EnvFilter::new("relnote_conv=info"),
        2 => EnvFilter::new("relnote_conv=debug"),
        _ => EnvFilter::new("relnote_conv=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();

    Ok(())
}
