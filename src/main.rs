use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use arrow::util::pretty::pretty_format_batches;
use clap::{Args, Parser, Subcommand};
use log::info;

use dismap_tables::data::schema::CANONICAL_ORDER;
use dismap_tables::store::parquet_file::record_batch;
use dismap_tables::store::{CsvStore, Materializer, ParquetStore, RegionFrame};
use dismap_tables::{OutputFormat, Pipeline, PipelineConfig};

/// Build DisMAP survey tables from regional trawl-survey CSV files.
#[derive(Debug, Parser)]
#[command(name = "dismap-tables", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load, classify and write the tables for the selected regions
    Run(RunArgs),
    /// Load and classify without writing anything, then print the summaries
    Check(CheckArgs),
    /// Print the region table (built-in plus config overrides)
    Regions {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct RunArgs {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Region code to process; repeat for several (overrides the config)
    #[arg(short, long = "region")]
    regions: Vec<String>,

    /// Directory holding <CODE>.csv inputs (overrides the config)
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Output directory (overrides the config)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Table format (overrides the config)
    #[arg(short, long)]
    format: Option<OutputFormat>,

    /// Restrict to the configured species allow-list
    #[arg(long)]
    filter_species: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Also print the first N rows of each table
    #[arg(long, default_value_t = 0)]
    preview: usize,
}

impl RunArgs {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = load_config(self.config.as_deref())?;
        if !self.regions.is_empty() {
            config.regions = self.regions;
        }
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        config.filter_species |= self.filter_species;
        Ok(config)
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> ExitCode {
    env_logger::init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("dismap-tables: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Run(args) => run_tables(args),
        Command::Check(args) => check(args),
        Command::Regions { config } => {
            let config = load_config(config.as_deref())?;
            let table = config.region_table()?;
            println!("{:<10} {:<24} {:>6} {:>6}", "CODE", "NAME", "DATE", "UTC");
            for r in table.iter() {
                println!(
                    "{:<10} {:<24} {:>3}/{:<2} {:>+6}",
                    r.code, r.name, r.month, r.day, r.utc_offset_hours
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_tables(args: RunArgs) -> Result<ExitCode> {
    let config = args.into_config()?;
    let mut store: Box<dyn Materializer> = match config.format {
        OutputFormat::Parquet => Box::new(ParquetStore::new(&config.output_dir)),
        OutputFormat::Csv => Box::new(CsvStore::new(&config.output_dir)),
    };
    info!(
        "writing {} tables to {}",
        config.format,
        config.output_dir.display()
    );

    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let outcomes = pipeline.run(store.as_mut())?;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(s) => println!(
                "{:<10} ok      {:>8} rows  {:>4} core species",
                outcome.code,
                s.rows_written,
                s.core_species.len()
            ),
            Err(e) => {
                failed += 1;
                println!("{:<10} FAILED  {e}", outcome.code);
            }
        }
    }

    if failed > 0 {
        eprintln!("{failed} of {} regions failed", outcomes.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn check(args: CheckArgs) -> Result<ExitCode> {
    let pipeline = Pipeline::new(args.run.into_config()?).context("invalid configuration")?;
    let regions = pipeline.config().selected_regions(pipeline.regions())?;

    let mut failed = false;
    for region in regions {
        match pipeline.prepare(region) {
            Ok(prepared) => {
                println!("{}", serde_json::to_string_pretty(&prepared.summary)?);
                if args.preview > 0 {
                    let rows = &prepared.records[..args.preview.min(prepared.records.len())];
                    let batch = record_batch(&RegionFrame::new(region, rows), &CANONICAL_ORDER)?;
                    println!("{}", pretty_format_batches(&[batch])?);
                }
            }
            Err(e) => {
                failed = true;
                eprintln!("{}: {e}", region.code);
            }
        }
    }
    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
