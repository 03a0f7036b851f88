use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use kline_features::augment::{perturb_klines, seeded_rng};
use kline_features::{FeaturePipeline, FeatureSchema, Kline, OutputShape, PipelineConfig, PipelineOutput};
use std::io::Read;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "kline_features")]
#[command(about = "Compute indicators and normalized feature rows from Binance klines", long_about = None)]
struct Cli {
    /// Kline JSON file (array of 12-field rows); `-` reads stdin
    #[arg(default_value = "-")]
    input: String,

    /// Pipeline config JSON; missing keys use defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// `compact`, `full`, or a comma-separated field list
    #[arg(short, long)]
    schema: Option<FeatureSchema>,

    #[arg(short, long, value_enum)]
    output: Option<Shape>,

    /// Multiply each OHLCV value by 1 ± this many percent before processing
    #[arg(long)]
    noise: Option<f64>,

    /// Seed for --noise
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Print the feature matrix as a table instead of JSON
    #[arg(long)]
    table: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Shape {
    Records,
    Matrix,
}

fn read_klines(input: &str) -> Result<Vec<Kline>> {
    let text = if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading klines from stdin")?;
        buf
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading {}", input))?
    };
    serde_json::from_str(&text).context("parsing kline JSON")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(schema) = cli.schema {
        config.schema = schema;
    }
    if let Some(shape) = cli.output {
        config.output = match shape {
            Shape::Records => OutputShape::Records,
            Shape::Matrix => OutputShape::Matrix,
        };
    }
    if cli.table {
        config.output = OutputShape::Matrix;
    }

    let mut klines = read_klines(&cli.input)?;
    info!("Loaded {} klines", klines.len());

    if let Some(percent) = cli.noise {
        klines = perturb_klines(&klines, percent, &mut seeded_rng(cli.seed))?;
        info!("Applied ±{}% noise (seed {})", percent, cli.seed);
    }

    let pipeline = FeaturePipeline::new(config)?;
    let output = pipeline.run(&klines)?;

    match output {
        PipelineOutput::Matrix(matrix) if cli.table => {
            println!("{}", matrix.to_dataframe()?);
        }
        other => {
            println!("{}", serde_json::to_string(&other)?);
        }
    }
    Ok(())
}
