use clap::Parser;
use layerfilter::io::{load_image, save_image};
use layerfilter::{Backend, BorderPolicy, Convolver, FilterConfig, Kernel};
use serde::{Deserialize, Serialize};
use std::fs;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "layerfilter CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BorderConfig {
    Skip,
    Replicate,
}

impl From<BorderConfig> for BorderPolicy {
    fn from(value: BorderConfig) -> Self {
        match value {
            BorderConfig::Skip => BorderPolicy::Skip,
            BorderConfig::Replicate => BorderPolicy::Replicate,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BackendConfig {
    Threads,
    Rayon,
}

impl From<BackendConfig> for Backend {
    fn from(value: BackendConfig) -> Self {
        match value {
            BackendConfig::Threads => Backend::Threads,
            BackendConfig::Rayon => Backend::Rayon,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PresetConfig {
    Identity,
    Box3,
    Laplacian,
    Laplacian16,
    Sharpen,
}

impl PresetConfig {
    fn kernel(&self) -> layerfilter::FilterResult<Kernel> {
        match self {
            PresetConfig::Identity => Ok(Kernel::identity()),
            PresetConfig::Box3 => Kernel::box_blur(3),
            PresetConfig::Laplacian => Ok(Kernel::laplacian()),
            PresetConfig::Laplacian16 => Ok(Kernel::laplacian_16()),
            PresetConfig::Sharpen => Ok(Kernel::sharpen()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct FilterConfigJson {
    apply_rescaling: bool,
    out_min: u8,
    out_max: u8,
    border: BorderConfig,
    workers: Option<NonZeroUsize>,
    backend: BackendConfig,
}

impl Default for FilterConfigJson {
    fn default() -> Self {
        let cfg = FilterConfig::default();
        Self {
            apply_rescaling: cfg.apply_rescaling,
            out_min: cfg.out_min,
            out_max: cfg.out_max,
            border: BorderConfig::Skip,
            workers: cfg.workers,
            backend: BackendConfig::Threads,
        }
    }
}

impl From<FilterConfigJson> for FilterConfig {
    fn from(value: FilterConfigJson) -> Self {
        FilterConfig {
            apply_rescaling: value.apply_rescaling,
            out_min: value.out_min,
            out_max: value.out_max,
            border: value.border.into(),
            workers: value.workers,
            backend: value.backend.into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    input_path: String,
    output_path: String,
    report_path: Option<String>,
    keep_color: bool,
    preset: Option<PresetConfig>,
    weights: Vec<f32>,
    divisor: Option<f32>,
    filter: FilterConfigJson,
}

impl Config {
    fn kernel(&self) -> layerfilter::FilterResult<Kernel> {
        if let Some(preset) = &self.preset {
            return preset.kernel();
        }
        match self.divisor {
            Some(divisor) => Kernel::from_flat_weights_with_divisor(&self.weights, divisor),
            None => Kernel::from_flat_weights(&self.weights),
        }
    }
}

#[derive(Debug, Serialize)]
struct Timings {
    load_ms: f64,
    filter_ms: f64,
    save_ms: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    input_path: String,
    output_path: String,
    layers: usize,
    rows: usize,
    columns: usize,
    mask_size: usize,
    factor: f32,
    timings: Timings,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1e3
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("layerfilter=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.input_path.is_empty() || config.output_path.is_empty() {
        return Err("input_path and output_path must be set in the config".into());
    }
    if config.preset.is_none() && config.weights.is_empty() {
        return Err("either preset or weights must be set in the config".into());
    }

    let kernel = config.kernel()?;
    let mask_size = kernel.size();
    let factor = kernel.effective_factor();

    let start = Instant::now();
    let image = load_image(&config.input_path, config.keep_color)?;
    let load_ms = elapsed_ms(start);

    let start = Instant::now();
    let convolver = Convolver::new(kernel).with_config(config.filter.into());
    let filtered = convolver.apply(&image)?;
    let filter_ms = elapsed_ms(start);

    let start = Instant::now();
    save_image(&filtered, &config.output_path)?;
    let save_ms = elapsed_ms(start);

    let report = Report {
        input_path: config.input_path,
        output_path: config.output_path,
        layers: filtered.layer_depth(),
        rows: filtered.rows(),
        columns: filtered.columns(),
        mask_size,
        factor,
        timings: Timings {
            load_ms,
            filter_ms,
            save_ms,
        },
    };
    let json = serde_json::to_string_pretty(&report)?;

    match config.report_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
