use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Parser;
use rayon::prelude::*;
use tracing::{error, info, warn, Level};

use timecam::{
    catalog::{Catalog, Era, FilterPreset},
    config::Config,
    photo::loader,
    pipeline::{Pipeline, PipelineInput},
};

#[derive(Parser)]
#[command(
    name = "timecam",
    version,
    about = "Make photos look like they were taken in another decade",
    long_about = "TimeCam applies era-themed filter presets to photos: exposure and white balance shifts, vignetting, film grain, an optional portrait blur and a date stamp."
)]
struct Cli {
    /// Images to render (PNG, JPEG)
    #[arg(required_unless_present = "list")]
    inputs: Vec<PathBuf>,

    /// List the available eras and presets and exit
    #[arg(short, long)]
    list: bool,

    /// Era to render with, by id or name (e.g. 1999)
    #[arg(short, long, default_value = "1999")]
    era: String,

    /// Preset within the era, by id or name; defaults to the era's first preset
    #[arg(short, long)]
    preset: Option<String>,

    /// Effect strength (0.0-1.0); defaults to the configured strength
    #[arg(short, long)]
    strength: Option<f32>,

    /// Apply the portrait blur
    #[arg(long)]
    portrait: bool,

    /// Add a date stamp, optionally with custom text
    #[arg(long, value_name = "TEXT", num_args = 0..=1)]
    stamp: Option<Option<String>>,

    /// Seed the grain for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for rendered files; defaults to each input's directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Per-run render settings shared by every input file
struct RenderJob<'a> {
    pipeline: &'a Pipeline,
    era: &'a Era,
    preset: &'a FilterPreset,
    strength: f32,
    portrait: bool,
    stamp: Option<String>,
    seed: Option<u64>,
    config: &'a Config,
    output_dir: Option<&'a Path>,
}

impl RenderJob<'_> {
    fn render(&self, input: &Path) -> Result<PathBuf> {
        let source = loader::load(input).with_context(|| format!("Failed to load {:?}", input))?;

        let outcome = self.pipeline.apply(
            PipelineInput::new(source, self.preset.clone())
                .with_strength(self.strength)
                .with_portrait(self.portrait)
                .with_optional_date_stamp(self.stamp.clone())
                .with_optional_grain_seed(self.seed),
        );
        if let Some(reason) = outcome.reason() {
            warn!("{:?} was left unfiltered: {}", input, reason);
        }

        let output = self.output_path(input);
        loader::save(outcome.image(), &output, self.config.output.jpeg_quality)
            .with_context(|| format!("Failed to save {:?}", output))?;
        Ok(output)
    }

    fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "photo".to_string());
        let extension = input
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_else(|| "png".to_string());
        let file_name = format!(
            "{}{}_{}.{}",
            stem,
            self.config.output.suffix,
            self.preset.id,
            extension
        );

        let directory = self
            .output_dir
            .map(Path::to_path_buf)
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        directory.join(file_name)
    }
}

fn print_catalog(catalog: &Catalog) {
    for era in catalog.eras() {
        println!("{} ({}) - {}", era.name(), era.id(), era.description());
        for preset in era.presets() {
            println!(
                "  {:<22} grain {:.2}  vignette {:.2}  tint {:+.2}  contrast {:.2}  saturation {:.2}  exposure {:+.2}",
                preset.id.as_str(),
                preset.grain,
                preset.vignette,
                preset.tint,
                preset.contrast,
                preset.saturation,
                preset.exposure
            );
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .init();

    let catalog = Catalog::builtin()?;
    if cli.list {
        print_catalog(&catalog);
        return Ok(());
    }

    info!("Starting TimeCam v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    config.validate()?;

    let (era, preset) = catalog
        .resolve(&cli.era, cli.preset.as_deref())
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let strength = cli.strength.unwrap_or(config.pipeline.default_strength);
    if !(0.0..=1.0).contains(&strength) {
        bail!("Strength must be between 0.0 and 1.0, got {}", strength);
    }

    let stamp = match cli.stamp {
        Some(Some(text)) => Some(text),
        Some(None) => Some(config.stamp.style.text(era.name(), &Utc::now())),
        None if config.stamp.enabled => Some(config.stamp.style.text(era.name(), &Utc::now())),
        None => None,
    };

    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }

    let pipeline = Pipeline::new();
    let job = RenderJob {
        pipeline: &pipeline,
        era,
        preset,
        strength,
        portrait: cli.portrait || config.capture.mode.is_portrait(),
        stamp,
        seed: cli.seed.or(config.pipeline.grain_seed),
        config: &config,
        output_dir: cli.output_dir.as_deref(),
    };

    info!(
        "Rendering {} file(s) with {} / {} at strength {:.2}",
        cli.inputs.len(),
        job.era.name(),
        job.preset.name,
        job.strength
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.output.processing_threads)
        .build()
        .context("Failed to start render threads")?;

    let results: Vec<(&PathBuf, Result<PathBuf>)> = pool.install(|| {
        cli.inputs
            .par_iter()
            .map(|input| (input, job.render(input)))
            .collect()
    });

    let mut failures = 0;
    for (input, result) in results {
        match result {
            Ok(output) => info!("{:?} -> {:?}", input, output),
            Err(e) => {
                failures += 1;
                error!("{:?}: {:#}", input, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} of {} file(s) failed", failures, cli.inputs.len());
    }

    info!("Done");
    Ok(())
}
