use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use reach_forecast::config::PipelineConfig;
use reach_forecast::pipeline;
use reach_forecast::render::{ImageFormat, PlottersRenderer};

/// Analyse and forecast daily reach.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with date and reach columns
    input: Option<PathBuf>,

    /// YAML settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the fitted model is written and reloaded from
    #[arg(long)]
    model_path: Option<PathBuf>,

    /// Directory for chart images
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Chart image format (png or svg)
    #[arg(long)]
    format: Option<ImageFormat>,

    /// Number of days to forecast
    #[arg(long)]
    horizon: Option<usize>,

    /// Seasonal period of the SARIMA model
    #[arg(long)]
    seasonal_period: Option<usize>,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(model_path) = self.model_path {
            config.model_path = model_path;
        }
        if let Some(output_dir) = self.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(format) = self.format {
            config.image_format = format;
        }
        if let Some(horizon) = self.horizon {
            config.forecast_horizon = horizon;
        }
        if let Some(period) = self.seasonal_period {
            config.model.seasonal_period = period;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Cli::parse().into_config()?;
    log::debug!("{:?}", config);

    let mut renderer = PlottersRenderer::new(&config.output_dir, config.image_format);
    let report = pipeline::run(&config, &mut renderer)
        .with_context(|| format!("Failed to analyse {}", config.input.display()))?;

    log::info!(
        "{} rows analysed, {} charts written to {}",
        report.rows,
        renderer.written().len(),
        config.output_dir.display()
    );
    Ok(())
}
