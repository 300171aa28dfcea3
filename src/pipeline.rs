//! The reach analysis run: load, explore, decompose, forecast, reload.
//!
//! Each stage takes what the previous stage produced and fails the run on
//! the first error.

use std::path::Path;

use crate::analysis::{weekday_stats, WeekdayStats};
use crate::config::PipelineConfig;
use crate::core::{Forecast, TimeSeries};
use crate::data::{column_info, describe, null_counts, DataLoader, LoadedData};
use crate::error::Result;
use crate::features::autocorrelation::{acf_correlogram, default_lags, pacf_correlogram, Correlogram};
use crate::models::arima::{suggest_differencing, suggest_seasonal_differencing};
use crate::models::{load_model, save_model, Forecaster, ModelSummary, SARIMA};
use crate::render::{
    BoxSummary, CategoryBar, Figure, Panel, PanelStyle, Plot, Renderer, Series, SeriesColor,
};
use crate::report;
use crate::seasonality::{AdditiveDecomposer, Decomposition};

/// Output of the decomposition stage.
#[derive(Debug, Clone)]
pub struct DecompositionOutput {
    pub decomposition: Decomposition,
    pub acf: Correlogram,
    pub pacf: Correlogram,
}

/// Output of the forecasting stage.
#[derive(Debug, Clone)]
pub struct ForecastOutput {
    pub model: SARIMA,
    pub summary: ModelSummary,
    pub forecast: Forecast,
}

/// Everything a full run produced.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub rows: usize,
    pub weekday_stats: Vec<WeekdayStats>,
    pub decomposition: DecompositionOutput,
    pub model: ForecastOutput,
    pub reloaded_forecast: Forecast,
    /// Largest absolute difference between the two forecasts.
    pub round_trip_max_abs_diff: f64,
}

fn history(series: &TimeSeries) -> Vec<(chrono::NaiveDate, f64)> {
    series.observations().collect()
}

/// Read the input file and print its null counts, column info and
/// descriptive statistics.
pub fn load(config: &PipelineConfig) -> Result<LoadedData> {
    log::info!("loading {}", config.input.display());
    let loaded =
        DataLoader::new(&config.date_column, &config.value_column).load(&config.input)?;

    println!("Null values in the dataset:");
    print!("{}", report::null_counts_table(&null_counts(&loaded.table)));
    println!("\nColumn information:");
    print!(
        "{}",
        report::column_info_table(&column_info(&loaded.table), loaded.table.num_rows())
    );
    println!("\nDescriptive statistics:");
    print!("{}", report::describe_table(&describe(&loaded.table)));

    Ok(loaded)
}

/// Draw the exploratory charts and print the weekday table.
pub fn explore(
    series: &TimeSeries,
    config: &PipelineConfig,
    renderer: &mut dyn Renderer,
) -> Result<Vec<WeekdayStats>> {
    log::info!("exploring {} observations", series.len());
    let label = config.series_label.as_str();

    renderer.render(
        &Figure::new(
            "line",
            format!("Trend of {} Over Time", label),
            Plot::Lines(vec![Series::new(label, history(series))]),
        )
        .with_axes("Date", label),
    )?;

    renderer.render(
        &Figure::new(
            "bar",
            format!("{} for Each Day", label),
            Plot::DailyBars(history(series)),
        )
        .with_axes("Date", label),
    )?;

    match BoxSummary::from_values(series.values()) {
        Some(summary) => renderer.render(
            &Figure::new("box", format!("Distribution of {}", label), Plot::Box(summary))
                .with_axes("", label),
        )?,
        None => log::warn!("no values to summarise; skipping the box plot"),
    }

    let stats = weekday_stats(series);
    println!("\n{} statistics by day of the week:", label);
    print!("{}", report::weekday_table(&stats));

    let bars = stats
        .iter()
        .map(|row| CategoryBar {
            category: row.name().to_string(),
            value: row.mean,
            error: row.std,
        })
        .collect();
    renderer.render(
        &Figure::new(
            "weekday",
            format!("Mean {} by Day of the Week", label),
            Plot::CategoryBars(bars),
        )
        .with_axes("Day of the Week", format!("Mean {}", label)),
    )?;

    Ok(stats)
}

/// Additive decomposition plus ACF and PACF correlograms.
pub fn decompose(
    series: &TimeSeries,
    config: &PipelineConfig,
    renderer: &mut dyn Renderer,
) -> Result<DecompositionOutput> {
    let decomposer = match config.decomposition_period {
        Some(period) => AdditiveDecomposer::with_period(period),
        None => AdditiveDecomposer::new(),
    };
    let decomposition = decomposer.decompose(series)?;
    log::info!(
        "decomposed with period {} (seasonal strength {:.3}, trend strength {:.3})",
        decomposition.period,
        decomposition.seasonal_strength(),
        decomposition.trend_strength()
    );

    let panels = vec![
        Panel {
            title: "Observed".to_string(),
            values: decomposition.observed.clone(),
            style: PanelStyle::Line,
        },
        Panel {
            title: "Trend".to_string(),
            values: decomposition.trend.clone(),
            style: PanelStyle::Line,
        },
        Panel {
            title: "Seasonal".to_string(),
            values: decomposition.seasonal.clone(),
            style: PanelStyle::Line,
        },
        Panel {
            title: "Resid".to_string(),
            values: decomposition.residual.clone(),
            style: PanelStyle::Points,
        },
    ];
    renderer.render(&Figure::new(
        "decomposition",
        config.series_label.clone(),
        Plot::Panels {
            dates: decomposition.dates.clone(),
            panels,
        },
    ))?;

    let values = series.values();
    let lags = config.acf_lags.unwrap_or_else(|| default_lags(values.len()));
    let acf = acf_correlogram(values, lags, 0.95);
    let pacf = pacf_correlogram(values, lags, 0.95);
    log::debug!(
        "significant lags: acf {:?}, pacf {:?}",
        acf.significant_lags(),
        pacf.significant_lags()
    );

    renderer.render(&Figure::new("acf", "Autocorrelation", Plot::Correlogram(acf.clone())))?;
    renderer.render(&Figure::new(
        "pacf",
        "Partial Autocorrelation",
        Plot::Correlogram(pacf.clone()),
    ))?;

    Ok(DecompositionOutput {
        decomposition,
        acf,
        pacf,
    })
}

fn warn_on_period_mismatch(series: &TimeSeries, configured: usize) {
    match series.infer_frequency(0.5) {
        Ok(frequency) => {
            if let Some(inferred) = frequency.seasonal_period() {
                if inferred != configured {
                    log::warn!(
                        "seasonal period {} differs from the period {} implied by the data spacing",
                        configured,
                        inferred
                    );
                }
            }
        }
        Err(e) => log::debug!("could not infer a seasonal period: {}", e),
    }
}

fn forecast_figure(
    name: &str,
    title: String,
    label: &str,
    series: &TimeSeries,
    forecast: &Forecast,
    forecast_label: &str,
    color: SeriesColor,
) -> Figure {
    Figure::new(
        name,
        title,
        Plot::Lines(vec![
            Series::new("Actual Reach", history(series)),
            Series::new(forecast_label, forecast.iter().collect()).with_color(color),
        ]),
    )
    .with_axes("Date", label)
}

/// Fit the model, print its summary, save it and forecast.
pub fn forecast(
    series: &TimeSeries,
    config: &PipelineConfig,
    renderer: &mut dyn Renderer,
) -> Result<ForecastOutput> {
    let spec = config.model.to_spec();
    if spec.is_seasonal() {
        warn_on_period_mismatch(series, spec.s);
    }

    let suggested_d = suggest_differencing(series.values());
    let suggested_seasonal_d = suggest_seasonal_differencing(series.values(), spec.s);
    if (suggested_d, suggested_seasonal_d) != (spec.d, spec.cap_d) {
        log::info!(
            "variance reduction suggests d={} D={}; using d={} D={}",
            suggested_d,
            suggested_seasonal_d,
            spec.d,
            spec.cap_d
        );
    }

    log::info!("fitting {}", spec);
    let mut model = SARIMA::new(spec);
    model.fit(series)?;

    let summary = ModelSummary::from_model(&model)?;
    println!("\nModel Summary:");
    println!("{}", summary);

    save_model(&model, &config.model_path)?;

    let horizon = config.forecast_horizon;
    let forecast = model.predict_with_intervals(horizon, config.interval_level)?;
    println!("\nForecasted Reach for the Next {} Days:", horizon);
    print!("{}", report::forecast_table(&forecast));

    renderer.render(&forecast_figure(
        "forecast",
        format!("{} Forecast", config.series_label),
        &config.series_label,
        series,
        &forecast,
        "Forecasted Reach",
        SeriesColor::Red,
    ))?;

    Ok(ForecastOutput {
        model,
        summary,
        forecast,
    })
}

/// Load the saved model and repeat the forecast. Returns the new forecast
/// and its largest absolute difference from `original`.
pub fn reload(
    series: &TimeSeries,
    model_path: &Path,
    original: &Forecast,
    config: &PipelineConfig,
    renderer: &mut dyn Renderer,
) -> Result<(Forecast, f64)> {
    let model = load_model(model_path)?;
    let forecast = model.predict_with_intervals(original.horizon(), config.interval_level)?;
    println!(
        "\nForecasted Reach for the Next {} Days (Loaded Model):",
        forecast.horizon()
    );
    print!("{}", report::forecast_table(&forecast));

    let diff = forecast.max_abs_diff(original)?;
    if diff == 0.0 {
        log::info!("reloaded model reproduces the original forecast");
    } else {
        log::warn!(
            "reloaded model forecast differs from the original by up to {}",
            diff
        );
    }

    renderer.render(&forecast_figure(
        "forecast_loaded",
        format!("{} Forecast (Loaded Model)", config.series_label),
        &config.series_label,
        series,
        &forecast,
        "Forecasted Reach (Loaded Model)",
        SeriesColor::Green,
    ))?;

    Ok((forecast, diff))
}

/// Run every stage in order.
pub fn run(config: &PipelineConfig, renderer: &mut dyn Renderer) -> Result<PipelineReport> {
    let loaded = load(config)?;
    let series = loaded.series;

    let weekday_stats = explore(&series, config, renderer)?;
    let decomposition = decompose(&series, config, renderer)?;
    let model = forecast(&series, config, renderer)?;
    let (reloaded_forecast, round_trip_max_abs_diff) =
        reload(&series, &config.model_path, &model.forecast, config, renderer)?;

    log::info!("pipeline finished");
    Ok(PipelineReport {
        rows: series.len(),
        weekday_stats,
        decomposition,
        model,
        reloaded_forecast,
        round_trip_max_abs_diff,
    })
}
