//! End-to-end runs of the reach pipeline against small CSV files.

use chrono::{Duration, NaiveDate};
use reach_forecast::config::PipelineConfig;
use reach_forecast::error::ForecastError;
use reach_forecast::pipeline;
use reach_forecast::render::{ImageFormat, Plot, PlottersRenderer, RecordingRenderer, SeriesColor};
use std::fmt::Write as _;
use std::path::Path;
use tempfile::TempDir;

/// Write `n` daily rows with a weekly cycle and a linear trend.
fn write_reach_csv(dir: &Path, n: usize) -> std::path::PathBuf {
    let start = NaiveDate::from_ymd_opt(2022, 4, 4).unwrap();
    let pattern = [400.0, 250.0, 100.0, 150.0, 300.0, -350.0, -850.0];
    let mut contents = String::from("Date,Instagram reach\n");
    for i in 0..n {
        let date = start + Duration::days(i as i64);
        let reach = 7000.0 + 25.0 * i as f64 + pattern[i % 7] + ((i * 37) % 11) as f64 * 10.0;
        let _ = writeln!(contents, "{},{}", date.format("%Y-%m-%d"), reach.round() as i64);
    }
    let path = dir.join("Instagram-Reach.csv");
    std::fs::write(&path, contents).unwrap();
    path
}

fn config_in(dir: &TempDir, input: std::path::PathBuf) -> PipelineConfig {
    PipelineConfig {
        input,
        model_path: dir.path().join("sarima_model.bin"),
        output_dir: dir.path().join("plots"),
        ..Default::default()
    }
}

#[test]
fn full_run_produces_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, write_reach_csv(dir.path(), 60));
    let mut renderer = RecordingRenderer::new();

    let report = pipeline::run(&config, &mut renderer).unwrap();

    assert_eq!(report.rows, 60);
    assert_eq!(
        renderer.names(),
        vec![
            "line",
            "bar",
            "box",
            "weekday",
            "decomposition",
            "acf",
            "pacf",
            "forecast",
            "forecast_loaded"
        ]
    );
    assert!(config.model_path.exists());

    let forecast = &report.model.forecast;
    assert_eq!(forecast.horizon(), 30);
    assert_eq!(
        forecast.dates()[0],
        NaiveDate::from_ymd_opt(2022, 4, 4).unwrap() + Duration::days(60)
    );
    assert_eq!(report.reloaded_forecast, *forecast);
    assert_eq!(report.round_trip_max_abs_diff, 0.0);

    assert_eq!(report.weekday_stats.len(), 7);
    assert_eq!(report.weekday_stats[0].name(), "Monday");
    assert_eq!(report.model.summary.label, "SARIMAX(1, 1, 1)x(1, 1, 1, 12)");
}

#[test]
fn weekly_cycle_is_recovered_by_decomposition() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, write_reach_csv(dir.path(), 60));
    let mut renderer = RecordingRenderer::new();

    let report = pipeline::run(&config, &mut renderer).unwrap();
    let decomposition = &report.decomposition.decomposition;

    assert_eq!(decomposition.period, 7);
    let trend: Vec<f64> = decomposition
        .trend
        .iter()
        .copied()
        .filter(|t| t.is_finite())
        .collect();
    assert!(trend.windows(2).all(|w| w[1] > w[0]));
    for i in 7..60 {
        assert!((decomposition.seasonal[i] - decomposition.seasonal[i - 7]).abs() < 1e-9);
    }
    // Sunday carries the deepest dip of the cycle.
    let sunday = &report.weekday_stats[6];
    assert!(report.weekday_stats.iter().all(|row| row.mean >= sunday.mean));
}

#[test]
fn forecast_figures_use_expected_series() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, write_reach_csv(dir.path(), 40));
    let mut renderer = RecordingRenderer::new();
    pipeline::run(&config, &mut renderer).unwrap();

    let figure = renderer.get("forecast").unwrap();
    assert_eq!(figure.title, "Instagram Reach Forecast");
    match &figure.plot {
        Plot::Lines(series) => {
            assert_eq!(series[0].label, "Actual Reach");
            assert_eq!(series[0].points.len(), 40);
            assert_eq!(series[1].label, "Forecasted Reach");
            assert_eq!(series[1].color, SeriesColor::Red);
            assert_eq!(series[1].points.len(), 30);
        }
        other => panic!("unexpected plot {:?}", other),
    }
    assert_eq!(
        renderer.get("forecast_loaded").unwrap().title,
        "Instagram Reach Forecast (Loaded Model)"
    );
}

#[test]
fn configured_horizon_and_period_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir, write_reach_csv(dir.path(), 50));
    config.forecast_horizon = 10;
    config.model.seasonal_period = 7;
    let mut renderer = RecordingRenderer::new();

    let report = pipeline::run(&config, &mut renderer).unwrap();
    assert_eq!(report.model.forecast.horizon(), 10);
    assert_eq!(report.model.summary.label, "SARIMAX(1, 1, 1)x(1, 1, 1, 7)");
}

#[test]
fn header_only_input_loads_but_cannot_be_modelled() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    std::fs::write(&path, "Date,Instagram reach\n").unwrap();
    let config = config_in(&dir, path);

    let loaded = pipeline::load(&config).unwrap();
    assert!(loaded.series.is_empty());

    let mut renderer = RecordingRenderer::new();
    assert!(matches!(
        pipeline::decompose(&loaded.series, &config, &mut renderer),
        Err(ForecastError::EmptyData)
    ));
    assert!(matches!(
        pipeline::forecast(&loaded.series, &config, &mut renderer),
        Err(ForecastError::EmptyData)
    ));
    assert!(!config.model_path.exists());
}

#[test]
fn single_row_input_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("one.csv");
    std::fs::write(&path, "Date,Instagram reach\n2022-04-04,7000\n").unwrap();
    let config = config_in(&dir, path);

    let loaded = pipeline::load(&config).unwrap();
    assert_eq!(loaded.series.len(), 1);

    let mut renderer = RecordingRenderer::new();
    assert!(matches!(
        pipeline::decompose(&loaded.series, &config, &mut renderer),
        Err(ForecastError::InsufficientData { .. })
    ));
    assert!(matches!(
        pipeline::forecast(&loaded.series, &config, &mut renderer),
        Err(ForecastError::InsufficientData { .. })
    ));
}

#[test]
fn missing_input_halts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, dir.path().join("absent.csv"));
    let mut renderer = RecordingRenderer::new();

    assert!(pipeline::run(&config, &mut renderer).is_err());
    assert!(renderer.figures.is_empty());
}

#[test]
fn corrupt_model_file_fails_reload() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, write_reach_csv(dir.path(), 30));
    let loaded = pipeline::load(&config).unwrap();
    let mut renderer = RecordingRenderer::new();

    let out = pipeline::forecast(&loaded.series, &config, &mut renderer).unwrap();
    std::fs::write(&config.model_path, b"not a model").unwrap();
    assert!(matches!(
        pipeline::reload(
            &loaded.series,
            &config.model_path,
            &out.forecast,
            &config,
            &mut renderer
        ),
        Err(ForecastError::Serialization(_))
    ));
}

#[test]
fn svg_run_writes_one_file_per_figure() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir, write_reach_csv(dir.path(), 90));
    let mut renderer = PlottersRenderer::new(&config.output_dir, ImageFormat::Svg);

    pipeline::run(&config, &mut renderer).unwrap();

    let names = [
        "line",
        "bar",
        "box",
        "weekday",
        "decomposition",
        "acf",
        "pacf",
        "forecast",
        "forecast_loaded",
    ];
    assert_eq!(renderer.written().len(), names.len());
    for name in names {
        let path = config.output_dir.join(format!("{}.svg", name));
        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0, "{} is empty", path.display());
    }
}

#[test]
fn constant_reach_runs_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("flat.csv");
    let start = NaiveDate::from_ymd_opt(2022, 4, 4).unwrap();
    let mut contents = String::from("Date,Instagram reach\n");
    for i in 0..60 {
        let date = start + Duration::days(i);
        let _ = writeln!(contents, "{},100", date.format("%Y-%m-%d"));
    }
    std::fs::write(&path, contents).unwrap();
    let config = config_in(&dir, path);
    let mut renderer = RecordingRenderer::new();

    let report = pipeline::run(&config, &mut renderer).unwrap();
    assert!(config.model_path.exists());
    assert_eq!(report.model.forecast.horizon(), 30);
    assert!(report.model.summary.heteroskedasticity.p_value.is_nan());
}
