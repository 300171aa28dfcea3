use super::figure::{BoxSummary, CategoryBar, Figure, Panel, PanelStyle, Plot, Series, SeriesColor};
use super::{ImageFormat, Renderer};
use crate::error::{ForecastError, Result};
use crate::features::autocorrelation::Correlogram;
use chrono::{Duration, NaiveDate};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fmt::Display;
use std::ops::Range;
use std::path::PathBuf;

const CAPTION_FONT: (&str, u32) = ("sans-serif", 24);
const PRIMARY: RGBColor = RGBColor(31, 119, 180);
const DARK_GREEN: RGBColor = RGBColor(0, 128, 0);

/// Writes every figure as an image file named after the figure.
#[derive(Debug, Clone)]
pub struct PlottersRenderer {
    output_dir: PathBuf,
    format: ImageFormat,
    size: (u32, u32),
    written: Vec<PathBuf>,
}

impl PlottersRenderer {
    pub fn new(output_dir: impl Into<PathBuf>, format: ImageFormat) -> Self {
        Self {
            output_dir: output_dir.into(),
            format,
            size: (1200, 600),
            written: Vec::new(),
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Target file for a figure.
    pub fn path_for(&self, figure: &Figure) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", figure.name, self.format.extension()))
    }

    /// Files written so far, in order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    fn size_for(&self, figure: &Figure) -> (u32, u32) {
        match figure.plot {
            Plot::Box(_) => (800, 600),
            Plot::Panels { .. } => (1400, 800),
            _ => self.size,
        }
    }
}

impl Renderer for PlottersRenderer {
    fn render(&mut self, figure: &Figure) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.path_for(figure);
        let size = self.size_for(figure);
        match self.format {
            ImageFormat::Png => draw(&BitMapBackend::new(&path, size).into_drawing_area(), figure)?,
            ImageFormat::Svg => draw(&SVGBackend::new(&path, size).into_drawing_area(), figure)?,
        }
        log::info!("wrote {}", path.display());
        self.written.push(path);
        Ok(())
    }
}

fn failed<E: Display>(what: &'static str) -> impl FnOnce(E) -> ForecastError {
    move |e| ForecastError::Render(format!("{}: {}", what, e))
}

fn rgb(color: SeriesColor) -> RGBColor {
    match color {
        SeriesColor::Primary => PRIMARY,
        SeriesColor::Red => RED,
        SeriesColor::Green => DARK_GREEN,
    }
}

/// Smallest range covering the finite values, never zero-width.
fn span(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !lo.is_finite() {
        0.0..1.0
    } else if lo == hi {
        lo - 1.0..hi + 1.0
    } else {
        lo..hi
    }
}

fn padded(range: Range<f64>) -> Range<f64> {
    let pad = (range.end - range.start) * 0.05;
    range.start - pad..range.end + pad
}

fn with_zero(range: Range<f64>) -> Range<f64> {
    range.start.min(0.0)..range.end.max(0.0)
}

fn day_offsets(origin: NaiveDate, points: &[(NaiveDate, f64)]) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(d, v)| ((*d - origin).num_days() as f64, *v))
        .collect()
}

fn date_label(origin: NaiveDate, x: f64) -> String {
    (origin + Duration::days(x.round() as i64))
        .format("%Y-%m-%d")
        .to_string()
}

fn draw<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> Result<()> {
    root.fill(&WHITE).map_err(failed("fill background"))?;
    match &figure.plot {
        Plot::Lines(series) => draw_lines(root, figure, series)?,
        Plot::DailyBars(points) => draw_daily_bars(root, figure, points)?,
        Plot::Box(summary) => draw_box(root, figure, summary)?,
        Plot::CategoryBars(bars) => draw_category_bars(root, figure, bars)?,
        Plot::Panels { dates, panels } => draw_panels(root, figure, dates, panels)?,
        Plot::Correlogram(correlogram) => draw_correlogram(root, figure, correlogram)?,
    }
    root.present().map_err(failed("write image"))?;
    Ok(())
}

fn draw_lines<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    series: &[Series],
) -> Result<()> {
    let origin = match series.iter().flat_map(|s| s.points.iter().map(|(d, _)| *d)).min() {
        Some(date) => date,
        None => return Ok(()),
    };
    let lines: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| day_offsets(origin, &s.points))
        .collect();
    let x_range = span(lines.iter().flatten().map(|p| p.0));
    let y_range = padded(span(lines.iter().flatten().map(|p| p.1)));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(failed("build chart"))?;

    let x_formatter = |x: &f64| date_label(origin, *x);
    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_label_formatter(&x_formatter)
        .draw()
        .map_err(failed("draw mesh"))?;

    for (s, points) in series.iter().zip(lines) {
        let color = rgb(s.color);
        chart
            .draw_series(LineSeries::new(points, color.stroke_width(2)))
            .map_err(failed("draw line"))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(failed("draw legend"))?;
    Ok(())
}

fn draw_daily_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    points: &[(NaiveDate, f64)],
) -> Result<()> {
    let origin = match points.iter().map(|(d, _)| *d).min() {
        Some(date) => date,
        None => return Ok(()),
    };
    let bars = day_offsets(origin, points);
    let x_range = padded(span(bars.iter().map(|p| p.0)));
    let y_range = padded(with_zero(span(bars.iter().map(|p| p.1))));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(70)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(failed("build chart"))?;

    let x_formatter = |x: &f64| date_label(origin, *x);
    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_label_formatter(&x_formatter)
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .draw()
        .map_err(failed("draw mesh"))?;

    chart
        .draw_series(
            bars.iter()
                .map(|&(x, y)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, y)], PRIMARY.filled())),
        )
        .map_err(failed("draw bars"))?;
    Ok(())
}

fn draw_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    summary: &BoxSummary,
) -> Result<()> {
    let extremes = [summary.lower_whisker, summary.upper_whisker];
    let y_range = padded(span(extremes.iter().chain(summary.fliers.iter()).copied()));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..2.0, y_range)
        .map_err(failed("build chart"))?;

    let x_formatter = |_: &f64| String::new();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(1)
        .x_label_formatter(&x_formatter)
        .y_desc(figure.y_label.as_str())
        .draw()
        .map_err(failed("draw mesh"))?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.75, summary.q1), (1.25, summary.q3)],
            PRIMARY.stroke_width(2),
        )))
        .map_err(failed("draw box"))?;

    let whiskers = vec![
        PathElement::new(vec![(0.75, summary.median), (1.25, summary.median)], RED.stroke_width(2)),
        PathElement::new(vec![(1.0, summary.q3), (1.0, summary.upper_whisker)], BLACK.stroke_width(1)),
        PathElement::new(vec![(1.0, summary.q1), (1.0, summary.lower_whisker)], BLACK.stroke_width(1)),
        PathElement::new(
            vec![(0.9, summary.upper_whisker), (1.1, summary.upper_whisker)],
            BLACK.stroke_width(1),
        ),
        PathElement::new(
            vec![(0.9, summary.lower_whisker), (1.1, summary.lower_whisker)],
            BLACK.stroke_width(1),
        ),
    ];
    chart.draw_series(whiskers).map_err(failed("draw whiskers"))?;

    chart
        .draw_series(
            summary
                .fliers
                .iter()
                .map(|v| Circle::new((1.0, *v), 3, BLACK.stroke_width(1))),
        )
        .map_err(failed("draw fliers"))?;
    Ok(())
}

fn draw_category_bars<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    bars: &[CategoryBar],
) -> Result<()> {
    let n = bars.len().max(1);
    let tops = bars.iter().flat_map(|b| {
        let err = if b.error.is_finite() { b.error } else { 0.0 };
        [b.value - err, b.value + err]
    });
    let y_range = padded(with_zero(span(tops)));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), y_range)
        .map_err(failed("build chart"))?;

    let names: Vec<&str> = bars.iter().map(|b| b.category.as_str()).collect();
    let x_formatter = |x: &f64| {
        let i = x.round();
        if (x - i).abs() < 1e-6 && i >= 0.0 {
            names.get(i as usize).map(|s| s.to_string()).unwrap_or_default()
        } else {
            String::new()
        }
    };
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_formatter)
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()
        .map_err(failed("draw mesh"))?;

    let drawable: Vec<(f64, &CategoryBar)> = bars
        .iter()
        .enumerate()
        .filter(|(_, b)| b.value.is_finite())
        .map(|(i, b)| (i as f64, b))
        .collect();

    chart
        .draw_series(
            drawable
                .iter()
                .map(|(x, b)| Rectangle::new([(x - 0.4, 0.0), (x + 0.4, b.value)], PRIMARY.filled())),
        )
        .map_err(failed("draw bars"))?;

    let error_bars = drawable
        .iter()
        .filter(|(_, b)| b.error.is_finite())
        .flat_map(|(x, b)| {
            let (lo, hi) = (b.value - b.error, b.value + b.error);
            [
                PathElement::new(vec![(*x, lo), (*x, hi)], BLACK.stroke_width(1)),
                PathElement::new(vec![(x - 0.1, lo), (x + 0.1, lo)], BLACK.stroke_width(1)),
                PathElement::new(vec![(x - 0.1, hi), (x + 0.1, hi)], BLACK.stroke_width(1)),
            ]
        });
    chart.draw_series(error_bars).map_err(failed("draw error bars"))?;
    Ok(())
}

fn draw_panels<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    dates: &[NaiveDate],
    panels: &[Panel],
) -> Result<()> {
    let origin = match dates.first() {
        Some(date) => *date,
        None => return Ok(()),
    };
    let body = root
        .titled(&figure.title, CAPTION_FONT)
        .map_err(failed("draw title"))?;
    let areas = body.split_evenly((panels.len().max(1), 1));
    let x_formatter = |x: &f64| date_label(origin, *x);

    for (area, panel) in areas.iter().zip(panels) {
        let points: Vec<(NaiveDate, f64)> = dates.iter().copied().zip(panel.values.iter().copied()).collect();
        let points = day_offsets(origin, &points);
        let x_range = span(dates.iter().map(|d| (*d - origin).num_days() as f64));
        let y_range = padded(span(points.iter().map(|p| p.1)));

        let mut chart = ChartBuilder::on(area)
            .margin(8)
            .x_label_area_size(25)
            .y_label_area_size(70)
            .build_cartesian_2d(x_range, y_range)
            .map_err(failed("build panel"))?;
        chart
            .configure_mesh()
            .y_desc(panel.title.as_str())
            .x_label_formatter(&x_formatter)
            .draw()
            .map_err(failed("draw panel mesh"))?;

        let drawn = match panel.style {
            PanelStyle::Line => chart
                .draw_series(LineSeries::new(points, PRIMARY.stroke_width(2)))
                .map(|_| ()),
            PanelStyle::Points => chart
                .draw_series(points.iter().map(|p| Circle::new(*p, 2, PRIMARY.filled())))
                .map(|_| ()),
        };
        drawn.map_err(failed("draw panel"))?;
    }
    Ok(())
}

fn draw_correlogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    correlogram: &Correlogram,
) -> Result<()> {
    let max_lag = correlogram.max_lag() as f64;
    let reach = correlogram
        .values
        .iter()
        .chain(correlogram.band.iter())
        .filter(|v| v.is_finite())
        .fold(1.0_f64, |acc, v| acc.max(v.abs()));

    let mut chart = ChartBuilder::on(root)
        .caption(&figure.title, CAPTION_FONT)
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5..max_lag + 0.5, -reach * 1.1..reach * 1.1)
        .map_err(failed("build chart"))?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .draw()
        .map_err(failed("draw mesh"))?;

    let band: Vec<(f64, f64)> = correlogram
        .band
        .iter()
        .enumerate()
        .skip(1)
        .map(|(lag, b)| (lag as f64, *b))
        .collect();
    if !band.is_empty() {
        let mut outline: Vec<(f64, f64)> = band.clone();
        outline.extend(band.iter().rev().map(|(x, b)| (*x, -b)));
        chart
            .draw_series(std::iter::once(Polygon::new(outline, PRIMARY.mix(0.2))))
            .map_err(failed("draw band"))?;
    }

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(-0.5, 0.0), (max_lag + 0.5, 0.0)],
            BLACK.stroke_width(1),
        )))
        .map_err(failed("draw axis"))?;

    let stems: Vec<(f64, f64)> = correlogram
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(lag, v)| (lag as f64, *v))
        .collect();
    chart
        .draw_series(
            stems
                .iter()
                .map(|&(x, v)| PathElement::new(vec![(x, 0.0), (x, v)], PRIMARY.stroke_width(2))),
        )
        .map_err(failed("draw stems"))?;
    chart
        .draw_series(stems.iter().map(|p| Circle::new(*p, 4, PRIMARY.filled())))
        .map_err(failed("draw markers"))?;
    Ok(())
}
