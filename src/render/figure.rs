//! Backend-independent descriptions of the charts the pipeline draws.

use crate::features::autocorrelation::Correlogram;
use crate::features::basic::quantile_sorted;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Colour of a plotted series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeriesColor {
    #[default]
    Primary,
    Red,
    Green,
}

/// A dated line on a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub points: Vec<(NaiveDate, f64)>,
    pub color: SeriesColor,
}

impl Series {
    pub fn new(label: impl Into<String>, points: Vec<(NaiveDate, f64)>) -> Self {
        Self {
            label: label.into(),
            points,
            color: SeriesColor::Primary,
        }
    }

    pub fn with_color(mut self, color: SeriesColor) -> Self {
        self.color = color;
        self
    }
}

/// One bar of a categorical bar chart, with a symmetric error bar.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryBar {
    pub category: String,
    pub value: f64,
    pub error: f64,
}

/// How a panel of a stacked figure is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelStyle {
    Line,
    Points,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub title: String,
    pub values: Vec<f64>,
    pub style: PanelStyle,
}

/// Five-number summary plus outliers, with whiskers at 1.5 IQR.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub lower_whisker: f64,
    pub upper_whisker: f64,
    pub fliers: Vec<f64>,
}

impl BoxSummary {
    /// Summarise the finite values; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let q1 = quantile_sorted(&sorted, 0.25);
        let median = quantile_sorted(&sorted, 0.5);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);

        // Whiskers stop at the most extreme data points inside the fences.
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            fliers,
        })
    }
}

/// What is drawn inside the axes.
#[derive(Debug, Clone, PartialEq)]
pub enum Plot {
    /// One or more dated lines with a legend.
    Lines(Vec<Series>),
    /// One bar per date.
    DailyBars(Vec<(NaiveDate, f64)>),
    Box(BoxSummary),
    CategoryBars(Vec<CategoryBar>),
    /// Vertically stacked panels sharing the date axis.
    Panels {
        dates: Vec<NaiveDate>,
        panels: Vec<Panel>,
    },
    Correlogram(Correlogram),
}

/// A complete chart: file stem, captions and content.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// File stem used by file-writing renderers, e.g. `forecast`.
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plot: Plot,
}

impl Figure {
    pub fn new(name: impl Into<String>, title: impl Into<String>, plot: Plot) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x_label: String::new(),
            y_label: String::new(),
            plot,
        }
    }

    pub fn with_axes(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }
}
