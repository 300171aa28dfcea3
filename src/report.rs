//! Plain-text tables printed by the pipeline.

use crate::analysis::WeekdayStats;
use crate::core::Forecast;
use crate::data::{ColumnInfo, ColumnStats};
use std::fmt::Write;

fn number(value: f64, precision: usize) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.*}", precision, value)
    }
}

pub fn null_counts_table(counts: &[(String, usize)]) -> String {
    let width = counts.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, count) in counts {
        let _ = writeln!(out, "{:<width$}    {}", name, count, width = width);
    }
    out
}

pub fn column_info_table(info: &[ColumnInfo], rows: usize) -> String {
    let width = info
        .iter()
        .map(|c| c.name.len())
        .max()
        .unwrap_or(0)
        .max("Column".len());
    let mut out = String::new();
    let _ = writeln!(out, "RangeIndex: {} entries, 0 to {}", rows, rows.saturating_sub(1));
    let _ = writeln!(out, "Data columns (total {} columns):", info.len());
    let _ = writeln!(
        out,
        " #   {:<width$}  Non-Null Count  Dtype",
        "Column",
        width = width
    );
    for (i, column) in info.iter().enumerate() {
        let _ = writeln!(
            out,
            " {:<3} {:<width$}  {:>5} non-null  {}",
            i,
            column.name,
            column.non_null,
            column.dtype,
            width = width
        );
    }
    out
}

pub fn describe_table(stats: &[ColumnStats]) -> String {
    let mut out = String::new();
    let _ = write!(out, "{:<8}", "");
    for column in stats {
        let _ = write!(out, "{:>18}", column.name);
    }
    out.push('\n');

    let rows: [(&str, fn(&ColumnStats) -> f64); 8] = [
        ("count", |s| s.count as f64),
        ("mean", |s| s.mean),
        ("std", |s| s.std),
        ("min", |s| s.min),
        ("25%", |s| s.q25),
        ("50%", |s| s.q50),
        ("75%", |s| s.q75),
        ("max", |s| s.max),
    ];
    for (label, get) in rows {
        let _ = write!(out, "{:<8}", label);
        for column in stats {
            let _ = write!(out, "{:>18}", number(get(column), 6));
        }
        out.push('\n');
    }
    out
}

pub fn weekday_table(stats: &[WeekdayStats]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<10} {:>14} {:>14} {:>14}", "Day", "mean", "median", "std");
    for row in stats {
        let _ = writeln!(
            out,
            "{:<10} {:>14} {:>14} {:>14}",
            row.name(),
            number(row.mean, 6),
            number(row.median, 1),
            number(row.std, 6)
        );
    }
    out
}

pub fn forecast_table(forecast: &Forecast) -> String {
    let mut out = String::new();
    match (forecast.lower(), forecast.upper()) {
        (Some(lower), Some(upper)) => {
            let level = forecast.level().unwrap_or(f64::NAN) * 100.0;
            let _ = writeln!(
                out,
                "{:<12} {:>16} {:>16} {:>16}",
                "Date",
                "Forecast",
                format!("Lower {:.0}%", level),
                format!("Upper {:.0}%", level)
            );
            for (i, (date, value)) in forecast.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{:<12} {:>16} {:>16} {:>16}",
                    date.format("%Y-%m-%d"),
                    number(value, 6),
                    number(lower[i], 6),
                    number(upper[i], 6)
                );
            }
        }
        _ => {
            for (date, value) in forecast.iter() {
                let _ = writeln!(out, "{:<12} {:>16}", date.format("%Y-%m-%d"), number(value, 6));
            }
        }
    }
    out
}
