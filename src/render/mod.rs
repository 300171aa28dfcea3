//! Chart output.
//!
//! The pipeline describes each chart as a [`Figure`] and hands it to a
//! [`Renderer`]. [`PlottersRenderer`] writes image files; [`RecordingRenderer`]
//! keeps figures in memory.

mod figure;
mod plotters_backend;

pub use figure::{BoxSummary, CategoryBar, Figure, Panel, PanelStyle, Plot, Series, SeriesColor};
pub use plotters_backend::PlottersRenderer;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Something that can display or store a figure.
pub trait Renderer {
    fn render(&mut self, figure: &Figure) -> Result<()>;
}

/// Image file format for [`PlottersRenderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ImageFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ImageFormat::Png),
            "svg" => Ok(ImageFormat::Svg),
            other => Err(format!("unknown image format '{}' (expected png or svg)", other)),
        }
    }
}

/// Keeps every rendered figure in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    pub figures: Vec<Figure>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Figure names in render order.
    pub fn names(&self) -> Vec<&str> {
        self.figures.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Figure> {
        self.figures.iter().find(|f| f.name == name)
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, figure: &Figure) -> Result<()> {
        self.figures.push(figure.clone());
        Ok(())
    }
}
