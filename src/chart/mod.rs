//! Pie chart of the sentiment distribution.
//!
//! The chart is a plain value ([`PieChart`]) built from a [`SentimentDistribution`];
//! rendering to SVG is a separate step so callers can embed or save it.

use crate::analysis::{format_percentage, SentimentDistribution};
use crate::core::{AnalyzerError, Result};
use plotters::backend::SVGBackend;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::Serialize;
use std::f64::consts::PI;
use std::path::Path;

const TITLE_BAND: i32 = 40;
const PCT_DISTANCE: f64 = 0.6;
const LABEL_DISTANCE: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliceColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl SliceColor {
    pub const GREEN: SliceColor = SliceColor::rgb(0, 128, 0);
    pub const RED: SliceColor = SliceColor::rgb(255, 0, 0);
    pub const GRAY: SliceColor = SliceColor::rgb(128, 128, 128);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn to_rgb(self) -> RGBColor {
        RGBColor(self.r, self.g, self.b)
    }
}

/// Maps sentiment labels to slice colours.
///
/// Colours follow the label, not the slice position: positive is always green and
/// negative always red, whichever is more frequent. Labels the palette does not know
/// take the next colour of `fallback`.
#[derive(Debug, Clone)]
pub struct SentimentPalette {
    pub positive: SliceColor,
    pub negative: SliceColor,
    pub neutral: SliceColor,
    pub fallback: Vec<SliceColor>,
}

impl Default for SentimentPalette {
    fn default() -> Self {
        Self {
            positive: SliceColor::GREEN,
            negative: SliceColor::RED,
            neutral: SliceColor::GRAY,
            fallback: vec![
                SliceColor::rgb(31, 119, 180),
                SliceColor::rgb(255, 127, 14),
                SliceColor::rgb(148, 103, 189),
                SliceColor::rgb(140, 86, 75),
                SliceColor::rgb(227, 119, 194),
                SliceColor::rgb(188, 189, 34),
                SliceColor::rgb(23, 190, 207),
            ],
        }
    }
}

impl SentimentPalette {
    fn known(&self, label: &str) -> Option<SliceColor> {
        match label.to_ascii_lowercase().as_str() {
            "positive" | "pos" => Some(self.positive),
            "negative" | "neg" => Some(self.negative),
            "neutral" => Some(self.neutral),
            _ => None,
        }
    }

    /// Colours for `labels`, in order.
    pub fn assign<'a>(&self, labels: impl IntoIterator<Item = &'a str>) -> Vec<SliceColor> {
        let mut next_fallback = 0;
        labels
            .into_iter()
            .map(|label| {
                self.known(label).unwrap_or_else(|| {
                    let color = self
                        .fallback
                        .get(next_fallback % self.fallback.len().max(1))
                        .copied()
                        .unwrap_or(SliceColor::GRAY);
                    next_fallback += 1;
                    color
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub count: usize,
    /// Share of the whole pie, 0.0 to 1.0.
    pub fraction: f64,
    pub color: SliceColor,
}

impl PieSlice {
    /// Percentage annotation drawn on the slice, e.g. `70.0%`.
    pub fn percentage_text(&self) -> String {
        format_percentage(self.fraction * 100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChart {
    pub fn from_distribution(
        distribution: &SentimentDistribution,
        title: &str,
        palette: &SentimentPalette,
    ) -> Self {
        let colors = palette.assign(distribution.counts().iter().map(|c| c.label.as_str()));
        let slices = distribution
            .counts()
            .iter()
            .zip(colors)
            .map(|(entry, color)| PieSlice {
                label: entry.label.clone(),
                count: entry.count,
                fraction: entry.percentage / 100.0,
                color,
            })
            .collect();

        Self {
            title: title.to_string(),
            slices,
        }
    }

    pub fn slice(&self, label: &str) -> Option<&PieSlice> {
        self.slices.iter().find(|slice| slice.label == label)
    }

    /// Render as an SVG document. Slices start at 3 o'clock and run counter-clockwise.
    pub fn render_svg(&self, width: u32, height: u32) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
            root.fill(&WHITE).map_err(chart_error)?;

            let (w, h) = (width as i32, height as i32);
            let title_style = ("sans-serif", 20)
                .into_font()
                .color(&BLACK)
                .pos(Pos::new(HPos::Center, VPos::Top));
            root.draw(&Text::new(self.title.as_str(), (w / 2, 10), title_style))
                .map_err(chart_error)?;

            let center = (w / 2, TITLE_BAND + (h - TITLE_BAND) / 2);
            let radius = f64::from(w.min(h - TITLE_BAND)) * 0.32;

            if self.slices.is_empty() {
                let style = ("sans-serif", 16)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                root.draw(&Text::new("No reviews", center, style))
                    .map_err(chart_error)?;
            }

            let mut start = 0.0;
            for slice in &self.slices {
                let end = start + slice.fraction * 360.0;
                root.draw(&Polygon::new(
                    wedge_points(center, radius, start, end),
                    slice.color.to_rgb().filled(),
                ))
                .map_err(chart_error)?;

                let middle = (start + end) / 2.0;
                let pct_style = ("sans-serif", 14)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Center));
                root.draw(&Text::new(
                    slice.percentage_text(),
                    polar(center, radius * PCT_DISTANCE, middle),
                    pct_style,
                ))
                .map_err(chart_error)?;

                let h_pos = if middle.to_radians().cos() >= 0.0 {
                    HPos::Left
                } else {
                    HPos::Right
                };
                let label_style = ("sans-serif", 14)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(h_pos, VPos::Center));
                root.draw(&Text::new(
                    slice.label.as_str(),
                    polar(center, radius * LABEL_DISTANCE, middle),
                    label_style,
                ))
                .map_err(chart_error)?;

                start = end;
            }

            root.present().map_err(chart_error)?;
        }
        Ok(svg)
    }

    pub fn save_svg(&self, path: &Path, width: u32, height: u32) -> Result<()> {
        let svg = self.render_svg(width, height)?;
        std::fs::write(path, svg)?;
        tracing::info!(path = %path.display(), "wrote chart");
        Ok(())
    }
}

fn chart_error(e: impl std::fmt::Display) -> AnalyzerError {
    AnalyzerError::Chart(e.to_string())
}

/// Point at `degrees` on a circle, screen coordinates (y grows downwards).
fn polar(center: (i32, i32), radius: f64, degrees: f64) -> (i32, i32) {
    let theta = degrees * PI / 180.0;
    (
        center.0 + (radius * theta.cos()).round() as i32,
        center.1 - (radius * theta.sin()).round() as i32,
    )
}

/// Polygon outline of the wedge from `start` to `end` degrees, at most 1 degree per edge.
fn wedge_points(center: (i32, i32), radius: f64, start: f64, end: f64) -> Vec<(i32, i32)> {
    let sweep = end - start;
    let steps = sweep.ceil().max(1.0) as usize;
    std::iter::once(center)
        .chain((0..=steps).map(|step| {
            polar(center, radius, start + sweep * step as f64 / steps as f64)
        }))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart_for(labels: &[&str]) -> PieChart {
        let distribution = SentimentDistribution::from_labels(labels.iter().copied());
        PieChart::from_distribution(
            &distribution,
            "Review Sentiment Distribution",
            &SentimentPalette::default(),
        )
    }

    #[test]
    fn colors_follow_labels_not_position() {
        let chart = chart_for(&["NEGATIVE", "NEGATIVE", "POSITIVE"]);
        assert_eq!(chart.slices[0].label, "NEGATIVE");
        assert_eq!(chart.slices[0].color, SliceColor::RED);
        assert_eq!(chart.slices[1].color, SliceColor::GREEN);
    }

    #[test]
    fn extra_categories_get_distinct_colors() {
        let chart = chart_for(&["POSITIVE", "NEUTRAL", "MIXED", "SARCASTIC"]);
        let colors: Vec<_> = chart.slices.iter().map(|s| s.color).collect();
        assert_eq!(colors[0], SliceColor::GREEN);
        assert_eq!(colors[1], SliceColor::GRAY);
        assert_ne!(colors[2], colors[3]);
        assert!(!colors[2..].contains(&SliceColor::GREEN));
    }

    #[test]
    fn svg_carries_title_labels_and_percentages() {
        let mut labels = vec!["POSITIVE"; 7];
        labels.extend(["NEGATIVE"; 3]);
        let svg = chart_for(&labels).render_svg(640, 480).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Review Sentiment Distribution"));
        assert!(svg.contains("70.0%"));
        assert!(svg.contains("30.0%"));
        assert!(svg.contains("POSITIVE"));
        assert!(svg.contains("NEGATIVE"));
    }

    #[test]
    fn empty_chart_renders_placeholder() {
        let svg = chart_for(&[]).render_svg(400, 300).unwrap();
        assert!(svg.contains("No reviews"));
    }

    #[test]
    fn wedge_spans_requested_angles() {
        let points = wedge_points((100, 100), 50.0, 0.0, 90.0);
        assert_eq!(points[0], (100, 100));
        assert_eq!(points[1], (150, 100));
        assert_eq!(*points.last().unwrap(), (100, 50));
    }
}
