//! Drawing surface for polygon batches: a figure with tight data bounds,
//! written out as PNG or SVG.

mod font;
mod png;
mod svg;

use self::png::render_png;
use self::svg::render_svg;

use log::debug;
use std::path::Path;

use crate::color::Rgb;
use crate::error::{Error, Result};
use crate::layout::{PolygonBatch, Ring};

/// Glyph cell size in pixels for labels (the 5x8 font at 1x).
pub(crate) const CHAR_SIZE: u32 = 8;
const TICK_LEN: f64 = 4.0;
const PAD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bounds {
    fn include(&mut self, x: f64, y: f64) {
        self.xmin = self.xmin.min(x);
        self.xmax = self.xmax.max(x);
        self.ymin = self.ymin.min(y);
        self.ymax = self.ymax.max(y);
    }

    /// Degenerate extents get a unit span so the transform stays finite.
    fn widen_empty(mut self) -> Self {
        if self.xmax - self.xmin <= 0.0 {
            self.xmax = self.xmin + 1.0;
        }
        if self.ymax - self.ymin <= 0.0 {
            self.ymax = self.ymin + 1.0;
        }
        self
    }
}

/// Collected layers and axis labels, drawn in insertion order.
pub struct Figure {
    pub width: u32,
    pub height: u32,
    layers: Vec<PolygonBatch>,
    yticks: Vec<(String, f64)>,
}

impl Figure {
    pub fn new(width: u32, height: u32) -> Self {
        Figure {
            width,
            height,
            layers: Vec::new(),
            yticks: Vec::new(),
        }
    }

    pub fn add_batch(&mut self, batch: PolygonBatch) {
        self.layers.push(batch);
    }

    pub fn set_yticks(&mut self, ticks: Vec<(String, f64)>) {
        self.yticks = ticks;
    }

    pub fn layers(&self) -> &[PolygonBatch] {
        &self.layers
    }

    pub fn polygon_count(&self) -> usize {
        self.layers.iter().map(|l| l.polygons.len()).sum()
    }

    /// Tight box around every vertex; y is stretched to keep all ticks visible.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self.layers.iter().flat_map(|l| l.polygons.iter()).flatten();
        let &(x0, y0) = points.next()?;
        let mut bounds = Bounds {
            xmin: x0,
            xmax: x0,
            ymin: y0,
            ymax: y0,
        };
        for &(x, y) in points {
            bounds.include(x, y);
        }
        for (_, y) in &self.yticks {
            bounds.ymin = bounds.ymin.min(*y);
            bounds.ymax = bounds.ymax.max(*y);
        }
        Some(bounds.widen_empty())
    }

    /// Pixel layout of the plot area, or `EmptyFigure` if nothing was added.
    pub(crate) fn frame(&self) -> Result<Frame> {
        let bounds = self.bounds().ok_or(Error::EmptyFigure)?;
        let max_label = self.yticks.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let left = (max_label as u32 * CHAR_SIZE) as f64 + TICK_LEN + PAD;
        let top = PAD;
        let right = PAD + CHAR_SIZE as f64 * 2.0;
        let bottom = CHAR_SIZE as f64 + TICK_LEN + PAD;

        let frame = Frame {
            left,
            top,
            plot_w: (self.width as f64 - left - right).max(1.0),
            plot_h: (self.height as f64 - top - bottom).max(1.0),
            bounds,
        };
        debug!(
            "Data bounds x=[{}, {}] y=[{}, {}], plot area {:.0}x{:.0} at ({:.0}, {:.0})",
            bounds.xmin, bounds.xmax, bounds.ymin, bounds.ymax, frame.plot_w, frame.plot_h, left, top
        );
        Ok(frame)
    }

    pub(crate) fn yticks(&self) -> &[(String, f64)] {
        &self.yticks
    }

    /// Write PNG or SVG depending on the extension of `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let is_svg = path
            .extension()
            .map(|ext| ext.to_ascii_lowercase() == "svg")
            .unwrap_or(false);
        if is_svg {
            std::fs::write(path, render_svg(self)?)?;
        } else {
            let pixels = render_png(self)?;
            image::save_buffer(
                path,
                &pixels,
                self.width,
                self.height,
                image::ExtendedColorType::Rgb8,
            )?;
        }
        Ok(())
    }
}

/// A polygon projected to pixel space with its paint.
pub(crate) struct Shape {
    pub ring: Ring,
    pub color: Rgb,
    pub alpha: f32,
    pub line_width: f32,
}

/// Data-to-pixel transform for the plot area; y grows upward in data space.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub left: f64,
    pub top: f64,
    pub plot_w: f64,
    pub plot_h: f64,
    pub bounds: Bounds,
}

impl Frame {
    pub fn x_px(&self, x: f64) -> f64 {
        let b = &self.bounds;
        self.left + (x - b.xmin) / (b.xmax - b.xmin) * self.plot_w
    }

    pub fn y_px(&self, y: f64) -> f64 {
        let b = &self.bounds;
        self.top + (b.ymax - y) / (b.ymax - b.ymin) * self.plot_h
    }

    pub fn shapes(&self, layers: &[PolygonBatch]) -> Vec<Shape> {
        layers
            .iter()
            .flat_map(|layer| {
                layer
                    .polygons
                    .iter()
                    .zip(layer.colors.iter())
                    .map(move |(ring, &color)| Shape {
                        ring: ring.map(|(x, y)| (self.x_px(x), self.y_px(y))),
                        color,
                        alpha: layer.style.alpha,
                        line_width: layer.style.line_width,
                    })
            })
            .collect()
    }
}

/// Evenly spaced round tick values (1, 2 or 5 times a power of ten) inside `[min, max]`.
pub(crate) fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if span <= 0.0 || target == 0 {
        return vec![min];
    }
    let raw = span / target as f64;
    let mag = 10f64.powi(raw.log10().floor() as i32);
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * mag)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * mag);

    let mut ticks = Vec::new();
    let mut i = (min / step).ceil();
    while i * step <= max + step * 1e-9 {
        ticks.push(i * step);
        i += 1.0;
    }
    ticks
}

/// Compact base-pair label: `0`, `750`, `250k`, `1.5M`.
pub(crate) fn format_bp(v: f64) -> String {
    let (scaled, suffix) = if v.abs() >= 1e6 {
        (v / 1e6, "M")
    } else if v.abs() >= 1e3 {
        (v / 1e3, "k")
    } else {
        (v, "")
    };
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{}{}", rounded, suffix)
}

/// Escape special XML characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::BatchStyle;

    pub(crate) fn figure_with(rects: &[(&str, f64, f64, f64, f64, Rgb)], style: BatchStyle) -> Figure {
        let mut fig = Figure::new(200, 100);
        for &(chrom, x0, x1, y0, y1, color) in rects {
            fig.add_batch(PolygonBatch {
                category: chrom.to_string(),
                polygons: vec![[(x0, y0), (x0, y1), (x1, y1), (x1, y0), (x0, y0)]],
                colors: vec![color],
                style,
            });
        }
        fig
    }

    #[test]
    fn bounds_are_tight() {
        let fig = figure_with(
            &[
                ("chr1", 100.0, 500.0, 0.0, 1.0, (0, 0, 0)),
                ("chr2", 0.0, 300.0, 2.0, 3.0, (0, 0, 0)),
            ],
            BatchStyle::default(),
        );
        assert_eq!(
            fig.bounds(),
            Some(Bounds {
                xmin: 0.0,
                xmax: 500.0,
                ymin: 0.0,
                ymax: 3.0
            })
        );
        assert_eq!(fig.polygon_count(), 2);
    }

    #[test]
    fn ticks_extend_vertical_bounds() {
        let mut fig = figure_with(&[("chr1", 0.0, 10.0, 0.0, 1.0, (0, 0, 0))], BatchStyle::default());
        fig.set_yticks(vec![("chr1".into(), 0.5), ("chr9".into(), 4.5)]);
        assert_eq!(fig.bounds().unwrap().ymax, 4.5);
    }

    #[test]
    fn empty_figure_has_no_frame() {
        let fig = Figure::new(10, 10);
        assert!(fig.bounds().is_none());
        assert!(matches!(fig.frame(), Err(Error::EmptyFigure)));
    }

    #[test]
    fn frame_flips_y() {
        let fig = figure_with(&[("chr1", 0.0, 10.0, 0.0, 2.0, (0, 0, 0))], BatchStyle::default());
        let frame = fig.frame().unwrap();
        assert_eq!(frame.x_px(0.0), frame.left);
        assert_eq!(frame.x_px(10.0), frame.left + frame.plot_w);
        assert_eq!(frame.y_px(2.0), frame.top);
        assert_eq!(frame.y_px(0.0), frame.top + frame.plot_h);
    }

    #[test]
    fn nice_tick_steps() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(nice_ticks(0.0, 248_956_422.0, 5)[1], 50_000_000.0);
        assert_eq!(nice_ticks(3.0, 3.0, 5), vec![3.0]);
    }

    #[test]
    fn bp_labels() {
        assert_eq!(format_bp(0.0), "0");
        assert_eq!(format_bp(750.0), "750");
        assert_eq!(format_bp(250_000.0), "250k");
        assert_eq!(format_bp(1_500_000.0), "1.5M");
        assert_eq!(format_bp(50_000_000.0), "50M");
    }

    #[test]
    fn xml_escaping() {
        assert_eq!(escape_xml("a<b & 'c'"), "a&lt;b &amp; &apos;c&apos;");
    }
}
