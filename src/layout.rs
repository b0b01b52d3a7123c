//! Feature layout: turns interval records into per-chromosome polygon batches.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::color::Rgb;
use crate::table::Interval;

pub type Point = (f64, f64);

/// A closed rectangle ring; the first vertex is repeated at the end.
pub type Ring = [Point; 5];

/// Category -> base y coordinate of its lane.
pub type LaneOffsets = FxHashMap<String, f64>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("chromosome '{0}' has no lane offset")]
    MissingLane(String),
}

/// Drawing hints carried alongside a batch, not interpreted by the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchStyle {
    pub alpha: f32,
    pub line_width: f32,
}

impl Default for BatchStyle {
    fn default() -> Self {
        BatchStyle {
            alpha: 1.0,
            line_width: 1.0,
        }
    }
}

/// All polygons for one lane with their parallel fill colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonBatch {
    pub category: String,
    pub polygons: Vec<Ring>,
    pub colors: Vec<Rgb>,
    pub style: BatchStyle,
}

fn effective_width(interval: &Interval) -> u64 {
    interval
        .width
        .unwrap_or_else(|| interval.end.saturating_sub(interval.start))
}

fn rectangle(x: f64, width: f64, y0: f64, y1: f64) -> Ring {
    [(x, y0), (x, y1), (x + width, y1), (x + width, y0), (x, y0)]
}

/// Stable partition of row indices by chromosome, in order of first appearance.
fn group_by_chrom(intervals: &[Interval]) -> Vec<(&str, Vec<usize>)> {
    let mut slot: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (idx, interval) in intervals.iter().enumerate() {
        let chrom = interval.chrom.as_str();
        let g = *slot.entry(chrom).or_insert_with(|| {
            groups.push((chrom, Vec::new()));
            groups.len() - 1
        });
        groups[g].1.push(idx);
    }
    groups
}

/// Lazy sequence of polygon batches, one per chromosome in the input.
pub struct Batches<'a, F> {
    intervals: &'a [Interval],
    offsets: &'a LaneOffsets,
    height: f64,
    style: BatchStyle,
    color: F,
    groups: std::vec::IntoIter<(&'a str, Vec<usize>)>,
}

impl<'a, F> Iterator for Batches<'a, F>
where
    F: FnMut(usize, &Interval) -> Rgb,
{
    type Item = Result<PolygonBatch, LayoutError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (chrom, rows) = self.groups.next()?;

        let Some(&y0) = self.offsets.get(chrom) else {
            return Some(Err(LayoutError::MissingLane(chrom.to_string())));
        };
        let y1 = y0 + self.height;

        let mut polygons = Vec::with_capacity(rows.len());
        let mut colors = Vec::with_capacity(rows.len());
        for idx in rows {
            let interval = &self.intervals[idx];
            let width = effective_width(interval) as f64;
            polygons.push(rectangle(interval.start as f64, width, y0, y1));
            colors.push((self.color)(idx, interval));
        }

        Some(Ok(PolygonBatch {
            category: chrom.to_string(),
            polygons,
            colors,
            style: self.style,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.groups.size_hint()
    }
}

/// Lay out `intervals` as rectangles of constant `height` anchored at each
/// chromosome's lane offset. `color` receives the row index and record.
///
/// The caller's records are never modified. A chromosome missing from
/// `offsets` yields `LayoutError::MissingLane` in place of its batch.
pub fn layout<'a, F>(
    intervals: &'a [Interval],
    offsets: &'a LaneOffsets,
    height: f64,
    style: BatchStyle,
    color: F,
) -> Batches<'a, F>
where
    F: FnMut(usize, &Interval) -> Rgb,
{
    Batches {
        intervals,
        offsets,
        height,
        style,
        color,
        groups: group_by_chrom(intervals).into_iter(),
    }
}
