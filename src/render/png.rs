use log::debug;
use rayon::prelude::*;

use super::font::{write_text_centered, write_text_right};
use super::{format_bp, nice_ticks, Figure, Frame, Shape, CHAR_SIZE, TICK_LEN};
use crate::color::Rgb;
use crate::error::Result;

const BLACK: Rgb = (0, 0, 0);

/// Pixel rectangle that polygon fills are clipped to.
struct Clip {
    x0: usize,
    x1: usize,
    y0: usize,
    y1: usize,
}

impl Clip {
    fn of(frame: &Frame, width: usize, height: usize) -> Self {
        Clip {
            x0: frame.left.floor().max(0.0) as usize,
            x1: ((frame.left + frame.plot_w).ceil().max(0.0) as usize).min(width),
            y0: frame.top.floor().max(0.0) as usize,
            y1: ((frame.top + frame.plot_h).ceil().max(0.0) as usize).min(height),
        }
    }
}

/// Rasterize the figure into a packed RGB buffer of `width * height * 3` bytes.
pub fn render_png(figure: &Figure) -> Result<Vec<u8>> {
    let frame = figure.frame()?;
    let shapes = frame.shapes(figure.layers());
    let width = figure.width as usize;
    let height = figure.height as usize;
    let clip = Clip::of(&frame, width, height);

    debug!("Rasterizing {} polygons into {}x{}", shapes.len(), width, height);

    let mut buffer = vec![255u8; width * height * 3];
    buffer
        .par_chunks_mut((width * 3).max(1))
        .enumerate()
        .for_each(|(y, row)| {
            if y < clip.y0 || y >= clip.y1 {
                return;
            }
            let cy = y as f64 + 0.5;
            let mut mask = Vec::new();
            // layer order is preserved within a row
            for shape in &shapes {
                paint_row(row, shape, cy, &clip, &mut mask);
            }
        });

    draw_axes(&mut buffer, figure, &frame);
    Ok(buffer)
}

fn paint_row(row: &mut [u8], shape: &Shape, cy: f64, clip: &Clip, mask: &mut Vec<bool>) {
    let half = (shape.line_width.max(0.0) / 2.0) as f64;
    let (mut xmin, mut xmax) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &shape.ring {
        xmin = xmin.min(x);
        xmax = xmax.max(x);
        ymin = ymin.min(y);
        ymax = ymax.max(y);
    }
    if cy < ymin - half || cy > ymax + half {
        return;
    }

    let lo = ((xmin - half).floor().max(clip.x0 as f64)) as usize;
    let hi = (((xmax + half).ceil() + 1.0).max(0.0) as usize).min(clip.x1);
    if lo >= hi {
        return;
    }
    mask.clear();
    mask.resize(hi - lo, false);
    let mut mark = |first: f64, last: f64| {
        let first = first.max(lo as f64) as usize;
        let last = last.min(hi as f64).max(0.0) as usize;
        for x in first..last.max(first) {
            mask[x - lo] = true;
        }
    };

    // even-odd fill sampled at pixel centers
    let mut crossings: Vec<f64> = shape
        .ring
        .windows(2)
        .filter(|w| (w[0].1 <= cy) != (w[1].1 <= cy))
        .map(|w| {
            let (a, b) = (w[0], w[1]);
            a.0 + (cy - a.1) / (b.1 - a.1) * (b.0 - a.0)
        })
        .collect();
    crossings.sort_by(|a, b| a.total_cmp(b));
    for pair in crossings.chunks_exact(2) {
        let (l, r) = (pair[0], pair[1]);
        let mut first = (l - 0.5).ceil();
        let mut last = (r - 0.5).ceil();
        // features narrower than a pixel keep one column
        if last <= first && r > l {
            first = ((l + r) / 2.0).floor();
            last = first + 1.0;
        }
        mark(first, last);
    }

    if half > 0.0 {
        for w in shape.ring.windows(2) {
            let (a, b) = (w[0], w[1]);
            for x in lo..hi {
                if segment_distance((x as f64 + 0.5, cy), a, b) <= half {
                    mark(x as f64, x as f64 + 1.0);
                }
            }
        }
    }

    let alpha = shape.alpha.clamp(0.0, 1.0);
    for (offset, &on) in mask.iter().enumerate() {
        if on {
            let idx = (lo + offset) * 3;
            blend(&mut row[idx..idx + 3], shape.color, alpha);
        }
    }
}

fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len2 = dx * dx + dy * dy;
    let t = if len2 > 0.0 {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let (qx, qy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - qx).powi(2) + (p.1 - qy).powi(2)).sqrt()
}

fn blend(pixel: &mut [u8], color: Rgb, alpha: f32) {
    let mix = |src: u8, dst: u8| (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round() as u8;
    pixel[0] = mix(color.0, pixel[0]);
    pixel[1] = mix(color.1, pixel[1]);
    pixel[2] = mix(color.2, pixel[2]);
}

fn set_pixel(buffer: &mut [u8], width: usize, x: i64, y: i64, rgb: Rgb) {
    let height = buffer.len() / (width * 3).max(1);
    if x < 0 || y < 0 || x as usize >= width || y as usize >= height {
        return;
    }
    let idx = (y as usize * width + x as usize) * 3;
    buffer[idx] = rgb.0;
    buffer[idx + 1] = rgb.1;
    buffer[idx + 2] = rgb.2;
}

/// Frame around the plot area, chromosome labels on the left, bp ticks below.
fn draw_axes(buffer: &mut [u8], figure: &Figure, frame: &Frame) {
    let width = figure.width as usize;
    let tick = TICK_LEN as i64;
    let char_size = CHAR_SIZE as i64;

    let lx = frame.left.floor() as i64 - 1;
    let rx = (frame.left + frame.plot_w).ceil() as i64;
    let ty = frame.top.floor() as i64 - 1;
    let by = (frame.top + frame.plot_h).ceil() as i64;

    for x in lx..=rx {
        set_pixel(buffer, width, x, ty, BLACK);
        set_pixel(buffer, width, x, by, BLACK);
    }
    for y in ty..=by {
        set_pixel(buffer, width, lx, y, BLACK);
        set_pixel(buffer, width, rx, y, BLACK);
    }

    for (label, y) in figure.yticks() {
        let py = frame.y_px(*y).round() as i64;
        for x in (lx - tick)..lx {
            set_pixel(buffer, width, x, py, BLACK);
        }
        write_text_right(buffer, figure.width, lx - tick - 2, py - char_size / 2, label);
    }

    for v in nice_ticks(frame.bounds.xmin, frame.bounds.xmax, 5) {
        let px = frame.x_px(v).round() as i64;
        for y in by..=(by + tick) {
            set_pixel(buffer, width, px, y, BLACK);
        }
        write_text_centered(buffer, figure.width, px, by + tick + 2, &format_bp(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::BatchStyle;
    use crate::render::tests::figure_with;

    const FILL_ONLY: BatchStyle = BatchStyle {
        alpha: 1.0,
        line_width: 0.0,
    };

    fn pixel(buffer: &[u8], width: u32, x: usize, y: usize) -> Rgb {
        let idx = (y * width as usize + x) * 3;
        (buffer[idx], buffer[idx + 1], buffer[idx + 2])
    }

    fn center(frame: &Frame) -> (usize, usize) {
        (
            (frame.left + frame.plot_w / 2.0) as usize,
            (frame.top + frame.plot_h / 2.0) as usize,
        )
    }

    #[test]
    fn buffer_has_requested_size() {
        let fig = figure_with(&[("chr1", 0.0, 10.0, 0.0, 1.0, (255, 0, 0))], FILL_ONLY);
        let buffer = render_png(&fig).unwrap();
        assert_eq!(buffer.len(), 200 * 100 * 3);
    }

    #[test]
    fn rectangle_fills_plot_area() {
        let fig = figure_with(&[("chr1", 0.0, 10.0, 0.0, 1.0, (255, 0, 0))], FILL_ONLY);
        let frame = fig.frame().unwrap();
        let buffer = render_png(&fig).unwrap();

        let (cx, cy) = center(&frame);
        assert_eq!(pixel(&buffer, 200, cx, cy), (255, 0, 0));
        assert_eq!(pixel(&buffer, 200, frame.left as usize + 1, frame.top as usize + 1), (255, 0, 0));
        // margins stay white
        assert_eq!(pixel(&buffer, 200, 199, 0), (255, 255, 255));
    }

    #[test]
    fn alpha_blends_over_white() {
        let style = BatchStyle {
            alpha: 0.5,
            line_width: 0.0,
        };
        let fig = figure_with(&[("chr1", 0.0, 10.0, 0.0, 1.0, (0, 0, 0))], style);
        let frame = fig.frame().unwrap();
        let buffer = render_png(&fig).unwrap();
        let (cx, cy) = center(&frame);
        assert_eq!(pixel(&buffer, 200, cx, cy), (128, 128, 128));
    }

    #[test]
    fn later_layers_paint_over_earlier() {
        let fig = figure_with(
            &[
                ("chr1", 0.0, 10.0, 0.0, 1.0, (255, 0, 0)),
                ("chr1", 0.0, 10.0, 0.0, 1.0, (0, 0, 255)),
            ],
            FILL_ONLY,
        );
        let frame = fig.frame().unwrap();
        let buffer = render_png(&fig).unwrap();
        let (cx, cy) = center(&frame);
        assert_eq!(pixel(&buffer, 200, cx, cy), (0, 0, 255));
    }

    #[test]
    fn sub_pixel_features_stay_visible() {
        let fig = figure_with(
            &[
                ("chr1", 0.0, 1_000_000.0, 0.0, 1.0, (255, 255, 255)),
                ("chr2", 500_000.0, 500_010.0, 2.0, 3.0, (0, 128, 0)),
            ],
            FILL_ONLY,
        );
        let frame = fig.frame().unwrap();
        let buffer = render_png(&fig).unwrap();
        let x = frame.x_px(500_005.0).floor() as usize;
        let y = frame.y_px(2.5) as usize;
        assert_eq!(pixel(&buffer, 200, x, y), (0, 128, 0));
    }

    #[test]
    fn outline_widens_thin_features() {
        let outlined = BatchStyle {
            alpha: 1.0,
            line_width: 3.0,
        };
        let fig = figure_with(
            &[
                ("chr1", 0.0, 1_000.0, 0.0, 1.0, (255, 255, 255)),
                ("chr2", 500.0, 500.0, 2.0, 3.0, (0, 0, 0)),
            ],
            outlined,
        );
        let frame = fig.frame().unwrap();
        let buffer = render_png(&fig).unwrap();
        let x = frame.x_px(500.0).floor() as usize;
        let y = frame.y_px(2.5) as usize;
        assert_eq!(pixel(&buffer, 200, x, y), (0, 0, 0));
    }

    #[test]
    fn axes_draw_a_frame() {
        let fig = figure_with(&[("chr1", 0.0, 10.0, 0.0, 1.0, (255, 255, 255))], FILL_ONLY);
        let frame = fig.frame().unwrap();
        let buffer = render_png(&fig).unwrap();
        let lx = frame.left.floor() as usize - 1;
        let (_, cy) = center(&frame);
        assert_eq!(pixel(&buffer, 200, lx, cy), BLACK);
    }
}
