use std::fmt::Write;

use super::{escape_xml, format_bp, nice_ticks, Figure, CHAR_SIZE, TICK_LEN};
use crate::color::to_hex;
use crate::error::Result;

/// Render the figure as a standalone SVG document.
pub fn render_svg(figure: &Figure) -> Result<String> {
    let frame = figure.frame()?;
    let font_size = CHAR_SIZE as f64 * 1.25;
    let (w, h) = (figure.width, figure.height);

    let mut svg = String::new();
    // fmt::Write into a String cannot fail
    let _ = write!(
        svg,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">
<style>
  .label {{ font-family: 'DejaVu Sans', Arial, sans-serif; font-size: {font_size}px; }}
</style>
<rect width="100%" height="100%" fill="white"/>
<clipPath id="plot-area"><rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}"/></clipPath>
<g clip-path="url(#plot-area)">
"#,
        frame.left, frame.top, frame.plot_w, frame.plot_h
    );

    for shape in frame.shapes(figure.layers()) {
        let points: Vec<String> = shape
            .ring
            .iter()
            .map(|(x, y)| format!("{:.2},{:.2}", x, y))
            .collect();
        let fill = to_hex(shape.color);
        let stroke = if shape.line_width > 0.0 {
            format!(r#"stroke="{}" stroke-width="{}""#, fill, shape.line_width)
        } else {
            r#"stroke="none""#.to_string()
        };
        let _ = writeln!(
            svg,
            r#"<polygon points="{}" fill="{}" fill-opacity="{}" {}/>"#,
            points.join(" "),
            fill,
            shape.alpha,
            stroke
        );
    }
    svg.push_str("</g>\n");

    let _ = writeln!(
        svg,
        r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black" stroke-width="1"/>"#,
        frame.left, frame.top, frame.plot_w, frame.plot_h
    );

    for (label, y) in figure.yticks() {
        let py = frame.y_px(*y);
        let _ = writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{py:.2}" x2="{:.2}" y2="{py:.2}" stroke="black" stroke-width="1"/>"#,
            frame.left - TICK_LEN,
            frame.left
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{:.2}" class="label" text-anchor="end" dominant-baseline="middle">{}</text>"#,
            frame.left - TICK_LEN - 2.0,
            py,
            escape_xml(label)
        );
    }

    let bottom = frame.top + frame.plot_h;
    for v in nice_ticks(frame.bounds.xmin, frame.bounds.xmax, 5) {
        let px = frame.x_px(v);
        let _ = writeln!(
            svg,
            r#"<line x1="{px:.2}" y1="{bottom:.2}" x2="{px:.2}" y2="{:.2}" stroke="black" stroke-width="1"/>"#,
            bottom + TICK_LEN
        );
        let _ = writeln!(
            svg,
            r#"<text x="{px:.2}" y="{:.2}" class="label" text-anchor="middle" dominant-baseline="hanging">{}</text>"#,
            bottom + TICK_LEN + 2.0,
            format_bp(v)
        );
    }

    svg.push_str("</svg>\n");
    Ok(svg)
}
