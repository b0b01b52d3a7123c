use clap::ValueEnum;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::table::Interval;

pub type Rgb = (u8, u8, u8);

/// matplotlib's qualitative "Paired" colormap
pub const PAIRED: [Rgb; 12] = [
    (166, 206, 227),
    (31, 120, 180),
    (178, 223, 138),
    (51, 160, 44),
    (251, 154, 153),
    (227, 26, 28),
    (253, 191, 111),
    (255, 127, 0),
    (202, 178, 214),
    (106, 61, 154),
    (255, 255, 153),
    (177, 89, 40),
];

/// Giemsa stain codes and their band fill
const STAIN_COLORS: [(&str, Rgb); 8] = [
    ("gneg", (255, 255, 255)),
    ("gpos25", (153, 153, 153)),
    ("gpos50", (102, 102, 102)),
    ("gpos75", (51, 51, 51)),
    ("gpos100", (0, 0, 0)),
    ("acen", (204, 102, 102)),
    ("gvar", (204, 204, 204)),
    ("stalk", (230, 230, 230)),
];

const UNKNOWN_STAIN: Rgb = (128, 128, 128);

pub const DEFAULT_GENE_COLOR: Rgb = (0x22, 0x43, 0xa8);

/// How each record in a track gets its fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorScheme {
    /// Cycle through the Paired colormap by row.
    Paired,
    /// Look up the Giemsa stain column.
    Stain,
    /// Hash the feature name.
    Name,
    /// A single color for every record.
    Fixed,
}

pub fn paired_color(row: usize) -> Rgb {
    PAIRED[row % PAIRED.len()]
}

pub fn stain_color(stain: Option<&str>) -> Rgb {
    stain
        .and_then(|code| STAIN_COLORS.iter().find(|(name, _)| *name == code))
        .map(|(_, rgb)| *rgb)
        .unwrap_or(UNKNOWN_STAIN)
}

/// SHA-256 derived color, normalized and brightened so it stays readable.
pub fn name_color(name: &str) -> Rgb {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let digest = hasher.finalize();

    let mut r = digest[24] as f32 / 255.0;
    let mut g = digest[8] as f32 / 255.0;
    let mut b = digest[16] as f32 / 255.0;

    let sum = r + g + b;
    if sum > 0.0 {
        r /= sum;
        g /= sum;
        b /= sum;
    }

    let max_component = r.max(g).max(b);
    let f = if max_component > 0.0 {
        1.5f32.min(1.0 / max_component)
    } else {
        1.0
    };

    (
        (255.0 * (r * f).min(1.0)).round() as u8,
        (255.0 * (g * f).min(1.0)).round() as u8,
        (255.0 * (b * f).min(1.0)).round() as u8,
    )
}

/// Parse `#RRGGBB` or `R,G,B`.
pub fn parse_color(s: &str) -> Result<Rgb> {
    let s = s.trim();
    let invalid = || Error::InvalidColor(s.to_string());

    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        return Ok((channel(0)?, channel(2)?, channel(4)?));
    }

    let parts: Vec<u8> = s
        .split(',')
        .map(|p| p.trim().parse::<u8>().map_err(|_| invalid()))
        .collect::<Result<_>>()?;
    match parts.as_slice() {
        [r, g, b] => Ok((*r, *g, *b)),
        _ => Err(invalid()),
    }
}

/// Build the per-record color function handed to the layout.
pub fn color_fn(scheme: ColorScheme, fixed: Rgb) -> impl FnMut(usize, &Interval) -> Rgb {
    move |row: usize, interval: &Interval| match scheme {
        ColorScheme::Paired => paired_color(row),
        ColorScheme::Stain => stain_color(interval.stain.as_deref()),
        ColorScheme::Name => name_color(interval.name.as_deref().unwrap_or(interval.chrom.as_str())),
        ColorScheme::Fixed => fixed,
    }
}

/// Hex form used in SVG output.
pub fn to_hex(rgb: Rgb) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb.0, rgb.1, rgb.2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paired_cycles_every_twelve_rows() {
        assert_eq!(paired_color(0), (166, 206, 227));
        assert_eq!(paired_color(11), (177, 89, 40));
        assert_eq!(paired_color(12), paired_color(0));
        assert_eq!(paired_color(29), paired_color(5));
    }

    #[test]
    fn stain_lookup() {
        assert_eq!(stain_color(Some("gneg")), (255, 255, 255));
        assert_eq!(stain_color(Some("gpos100")), (0, 0, 0));
        assert_eq!(stain_color(Some("acen")), (204, 102, 102));
        assert_eq!(stain_color(Some("gpos33")), UNKNOWN_STAIN);
        assert_eq!(stain_color(None), UNKNOWN_STAIN);
    }

    #[test]
    fn name_color_is_deterministic_and_bright() {
        let a = name_color("BRCA2");
        assert_eq!(a, name_color("BRCA2"));
        let max = a.0.max(a.1).max(a.2);
        assert!(max > 0);
    }

    #[test]
    fn parses_both_color_syntaxes() {
        assert_eq!(parse_color("#2243a8").unwrap(), DEFAULT_GENE_COLOR);
        assert_eq!(parse_color(" 10, 20 ,30 ").unwrap(), (10, 20, 30));
        assert!(parse_color("#22").is_err());
        assert!(parse_color("1,2").is_err());
        assert!(parse_color("300,0,0").is_err());
        assert!(parse_color("#gg0000").is_err());
    }

    #[test]
    fn color_fn_dispatches_on_scheme() {
        let mut row = Interval::new("chr1", 0, 10);
        row.stain = Some("gpos50".to_string());

        let mut by_stain = color_fn(ColorScheme::Stain, (0, 0, 0));
        assert_eq!(by_stain(3, &row), (102, 102, 102));

        let mut by_row = color_fn(ColorScheme::Paired, (0, 0, 0));
        assert_eq!(by_row(3, &row), PAIRED[3]);

        let mut fixed = color_fn(ColorScheme::Fixed, (1, 2, 3));
        assert_eq!(fixed(3, &row), (1, 2, 3));

        let mut by_name = color_fn(ColorScheme::Name, (0, 0, 0));
        assert_eq!(by_name(0, &row), name_color("chr1"));
    }

    #[test]
    fn hex_output() {
        assert_eq!(to_hex((255, 0, 16)), "#ff0010");
    }
}
