use clap::ValueEnum;
use log::{debug, info};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};

/// One genomic interval read from a feature table.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    /// Explicit extent; `end - start` is used when absent.
    pub width: Option<u64>,
    pub name: Option<String>,
    /// Giemsa stain code, only present for cytoband tables.
    pub stain: Option<String>,
}

impl Interval {
    pub fn new(chrom: &str, start: u64, end: u64) -> Self {
        Interval {
            chrom: chrom.to_string(),
            start,
            end,
            width: None,
            name: None,
            stain: None,
        }
    }
}

/// Column layout of an input table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormat {
    /// UCSC cytoBandIdeo: chrom, chromStart, chromEnd, name, gieStain.
    Cytoband,
    /// BED: chrom, start, end[, name, ...].
    Bed,
    /// GTF/GFF: seqname, source, feature, start, end, score, strand, frame, attributes.
    Gtf,
}

impl TableFormat {
    /// Guess the layout from a file extension, defaulting to cytoband.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "gtf" | "gff" | "gff3" => TableFormat::Gtf,
            "bed" => TableFormat::Bed,
            _ => TableFormat::Cytoband,
        }
    }

    fn min_columns(self) -> usize {
        match self {
            TableFormat::Cytoband => 3,
            TableFormat::Bed => 3,
            TableFormat::Gtf => 5,
        }
    }

    fn coordinate_columns(self) -> (usize, usize) {
        match self {
            TableFormat::Cytoband | TableFormat::Bed => (1, 2),
            TableFormat::Gtf => (3, 4),
        }
    }
}

pub fn load_intervals(path: &Path, format: TableFormat) -> Result<Vec<Interval>> {
    info!("Loading {:?} as {:?}...", path, format);
    let file = File::open(path)?;
    read_intervals(BufReader::new(file), format)
}

/// Parse tab-separated rows. Blank and `#` lines are skipped; the first
/// malformed row aborts with its 1-based line number.
pub fn read_intervals<R: BufRead>(reader: R, format: TableFormat) -> Result<Vec<Interval>> {
    let mut intervals = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_num = line_idx + 1;
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if format == TableFormat::Bed
            && (trimmed.starts_with("track") || trimmed.starts_with("browser"))
        {
            continue;
        }

        let parts: Vec<&str> = trimmed.split('\t').collect();
        if parts.len() < format.min_columns() {
            return Err(Error::Parse {
                line: line_num,
                message: format!(
                    "expected at least {} tab-separated columns, got {}",
                    format.min_columns(),
                    parts.len()
                ),
            });
        }

        let (start_col, end_col) = format.coordinate_columns();
        let start = parse_coordinate(parts[start_col], "start", line_num)?;
        let end = parse_coordinate(parts[end_col], "end", line_num)?;
        if end < start {
            return Err(Error::Parse {
                line: line_num,
                message: format!("end {} is before start {}", end, start),
            });
        }

        let mut interval = Interval::new(parts[0].trim(), start, end);
        match format {
            TableFormat::Cytoband => {
                interval.name = non_empty(parts.get(3));
                interval.stain = non_empty(parts.get(4));
            }
            TableFormat::Bed => {
                interval.name = non_empty(parts.get(3));
            }
            TableFormat::Gtf => {
                interval.name = parts.get(8).and_then(|attrs| gtf_feature_name(attrs));
            }
        }
        intervals.push(interval);
    }

    debug!("Parsed {} records", intervals.len());
    Ok(intervals)
}

fn parse_coordinate(field: &str, column: &str, line: usize) -> Result<u64> {
    field.trim().parse().map_err(|e| Error::Parse {
        line,
        message: format!("invalid {} '{}': {}", column, field, e),
    })
}

fn non_empty(field: Option<&&str>) -> Option<String> {
    field
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Pick a display name from GTF attributes: gene_name, then gene_id, then transcript_id.
fn gtf_feature_name(attributes: &str) -> Option<String> {
    let mut found: [Option<&str>; 3] = [None, None, None];
    for attr in attributes.split(';') {
        let attr = attr.trim();
        let Some((key, value)) = attr.split_once(char::is_whitespace) else {
            continue;
        };
        let value = value.trim().trim_matches('"');
        let slot = match key {
            "gene_name" => 0,
            "gene_id" => 1,
            "transcript_id" => 2,
            _ => continue,
        };
        if found[slot].is_none() && !value.is_empty() {
            found[slot] = Some(value);
        }
    }
    found.iter().flatten().next().map(|s| s.to_string())
}

/// Keep only rows on whitelisted chromosomes, in their original order.
pub fn filter_to_whitelist(intervals: Vec<Interval>, whitelist: &[String]) -> Vec<Interval> {
    let allowed: FxHashSet<&str> = whitelist.iter().map(String::as_str).collect();
    let before = intervals.len();
    let kept: Vec<Interval> = intervals
        .into_iter()
        .filter(|iv| allowed.contains(iv.chrom.as_str()))
        .collect();
    if kept.len() < before {
        debug!(
            "Dropped {} records on chromosomes outside the whitelist",
            before - kept.len()
        );
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CYTOBANDS: &str = "\
#chrom\tchromStart\tchromEnd\tname\tgieStain
chr1\t0\t2300000\tp36.33\tgneg
chr1\t2300000\t5300000\tp36.32\tgpos25

chr2\t0\t4400000\tp25.3\tgneg
";

    #[test]
    fn parses_cytobands() {
        let rows = read_intervals(Cursor::new(CYTOBANDS), TableFormat::Cytoband).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].chrom, "chr1");
        assert_eq!(rows[1].start, 2_300_000);
        assert_eq!(rows[1].end, 5_300_000);
        assert_eq!(rows[1].name.as_deref(), Some("p36.32"));
        assert_eq!(rows[1].stain.as_deref(), Some("gpos25"));
        assert_eq!(rows[1].width, None);
    }

    #[test]
    fn parses_bed_and_skips_headers() {
        let input = "track name=genes\nbrowser position chr1:1-100\nchr3\t10\t20\tBRCA\t0\t+\nchr3\t30\t45\n";
        let rows = read_intervals(Cursor::new(input), TableFormat::Bed).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("BRCA"));
        assert_eq!(rows[1].name, None);
        assert_eq!(rows[1].end, 45);
    }

    #[test]
    fn parses_gtf_coordinates_and_names() {
        let input = "chr1\thavana\texon\t11869\t12227\t.\t+\t.\tgene_id \"ENSG1\"; gene_name \"DDX11L1\";\n\
                     chrX\thavana\tgene\t100\t200\t.\t-\t.\ttranscript_id \"T1\";\n";
        let rows = read_intervals(Cursor::new(input), TableFormat::Gtf).unwrap();
        assert_eq!(rows[0].start, 11869);
        assert_eq!(rows[0].end, 12227);
        assert_eq!(rows[0].name.as_deref(), Some("DDX11L1"));
        assert_eq!(rows[1].name.as_deref(), Some("T1"));
    }

    #[test]
    fn reports_line_of_bad_coordinate() {
        let input = "chr1\t0\t10\nchr1\tabc\t20\n";
        let err = read_intervals(Cursor::new(input), TableFormat::Bed).unwrap_err();
        match err {
            Error::Parse { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("start"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejects_short_rows_and_reversed_intervals() {
        let short = read_intervals(Cursor::new("chr1\t5\n"), TableFormat::Bed);
        assert!(matches!(short, Err(Error::Parse { line: 1, .. })));

        let reversed = read_intervals(Cursor::new("chr1\t50\t10\n"), TableFormat::Bed);
        assert!(matches!(reversed, Err(Error::Parse { line: 1, .. })));
    }

    #[test]
    fn whitelist_filter_keeps_order() {
        let rows = vec![
            Interval::new("chr2", 0, 1),
            Interval::new("chrUn_gl000220", 0, 1),
            Interval::new("chr1", 5, 9),
            Interval::new("chr2", 3, 4),
        ];
        let whitelist = vec!["chr1".to_string(), "chr2".to_string()];
        let kept = filter_to_whitelist(rows, &whitelist);
        let summary: Vec<(&str, u64)> = kept.iter().map(|r| (r.chrom.as_str(), r.start)).collect();
        assert_eq!(summary, vec![("chr2", 0), ("chr1", 5), ("chr2", 3)]);
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_path(Path::new("a.GTF")), TableFormat::Gtf);
        assert_eq!(TableFormat::from_path(Path::new("genes.bed")), TableFormat::Bed);
        assert_eq!(TableFormat::from_path(Path::new("ideogram.txt")), TableFormat::Cytoband);
    }
}
