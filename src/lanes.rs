use log::warn;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::layout::LaneOffsets;

/// Vertical geometry shared by the ideogram and gene tracks, in data units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGeometry {
    pub chrom_height: f64,
    pub chrom_spacing: f64,
    pub gene_height: f64,
    /// Gap between the top of a gene track and its ideogram.
    pub gene_padding: f64,
}

impl Default for LaneGeometry {
    fn default() -> Self {
        LaneGeometry {
            chrom_height: 1.0,
            chrom_spacing: 1.0,
            gene_height: 0.4,
            gene_padding: 0.1,
        }
    }
}

impl LaneGeometry {
    /// Warn when the gene track would spill into the next lane.
    pub fn check(&self) {
        if self.gene_height + self.gene_padding > self.chrom_spacing {
            warn!(
                "gene height {} plus padding {} exceeds chromosome spacing {}; tracks will overlap",
                self.gene_height, self.gene_padding, self.chrom_spacing
            );
        }
    }
}

/// Lane offsets for both tracks plus the tick positions of each ideogram.
#[derive(Debug, Clone)]
pub struct Lanes {
    pub chrom_ybase: LaneOffsets,
    pub gene_ybase: LaneOffsets,
    /// Whitelist order, top to bottom, with each ideogram's vertical center.
    pub centers: Vec<(String, f64)>,
}

/// `chr1`..`chr22`, `chrX`, `chrY`
pub fn default_chromosomes() -> Vec<String> {
    (1..=22)
        .map(|i| i.to_string())
        .chain(["X".to_string(), "Y".to_string()])
        .map(|s| format!("chr{}", s))
        .collect()
}

/// Read an ordered chromosome list, one name per line.
pub fn load_chromosomes(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut chroms = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            chroms.push(line.to_string());
        }
    }

    Ok(chroms)
}

/// Assign lanes bottom-up over the reversed list so the first chromosome is drawn on top.
pub fn build_lanes(chromosomes: &[String], geometry: &LaneGeometry) -> Lanes {
    let mut chrom_ybase = LaneOffsets::default();
    let mut gene_ybase = LaneOffsets::default();
    let mut ybase = 0.0;

    for chrom in chromosomes.iter().rev() {
        chrom_ybase.insert(chrom.clone(), ybase);
        gene_ybase.insert(
            chrom.clone(),
            ybase - geometry.gene_height - geometry.gene_padding,
        );
        ybase += geometry.chrom_height + geometry.chrom_spacing;
    }

    let centers = chromosomes
        .iter()
        .map(|c| (c.clone(), chrom_ybase[c] + geometry.chrom_height / 2.0))
        .collect();

    Lanes {
        chrom_ybase,
        gene_ybase,
        centers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_list_has_24_chromosomes() {
        let chroms = default_chromosomes();
        assert_eq!(chroms.len(), 24);
        assert_eq!(chroms[0], "chr1");
        assert_eq!(chroms[21], "chr22");
        assert_eq!(chroms[22], "chrX");
        assert_eq!(chroms[23], "chrY");
    }

    #[test]
    fn first_chromosome_is_on_top() {
        let chroms: Vec<String> = ["chr1", "chr2", "chr3"].iter().map(|s| s.to_string()).collect();
        let lanes = build_lanes(&chroms, &LaneGeometry::default());

        assert_eq!(lanes.chrom_ybase["chr3"], 0.0);
        assert_eq!(lanes.chrom_ybase["chr2"], 2.0);
        assert_eq!(lanes.chrom_ybase["chr1"], 4.0);
        assert!((lanes.gene_ybase["chr1"] - 3.5).abs() < 1e-12);
        assert!((lanes.gene_ybase["chr3"] + 0.5).abs() < 1e-12);

        let labels: Vec<&str> = lanes.centers.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(labels, vec!["chr1", "chr2", "chr3"]);
        assert_eq!(lanes.centers[0].1, 4.5);
        assert_eq!(lanes.centers[2].1, 0.5);
    }

    #[test]
    fn custom_geometry_spacing() {
        let chroms = vec!["a".to_string(), "b".to_string()];
        let geometry = LaneGeometry {
            chrom_height: 2.0,
            chrom_spacing: 3.0,
            gene_height: 1.0,
            gene_padding: 0.5,
        };
        let lanes = build_lanes(&chroms, &geometry);
        assert_eq!(lanes.chrom_ybase["a"], 5.0);
        assert_eq!(lanes.gene_ybase["a"], 3.5);
        assert_eq!(lanes.centers[0], ("a".to_string(), 6.0));
    }

    #[test]
    fn loads_chromosome_list() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chr2\n\n# skip\nchr1 ").unwrap();
        let chroms = load_chromosomes(file.path()).unwrap();
        assert_eq!(chroms, vec!["chr2".to_string(), "chr1".to_string()]);
    }
}
