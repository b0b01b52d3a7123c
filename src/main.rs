mod color;
mod error;
mod lanes;
mod layout;
mod render;
mod table;

use clap::Parser;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use color::{color_fn, parse_color, ColorScheme, Rgb, DEFAULT_GENE_COLOR};
use error::Result;
use lanes::{build_lanes, default_chromosomes, load_chromosomes, LaneGeometry};
use layout::{layout, BatchStyle, LaneOffsets};
use render::Figure;
use table::{filter_to_whitelist, load_intervals, Interval, TableFormat};

#[derive(Parser)]
#[command(name = "ideolook")]
#[command(about = "Draw chromosome ideograms and feature tracks as stacked lanes.", long_about = None)]
struct Args {
    // MANDATORY OPTIONS
    /// Load ideogram bands (or any features) from this FILE.
    #[arg(short = 'i', long = "ideogram", value_name = "FILE")]
    ideogram: PathBuf,

    /// Write the figure to this FILE (PNG or SVG based on extension).
    #[arg(short = 'o', long = "out", value_name = "FILE")]
    out: PathBuf,

    // Input Options
    /// Column layout of the ideogram file (guessed from the extension if omitted).
    #[arg(long = "ideogram-format", value_enum, value_name = "FORMAT")]
    ideogram_format: Option<TableFormat>,

    /// Draw a second track of features (e.g. genes) under each chromosome.
    #[arg(short = 'g', long = "genes", value_name = "FILE")]
    genes: Option<PathBuf>,

    /// Column layout of the gene file (guessed from the extension if omitted).
    #[arg(long = "genes-format", value_enum, value_name = "FORMAT", requires = "genes")]
    genes_format: Option<TableFormat>,

    /// Ordered list of chromosomes to draw, one per line (default chr1..chr22, chrX, chrY).
    #[arg(short = 'c', long = "chromosomes", value_name = "FILE")]
    chromosomes: Option<PathBuf>,

    // Color Options
    /// How ideogram bands are colored.
    #[arg(long = "ideogram-colors", value_enum, default_value_t = ColorScheme::Paired)]
    ideogram_colors: ColorScheme,

    /// Fill used with --ideogram-colors fixed (#RRGGBB or R,G,B).
    #[arg(long = "ideogram-color", value_name = "COLOR", default_value = "128,128,128")]
    ideogram_color: String,

    /// How gene features are colored.
    #[arg(long = "gene-colors", value_enum, default_value_t = ColorScheme::Fixed)]
    gene_colors: ColorScheme,

    /// Fill used with --gene-colors fixed (#RRGGBB or R,G,B).
    #[arg(long = "gene-color", value_name = "COLOR")]
    gene_color: Option<String>,

    // Lane Geometry Options
    /// Height of each ideogram, in lane units.
    #[arg(long = "chrom-height", value_name = "FLOAT", default_value_t = 1.0)]
    chrom_height: f64,

    /// Spacing between consecutive ideograms, in lane units.
    #[arg(long = "chrom-spacing", value_name = "FLOAT", default_value_t = 1.0)]
    chrom_spacing: f64,

    /// Height of the gene track; should fit inside the chromosome spacing.
    #[arg(long = "gene-height", value_name = "FLOAT", default_value_t = 0.4)]
    gene_height: f64,

    /// Gap between the top of a gene track and its ideogram.
    #[arg(long = "gene-padding", value_name = "FLOAT", default_value_t = 0.1)]
    gene_padding: f64,

    // Style Options
    /// Outline width in pixels for ideogram bands.
    #[arg(long = "line-width", value_name = "FLOAT", default_value_t = 1.0)]
    line_width: f32,

    /// Opacity of gene features.
    #[arg(long = "gene-alpha", value_name = "FLOAT", default_value_t = 0.5)]
    gene_alpha: f32,

    /// Outline width in pixels for gene features.
    #[arg(long = "gene-line-width", value_name = "FLOAT", default_value_t = 0.0)]
    gene_line_width: f32,

    // Image Options
    /// Set the width in pixels of the output image.
    #[arg(short = 'x', long = "width", value_name = "N", default_value_t = 600,
          value_parser = clap::value_parser!(u32).range(32..))]
    width: u32,

    /// Set the height in pixels of the output image.
    #[arg(short = 'y', long = "height", value_name = "N", default_value_t = 800,
          value_parser = clap::value_parser!(u32).range(32..))]
    height: u32,

    // Threading
    /// Number of threads to use for rasterization.
    #[arg(short = 't', long = "threads", value_name = "N")]
    threads: Option<usize>,

    // Logging
    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1)]
    verbose: u8,
}

impl Args {
    fn geometry(&self) -> LaneGeometry {
        LaneGeometry {
            chrom_height: self.chrom_height,
            chrom_spacing: self.chrom_spacing,
            gene_height: self.gene_height,
            gene_padding: self.gene_padding,
        }
    }
}

/// Load a table and keep only whitelisted chromosomes.
fn load_track(path: &Path, format: Option<TableFormat>, whitelist: &[String]) -> Result<Vec<Interval>> {
    let format = format.unwrap_or_else(|| TableFormat::from_path(path));
    let rows = load_intervals(path, format)?;
    let total = rows.len();
    let kept = filter_to_whitelist(rows, whitelist);
    info!("Kept {} of {} records from {:?}", kept.len(), total, path);
    if kept.is_empty() && total > 0 {
        warn!("No records in {:?} are on the selected chromosomes", path);
    }
    Ok(kept)
}

/// Lay out one track and add every batch to the figure, stopping at the first error.
fn add_track<F>(
    figure: &mut Figure,
    rows: &[Interval],
    offsets: &LaneOffsets,
    height: f64,
    style: BatchStyle,
    color: F,
) -> Result<usize>
where
    F: FnMut(usize, &Interval) -> Rgb,
{
    let mut count = 0;
    for batch in layout(rows, offsets, height, style, color) {
        let batch = batch?;
        debug!("{}: {} features", batch.category, batch.polygons.len());
        figure.add_batch(batch);
        count += 1;
    }
    Ok(count)
}

fn run(args: &Args) -> Result<()> {
    let chromosomes = match &args.chromosomes {
        Some(path) => load_chromosomes(path)?,
        None => default_chromosomes(),
    };
    debug!("Drawing {} chromosome lanes", chromosomes.len());

    let geometry = args.geometry();
    geometry.check();
    let lanes = build_lanes(&chromosomes, &geometry);

    let ideogram = load_track(&args.ideogram, args.ideogram_format, &chromosomes)?;
    let genes = match &args.genes {
        Some(path) => load_track(path, args.genes_format, &chromosomes)?,
        None => Vec::new(),
    };
    if ideogram.is_empty() && genes.is_empty() {
        return Err(error::Error::EmptyFigure);
    }

    let mut figure = Figure::new(args.width, args.height);

    info!("Adding ideograms...");
    let ideogram_fill = parse_color(&args.ideogram_color)?;
    let n = add_track(
        &mut figure,
        &ideogram,
        &lanes.chrom_ybase,
        geometry.chrom_height,
        BatchStyle {
            alpha: 1.0,
            line_width: args.line_width,
        },
        color_fn(args.ideogram_colors, ideogram_fill),
    )?;
    info!("Added {} ideogram lanes", n);

    if !genes.is_empty() {
        info!("Adding genes...");
        let gene_fill = match &args.gene_color {
            Some(c) => parse_color(c)?,
            None => DEFAULT_GENE_COLOR,
        };
        let n = add_track(
            &mut figure,
            &genes,
            &lanes.gene_ybase,
            geometry.gene_height,
            BatchStyle {
                alpha: args.gene_alpha,
                line_width: args.gene_line_width,
            },
            color_fn(args.gene_colors, gene_fill),
        )?;
        info!("Added {} gene lanes", n);
    }

    figure.set_yticks(lanes.centers);

    info!("Saving {} polygons to {:?}...", figure.polygon_count(), args.out);
    figure.save(&args.out)
}

fn main() {
    let args = Args::parse();

    // Initialize logger based on verbosity
    env_logger::Builder::new()
        .filter_level(match args.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    if let Some(threads) = args.threads {
        if let Err(e) = rayon::ThreadPoolBuilder::new().num_threads(threads).build_global() {
            warn!("Could not configure {} threads: {}", threads, e);
        }
    }

    info!("Starting visualization...");

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    info!("Done.");
}
