//! Command-line coverage analysis of a GeoTIFF against country boundaries.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use raster_coverage::report::{self, histogram::DEFAULT_BINS, ChartMetric, Histogram};
use raster_coverage::{
    catalog, tags, Analysis, AnalysisParams, BoundarySet, Config, Crs, Error, GeoInfo,
    Outcome, Pipeline, RasterGrid, TiffReader, ValueRange,
};

#[derive(Parser, Debug)]
#[command(name = "raster-coverage")]
#[command(about = "Per-country coverage of raster cells within a value range")]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "RASTER_COVERAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory scanned for GeoTIFF files
    #[arg(short, long, env = "RASTER_COVERAGE_DIR")]
    dir: Option<PathBuf>,

    /// Raster file name inside the directory (default: first listed)
    #[arg(short, long)]
    file: Option<String>,

    /// GeoJSON boundary file or URL
    #[arg(long, env = "RASTER_COVERAGE_BOUNDARIES")]
    boundaries: Option<String>,

    /// Boundary property holding the country name
    #[arg(long)]
    name_field: Option<String>,

    /// Lower bound of the value range (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    min: Option<f64>,

    /// Upper bound of the value range (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    max: Option<f64>,

    /// Countries shown in each chart
    #[arg(long)]
    top_n: Option<usize>,

    /// Pixel geometry: square or point
    #[arg(long)]
    shape: Option<String>,

    /// Border pixels: full_count or area_weighted
    #[arg(long)]
    overlap: Option<String>,

    /// Area unit: km2 or m2
    #[arg(long)]
    unit: Option<String>,

    /// Summary order: matched_pixels, percent_covered, area or name
    #[arg(long)]
    sort: Option<String>,

    /// Equal-area CRS used for measurement
    #[arg(long)]
    target_crs: Option<String>,

    /// Write the summary table to this file (.json for JSON, CSV otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the data loaded and read new ranges from stdin
    #[arg(short, long)]
    interactive: bool,

    /// Print the raster's TIFF structure and georeferencing, then exit
    #[arg(long)]
    inspect: bool,

    /// Log level
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Config file values with command-line flags layered on top
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path).with_context(|| format!("Failed to load config {:?}", path))?,
            None => Config::default(),
        };

        if let Some(dir) = &self.dir {
            config.raster_dir = dir.clone();
        }
        if let Some(source) = &self.boundaries {
            config.boundary_source = source.clone();
        }
        if let Some(field) = &self.name_field {
            config.name_field = field.clone();
        }
        if let Some(min) = self.min {
            config.value_min = min;
        }
        if let Some(max) = self.max {
            config.value_max = max;
        }
        if let Some(top_n) = self.top_n {
            config.top_n = top_n;
        }
        if let Some(shape) = &self.shape {
            config.shape = shape.parse()?;
        }
        if let Some(overlap) = &self.overlap {
            config.overlap = overlap.parse()?;
        }
        if let Some(unit) = &self.unit {
            config.unit = unit.parse()?;
        }
        if let Some(sort) = &self.sort {
            config.sort = sort.parse()?;
        }
        if let Some(crs) = &self.target_crs {
            config.target_crs = Crs::from_definition(crs.as_str());
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(level: &str, json: bool) -> Result<()> {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let config = args.resolve_config()?;

    let rasters = catalog::list_rasters(&config.raster_dir)
        .with_context(|| format!("Failed to list rasters in {:?}", config.raster_dir))?;
    if rasters.is_empty() {
        warn!(dir = %config.raster_dir.display(), "No .tif files found");
        return Ok(());
    }

    let path = match catalog::select(&rasters, args.file.as_deref()) {
        Some(path) => path,
        None => bail!(
            "Raster {:?} not found in {:?}",
            args.file.as_deref().unwrap_or_default(),
            config.raster_dir
        ),
    };

    info!(path = %path.display(), "Loading raster");
    let reader = TiffReader::open(path).with_context(|| format!("Failed to open raster {:?}", path))?;

    if args.inspect {
        return inspect(path, &reader);
    }

    let raster = reader
        .read_raster()
        .with_context(|| format!("Failed to read raster {:?}", path))?;
    print_raster_overview(path, &raster);

    let boundaries = BoundarySet::load(&config.boundary_source, &config.name_field)
        .with_context(|| format!("Failed to load boundaries from {}", config.boundary_source))?;
    info!(countries = boundaries.len(), source = %config.boundary_source, "Loaded boundaries");

    let pipeline = Pipeline::new(&raster, &boundaries);
    let mut params = config.to_params();

    run_once(&pipeline, &params, config.top_n, args.output.as_deref())?;

    if args.interactive {
        interactive(&pipeline, &mut params, config.top_n, args.output.as_deref())?;
    }

    Ok(())
}

fn inspect(path: &Path, reader: &TiffReader) -> Result<()> {
    let tiff = reader.read()?;
    println!("{}", path.display());
    print!("{}", tiff);

    if let Some(ifd) = tiff.main_ifd() {
        println!("Tags:");
        for entry in &ifd.entries {
            println!("  {:>5} {:<26} count {}", entry.tag, tags::tag_name(entry.tag), entry.count);
        }

        let geo = GeoInfo::from_ifd(ifd, reader)?;
        print!("{}", geo);
    }
    Ok(())
}

fn print_raster_overview(path: &Path, raster: &RasterGrid) {
    println!("{}", path.display());
    print!("{}", raster);

    match Histogram::from_values(&raster.valid_values(), DEFAULT_BINS) {
        Some(histogram) => println!("\n{}", histogram),
        None => warn!("Raster has no valid values"),
    }
}

fn run_once(pipeline: &Pipeline<'_>, params: &AnalysisParams, top_n: usize, output: Option<&Path>) -> Result<()> {
    let analysis = pipeline.run(params).context("Analysis failed")?;
    print_analysis(&analysis, params, top_n);

    if let (Some(path), Some(table)) = (output, analysis.summary()) {
        let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
        let json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if json {
            report::write_json(table, file)?;
        } else {
            report::write_csv(table, file)?;
        }
        info!(path = %path.display(), rows = table.len(), json, "Wrote summary");
    }

    Ok(())
}

fn print_analysis(analysis: &Analysis, params: &AnalysisParams, top_n: usize) {
    let range = params.range;
    match &analysis.outcome {
        Outcome::NoMatches => {
            println!("No pixels found in the selected range [{}, {}].", range.min, range.max);
        }
        Outcome::Summary(table) if table.is_empty() => {
            println!(
                "{} pixels in [{}, {}], none inside any country.",
                analysis.matched_cells, range.min, range.max
            );
        }
        Outcome::Summary(table) => {
            println!(
                "\n{} pixels in [{}, {}] across {} countries ({} outside all countries)\n",
                analysis.matched_cells,
                range.min,
                range.max,
                table.len(),
                analysis.unjoined_pixels
            );
            println!("{}", report::render_summary(table));
            println!("{}", report::render_bar_chart(table, ChartMetric::MatchedPixels, top_n));
            println!("{}", report::render_bar_chart(table, ChartMetric::PercentCovered, top_n));
        }
    }
}

/// Parses `<min> <max> [top_n]`
fn parse_request(line: &str) -> Result<(ValueRange, Option<usize>)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [min, max] | [min, max, _] => {
            let min: f64 = min.parse().with_context(|| format!("Invalid minimum '{}'", min))?;
            let max: f64 = max.parse().with_context(|| format!("Invalid maximum '{}'", max))?;
            let top_n = match fields.get(2) {
                Some(n) => Some(n.parse().with_context(|| format!("Invalid top_n '{}'", n))?),
                None => None,
            };
            if top_n == Some(0) {
                return Err(Error::Config("top_n must be at least 1".to_string()).into());
            }
            Ok((ValueRange::new(min, max), top_n))
        }
        _ => bail!("Expected '<min> <max> [top_n]'"),
    }
}

fn interactive(
    pipeline: &Pipeline<'_>,
    params: &mut AnalysisParams,
    mut top_n: usize,
    output: Option<&Path>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("range (<min> <max> [top_n], q to quit)> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "q" | "quit" | "exit") {
            break;
        }

        match parse_request(line) {
            Ok((range, n)) => {
                params.range = range;
                if let Some(n) = n {
                    top_n = n;
                }
                if let Err(e) = run_once(pipeline, params, top_n, output) {
                    warn!(error = %e, "Run failed");
                }
            }
            Err(e) => println!("{}", e),
        }
    }

    Ok(())
}
