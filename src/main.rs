use anyhow::{Context, Result, bail};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use roofgrid::config::{FileConfig, parse_coordinates};
use roofgrid::domain::{Orientation, PanelPreset, RoofPolygon, UnitSystem, resolve};
use roofgrid::layout::stats::{CO2_KG_PER_KWH, PEAK_SUN_HOURS_PER_DAY, PERFORMANCE_RATIO};
use roofgrid::layout::{GridFitter, LayoutReport, LayoutSession, Stats};

/// Fit solar panels inside a roof outline and estimate their yearly output
///
/// Examples:
///   # Standard panels on a small roof, coordinates as lng,lat pairs
///   roofgrid --roof "151.20930,-33.86880 151.20945,-33.86880 151.20945,-33.86870 151.20930,-33.86870"
///
///   # Landscape US panels with a 30mm gap, 420W each
///   roofgrid --config roof.toml --preset us --orientation landscape --gap-mm 30 --watts 420
///
///   # Custom 70 x 40 inch panels, skipping panels 3 and 7, saving the layout
///   roofgrid --config roof.toml --preset custom --units imperial \
///       --custom-width 70 --custom-height 40 --remove 3,7 -o layout.json
#[derive(Parser, Debug)]
#[command(name = "roofgrid")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to config file (optional, auto-searches roofgrid.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Roof outline as space-separated lng,lat pairs (overrides the config file)
    #[arg(short = 'r', long, allow_hyphen_values = true)]
    roof: Option<String>,

    /// Panel size preset
    #[arg(short = 'p', long)]
    preset: Option<PanelPreset>,

    /// Panel orientation
    #[arg(long)]
    orientation: Option<Orientation>,

    /// Gap between panels in mm
    #[arg(long)]
    gap_mm: Option<f64>,

    /// Rated watts per panel
    #[arg(short = 'w', long)]
    watts: Option<f64>,

    /// Units for custom panel dimensions and roof area
    #[arg(short = 'u', long)]
    units: Option<UnitSystem>,

    /// Custom panel width (meters, or inches with --units imperial)
    #[arg(long)]
    custom_width: Option<f64>,

    /// Custom panel height (meters, or inches with --units imperial)
    #[arg(long)]
    custom_height: Option<f64>,

    /// Comma-separated panel indices to leave out (vents, skylights, chimneys)
    #[arg(long, value_delimiter = ',')]
    remove: Vec<usize>,

    /// Refuse grids with more candidate cells than this
    #[arg(long)]
    max_candidates: Option<u64>,

    /// Write the fitted layout as JSON
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let total_start = Instant::now();

    let file_config = if let Some(ref config_path) = args.config {
        if !config_path.exists() {
            bail!("Config file not found: {:?}", config_path);
        }
        FileConfig::from_path(config_path)?
    } else {
        FileConfig::load().unwrap_or_default()
    };
    let config = merge(args, file_config)?;

    init_tracing(config.verbose);

    let ring = config
        .roof_ring()
        .context("No roof outline given; use --roof or set `roof` in the config file")?;
    let roof = RoofPolygon::closed(ring).context("Invalid roof outline")?;
    if let Err(e) = roof.validate() {
        bail!("Roof outline cannot be used: {}", e);
    }

    let layout_config = config.layout_config();
    let tile = resolve(&layout_config.tile).context("Invalid panel dimensions")?;

    println!("roofgrid - Solar Panel Layout");
    println!("=============================");
    println!();

    if config.verbose {
        println!("Configuration:");
        println!("  Panel: {}", config.preset.label());
        println!("  Orientation: {:?}", config.orientation);
        println!("  Footprint: {:.3}m x {:.3}m", tile.width, tile.height);
        println!("  Gap: {}mm", config.gap_mm);
        println!("  Watts per panel: {}", config.watts);
        println!("  Roof vertices: {}", roof.distinct_vertices());
        println!("  Candidate limit: {}", config.max_candidates);
        println!();
    }

    let spinner = create_spinner("Fitting panels...");
    let start = Instant::now();
    let fitter = GridFitter::new().with_max_candidates(config.max_candidates);
    let mut session = LayoutSession::with_fitter(fitter);
    let fitted = session
        .fit(roof, layout_config, false)
        .context("Failed to fit panels")?;
    spinner.finish_with_message(format!(
        "Fitted {} panels [{:.2}s]",
        fitted,
        start.elapsed().as_secs_f32()
    ));

    if !config.removed.is_empty() {
        let applied = session.restore_removed(config.removed.iter().copied());
        if applied < config.removed.len() {
            println!(
                "  Ignored {} removal(s) outside the {} fitted panels",
                config.removed.len() - applied,
                fitted
            );
        }
    }

    let stats = session
        .stats()
        .context("Layout has no statistics after fitting")?;
    println!();
    print_stats(&stats, config.units);

    if let Some(ref output_path) = config.output {
        let report = LayoutReport::from_session(&session)
            .context("Layout has no report after fitting")?;
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize layout")?;
        std::fs::write(output_path, json)
            .with_context(|| format!("Failed to write layout file: {:?}", output_path))?;
        println!();
        println!("Output: {}", output_path.display());
    }

    println!();
    println!(
        "Done! Total time: {:.2}s",
        total_start.elapsed().as_secs_f32()
    );

    Ok(())
}

/// Command-line values win over the config file
fn merge(args: Args, mut config: FileConfig) -> Result<FileConfig> {
    if let Some(roof) = args.roof {
        let points = parse_coordinates(&roof).context("Failed to parse --roof")?;
        config.roof = Some(points.into_iter().map(|(lng, lat)| [lng, lat]).collect());
    }
    if let Some(preset) = args.preset {
        config.preset = preset;
    }
    if let Some(orientation) = args.orientation {
        config.orientation = orientation;
    }
    if let Some(gap_mm) = args.gap_mm {
        config.gap_mm = gap_mm;
    }
    if let Some(watts) = args.watts {
        config.watts = watts;
    }
    if let Some(units) = args.units {
        config.units = units;
    }
    if args.custom_width.is_some() {
        config.custom_width = args.custom_width;
    }
    if args.custom_height.is_some() {
        config.custom_height = args.custom_height;
    }
    if !args.remove.is_empty() {
        config.removed = args.remove;
    }
    if let Some(max_candidates) = args.max_candidates {
        config.max_candidates = max_candidates;
    }
    if args.output.is_some() {
        config.output = args.output;
    }
    config.verbose |= args.verbose;
    Ok(config)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "roofgrid=debug" } else { "roofgrid=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_stats(stats: &Stats, units: UnitSystem) {
    println!("Results (rough estimates)");
    println!("=========================");
    println!(
        "  Panels:          {} of {}",
        stats.active_count, stats.total_count
    );
    println!("  Roof area:       {}", units.format_area(stats.roof_area_sq_meters));
    println!(
        "  Panel area:      {} ({:.0}% of roof)",
        units.format_area(stats.panel_area_sq_meters),
        stats.coverage_percentage()
    );
    println!("  Capacity:        {:.2} kWp", stats.capacity_kw);
    println!("  Output per year: {:.0} kWh", stats.annual_output_kwh);
    println!("  CO2 avoided/yr:  {:.2} t", stats.co2_avoided_tonnes);
    println!();
    println!(
        "Assumes {} peak sun hours/day, {} performance ratio and {:.2} kg CO2/kWh.",
        PEAK_SUN_HOURS_PER_DAY, PERFORMANCE_RATIO, CO2_KG_PER_KWH
    );
    println!("Actual output depends on location, pitch, shading and the local grid mix.");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}
