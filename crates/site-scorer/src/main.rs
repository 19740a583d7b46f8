//! Green Hydrogen Site Analysis CLI
//!
//! Scores a single coordinate, or ranks a batch of candidate sites, against
//! the renewable-source and demand-center catalog.
//!
//! Usage:
//!   analyze-site --lat 23.0225 --lon 72.5714
//!   analyze-site --sites data/candidate_sites.json --output ranking.json --geojson

use anyhow::{bail, Context, Result};
use clap::Parser;
use site_scorer::{
    loader, proximity, ranking, Coordinate, JitterSource, NoJitter, ProximityRadii,
    RegionTable, ScoringPolicy, SeededJitter, SiteScorer, DEMAND_RADIUS_KM, RENEWABLE_RADIUS_KM,
};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "analyze-site",
    about = "Score locations for green hydrogen production"
)]
struct Args {
    /// Latitude of a single site (decimal degrees)
    #[arg(long, allow_hyphen_values = true, requires = "lon", conflicts_with = "sites")]
    lat: Option<String>,

    /// Longitude of a single site (decimal degrees)
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<String>,

    /// JSON file of candidate sites to rank
    #[arg(short, long)]
    sites: Option<PathBuf>,

    /// Path to renewable sources JSON file
    #[arg(short, long, default_value = "data/renewable_sources.json")]
    renewables: PathBuf,

    /// Path to demand centers JSON file
    #[arg(short, long, default_value = "data/demand_centers.json")]
    demand: PathBuf,

    /// Region table JSON (built-in India table otherwise)
    #[arg(long)]
    regions: Option<PathBuf>,

    /// Scoring policy JSON (defaults otherwise)
    #[arg(long)]
    policy: Option<PathBuf>,

    /// Renewable search radius in km
    #[arg(long, default_value_t = RENEWABLE_RADIUS_KM)]
    renewable_km: f64,

    /// Demand search radius in km
    #[arg(long, default_value_t = DEMAND_RADIUS_KM)]
    demand_km: f64,

    /// Seed for reproducible metric jitter
    #[arg(long, conflicts_with = "no_jitter")]
    seed: Option<u64>,

    /// Disable metric jitter entirely
    #[arg(long)]
    no_jitter: bool,

    /// Output JSON file (stdout otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also output GeoJSON (batch mode, needs --output)
    #[arg(long, requires = "output")]
    geojson: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn write_json<T: serde::Serialize>(path: Option<&PathBuf>, value: &T) -> Result<()> {
    match path {
        Some(path) => {
            info!("Writing output to {:?}", path);
            let file = File::create(path).with_context(|| format!("creating {:?}", path))?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, value)?;
        }
        None => {
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            serde_json::to_writer_pretty(&mut lock, value)?;
            writeln!(lock)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging (stderr, stdout carries the JSON)
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", "=".repeat(60));
    info!("Green Hydrogen Site Analyzer");
    info!("{}", "=".repeat(60));

    let policy = match &args.policy {
        Some(path) => ScoringPolicy::from_json_file(path)?,
        None => ScoringPolicy::default(),
    };
    let regions = match &args.regions {
        Some(path) => RegionTable::from_json_file(path)?,
        None => RegionTable::india(),
    };
    let scorer = SiteScorer::with_regions(policy, regions);

    let radii = ProximityRadii {
        renewable_km: args.renewable_km,
        demand_km: args.demand_km,
        ..ProximityRadii::default()
    };

    let mut jitter: Box<dyn JitterSource> = match (args.no_jitter, args.seed) {
        (true, _) => Box::new(NoJitter),
        (false, Some(seed)) => Box::new(SeededJitter::new(seed)),
        (false, None) => Box::new(SeededJitter::from_entropy()),
    };

    let catalog = loader::load_catalog(&args.renewables, &args.demand)?;

    if let (Some(lat), Some(lon)) = (&args.lat, &args.lon) {
        let candidate = Coordinate::parse(lat, lon)?;
        let nearby = proximity::nearby_infrastructure(&catalog, &candidate, &radii);
        info!(
            "{} renewable sources and {} demand centers in range of {}",
            nearby.renewables.len(),
            nearby.demand.len(),
            candidate
        );

        let analysis = scorer.analyze(
            &candidate,
            &nearby.renewable_signals(),
            &nearby.demand_signals(),
            jitter.as_mut(),
        )?;
        info!("Suitability score: {}", analysis.suitability_score);

        return write_json(args.output.as_ref(), &analysis);
    }

    let Some(sites_path) = &args.sites else {
        bail!("either --lat/--lon or --sites is required");
    };

    let sites = ranking::load_candidate_sites(sites_path)?;
    let result = ranking::rank_sites(&catalog, &sites, &scorer, &radii, jitter.as_mut())?;
    write_json(args.output.as_ref(), &result)?;

    if args.geojson {
        if let Some(output) = &args.output {
            let geojson_path = output.with_extension("geojson");
            info!("Writing GeoJSON to {:?}", geojson_path);
            let geojson = ranking::to_geojson(&result);
            let file = File::create(&geojson_path)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(writer, &geojson)?;
        }
    }

    // Summary
    info!("{}", "=".repeat(60));
    info!("SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Sites ranked: {}", result.metadata.total_sites);
    for r in result.ranked.iter().take(10) {
        info!(
            "  #{:<3} {:>3} | {:40}",
            r.rank,
            r.analysis.suitability_score,
            &r.site.name.chars().take(40).collect::<String>()
        );
    }

    Ok(())
}
