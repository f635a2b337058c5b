use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use segment_tour::assembler::assemble_track;
use segment_tour::google::{GoogleMapsClient, GoogleMapsConfig};
use segment_tour::gpx::GpxWriter;
use segment_tour::haversine::HaversineOracle;
use segment_tour::held_karp::DEFAULT_MAX_NODES;
use segment_tour::osrm::{OsrmClient, OsrmConfig};
use segment_tour::pruner::DEFAULT_CANDIDATES;
use segment_tour::segment::Coordinate;
use segment_tour::solver::{PlanOptions, Strategy, load_segments, plan};
use segment_tour::store::{SegmentStore, StoreConfig};
use segment_tour::traits::{DistanceOracle, TrackSink, TravelMode};
use tracing::level_filters::LevelFilter;
use tracing::{Level, debug, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{Layer, Registry, fmt};

/// Plan a closed-loop route through a set of Strava segments
///
/// Loads the segments (fetching and caching them on first use), orders them
/// into a tour that starts and ends at the given point, and writes the
/// resulting track as GPX.
#[derive(Parser)]
#[command(name = "segment-tour", version, about)]
struct Cli {
    /// Comma-separated Strava segment ids
    #[clap(long, required = true, value_delimiter = ',')]
    segments: Vec<u64>,

    /// Start and end point as "lat,lng"
    #[clap(long, value_parser = parse_coordinate)]
    start: Coordinate,

    /// Ride here from the start before the first segment ("lat,lng")
    #[clap(long, value_parser = parse_coordinate)]
    next_point: Option<Coordinate>,

    /// GPX file to write
    #[clap(long, short = 'o')]
    output: PathBuf,

    /// Strava API access token, used when a segment is not cached yet
    #[clap(long, env = "STRAVA_ACCESS_TOKEN", default_value = "", hide_env_values = true)]
    strava_access_token: String,

    /// Directory holding cached segment JSON
    #[clap(long, default_value = "segment_information")]
    cache_dir: PathBuf,

    /// Where travel distances and transit paths come from
    #[clap(long, default_value_t = OracleKind::Osrm, value_enum)]
    oracle: OracleKind,

    /// OSRM server base URL
    #[clap(long, default_value = "http://localhost:5000")]
    osrm_url: String,

    /// Google Maps API key, required with --oracle google
    #[clap(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true)]
    maps_api_key: Option<String>,

    #[clap(long, default_value_t = Mode::Cycling, value_enum)]
    mode: Mode,

    /// Stop after visiting this many segments (greedy only)
    #[clap(long)]
    max_segments: Option<usize>,

    /// Use the exact solver instead of the greedy heuristic
    #[clap(long)]
    exact: bool,

    /// Node ceiling for the exact solver, origin included
    #[clap(long, default_value_t = DEFAULT_MAX_NODES)]
    max_exact_nodes: usize,

    /// Candidates per greedy step sent to the distance oracle
    #[clap(long, default_value_t = DEFAULT_CANDIDATES)]
    candidates: usize,

    /// Configure diagnostic logging level
    #[clap(long, short = 'L', default_value_t = Level::WARN)]
    log_level: Level,
}

#[derive(Copy, Clone, ValueEnum)]
enum OracleKind {
    Osrm,
    Google,
    Haversine,
}

#[derive(Copy, Clone, ValueEnum)]
enum Mode {
    Driving,
    Walking,
    Cycling,
}

impl From<Mode> for TravelMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Driving => TravelMode::Driving,
            Mode::Walking => TravelMode::Walking,
            Mode::Cycling => TravelMode::Cycling,
        }
    }
}

fn parse_coordinate(s: &str) -> std::result::Result<Coordinate, String> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lng\", got {:?}", s))?;
    let lat = lat.trim().parse::<f64>().map_err(|e| format!("latitude: {}", e))?;
    let lng = lng.trim().parse::<f64>().map_err(|e| format!("longitude: {}", e))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        return Err(format!("coordinate out of range: {}", s));
    }
    Ok(Coordinate::new(lat, lng))
}

fn run<O>(args: &Cli, oracle: &O) -> Result<()>
where
    O: DistanceOracle + Sync,
{
    let store = SegmentStore::new(StoreConfig {
        cache_dir: args.cache_dir.clone(),
        access_token: args.strava_access_token.clone(),
        ..StoreConfig::default()
    })
    .context("Building the Strava client")?;
    let segments = load_segments(&store, &args.segments).context("Loading segments")?;

    let options = PlanOptions {
        strategy: if args.exact {
            Strategy::Exact
        } else {
            Strategy::Greedy
        },
        mode: args.mode.into(),
        max_segments: args.max_segments,
        candidates: args.candidates,
        max_exact_nodes: args.max_exact_nodes,
    };

    // With a next point, the tour is ordered from there; the track still
    // starts and ends at the start point.
    let tour_origin = args.next_point.unwrap_or(args.start);
    let tour = plan(tour_origin, &segments, oracle, &options).context("Planning the tour")?;

    let track = assemble_track(
        args.start,
        args.next_point,
        &segments,
        tour.ordering(),
        oracle,
        options.mode,
    )
    .context("Assembling the track")?;

    let file = File::create(&args.output)
        .with_context(|| format!("Creating {}", args.output.display()))?;
    let name = args
        .output
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("segment tour");
    GpxWriter::new(BufWriter::new(file))
        .write_track(name, &track)
        .context("Writing GPX")?;
    info!(points = track.len(), path = %args.output.display(), "wrote track");

    let visited = tour
        .ordering()
        .iter()
        .map(|&index| segments[index].id().to_string())
        .collect::<Vec<_>>();
    println!("Segment order: {}", visited.join(","));
    println!("Total distance: {:.1} km", tour.total_cost() / 1000.0);
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let fmt_layer = fmt::Layer::new()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(LevelFilter::from_level(args.log_level));
    tracing::subscriber::set_global_default(Registry::default().with(fmt_layer))?;

    debug!("segment-tour {}", clap::crate_version!());

    match args.oracle {
        OracleKind::Osrm => {
            let oracle = OsrmClient::new(OsrmConfig {
                base_url: args.osrm_url.clone(),
                ..OsrmConfig::default()
            })
            .context("Building the OSRM client")?;
            run(&args, &oracle)
        }
        OracleKind::Google => {
            let Some(api_key) = args.maps_api_key.clone() else {
                bail!("--maps-api-key (or GOOGLE_MAPS_API_KEY) is required with --oracle google");
            };
            let oracle = GoogleMapsClient::new(GoogleMapsConfig {
                api_key,
                ..GoogleMapsConfig::default()
            })
            .context("Building the Google Maps client")?;
            run(&args, &oracle)
        }
        OracleKind::Haversine => run(&args, &HaversineOracle::default()),
    }
}
