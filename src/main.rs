use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

mod client;
mod config;
mod dataset;
mod enrichment;
mod graph;
mod models;


use crate::client::SpotifyClient;
use crate::config::load_config;
use crate::graph::{
    Graph, GraphBuilder, GraphConfig, Granularity, RangeStats, ScoringMethod,
};

#[derive(Parser)]
#[command(name = "artist-graph")]
#[command(about = "Build an artist relatedness graph from playlist data")]
#[command(version)]
struct Args {
    /// Playlist dataset: a JSON array, or JSON Lines when the extension is .jsonl
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Path to the graph configuration JSON file
    #[arg(short = 'c', long = "config")]
    config_file: Option<String>,

    /// Where to write the graph JSON
    #[arg(short = 'o', long = "output", default_value = "artist-graph.json")]
    output: PathBuf,

    /// Edge weighting: "PMI" or "raw-co-occurrence"
    #[arg(short = 'm', long = "method", value_parser = parse_method)]
    method: Option<ScoringMethod>,

    /// Node granularity: "artist" or "track"
    #[arg(short = 'g', long = "granularity", value_parser = parse_granularity)]
    granularity: Option<Granularity>,

    /// Override the minimum edge weight
    #[arg(long = "min-edge-weight")]
    min_edge_weight: Option<f64>,

    /// Skip the top-tracks popularity lookup
    #[arg(long = "no-enrich")]
    no_enrich: bool,

    /// Enable debug mode - print the graph summary instead of writing the file
    #[arg(short = 'd', long = "debug")]
    debug: bool,

    /// Quiet mode - reduce output verbosity
    #[arg(short = 'q', long = "quiet")]
    quiet: bool,
}

fn parse_method(value: &str) -> Result<ScoringMethod, String> {
    match value.to_lowercase().as_str() {
        "pmi" => Ok(ScoringMethod::Pmi),
        "raw" | "raw-co-occurrence" => Ok(ScoringMethod::RawCoOccurrence),
        other => Err(format!("unknown method '{other}' (expected PMI or raw-co-occurrence)")),
    }
}

fn parse_granularity(value: &str) -> Result<Granularity, String> {
    match value.to_lowercase().as_str() {
        "artist" => Ok(Granularity::Artist),
        "track" => Ok(Granularity::Track),
        other => Err(format!("unknown granularity '{other}' (expected artist or track)")),
    }
}

fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "warn"
    } else if args.debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args);

    if !args.input.exists() {
        eprintln!("Error: Playlist dataset '{}' not found.", args.input.display());
        return Err(anyhow::anyhow!(
            "Dataset file '{}' not found",
            args.input.display()
        ));
    }

    // Load configuration from .env
    let env_config = load_config()?;

    let mut graph_config = match &args.config_file {
        Some(path) => GraphConfig::load_from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load graph configuration '{}': {}", path, e))?,
        None => GraphConfig::default(),
    };
    if let Some(method) = args.method {
        graph_config.method = method;
    }
    if let Some(granularity) = args.granularity {
        graph_config.granularity = granularity;
    }
    if let Some(min_edge_weight) = args.min_edge_weight {
        graph_config.min_edge_weight = Some(min_edge_weight);
    }
    if args.no_enrich {
        graph_config.enrichment.enabled = false;
    }

    let playlists = dataset::load_playlists(&args.input)?;
    if !args.quiet {
        println!(
            "Loaded {} playlists from {}",
            playlists.len(),
            args.input.display()
        );
    }

    let builder = GraphBuilder::new(graph_config.clone());
    let aggregates = builder.accumulate(&playlists);

    // Overrides must be complete before node attributes are derived
    let overrides = match (&env_config.access_token, graph_config.granularity) {
        (Some(token), Granularity::Artist) if graph_config.enrichment.enabled => {
            let client = SpotifyClient::new(
                &env_config.api_base,
                token,
                &graph_config.enrichment.market,
            );
            enrichment::fetch_popularity_overrides(
                &client,
                &aggregates.artist_ids(),
                &graph_config.enrichment,
            )
        }
        (None, Granularity::Artist) if graph_config.enrichment.enabled => {
            warn!("No SPOTIFY_ACCESS_TOKEN set, using playlist average popularity");
            Default::default()
        }
        _ => Default::default(),
    };

    let graph = aggregates.derive(builder.config(), &overrides);

    if !args.quiet {
        print_summary(&graph);
    }

    if args.debug {
        println!("\n🔍 DEBUG MODE: graph not written to {}", args.output.display());
        print_strongest_edges(&graph, 10);
        return Ok(());
    }

    let export = graph.export(chrono::Utc::now());
    let file = std::fs::File::create(&args.output)?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &export)?;
    info!("Graph exported to {}", args.output.display());
    if !args.quiet {
        println!("\n✓ Graph written to {}", args.output.display());
    }

    Ok(())
}

fn print_summary(graph: &Graph) {
    println!("\n=== GRAPH SUMMARY ===");
    println!(
        "Method: {} | Granularity: {} | Min edge weight: {}",
        graph.method, graph.granularity, graph.min_edge_weight
    );
    println!(
        "Playlists: {} ({} with tracks)",
        graph.total_playlists, graph.playlists_analyzed
    );
    println!("Nodes: {} | Edges: {}", graph.stats.nodes, graph.stats.edges);

    let format_range = |label: &str, range: &RangeStats| match (range.min, range.avg, range.max) {
        (Some(min), Some(avg), Some(max)) => {
            println!("   {label}: min {min:.2} | avg {avg:.2} | max {max:.2}")
        }
        _ => println!("   {label}: n/a"),
    };
    format_range("Popularity", &graph.stats.popularity);
    format_range("Release year", &graph.stats.release_years);
    format_range("Edge weight", &graph.stats.edge_weights);
}

fn print_strongest_edges(graph: &Graph, limit: usize) {
    let names = graph.node_names();

    let mut edges: Vec<_> = graph.edges.iter().collect();
    edges.sort_by(|a, b| {
        b.weight
            .partial_cmp(&a.weight)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });

    for (i, edge) in edges.iter().take(limit).enumerate() {
        let source = names.get(edge.source.as_str()).copied().unwrap_or(edge.source.as_str());
        let target = names.get(edge.target.as_str()).copied().unwrap_or(edge.target.as_str());
        println!(
            "     {}. {} ↔ {} | weight {:.3} | thickness {:.2} | {} playlists",
            i + 1,
            source,
            target,
            edge.weight,
            edge.thickness,
            edge.playlist_count
        );
    }
}
