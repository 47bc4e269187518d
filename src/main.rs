use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use std::fs::File;
use std::time::Instant;
use tracing::info;

use roadnet::logging::init_logging;
use roadnet::osm::load_osm_graph;
use roadnet::table_io::write_labelled_distances;
use roadnet::{find_all_distances, find_distance};

#[derive(Parser, Debug)]
#[command(name = "osm")]
#[command(about = "Build a road table from an OSM .pbf and run Dijkstra from a source node.", long_about = None)]
struct Cli {
    /// Path to the .osm.pbf file
    #[arg(short, long)]
    pbf: String,

    /// Source node, as an OSM node id
    #[arg(short, long)]
    source: i64,

    /// Stop as soon as this OSM node id is settled
    #[arg(short, long)]
    destination: Option<i64>,

    /// Output CSV (node_id, distance in metres). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Include unreachable nodes in output with infinite distance
    #[arg(long, default_value_t = false)]
    include_unreachable: bool,

    /// Only include 'highway' ways (recommended). If false, attempts to include all linear ways.
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    only_highways: bool,

    #[arg(long, default_value = "INFO")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let graph = load_osm_graph(&cli.pbf, cli.only_highways)?;
    let lookup = |id: i64| {
        graph
            .index_of(osmpbfreader::NodeId(id))
            .with_context(|| format!("OSM node {id} is not on a routable way"))
    };
    let source = lookup(cli.source)?;

    if let Some(dest_id) = cli.destination {
        let destination = lookup(dest_id)?;
        let now = Instant::now();
        let outcome = find_distance(&graph.table, source, destination)?;
        info!(elapsed_s = now.elapsed().as_secs_f64(), "search done");
        match outcome.distances.get(destination).filter(|_| outcome.reachable) {
            Some(d) => println!("Distance {} -> {}: {} m", cli.source, dest_id, d),
            None => println!("No route from {} to {}", cli.source, dest_id),
        }
        return Ok(());
    }

    let now = Instant::now();
    let dist = find_all_distances(&graph.table, source)?;
    info!(elapsed_s = now.elapsed().as_secs_f64(), "search done");

    if let Some(out_path) = cli.out {
        let file = File::create(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        let written = write_labelled_distances(file, &dist, cli.include_unreachable, |idx| {
            graph.osm_ids[idx].0.to_string()
        })?;
        println!("Wrote distances for {} nodes to {}", written, out_path);
    } else {
        println!("Nodes: {}", dist.len());
        println!("Reachable from {}: {}", cli.source, dist.reached_count());
        if let Some(maxd) = dist.max_finite() {
            println!("Max finite distance (m): {}", maxd);
        }
    }

    Ok(())
}
