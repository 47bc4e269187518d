use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::File;
use std::time::Instant;
use tracing::{info, warn};

use roadnet::logging::init_logging;
use roadnet::reference::reference_distances;
use roadnet::table_io::{read_node_table_from_path, write_distances};
use roadnet::{find_all_distances, find_distance, NodeTable};

#[derive(Parser, Debug)]
#[command(name = "csv")]
#[command(about = "Build a road table from a CSV with node_id,neighbor_id,weight rows and run Dijkstra from a source node.", long_about = None)]
struct Cli {
    /// Path to the .csv file
    #[arg(short, long)]
    csv: String,

    /// Source node index
    #[arg(short, long, default_value_t = 0)]
    source: usize,

    /// Stop as soon as this node is settled
    #[arg(short, long, conflicts_with_all = ["out", "include_unreachable", "num_runs"])]
    destination: Option<usize>,

    /// Timing mode: run from sources 0, 1, ..., num_runs - 1 and print the durations.
    #[arg(short, long)]
    num_runs: Option<usize>,

    /// Cross-check every run against a decrease-key search.
    #[arg(long, default_value_t = false)]
    verify: bool,

    /// Output CSV (node_id, distance). If omitted, prints a summary to stdout.
    #[arg(short, long)]
    out: Option<String>,

    /// Include unreachable nodes in output with infinite distance
    #[arg(long, default_value_t = false)]
    include_unreachable: bool,

    #[arg(long, default_value = "INFO")]
    log_level: String,
}

fn verify(table: &NodeTable, source: usize, got: &[u32]) -> Result<()> {
    let expected = reference_distances(table, source)?;
    if let Some(node) = (0..expected.len()).find(|&i| expected[i] != got[i]) {
        bail!(
            "source {}: node {} has distance {} but the reference search found {}",
            source,
            node,
            got[node],
            expected[node]
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let table = read_node_table_from_path(&cli.csv)?;
    info!(nodes = table.len(), roads = table.road_count(), "loaded {}", cli.csv);

    if let Some(num_runs) = cli.num_runs {
        let runs = num_runs.min(table.len());
        if runs < num_runs {
            warn!(requested = num_runs, runs, "fewer nodes than requested runs");
        }
        let mut duration_millis = Vec::with_capacity(runs);
        for src_idx in 0..runs {
            let now = Instant::now();
            let dist = find_all_distances(&table, src_idx)?;
            duration_millis.push(now.elapsed().as_secs_f64() * 1000.0);
            if cli.verify {
                verify(&table, src_idx, dist.as_slice())?;
            }
        }
        println!("{:?}", duration_millis);
        return Ok(());
    }

    if let Some(destination) = cli.destination {
        let outcome = find_distance(&table, cli.source, destination).map_err(|e| {
            if e.is_invalid_argument() {
                anyhow::Error::new(e).context("check --source and --destination")
            } else {
                e.into()
            }
        })?;
        match outcome.distances.get(destination).filter(|_| outcome.reachable) {
            Some(d) => println!("Distance {} -> {}: {}", cli.source, destination, d),
            None => println!("No route from {} to {}", cli.source, destination),
        }
        if cli.verify {
            let expected = reference_distances(&table, cli.source)?[destination];
            if outcome.reachable && outcome.distances.raw(destination) != expected {
                bail!("reference search disagrees: {}", expected);
            }
        }
        return Ok(());
    }

    let dist = find_all_distances(&table, cli.source)?;
    if cli.verify {
        verify(&table, cli.source, dist.as_slice())?;
        info!("distances match the reference search");
    }

    if let Some(out_path) = cli.out {
        let file = File::create(&out_path).with_context(|| format!("creating CSV {}", &out_path))?;
        let written = write_distances(file, &dist, cli.include_unreachable)?;
        println!("Wrote distances for {} nodes to {}", written, out_path);
    } else {
        println!("Nodes: {}", dist.len());
        println!("Reachable from {}: {}", cli.source, dist.reached_count());
        if let Some(maxd) = dist.max_finite() {
            println!("Max finite distance: {}", maxd);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_rejects_output_flags() {
        let base = ["csv", "--csv", "g.csv", "--destination", "3"];
        assert!(Cli::try_parse_from(base).is_ok());
        let extras: [&[&str]; 3] = [
            &["--out", "d.csv"],
            &["--include-unreachable"],
            &["--num-runs", "2"],
        ];
        for extra in extras {
            let args = base.iter().chain(extra.iter()).copied();
            assert!(Cli::try_parse_from(args).is_err(), "{extra:?}");
        }
    }
}
