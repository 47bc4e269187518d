use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, Writer};
use std::io::{Read, Write};
use std::path::Path;

use crate::dijkstra::DistanceTable;
use crate::graph::{Distance, NodeId, NodeTable};

/// One `node_id,neighbor_id,weight` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeRow {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: Distance,
}

pub fn read_edges<R: Read>(reader: R) -> Result<Vec<EdgeRow>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut edges = Vec::new();
    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        // +2: one for the header, one because lines are 1-based.
        let row = line + 2;
        let field = |i: usize| {
            record
                .get(i)
                .with_context(|| format!("row {row}: missing column {i}"))
        };
        let from = field(0)?
            .parse()
            .with_context(|| format!("row {row}: bad node_id"))?;
        let to = field(1)?
            .parse()
            .with_context(|| format!("row {row}: bad neighbor_id"))?;
        let weight = field(2)?
            .parse()
            .with_context(|| format!("row {row}: weight must be a non-negative integer"))?;
        edges.push(EdgeRow { from, to, weight });
    }
    Ok(edges)
}

/// Builds a table of `max id + 1` nodes with one directed road per row.
pub fn build_node_table(edges: &[EdgeRow]) -> Result<NodeTable> {
    let mut node_count: usize = 0;
    for edge in edges {
        let needed = std::cmp::max(edge.from, edge.to)
            .checked_add(1)
            .ok_or_else(|| anyhow!("node id {} is too large", std::cmp::max(edge.from, edge.to)))?;
        node_count = node_count.max(needed);
    }

    let mut table = NodeTable::try_new(node_count)
        .with_context(|| format!("allocating {node_count} nodes"))?;
    for edge in edges {
        table
            .add_road(edge.from, edge.to, edge.weight)
            .with_context(|| format!("adding road {} -> {}", edge.from, edge.to))?;
    }
    Ok(table)
}

pub fn read_node_table_from_path<P: AsRef<Path>>(path: P) -> Result<NodeTable> {
    let path = path.as_ref();
    let file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let edges = read_edges(file).with_context(|| format!("parsing {}", path.display()))?;
    build_node_table(&edges)
}

/// Writes `node_id,distance` rows sorted by distance. Unreached nodes are written as `inf`
/// when `include_unreachable` is set and skipped otherwise.
pub fn write_distances<W: Write>(
    writer: W,
    distances: &DistanceTable,
    include_unreachable: bool,
) -> Result<usize> {
    write_labelled_distances(writer, distances, include_unreachable, |node| node.to_string())
}

/// Same as [`write_distances`], with `label` turning a table index into the written node id.
pub fn write_labelled_distances<W, F>(
    writer: W,
    distances: &DistanceTable,
    include_unreachable: bool,
    label: F,
) -> Result<usize>
where
    W: Write,
    F: Fn(NodeId) -> String,
{
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["node_id", "distance"])?;

    let mut rows: Vec<(NodeId, Option<Distance>)> = distances
        .iter()
        .filter(|(_, d)| d.is_some() || include_unreachable)
        .collect();
    // None sorts after every finite distance.
    rows.sort_by_key(|&(node, d)| (d.is_none(), d, node));

    for &(node, d) in &rows {
        let val = match d {
            Some(d) => d.to_string(),
            None => String::from("inf"),
        };
        wtr.write_record(&[label(node), val])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}
