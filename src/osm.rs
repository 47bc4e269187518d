// Builds a NodeTable from an OSM .pbf in two passes: routable ways first, then the
// coordinates of the nodes they reference.
use anyhow::{Context, Result};
use fnv::FnvHashMap;
use hashbrown::HashSet;
use osmpbfreader::{NodeId as OsmNodeId, OsmObj, OsmPbfReader, Tags};
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

use crate::error::Error;
use crate::graph::{Distance, NodeId, NodeTable};

const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lat: f64,
    pub lon: f64,
}

impl Coord {
    /// Great-circle distance in metres.
    pub fn haversine_m(self, other: Coord) -> f64 {
        let (phi1, phi2) = (self.lat.to_radians(), other.lat.to_radians());
        let dphi = phi2 - phi1;
        let dlambda = (other.lon - self.lon).to_radians();
        let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
    }

    /// Road length in whole metres, never zero.
    pub fn road_length(self, other: Coord) -> Distance {
        let m = self.haversine_m(other).round();
        if m >= Distance::MAX as f64 {
            Distance::MAX - 1
        } else {
            (m as Distance).max(1)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Both,
}

#[derive(Debug, Clone)]
pub struct RoutableWay {
    pub nodes: Vec<OsmNodeId>,
    pub direction: Direction,
}

pub fn is_way_routable(tags: &Tags, only_highways: bool) -> bool {
    if only_highways && !tags.contains_key("highway") {
        return false;
    }
    !tags.get("area").map(|v| v == "yes").unwrap_or(false)
}

pub fn way_direction(tags: &Tags) -> Direction {
    match tags.get("oneway").map(|v| v.as_str()) {
        Some("yes" | "true" | "1") => return Direction::Forward,
        Some("-1") => return Direction::Backward,
        _ => {}
    }
    if tags
        .get("junction")
        .map(|v| v == "roundabout")
        .unwrap_or(false)
    {
        Direction::Forward
    } else {
        Direction::Both
    }
}

/// Road network plus the OSM id of every table index. `osm_ids` is sorted.
#[derive(Debug)]
pub struct OsmGraph {
    pub table: NodeTable,
    pub osm_ids: Vec<OsmNodeId>,
    pub dropped_roads: usize,
}

impl OsmGraph {
    pub fn index_of(&self, id: OsmNodeId) -> Option<NodeId> {
        self.osm_ids.binary_search(&id).ok()
    }
}

/// Adds a road, counting it in `dropped` instead of failing when `from` is full.
fn add_or_drop(
    table: &mut NodeTable,
    from: NodeId,
    to: NodeId,
    length: Distance,
    dropped: &mut usize,
) -> crate::error::Result<()> {
    match table.add_road(from, to, length) {
        Ok(()) => Ok(()),
        Err(Error::DegreeExceeded { .. }) => {
            *dropped += 1;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Turns ways into roads between consecutive nodes. Segments with an endpoint missing from
/// `coords` are skipped; roads beyond a node's eighth slot are dropped and counted.
pub fn build_graph(
    ways: &[RoutableWay],
    coords: &FnvHashMap<OsmNodeId, Coord>,
) -> crate::error::Result<OsmGraph> {
    let mut osm_ids: Vec<OsmNodeId> = coords.keys().copied().collect();
    osm_ids.sort_unstable();
    let id_to_idx: FnvHashMap<OsmNodeId, NodeId> =
        osm_ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();

    let mut table = NodeTable::try_new(osm_ids.len())?;
    let mut dropped_roads = 0;

    for way in ways {
        for pair in way.nodes.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let (Some(&ca), Some(&cb)) = (coords.get(&a), coords.get(&b)) else {
                continue;
            };
            let (Some(&u), Some(&v)) = (id_to_idx.get(&a), id_to_idx.get(&b)) else {
                continue;
            };
            if u == v {
                continue;
            }
            let length = ca.road_length(cb);
            match way.direction {
                Direction::Forward => add_or_drop(&mut table, u, v, length, &mut dropped_roads)?,
                Direction::Backward => add_or_drop(&mut table, v, u, length, &mut dropped_roads)?,
                Direction::Both => {
                    add_or_drop(&mut table, u, v, length, &mut dropped_roads)?;
                    add_or_drop(&mut table, v, u, length, &mut dropped_roads)?;
                }
            }
        }
    }

    Ok(OsmGraph {
        table,
        osm_ids,
        dropped_roads,
    })
}

pub fn load_osm_graph<P: AsRef<Path>>(path: P, only_highways: bool) -> Result<OsmGraph> {
    let path = path.as_ref();

    // Pass 1: routable ways and the node ids they reference.
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut pbf = OsmPbfReader::new(file);
    let mut needed_nodes: HashSet<OsmNodeId> = HashSet::new();
    let mut ways: Vec<RoutableWay> = Vec::new();
    for obj in pbf.iter() {
        if let OsmObj::Way(w) = obj? {
            if is_way_routable(&w.tags, only_highways) && w.nodes.len() >= 2 {
                needed_nodes.extend(w.nodes.iter().copied());
                ways.push(RoutableWay {
                    direction: way_direction(&w.tags),
                    nodes: w.nodes,
                });
            }
        }
    }
    info!(
        ways = ways.len(),
        node_refs = needed_nodes.len(),
        "collected routable ways"
    );

    // Pass 2: coordinates for the referenced nodes.
    let file = File::open(path).with_context(|| format!("reopening {}", path.display()))?;
    let mut pbf = OsmPbfReader::new(file);
    let mut coords: FnvHashMap<OsmNodeId, Coord> = FnvHashMap::default();
    for obj in pbf.iter() {
        if let OsmObj::Node(n) = obj? {
            if needed_nodes.contains(&n.id) {
                coords.insert(
                    n.id,
                    Coord {
                        lat: n.lat(),
                        lon: n.lon(),
                    },
                );
            }
        }
    }
    info!(nodes = coords.len(), "loaded coordinates");

    let graph = build_graph(&ways, &coords).context("building road table")?;
    if graph.dropped_roads > 0 {
        warn!(
            dropped = graph.dropped_roads,
            "roads beyond the per-node slot limit were dropped"
        );
    }
    info!(
        nodes = graph.table.len(),
        roads = graph.table.road_count(),
        "built road table"
    );
    Ok(graph)
}
