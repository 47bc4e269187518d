use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::graph::{Distance, NodeId, NodeTable, INFINITY};
use crate::heap::{PriorityQueue, QueueEntry};

/// Per-run bookkeeping. Dropped together with the queue when the run ends.
struct SearchState {
    distances: Vec<Distance>,
    visited: Vec<bool>,
}

impl SearchState {
    fn new(node_count: usize, source: NodeId) -> Result<Self> {
        let mut distances = Vec::new();
        distances
            .try_reserve_exact(node_count)
            .map_err(|e| Error::allocation("distance table", node_count, e))?;
        distances.resize(node_count, INFINITY);

        let mut visited = Vec::new();
        visited
            .try_reserve_exact(node_count)
            .map_err(|e| Error::allocation("visited set", node_count, e))?;
        visited.resize(node_count, false);

        distances[source] = 0;
        Ok(Self { distances, visited })
    }

    /// A popped copy is stale once its node is settled or a shorter distance was recorded.
    fn is_stale(&self, entry: &QueueEntry) -> bool {
        self.visited[entry.node] || entry.distance > self.distances[entry.node]
    }
}

/// Counters collected during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub inserts: usize,
    pub extracts: usize,
    pub stale_skipped: usize,
    pub relaxed: usize,
    pub peak_queue_len: usize,
}

/// Distances from one source, `INFINITY` for nodes that were never reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceTable(Vec<Distance>);

impl DistanceTable {
    pub fn get(&self, node: NodeId) -> Option<Distance> {
        self.0.get(node).copied().filter(|&d| d != INFINITY)
    }

    /// Raw value including the `INFINITY` marker. Panics on an out-of-range node.
    pub fn raw(&self, node: NodeId) -> Distance {
        self.0[node]
    }

    pub fn as_slice(&self) -> &[Distance] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Distance> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn reached_count(&self) -> usize {
        self.0.iter().filter(|&&d| d != INFINITY).count()
    }

    pub fn max_finite(&self) -> Option<Distance> {
        self.0.iter().copied().filter(|&d| d != INFINITY).max()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Option<Distance>)> + '_ {
        self.0
            .iter()
            .enumerate()
            .map(|(node, &d)| (node, (d != INFINITY).then_some(d)))
    }
}

impl From<Vec<Distance>> for DistanceTable {
    fn from(distances: Vec<Distance>) -> Self {
        DistanceTable(distances)
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub reachable: bool,
    pub distances: DistanceTable,
    pub stats: SearchStats,
}

/// Shortest distance from `source` to `destination`.
///
/// Stops as soon as `destination` is popped from the queue. Distances of nodes that were
/// not settled before that point are upper bounds (or `INFINITY`). An unreachable
/// destination is reported through `reachable == false`, not as an error.
pub fn find_distance(
    table: &NodeTable,
    source: NodeId,
    destination: NodeId,
) -> Result<SearchOutcome> {
    validate(table, source)?;
    table.check_index(destination)?;
    run(table, source, Some(destination))
}

/// Distances from `source` to every node.
pub fn find_all_distances(table: &NodeTable, source: NodeId) -> Result<DistanceTable> {
    validate(table, source)?;
    run(table, source, None).map(|outcome| outcome.distances)
}

fn validate(table: &NodeTable, source: NodeId) -> Result<()> {
    if table.is_empty() {
        return Err(Error::EmptyNodeTable);
    }
    table.check_index(source)
}

fn run(table: &NodeTable, source: NodeId, destination: Option<NodeId>) -> Result<SearchOutcome> {
    let mut state = SearchState::new(table.len(), source)?;
    let mut queue = PriorityQueue::new()?;
    let mut stats = SearchStats::default();

    queue.insert(QueueEntry::new(source, 0))?;
    stats.inserts += 1;
    stats.peak_queue_len = 1;

    let mut reachable = false;
    while let Some(current) = queue.extract_min() {
        stats.extracts += 1;

        if Some(current.node) == destination {
            reachable = true;
            break;
        }
        if state.is_stale(&current) {
            stats.stale_skipped += 1;
            continue;
        }
        state.visited[current.node] = true;

        let Some(record) = table.node(current.node) else {
            continue;
        };
        for road in record.roads() {
            if road.to == current.node || state.visited[road.to] {
                continue;
            }
            let candidate = current.distance.saturating_add(road.length);
            if candidate < state.distances[road.to] {
                trace!(from = current.node, to = road.to, candidate, "relaxed");
                state.distances[road.to] = candidate;
                queue.insert(QueueEntry::new(road.to, candidate))?;
                stats.relaxed += 1;
                stats.inserts += 1;
                stats.peak_queue_len = stats.peak_queue_len.max(queue.len());
            }
        }
    }

    debug!(
        source,
        ?destination,
        reachable,
        inserts = stats.inserts,
        extracts = stats.extracts,
        stale = stats.stale_skipped,
        peak_queue = stats.peak_queue_len,
        "search finished"
    );

    Ok(SearchOutcome {
        reachable,
        distances: DistanceTable(state.distances),
        stats,
    })
}
