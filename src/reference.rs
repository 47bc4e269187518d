// Decrease-key Dijkstra over the same node table, backed by orx-priority-queue.
// Used to cross-check the lazy-deletion search.
use orx_priority_queue::{BinaryHeapWithMap, PriorityQueue as _, PriorityQueueDecKey as _};

use crate::error::{Error, Result};
use crate::graph::{Distance, NodeId, NodeTable, INFINITY};

pub fn reference_distances(table: &NodeTable, source: NodeId) -> Result<Vec<Distance>> {
    if table.is_empty() {
        return Err(Error::EmptyNodeTable);
    }
    table.check_index(source)?;

    let mut dist = vec![INFINITY; table.len()];
    let mut pq: BinaryHeapWithMap<NodeId, Distance> = BinaryHeapWithMap::new();

    dist[source] = 0;
    pq.decrease_key_or_push(&source, 0);

    while let Some((node, cost)) = pq.pop() {
        let Some(record) = table.node(node) else {
            continue;
        };
        for road in record.roads().filter(|road| road.to != node) {
            let next_cost = cost.saturating_add(road.length);
            if next_cost < dist[road.to] {
                dist[road.to] = next_cost;
                pq.decrease_key_or_push(&road.to, next_cost);
            }
        }
    }
    Ok(dist)
}
