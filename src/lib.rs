//! Distance-only shortest paths over road networks where every node has at most
//! eight outgoing roads.
//!
//! The search is Dijkstra's algorithm over [`heap::PriorityQueue`], an array-backed
//! binary min-heap that grows by doubling. Relaxed nodes are pushed again instead of
//! having their key decreased; stale copies are discarded when they are popped.
//!
//! ```
//! use roadnet::{find_distance, NodeTable};
//!
//! let mut table = NodeTable::new(3);
//! table.add_two_way(0, 1, 4).unwrap();
//! table.add_two_way(1, 2, 3).unwrap();
//!
//! let outcome = find_distance(&table, 0, 2).unwrap();
//! assert!(outcome.reachable);
//! assert_eq!(outcome.distances.get(2), Some(7));
//! ```

pub mod dijkstra;
pub mod error;
pub mod graph;
pub mod heap;
pub mod logging;
pub mod osm;
pub mod reference;
pub mod table_io;

pub use dijkstra::{find_all_distances, find_distance, DistanceTable, SearchOutcome, SearchStats};
pub use error::{Error, Result};
pub use graph::{Distance, NodeId, NodeRecord, NodeTable, Road, INFINITY, MAX_ROADS};
pub use heap::{Keyed, PriorityQueue, QueueEntry, START_CAPACITY};
