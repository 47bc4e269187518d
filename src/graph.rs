//! A road network where every node has at most [`MAX_ROADS`] outgoing roads.
//!
//! Nodes are indexed `0..len()`. Empty road slots are `None`, so every index,
//! including 0, can be referenced as a neighbour.
use crate::error::{Error, Result};

pub type NodeId = usize;
pub type Distance = u32;

/// Marks a node the search never reached.
pub const INFINITY: Distance = Distance::MAX;

pub const MAX_ROADS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Road {
    pub to: NodeId,
    pub length: Distance,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeRecord {
    pub id: NodeId,
    pub slots: [Option<Road>; MAX_ROADS],
}

impl NodeRecord {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            slots: [None; MAX_ROADS],
        }
    }

    /// Occupied slots in slot order.
    pub fn roads(&self) -> impl Iterator<Item = &Road> + '_ {
        self.slots.iter().flatten()
    }

    pub fn degree(&self) -> usize {
        self.roads().count()
    }

    fn push_road(&mut self, road: Road) -> Result<()> {
        match self.slots.iter_mut().find(|slot| slot.is_none()) {
            Some(slot) => {
                *slot = Some(road);
                Ok(())
            }
            None => Err(Error::DegreeExceeded { node: self.id }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NodeTable {
    nodes: Vec<NodeRecord>,
}

impl NodeTable {
    pub fn new(node_count: usize) -> Self {
        Self {
            nodes: (0..node_count).map(NodeRecord::new).collect(),
        }
    }

    /// Like [`NodeTable::new`], but reports a failed allocation instead of aborting.
    pub fn try_new(node_count: usize) -> Result<Self> {
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(node_count)
            .map_err(|e| Error::allocation("node table", node_count, e))?;
        nodes.extend((0..node_count).map(NodeRecord::new));
        Ok(Self { nodes })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeRecord> {
        self.nodes.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeRecord> + '_ {
        self.nodes.iter()
    }

    /// Total number of occupied road slots.
    pub fn road_count(&self) -> usize {
        self.nodes.iter().map(NodeRecord::degree).sum()
    }

    pub fn check_index(&self, index: NodeId) -> Result<()> {
        if index < self.nodes.len() {
            Ok(())
        } else {
            Err(Error::InvalidIndex {
                index,
                node_count: self.nodes.len(),
            })
        }
    }

    /// Stores a directed road in the first free slot of `from`.
    pub fn add_road(&mut self, from: NodeId, to: NodeId, length: Distance) -> Result<()> {
        self.check_index(from)?;
        self.check_index(to)?;
        self.nodes[from].push_road(Road { to, length })
    }

    /// Stores roads in both directions. Fails without modifying the table if
    /// either endpoint is already full.
    pub fn add_two_way(&mut self, a: NodeId, b: NodeId, length: Distance) -> Result<()> {
        self.check_index(a)?;
        self.check_index(b)?;
        for node in [a, b] {
            if self.nodes[node].degree() == MAX_ROADS {
                return Err(Error::DegreeExceeded { node });
            }
        }
        if a == b && self.nodes[a].degree() + 2 > MAX_ROADS {
            return Err(Error::DegreeExceeded { node: a });
        }
        self.add_road(a, b, length)?;
        self.add_road(b, a, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roads_fill_slots_in_order() {
        let mut table = NodeTable::new(3);
        table.add_road(1, 0, 4).unwrap();
        table.add_road(1, 2, 7).unwrap();
        let roads: Vec<_> = table.node(1).unwrap().roads().copied().collect();
        assert_eq!(
            roads,
            vec![Road { to: 0, length: 4 }, Road { to: 2, length: 7 }]
        );
        assert_eq!(table.road_count(), 2);
        assert_eq!(table.node(0).unwrap().degree(), 0);
    }

    #[test]
    fn ninth_road_is_rejected() {
        let mut table = NodeTable::new(10);
        for to in 1..=MAX_ROADS {
            table.add_road(0, to, 1).unwrap();
        }
        let err = table.add_road(0, 9, 1).unwrap_err();
        assert!(matches!(err, Error::DegreeExceeded { node: 0 }));
        assert_eq!(table.node(0).unwrap().degree(), MAX_ROADS);
    }

    #[test]
    fn out_of_range_endpoints() {
        let mut table = NodeTable::new(2);
        assert!(matches!(
            table.add_road(0, 2, 1),
            Err(Error::InvalidIndex { index: 2, node_count: 2 })
        ));
        assert!(matches!(
            table.add_road(5, 0, 1),
            Err(Error::InvalidIndex { index: 5, .. })
        ));
        assert_eq!(table.road_count(), 0);
    }

    #[test]
    fn try_new_reports_allocation_failure() {
        let table = NodeTable::try_new(4).unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.node(3).unwrap().id, 3);

        let err = NodeTable::try_new(usize::MAX).unwrap_err();
        assert!(matches!(
            err,
            Error::AllocationFailure { what: "node table", requested: usize::MAX, .. }
        ));
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn two_way_is_all_or_nothing() {
        let mut table = NodeTable::new(10);
        for to in 2..=9 {
            table.add_road(1, to, 1).unwrap();
        }
        assert!(table.add_two_way(0, 1, 3).is_err());
        assert_eq!(table.node(0).unwrap().degree(), 0);

        table.add_two_way(0, 2, 3).unwrap();
        assert_eq!(table.node(0).unwrap().roads().next(), Some(&Road { to: 2, length: 3 }));
        assert_eq!(table.node(2).unwrap().roads().next(), Some(&Road { to: 0, length: 3 }));
    }
}
