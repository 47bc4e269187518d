use std::collections::TryReserveError;

use crate::graph::{NodeId, MAX_ROADS};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to allocate {requested} slots for {what}")]
    AllocationFailure {
        what: &'static str,
        requested: usize,
        #[source]
        source: TryReserveError,
    },

    #[error("node table is empty")]
    EmptyNodeTable,

    #[error("node index {index} out of range for a table of {node_count} nodes")]
    InvalidIndex { index: NodeId, node_count: usize },

    #[error("node {node} already has {} roads", MAX_ROADS)]
    DegreeExceeded { node: NodeId },
}

impl Error {
    pub(crate) fn allocation(what: &'static str, requested: usize, source: TryReserveError) -> Self {
        Error::AllocationFailure {
            what,
            requested,
            source,
        }
    }

    /// True for errors caused by the caller's arguments rather than the allocator.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            Error::EmptyNodeTable | Error::InvalidIndex { .. } | Error::DegreeExceeded { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
