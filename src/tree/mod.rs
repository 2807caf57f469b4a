//! Ising tree data structure and construction

mod builder;
mod ising;
mod node;

use thiserror::Error;

pub use builder::{Adjacency, TreeBuilder};
pub use ising::{IsingTree, Walk};
pub use node::{Node, NodeId, Spin};

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("wrong value of spin {0}, must be +1 or -1")]
    InvalidSpin(i64),

    #[error("node {0} is already in the tree")]
    DuplicateIndex(usize),

    #[error("cannot install node {index} as root, tree already rooted at {root}")]
    RootAlreadySet { root: usize, index: usize },

    #[error("wrong size of spin vector: expected {expected}, got {got}")]
    SpinLengthMismatch { expected: usize, got: usize },

    #[error("no root found, every node has a parent (cycle?)")]
    NoRoot,

    #[error("more than one root found: {0:?}")]
    MultipleRoots(Vec<usize>),

    #[error("nodes not connected to the root: {0:?}")]
    Unreachable(Vec<usize>),
}
