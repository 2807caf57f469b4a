//! Ground-state search for Ising models whose interaction graph is a tree.
//!
//! A problem file is read into an adjacency mapping ([`input`]), turned into
//! an [`tree::IsingTree`] by the [`tree::TreeBuilder`], and minimized by the
//! single-pass flip-and-compare search in [`minimize`]. The result is written
//! as an energy line and a `+`/`-` spin line ([`output`]).

pub mod cli;
pub mod config;
pub mod input;
pub mod minimize;
pub mod output;
pub mod solve;
pub mod tree;

pub use config::Config;
pub use minimize::Minimizer;
pub use solve::{solve, solve_file, Solution, SolveError};
pub use tree::{Adjacency, IsingTree, Node, Spin, TreeBuilder};
