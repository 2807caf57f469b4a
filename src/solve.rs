//! Problem -> tree -> ground state pipeline

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::{Config, SpinOrder};
use crate::input::{InputError, Problem};
use crate::minimize::{MinimizeError, Minimizer};
use crate::output::{render_to_string, result_path, write_result, OutputError};
use crate::tree::{IsingTree, Spin, TreeBuilder, TreeError};

#[derive(Error, Debug)]
pub enum SolveError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Minimize(#[from] MinimizeError),

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error("problem {name} declares {declared} spins but its tree has {built}")]
    SpinCountMismatch {
        name: String,
        declared: usize,
        built: usize,
    },
}

/// Outcome of a minimization
#[derive(Debug)]
pub struct Solution {
    pub name: String,
    pub energy: f64,
    /// Retained spins in walk order
    pub spins: Vec<Spin>,
    /// The tree, left carrying `spins`
    pub tree: IsingTree,
}

impl Solution {
    pub fn ordered_spins(&self, order: SpinOrder) -> Vec<Spin> {
        match order {
            SpinOrder::Walk => self.spins.clone(),
            SpinOrder::Index => self.tree.spins_by_index(),
        }
    }

    pub fn render(&self, order: SpinOrder) -> String {
        render_to_string(self.energy, &self.ordered_spins(order))
    }
}

/// Build the tree for `problem` and search for its ground state
pub fn solve(problem: &Problem, config: &Config) -> Result<Solution, SolveError> {
    let adjacency = problem.adjacency(config.sort_links);
    let mut tree = TreeBuilder::build(&adjacency)?;
    debug!("built tree for {}:\n{}", problem.name, tree);

    if config.check_spin_count && tree.len() != problem.n_spins {
        error!(
            declared = problem.n_spins,
            built = tree.len(),
            "wrong number of spins, perhaps wrong data file"
        );
        return Err(SolveError::SpinCountMismatch {
            name: problem.name.clone(),
            declared: problem.n_spins,
            built: tree.len(),
        });
    }

    if !tree.is_depth_first_indexed() {
        warn!(
            order = ?config.order,
            "node indices do not follow depth-first order"
        );
    }

    let (energy, spins) = Minimizer::ground_state(&mut tree, config.initial_spin)?;
    info!(name = %problem.name, energy, "found minimum energy state");

    Ok(Solution {
        name: problem.name.clone(),
        energy,
        spins,
        tree,
    })
}

/// Solve the problem in `input` and write its result file
///
/// Returns the path of the written result.
pub fn solve_file(input: &Path, config: &Config) -> Result<PathBuf, SolveError> {
    let problem = Problem::read(input)?;
    let solution = solve(&problem, config)?;

    let dir = match &config.output_dir {
        Some(dir) => dir.clone(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let output_path = result_path(&dir, &problem.name, &config.suffix);

    if let Err(e) = write_result(
        solution.energy,
        &solution.ordered_spins(config.order),
        &output_path,
    ) {
        error!("{e}");
        return Err(e.into());
    }

    info!(path = %output_path.display(), "saved result");
    Ok(output_path)
}
