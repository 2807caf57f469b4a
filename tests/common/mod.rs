//! Common test utilities

use std::fs;
use std::path::{Path, PathBuf};

use ising_tree::input::Problem;
use ising_tree::{solve, Config};

/// Get the path to the testdata directory
pub fn testdata_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Load a fixture from testdata
pub fn read_problem(name: &str) -> Problem {
    Problem::read(&testdata_dir().join(name)).expect("Failed to read fixture")
}

/// Solve a fixture and render its result file contents
pub fn solve_fixture(name: &str, config: &Config) -> String {
    let problem = read_problem(name);
    let solution = solve(&problem, config).expect("Failed to solve fixture");
    solution.render(config.order)
}

/// Copy fixtures into `dir`
pub fn copy_fixtures(names: &[&str], dir: &Path) {
    for name in names {
        let target = dir.join(Path::new(name).file_name().expect("fixture has a file name"));
        fs::copy(testdata_dir().join(name), target).expect("Failed to copy fixture");
    }
}
