use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::error;
use walkdir::WalkDir;

use crate::config::Config;
use crate::solve::solve_file;

/// Ising Tree - ground state search for Ising models on trees
#[derive(Parser)]
#[command(name = "ising-tree")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Problem file, or a directory searched for `*.txt` problem files
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory (default: next to each input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file (default: nearest ising.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `ising_tree=trace`
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let is_dir = self.input.is_dir();
        let start = if is_dir {
            self.input.clone()
        } else {
            self.input.parent().map(Path::to_path_buf).unwrap_or_default()
        };

        let mut config = Config::load(self.config.as_deref(), &start)?;
        if let Some(dir) = self.output {
            config.output_dir = Some(dir);
        }

        if is_dir {
            solve_directory(&self.input, &config)
        } else {
            let output_path = solve_file(&self.input, &config)?;
            println!("Saved result at: {:?}", output_path);
            Ok(())
        }
    }
}

fn solve_directory(dir: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Solving all problems in {:?}", dir);

    let inputs = find_problem_files(dir, &config.suffix);
    if inputs.is_empty() {
        println!("No problem files found");
        return Ok(());
    }

    println!("Found {} problem files", inputs.len());
    let mut failed = 0;

    for path in &inputs {
        match solve_file(path, config) {
            Ok(output_path) => println!("  -> {:?}", output_path),
            Err(e) => {
                error!(path = %path.display(), "{e}");
                failed += 1;
            }
        }
    }

    println!("Solved {} of {} problems", inputs.len() - failed, inputs.len());

    if failed > 0 {
        return Err(format!("{} problem files could not be solved", failed).into());
    }
    Ok(())
}

/// All `*.txt` files below `dir`, skipping result files ending in `suffix`
pub fn find_problem_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut inputs = Vec::new();

    for entry in WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if name.ends_with(".txt") && !name.ends_with(suffix) {
            inputs.push(entry.path().to_path_buf());
        }
    }

    inputs
}
