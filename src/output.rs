//! Result file rendering

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::tree::Spin;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("failed to write {}: {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Render a result and write it to `output_path`
pub fn write_result(energy: f64, spins: &[Spin], output_path: &Path) -> Result<(), OutputError> {
    let content = render_to_string(energy, spins);
    let io_error = |source| OutputError::IoError {
        path: output_path.to_path_buf(),
        source,
    };

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut file = fs::File::create(output_path).map_err(io_error)?;
    file.write_all(content.as_bytes()).map_err(io_error)?;

    Ok(())
}

/// Render a result as two lines: the energy, then one `+`/`-` per spin
pub fn render_to_string(energy: f64, spins: &[Spin]) -> String {
    let mut output = energy.to_string();
    output.push('\n');
    output.extend(spins.iter().map(|s| s.symbol()));
    output.push('\n');
    output
}

/// Location of the result file for problem `name`
pub fn result_path(dir: &Path, name: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}{}", name, suffix))
}
