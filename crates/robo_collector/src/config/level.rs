use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::RESOURCES_FOLDER_NAME;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub(crate) enum LevelError {
    #[error("level {level_id} not found at {path}")]
    NotFound { level_id: u32, path: PathBuf },
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("level file {path} contains no rows")]
    Empty { path: PathBuf },
    #[error("level file {path} has a blank line {line} inside the grid")]
    BlankRow { path: PathBuf, line: usize },
    #[error("level file {path} row {row} has {found} columns, expected {expected}")]
    NotRectangular {
        path: PathBuf,
        row: usize,
        expected: usize,
        found: usize,
    },
}

pub(crate) fn level_path(project_install_prefix: &Path, level_id: u32) -> PathBuf {
    project_install_prefix
        .join(RESOURCES_FOLDER_NAME)
        .join("levels")
        .join(format!("level_{level_id}.txt"))
}

/// Reads the marker grid of `level_id`, one row per line.
///
/// Blank lines before and after the grid are skipped. Rows are kept verbatim
/// apart from line endings, so trailing spaces count as cells and a blank
/// line between rows is an error.
pub(crate) fn read_field_data(
    project_install_prefix: &Path,
    level_id: u32,
) -> Result<Vec<Vec<char>>, LevelError> {
    let path = level_path(project_install_prefix, level_id);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Err(LevelError::NotFound { level_id, path });
        }
        Err(source) => return Err(LevelError::Read { path, source }),
    };

    let data = match parse_field_data(&raw) {
        Ok(data) => data,
        Err(line) => return Err(LevelError::BlankRow { path, line }),
    };
    let Some(first) = data.first() else {
        return Err(LevelError::Empty { path });
    };
    let expected = first.len();
    if let Some((row, found)) = data
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|(_, len)| *len != expected)
    {
        return Err(LevelError::NotRectangular {
            path,
            row,
            expected,
            found,
        });
    }

    debug!(
        level_id,
        rows = data.len(),
        cols = expected,
        path = %path.display(),
        "level_loaded"
    );
    Ok(data)
}

/// Returns the 1-based line number of the first blank line inside the grid
/// on error.
fn parse_field_data(raw: &str) -> Result<Vec<Vec<char>>, usize> {
    let is_blank = |line: &str| line.trim().is_empty();
    let lines: Vec<&str> = raw.lines().collect();
    let Some(first) = lines.iter().position(|line| !is_blank(line)) else {
        return Ok(Vec::new());
    };
    let last = lines.iter().rposition(|line| !is_blank(line)).unwrap_or(first);

    let mut data = Vec::with_capacity(last - first + 1);
    for (idx, line) in lines.iter().enumerate().take(last + 1).skip(first) {
        if is_blank(line) {
            return Err(idx + 1);
        }
        data.push(line.chars().collect());
    }
    Ok(data)
}
