//! Selection roster: locating and parsing the client CSV.
//!
//! The roster is the sheet the photographer collects after a shoot: one row
//! per client, the contact email in the third column and a comma-separated
//! list of frame stems in the fourth. All other columns are the client's
//! business and are ignored here.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, WorkflowError};

/// Extension required of roster files, matched case-insensitively.
pub const ROSTER_EXTENSION: &str = "csv";

const EMAIL_COLUMN: usize = 2;
const PICKS_COLUMN: usize = 3;

/// One roster row: a client and the frame stems they selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Recipient {
    pub email: String,
    pub picks: Vec<String>,
}

/// Locate the roster: an explicit path, or the unique `.csv` in `search_dir`.
pub fn resolve_roster_path(explicit: Option<&Path>, search_dir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        validate_roster_path(path)?;
        return Ok(path.to_path_buf());
    }
    let entries = fs::read_dir(search_dir)
        .map_err(|err| WorkflowError::io(format!("read {}", search_dir.display()), err))?;
    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|err| WorkflowError::io(format!("read {}", search_dir.display()), err))?;
        let path = entry.path();
        let is_roster = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(has_roster_extension);
        if path.is_file() && is_roster {
            candidates.push(path);
        }
    }
    candidates.sort();
    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        found => Err(WorkflowError::RosterSearch {
            dir: search_dir.to_path_buf(),
            found,
        }),
    }
}

fn has_roster_extension(name: &str) -> bool {
    let suffix = format!(".{ROSTER_EXTENSION}");
    name.to_ascii_lowercase().ends_with(&suffix)
}

fn validate_roster_path(path: &Path) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    if !has_roster_extension(name) {
        return Err(invalid(
            path,
            format!("expected a .{ROSTER_EXTENSION} file"),
        ));
    }
    if !path.is_file() {
        return Err(invalid(path, "file does not exist".to_string()));
    }
    Ok(())
}

/// Parse every roster row, preserving sheet order.
///
/// The first line is treated as a header. Rows must have at least four
/// columns and a non-empty picks cell; anything short of that aborts the
/// load so a half-read roster never reaches the copy or send stage.
pub fn load_roster(path: &Path) -> Result<Vec<Recipient>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|err| invalid(path, err.to_string()))?;

    let mut recipients = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| invalid(path, err.to_string()))?;
        let line = record.position().map_or(0, |pos| pos.line());
        if record.len() <= PICKS_COLUMN {
            return Err(invalid(
                path,
                format!(
                    "row at line {line} has {} columns, need at least {}",
                    record.len(),
                    PICKS_COLUMN + 1
                ),
            ));
        }
        let email = record
            .get(EMAIL_COLUMN)
            .unwrap_or_default()
            .trim()
            .to_string();
        let picks = split_picks(record.get(PICKS_COLUMN).unwrap_or_default());
        if picks.is_empty() {
            let who = if email.is_empty() {
                format!("row at line {line}")
            } else {
                email
            };
            return Err(WorkflowError::EmptySelection { who });
        }
        recipients.push(Recipient { email, picks });
    }
    Ok(recipients)
}

/// Split a comma-separated cell of frame stems, dropping empty tokens.
pub fn split_picks(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(String::from)
        .collect()
}

fn invalid(path: &Path, reason: String) -> WorkflowError {
    WorkflowError::InvalidRoster {
        path: path.to_path_buf(),
        reason,
    }
}
