//! The organize pipeline: copy every selected raw frame into a fresh
//! delivery folder.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Result, WorkflowError};
use crate::naming::{self, CaseMatching, FrameKind};
use crate::roster;
use crate::staging;

/// Inputs for one organize run.
#[derive(Clone, Debug)]
pub struct OrganizeConfig {
    /// Directory holding the raw frames (and, by default, the roster).
    pub input_dir: PathBuf,
    /// Delivery directory; created, or reused only if already empty.
    pub output_dir: PathBuf,
    /// Explicit roster path; `None` discovers the unique `.csv` in `input_dir`.
    pub roster: Option<PathBuf>,
    /// Comma-separated stems to copy instead of reading a roster.
    pub picks: Option<String>,
    pub matching: CaseMatching,
}

/// What an organize run did.
#[derive(Debug, Serialize)]
pub struct OrganizeSummary {
    pub copied: usize,
    pub output_dir: PathBuf,
    /// Roster actually used; absent in picks mode.
    pub roster: Option<PathBuf>,
}

enum Source {
    Picks(Vec<String>),
    Roster(PathBuf),
}

/// Copy every frame selected across the roster into the output directory.
///
/// Every selection is validated and resolved on disk before the first copy,
/// so a failing run leaves the output directory empty.
pub fn run_organize(config: &OrganizeConfig) -> Result<OrganizeSummary> {
    let source = locate_source(config)?;
    staging::prepare_output_dir(&config.output_dir)?;

    let mut roster_path = None;
    let tokens = match source {
        Source::Picks(picks) => {
            if picks.is_empty() {
                return Err(WorkflowError::EmptySelection {
                    who: "the picks list".to_string(),
                });
            }
            picks
        }
        Source::Roster(path) => {
            let tokens: Vec<String> = roster::load_roster(&path)?
                .into_iter()
                .flat_map(|recipient| recipient.picks)
                .collect();
            roster_path = Some(path);
            tokens
        }
    };

    // Normalizing into a set makes the run independent of row order and
    // copies shared picks exactly once.
    let selection: BTreeSet<String> = tokens
        .iter()
        .map(|token| naming::normalize(token, FrameKind::Raw))
        .collect();

    let mut resolved = Vec::with_capacity(selection.len());
    for name in &selection {
        naming::validate(name, FrameKind::Raw, config.matching)?;
        resolved.push(naming::resolve(name, &config.input_dir, config.matching)?);
    }

    for frame in &resolved {
        staging::copy_into(frame, &config.output_dir)?;
    }
    tracing::info!(
        "copied {} frame(s) into {}",
        resolved.len(),
        config.output_dir.display()
    );

    Ok(OrganizeSummary {
        copied: resolved.len(),
        output_dir: config.output_dir.clone(),
        roster: roster_path,
    })
}

fn locate_source(config: &OrganizeConfig) -> Result<Source> {
    if let Some(list) = &config.picks {
        return Ok(Source::Picks(roster::split_picks(list)));
    }
    let path = roster::resolve_roster_path(config.roster.as_deref(), &config.input_dir)?;
    Ok(Source::Roster(path))
}
