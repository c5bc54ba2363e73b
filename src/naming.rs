//! Frame-name normalization, validation, and on-disk resolution.
//!
//! Selections arrive as bare stems (`IMG_0002`, possibly lower-case, with
//! stray whitespace). Each pipeline stage pins them to its fixed extension
//! and checks them against the canonical `IMG_####.<EXT>` form before
//! anything touches the filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Result, WorkflowError};

/// Extension of the unedited camera frames handled by `organize`.
pub const RAW_EXTENSION: &str = "CR2";
/// Extension of the edited frames handled by `dispatch`.
pub const RENDERED_EXTENSION: &str = "JPG";

/// Which delivery stage a frame name belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    Raw,
    Rendered,
}

impl FrameKind {
    pub fn extension(self) -> &'static str {
        match self {
            FrameKind::Raw => RAW_EXTENSION,
            FrameKind::Rendered => RENDERED_EXTENSION,
        }
    }

    /// Canonical example shown in validation errors.
    fn expected_form(self) -> String {
        format!("IMG_0000.{}", self.extension())
    }
}

/// How strictly frame names are matched against files on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaseMatching {
    /// Names must match the canonical upper-case form exactly.
    Strict,
    /// ASCII case differences are tolerated, both in the name check and when
    /// resolving names against directory entries.
    IgnoreCase,
}

/// Normalize a selection token: trim, upper-case, append the stage extension.
pub fn normalize(token: &str, kind: FrameKind) -> String {
    format!("{}.{}", token.trim().to_ascii_uppercase(), kind.extension())
}

fn frame_pattern(kind: FrameKind, matching: CaseMatching) -> Regex {
    let pattern = match matching {
        CaseMatching::Strict => format!(r"^IMG_\d{{4}}\.{}$", kind.extension()),
        CaseMatching::IgnoreCase => format!(r"(?i)^IMG_\d{{4}}\.{}$", kind.extension()),
    };
    Regex::new(&pattern).expect("frame name pattern")
}

/// Check a normalized frame name against the canonical `IMG_####.<EXT>` form.
pub fn validate(name: &str, kind: FrameKind, matching: CaseMatching) -> Result<()> {
    if frame_pattern(kind, matching).is_match(name) {
        Ok(())
    } else {
        Err(WorkflowError::BadFrameName {
            name: name.to_string(),
            expected: kind.expected_form(),
        })
    }
}

/// Resolve a validated frame name to an existing file in `dir`.
///
/// An exact-name hit always wins. Under `IgnoreCase` the directory is then
/// scanned for entries differing only by ASCII case, ties going to the
/// lexicographically first candidate.
pub fn resolve(name: &str, dir: &Path, matching: CaseMatching) -> Result<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Ok(exact);
    }
    if matching == CaseMatching::IgnoreCase {
        let mut candidates: Vec<String> = file_names(dir)?
            .into_iter()
            .filter(|entry| entry.eq_ignore_ascii_case(name))
            .collect();
        candidates.sort();
        if let Some(found) = candidates.into_iter().next() {
            return Ok(dir.join(found));
        }
    }
    Err(WorkflowError::MissingFrame {
        name: name.to_string(),
        dir: dir.to_path_buf(),
    })
}

/// File names in `dir` that look like rendered frames, sorted.
pub fn scan_rendered(dir: &Path, matching: CaseMatching) -> Result<Vec<String>> {
    let pattern = frame_pattern(FrameKind::Rendered, matching);
    let mut names: Vec<String> = file_names(dir)?
        .into_iter()
        .filter(|name| pattern.is_match(name))
        .collect();
    names.sort();
    Ok(names)
}

fn file_names(dir: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir)
        .map_err(|err| WorkflowError::io(format!("read {}", dir.display()), err))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|err| WorkflowError::io(format!("read {}", dir.display()), err))?;
        if !entry.path().is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    Ok(names)
}
